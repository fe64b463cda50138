/// Capabilities reserved for administrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCapability {
    /// Change name, URL, coordinates or category of a point
    EditPoints,

    /// Permanently remove a point
    DeletePoints,

    /// Upload a point to OpenStreetMap
    SendPoints,
}

impl AdminCapability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EditPoints => "edit_points",
            Self::DeletePoints => "delete_points",
            Self::SendPoints => "send_points",
        }
    }
}
