use std::fmt::Write;

/// Changeset metadata sent when opening a changeset.
#[derive(Debug, Clone)]
pub struct Changeset {
    pub created_by: String,
    pub comment: String,
}

impl Changeset {
    pub fn to_xml(&self) -> String {
        let mut xml = String::from("<osm><changeset>");
        push_tag(&mut xml, "created_by", &self.created_by);
        push_tag(&mut xml, "comment", &self.comment);
        xml.push_str("</changeset></osm>");
        xml
    }
}

/// A node that does not exist on the server yet.
///
/// Coordinates are kept as the decimal strings the caller supplied so no
/// precision is lost on the way out.
#[derive(Debug, Clone)]
pub struct NewNode {
    pub lat: String,
    pub lon: String,
    pub tags: Vec<(String, String)>,
}

impl NewNode {
    pub fn new(lat: impl Into<String>, lon: impl Into<String>) -> Self {
        Self {
            lat: lat.into(),
            lon: lon.into(),
            tags: Vec::new(),
        }
    }

    pub fn tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.push((key.into(), value.into()));
        self
    }

    pub fn to_xml(&self, changeset_id: u64) -> String {
        let mut xml = String::from("<osm>");
        let _ = write!(
            xml,
            r#"<node changeset="{}" lat="{}" lon="{}">"#,
            changeset_id,
            escape(&self.lat),
            escape(&self.lon)
        );
        for (key, value) in &self.tags {
            push_tag(&mut xml, key, value);
        }
        xml.push_str("</node></osm>");
        xml
    }
}

fn push_tag(xml: &mut String, key: &str, value: &str) {
    let _ = write!(xml, r#"<tag k="{}" v="{}"/>"#, escape(key), escape(value));
}

/// Escape text for use inside an XML attribute.
pub(crate) fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
