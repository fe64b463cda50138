//! Category vocabulary for points.
//!
//! Loaded once at startup and handed to validation explicitly. The sentinel
//! [`NO_AMENITY`] is always accepted and means "use the freeform field".

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::Path;

/// Selected when none of the listed categories fits.
pub const NO_AMENITY: &str = "none";

const BUNDLED_AMENITIES: &str = include_str!("../../../amenities.json");

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Amenity {
    pub value: String,
    pub label: String,
}

#[derive(Debug, Clone)]
pub struct AmenityCatalog {
    choices: Vec<Amenity>,
}

impl AmenityCatalog {
    pub fn new(choices: Vec<Amenity>) -> Self {
        Self { choices }
    }

    /// Parse a JSON list of `[value, label]` pairs.
    pub fn from_json(json: &str) -> Result<Self> {
        let pairs: Vec<(String, String)> = serde_json::from_str(json)
            .context("Amenity list must be a JSON array of [value, label] pairs")?;

        if let Some((value, _)) = pairs.iter().find(|(value, _)| value.trim().is_empty()) {
            anyhow::bail!("Amenity list contains an empty value: {:?}", value);
        }

        Ok(Self::new(
            pairs
                .into_iter()
                .map(|(value, label)| Amenity { value, label })
                .collect(),
        ))
    }

    /// The vocabulary shipped with the server.
    pub fn bundled() -> Result<Self> {
        Self::from_json(BUNDLED_AMENITIES).context("Bundled amenity list is invalid")
    }

    /// Load from `path`, or fall back to the bundled list when no path is set.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Self::bundled();
        };

        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read amenity list {}", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("Failed to parse amenity list {}", path.display()))
    }

    pub fn choices(&self) -> &[Amenity] {
        &self.choices
    }

    /// Whether `value` may be submitted in the `amenity` field.
    pub fn accepts(&self, value: &str) -> bool {
        value == NO_AMENITY || self.choices.iter().any(|choice| choice.value == value)
    }

    /// Whether `value` is one of the listed categories (excluding the sentinel).
    pub fn is_listed(&self, value: &str) -> bool {
        value != NO_AMENITY && self.choices.iter().any(|choice| choice.value == value)
    }
}
