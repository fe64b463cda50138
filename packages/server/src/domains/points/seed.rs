//! Startup import of pre-seeded points.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use tracing::{info, warn};

use crate::domains::points::amenities::NO_AMENITY;
use crate::domains::points::data::{NewPoint, PointForm};
use crate::kernel::ServerDeps;

/// Submitter recorded on imported points.
pub const IMPORT_SUBMITTER: &str = "import";

/// A coordinate written either as a JSON number or as a string.
///
/// Numbers keep their literal digits, so they are validated exactly like text.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum SeedCoordinate {
    Text(String),
    Number(serde_json::Number),
}

impl SeedCoordinate {
    fn into_text(self) -> String {
        match self {
            Self::Text(text) => text,
            Self::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SeedPoint {
    pub name: String,
    pub lat: SeedCoordinate,
    pub lon: SeedCoordinate,
    pub amenity: String,
    #[serde(default)]
    pub url: Option<String>,
}

impl SeedPoint {
    /// Unlisted categories go through the freeform field.
    fn into_form(self, deps: &ServerDeps) -> PointForm {
        let (amenity, new_amenity) = if deps.amenities.is_listed(self.amenity.trim()) {
            (self.amenity, String::new())
        } else {
            (NO_AMENITY.to_string(), self.amenity)
        };

        PointForm {
            name: self.name,
            url: self.url.unwrap_or_default(),
            lat: self.lat.into_text(),
            lon: self.lon.into_text(),
            amenity,
            new_amenity,
        }
    }
}

/// Read seed points from `path`. A path that is not a regular file yields no seeds.
pub fn load_seed_points(path: Option<&Path>) -> Result<Vec<SeedPoint>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    if !path.is_file() {
        warn!(path = %path.display(), "Imported points file not found, skipping");
        return Ok(Vec::new());
    }

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read imported points {}", path.display()))?;
    serde_json::from_str(&json)
        .with_context(|| format!("Failed to parse imported points {}", path.display()))
}

/// Insert seeds into an empty store. Returns how many points were created.
pub async fn seed_points(seeds: Vec<SeedPoint>, deps: &ServerDeps) -> Result<usize> {
    if seeds.is_empty() {
        return Ok(0);
    }

    let existing = deps.points.count().await?;
    if existing > 0 {
        info!(existing, "Point store not empty, skipping import");
        return Ok(0);
    }

    let total = seeds.len();
    for (index, seed) in seeds.into_iter().enumerate() {
        let name = seed.name.clone();
        let fields = seed
            .into_form(deps)
            .validate(&deps.amenities)
            .map_err(|errors| {
                anyhow::anyhow!("Imported point #{} ({:?}): {}", index, name, errors)
            })?;

        deps.points
            .create(NewPoint {
                fields,
                submitter: IMPORT_SUBMITTER.to_string(),
            })
            .await?;
    }

    info!(count = total, "Imported seed points");
    Ok(total)
}
