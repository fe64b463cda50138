//! Point form parsing and validation.
//!
//! A single pass evaluates every field and reports all failures together, so
//! the caller can re-display the form with per-field flags.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::{Coordinates, PointFields};
use crate::domains::points::amenities::{AmenityCatalog, NO_AMENITY};

/// Raw form submission for creating or editing a point.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PointForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub lat: String,
    #[serde(default)]
    pub lon: String,
    #[serde(default)]
    pub amenity: String,
    #[serde(default)]
    pub new_amenity: String,
}

/// Per-field validation flags; `true` means the field is fine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FormErrors {
    pub ok_name: bool,
    pub ok_coords: bool,
    pub ok_type: bool,
}

impl FormErrors {
    pub fn is_ok(&self) -> bool {
        self.ok_name && self.ok_coords && self.ok_type
    }
}

impl fmt::Display for FormErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let failed: Vec<&str> = [
            (!self.ok_name).then_some("name"),
            (!self.ok_coords).then_some("coordinates"),
            (!self.ok_type).then_some("amenity"),
        ]
        .into_iter()
        .flatten()
        .collect();

        if failed.is_empty() {
            write!(f, "no errors")
        } else {
            write!(f, "invalid {}", failed.join(", "))
        }
    }
}

impl PointForm {
    pub fn validate(&self, catalog: &AmenityCatalog) -> Result<PointFields, FormErrors> {
        let name = non_empty(&self.name);
        let coordinates = parse_coordinate(&self.lat)
            .zip(parse_coordinate(&self.lon))
            .and_then(|(lat, lon)| Coordinates::new(lat, lon));
        let amenity = self.resolve_amenity(catalog);

        match (name, coordinates, amenity) {
            (Some(name), Some(coordinates), Some(amenity)) => Ok(PointFields::new(
                name,
                non_empty(&self.url),
                coordinates,
                amenity,
            )),
            (name, coordinates, amenity) => Err(FormErrors {
                ok_name: name.is_some(),
                ok_coords: coordinates.is_some(),
                ok_type: amenity.is_some(),
            }),
        }
    }

    fn resolve_amenity(&self, catalog: &AmenityCatalog) -> Option<String> {
        let selected = self.amenity.trim();
        if !catalog.accepts(selected) {
            return None;
        }
        if selected == NO_AMENITY {
            non_empty(&self.new_amenity)
        } else {
            Some(selected.to_string())
        }
    }
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Values that `Decimal` cannot hold without rounding are rejected.
fn parse_coordinate(raw: &str) -> Option<Decimal> {
    Decimal::from_str_exact(raw.trim()).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> AmenityCatalog {
        AmenityCatalog::from_json(r#"[["none", "Other"], ["cafe", "Cafe"], ["pub", "Pub"]]"#)
            .unwrap()
    }

    fn form(name: &str, lat: &str, lon: &str, amenity: &str, new_amenity: &str) -> PointForm {
        PointForm {
            name: name.to_string(),
            url: String::new(),
            lat: lat.to_string(),
            lon: lon.to_string(),
            amenity: amenity.to_string(),
            new_amenity: new_amenity.to_string(),
        }
    }

    #[test]
    fn test_valid_form() {
        let fields = form("Cafe X", "45.0", "7.0", "cafe", "")
            .validate(&catalog())
            .unwrap();

        assert_eq!(fields.name(), "Cafe X");
        assert_eq!(fields.amenity(), "cafe");
        assert_eq!(fields.url(), None);
        assert_eq!(fields.coordinates().latitude().to_string(), "45.0");
        assert_eq!(fields.coordinates().longitude().to_string(), "7.0");
    }

    #[test]
    fn test_name_is_trimmed_and_required() {
        let errors = form("   ", "45", "7", "cafe", "").validate(&catalog()).unwrap_err();
        assert_eq!(
            errors,
            FormErrors {
                ok_name: false,
                ok_coords: true,
                ok_type: true
            }
        );

        let fields = form("  Bar  ", "45", "7", "pub", "").validate(&catalog()).unwrap();
        assert_eq!(fields.name(), "Bar");
    }

    #[test]
    fn test_out_of_range_coordinates() {
        for (lat, lon) in [("90.1", "0"), ("-91", "0"), ("0", "180.01"), ("0", "-200")] {
            let errors = form("X", lat, lon, "cafe", "").validate(&catalog()).unwrap_err();
            assert!(!errors.ok_coords, "expected {lat},{lon} to be rejected");
            assert!(errors.ok_name && errors.ok_type);
        }
    }

    #[test]
    fn test_unparseable_coordinates() {
        let errors = form("X", "north", "", "cafe", "").validate(&catalog()).unwrap_err();
        assert!(!errors.ok_coords);
    }

    #[test]
    fn test_freeform_amenity_used_with_sentinel() {
        let fields = form("X", "1", "2", "none", " hackerspace ")
            .validate(&catalog())
            .unwrap();
        assert_eq!(fields.amenity(), "hackerspace");
    }

    #[test]
    fn test_sentinel_without_freeform_is_category_error() {
        let errors = form("X", "1", "2", "none", "").validate(&catalog()).unwrap_err();
        assert_eq!(
            errors,
            FormErrors {
                ok_name: true,
                ok_coords: true,
                ok_type: false
            }
        );
    }

    #[test]
    fn test_unknown_amenity_is_category_error() {
        let errors = form("X", "1", "2", "spaceport", "").validate(&catalog()).unwrap_err();
        assert!(!errors.ok_type);

        let errors = form("X", "1", "2", "", "").validate(&catalog()).unwrap_err();
        assert!(!errors.ok_type);
    }

    #[test]
    fn test_listed_amenity_ignores_freeform() {
        let fields = form("X", "1", "2", "pub", "brewery").validate(&catalog()).unwrap();
        assert_eq!(fields.amenity(), "pub");
    }

    #[test]
    fn test_all_failures_reported_together() {
        let errors = form("", "100", "7", "none", "").validate(&catalog()).unwrap_err();
        assert_eq!(
            errors,
            FormErrors {
                ok_name: false,
                ok_coords: false,
                ok_type: false
            }
        );
        assert_eq!(errors.to_string(), "invalid name, coordinates, amenity");
    }

    #[test]
    fn test_empty_url_is_absent() {
        let mut f = form("X", "1", "2", "cafe", "");
        f.url = "  ".to_string();
        assert_eq!(f.validate(&catalog()).unwrap().url(), None);

        f.url = "https://example.org".to_string();
        assert_eq!(f.validate(&catalog()).unwrap().url(), Some("https://example.org"));
    }

    #[test]
    fn test_coordinates_kept_exactly() {
        let lat = "45.12345678901234567890123456";
        let fields = form("X", lat, "-7.000100", "cafe", "").validate(&catalog()).unwrap();

        assert_eq!(fields.coordinates().latitude().to_string(), lat);
        assert_eq!(fields.coordinates().longitude().to_string(), "-7.000100");
    }

    #[test]
    fn test_coordinates_needing_rounding_rejected() {
        let errors = form("X", "45.12345678901234567890123456789", "7", "cafe", "")
            .validate(&catalog())
            .unwrap_err();
        assert!(!errors.ok_coords);
        assert!(errors.ok_name && errors.ok_type);
    }
}
