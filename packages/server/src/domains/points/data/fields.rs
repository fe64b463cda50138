//! Validated point attributes.
//!
//! Values of these types only exist after validation, so anything that
//! reaches the store already satisfies the geographic and category
//! invariants.

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domains::points::models::Point;

const MAX_LATITUDE: Decimal = Decimal::from_parts(90, 0, 0, false, 0);
const MAX_LONGITUDE: Decimal = Decimal::from_parts(180, 0, 0, false, 0);

/// A latitude/longitude pair within geographic bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Coordinates {
    latitude: Decimal,
    longitude: Decimal,
}

impl Coordinates {
    /// Returns `None` when either value is out of range.
    pub fn new(latitude: Decimal, longitude: Decimal) -> Option<Self> {
        if latitude.abs() > MAX_LATITUDE || longitude.abs() > MAX_LONGITUDE {
            return None;
        }
        Some(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> Decimal {
        self.latitude
    }

    pub fn longitude(&self) -> Decimal {
        self.longitude
    }
}

/// The admin-editable attributes of a point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PointFields {
    name: String,
    url: Option<String>,
    coordinates: Coordinates,
    amenity: String,
}

impl PointFields {
    /// Callers must pass a trimmed non-empty name and amenity.
    pub(crate) fn new(
        name: String,
        url: Option<String>,
        coordinates: Coordinates,
        amenity: String,
    ) -> Self {
        debug_assert!(!name.is_empty() && !amenity.is_empty());
        Self {
            name,
            url,
            coordinates,
            amenity,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }

    pub fn amenity(&self) -> &str {
        &self.amenity
    }

    /// Copy every editable attribute onto `point`.
    ///
    /// `id`, `submitter` and `external_id` are never touched here.
    pub fn apply_to(&self, point: &mut Point) {
        point.name = self.name.clone();
        point.url = self.url.clone();
        point.latitude = self.coordinates.latitude();
        point.longitude = self.coordinates.longitude();
        point.amenity = self.amenity.clone();
    }

    /// Whether applying these fields would move or re-categorise `point`.
    pub fn changes_location_or_category(&self, point: &Point) -> bool {
        self.coordinates.latitude() != point.latitude
            || self.coordinates.longitude() != point.longitude
            || self.amenity != point.amenity
    }
}

/// Input for [`BasePointStore::create`](crate::kernel::BasePointStore::create).
#[derive(Debug, Clone)]
pub struct NewPoint {
    pub fields: PointFields,
    pub submitter: String,
}
