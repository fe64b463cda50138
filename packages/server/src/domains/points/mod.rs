pub mod actions;
pub mod amenities;
pub mod data;
pub mod errors;
pub mod models;
pub mod seed;

pub use amenities::{Amenity, AmenityCatalog, NO_AMENITY};
pub use errors::PointError;
pub use models::Point;
