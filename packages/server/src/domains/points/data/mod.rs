pub mod fields;
pub mod point_form;

pub use fields::{Coordinates, NewPoint, PointFields};
pub use point_form::{FormErrors, PointForm};
