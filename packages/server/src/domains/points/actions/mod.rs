//! Point actions - business logic functions
//!
//! Actions are called directly from HTTP handlers and return final models.

pub mod mutations;
pub mod queries;

pub use mutations::*;
pub use queries::*;
