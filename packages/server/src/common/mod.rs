// Common types and utilities shared across the application

pub mod auth;
pub mod entity_ids;

pub use auth::{Actor, AdminCapability, AuthError, HasAuthContext};
pub use entity_ids::*;
