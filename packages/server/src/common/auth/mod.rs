/// Authorization module for OsmPoint
///
/// Provides a fluent API for authorization checks in action code:
///
/// ```rust,ignore
/// use crate::common::auth::{Actor, AdminCapability};
///
/// Actor::new(identity)
///     .can(AdminCapability::SendPoints)
///     .check(deps)?;
/// ```
///
/// Admin status is never carried in the session; it is looked up against
/// the configured allow-list on every check.

mod errors;
mod capability;
mod builder;

pub use errors::AuthError;
pub use capability::AdminCapability;
pub use builder::{Actor, CapabilityBuilder, HasAuthContext};
