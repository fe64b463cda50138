use super::{AdminCapability, AuthError};
use tracing::debug;

/// Entry point for authorization checks
///
/// Usage:
/// ```rust,ignore
/// Actor::from_session(user.map(|u| u.identity))
///     .can(AdminCapability::DeletePoints)
///     .check(deps)?;
/// ```
#[derive(Debug, Clone)]
pub struct Actor {
    identity: Option<String>,
}

impl Actor {
    /// Create an actor for an authenticated identity
    pub fn new(identity: impl Into<String>) -> Self {
        Self {
            identity: Some(identity.into()),
        }
    }

    /// Create an actor from an optional session identity
    pub fn from_session(identity: Option<String>) -> Self {
        Self { identity }
    }

    pub fn anonymous() -> Self {
        Self { identity: None }
    }

    pub fn identity(&self) -> Option<&str> {
        self.identity.as_deref()
    }

    /// Whether this actor is on the admin allow-list
    pub fn is_admin<D>(&self, deps: &D) -> bool
    where
        D: HasAuthContext + ?Sized,
    {
        self.identity
            .as_deref()
            .is_some_and(|identity| deps.is_admin_identifier(identity))
    }

    /// Specify what capability the actor needs
    pub fn can(self, capability: AdminCapability) -> CapabilityBuilder {
        CapabilityBuilder {
            identity: self.identity,
            capability,
        }
    }
}

/// Builder after specifying capability
pub struct CapabilityBuilder {
    identity: Option<String>,
    capability: AdminCapability,
}

impl CapabilityBuilder {
    /// Perform the authorization check, returning the admin identity
    pub fn check<D>(self, deps: &D) -> Result<String, AuthError>
    where
        D: HasAuthContext + ?Sized,
    {
        let identity = self.identity.ok_or(AuthError::AuthenticationRequired)?;

        if !deps.is_admin_identifier(&identity) {
            debug!(
                identity = %identity,
                capability = self.capability.as_str(),
                "Admin capability denied"
            );
            return Err(AuthError::AdminRequired);
        }

        Ok(identity)
    }
}

/// Trait for dependencies that can perform auth checks
pub trait HasAuthContext: Send + Sync {
    fn admin_identifiers(&self) -> &[String];

    fn is_admin_identifier(&self, identity: &str) -> bool {
        self.admin_identifiers().iter().any(|admin| admin == identity)
    }
}
