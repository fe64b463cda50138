//! Auth domain - handles login via OpenID
//!
//! Responsibilities:
//! - Driving the OpenID handshake through the identity provider
//! - Session token management
//! - Keeping post-login redirects on this site

pub mod jwt;
pub mod login;

pub use jwt::{Claims, JwtService, SESSION_TTL_HOURS};
pub use login::{begin_login, complete_login, safe_next};
