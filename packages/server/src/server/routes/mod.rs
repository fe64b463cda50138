// HTTP routes
pub mod auth;
pub mod health;
pub mod pages;
pub mod points;

pub use auth::*;
pub use health::*;
pub use pages::*;
pub use points::*;
