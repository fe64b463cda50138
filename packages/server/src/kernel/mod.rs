//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod openid_client;
pub mod osm_adapter;
pub mod point_store;
pub mod test_dependencies;
pub mod traits;

pub use deps::ServerDeps;
pub use openid_client::OpenIdClient;
pub use osm_adapter::OsmAdapter;
pub use point_store::PostgresPointStore;
pub use test_dependencies::TestDependencies;
pub use traits::*;
