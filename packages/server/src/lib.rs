// OsmPoint - crowdsourced points of interest for OpenStreetMap
//
// Users submit points through a web form; administrators review them and
// upload accepted points to OpenStreetMap.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
