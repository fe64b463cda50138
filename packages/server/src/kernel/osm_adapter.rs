// =============================================================================
// OsmService Adapter (implements BaseMapSubmitter trait)
// =============================================================================

use anyhow::Result;
use async_trait::async_trait;
use osm::{Changeset, NewNode, OsmService};
use std::sync::Arc;

use super::BaseMapSubmitter;
use crate::domains::points::models::Point;

pub const CREATED_BY: &str = concat!("OsmPoint ", env!("CARGO_PKG_VERSION"));

/// Wrapper around OsmService that implements BaseMapSubmitter trait
pub struct OsmAdapter(pub Arc<OsmService>);

impl OsmAdapter {
    pub fn new(service: Arc<OsmService>) -> Self {
        Self(service)
    }
}

/// Build the node uploaded for `point`.
pub fn node_for_point(point: &Point) -> NewNode {
    let mut node = NewNode::new(point.latitude.to_string(), point.longitude.to_string())
        .tag("name", &point.name)
        .tag("amenity", &point.amenity);
    if let Some(url) = &point.url {
        node = node.tag("website", url);
    }
    node
}

/// Build the changeset that carries a single approved point.
pub fn changeset_for_point(point: &Point, admin: &str) -> Changeset {
    Changeset {
        created_by: CREATED_BY.to_string(),
        comment: format!("Add {} \"{}\" (approved by {})", point.amenity, point.name, admin),
    }
}

#[async_trait]
impl BaseMapSubmitter for OsmAdapter {
    async fn submit(&self, point: &Point, admin: &str) -> Result<String> {
        let node_id = self
            .0
            .upload_node(&changeset_for_point(point, admin), &node_for_point(point))
            .await?;
        Ok(node_id.to_string())
    }
}
