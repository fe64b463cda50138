// Minimal client for the OpenStreetMap editing API (v0.6).
// https://wiki.openstreetmap.org/wiki/API_v0.6

pub mod models;

use reqwest::{header, Client, StatusCode};
use thiserror::Error;

pub use crate::models::{Changeset, NewNode};

#[derive(Debug, Clone)]
pub struct OsmOptions {
    /// Base URL of the API server, e.g. `https://api.openstreetmap.org`.
    pub api_url: String,
    pub username: String,
    pub password: String,
}

#[derive(Debug, Error)]
pub enum OsmError {
    #[error("request to OSM API failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("OSM API returned {status}: {body}")]
    Rejected { status: StatusCode, body: String },

    #[error("unexpected OSM API response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone)]
pub struct OsmService {
    options: OsmOptions,
    client: Client,
}

impl OsmService {
    pub fn new(options: OsmOptions) -> Self {
        Self {
            options,
            client: Client::new(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/api/0.6/{}",
            self.options.api_url.trim_end_matches('/'),
            path
        )
    }

    async fn put(&self, path: &str, body: String) -> Result<String, OsmError> {
        let response = self
            .client
            .put(self.endpoint(path))
            .basic_auth(&self.options.username, Some(&self.options.password))
            .header(header::CONTENT_TYPE, "text/xml; charset=utf-8")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            return Err(OsmError::Rejected { status, body: text });
        }
        Ok(text)
    }

    /// Open a changeset and return its id.
    pub async fn create_changeset(&self, changeset: &Changeset) -> Result<u64, OsmError> {
        let body = self.put("changeset/create", changeset.to_xml()).await?;
        parse_id(&body)
    }

    /// Create a node inside an open changeset and return the new node id.
    pub async fn create_node(&self, changeset_id: u64, node: &NewNode) -> Result<u64, OsmError> {
        let body = self.put("node/create", node.to_xml(changeset_id)).await?;
        parse_id(&body)
    }

    pub async fn close_changeset(&self, changeset_id: u64) -> Result<(), OsmError> {
        self.put(&format!("changeset/{}/close", changeset_id), String::new())
            .await
            .map(|_| ())
    }

    /// Upload a single node in its own changeset.
    ///
    /// The changeset is closed even when node creation fails; the node error
    /// takes precedence over a close error.
    pub async fn upload_node(
        &self,
        changeset: &Changeset,
        node: &NewNode,
    ) -> Result<u64, OsmError> {
        let changeset_id = self.create_changeset(changeset).await?;
        let created = self.create_node(changeset_id, node).await;
        let closed = self.close_changeset(changeset_id).await;

        let node_id = created?;
        closed?;
        Ok(node_id)
    }
}

fn parse_id(body: &str) -> Result<u64, OsmError> {
    body.trim()
        .parse()
        .map_err(|_| OsmError::InvalidResponse(body.to_string()))
}
