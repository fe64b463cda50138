use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::env;
use std::path::PathBuf;

const DEFAULT_OSM_API_URL: &str = "https://api.openstreetmap.org";

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    /// Public URL of this server, without trailing slash
    pub base_url: String,
    pub session_secret: String,
    pub session_issuer: String,
    /// Identity URLs allowed to edit, delete and send points
    pub admin_identifiers: Vec<String>,
    pub amenities_path: Option<PathBuf>,
    pub imported_points_path: Option<PathBuf>,
    pub osm_api_url: String,
    pub osm_username: String,
    pub osm_password: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        let port: u16 = env::var("PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse()
            .context("PORT must be a valid number")?;

        Ok(Self {
            database_url: env::var("DATABASE_URL").context("DATABASE_URL must be set")?,
            port,
            base_url: env::var("BASE_URL")
                .unwrap_or_else(|_| format!("http://localhost:{}", port))
                .trim_end_matches('/')
                .to_string(),
            session_secret: env::var("SESSION_SECRET").context("SESSION_SECRET must be set")?,
            session_issuer: env::var("SESSION_ISSUER").unwrap_or_else(|_| "osmpoint".to_string()),
            admin_identifiers: parse_admins(&env::var("OSMPOINT_ADMINS").unwrap_or_default()),
            amenities_path: env::var("AMENITIES_PATH").ok().map(PathBuf::from),
            imported_points_path: env::var("IMPORTED_POINTS_PATH").ok().map(PathBuf::from),
            osm_api_url: env::var("OSM_API_URL")
                .unwrap_or_else(|_| DEFAULT_OSM_API_URL.to_string()),
            osm_username: env::var("OSM_USERNAME").context("OSM_USERNAME must be set")?,
            osm_password: env::var("OSM_PASSWORD").context("OSM_PASSWORD must be set")?,
        })
    }

    /// OpenID trust root: the base URL with a trailing slash
    pub fn realm(&self) -> String {
        format!("{}/", self.base_url)
    }
}

/// Split a comma-separated admin list, dropping blanks.
pub fn parse_admins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|admin| !admin.is_empty())
        .map(str::to_string)
        .collect()
}
