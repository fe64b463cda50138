// Main entry point for the OsmPoint server

use std::sync::Arc;

use anyhow::{Context, Result};
use osm::{OsmOptions, OsmService};
use osmpoint_core::domains::auth::JwtService;
use osmpoint_core::domains::points::seed::{load_seed_points, seed_points};
use osmpoint_core::domains::points::AmenityCatalog;
use osmpoint_core::kernel::{OpenIdClient, OsmAdapter, PostgresPointStore, ServerDeps};
use osmpoint_core::{server::build_app, Config};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,osmpoint_core=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting OsmPoint");

    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    tracing::info!(
        base_url = %config.base_url,
        admins = config.admin_identifiers.len(),
        "Configuration loaded"
    );

    let amenities = AmenityCatalog::load(config.amenities_path.as_deref())
        .context("Failed to load amenity list")?;
    let seeds = load_seed_points(config.imported_points_path.as_deref())?;

    // Connect to database
    tracing::info!("Connecting to database...");
    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")?;
    tracing::info!("Database connected");

    // Run migrations
    tracing::info!("Running database migrations...");
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;
    tracing::info!("Migrations complete");

    let osm = Arc::new(OsmService::new(OsmOptions {
        api_url: config.osm_api_url.clone(),
        username: config.osm_username.clone(),
        password: config.osm_password.clone(),
    }));

    let deps = ServerDeps::new(
        Arc::new(PostgresPointStore::new(pool)),
        Arc::new(OsmAdapter::new(osm)),
        Arc::new(OpenIdClient::new(config.realm())?),
        Arc::new(JwtService::new(
            &config.session_secret,
            config.session_issuer.clone(),
        )),
        Arc::new(amenities),
        config.admin_identifiers.clone(),
    );

    seed_points(seeds, &deps)
        .await
        .context("Failed to import seed points")?;

    // Build application
    let app = build_app(deps, config.base_url.clone());

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("Starting server on {}", addr);
    tracing::info!("Health check: http://localhost:{}/health", config.port);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .context("Failed to bind to address")?;

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
