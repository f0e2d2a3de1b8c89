use std::sync::{Arc, Mutex};

use axum::routing::{get, post, put};
use axum::Router;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use genie::config::AppConfig;
use genie::db;
use genie::handlers;
use genie::services::catalog::ServiceCatalog;
use genie::services::notify::hub::BroadcastHub;
use genie::services::places::fallback::FallbackPlaces;
use genie::services::places::google::GooglePlaces;
use genie::services::places::PlacesProvider;
use genie::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    let catalog = ServiceCatalog::load(config.catalog_path.as_deref())?;
    tracing::info!(
        services = catalog.services().len(),
        categories = catalog.categories().len(),
        "catalog loaded"
    );

    let places: Box<dyn PlacesProvider> = if config.google_places_api_key.is_empty() {
        tracing::info!("using built-in sample places (no Places API key configured)");
        Box::new(FallbackPlaces)
    } else {
        tracing::info!("using Google Places provider search");
        Box::new(GooglePlaces::new(config.google_places_api_key.clone()))
    };

    let (events_tx, _) = broadcast::channel(256);

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        catalog,
        notifier: Box::new(BroadcastHub::new(events_tx.clone())),
        places,
        events_tx,
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/api/services", get(handlers::catalog::list_services))
        .route(
            "/api/services/search",
            get(handlers::catalog::search_services),
        )
        .route("/api/services/:id", get(handlers::catalog::get_service))
        .route("/api/categories/:id", get(handlers::catalog::get_category))
        .route(
            "/api/calculate-price",
            post(handlers::catalog::calculate_price),
        )
        .route(
            "/api/bookings",
            post(handlers::bookings::create_booking).get(handlers::bookings::list_bookings),
        )
        .route(
            "/api/bookings/open",
            get(handlers::bookings::list_open_bookings),
        )
        .route("/api/bookings/:id", get(handlers::bookings::get_booking))
        .route(
            "/api/bookings/:id/accept",
            post(handlers::bookings::accept_booking),
        )
        .route(
            "/api/bookings/:id/status",
            put(handlers::bookings::update_status),
        )
        .route(
            "/api/bookings/:id/cancel",
            post(handlers::bookings::cancel_booking),
        )
        .route("/api/events", get(handlers::events::events_stream))
        .route(
            "/api/providers/search",
            get(handlers::providers::search_providers),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
