use carros_web::api_client::CarApiClient;
use carros_web::app::{self, RateLimit};
use carros_web::config::Config;
use carros_web::handlers::AppState;
use carros_web::search;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the application.
///
/// This function initializes the application, including:
/// - Logging and tracing.
/// - Configuration loading.
/// - The car service client and the startup catalog (types, fuels).
/// - Session storage.
/// - HTTP routes and middleware (CORS, Rate Limiting).
///
/// It then starts the Axum server.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carros_web=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;

    let api = CarApiClient::new(&config.api_url, config.api_timeout())?;
    tracing::info!("✓ Car service client initialized: {}", api.base_url());

    // Types and fuels are read once; every session shares them
    let catalog = search::load_catalog(&api, config.example_fallback).await;
    if catalog.load_failed {
        tracing::warn!("Starting with fallback catalog; new sessions will see an error notice");
    }

    let app_state = Arc::new(AppState::new(config.clone(), api, catalog));
    tracing::info!(
        "Session store initialized ({}s idle TTL)",
        config.session_ttl_secs
    );

    // Form submissions are rate limited; the page and autocomplete are not
    let router = app::router(app_state, Some(RateLimit::default()))?;

    // Start server
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(
        listener,
        router.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
