mod cache;
mod config;
mod dashboard;
mod error;
mod extractors;
mod favourites;
mod forecast;
mod geolocation;
mod openapi;
mod routes;
mod units;
mod weather;

use axum::{error_handling::HandleErrorLayer, http::StatusCode, BoxError};
use reqwest::Client;
use std::{sync::Arc, time::Duration};
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cache::{create_feed_cache, start_cache_cleanup_task};
use crate::config::AppConfig;
use crate::dashboard::{Dashboard, DashboardView, OpenWeatherSource, SnapshotView, WeatherSource};
use crate::favourites::FavouritesStore;
use crate::forecast::ForecastService;
use crate::geolocation::GeolocationService;
use crate::weather::WeatherService;

/// Shared HTTP client configuration
const HTTP_TIMEOUT_SECS: u64 = 30;
const HTTP_CONNECT_TIMEOUT_SECS: u64 = 5;
const HTTP_POOL_IDLE_TIMEOUT_SECS: u64 = 90;

/// How often expired forecast feeds are swept
const CACHE_CLEANUP_SECS: u64 = 300;

#[derive(Clone)]
pub struct AppState {
    pub weather_service: Arc<WeatherService>,
    pub forecast_service: Arc<ForecastService>,
    pub favourites: Arc<FavouritesStore>,
    pub geolocation: Arc<GeolocationService>,
    pub dashboard: Arc<Dashboard>,
    pub snapshot: Arc<SnapshotView>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    /// Wire every service from the configuration around one HTTP client
    pub fn from_config(config: AppConfig, http_client: Client) -> Self {
        let endpoints = &config.endpoints;

        let feed_cache = create_feed_cache(Duration::from_secs(config.forecast_cache_secs));
        let weather_service = Arc::new(WeatherService::new(
            http_client.clone(),
            &config.openweathermap_api_key,
            &endpoints.openweathermap_base_url,
        ));
        let forecast_service = Arc::new(ForecastService::new(
            http_client.clone(),
            &config.openweathermap_api_key,
            &endpoints.openweathermap_base_url,
            feed_cache,
        ));
        let geolocation = Arc::new(GeolocationService::new(
            http_client.clone(),
            &endpoints.ipinfo_url,
            &endpoints.nominatim_url,
            &config.geolocation_email,
        ));
        let favourites = Arc::new(FavouritesStore::new(&config.favourites_path));

        let snapshot = Arc::new(SnapshotView::new());
        let view: Arc<dyn DashboardView> = snapshot.clone();
        let source: Arc<dyn WeatherSource> = Arc::new(OpenWeatherSource::new(
            Arc::clone(&weather_service),
            Arc::clone(&forecast_service),
        ));
        let dashboard = Arc::new(Dashboard::new(source, Arc::clone(&favourites), view));

        Self {
            weather_service,
            forecast_service,
            favourites,
            geolocation,
            dashboard,
            snapshot,
            config: Arc::new(config),
        }
    }

    /// Load the startup city in the background: the configured default,
    /// else wherever the IP says we are
    pub fn spawn_startup(&self) -> JoinHandle<()> {
        let dashboard = Arc::clone(&self.dashboard);
        let geolocation = Arc::clone(&self.geolocation);
        let config = Arc::clone(&self.config);
        tokio::spawn(async move {
            let startup_city = match config.startup_city() {
                Some(city) => Some(city.to_string()),
                None => geolocation.detect_city().await,
            };
            dashboard.bootstrap(startup_city, config.units).await;
        })
    }
}

/// Create shared HTTP client with connection pooling
fn create_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
        .connect_timeout(Duration::from_secs(HTTP_CONNECT_TIMEOUT_SECS))
        .pool_idle_timeout(Duration::from_secs(HTTP_POOL_IDLE_TIMEOUT_SECS))
        .pool_max_idle_per_host(10)
        .build()
}

/// Handle request timeout errors
async fn handle_timeout_error(err: BoxError) -> (StatusCode, String) {
    if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "Request timed out".to_string())
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Internal error: {}", err),
        )
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl+c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "weatherview=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load()?;
    tracing::info!(
        units = %config.units,
        favourites = %config.favourites_path,
        "Configuration loaded successfully"
    );

    let http_client = create_http_client()?;
    tracing::debug!("Shared HTTP client created");

    let state = AppState::from_config(config.clone(), http_client);

    start_cache_cleanup_task(
        state.forecast_service.feed_cache(),
        Duration::from_secs(CACHE_CLEANUP_SECS),
    );

    let startup_task = state.spawn_startup();
    let refresh_task = state
        .dashboard
        .spawn_auto_refresh(Duration::from_secs(config.refresh_interval_secs));

    let app = routes::build_router()
        .layer(
            ServiceBuilder::new()
                // Handle timeout errors
                .layer(HandleErrorLayer::new(handle_timeout_error))
                // Request timeout (60 seconds for slow API calls)
                .timeout(Duration::from_secs(60)),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server with graceful shutdown
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    startup_task.abort();
    refresh_task.abort();
    tracing::info!("Server shutdown complete");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_config;
    use serde_json::json;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn state_for(server: &MockServer, dir: &TempDir) -> AppState {
        let mut config = test_config();
        config.favourites_path = dir
            .path()
            .join("favourites.json")
            .to_string_lossy()
            .into_owned();
        config.endpoints.openweathermap_base_url = server.uri();
        config.endpoints.ipinfo_url = format!("{}/json", server.uri());
        config.endpoints.nominatim_url = format!("{}/reverse", server.uri());
        AppState::from_config(config, Client::new())
    }

    #[tokio::test]
    async fn test_from_config_wires_dashboard_to_snapshot() {
        let server = MockServer::start().await;
        let dir = TempDir::new().unwrap();
        let state = state_for(&server, &dir);

        state.favourites.add("Quito").await;
        state.dashboard.refresh_favourites().await;

        assert_eq!(state.snapshot.snapshot().favourites, vec!["Quito"]);
    }

    #[tokio::test]
    async fn test_startup_does_not_block_on_slow_geolocation() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"loc": "1.0,2.0"}))
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"address": {"city": "Nowhere"}})),
            )
            .mount(&server)
            .await;
        let dir = TempDir::new().unwrap();
        let state = state_for(&server, &dir);

        let started = std::time::Instant::now();
        let task = state.spawn_startup();
        assert!(started.elapsed() < Duration::from_millis(100));
        assert!(state.snapshot.snapshot().city.is_none());

        task.await.unwrap();
        assert_eq!(state.snapshot.snapshot().city.as_deref(), Some("Nowhere"));
    }
}
