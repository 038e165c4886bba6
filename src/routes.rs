use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::dashboard::handlers as dashboard_handlers;
use crate::favourites::handlers as favourites_handlers;
use crate::forecast::handlers as forecast_handlers;
use crate::geolocation::handlers as geolocation_handlers;
use crate::openapi::swagger_ui;
use crate::weather::handlers as weather_handlers;
use crate::AppState;

/// Build the weather API routes
fn weather_routes() -> Router<AppState> {
    Router::new()
        .route("/weather", get(weather_handlers::get_weather))
        .route("/weather/{city}", get(weather_handlers::get_weather))
}

/// Build the forecast API routes
fn forecast_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/forecast/daily",
            get(forecast_handlers::get_daily_forecast),
        )
        .route(
            "/forecast/daily/{city}",
            get(forecast_handlers::get_daily_forecast),
        )
        .route(
            "/forecast/detailed",
            get(forecast_handlers::get_detailed_forecast),
        )
        .route(
            "/forecast/detailed/{city}",
            get(forecast_handlers::get_detailed_forecast),
        )
}

/// Build the favourites API routes
fn favourites_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/favourites",
            get(favourites_handlers::list_favourites).post(favourites_handlers::add_favourite),
        )
        .route(
            "/favourites/toggle",
            post(favourites_handlers::toggle_favourite),
        )
        .route(
            "/favourites/{city}",
            delete(favourites_handlers::remove_favourite),
        )
}

/// Build the dashboard API routes
fn dashboard_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(dashboard_handlers::get_dashboard))
        .route("/dashboard/search", post(dashboard_handlers::search))
        .route("/dashboard/units", post(dashboard_handlers::toggle_units))
        .route("/dashboard/favourite", post(dashboard_handlers::favourite))
}

/// Build all API v1 routes
pub fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(weather_routes())
        .merge(forecast_routes())
        .merge(favourites_routes())
        .merge(dashboard_routes())
        .route("/location", get(geolocation_handlers::get_location))
}

/// Build the complete application router
pub fn build_router() -> Router<AppState> {
    Router::new()
        // Health check at root level
        .route("/", get(weather_handlers::health))
        .route("/health", get(weather_handlers::health))
        // API v1 routes
        .nest("/api/v1", api_v1_routes())
        // Swagger UI for API documentation
        .merge(swagger_ui())
}
