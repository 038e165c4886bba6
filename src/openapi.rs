use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::dashboard::handlers::{
    FavouriteAction, FavouriteActionRequest, FavouriteActionResponse, SearchRequest,
    SearchResponse,
};
use crate::dashboard::{DashboardFailure, DashboardSnapshot, SearchOutcome};
use crate::error::ErrorResponse;
use crate::favourites::models::{
    FavouriteChangeResponse, FavouriteRequest, FavouritesResponse, ToggleResponse,
};
use crate::favourites::ToggleOutcome;
use crate::forecast::models::{DailyForecastResponse, DetailedForecastResponse};
use crate::forecast::{DailySummary, DetailedPoint};
use crate::geolocation::handlers::LocationResponse;
use crate::units::Units;
use crate::weather::handlers::HealthResponse;
use crate::weather::CurrentConditions;

/// OpenAPI documentation for the Weather View API
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Weather View API",
        version = "0.1.0",
        description = "Current conditions, five-day forecasts, saved favourite cities and a self-refreshing dashboard, backed by OpenWeatherMap.",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        )
    ),
    tags(
        (name = "weather", description = "Current conditions"),
        (name = "forecast", description = "Daily summaries and the 3-hour series"),
        (name = "favourites", description = "Saved cities"),
        (name = "location", description = "IP-based city detection"),
        (name = "dashboard", description = "Dashboard state and actions")
    ),
    components(
        schemas(
            ErrorResponse,
            HealthResponse,
            Units,
            CurrentConditions,
            DailySummary,
            DetailedPoint,
            DailyForecastResponse,
            DetailedForecastResponse,
            FavouriteRequest,
            FavouritesResponse,
            FavouriteChangeResponse,
            ToggleOutcome,
            ToggleResponse,
            LocationResponse,
            DashboardFailure,
            DashboardSnapshot,
            SearchOutcome,
            SearchRequest,
            SearchResponse,
            FavouriteAction,
            FavouriteActionRequest,
            FavouriteActionResponse,
        )
    )
)]
pub struct ApiDoc;

/// Create the Swagger UI router
pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi())
}
