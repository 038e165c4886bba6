use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use super::models::CurrentConditions;
use super::service::WeatherError;
use crate::extractors::{CityParam, UnitsParam};
use crate::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Health check endpoint
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Current conditions for a city
///
/// GET /weather/{city}?units=metric
pub async fn get_weather(
    State(state): State<AppState>,
    CityParam(city): CityParam,
    UnitsParam(units): UnitsParam,
) -> Result<Json<CurrentConditions>, WeatherError> {
    let conditions = state
        .weather_service
        .get_current_conditions(&city, units)
        .await?;
    Ok(Json(conditions))
}
