use axum::{extract::State, Json};

use super::models::{DailyForecastResponse, DetailedForecastResponse};
use super::service::ForecastError;
use crate::extractors::{CityParam, UnitsParam};
use crate::AppState;

/// One representative reading per day with that day's min/max
///
/// GET /forecast/daily/{city}?units=metric
pub async fn get_daily_forecast(
    State(state): State<AppState>,
    CityParam(city): CityParam,
    UnitsParam(units): UnitsParam,
) -> Result<Json<DailyForecastResponse>, ForecastError> {
    let days = state
        .forecast_service
        .get_daily_forecast(&city, units)
        .await?;

    Ok(Json(DailyForecastResponse { city, units, days }))
}

/// Every 3-hour sample, for charting
///
/// GET /forecast/detailed/{city}?units=metric
pub async fn get_detailed_forecast(
    State(state): State<AppState>,
    CityParam(city): CityParam,
    UnitsParam(units): UnitsParam,
) -> Result<Json<DetailedForecastResponse>, ForecastError> {
    let points = state
        .forecast_service
        .get_detailed_forecast(&city, units)
        .await?;

    Ok(Json(DetailedForecastResponse {
        city,
        units,
        points,
    }))
}
