use axum::{
    extract::{FromRequestParts, Path, Query},
    http::{request::Parts, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;

use crate::error::ErrorResponse;
use crate::units::Units;
use crate::AppState;

/// Query parameters shared by weather and forecast requests
#[derive(Debug, Deserialize)]
pub struct WeatherQuery {
    /// City name from query string
    pub city: Option<String>,
    /// Units: metric or imperial
    pub units: Option<Units>,
}

/// City taken from the path, then the query string, then the configured default
#[derive(Debug)]
pub struct CityParam(pub String);

impl FromRequestParts<AppState> for CityParam {
    type Rejection = ParamRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if let Ok(Path(city)) = Path::<String>::from_request_parts(parts, state).await {
            let city = city.trim();
            if !city.is_empty() {
                return Ok(CityParam(city.to_string()));
            }
        }

        if let Ok(Query(query)) = Query::<WeatherQuery>::from_request_parts(parts, state).await {
            if let Some(city) = query.city.as_deref().map(str::trim).filter(|c| !c.is_empty()) {
                return Ok(CityParam(city.to_string()));
            }
        }

        state
            .config
            .startup_city()
            .map(|city| CityParam(city.to_string()))
            .ok_or_else(|| {
                ParamRejection("City is required: pass it in the path or as ?city=".to_string())
            })
    }
}

/// Units from the query string, falling back to the configured default
#[derive(Debug)]
pub struct UnitsParam(pub Units);

impl FromRequestParts<AppState> for UnitsParam {
    type Rejection = ParamRejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match Query::<WeatherQuery>::from_request_parts(parts, state).await {
            Ok(Query(query)) => Ok(UnitsParam(query.units.unwrap_or(state.config.units))),
            Err(_) => Err(ParamRejection(
                "Invalid units: expected metric or imperial".to_string(),
            )),
        }
    }
}

/// Rejection for city/units extraction failures
#[derive(Debug)]
pub struct ParamRejection(pub String);

impl IntoResponse for ParamRejection {
    fn into_response(self) -> Response {
        (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::with_code(self.0, "INVALID_PARAMETER")),
        )
            .into_response()
    }
}
