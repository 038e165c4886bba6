use axum::{extract::State, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct LocationResponse {
    /// Detected city, or null when it could not be determined
    pub city: Option<String>,
}

/// GET /location - Best-effort city for the caller's public IP
pub async fn get_location(State(state): State<AppState>) -> Json<LocationResponse> {
    Json(LocationResponse {
        city: state.geolocation.detect_city().await,
    })
}
