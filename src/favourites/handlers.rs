use axum::{
    extract::{Path, State},
    Json,
};

use super::models::{
    FavouriteChangeResponse, FavouriteRequest, FavouritesResponse, ToggleResponse,
};
use crate::AppState;

/// GET /favourites - List favourite cities in saved order
pub async fn list_favourites(State(state): State<AppState>) -> Json<FavouritesResponse> {
    Json(FavouritesResponse {
        favourites: state.favourites.load().await,
    })
}

/// POST /favourites - Save a city
pub async fn add_favourite(
    State(state): State<AppState>,
    Json(request): Json<FavouriteRequest>,
) -> Json<FavouriteChangeResponse> {
    let changed = state.favourites.add(&request.city).await;
    Json(FavouriteChangeResponse {
        changed,
        favourites: state.favourites.load().await,
    })
}

/// DELETE /favourites/{city} - Remove a city
pub async fn remove_favourite(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Json<FavouriteChangeResponse> {
    let changed = state.favourites.remove(&city).await;
    Json(FavouriteChangeResponse {
        changed,
        favourites: state.favourites.load().await,
    })
}

/// POST /favourites/toggle - Add the city if absent, remove it if present
pub async fn toggle_favourite(
    State(state): State<AppState>,
    Json(request): Json<FavouriteRequest>,
) -> Json<ToggleResponse> {
    let outcome = state.favourites.toggle(&request.city).await;
    Json(ToggleResponse {
        outcome,
        favourites: state.favourites.load().await,
    })
}
