use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::controller::SearchOutcome;
use super::view::DashboardSnapshot;
use crate::extractors::ParamRejection;
use crate::favourites::ToggleOutcome;
use crate::units::Units;
use crate::AppState;

#[derive(Debug, Deserialize, ToSchema)]
pub struct SearchRequest {
    pub city: String,
    /// Defaults to the configured units
    pub units: Option<Units>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct SearchResponse {
    pub outcome: SearchOutcome,
    pub snapshot: DashboardSnapshot,
}

/// What to do with the city currently on the dashboard
#[derive(Debug, Clone, Copy, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum FavouriteAction {
    Save,
    Remove,
    Toggle,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct FavouriteActionRequest {
    #[serde(default = "default_action")]
    pub action: FavouriteAction,
}

fn default_action() -> FavouriteAction {
    FavouriteAction::Toggle
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FavouriteActionResponse {
    pub outcome: ToggleOutcome,
    pub snapshot: DashboardSnapshot,
}

/// GET /dashboard - Everything currently shown
pub async fn get_dashboard(State(state): State<AppState>) -> Json<DashboardSnapshot> {
    Json(state.snapshot.snapshot())
}

/// POST /dashboard/search - Search a city and wait for the result
pub async fn search(
    State(state): State<AppState>,
    Json(request): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ParamRejection> {
    if request.city.trim().is_empty() {
        return Err(ParamRejection("City must not be empty".to_string()));
    }

    let units = request.units.unwrap_or(state.config.units);
    let outcome = state.dashboard.search(&request.city, units).await;

    Ok(Json(SearchResponse {
        outcome,
        snapshot: state.snapshot.snapshot(),
    }))
}

/// POST /dashboard/units - Switch metric/imperial and reload the last city
pub async fn toggle_units(
    State(state): State<AppState>,
) -> Result<Json<SearchResponse>, ParamRejection> {
    let outcome = state.dashboard.toggle_units().await;
    if outcome == SearchOutcome::Rejected {
        return Err(ParamRejection("No city has been searched yet".to_string()));
    }

    Ok(Json(SearchResponse {
        outcome,
        snapshot: state.snapshot.snapshot(),
    }))
}

/// POST /dashboard/favourite - Save, remove or toggle the current city
pub async fn favourite(
    State(state): State<AppState>,
    Json(request): Json<FavouriteActionRequest>,
) -> Json<FavouriteActionResponse> {
    let dashboard = &state.dashboard;
    let outcome = match request.action {
        FavouriteAction::Save => {
            if dashboard.save_favourite().await {
                ToggleOutcome::Added
            } else {
                ToggleOutcome::Ignored
            }
        }
        FavouriteAction::Remove => {
            if dashboard.remove_favourite().await {
                ToggleOutcome::Removed
            } else {
                ToggleOutcome::Ignored
            }
        }
        FavouriteAction::Toggle => dashboard.toggle_favourite().await,
    };

    Json(FavouriteActionResponse {
        outcome,
        snapshot: state.snapshot.snapshot(),
    })
}
