use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// What a toggle did to the persisted list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ToggleOutcome {
    Added,
    Removed,
    /// Blank input, or the write failed; the file is unchanged
    Ignored,
}

/// Request body naming a city
#[derive(Debug, Deserialize, ToSchema)]
pub struct FavouriteRequest {
    pub city: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FavouritesResponse {
    pub favourites: Vec<String>,
}

/// Response to add/remove
#[derive(Debug, Serialize, ToSchema)]
pub struct FavouriteChangeResponse {
    /// Whether the persisted list changed
    pub changed: bool,
    pub favourites: Vec<String>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ToggleResponse {
    pub outcome: ToggleOutcome,
    pub favourites: Vec<String>,
}
