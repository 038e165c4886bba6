use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::Serialize;
use utoipa::ToSchema;

use crate::forecast::{DailySummary, DetailedPoint};
use crate::units::Units;
use crate::weather::CurrentConditions;

/// Why the last search could not be shown in full
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum DashboardFailure {
    /// The provider does not know the city
    BadLocation,
    /// Current conditions could not be fetched at all
    NoNetwork,
    /// Current conditions arrived but the forecast did not
    ForecastUnavailable,
}

impl DashboardFailure {
    /// Short status line for the user
    pub fn status_message(self) -> &'static str {
        match self {
            Self::BadLocation => "Bad Location",
            Self::NoNetwork => "Network Not Found",
            Self::ForecastUnavailable => "Could not get Forecast",
        }
    }
}

/// What the dashboard surface can be told to display.
///
/// Setters are synchronous and must not block; they are called from async
/// tasks. Failures leave previously shown sections in place.
pub trait DashboardView: Send + Sync {
    fn show_loading(&self, city: &str, units: Units);
    fn show_current(&self, conditions: &CurrentConditions, units: Units);
    fn show_daily(&self, days: &[DailySummary]);
    fn show_detailed(&self, points: &[DetailedPoint]);
    /// Drop forecast sections that belong to a previous city
    fn clear_forecast(&self);
    fn show_error(&self, failure: DashboardFailure);
    /// Search finished without errors
    fn clear_status(&self);
    /// `selected` is the current city when it is a favourite
    fn show_favourites(&self, favourites: &[String], selected: Option<&str>);
}

/// Everything currently on the dashboard
#[derive(Debug, Clone, Default, Serialize, ToSchema)]
pub struct DashboardSnapshot {
    /// City of the last search, as typed
    pub city: Option<String>,
    pub units: Units,
    pub temperature_symbol: String,
    pub loading: bool,
    pub status: Option<String>,
    pub error: Option<DashboardFailure>,
    pub current: Option<CurrentConditions>,
    pub daily: Vec<DailySummary>,
    pub detailed: Vec<DetailedPoint>,
    pub favourites: Vec<String>,
    pub selected_favourite: Option<String>,
    /// Label for the save/remove button
    pub favourite_action: String,
    #[schema(value_type = Option<String>, format = DateTime)]
    pub updated_at: Option<DateTime<Utc>>,
}

/// In-memory view holding the latest snapshot, served over HTTP
pub struct SnapshotView {
    state: RwLock<DashboardSnapshot>,
}

impl SnapshotView {
    pub fn new() -> Self {
        let snapshot = DashboardSnapshot {
            temperature_symbol: Units::default().temperature_symbol().to_string(),
            favourite_action: favourite_action(false).to_string(),
            ..DashboardSnapshot::default()
        };
        Self {
            state: RwLock::new(snapshot),
        }
    }

    pub fn snapshot(&self) -> DashboardSnapshot {
        self.state.read().clone()
    }
}

impl Default for SnapshotView {
    fn default() -> Self {
        Self::new()
    }
}

fn favourite_action(is_favourite: bool) -> &'static str {
    if is_favourite {
        "Remove from Favourites"
    } else {
        "Save to Favourites"
    }
}

impl DashboardView for SnapshotView {
    fn show_loading(&self, city: &str, units: Units) {
        let mut state = self.state.write();
        state.city = Some(city.to_string());
        state.units = units;
        state.temperature_symbol = units.temperature_symbol().to_string();
        state.loading = true;
        state.status = Some("Loading...".to_string());
        state.error = None;
    }

    fn show_current(&self, conditions: &CurrentConditions, units: Units) {
        let mut state = self.state.write();
        state.current = Some(conditions.clone());
        state.units = units;
        state.temperature_symbol = units.temperature_symbol().to_string();
        state.updated_at = Some(Utc::now());
    }

    fn show_daily(&self, days: &[DailySummary]) {
        self.state.write().daily = days.to_vec();
    }

    fn show_detailed(&self, points: &[DetailedPoint]) {
        self.state.write().detailed = points.to_vec();
    }

    fn clear_forecast(&self) {
        let mut state = self.state.write();
        state.daily.clear();
        state.detailed.clear();
    }

    fn show_error(&self, failure: DashboardFailure) {
        let mut state = self.state.write();
        state.loading = false;
        state.error = Some(failure);
        state.status = Some(failure.status_message().to_string());
    }

    fn clear_status(&self) {
        let mut state = self.state.write();
        state.loading = false;
        state.error = None;
        state.status = None;
    }

    fn show_favourites(&self, favourites: &[String], selected: Option<&str>) {
        let mut state = self.state.write();
        state.favourites = favourites.to_vec();
        state.selected_favourite = selected.map(str::to_string);
        state.favourite_action = favourite_action(selected.is_some()).to_string();
    }
}
