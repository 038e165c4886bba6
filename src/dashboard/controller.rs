use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use utoipa::ToSchema;

use super::source::WeatherSource;
use super::view::{DashboardFailure, DashboardView};
use crate::favourites::{FavouritesStore, ToggleOutcome};
use crate::units::Units;
use crate::weather::WeatherError;

/// How a dashboard search ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SearchOutcome {
    Completed,
    /// Shown on the view as a `DashboardFailure`
    Failed,
    /// A newer search started first; nothing from this one reached the view
    Superseded,
    /// Blank city, nothing fetched
    Rejected,
}

/// Drives a `DashboardView` from searches, favourites and the refresh timer.
///
/// Each search gets a generation number. Only the most recently started
/// search may update the view; results of older ones are dropped.
pub struct Dashboard {
    source: Arc<dyn WeatherSource>,
    favourites: Arc<FavouritesStore>,
    view: Arc<dyn DashboardView>,
    generation: AtomicU64,
    /// City and units the refresh timer re-runs
    last_search: Mutex<Option<(String, Units)>>,
    refresh_reset: Notify,
}

impl Dashboard {
    pub fn new(
        source: Arc<dyn WeatherSource>,
        favourites: Arc<FavouritesStore>,
        view: Arc<dyn DashboardView>,
    ) -> Self {
        Self {
            source,
            favourites,
            view,
            generation: AtomicU64::new(0),
            last_search: Mutex::new(None),
            refresh_reset: Notify::new(),
        }
    }

    /// Show the startup city if there is one, and the favourites either way
    pub async fn bootstrap(&self, city: Option<String>, units: Units) {
        match city {
            Some(city) => {
                tracing::info!(city = %city, "Loading startup city");
                self.search(&city, units).await;
            }
            None => {
                tracing::info!("No startup city determined");
                self.refresh_favourites().await;
            }
        }
    }

    /// Fetch current conditions, then the daily and detailed forecasts
    pub async fn search(&self, city: &str, units: Units) -> SearchOutcome {
        let city = city.trim();
        if city.is_empty() {
            tracing::warn!("Ignoring search for blank city");
            return SearchOutcome::Rejected;
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(city = %city, units = %units, generation, "Dashboard search started");

        self.view.show_loading(city, units);
        let outcome = self.run_search(generation, city, units).await;

        if outcome == SearchOutcome::Superseded {
            tracing::debug!(city = %city, generation, "Dashboard search superseded");
            return outcome;
        }

        *self.last_search.lock() = Some((city.to_string(), units));
        self.refresh_favourites().await;
        self.refresh_reset.notify_one();

        tracing::info!(city = %city, outcome = ?outcome, "Dashboard search finished");
        outcome
    }

    async fn run_search(&self, generation: u64, city: &str, units: Units) -> SearchOutcome {
        let current = self.source.current(city, units).await;
        if !self.is_latest(generation) {
            return SearchOutcome::Superseded;
        }

        let conditions = match current {
            Ok(conditions) => conditions,
            Err(e) => {
                let failure = match e {
                    WeatherError::CityNotFound(_) => DashboardFailure::BadLocation,
                    WeatherError::RequestFailed => DashboardFailure::NoNetwork,
                };
                self.view.show_error(failure);
                return SearchOutcome::Failed;
            }
        };
        self.view.show_current(&conditions, units);
        self.view.clear_forecast();

        let daily = self.source.daily(city, units).await;
        if !self.is_latest(generation) {
            return SearchOutcome::Superseded;
        }
        match daily {
            Ok(days) => self.view.show_daily(&days),
            Err(e) => {
                tracing::warn!(city = %city, error = %e, "Daily forecast unavailable");
                self.view.show_error(DashboardFailure::ForecastUnavailable);
                return SearchOutcome::Failed;
            }
        }

        let detailed = self.source.detailed(city, units).await;
        if !self.is_latest(generation) {
            return SearchOutcome::Superseded;
        }
        match detailed {
            Ok(points) => self.view.show_detailed(&points),
            Err(e) => {
                tracing::warn!(city = %city, error = %e, "Detailed forecast unavailable");
                self.view.show_error(DashboardFailure::ForecastUnavailable);
                return SearchOutcome::Failed;
            }
        }

        self.view.clear_status();
        SearchOutcome::Completed
    }

    fn is_latest(&self, generation: u64) -> bool {
        self.generation.load(Ordering::SeqCst) == generation
    }

    /// City and units of the last finished search
    pub fn last_search(&self) -> Option<(String, Units)> {
        self.last_search.lock().clone()
    }

    /// Re-run the last search in the other unit system
    pub async fn toggle_units(&self) -> SearchOutcome {
        match self.last_search() {
            Some((city, units)) => self.search(&city, units.toggled()).await,
            None => SearchOutcome::Rejected,
        }
    }

    /// Title-cased last searched city, the name favourites are stored under
    fn favourite_name(&self) -> Option<String> {
        self.last_search()
            .map(|(city, _)| title_case(city.trim()))
            .filter(|city| !city.is_empty())
    }

    /// Save the current city. Returns whether the list changed.
    pub async fn save_favourite(&self) -> bool {
        let Some(city) = self.favourite_name() else {
            return false;
        };
        let changed = self.favourites.add(&city).await;
        self.refresh_favourites().await;
        changed
    }

    /// Remove the current city. Returns whether the list changed.
    pub async fn remove_favourite(&self) -> bool {
        let Some(city) = self.favourite_name() else {
            return false;
        };
        let changed = self.favourites.remove(&city).await;
        self.refresh_favourites().await;
        changed
    }

    /// Save or remove the current city, whichever applies
    pub async fn toggle_favourite(&self) -> ToggleOutcome {
        let Some(city) = self.favourite_name() else {
            return ToggleOutcome::Ignored;
        };
        let outcome = self.favourites.toggle(&city).await;
        self.refresh_favourites().await;
        outcome
    }

    /// Push the favourites list and the current city's membership to the view
    pub async fn refresh_favourites(&self) {
        let favourites = self.favourites.load().await;
        let selected = self
            .favourite_name()
            .filter(|city| favourites.contains(city));
        self.view.show_favourites(&favourites, selected.as_deref());
    }

    /// Re-run the last search every `interval`.
    ///
    /// Each finished search restarts the countdown, so a manual search pushes
    /// the next refresh a full interval out.
    pub fn spawn_auto_refresh(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let dashboard = Arc::clone(self);
        tokio::spawn(async move {
            tracing::info!(interval_secs = interval.as_secs(), "Auto-refresh started");
            loop {
                tokio::select! {
                    _ = tokio::time::sleep(interval) => {
                        if let Some((city, units)) = dashboard.last_search() {
                            tracing::debug!(city = %city, "Auto-refreshing dashboard");
                            dashboard.search(&city, units).await;
                        }
                    }
                    _ = dashboard.refresh_reset.notified() => {
                        tracing::debug!("Auto-refresh timer reset");
                    }
                }
            }
        })
    }
}

/// Capitalise the first letter of every word, lowercase the rest.
/// Any non-letter starts a new word, so "o'neil" becomes "O'Neil".
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut in_word = false;
    for c in input.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}
