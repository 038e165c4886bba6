//! Search orchestration between the weather sources, the favourites file and
//! whatever renders the result.

mod controller;
pub mod handlers;
mod source;
mod view;

pub use controller::{title_case, Dashboard, SearchOutcome};
pub use source::{OpenWeatherSource, WeatherSource};
pub use view::{DashboardFailure, DashboardSnapshot, DashboardView, SnapshotView};
