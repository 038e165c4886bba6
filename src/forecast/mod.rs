pub mod handlers;
pub mod models;
pub mod normalize;
mod service;

pub use models::{DailySummary, DetailedPoint};
pub use service::{ForecastError, ForecastService};
