use async_trait::async_trait;
use std::sync::Arc;

use crate::forecast::{DailySummary, DetailedPoint, ForecastError, ForecastService};
use crate::units::Units;
use crate::weather::{CurrentConditions, WeatherError, WeatherService};

/// Where the dashboard gets its readings from
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self, city: &str, units: Units) -> Result<CurrentConditions, WeatherError>;

    async fn daily(&self, city: &str, units: Units) -> Result<Vec<DailySummary>, ForecastError>;

    async fn detailed(&self, city: &str, units: Units) -> Result<Vec<DetailedPoint>, ForecastError>;
}

/// OpenWeatherMap-backed source
pub struct OpenWeatherSource {
    weather_service: Arc<WeatherService>,
    forecast_service: Arc<ForecastService>,
}

impl OpenWeatherSource {
    pub fn new(weather_service: Arc<WeatherService>, forecast_service: Arc<ForecastService>) -> Self {
        Self {
            weather_service,
            forecast_service,
        }
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherSource {
    async fn current(&self, city: &str, units: Units) -> Result<CurrentConditions, WeatherError> {
        self.weather_service.get_current_conditions(city, units).await
    }

    async fn daily(&self, city: &str, units: Units) -> Result<Vec<DailySummary>, ForecastError> {
        self.forecast_service.get_daily_forecast(city, units).await
    }

    async fn detailed(&self, city: &str, units: Units) -> Result<Vec<DetailedPoint>, ForecastError> {
        self.forecast_service.get_detailed_forecast(city, units).await
    }
}
