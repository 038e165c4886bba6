use axum::http::StatusCode;
use chrono::Local;
use reqwest::Client;
use thiserror::Error;

use super::models::*;
use crate::error::HttpError;
use crate::impl_into_response;
use crate::units::{round1, Units};

const CURRENT_WEATHER_PATH: &str = "/data/2.5/weather";

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error("City not found: {0}")]
    CityNotFound(String),

    /// Transport, timeout or decode failure. The cause is logged, not kept.
    #[error("Request failed.")]
    RequestFailed,
}

impl HttpError for WeatherError {
    fn status_code(&self) -> StatusCode {
        match self {
            Self::CityNotFound(_) => StatusCode::NOT_FOUND,
            Self::RequestFailed => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::CityNotFound(_) => Some("CITY_NOT_FOUND"),
            Self::RequestFailed => Some("REQUEST_FAILED"),
        }
    }
}

impl_into_response!(WeatherError);

pub struct WeatherService {
    client: Client,
    api_key: String,
    base_url: String,
}

impl WeatherService {
    pub fn new(client: Client, api_key: &str, base_url: &str) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Fetch current conditions for a city
    pub async fn get_current_conditions(
        &self,
        city: &str,
        units: Units,
    ) -> Result<CurrentConditions, WeatherError> {
        tracing::debug!(city = %city, units = %units, "Fetching current conditions");

        let url = format!("{}{}", self.base_url, CURRENT_WEATHER_PATH);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", units.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(city = %city, error = %e, "Current weather request failed");
                WeatherError::RequestFailed
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "Received current weather response");

        let body = response.text().await.map_err(|e| {
            tracing::error!(city = %city, error = %e, "Failed to read current weather body");
            WeatherError::RequestFailed
        })?;

        let payload: CurrentWeatherPayload = match serde_json::from_str(&body) {
            Ok(payload) => payload,
            Err(_) if status == reqwest::StatusCode::NOT_FOUND => {
                return Err(WeatherError::CityNotFound(city.to_string()));
            }
            Err(e) => {
                tracing::error!(city = %city, error = %e, "Invalid current weather payload");
                return Err(WeatherError::RequestFailed);
            }
        };

        let code = payload
            .cod
            .as_ref()
            .and_then(provider_code)
            .unwrap_or(status.as_u16());

        if code == 404 {
            return Err(WeatherError::CityNotFound(city.to_string()));
        }

        if code != 200 || !status.is_success() {
            tracing::error!(
                city = %city,
                code = code,
                message = ?payload.message,
                "OpenWeatherMap rejected current weather request"
            );
            return Err(WeatherError::RequestFailed);
        }

        let conditions = Self::to_conditions(payload).ok_or_else(|| {
            tracing::error!(city = %city, "Current weather payload missing required fields");
            WeatherError::RequestFailed
        })?;

        tracing::info!(
            city = %conditions.city,
            temp = %conditions.temperature,
            "Current conditions fetched successfully"
        );

        Ok(conditions)
    }

    /// Shape a successful payload. Times use the machine's local zone.
    fn to_conditions(payload: CurrentWeatherPayload) -> Option<CurrentConditions> {
        let time = ReadingTime::from_timestamp(payload.dt, &Local);
        let main = payload.main?;
        let wind = payload.wind?;
        let weather = payload.weather.into_iter().next()?;

        Some(CurrentConditions {
            city: payload.name?,
            temperature: round1(main.temp),
            condition: weather.description,
            humidity: main.humidity,
            wind_speed: round1(wind.speed),
            icon: weather.icon,
            day: time.day,
            date: time.date,
            time: time.time,
        })
    }
}
