use axum::http::StatusCode;
use chrono::Utc;
use reqwest::Client;
use thiserror::Error;

use super::models::*;
use super::normalize::{build_daily_forecast, build_detailed_forecast};
use crate::cache::{feed_cache_key, FeedCache};
use crate::error::HttpError;
use crate::impl_into_response;
use crate::units::Units;

const FORECAST_PATH: &str = "/data/2.5/forecast";
const UNKNOWN_ERROR: &str = "Unknown error.";

#[derive(Error, Debug)]
pub enum ForecastError {
    /// Non-success status or unexpected shape; carries the provider's message
    #[error("Forecast unavailable: {0}")]
    Unavailable(String),

    /// Transport or timeout failure. The cause is logged, not kept.
    #[error("Request failed.")]
    RequestFailed,
}

impl HttpError for ForecastError {
    fn status_code(&self) -> StatusCode {
        StatusCode::BAD_GATEWAY
    }

    fn error_code(&self) -> Option<&'static str> {
        match self {
            Self::Unavailable(_) => Some("FORECAST_UNAVAILABLE"),
            Self::RequestFailed => Some("REQUEST_FAILED"),
        }
    }
}

impl_into_response!(ForecastError);

pub struct ForecastService {
    client: Client,
    api_key: String,
    base_url: String,
    feed_cache: FeedCache,
}

impl ForecastService {
    pub fn new(client: Client, api_key: &str, base_url: &str, feed_cache: FeedCache) -> Self {
        Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            feed_cache,
        }
    }

    pub fn feed_cache(&self) -> FeedCache {
        self.feed_cache.clone()
    }

    /// Fetch and parse the 3-hour feed, reusing a recent copy when cached
    pub async fn fetch_feed(&self, city: &str, units: Units) -> Result<ForecastFeed, ForecastError> {
        let cache_key = feed_cache_key(city, units);

        if let Some(feed) = self.feed_cache.get(&cache_key) {
            tracing::debug!(city = %city, "Forecast cache hit");
            return Ok(feed);
        }

        tracing::debug!(city = %city, units = %units, "Fetching forecast feed");

        let url = format!("{}{}", self.base_url, FORECAST_PATH);
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
                tracing::error!(city = %city, error = %e, "Forecast request failed");
                ForecastError::RequestFailed
            })?;

        let status = response.status();
        tracing::debug!(status = %status, "Received forecast response");

        let body = response.text().await.map_err(|e| {
            tracing::error!(city = %city, error = %e, "Failed to read forecast body");
            ForecastError::RequestFailed
        })?;

        let feed = Self::parse_feed(status, &body)?;

        tracing::info!(
            city = ?feed.city,
            samples = feed.samples.len(),
            offset = feed.utc_offset_seconds,
            "Forecast feed fetched successfully"
        );

        self.feed_cache.insert(cache_key, feed.clone());
        Ok(feed)
    }

    /// One representative reading per remaining day
    pub async fn get_daily_forecast(
        &self,
        city: &str,
        units: Units,
    ) -> Result<Vec<DailySummary>, ForecastError> {
        let feed = self.fetch_feed(city, units).await?;
        let today = Utc::now().date_naive();
        Ok(build_daily_forecast(
            &feed.samples,
            feed.utc_offset_seconds,
            today,
        ))
    }

    /// The full 3-hour series
    pub async fn get_detailed_forecast(
        &self,
        city: &str,
        units: Units,
    ) -> Result<Vec<DetailedPoint>, ForecastError> {
        let feed = self.fetch_feed(city, units).await?;
        Ok(build_detailed_forecast(&feed.samples))
    }

    /// Validate status and shape before decoding the feed
    fn parse_feed(status: reqwest::StatusCode, body: &str) -> Result<ForecastFeed, ForecastError> {
        let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
            tracing::error!(status = %status, error = %e, "Forecast body is not JSON");
            ForecastError::Unavailable(UNKNOWN_ERROR.to_string())
        })?;

        if !status.is_success() || value.get("list").is_none() {
            let message = value
                .get("message")
                .and_then(serde_json::Value::as_str)
                .unwrap_or(UNKNOWN_ERROR)
                .to_string();
            tracing::error!(status = %status, message = %message, "Forecast rejected by provider");
            return Err(ForecastError::Unavailable(message));
        }

        let payload: ForecastPayload = serde_json::from_value(value).map_err(|e| {
            tracing::error!(error = %e, "Unexpected forecast payload shape");
            ForecastError::Unavailable(format!("Invalid forecast response: {}", e))
        })?;

        let samples = payload
            .list
            .into_iter()
            .map(ForecastSample::try_from)
            .collect::<Result<Vec<_>, _>>()
            .map_err(ForecastError::Unavailable)?;

        let (city, utc_offset_seconds) = match payload.city {
            Some(city) => (city.name, city.timezone),
            None => (None, 0),
        };

        Ok(ForecastFeed {
            city,
            utc_offset_seconds,
            samples,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::create_feed_cache;
    use chrono::TimeDelta;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn entry(dt_txt: &str, temp: f64) -> serde_json::Value {
        json!({
            "dt_txt": dt_txt,
            "main": {"temp": temp},
            "weather": [{"description": "clear", "icon": "01d"}]
        })
    }

    fn service_for(server: &MockServer) -> ForecastService {
        ForecastService::new(
            Client::new(),
            "test_api_key",
            &server.uri(),
            create_feed_cache(Duration::from_secs(60)),
        )
    }

    fn at(date: chrono::NaiveDate, time: &str) -> String {
        format!("{} {}", date.format("%Y-%m-%d"), time)
    }

    #[tokio::test]
    async fn test_daily_forecast_two_days() {
        let today = Utc::now().date_naive();
        let tomorrow = today + TimeDelta::days(1);

        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .and(query_param("q", "London"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cod": "200",
                "city": {"name": "London", "timezone": 0},
                "list": [
                    entry(&at(today, "09:00:00"), 14.0),
                    entry(&at(today, "12:00:00"), 20.0),
                    entry(&at(today, "15:00:00"), 22.0),
                    entry(&at(tomorrow, "12:00:00"), 18.0),
                    entry(&at(tomorrow, "18:00:00"), 25.0),
                ]
            })))
            .mount(&server)
            .await;

        let days = service_for(&server)
            .get_daily_forecast("London", Units::Metric)
            .await
            .unwrap();

        assert_eq!(days.len(), 2);
        assert_eq!(days[0].date, today);
        assert_eq!(days[0].temperature, 20.0);
        assert_eq!((days[0].min_temp, days[0].max_temp), (14.0, 22.0));
        assert_eq!(days[1].date, tomorrow);
        assert_eq!((days[1].min_temp, days[1].max_temp), (18.0, 25.0));
    }

    #[tokio::test]
    async fn test_detailed_forecast_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "cod": "200",
                "list": [
                    entry("2025-07-01 12:00:00", 20.0),
                    entry("2025-07-01 15:00:00", 22.0),
                ]
            })))
            .mount(&server)
            .await;

        let points = service_for(&server)
            .get_detailed_forecast("London", Units::Metric)
            .await
            .unwrap();

        assert_eq!(points.len(), 2);
        assert_eq!(points[1].datetime, "2025-07-01 15:00:00");
        assert_eq!(points[1].temperature, 22.0);
    }

    #[tokio::test]
    async fn test_provider_error_message_is_kept() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(404)
                    .set_body_json(json!({"cod": "404", "message": "city not found"})),
            )
            .mount(&server)
            .await;

        let err = service_for(&server)
            .get_daily_forecast("Nowhere", Units::Metric)
            .await
            .unwrap_err();

        assert!(matches!(err, ForecastError::Unavailable(ref m) if m == "city not found"));
    }

    #[tokio::test]
    async fn test_missing_list_uses_fallback_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cod": "200"})))
            .mount(&server)
            .await;

        let err = service_for(&server)
            .get_detailed_forecast("London", Units::Metric)
            .await
            .unwrap_err();

        assert!(matches!(err, ForecastError::Unavailable(ref m) if m == "Unknown error."));
    }

    #[tokio::test]
    async fn test_bad_timestamp_is_unavailable() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "list": [entry("yesterday-ish", 20.0)]
            })))
            .mount(&server)
            .await;

        let err = service_for(&server)
            .get_detailed_forecast("London", Units::Metric)
            .await
            .unwrap_err();

        assert!(matches!(err, ForecastError::Unavailable(_)));
        assert_eq!(err.status_code(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_daily_and_detailed_share_one_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "list": [entry("2025-07-01 12:00:00", 20.0)]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let service = service_for(&server);
        service
            .get_daily_forecast("London", Units::Metric)
            .await
            .unwrap();
        service
            .get_detailed_forecast(" london ", Units::Metric)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_transport_failure_is_request_failed() {
        let service = ForecastService::new(
            Client::new(),
            "test_api_key",
            "http://127.0.0.1:1",
            create_feed_cache(Duration::from_secs(60)),
        );

        let err = service
            .get_daily_forecast("London", Units::Metric)
            .await
            .unwrap_err();

        assert!(matches!(err, ForecastError::RequestFailed));
    }
}
