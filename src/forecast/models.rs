use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Timestamp layout of the forecast feed's `dt_txt` field
pub const FEED_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// ============================================================================
// Forecast Domain Models
// ============================================================================

/// One 3-hour reading from the forecast feed
#[derive(Debug, Clone, PartialEq)]
pub struct ForecastSample {
    /// Feed timestamp exactly as received
    pub dt_txt: String,
    /// Parsed `dt_txt`; the feed sends these in UTC
    pub timestamp: NaiveDateTime,
    pub temperature: f64,
    pub condition: String,
    pub icon_code: String,
}

impl ForecastSample {
    pub fn parse(
        dt_txt: &str,
        temperature: f64,
        condition: impl Into<String>,
        icon_code: impl Into<String>,
    ) -> Result<Self, chrono::ParseError> {
        let timestamp = NaiveDateTime::parse_from_str(dt_txt, FEED_TIMESTAMP_FORMAT)?;
        Ok(Self {
            dt_txt: dt_txt.to_string(),
            timestamp,
            temperature,
            condition: condition.into(),
            icon_code: icon_code.into(),
        })
    }

    /// Date portion of the feed timestamp, without any offset applied
    pub fn feed_date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// A parsed forecast feed for one city
#[derive(Debug, Clone)]
pub struct ForecastFeed {
    /// City name reported by the provider
    pub city: Option<String>,
    /// Shift from UTC in seconds for the queried city
    pub utc_offset_seconds: i32,
    pub samples: Vec<ForecastSample>,
}

/// Lowest and highest temperature seen on one date
#[derive(Debug, Clone, Copy, PartialEq, Serialize, ToSchema)]
pub struct DailyExtremes {
    pub min: f64,
    pub max: f64,
}

// ============================================================================
// API Response Models (External - what we return to clients)
// ============================================================================

/// One representative reading per day, with that day's extremes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DailySummary {
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    /// Temperature of the sample nearest local noon
    pub temperature: f64,
    pub min_temp: f64,
    pub max_temp: f64,
    pub condition: String,
    pub icon: String,
}

/// One point of the detailed 3-hour series, used for charting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct DetailedPoint {
    /// `YYYY-MM-DD HH:MM:SS`, as sent by the provider
    pub datetime: String,
    pub temperature: f64,
    pub condition: String,
    pub icon: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DailyForecastResponse {
    pub city: String,
    pub units: crate::units::Units,
    pub days: Vec<DailySummary>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DetailedForecastResponse {
    pub city: String,
    pub units: crate::units::Units,
    pub points: Vec<DetailedPoint>,
}

// ============================================================================
// OpenWeatherMap 5 day / 3 hour forecast response (Internal)
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ForecastPayload {
    pub list: Vec<ForecastEntry>,
    pub city: Option<ForecastCity>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastEntry {
    pub dt_txt: String,
    pub main: ForecastMain,
    pub weather: Vec<ForecastCondition>,
}

#[derive(Debug, Deserialize)]
pub struct ForecastMain {
    pub temp: f64,
}

#[derive(Debug, Deserialize)]
pub struct ForecastCondition {
    pub description: String,
    pub icon: String,
}

#[derive(Debug, Deserialize)]
pub struct ForecastCity {
    pub name: Option<String>,
    /// Shift in seconds from UTC
    #[serde(default)]
    pub timezone: i32,
}

impl TryFrom<ForecastEntry> for ForecastSample {
    type Error = String;

    fn try_from(entry: ForecastEntry) -> Result<Self, Self::Error> {
        let condition = entry
            .weather
            .into_iter()
            .next()
            .ok_or_else(|| format!("No weather condition for {}", entry.dt_txt))?;

        ForecastSample::parse(
            &entry.dt_txt,
            entry.main.temp,
            condition.description,
            condition.icon,
        )
        .map_err(|e| format!("Invalid timestamp {:?}: {}", entry.dt_txt, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_sample_parse() {
        let sample = ForecastSample::parse("2025-07-01 15:00:00", 22.0, "clear", "01d").unwrap();
        assert_eq!(sample.feed_date(), NaiveDate::from_ymd_opt(2025, 7, 1).unwrap());
        assert_eq!(sample.dt_txt, "2025-07-01 15:00:00");
    }

    #[test]
    fn test_sample_parse_rejects_other_layouts() {
        assert!(ForecastSample::parse("2025-07-01T15:00:00Z", 22.0, "clear", "01d").is_err());
        assert!(ForecastSample::parse("", 22.0, "clear", "01d").is_err());
    }

    #[test]
    fn test_entry_without_condition_is_rejected() {
        let entry: ForecastEntry = serde_json::from_value(json!({
            "dt_txt": "2025-07-01 12:00:00", "main": {"temp": 20}, "weather": []
        }))
        .unwrap();
        assert!(ForecastSample::try_from(entry).is_err());
    }

    #[test]
    fn test_payload_city_timezone_defaults_to_zero() {
        let payload: ForecastPayload = serde_json::from_value(json!({
            "list": [], "city": {"name": "London"}
        }))
        .unwrap();
        assert_eq!(payload.city.unwrap().timezone, 0);
    }

    #[test]
    fn test_daily_summary_serializes_date() {
        let summary = DailySummary {
            date: NaiveDate::from_ymd_opt(2025, 7, 1).unwrap(),
            temperature: 20.0,
            min_temp: 18.0,
            max_temp: 22.0,
            condition: "clear".to_string(),
            icon: "01d".to_string(),
        };
        let value = serde_json::to_value(&summary).unwrap();
        assert_eq!(value["date"], "2025-07-01");
        assert_eq!(value["min_temp"], 18.0);
    }
}
