use chrono::{DateTime, TimeZone};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ============================================================================
// API Response Models (External - what we return to clients)
// ============================================================================

/// A single point-in-time reading for one city
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CurrentConditions {
    /// City name as returned by the provider, not the query string
    pub city: String,
    pub temperature: f64,
    pub condition: String,
    pub humidity: u32,
    pub wind_speed: f64,
    pub icon: String,
    /// Weekday name, e.g. "Sunday"
    pub day: String,
    /// `YYYY-MM-DD`
    pub date: String,
    /// 12-hour clock, e.g. "02:30 PM"
    pub time: String,
}

/// Day/date/time strings shown next to a reading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadingTime {
    pub day: String,
    pub date: String,
    pub time: String,
}

impl ReadingTime {
    const UNAVAILABLE: &'static str = "N/A";

    /// Render a Unix timestamp in the given timezone.
    ///
    /// The current-conditions path passes the machine's `Local` zone here and
    /// never the city's own offset, unlike the forecast path.
    pub fn from_timestamp<Tz: TimeZone>(timestamp: Option<i64>, tz: &Tz) -> Self
    where
        Tz::Offset: std::fmt::Display,
    {
        match timestamp.and_then(|secs| DateTime::from_timestamp(secs, 0)) {
            Some(utc) => {
                let local = utc.with_timezone(tz);
                Self {
                    day: local.format("%A").to_string(),
                    date: local.format("%Y-%m-%d").to_string(),
                    time: local.format("%I:%M %p").to_string(),
                }
            }
            None => Self {
                day: Self::UNAVAILABLE.to_string(),
                date: Self::UNAVAILABLE.to_string(),
                time: Self::UNAVAILABLE.to_string(),
            },
        }
    }
}

// ============================================================================
// OpenWeatherMap current weather response (Internal)
// Every field is optional so error bodies decode through the same shape
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct CurrentWeatherPayload {
    /// Number on success, string on errors ("404")
    pub cod: Option<serde_json::Value>,
    pub message: Option<String>,
    pub name: Option<String>,
    pub dt: Option<i64>,
    pub main: Option<MainInfo>,
    pub wind: Option<WindInfo>,
    #[serde(default)]
    pub weather: Vec<WeatherInfo>,
}

#[derive(Debug, Deserialize)]
pub struct MainInfo {
    pub temp: f64,
    pub humidity: u32,
}

#[derive(Debug, Deserialize)]
pub struct WindInfo {
    pub speed: f64,
}

#[derive(Debug, Deserialize)]
pub struct WeatherInfo {
    pub description: String,
    pub icon: String,
}

/// Read the provider's `cod` field, which is sent as either a number or a string
pub fn provider_code(cod: &serde_json::Value) -> Option<u16> {
    match cod {
        serde_json::Value::Number(n) => n.as_u64().and_then(|n| u16::try_from(n).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
