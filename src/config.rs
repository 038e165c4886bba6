use config::{Case, Config, ConfigError, Environment, File};
use serde::Deserialize;

use crate::units::Units;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,

    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// OpenWeatherMap API key
    pub openweathermap_api_key: String,

    /// Contact email sent in the Nominatim User-Agent header
    pub geolocation_email: String,

    /// City searched at startup. Falls back to IP geolocation when unset.
    #[serde(default)]
    pub default_city: Option<String>,

    /// Unit system: metric or imperial
    #[serde(default)]
    pub units: Units,

    /// Path of the favourites JSON file
    #[serde(default = "default_favourites_path")]
    pub favourites_path: String,

    /// Seconds between dashboard auto-refreshes
    #[serde(default = "default_refresh_interval_secs")]
    pub refresh_interval_secs: u64,

    /// Seconds a fetched forecast feed is reused
    #[serde(default = "default_forecast_cache_secs")]
    pub forecast_cache_secs: u64,

    #[serde(default)]
    pub endpoints: EndpointConfig,
}

/// Upstream base URLs, overridable for testing or proxies
#[derive(Debug, Deserialize, Clone)]
pub struct EndpointConfig {
    #[serde(default = "default_openweathermap_base_url")]
    pub openweathermap_base_url: String,

    #[serde(default = "default_ipinfo_url")]
    pub ipinfo_url: String,

    #[serde(default = "default_nominatim_url")]
    pub nominatim_url: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            openweathermap_base_url: default_openweathermap_base_url(),
            ipinfo_url: default_ipinfo_url(),
            nominatim_url: default_nominatim_url(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_favourites_path() -> String {
    "favourites.json".to_string()
}

fn default_refresh_interval_secs() -> u64 {
    900
}

fn default_forecast_cache_secs() -> u64 {
    60
}

fn default_openweathermap_base_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_ipinfo_url() -> String {
    "https://ipinfo.io/json".to_string()
}

fn default_nominatim_url() -> String {
    "https://nominatim.openstreetmap.org/reverse".to_string()
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present
        let _ = dotenvy::dotenv();

        let config = Config::builder()
            .set_default("host", default_host())?
            .set_default("port", default_port())?
            .set_default("units", Units::default().as_str())?
            .set_default("favourites_path", default_favourites_path())?
            .add_source(File::with_name("config").required(false))
            .add_source(File::with_name("config.local").required(false))
            // WEATHERVIEW_OPENWEATHERMAP_API_KEY -> openweathermap_api_key
            .add_source(
                Environment::with_prefix("WEATHERVIEW")
                    .prefix_separator("_")
                    .separator("__")
                    .convert_case(Case::Snake)
                    .try_parsing(true),
            )
            .build()?;

        let app_config: Self = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    /// Reject blank required keys; an empty env var still deserializes
    fn validate(&self) -> Result<(), ConfigError> {
        if self.openweathermap_api_key.trim().is_empty() {
            return Err(ConfigError::Message(
                "openweathermap_api_key must not be empty".to_string(),
            ));
        }
        if self.geolocation_email.trim().is_empty() {
            return Err(ConfigError::Message(
                "geolocation_email must not be empty".to_string(),
            ));
        }
        if self.refresh_interval_secs == 0 {
            return Err(ConfigError::Message(
                "refresh_interval_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Startup city with surrounding whitespace removed, if any is set
    pub fn startup_city(&self) -> Option<&str> {
        self.default_city
            .as_deref()
            .map(str::trim)
            .filter(|city| !city.is_empty())
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> AppConfig {
    AppConfig {
        host: default_host(),
        port: default_port(),
        openweathermap_api_key: "test_api_key".to_string(),
        geolocation_email: "dev@example.com".to_string(),
        default_city: None,
        units: Units::Metric,
        favourites_path: default_favourites_path(),
        refresh_interval_secs: default_refresh_interval_secs(),
        forecast_cache_secs: default_forecast_cache_secs(),
        endpoints: EndpointConfig::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn from_toml(source: &str) -> Result<AppConfig, ConfigError> {
        let config = Config::builder()
            .add_source(File::from_str(source, config::FileFormat::Toml))
            .build()?;
        let app_config: AppConfig = config.try_deserialize()?;
        app_config.validate()?;
        Ok(app_config)
    }

    #[test]
    fn test_defaults_applied() {
        let config = from_toml(
            r#"
            openweathermap_api_key = "abc"
            geolocation_email = "me@example.com"
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.units, Units::Metric);
        assert_eq!(config.favourites_path, "favourites.json");
        assert_eq!(config.refresh_interval_secs, 900);
        assert_eq!(
            config.endpoints.openweathermap_base_url,
            "https://api.openweathermap.org"
        );
        assert!(config.startup_city().is_none());
    }

    #[test]
    fn test_missing_api_key_is_fatal() {
        let result = from_toml(r#"geolocation_email = "me@example.com""#);
        assert!(result.is_err());
    }

    #[test]
    fn test_blank_email_is_fatal() {
        let result = from_toml(
            r#"
            openweathermap_api_key = "abc"
            geolocation_email = "   "
            "#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_imperial_units_and_city() {
        let config = from_toml(
            r#"
            openweathermap_api_key = "abc"
            geolocation_email = "me@example.com"
            units = "imperial"
            default_city = "  Paris "
            "#,
        )
        .unwrap();

        assert_eq!(config.units, Units::Imperial);
        assert_eq!(config.startup_city(), Some("Paris"));
    }
}
