//! City detection from the public IP address.
//! ipinfo.io gives coordinates, Nominatim (OpenStreetMap) turns them into a place name.

use reqwest::{header::USER_AGENT, Client};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
struct IpInfoResponse {
    /// "lat,lon"
    loc: Option<String>,
}

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Deserialize)]
struct NominatimAddress {
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
}

pub struct GeolocationService {
    client: Client,
    ipinfo_url: String,
    nominatim_url: String,
    user_agent: String,
}

impl GeolocationService {
    pub fn new(client: Client, ipinfo_url: &str, nominatim_url: &str, contact_email: &str) -> Self {
        Self {
            client,
            ipinfo_url: ipinfo_url.to_string(),
            nominatim_url: nominatim_url.to_string(),
            // Nominatim's usage policy asks for an identifying User-Agent
            user_agent: format!("weather_dashboard ({})", contact_email),
        }
    }

    /// City, town or village for the caller's IP. Any failure yields `None`.
    pub async fn detect_city(&self) -> Option<String> {
        match self.try_detect_city().await {
            Ok(city) => {
                tracing::info!(city = ?city, "Geolocation finished");
                city
            }
            Err(e) => {
                tracing::error!(error = %e, "Could not retrieve geolocation");
                None
            }
        }
    }

    async fn try_detect_city(&self) -> Result<Option<String>, reqwest::Error> {
        let ip_info: IpInfoResponse = self
            .client
            .get(&self.ipinfo_url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let Some((lat, lon)) = ip_info.loc.as_deref().and_then(parse_loc) else {
            tracing::warn!(loc = ?ip_info.loc, "No usable coordinates from IP lookup");
            return Ok(None);
        };

        tracing::debug!(lat = %lat, lon = %lon, "Reverse geocoding coordinates");

        let body: NominatimResponse = self
            .client
            .get(&self.nominatim_url)
            .header(USER_AGENT, &self.user_agent)
            .query(&[
                ("lat", lat),
                ("lon", lon),
                ("format", "json"),
                ("accept-language", "en"),
                ("addressdetails", "1"),
            ])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(body
            .address
            .and_then(|addr| addr.city.or(addr.town).or(addr.village)))
    }
}

/// Split ipinfo's "lat,lon" into two trimmed, numeric parts
fn parse_loc(loc: &str) -> Option<(&str, &str)> {
    let (lat, lon) = loc.split_once(',')?;
    let (lat, lon) = (lat.trim(), lon.trim());
    if lat.parse::<f64>().is_err() || lon.parse::<f64>().is_err() {
        return None;
    }
    Some((lat, lon))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn mount_ipinfo(server: &MockServer, body: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(body))
            .mount(server)
            .await;
    }

    async fn mount_nominatim(server: &MockServer, address: serde_json::Value) {
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .and(query_param("lat", "51.5074"))
            .and(query_param("lon", "-0.1278"))
            .and(header("user-agent", "weather_dashboard (dev@example.com)"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"address": address})))
            .mount(server)
            .await;
    }

    fn service_for(server: &MockServer) -> GeolocationService {
        GeolocationService::new(
            Client::new(),
            &format!("{}/json", server.uri()),
            &format!("{}/reverse", server.uri()),
            "dev@example.com",
        )
    }

    #[test]
    fn test_parse_loc() {
        assert_eq!(parse_loc("51.5074,-0.1278"), Some(("51.5074", "-0.1278")));
        assert_eq!(parse_loc(" 1.5 , 2.5 "), Some(("1.5", "2.5")));
        assert_eq!(parse_loc("51.5074"), None);
        assert_eq!(parse_loc("north,south"), None);
    }

    #[tokio::test]
    async fn test_detect_city_prefers_city() {
        let server = MockServer::start().await;
        mount_ipinfo(&server, json!({"loc": "51.5074,-0.1278"})).await;
        mount_nominatim(&server, json!({"city": "London", "town": "Westminster"})).await;

        assert_eq!(service_for(&server).detect_city().await.as_deref(), Some("London"));
    }

    #[tokio::test]
    async fn test_detect_city_falls_back_to_town_then_village() {
        let server = MockServer::start().await;
        mount_ipinfo(&server, json!({"loc": "51.5074,-0.1278"})).await;
        mount_nominatim(&server, json!({"village": "Little Snoring"})).await;

        assert_eq!(
            service_for(&server).detect_city().await.as_deref(),
            Some("Little Snoring")
        );
    }

    #[tokio::test]
    async fn test_detect_city_without_loc() {
        let server = MockServer::start().await;
        mount_ipinfo(&server, json!({"ip": "127.0.0.1", "bogon": true})).await;

        assert_eq!(service_for(&server).detect_city().await, None);
    }

    #[tokio::test]
    async fn test_detect_city_without_locality() {
        let server = MockServer::start().await;
        mount_ipinfo(&server, json!({"loc": "51.5074,-0.1278"})).await;
        mount_nominatim(&server, json!({"country": "United Kingdom"})).await;

        assert_eq!(service_for(&server).detect_city().await, None);
    }

    #[tokio::test]
    async fn test_detect_city_reverse_geocode_error() {
        let server = MockServer::start().await;
        mount_ipinfo(&server, json!({"loc": "51.5074,-0.1278"})).await;
        Mock::given(method("GET"))
            .and(path("/reverse"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        assert_eq!(service_for(&server).detect_city().await, None);
    }

    #[tokio::test]
    async fn test_detect_city_transport_failure() {
        let service = GeolocationService::new(
            Client::new(),
            "http://127.0.0.1:1/json",
            "http://127.0.0.1:1/reverse",
            "dev@example.com",
        );

        assert_eq!(service.detect_city().await, None);
    }
}
