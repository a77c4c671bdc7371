//! Weather provider client
//!
//! Thin async wrapper around the `OpenWeather` geocoding, current weather,
//! air pollution and forecast endpoints.

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, info, warn};

use crate::config::WeatherConfig;
use crate::error::WeatherWiseError;
use crate::models::{AirQuality, Coordinate, CurrentConditions, DailyTemperature, ForecastEntry};
use crate::nearby::TemperatureLookup;
use crate::Result;

pub mod openweather;

use openweather::{CurrentResponse, ForecastResponse, GeocodingResult, PollutionResponse};

/// Forecast steps are 3 hours apart
const STEPS_PER_DAY: usize = 8;

/// `OpenWeather` API client
#[derive(Debug, Clone)]
pub struct WeatherClient {
    client: Client,
    api_key: Option<String>,
    base_url: String,
}

impl WeatherClient {
    /// Create a new client
    pub fn new(config: &WeatherConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("WeatherWise/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| WeatherWiseError::config(format!("Failed to create HTTP client: {e}")))?;

        let api_key = config.resolved_api_key();
        if api_key.is_none() {
            warn!("No OpenWeather API key configured, requests will likely be rejected");
        }

        Ok(Self {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str, query: &str) -> String {
        match &self.api_key {
            Some(key) => format!(
                "{}{}?{}&appid={}",
                self.base_url,
                path,
                query,
                urlencoding::encode(key)
            ),
            None => format!("{}{}?{}", self.base_url, path, query),
        }
    }

    fn coordinate_query(coordinate: Coordinate) -> String {
        format!("lat={}&lon={}", coordinate.latitude(), coordinate.longitude())
    }

    async fn get_json<T: DeserializeOwned>(&self, url: String, endpoint: &str) -> Result<T> {
        let response = self.client.get(url).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(WeatherWiseError::api_status(
                status.as_u16(),
                format!("{endpoint} request failed with status {status}"),
            ));
        }

        response.json::<T>().await.map_err(|e| {
            WeatherWiseError::api(format!(
                "Failed to parse {endpoint} response: {}",
                e.without_url()
            ))
        })
    }

    /// Resolve a city name to coordinates, `None` when the provider knows no such place
    #[tracing::instrument(name = "geocode", level = "debug", skip(self))]
    pub async fn geocode(&self, city: &str) -> Result<Option<Coordinate>> {
        let city = city.trim();
        if city.is_empty() {
            return Err(WeatherWiseError::validation("City name cannot be empty"));
        }

        let url = self.url(
            "/geo/1.0/direct",
            &format!("q={}&limit=1", urlencoding::encode(city)),
        );
        let results: Vec<GeocodingResult> = self.get_json(url, "geocoding").await?;

        match results.into_iter().next() {
            Some(result) => {
                debug!(
                    "Found {} ({}) at ({:.4}, {:.4})",
                    result.name,
                    result.country.as_deref().unwrap_or("?"),
                    result.lat,
                    result.lon
                );
                Ok(Some(Coordinate::new(result.lat, result.lon)?))
            }
            None => Ok(None),
        }
    }

    /// Current conditions including air quality.
    ///
    /// A failing air pollution request only drops the air quality block.
    #[tracing::instrument(name = "current_conditions", level = "debug", skip(self))]
    pub async fn current_conditions(&self, coordinate: Coordinate) -> Result<CurrentConditions> {
        let url = self.url(
            "/data/2.5/weather",
            &format!("{}&units=metric", Self::coordinate_query(coordinate)),
        );
        let current: CurrentResponse = self.get_json(url, "current weather").await?;

        let air_quality = match self.air_quality(coordinate).await {
            Ok(air_quality) => air_quality,
            Err(e) => {
                warn!("Air quality unavailable: {}", e);
                None
            }
        };

        Ok(current.into_conditions(air_quality))
    }

    /// Air quality index and components, `None` when the provider has no sample
    pub async fn air_quality(&self, coordinate: Coordinate) -> Result<Option<AirQuality>> {
        let url = self.url("/data/2.5/air_pollution", &Self::coordinate_query(coordinate));
        let response: PollutionResponse = self.get_json(url, "air pollution").await?;
        Ok(response.into_air_quality())
    }

    /// Current temperature in Celsius
    pub async fn current_temperature(&self, coordinate: Coordinate) -> Result<f64> {
        let url = self.url(
            "/data/2.5/weather",
            &format!("{}&units=metric", Self::coordinate_query(coordinate)),
        );
        let current: CurrentResponse = self.get_json(url, "current weather").await?;
        Ok(current.main.temp)
    }

    /// Five day forecast in 3-hour steps
    #[tracing::instrument(name = "forecast", level = "debug", skip(self))]
    pub async fn forecast(&self, coordinate: Coordinate) -> Result<Vec<ForecastEntry>> {
        let url = self.url(
            "/data/2.5/forecast",
            &format!("{}&units=metric", Self::coordinate_query(coordinate)),
        );
        let response: ForecastResponse = self.get_json(url, "forecast").await?;
        let entries = response.into_entries();
        info!("Received {} forecast steps", entries.len());
        Ok(entries)
    }
}

/// Forecast steps covering the next 24 hours
#[must_use]
pub fn hourly_steps(entries: &[ForecastEntry]) -> Vec<ForecastEntry> {
    entries.iter().take(STEPS_PER_DAY).cloned().collect()
}

/// Every eighth forecast step reduced to its date and temperature
#[must_use]
pub fn daily_samples(entries: &[ForecastEntry]) -> Vec<DailyTemperature> {
    entries
        .iter()
        .step_by(STEPS_PER_DAY)
        .map(DailyTemperature::from)
        .collect()
}

#[async_trait]
impl TemperatureLookup for WeatherClient {
    async fn temperature(&self, coordinate: Coordinate) -> Option<f64> {
        match self.current_temperature(coordinate).await {
            Ok(temperature) => Some(temperature),
            Err(e) => {
                debug!(
                    "Temperature lookup at {} failed: {}",
                    coordinate.format_coordinates(),
                    e
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> WeatherClient {
        let config = WeatherConfig {
            api_key: Some("test_api_key_123".to_string()),
            base_url: server.uri(),
            ..WeatherConfig::default()
        };
        WeatherClient::new(&config).unwrap()
    }

    fn delhi() -> Coordinate {
        Coordinate::new(28.6139, 77.209).unwrap()
    }

    fn forecast_body(steps: usize) -> serde_json::Value {
        let list: Vec<serde_json::Value> = (0..steps)
            .map(|i| {
                json!({
                    "dt_txt": format!("2024-05-{:02} {:02}:00:00", 1 + i / 8, (i % 8) * 3),
                    "main": {"temp": 30.0 + i as f64},
                    "weather": [{"description": "clear sky"}]
                })
            })
            .collect();
        json!({ "list": list })
    }

    #[tokio::test]
    async fn test_geocode_found() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .and(query_param("q", "New Delhi"))
            .and(query_param("appid", "test_api_key_123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"name": "New Delhi", "lat": 28.6139, "lon": 77.209, "country": "IN"}
            ])))
            .mount(&server)
            .await;

        let coordinate = client_for(&server).geocode("New Delhi").await.unwrap();
        assert_eq!(coordinate, Some(delhi()));
    }

    #[tokio::test]
    async fn test_geocode_unknown_city() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/geo/1.0/direct"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .mount(&server)
            .await;

        assert_eq!(client_for(&server).geocode("Atlantis").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_geocode_empty_name() {
        let server = MockServer::start().await;
        let err = client_for(&server).geocode("  ").await.unwrap_err();
        assert!(matches!(err, WeatherWiseError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_current_conditions_with_air_quality() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("units", "metric"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "weather": [{"description": "light rain"}],
                "main": {"temp": 27.3, "humidity": 83},
                "wind": {"speed": 5.0, "deg": 180},
                "sys": {"sunrise": 1_714_522_800, "sunset": 1_714_570_800}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/air_pollution"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "list": [{"main": {"aqi": 3}, "components": {"pm2_5": 41.0}}]
            })))
            .mount(&server)
            .await;

        let conditions = client_for(&server).current_conditions(delhi()).await.unwrap();
        assert_eq!(conditions.description, "Light Rain");
        assert_eq!(conditions.wind_kph, 18.0);
        assert_eq!(conditions.air_quality.unwrap().index, 3);
    }

    #[tokio::test]
    async fn test_current_conditions_without_air_quality() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "weather": [{"description": "clear sky"}],
                "main": {"temp": 35.0}
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/air_pollution"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let conditions = client_for(&server).current_conditions(delhi()).await.unwrap();
        assert_eq!(conditions.temperature, 35.0);
        assert!(conditions.air_quality.is_none());
    }

    #[tokio::test]
    async fn test_error_status_is_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = client_for(&server).current_conditions(delhi()).await.unwrap_err();
        assert!(matches!(err, WeatherWiseError::Api { status: Some(401), .. }));
        assert!(err.to_string().contains("401"));
        assert!(err.user_message().contains("API key"));
        assert!(!err.to_string().contains("test_api_key_123"));
    }

    #[tokio::test]
    async fn test_hourly_and_daily_forecast() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/forecast"))
            .respond_with(ResponseTemplate::new(200).set_body_json(forecast_body(40)))
            .mount(&server)
            .await;

        let entries = client_for(&server).forecast(delhi()).await.unwrap();
        assert_eq!(entries.len(), 40);

        let hourly = hourly_steps(&entries);
        assert_eq!(hourly.len(), 8);
        assert_eq!(hourly[0].temperature, 30.0);

        let daily = daily_samples(&entries);
        assert_eq!(daily.len(), 5);
        assert_eq!(daily[1].date.to_string(), "2024-05-02");
        assert_eq!(daily[1].temperature, 38.0);
    }

    #[tokio::test]
    async fn test_temperature_lookup_maps_failure_to_none() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("lat", "28.6139"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"main": {"temp": 31.5}})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/data/2.5/weather"))
            .and(query_param("lat", "10"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let client = client_for(&server);
        assert_eq!(client.temperature(delhi()).await, Some(31.5));
        let elsewhere = Coordinate::new(10.0, 10.0).unwrap();
        assert_eq!(client.temperature(elsewhere).await, None);
    }

    #[test]
    fn test_daily_samples_from_partial_day() {
        let entries: Vec<ForecastEntry> = serde_json::from_value::<ForecastResponse>(forecast_body(10))
            .unwrap()
            .into_entries();
        let daily = daily_samples(&entries);
        assert_eq!(daily.len(), 2);
        assert_eq!(daily[0].temperature, 30.0);
    }
}
