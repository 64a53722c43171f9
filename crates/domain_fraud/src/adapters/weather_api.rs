//! Weather lookups

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

use core_kernel::{CircuitBreakerConfig, DomainPort, PortError};

use super::circuit_breaker::CircuitBreaker;
use super::http::{map_status, map_transport_error};
use crate::signals::{WeatherLookup, WeatherReport};

const SERVICE: &str = "weather_api";

/// Conditions reported as rain
const RAINY_CONDITIONS: &[&str] = &["rain", "drizzle", "thunderstorm", "shower"];

/// Used when no weather service is configured; never knows the weather
#[derive(Debug, Clone, Copy, Default)]
pub struct NullWeatherLookup;

impl DomainPort for NullWeatherLookup {}

#[async_trait]
impl WeatherLookup for NullWeatherLookup {
    async fn condition_at(&self, _location: &str, _date: NaiveDate) -> Result<Option<WeatherReport>, PortError> {
        Ok(None)
    }
}

#[derive(Debug, Clone)]
pub struct OpenWeatherConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
    pub circuit_breaker: CircuitBreakerConfig,
}

impl OpenWeatherConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.openweathermap.org/data/2.5/weather".to_string(),
            timeout: Duration::from_secs(5),
            circuit_breaker: CircuitBreakerConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CurrentWeather {
    #[serde(default)]
    weather: Vec<Condition>,
    main: MainReadings,
}

#[derive(Debug, Deserialize)]
struct Condition {
    main: String,
    #[serde(default)]
    description: String,
}

#[derive(Debug, Deserialize)]
struct MainReadings {
    temp: f64,
}

/// Current conditions from OpenWeather
///
/// The service only reports current weather, so lookups for any date other
/// than today (UTC) answer `None`.
pub struct OpenWeatherLookup {
    client: reqwest::Client,
    config: OpenWeatherConfig,
    breaker: CircuitBreaker,
}

impl OpenWeatherLookup {
    pub fn new(config: OpenWeatherConfig) -> Result<Self, PortError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PortError::internal(format!("{SERVICE}: client build failed: {e}")))?;
        let breaker = CircuitBreaker::new(SERVICE, config.circuit_breaker.clone());
        Ok(Self { client, config, breaker })
    }

    async fn fetch(&self, location: &str) -> Result<Option<WeatherReport>, PortError> {
        let timeout_ms = self.config.timeout.as_millis() as u64;
        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[("q", location), ("appid", self.config.api_key.as_str()), ("units", "metric")])
            .send()
            .await
            .map_err(|e| map_transport_error(SERVICE, e, timeout_ms))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!(location, "Weather service does not know this location");
            return Ok(None);
        }
        if !status.is_success() {
            return Err(map_status(SERVICE, status));
        }

        let body: CurrentWeather = response
            .json()
            .await
            .map_err(|e| map_transport_error(SERVICE, e, timeout_ms))?;
        Ok(Some(to_report(&body)))
    }
}

fn to_report(body: &CurrentWeather) -> WeatherReport {
    let condition = body
        .weather
        .first()
        .map(|c| c.main.to_lowercase())
        .unwrap_or_default();
    let is_rainy = body.weather.iter().any(|c| {
        let text = format!("{} {}", c.main, c.description).to_lowercase();
        RAINY_CONDITIONS.iter().any(|r| text.contains(r))
    });
    WeatherReport {
        condition,
        is_rainy,
        temp: body.main.temp,
    }
}

impl DomainPort for OpenWeatherLookup {}

#[async_trait]
impl WeatherLookup for OpenWeatherLookup {
    async fn condition_at(&self, location: &str, date: NaiveDate) -> Result<Option<WeatherReport>, PortError> {
        if date != Utc::now().date_naive() {
            return Ok(None);
        }
        if !self.breaker.is_available().await {
            return Err(PortError::unavailable(format!("{SERVICE} circuit open")));
        }
        match self.fetch(location).await {
            Ok(report) => {
                self.breaker.record_success();
                Ok(report)
            }
            Err(error) => {
                if error.is_transient() {
                    self.breaker.record_failure().await;
                }
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_from_payload() {
        let body: CurrentWeather = serde_json::from_str(
            r#"{"weather":[{"main":"Drizzle","description":"light intensity drizzle"}],"main":{"temp":11.5}}"#,
        )
        .unwrap();
        let report = to_report(&body);

        assert_eq!(report.condition, "drizzle");
        assert!(report.is_rainy);
        assert_eq!(report.temp, 11.5);
    }

    #[test]
    fn test_clear_sky_is_not_rainy() {
        let body: CurrentWeather =
            serde_json::from_str(r#"{"weather":[{"main":"Clear","description":"clear sky"}],"main":{"temp":28.0}}"#)
                .unwrap();
        assert!(!to_report(&body).is_rainy);
    }

    #[tokio::test]
    async fn test_past_dates_are_unknown() {
        let lookup = OpenWeatherLookup::new(OpenWeatherConfig::new("key")).unwrap();
        let past = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        assert_eq!(lookup.condition_at("Miami, FL", past).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_null_lookup() {
        let today = Utc::now().date_naive();
        assert_eq!(NullWeatherLookup.condition_at("Miami, FL", today).await.unwrap(), None);
    }
}
