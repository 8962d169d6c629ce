//! Current-weather lookup over HTTP

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use crate::errors::{Result, WeatherError};

/// Default current-weather endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";

/// Weather client configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
    /// No default; lookups fail with [`WeatherError::MissingApiKey`] when unset
    pub api_key: Option<String>,
    /// `None` waits for the response indefinitely
    pub timeout_secs: Option<u64>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: None,
            timeout_secs: Some(10),
        }
    }
}

/// Temperature and humidity at one place and time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeatherObservation {
    /// Degrees Celsius
    pub temperature: f64,
    /// Relative humidity, percent
    pub humidity: f64,
}

/// Anything that can report the current weather for a city
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self, city: &str) -> Result<WeatherObservation>;
}

#[derive(Deserialize)]
struct CurrentWeather {
    main: MainReadings,
}

#[derive(Deserialize)]
struct MainReadings {
    temp: f64,
    humidity: f64,
}

/// Extract `main.temp` and `main.humidity` from a response body
pub fn parse_observation(body: &str) -> Result<WeatherObservation> {
    let parsed: CurrentWeather =
        serde_json::from_str(body).map_err(|e| WeatherError::MalformedResponse(e.to_string()))?;

    let observation = WeatherObservation {
        temperature: parsed.main.temp,
        humidity: parsed.main.humidity,
    };
    if !observation.temperature.is_finite() || !observation.humidity.is_finite() {
        return Err(WeatherError::MalformedResponse(
            "non-finite temperature or humidity".to_string(),
        ));
    }
    Ok(observation)
}

/// Map a non-success HTTP status to its error class
pub fn classify_status(status: u16, city: &str, body: String) -> WeatherError {
    match status {
        404 => WeatherError::CityNotFound(city.to_string()),
        401 => WeatherError::Unauthorized,
        _ => WeatherError::Upstream { status, body },
    }
}

/// OpenWeatherMap-compatible client
pub struct OpenWeatherClient {
    config: WeatherConfig,
    api_key: String,
    client: reqwest::Client,
}

impl OpenWeatherClient {
    pub fn new(config: WeatherConfig) -> Result<Self> {
        let api_key = config
            .api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .ok_or(WeatherError::MissingApiKey)?;

        let mut builder = reqwest::Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| WeatherError::Client(e.to_string()))?;

        Ok(Self {
            config,
            api_key,
            client,
        })
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn current(&self, city: &str) -> Result<WeatherObservation> {
        debug!("Requesting current weather for {}", city);

        let response = self
            .client
            .get(&self.config.base_url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(|e| WeatherError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| WeatherError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(classify_status(status.as_u16(), city, body));
        }

        parse_observation(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_observation() {
        let body = r#"{"coord":{"lon":80.9,"lat":26.8},"main":{"temp":31.5,"feels_like":35.0,"humidity":48},"name":"Lucknow"}"#;
        let obs = parse_observation(body).unwrap();
        assert_eq!(obs.temperature, 31.5);
        assert_eq!(obs.humidity, 48.0);
    }

    #[test]
    fn test_parse_rejects_missing_fields() {
        assert!(matches!(
            parse_observation(r#"{"main":{"temp":20.0}}"#),
            Err(WeatherError::MalformedResponse(_))
        ));
        assert!(matches!(
            parse_observation(r#"{"cod":"404","message":"city not found"}"#),
            Err(WeatherError::MalformedResponse(_))
        ));
        assert!(parse_observation("<html>").is_err());
    }

    #[test]
    fn test_classify_status() {
        assert!(matches!(
            classify_status(404, "Atlantis", String::new()),
            WeatherError::CityNotFound(ref c) if c == "Atlantis"
        ));
        assert!(matches!(
            classify_status(401, "Lucknow", String::new()),
            WeatherError::Unauthorized
        ));
        assert!(matches!(
            classify_status(502, "Lucknow", "bad gateway".into()),
            WeatherError::Upstream { status: 502, .. }
        ));
    }

    #[test]
    fn test_client_requires_api_key() {
        assert!(matches!(
            OpenWeatherClient::new(WeatherConfig::default()),
            Err(WeatherError::MissingApiKey)
        ));
        let blank = WeatherConfig {
            api_key: Some("  ".into()),
            ..Default::default()
        };
        assert!(matches!(
            OpenWeatherClient::new(blank),
            Err(WeatherError::MissingApiKey)
        ));
    }
}
