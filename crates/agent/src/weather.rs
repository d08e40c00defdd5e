use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use thiserror::Error;
use tracing::warn;
use wardrobe_core::config::WeatherConfig;
use wardrobe_core::domain::weather::WeatherContext;

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("weather lookup is not configured: {0}")]
    NotConfigured(String),
    #[error("weather request failed: {0}")]
    Transport(String),
    #[error("weather service returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("weather response could not be decoded: {0}")]
    Decode(String),
}

#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn current(&self, city: &str) -> Result<WeatherContext, WeatherError>;
}

/// OpenWeather current conditions in metric units.
pub struct OpenWeatherClient {
    http: Client,
    base_url: String,
    api_key: SecretString,
}

impl OpenWeatherClient {
    pub fn new(
        base_url: impl Into<String>,
        api_key: SecretString,
        timeout: Duration,
    ) -> Result<Self, WeatherError> {
        if api_key.expose_secret().trim().is_empty() {
            return Err(WeatherError::NotConfigured("weather api key is empty".to_string()));
        }
        let http = Client::builder().timeout(timeout).build().map_err(|error| {
            WeatherError::NotConfigured(format!("failed to build HTTP client: {error}"))
        })?;
        Ok(Self { http, base_url: base_url.into(), api_key })
    }

    pub fn endpoint(&self) -> String {
        format!("{}/data/2.5/weather", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl WeatherSource for OpenWeatherClient {
    async fn current(&self, city: &str) -> Result<WeatherContext, WeatherError> {
        let response = self
            .http
            .get(self.endpoint())
            .query(&[("q", city), ("units", "metric"), ("appid", self.api_key.expose_secret())])
            .send()
            .await
            .map_err(|error| WeatherError::Transport(error.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body =
                response.text().await.unwrap_or_else(|_| "<response unavailable>".to_string());
            return Err(WeatherError::Status { status: status.as_u16(), body });
        }

        let payload = response
            .json::<Value>()
            .await
            .map_err(|error| WeatherError::Decode(error.to_string()))?;
        parse_current_weather(&payload, city)
    }
}

/// Reads `main.temp` and the first `weather[].description` from an OpenWeather payload.
pub fn parse_current_weather(payload: &Value, city: &str) -> Result<WeatherContext, WeatherError> {
    let temperature = payload
        .pointer("/main/temp")
        .and_then(Value::as_f64)
        .ok_or_else(|| WeatherError::Decode("missing main.temp".to_string()))?;

    let first = payload.pointer("/weather/0");
    let description = first
        .and_then(|entry| entry.get("description"))
        .or_else(|| first.and_then(|entry| entry.get("main")))
        .and_then(Value::as_str)
        .unwrap_or_default();

    let name = payload
        .get("name")
        .and_then(Value::as_str)
        .filter(|name| !name.trim().is_empty())
        .unwrap_or(city);

    Ok(WeatherContext::new(Some(temperature), description).with_city(name))
}

/// Fixed conditions, for tests and offline runs.
#[derive(Clone, Debug)]
pub struct StaticWeather {
    weather: WeatherContext,
}

impl StaticWeather {
    pub fn new(weather: WeatherContext) -> Self {
        Self { weather }
    }
}

#[async_trait]
impl WeatherSource for StaticWeather {
    async fn current(&self, city: &str) -> Result<WeatherContext, WeatherError> {
        Ok(self.weather.clone().with_city(city))
    }
}

/// Current weather for `city`, or an unknown-temperature context on any failure.
pub async fn lookup_or_unknown(
    source: &dyn WeatherSource,
    city: &str,
    timeout: Duration,
) -> WeatherContext {
    match tokio::time::timeout(timeout, source.current(city)).await {
        Ok(Ok(weather)) => weather,
        Ok(Err(error)) => {
            warn!(
                event_name = "recommend.weather.lookup_failed",
                city,
                error = %error,
                "weather lookup failed; continuing without temperature"
            );
            WeatherContext::unknown().with_city(city)
        }
        Err(_) => {
            warn!(
                event_name = "recommend.weather.lookup_timed_out",
                city,
                timeout_ms = timeout.as_millis() as u64,
                "weather lookup timed out; continuing without temperature"
            );
            WeatherContext::unknown().with_city(city)
        }
    }
}

/// `None` when weather lookup is disabled.
pub fn weather_source_from_config(
    config: &WeatherConfig,
) -> Result<Option<Arc<dyn WeatherSource>>, WeatherError> {
    if !config.enabled {
        return Ok(None);
    }
    let api_key = config
        .api_key
        .clone()
        .ok_or_else(|| WeatherError::NotConfigured("weather.api_key is missing".to_string()))?;
    let client = OpenWeatherClient::new(
        config.base_url.clone(),
        api_key,
        Duration::from_secs(config.timeout_secs),
    )?;
    Ok(Some(Arc::new(client)))
}
