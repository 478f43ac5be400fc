use crate::config::WeatherConfig;
use crate::model::{Coordinates, WeatherSnapshot};
use crate::services::WeatherService;
use async_trait::async_trait;
use log::{debug, error};
use reqwest::Client;
use serde_json::Value;
use std::error::Error;
use std::time::Duration;

/// OpenWeather current-weather API client
pub struct OpenWeatherClient {
    client: Client,
    api_key: String,
    base_url: String,
    units: String,
    lang: String,
}

impl OpenWeatherClient {
    /// Create a weather client from configuration
    pub fn new(
        config: &WeatherConfig,
        timeout: Duration,
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("OPENWEATHER_API_KEY").ok())
            .ok_or("OPENWEATHER_API_KEY not found in config or environment")?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(OpenWeatherClient {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            units: config.units.clone(),
            lang: config.lang.clone(),
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        OpenWeatherClient {
            client: Client::new(),
            api_key,
            base_url,
            units: "metric".to_string(),
            lang: "en".to_string(),
        }
    }
}

#[async_trait]
impl WeatherService for OpenWeatherClient {
    async fn current(
        &self,
        coordinates: Coordinates,
    ) -> Result<WeatherSnapshot, Box<dyn Error + Send + Sync>> {
        let response = self
            .client
            .get(format!("{}/data/2.5/weather", self.base_url))
            .query(&[
                ("lat", coordinates.latitude.to_string()),
                ("lon", coordinates.longitude.to_string()),
                ("appid", self.api_key.clone()),
                ("units", self.units.clone()),
                ("lang", self.lang.clone()),
            ])
            .send()
            .await?;

        let status = response.status();
        let body: Value = response.json().await?;
        debug!("Weather API raw response: {}", body);

        // `cod` is a number on success but a string on most errors
        let cod = match &body["cod"] {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        };
        if !status.is_success() || cod != Some(200) {
            let message = body["message"].as_str().unwrap_or("Unknown error");
            return Err(message.to_string().into());
        }

        parse_snapshot(&body).map_err(|missing| {
            error!("Missing weather key: {}", missing);
            format!("Weather data incomplete: missing key {}", missing).into()
        })
    }
}

/// Err carries the name of the first missing key.
fn parse_snapshot(body: &Value) -> Result<WeatherSnapshot, &'static str> {
    let temperature_celsius = body["main"]["temp"].as_f64().ok_or("main.temp")?;
    let description = body["weather"][0]["description"]
        .as_str()
        .ok_or("weather.description")?
        .to_string();
    let humidity = body["main"]["humidity"]
        .as_u64()
        .map(|h| h.min(100) as u8)
        .ok_or("main.humidity")?;

    Ok(WeatherSnapshot {
        temperature_celsius,
        description,
        humidity,
    })
}
