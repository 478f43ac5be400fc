use crate::config::GeocodingConfig;
use crate::model::{Coordinates, GeocodedAddress};
use crate::services::Geocoder;
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::Deserialize;
use std::error::Error;
use std::time::Duration;

#[derive(Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
    #[serde(default)]
    status: String,
}

#[derive(Deserialize)]
struct GeocodeResult {
    formatted_address: String,
    geometry: Geometry,
}

#[derive(Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

/// Google Maps geocoding API client
pub struct GoogleGeocoder {
    client: Client,
    api_key: String,
    base_url: String,
}

impl GoogleGeocoder {
    /// Create a geocoder from configuration
    pub fn new(
        config: &GeocodingConfig,
        timeout: Duration,
    ) -> Result<Self, Box<dyn Error + Send + Sync>> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GOOGLE_MAPS_API_KEY").ok())
            .ok_or("GOOGLE_MAPS_API_KEY not found in config or environment")?;

        let client = Client::builder().timeout(timeout).build()?;

        Ok(GoogleGeocoder {
            client,
            api_key,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    #[doc(hidden)]
    pub fn with_base_url(api_key: String, base_url: String) -> Self {
        GoogleGeocoder {
            client: Client::new(),
            api_key,
            base_url,
        }
    }
}

#[async_trait]
impl Geocoder for GoogleGeocoder {
    async fn resolve(
        &self,
        address: &str,
    ) -> Result<Option<GeocodedAddress>, Box<dyn Error + Send + Sync>> {
        let response = self
            .client
            .get(format!("{}/maps/api/geocode/json", self.base_url))
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(format!(
                "Geocoding request failed with status: {}",
                response.status()
            )
            .into());
        }

        let body: GeocodeResponse = response.json().await?;
        debug!("Geocoding '{}' returned status {}", address, body.status);

        Ok(body.results.into_iter().next().map(|result| GeocodedAddress {
            coordinates: Coordinates {
                latitude: result.geometry.location.lat,
                longitude: result.geometry.location.lng,
            },
            formatted_address: result.formatted_address,
        }))
    }
}
