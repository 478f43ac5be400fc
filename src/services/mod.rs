mod geocoding;
mod weather;

pub use geocoding::GoogleGeocoder;
pub use weather::OpenWeatherClient;

use crate::model::{Coordinates, GeocodedAddress, WeatherSnapshot};
use async_trait::async_trait;
use std::error::Error;

/// Resolves free-form place text to coordinates
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` means the resolver had no match for `address`
    async fn resolve(
        &self,
        address: &str,
    ) -> Result<Option<GeocodedAddress>, Box<dyn Error + Send + Sync>>;
}

/// Looks up the current weather at a point
#[async_trait]
pub trait WeatherService: Send + Sync {
    async fn current(
        &self,
        coordinates: Coordinates,
    ) -> Result<WeatherSnapshot, Box<dyn Error + Send + Sync>>;
}
