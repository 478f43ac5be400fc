use thiserror::Error;

/// Errors that can occur while producing recommendations
#[derive(Error, Debug)]
pub enum RecommendError {
    /// Failed to reach an upstream HTTP service
    #[error("Failed to fetch URL: {0}")]
    FetchError(#[from] reqwest::Error),

    /// The address resolver found no match for the requested place
    #[error("Location not found: {0}")]
    LocationNotFound(String),

    /// The address resolver itself failed
    #[error("Geocoding failed: {0}")]
    GeocodingError(String),

    /// The weather service failed or returned an error payload
    #[error("Weather API error: {0}")]
    WeatherError(String),

    /// The text generator failed
    #[error("Generation failed: {0}")]
    GenerationError(String),

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// Failed to serialize a rendered report
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// Failed to persist a report
    #[error("Report error: {0}")]
    ReportError(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}
