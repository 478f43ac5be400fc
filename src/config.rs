use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::HashMap;

/// Main application configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Default text-generation provider to use when not specified
    #[serde(default = "default_provider")]
    pub default_provider: String,
    /// Map of provider name to provider configuration
    #[serde(default)]
    pub providers: HashMap<String, ProviderConfig>,
    /// Fallback configuration for automatic provider switching
    #[serde(default)]
    pub fallback: FallbackConfig,
    /// Address resolver configuration
    #[serde(default)]
    pub geocoding: GeocodingConfig,
    /// Weather lookup configuration
    #[serde(default)]
    pub weather: WeatherConfig,
    /// Recommendation prompt and currency settings
    #[serde(default)]
    pub recommendations: RecommendationConfig,
    /// Report sink configuration
    #[serde(default)]
    pub reports: ReportConfig,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// Configuration for a specific text-generation provider
#[derive(Debug, Deserialize, Clone)]
pub struct ProviderConfig {
    /// Whether this provider is enabled
    pub enabled: bool,
    /// Model identifier (e.g., "gemini-2.5-pro", "gpt-4.1-mini")
    pub model: String,
    /// Temperature for generation (0.0-1.0)
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// API key for authentication (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for custom or proxy endpoints)
    pub base_url: Option<String>,
    /// Request timeout in seconds; inherits the top-level `timeout` when unset
    #[serde(default)]
    pub timeout: Option<u64>,
}

impl ProviderConfig {
    /// An enabled provider entry with default generation settings
    pub fn with_model(model: impl Into<String>) -> Self {
        Self {
            enabled: true,
            model: model.into(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            api_key: None,
            base_url: None,
            timeout: None,
        }
    }
}

/// Configuration for provider fallback and retry behavior
#[derive(Debug, Deserialize, Clone)]
pub struct FallbackConfig {
    /// Whether fallback is enabled
    #[serde(default)]
    pub enabled: bool,
    /// Order of providers to try (first to last)
    #[serde(default)]
    pub order: Vec<String>,
    /// Number of retry attempts per provider before fallback
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    /// Initial delay between retries in milliseconds (grows with each attempt)
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            order: Vec::new(),
            retry_attempts: default_retry_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
        }
    }
}

/// Configuration for the Google geocoding API
#[derive(Debug, Deserialize, Clone)]
pub struct GeocodingConfig {
    /// API key (falls back to GOOGLE_MAPS_API_KEY)
    pub api_key: Option<String>,
    #[serde(default = "default_geocoding_url")]
    pub base_url: String,
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_geocoding_url(),
        }
    }
}

/// Configuration for the OpenWeather current-weather API
#[derive(Debug, Deserialize, Clone)]
pub struct WeatherConfig {
    /// API key (falls back to OPENWEATHER_API_KEY)
    pub api_key: Option<String>,
    #[serde(default = "default_weather_url")]
    pub base_url: String,
    /// Unit system passed to the API; "metric" yields Celsius
    #[serde(default = "default_units")]
    pub units: String,
    #[serde(default = "default_lang")]
    pub lang: String,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_url(),
            units: default_units(),
            lang: default_lang(),
        }
    }
}

/// Settings that shape the prompt and the normalized cost fields
#[derive(Debug, Deserialize, Clone)]
pub struct RecommendationConfig {
    /// Number of suggestions requested from the model
    #[serde(default = "default_count")]
    pub count: usize,
    /// KRW -> USD conversion rate applied when the model omits `cost_usd`
    #[serde(default = "default_exchange_rate")]
    pub exchange_rate: f64,
}

impl Default for RecommendationConfig {
    fn default() -> Self {
        Self {
            count: default_count(),
            exchange_rate: default_exchange_rate(),
        }
    }
}

/// Configuration for saving rendered reports to disk
#[derive(Debug, Deserialize, Clone)]
pub struct ReportConfig {
    #[serde(default)]
    pub enabled: bool,
    #[serde(default = "default_report_dir")]
    pub directory: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            directory: default_report_dir(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_provider: default_provider(),
            providers: HashMap::new(),
            fallback: FallbackConfig::default(),
            geocoding: GeocodingConfig::default(),
            weather: WeatherConfig::default(),
            recommendations: RecommendationConfig::default(),
            reports: ReportConfig::default(),
            timeout: default_timeout(),
        }
    }
}

// Default value functions
fn default_provider() -> String {
    "google".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> u32 {
    2000
}

fn default_retry_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    1000
}

fn default_geocoding_url() -> String {
    "https://maps.googleapis.com".to_string()
}

fn default_weather_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_units() -> String {
    "metric".to_string()
}

fn default_lang() -> String {
    "en".to_string()
}

fn default_count() -> usize {
    3
}

fn default_exchange_rate() -> f64 {
    0.00073
}

fn default_report_dir() -> String {
    "reports".to_string()
}

fn default_timeout() -> u64 {
    30
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with RECOMMENDER__ prefix
    /// 2. config.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: RECOMMENDER__PROVIDERS__GOOGLE__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }

    /// Configuration for the default provider, if present
    pub fn default_provider_config(&self) -> Option<&ProviderConfig> {
        self.providers.get(&self.default_provider)
    }
}

/// Load configuration from file and environment variables
///
/// See [`AppConfig::load`] for the source priority.
pub fn load_config() -> Result<AppConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("config").required(false))
        // Use double underscore for nested: RECOMMENDER__WEATHER__API_KEY
        .add_source(
            Environment::with_prefix("RECOMMENDER")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
