use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::config::{AppConfig, ProviderConfig};
use crate::error::RecommendError;
use crate::model::{RecommendationQuery, RecommendationReport};
use crate::pipelines::RecommendationPipeline;
use crate::providers::ProviderFactory;
use crate::render::{render, OutputFormat};
use crate::report::ReportSink;

/// Text-generation provider selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provider {
    Google,
    OpenAI,
    Anthropic,
}

impl Provider {
    /// Convert to provider name string used by the factory
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Google => "google",
            Provider::OpenAI => "openai",
            Provider::Anthropic => "anthropic",
        }
    }
}

impl FromStr for Provider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "google" | "gemini" => Ok(Provider::Google),
            "openai" => Ok(Provider::OpenAI),
            "anthropic" => Ok(Provider::Anthropic),
            other => Err(format!(
                "Unknown provider: {} (available: {})",
                other,
                ProviderFactory::available_providers().join(", ")
            )),
        }
    }
}

/// Result of a recommendation request
#[derive(Debug, Clone)]
pub struct RecommendResult {
    /// Structured report: context, records and raw generator output
    pub report: RecommendationReport,
    /// The report rendered in the requested format
    pub rendered: String,
    /// Where the rendered report was written, when saving was requested
    pub saved_to: Option<PathBuf>,
}

/// Builder for configuring and executing recommendation requests
#[derive(Debug, Default)]
pub struct RecommenderBuilder {
    location: Option<String>,
    budget_krw: f64,
    interests: Vec<String>,
    provider: Option<Provider>,
    api_key: Option<String>,
    model: Option<String>,
    timeout: Option<Duration>,
    config: Option<AppConfig>,
    format: OutputFormat,
    save_report: Option<bool>,
}

impl RecommenderBuilder {
    /// Set the place to recommend around
    ///
    /// # Example
    /// ```
    /// use weather_recommender::Recommender;
    ///
    /// let builder = Recommender::builder().location("Seoul");
    /// ```
    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Set the budget in KRW; 0 (the default) means any budget
    pub fn budget_krw(mut self, budget: f64) -> Self {
        self.budget_krw = budget;
        self
    }

    /// Add an interest to steer the suggestions, e.g. "museums"
    pub fn interest(mut self, interest: impl Into<String>) -> Self {
        self.interests.push(interest.into());
        self
    }

    /// Use a specific text-generation provider instead of the configured chain
    ///
    /// # Example
    /// ```
    /// use weather_recommender::{Provider, Recommender};
    ///
    /// let builder = Recommender::builder()
    ///     .location("Busan")
    ///     .provider(Provider::Anthropic);
    /// ```
    pub fn provider(mut self, provider: Provider) -> Self {
        self.provider = Some(provider);
        self
    }

    /// Set the API key for the text-generation provider
    ///
    /// This allows passing the API key directly instead of relying on
    /// environment variables or config files.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Set the model name for the text-generation provider
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set a timeout for HTTP requests
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Use an explicit configuration instead of `config.toml` and the environment
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the output format of the rendered report (HTML by default)
    pub fn format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Write the rendered report to the configured reports directory
    pub fn save_report(mut self, save: bool) -> Self {
        self.save_report = Some(save);
        self
    }

    /// Build and execute the recommendation request
    ///
    /// # Errors
    /// Returns `RecommendError` if:
    /// - No location was specified
    /// - The location cannot be resolved
    /// - The weather lookup or the text generation fails
    /// - Saving the report fails
    ///
    /// Generator output that cannot be normalized is not an error; the
    /// report simply has no records.
    ///
    /// # Example
    /// ```no_run
    /// # use weather_recommender::Recommender;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let result = Recommender::builder()
    ///     .location("Seoul")
    ///     .budget_krw(50000.0)
    ///     .build()
    ///     .await?;
    /// println!("{}", result.rendered);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn build(self) -> Result<RecommendResult, RecommendError> {
        let location = self
            .location
            .filter(|l| !l.trim().is_empty())
            .ok_or_else(|| {
                RecommendError::BuilderError(
                    "No location specified. Use .location()".to_string(),
                )
            })?;

        let mut config = match self.config {
            Some(config) => config,
            None => AppConfig::load()?,
        };
        apply_overrides(
            &mut config,
            self.provider,
            self.api_key,
            self.model,
            self.timeout,
        )?;

        let pipeline = RecommendationPipeline::from_config(&config)?;
        let query = RecommendationQuery {
            location,
            budget_krw: self.budget_krw,
            interests: self.interests,
        };
        let report = pipeline.run(&query).await?;
        let rendered = render(&report, self.format)?;

        let saved_to = if self.save_report.unwrap_or(config.reports.enabled) {
            let sink = ReportSink::new(&config.reports.directory);
            Some(sink.save(&query.location, self.format, &rendered).await?)
        } else {
            None
        };

        Ok(RecommendResult {
            report,
            rendered,
            saved_to,
        })
    }
}

/// Fold builder options into the loaded configuration.
///
/// An explicit provider replaces the fallback chain. Providers named by the
/// configuration but without a table get a default entry, so their keys can
/// come from the environment. A key or model override applies to the default
/// provider.
fn apply_overrides(
    config: &mut AppConfig,
    provider: Option<Provider>,
    api_key: Option<String>,
    model: Option<String>,
    timeout: Option<Duration>,
) -> Result<(), RecommendError> {
    if let Some(provider) = provider {
        config.default_provider = provider.as_str().to_string();
        config.fallback.enabled = false;
    }
    ProviderFactory::fill_missing_entries(config);

    if api_key.is_some() || model.is_some() {
        let name = config.default_provider.clone();
        let model = model
            .or_else(|| config.providers.get(&name).map(|p| p.model.clone()))
            .or_else(|| ProviderFactory::default_model(&name).map(str::to_string))
            .ok_or_else(|| {
                RecommendError::BuilderError(format!("No default model for provider '{}'", name))
            })?;

        let entry = config
            .providers
            .entry(name)
            .or_insert_with(|| ProviderConfig::with_model(model.clone()));
        entry.enabled = true;
        entry.model = model;
        if api_key.is_some() {
            entry.api_key = api_key;
        }
        config.fallback.enabled = false;
    }

    if let Some(timeout) = timeout {
        config.timeout = timeout.as_secs().max(1);
    }

    Ok(())
}

/// Main entry point for the builder API
pub struct Recommender;

impl Recommender {
    /// Creates a new builder for recommendation requests
    ///
    /// # Example
    /// ```
    /// use weather_recommender::Recommender;
    ///
    /// let builder = Recommender::builder();
    /// ```
    pub fn builder() -> RecommenderBuilder {
        RecommenderBuilder::default()
    }
}
