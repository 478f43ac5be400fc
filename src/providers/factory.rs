use crate::config::{AppConfig, ProviderConfig};
use crate::providers::{AnthropicProvider, GoogleProvider, LlmProvider, OpenAIProvider};
use log::debug;
use std::error::Error;

pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider instance from configuration
    pub fn create(
        provider_name: &str,
        config: &ProviderConfig,
    ) -> Result<Box<dyn LlmProvider>, Box<dyn Error + Send + Sync>> {
        // Validate that provider is enabled
        if !config.enabled {
            return Err(format!(
                "Provider '{}' is not enabled in configuration",
                provider_name
            )
            .into());
        }

        match provider_name {
            "google" => Ok(Box::new(GoogleProvider::new(config)?)),
            "openai" => Ok(Box::new(OpenAIProvider::new(config)?)),
            "anthropic" => Ok(Box::new(AnthropicProvider::new(config)?)),
            _ => Err(format!("Unknown provider: {}", provider_name).into()),
        }
    }

    /// Get the default provider from configuration
    pub fn get_default_provider(
        config: &AppConfig,
    ) -> Result<Box<dyn LlmProvider>, Box<dyn Error + Send + Sync>> {
        let provider_name = &config.default_provider;
        let provider_config = config.providers.get(provider_name).ok_or_else(|| {
            format!(
                "Default provider '{}' not found in configuration",
                provider_name
            )
        })?;

        Self::create(provider_name, provider_config)
    }

    /// Default model per provider, used when only an API key is supplied
    pub fn default_model(provider_name: &str) -> Option<&'static str> {
        match provider_name {
            "google" => Some("gemini-2.5-pro"),
            "openai" => Some("gpt-4.1-mini"),
            "anthropic" => Some("claude-sonnet-4-5"),
            _ => None,
        }
    }

    /// List all available provider names
    pub fn available_providers() -> Vec<&'static str> {
        vec!["google", "openai", "anthropic"]
    }

    /// Add a default entry for the default provider and every provider in the
    /// fallback order that has no table of its own, so keys set only in the
    /// environment are still picked up. Existing entries are left untouched.
    pub fn fill_missing_entries(config: &mut AppConfig) {
        let names: Vec<String> = std::iter::once(config.default_provider.clone())
            .chain(config.fallback.order.iter().cloned())
            .collect();

        for name in names {
            if config.providers.contains_key(&name) {
                continue;
            }
            if let Some(model) = Self::default_model(&name) {
                debug!("No '{}' provider configured, using model {}", name, model);
                config
                    .providers
                    .insert(name, ProviderConfig::with_model(model));
            }
        }
    }
}
