mod anthropic;
mod factory;
mod fallback;
mod google;
mod open_ai;
mod prompt;

pub use anthropic::AnthropicProvider;
pub use factory::ProviderFactory;
pub use fallback::FallbackProvider;
pub use google::GoogleProvider;
pub use open_ai::OpenAIProvider;
pub use prompt::{build_recommendation_prompt, RECOMMENDATION_SYSTEM_PROMPT};
pub(crate) use prompt::group_thousands;

use crate::config::ProviderConfig;
use async_trait::async_trait;
use reqwest::Client;
use std::error::Error;
use std::time::Duration;

/// Unified trait for all text-generation providers
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Get the provider name (e.g., "google", "openai")
    fn provider_name(&self) -> &str;

    /// Generate a completion for `prompt`, returned as raw text
    async fn generate(&self, prompt: &str) -> Result<String, Box<dyn Error + Send + Sync>>;
}

/// HTTP client for one provider, bounded by its configured timeout
pub(crate) fn http_client(config: &ProviderConfig) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder();
    if let Some(seconds) = config.timeout {
        builder = builder.timeout(Duration::from_secs(seconds));
    }
    builder.build()
}
