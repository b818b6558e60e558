use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;

use crate::config::LlmConfig;
use crate::llm::interface::CompletionClient;
use crate::llm::openai_compatible::OpenAiCompatibleClient;

/// Factory for completion clients.
pub struct CompletionClientFactory;

impl CompletionClientFactory {
    /// Create the collaborator client named by the configuration.
    ///
    /// # Arguments
    /// * `config` - Provider, endpoint and credential settings
    /// * `request_timeout` - Transport budget for a single completion
    pub fn create(
        config: &LlmConfig,
        request_timeout: Duration,
    ) -> Result<Arc<dyn CompletionClient>> {
        info!("Initializing completion client: {}", config.provider);

        match config.provider.as_str() {
            "openai_compatible" | "openai" | "groq" | "mistral" | "gemini_openai" => {
                let client = OpenAiCompatibleClient::new(
                    config.model.clone(),
                    config.base_url.clone(),
                    config.api_key.clone(),
                    request_timeout,
                )
                .context("building OpenAI-compatible client")?;
                Ok(Arc::new(client))
            }
            other => Err(anyhow::anyhow!("Unsupported completion provider: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LlmConfig;

    fn config(provider: &str) -> LlmConfig {
        LlmConfig {
            provider: provider.to_string(),
            base_url: "https://api.example.com/v1".to_string(),
            api_key: "test-key".to_string(),
            model: "gpt-4o-mini".to_string(),
        }
    }

    #[test]
    fn known_providers_build() {
        for provider in ["openai_compatible", "openai", "groq", "mistral", "gemini_openai"] {
            let client =
                CompletionClientFactory::create(&config(provider), Duration::from_secs(8));
            assert!(client.is_ok(), "{provider} should build");
        }
    }

    #[test]
    fn unknown_providers_are_rejected() {
        let err = CompletionClientFactory::create(&config("carrier_pigeon"), Duration::from_secs(8))
            .unwrap_err();
        assert!(err.to_string().contains("carrier_pigeon"));
    }
}
