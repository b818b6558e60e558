use async_trait::async_trait;

use crate::engine::error::LlmError;

/// One bounded completion exchange with the collaborator model.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_text: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl CompletionRequest {
    /// Low-temperature request, the only mode the pipeline uses: the
    /// collaborator adapts language, it does not get creative.
    pub fn deterministic(system_prompt: impl Into<String>, user_text: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_text: user_text.into(),
            temperature: 0.1,
            max_tokens: 300,
        }
    }
}

/// Interface to the external language model.
///
/// Implementations carry their own transport timeouts; the resolver adds a
/// `tokio::time::timeout` on top so a hung collaborator can never stall the
/// pipeline past its budget.
#[async_trait]
pub trait CompletionClient: Send + Sync + std::fmt::Debug {
    /// Run one completion and return the raw reply text.
    async fn complete(&self, request: CompletionRequest) -> Result<String, LlmError>;

    /// Provider label for logs and health reporting.
    fn name(&self) -> &str;
}
