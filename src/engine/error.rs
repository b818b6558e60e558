use std::time::Duration;

/// Errors surfaced to callers of the translate operation.
///
/// Everything downstream of input validation degrades to a low-confidence
/// response instead of erroring, so this enum stays deliberately small.
#[derive(Debug, thiserror::Error)]
pub enum TranslationError {
    #[error("input text is empty or whitespace-only")]
    EmptyInput,
    #[error("input text exceeds the {max} character limit")]
    InputTooLong { max: usize },
}

/// Failures of the external language-model collaborator. These never reach
/// the caller; the resolver converts them into a degraded response.
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("language model request timed out after {0:?}")]
    Timeout(Duration),
    #[error("language model transport error: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("language model returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("language model output failed validation: {0}")]
    MalformedOutput(String),
}

impl LlmError {
    /// Short tag for logs and degraded-response rationales. Never includes
    /// patient text or response bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            LlmError::Timeout(_) => "timeout",
            LlmError::Transport(_) => "transport",
            LlmError::Status { .. } => "status",
            LlmError::MalformedOutput(_) => "malformed_output",
        }
    }
}

/// Errors from the clinician feedback operation.
#[derive(Debug, thiserror::Error)]
pub enum FeedbackError {
    #[error("no translation found for id {0}")]
    UnknownTranslation(uuid::Uuid),
    #[error("correction exceeds the {max} character limit")]
    CorrectionTooLong { max: usize },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn llm_error_kinds_are_stable_tags() {
        assert_eq!(LlmError::Timeout(Duration::from_secs(8)).kind(), "timeout");
        assert_eq!(
            LlmError::MalformedOutput("no json object".into()).kind(),
            "malformed_output"
        );
        assert_eq!(
            LlmError::Status { status: 503, body: "overloaded".into() }.kind(),
            "status"
        );
    }

    #[test]
    fn translation_error_messages_name_the_limit() {
        let err = TranslationError::InputTooLong { max: 2000 };
        assert!(err.to_string().contains("2000"));
    }
}
