use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use tracing::{debug, warn};

use crate::engine::error::LlmError;
use crate::language::detector;
use crate::language::registry;
use crate::llm::interface::{CompletionClient, CompletionRequest};

/// Input text after language handling, ready for clinical mapping.
#[derive(Debug, Clone)]
pub struct NormalizedInput {
    /// English canonical form the mapping tiers operate on.
    pub text: String,
    /// ISO 639-1 code of the detected (or caller-asserted) language.
    pub detected_language: &'static str,
    /// Display name of that language, e.g. "Hindi".
    pub original_language: &'static str,
    /// Detection was unreliable or translation fell back to the verbatim
    /// input; the final confidence takes a penalty.
    pub penalized: bool,
}

/// Detects the input language and produces an English canonical form.
///
/// Non-English input goes through the collaborator model as a literal
/// translator. Translation never blocks the pipeline: on timeout or
/// failure the verbatim text moves on with a confidence penalty.
pub struct LanguageNormalizer {
    client: Arc<dyn CompletionClient>,
    timeout: Duration,
    filler_words: Regex,
}

impl LanguageNormalizer {
    pub fn new(client: Arc<dyn CompletionClient>, timeout: Duration) -> Self {
        Self {
            client,
            timeout,
            filler_words: Regex::new(r"\b(?:um|uh|you know|basically|literally|like)\b").unwrap(),
        }
    }

    /// Normalize `text` to English. A supported `source_language` code
    /// skips detection; "auto" and unknown hints fall back to detection.
    pub async fn normalize(&self, text: &str, source_language: Option<&str>) -> NormalizedInput {
        let (code, unreliable) = match source_language.and_then(registry::find) {
            Some(spec) => (spec.code, false),
            None => {
                if let Some(hint) = source_language {
                    if !hint.trim().eq_ignore_ascii_case("auto") {
                        debug!(hint, "unsupported language hint ignored");
                    }
                }
                let detection = detector::detect(text);
                (detection.code, !detection.reliable)
            }
        };
        let original_language = registry::display_name(code);

        if code == "en" {
            return NormalizedInput {
                text: self.canonicalize_english(text),
                detected_language: "en",
                original_language,
                penalized: unreliable,
            };
        }

        match self.translate(text, original_language).await {
            Ok(english) => NormalizedInput {
                text: english,
                detected_language: code,
                original_language,
                penalized: unreliable,
            },
            Err(err) => {
                warn!(language = code, error = %err, "translation failed, using verbatim text");
                NormalizedInput {
                    text: text.trim().to_string(),
                    detected_language: code,
                    original_language,
                    penalized: true,
                }
            }
        }
    }

    /// Lowercase, drop spoken filler words, collapse whitespace.
    fn canonicalize_english(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let stripped = self.filler_words.replace_all(&lowered, "");
        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    async fn translate(&self, text: &str, language: &str) -> Result<String, LlmError> {
        let request = CompletionRequest::deterministic(
            translation_system_prompt(language),
            text.to_string(),
        );
        let reply = match tokio::time::timeout(self.timeout, self.client.complete(request)).await {
            Ok(result) => result?,
            Err(_) => return Err(LlmError::Timeout(self.timeout)),
        };
        let english = reply.trim();
        if english.is_empty() {
            return Err(LlmError::MalformedOutput("empty translation".to_string()));
        }
        Ok(english.to_string())
    }
}

/// The collaborator is a linguistic adapter here, nothing more: it carries
/// meaning across languages and must not editorialize medically.
fn translation_system_prompt(language: &str) -> String {
    format!(
        "You are a clinical linguistic adapter. Your ONLY job is to translate patient \
descriptions from {language} to English.\n\n\
CRITICAL RULES:\n\
1. You are NOT a doctor. Do not diagnose.\n\
2. You are NOT a pharmacist. Do not mention drugs.\n\
3. Do not add medical advice or interpretation.\n\
4. Translate the linguistic meaning only, preserving the exact sense.\n\n\
Reply with the plain English translation and nothing else."
    )
}
