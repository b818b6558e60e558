use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Coding system for a standardized clinical code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CodeSystem {
    #[serde(rename = "SNOMED-CT")]
    SnomedCt,
    #[serde(rename = "ICD-10")]
    Icd10,
}

/// A single standardized code attached to an interpretation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StandardCode {
    pub system: CodeSystem,
    pub code: String,
    pub display: String,
}

impl StandardCode {
    pub fn snomed(code: impl Into<String>, display: impl Into<String>) -> Self {
        Self { system: CodeSystem::SnomedCt, code: code.into(), display: display.into() }
    }

    pub fn icd10(code: impl Into<String>, display: impl Into<String>) -> Self {
        Self { system: CodeSystem::Icd10, code: code.into(), display: display.into() }
    }
}

/// Which tier produced the interpretation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MappingTier {
    Curated,
    LlmFallback,
    Degraded,
}

/// A resolved clinical mapping, independent of which tier produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ClinicalMapping {
    pub term: String,
    pub snomed_code: String,
    pub snomed_display: String,
    pub icd10_code: String,
    pub icd10_display: String,
    pub body_system: Option<String>,
}

impl ClinicalMapping {
    /// The codes in response order: SNOMED CT first, then ICD-10.
    pub fn standard_codes(&self) -> Vec<StandardCode> {
        vec![
            StandardCode::snomed(&self.snomed_code, &self.snomed_display),
            StandardCode::icd10(&self.icd10_code, &self.icd10_display),
        ]
    }
}

/// Incoming translation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    /// Raw patient utterance, any supported language.
    pub text: String,
    /// Optional ISO 639-1 hint; auto-detected when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_language: Option<String>,
    /// Optional clinical context, forwarded to the fallback prompt only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    /// Opaque correlation id, echoed into audit logs only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl TranslationRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), source_language: None, context: None, session_id: None }
    }
}

/// The finished translation. Created once per request; mutated only by an
/// explicit clinician feedback action.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResponse {
    pub id: Uuid,
    /// Patient input after PII scrubbing. The pre-scrub text is never stored.
    pub raw_input: String,
    /// ISO 639-1 code of the detected language.
    pub detected_language: String,
    /// English name of the detected language, e.g. "Hindi".
    pub original_language: String,
    /// English canonical form after scrubbing and normalization.
    pub normalized_english: String,
    pub clinical_interpretation: String,
    pub standard_codes: Vec<StandardCode>,
    /// In [0.0, 0.95]; never 1.0.
    pub confidence: f32,
    /// Patient-safe explanation; always passes the safety classifier.
    pub rationale: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_system: Option<String>,
    pub tier: MappingTier,
    pub pii_detected: bool,
    /// None until a clinician reviews; set by feedback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
    /// True once a clinician has supplied a corrected interpretation.
    #[serde(default)]
    pub edited: bool,
    pub created_at: DateTime<Utc>,
    pub processing_time_ms: u64,
}

/// Clinician feedback on a finished translation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationFeedback {
    pub approved: bool,
    /// Replacement interpretation when the clinician edits the result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correction: Option<String>,
}
