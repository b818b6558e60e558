use std::time::Instant;

use chrono::Utc;
use uuid::Uuid;

use crate::engine::curated::CuratedMatch;
use crate::engine::reference;
use crate::engine::types::{
    ClinicalMapping, MappingTier, StandardCode, TranslationResponse,
};

/// Confidence tiers. Fixed by policy: curated beats fallback beats
/// degraded, and nothing ever reaches 1.0.
pub mod tiers {
    /// Hard ceiling for any published confidence.
    pub const CONFIDENCE_CAP: f32 = 0.95;
    /// Curated table hits.
    pub const CURATED: f32 = 0.95;
    /// Language-model fallback hits.
    pub const FALLBACK: f32 = 0.75;
    /// Degraded "Unspecified Symptom" responses.
    pub const DEGRADED: f32 = 0.40;
    /// Subtracted once when language detection was unreliable.
    pub const DETECTION_PENALTY: f32 = 0.05;
}

/// Why the pipeline fell through to a degraded response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegradedReason {
    /// The collaborator failed; the tag is `LlmError::kind`.
    Unavailable(&'static str),
    /// The output kept violating safety rules after regeneration.
    SafetyViolation,
}

/// Per-request context the resolver accumulates before assembly. Owns the
/// response construction so confidence policy lives in one place.
pub struct ResponseContext {
    pub raw_input: String,
    pub detected_language: &'static str,
    pub original_language: &'static str,
    pub normalized_english: String,
    pub pii_detected: bool,
    /// Detection was unreliable or translation fell back to passthrough.
    pub penalized: bool,
    pub started: Instant,
}

impl ResponseContext {
    pub fn curated_response(&self, hit: &CuratedMatch) -> TranslationResponse {
        let mapping = hit.mapping.to_clinical_mapping();
        let rationale = format!(
            "Matched curated mapping for '{}'. Body system: {}.",
            hit.phrase, hit.mapping.body_system
        );
        self.build(MappingTier::Curated, mapping, tiers::CURATED, rationale)
    }

    pub fn fallback_response(
        &self,
        mapping: ClinicalMapping,
        rationale: String,
    ) -> TranslationResponse {
        self.build(MappingTier::LlmFallback, mapping, tiers::FALLBACK, rationale)
    }

    pub fn degraded_response(&self, reason: DegradedReason) -> TranslationResponse {
        let rationale = match reason {
            DegradedReason::Unavailable(kind) => format!(
                "The interpretation service was unavailable ({kind}); the description \
                 could not be mapped to a specific symptom. Clinician review required."
            ),
            DegradedReason::SafetyViolation => "The automated interpretation was withheld \
                 because it did not meet output safety rules. Clinician review required."
                .to_string(),
        };
        let mapping = ClinicalMapping {
            term: reference::UNSPECIFIED_TERM.to_string(),
            snomed_code: reference::UNSPECIFIED_SNOMED.to_string(),
            snomed_display: reference::UNSPECIFIED_TERM.to_string(),
            icd10_code: reference::UNSPECIFIED_ICD10.to_string(),
            icd10_display: reference::UNSPECIFIED_TERM.to_string(),
            body_system: None,
        };
        self.build(MappingTier::Degraded, mapping, tiers::DEGRADED, rationale)
    }

    fn build(
        &self,
        tier: MappingTier,
        mapping: ClinicalMapping,
        base_confidence: f32,
        rationale: String,
    ) -> TranslationResponse {
        let standard_codes: Vec<StandardCode> = mapping.standard_codes();
        TranslationResponse {
            id: Uuid::new_v4(),
            raw_input: self.raw_input.clone(),
            detected_language: self.detected_language.to_string(),
            original_language: self.original_language.to_string(),
            normalized_english: self.normalized_english.clone(),
            clinical_interpretation: mapping.term,
            standard_codes,
            confidence: self.confidence(base_confidence),
            rationale,
            body_system: mapping.body_system,
            tier,
            pii_detected: self.pii_detected,
            approved: None,
            edited: false,
            created_at: Utc::now(),
            processing_time_ms: self.started.elapsed().as_millis() as u64,
        }
    }

    /// Apply the detection penalty and the global cap, rounded to two
    /// decimals so tier floors survive float arithmetic.
    fn confidence(&self, base: f32) -> f32 {
        let mut value = base;
        if self.penalized {
            value -= tiers::DETECTION_PENALTY;
        }
        let capped = value.clamp(0.0, tiers::CONFIDENCE_CAP);
        (capped * 100.0).round() / 100.0
    }
}
