use serde::Deserialize;
use tracing::debug;

use crate::engine::error::LlmError;
use crate::engine::reference;
use crate::engine::types::ClinicalMapping;
use crate::llm::interface::CompletionRequest;

/// System prompt for the mapping fallback. The collaborator describes, it
/// never diagnoses, and it must answer in strict JSON.
const MAPPING_SYSTEM_PROMPT: &str = "\
You are a clinical terminology coder for symptom intake. Map the patient's \
description to standardized SYMPTOM terminology.

RULES:
1. Use symptom terms only (e.g. 'Tinnitus', 'Dyspnea'), never disease or \
diagnosis names.
2. Do not diagnose, prescribe, recommend treatment, or predict outcomes.
3. Prefer SNOMED CT and ICD-10 symptom codes (ICD-10 chapter R where possible).
4. If no specific symptom fits, use clinical_term \"Unspecified Symptom\" with \
snomed_code \"267038008\" and icd10_code \"R68.89\".

Respond with ONLY a JSON object, no prose, in exactly this shape:
{\"clinical_term\": \"...\", \"snomed_code\": \"...\", \"snomed_display\": \"...\", \
\"icd10_code\": \"...\", \"icd10_display\": \"...\", \"body_system\": \"...\", \
\"confidence\": 0.0, \"rationale\": \"...\"}";

/// Where the published codes came from, for logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSource {
    /// Snapped to a vetted reference row.
    Reference,
    /// Model-supplied codes that passed the plausibility check.
    Model,
    /// Model codes failed plausibility; unspecified defaults substituted.
    Default,
}

/// A validated fallback mapping ready for assembly.
#[derive(Debug, Clone)]
pub struct FallbackOutcome {
    pub mapping: ClinicalMapping,
    pub rationale: String,
    pub code_source: CodeSource,
}

/// What the collaborator must return, schema-checked before anything is
/// trusted. Unknown shapes become `LlmError::MalformedOutput`.
#[derive(Debug, Deserialize)]
struct CandidateMapping {
    clinical_term: String,
    snomed_code: String,
    #[serde(default)]
    snomed_display: Option<String>,
    icd10_code: String,
    #[serde(default)]
    icd10_display: Option<String>,
    #[serde(default)]
    body_system: Option<String>,
    confidence: f32,
    rationale: String,
}

/// Prompt construction and reply validation for the fallback tier.
pub struct FallbackMapper;

impl FallbackMapper {
    /// Request for a first mapping attempt.
    pub fn mapping_request(normalized_text: &str, context: Option<&str>) -> CompletionRequest {
        CompletionRequest::deterministic(
            MAPPING_SYSTEM_PROMPT,
            Self::mapping_user_text(normalized_text, context),
        )
    }

    /// Request for the single regeneration attempt after a safety
    /// violation; the violation is named so the model can correct course.
    pub fn regeneration_request(
        normalized_text: &str,
        context: Option<&str>,
        violation: &str,
    ) -> CompletionRequest {
        let system = format!(
            "{MAPPING_SYSTEM_PROMPT}\n\nPREVIOUS ATTEMPT REJECTED: {violation}. \
             Describe the symptom itself; do not diagnose, prescribe, or advise."
        );
        CompletionRequest::deterministic(system, Self::mapping_user_text(normalized_text, context))
    }

    fn mapping_user_text(normalized_text: &str, context: Option<&str>) -> String {
        match context {
            Some(ctx) if !ctx.trim().is_empty() => {
                format!("Patient description: {normalized_text}\nClinical context: {ctx}")
            }
            _ => format!("Patient description: {normalized_text}"),
        }
    }

    /// Validate a raw reply into a usable mapping. Codes are snapped to the
    /// vetted reference row when the term is known; otherwise model codes
    /// must look like symptom codes or the unspecified defaults stand in.
    pub fn validate_reply(reply: &str) -> Result<FallbackOutcome, LlmError> {
        let json = extract_json(reply)
            .ok_or_else(|| LlmError::MalformedOutput("no JSON object in reply".to_string()))?;
        let candidate: CandidateMapping = serde_json::from_str(json)
            .map_err(|e| LlmError::MalformedOutput(format!("mapping schema: {e}")))?;

        let term = candidate.clinical_term.trim().to_string();
        if term.is_empty() {
            return Err(LlmError::MalformedOutput("empty clinical_term".to_string()));
        }
        if term.len() > 80 {
            return Err(LlmError::MalformedOutput("clinical_term too long".to_string()));
        }
        if !candidate.confidence.is_finite()
            || !(0.0..=1.0).contains(&candidate.confidence)
        {
            return Err(LlmError::MalformedOutput(format!(
                "confidence {} out of range",
                candidate.confidence
            )));
        }
        let rationale = candidate.rationale.trim().to_string();
        if rationale.is_empty() {
            return Err(LlmError::MalformedOutput("empty rationale".to_string()));
        }
        if candidate.snomed_code.trim().is_empty() || candidate.icd10_code.trim().is_empty() {
            return Err(LlmError::MalformedOutput("missing code".to_string()));
        }

        let (mapping, code_source) = if let Some(entry) = reference::lookup_term(&term) {
            let mapping = ClinicalMapping {
                term: entry.clinical.to_string(),
                snomed_code: entry.snomed.to_string(),
                snomed_display: entry.clinical.to_string(),
                icd10_code: entry.icd10.to_string(),
                icd10_display: entry.clinical.to_string(),
                body_system: candidate.body_system.clone(),
            };
            (mapping, CodeSource::Reference)
        } else if reference::is_plausible_symptom_code(&candidate.icd10_code) {
            let mapping = ClinicalMapping {
                snomed_display: candidate.snomed_display.clone().unwrap_or_else(|| term.clone()),
                icd10_display: candidate.icd10_display.clone().unwrap_or_else(|| term.clone()),
                term: term.clone(),
                snomed_code: candidate.snomed_code.trim().to_string(),
                icd10_code: candidate.icd10_code.trim().to_string(),
                body_system: candidate.body_system.clone(),
            };
            (mapping, CodeSource::Model)
        } else {
            let mapping = ClinicalMapping {
                term: term.clone(),
                snomed_code: reference::UNSPECIFIED_SNOMED.to_string(),
                snomed_display: term.clone(),
                icd10_code: reference::UNSPECIFIED_ICD10.to_string(),
                icd10_display: term.clone(),
                body_system: candidate.body_system.clone(),
            };
            (mapping, CodeSource::Default)
        };

        debug!(term = %mapping.term, source = ?code_source, "validated fallback mapping");
        Ok(FallbackOutcome { mapping, rationale, code_source })
    }
}

/// Find the JSON object in a reply that may carry markdown fences or prose
/// around it.
fn extract_json(reply: &str) -> Option<&str> {
    let trimmed = reply.trim();
    let inner = if let Some(rest) = trimmed.strip_prefix("```json") {
        rest.strip_suffix("```").unwrap_or(rest)
    } else if let Some(rest) = trimmed.strip_prefix("```") {
        rest.strip_suffix("```").unwrap_or(rest)
    } else {
        trimmed
    };
    let start = inner.find('{')?;
    let end = inner.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&inner[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tinnitus_json() -> String {
        r#"{
            "clinical_term": "Tinnitus",
            "snomed_code": "60862009",
            "snomed_display": "Tinnitus",
            "icd10_code": "H93.1",
            "icd10_display": "Tinnitus",
            "body_system": "ent",
            "confidence": 0.8,
            "rationale": "The phrase 'ears are ringing' describes tinnitus."
        }"#
        .to_string()
    }

    #[test]
    fn plain_json_replies_validate() {
        let outcome = FallbackMapper::validate_reply(&tinnitus_json()).unwrap();
        assert_eq!(outcome.mapping.term, "Tinnitus");
        assert_eq!(outcome.mapping.snomed_code, "60862009");
        assert_eq!(outcome.code_source, CodeSource::Reference);
    }

    #[test]
    fn fenced_replies_validate() {
        let fenced = format!("```json\n{}\n```", tinnitus_json());
        let outcome = FallbackMapper::validate_reply(&fenced).unwrap();
        assert_eq!(outcome.mapping.term, "Tinnitus");
    }

    #[test]
    fn replies_with_prose_around_json_validate() {
        let chatty = format!("Sure! Here is the mapping:\n{}\nHope that helps.", tinnitus_json());
        let outcome = FallbackMapper::validate_reply(&chatty).unwrap();
        assert_eq!(outcome.mapping.icd10_code, "H93.1");
    }

    #[test]
    fn known_terms_snap_to_reference_codes() {
        // Model invents codes; the vetted row wins.
        let reply = r#"{
            "clinical_term": "tinnitus",
            "snomed_code": "999999",
            "icd10_code": "Z99.9",
            "confidence": 0.6,
            "rationale": "Ringing in the ears."
        }"#;
        let outcome = FallbackMapper::validate_reply(reply).unwrap();
        assert_eq!(outcome.mapping.snomed_code, "60862009");
        assert_eq!(outcome.mapping.icd10_code, "H93.1");
        assert_eq!(outcome.code_source, CodeSource::Reference);
    }

    #[test]
    fn unknown_terms_keep_plausible_model_codes() {
        let reply = r#"{
            "clinical_term": "Photophobia",
            "snomed_code": "409668002",
            "icd10_code": "H53.14",
            "confidence": 0.7,
            "rationale": "Light sensitivity described by the patient."
        }"#;
        let outcome = FallbackMapper::validate_reply(reply).unwrap();
        assert_eq!(outcome.mapping.icd10_code, "H53.14");
        assert_eq!(outcome.code_source, CodeSource::Model);
    }

    #[test]
    fn implausible_codes_fall_back_to_unspecified() {
        let reply = r#"{
            "clinical_term": "Odd Sensation",
            "snomed_code": "12345",
            "icd10_code": "E11.9",
            "confidence": 0.7,
            "rationale": "Description did not match a known pattern."
        }"#;
        let outcome = FallbackMapper::validate_reply(reply).unwrap();
        assert_eq!(outcome.mapping.term, "Odd Sensation");
        assert_eq!(outcome.mapping.snomed_code, "267038008");
        assert_eq!(outcome.mapping.icd10_code, "R68.89");
        assert_eq!(outcome.code_source, CodeSource::Default);
    }

    #[test]
    fn prose_without_json_is_malformed() {
        let err = FallbackMapper::validate_reply("It sounds like tinnitus to me!").unwrap_err();
        assert!(matches!(err, LlmError::MalformedOutput(_)));
    }

    #[test]
    fn missing_required_fields_are_malformed() {
        let reply = r#"{"clinical_term": "Tinnitus", "confidence": 0.8}"#;
        assert!(matches!(
            FallbackMapper::validate_reply(reply),
            Err(LlmError::MalformedOutput(_))
        ));
    }

    #[test]
    fn out_of_range_confidence_is_malformed() {
        let reply = r#"{
            "clinical_term": "Tinnitus",
            "snomed_code": "60862009",
            "icd10_code": "H93.1",
            "confidence": 1.7,
            "rationale": "Too sure of itself."
        }"#;
        assert!(matches!(
            FallbackMapper::validate_reply(reply),
            Err(LlmError::MalformedOutput(_))
        ));
    }

    #[test]
    fn empty_term_is_malformed() {
        let reply = r#"{
            "clinical_term": "  ",
            "snomed_code": "60862009",
            "icd10_code": "H93.1",
            "confidence": 0.5,
            "rationale": "Blank."
        }"#;
        assert!(matches!(
            FallbackMapper::validate_reply(reply),
            Err(LlmError::MalformedOutput(_))
        ));
    }

    #[test]
    fn mapping_request_includes_context_when_present() {
        let request = FallbackMapper::mapping_request("my ears are ringing", Some("tinnitus history"));
        assert!(request.user_text.contains("my ears are ringing"));
        assert!(request.user_text.contains("tinnitus history"));
        assert!((request.temperature - 0.1).abs() < f32::EPSILON);
    }

    #[test]
    fn regeneration_request_names_the_violation() {
        let request = FallbackMapper::regeneration_request(
            "my ears are ringing",
            None,
            "output contains diagnostic language",
        );
        assert!(request.system_prompt.contains("PREVIOUS ATTEMPT REJECTED"));
        assert!(request.system_prompt.contains("diagnostic"));
    }
}
