use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::compliance::pii::PiiScrubber;
use crate::compliance::safety::SafetyClassifier;
use crate::config::EngineConfig;
use crate::engine::assembler::{DegradedReason, ResponseContext};
use crate::engine::curated::CuratedTable;
use crate::engine::error::{LlmError, TranslationError};
use crate::engine::types::{TranslationRequest, TranslationResponse};
use crate::language::normalizer::LanguageNormalizer;
use crate::llm::interface::{CompletionClient, CompletionRequest};
use crate::llm::mapper::{FallbackMapper, FallbackOutcome};

/// The two-tier mapping pipeline: scrub, normalize, curated lookup, then
/// the collaborator fallback, with safety gating on everything that leaves.
///
/// Failures inside the pipeline degrade the response; the only errors a
/// caller sees are input validation ones.
pub struct ClinicalMappingResolver {
    scrubber: PiiScrubber,
    normalizer: LanguageNormalizer,
    curated: CuratedTable,
    classifier: SafetyClassifier,
    client: Arc<dyn CompletionClient>,
    config: EngineConfig,
}

impl ClinicalMappingResolver {
    pub fn new(client: Arc<dyn CompletionClient>, config: EngineConfig) -> Self {
        info!(provider = client.name(), "Initializing clinical mapping resolver");
        let timeout = Duration::from_millis(config.llm_timeout_ms);
        Self {
            scrubber: PiiScrubber::new(),
            normalizer: LanguageNormalizer::new(Arc::clone(&client), timeout),
            curated: CuratedTable::builtin(),
            classifier: SafetyClassifier::new(),
            client,
            config,
        }
    }

    /// Map a patient description to clinical terminology.
    ///
    /// # Arguments
    /// * `request` - raw text plus optional language hint and context
    pub async fn translate(
        &self,
        request: &TranslationRequest,
    ) -> Result<TranslationResponse, TranslationError> {
        let started = Instant::now();
        let trimmed = request.text.trim();
        if trimmed.is_empty() {
            return Err(TranslationError::EmptyInput);
        }
        if trimmed.chars().count() > self.config.max_input_chars {
            return Err(TranslationError::InputTooLong { max: self.config.max_input_chars });
        }

        let (scrubbed, scrub_report) = self.scrubber.scrub(trimmed);
        let normalized = self
            .normalizer
            .normalize(&scrubbed, request.source_language.as_deref())
            .await;
        debug!(
            language = normalized.detected_language,
            penalized = normalized.penalized,
            pii = scrub_report.pii_found,
            "input normalized"
        );

        // Canonicalization can eat the whole input (pure filler); keep the
        // scrubbed text so the fallback still has something to work with.
        let mapping_text = if normalized.text.is_empty() {
            scrubbed.clone()
        } else {
            normalized.text.clone()
        };

        let ctx = ResponseContext {
            raw_input: scrubbed,
            detected_language: normalized.detected_language,
            original_language: normalized.original_language,
            normalized_english: mapping_text.clone(),
            pii_detected: scrub_report.pii_found,
            penalized: normalized.penalized,
            started,
        };

        if let Some(hit) = self.curated.lookup(&mapping_text) {
            debug!(phrase = hit.phrase, term = hit.mapping.clinical, "curated hit");
            return Ok(ctx.curated_response(&hit));
        }

        let context = request
            .context
            .as_deref()
            .map(|c| self.scrubbed_context(c));
        Ok(self.fallback(&ctx, &mapping_text, context.as_deref()).await)
    }

    /// Tier 2: ask the collaborator, validate, safety-gate, and assemble.
    /// Never errors; anything unrecoverable becomes a degraded response.
    async fn fallback(
        &self,
        ctx: &ResponseContext,
        mapping_text: &str,
        context: Option<&str>,
    ) -> TranslationResponse {
        let outcome = match self.attempt(FallbackMapper::mapping_request(mapping_text, context)).await
        {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(error = %err, "fallback mapping failed");
                return ctx.degraded_response(DegradedReason::Unavailable(err.kind()));
            }
        };

        let verdict = self.classifier.classify_output(&outcome.mapping.term, &outcome.rationale);
        if verdict.is_safe {
            debug!(
                term = %outcome.mapping.term,
                codes = ?outcome.code_source,
                "fallback mapping accepted"
            );
            return ctx.fallback_response(outcome.mapping, outcome.rationale);
        }

        let violation = verdict
            .reason
            .unwrap_or_else(|| "output violated safety rules".to_string());
        warn!(%violation, "fallback output blocked, regenerating once");
        let retry = FallbackMapper::regeneration_request(mapping_text, context, &violation);
        match self.attempt(retry).await {
            Ok(outcome) => {
                let verdict =
                    self.classifier.classify_output(&outcome.mapping.term, &outcome.rationale);
                if verdict.is_safe {
                    return ctx.fallback_response(outcome.mapping, outcome.rationale);
                }
                // The mapping itself may be fine with the model's wording
                // thrown away.
                if self.classifier.classify(&outcome.mapping.term).is_safe {
                    let rationale =
                        format!("Interpreted '{mapping_text}' as {}.", outcome.mapping.term);
                    if self.classifier.classify(&rationale).is_safe {
                        return ctx.fallback_response(outcome.mapping, rationale);
                    }
                }
                warn!("regenerated output still unsafe, degrading");
                ctx.degraded_response(DegradedReason::SafetyViolation)
            }
            Err(err) => {
                warn!(error = %err, "regeneration failed, degrading");
                ctx.degraded_response(DegradedReason::SafetyViolation)
            }
        }
    }

    async fn attempt(&self, request: CompletionRequest) -> Result<FallbackOutcome, LlmError> {
        let timeout = Duration::from_millis(self.config.llm_timeout_ms);
        let reply = match tokio::time::timeout(timeout, self.client.complete(request)).await {
            Ok(result) => result?,
            Err(_) => return Err(LlmError::Timeout(timeout)),
        };
        FallbackMapper::validate_reply(&reply)
    }

    /// Context rides into the prompt, so it gets the same scrub as the
    /// description, plus a length cap.
    fn scrubbed_context(&self, context: &str) -> String {
        let (scrubbed, _) = self.scrubber.scrub(context.trim());
        if scrubbed.chars().count() > self.config.max_context_chars {
            scrubbed.chars().take(self.config.max_context_chars).collect()
        } else {
            scrubbed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::types::{CodeSystem, MappingTier};
    use crate::llm::testing::{ScriptStep, ScriptedClient};

    fn resolver_with(steps: Vec<ScriptStep>) -> (ClinicalMappingResolver, Arc<ScriptedClient>) {
        let client = Arc::new(ScriptedClient::new(steps));
        let config = EngineConfig {
            llm_timeout_ms: 200,
            max_input_chars: 2000,
            max_context_chars: 500,
        };
        let resolver =
            ClinicalMappingResolver::new(client.clone() as Arc<dyn CompletionClient>, config);
        (resolver, client)
    }

    fn request(text: &str) -> TranslationRequest {
        TranslationRequest::new(text)
    }

    fn tinnitus_reply() -> String {
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

    fn unsafe_tinnitus_reply() -> String {
        r#"{
            "clinical_term": "Tinnitus",
            "snomed_code": "60862009",
            "icd10_code": "H93.1",
            "confidence": 0.8,
            "rationale": "You should take aspirin until the ringing stops."
        }"#
        .to_string()
    }

    #[tokio::test]
    async fn burning_feet_resolves_from_the_curated_table() {
        let (resolver, client) = resolver_with(vec![]);
        let response = resolver.translate(&request("my feet are burning")).await.unwrap();

        assert_eq!(response.clinical_interpretation, "Burning Feet Sensation");
        assert_eq!(response.tier, MappingTier::Curated);
        assert!((response.confidence - 0.95).abs() < 1e-3);
        assert_eq!(response.detected_language, "en");
        let snomed = &response.standard_codes[0];
        assert_eq!(snomed.system, CodeSystem::SnomedCt);
        assert_eq!(snomed.code, "39072002");
        assert!(response.standard_codes.iter().any(|c| c.code == "R20.8"));
        // Tier 1 never talks to the collaborator.
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn ringing_ears_falls_through_to_the_collaborator() {
        let (resolver, client) = resolver_with(vec![ScriptStep::Reply(tinnitus_reply())]);
        let response = resolver.translate(&request("my ears are ringing")).await.unwrap();

        assert_eq!(response.clinical_interpretation, "Tinnitus");
        assert_eq!(response.tier, MappingTier::LlmFallback);
        assert!((response.confidence - 0.75).abs() < 1e-3);
        assert!(response.standard_codes.iter().any(|c| c.code == "60862009"));
        assert!(response.standard_codes.iter().any(|c| c.code == "H93.1"));
        assert!(response.rationale.contains("tinnitus"));
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn romanized_hindi_translates_then_hits_curated() {
        let (resolver, client) = resolver_with(vec![ScriptStep::Reply(
            "I have pain in my chest".to_string(),
        )]);
        let response = resolver
            .translate(&request("mere seene mein dard hai"))
            .await
            .unwrap();

        assert_eq!(response.detected_language, "hi");
        assert_eq!(response.original_language, "Hindi");
        assert_eq!(response.normalized_english, "I have pain in my chest");
        assert_eq!(response.clinical_interpretation, "Chest Tightness");
        assert_eq!(response.tier, MappingTier::Curated);
        assert!((response.confidence - 0.95).abs() < 1e-3);
        // One translation call, no mapping call.
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn hung_collaborator_degrades_instead_of_stalling() {
        let (resolver, _client) = resolver_with(vec![ScriptStep::Hang]);
        let response = resolver.translate(&request("my ears are ringing")).await.unwrap();

        assert_eq!(response.clinical_interpretation, "Unspecified Symptom");
        assert_eq!(response.tier, MappingTier::Degraded);
        assert!(response.confidence <= 0.5);
        assert!(response.standard_codes.iter().any(|c| c.code == "267038008"));
        assert!(response.standard_codes.iter().any(|c| c.code == "R68.89"));
        assert!(response.rationale.contains("unavailable"));
        assert!(response.rationale.contains("timeout"));
    }

    #[tokio::test]
    async fn empty_input_is_rejected() {
        let (resolver, _client) = resolver_with(vec![]);
        assert!(matches!(
            resolver.translate(&request("")).await,
            Err(TranslationError::EmptyInput)
        ));
        assert!(matches!(
            resolver.translate(&request("   \n\t ")).await,
            Err(TranslationError::EmptyInput)
        ));
    }

    #[tokio::test]
    async fn oversized_input_is_rejected() {
        let (resolver, _client) = resolver_with(vec![]);
        let long = "my feet are burning and ".repeat(100);
        assert!(matches!(
            resolver.translate(&request(&long)).await,
            Err(TranslationError::InputTooLong { max: 2000 })
        ));
    }

    #[tokio::test]
    async fn malformed_collaborator_reply_degrades() {
        let (resolver, client) = resolver_with(vec![ScriptStep::Reply(
            "It sounds like tinnitus to me!".to_string(),
        )]);
        let response = resolver.translate(&request("my ears are ringing")).await.unwrap();

        assert_eq!(response.tier, MappingTier::Degraded);
        assert!(response.rationale.contains("unavailable"));
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn transport_failure_degrades() {
        let (resolver, _client) =
            resolver_with(vec![ScriptStep::Status(503, "upstream down".to_string())]);
        let response = resolver.translate(&request("my ears are ringing")).await.unwrap();

        assert_eq!(response.tier, MappingTier::Degraded);
        assert_eq!(response.clinical_interpretation, "Unspecified Symptom");
        assert!(response.confidence <= 0.5);
    }

    #[tokio::test]
    async fn unsafe_first_reply_regenerates_once() {
        let (resolver, client) = resolver_with(vec![
            ScriptStep::Reply(unsafe_tinnitus_reply()),
            ScriptStep::Reply(tinnitus_reply()),
        ]);
        let response = resolver.translate(&request("my ears are ringing")).await.unwrap();

        assert_eq!(response.tier, MappingTier::LlmFallback);
        assert_eq!(response.clinical_interpretation, "Tinnitus");
        assert!(!response.rationale.contains("aspirin"));
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn persistently_unsafe_rationale_is_replaced_with_neutral_wording() {
        let (resolver, client) = resolver_with(vec![
            ScriptStep::Reply(unsafe_tinnitus_reply()),
            ScriptStep::Reply(unsafe_tinnitus_reply()),
        ]);
        let response = resolver.translate(&request("my ears are ringing")).await.unwrap();

        // The mapping is sound; only the wording was rejected twice.
        assert_eq!(response.tier, MappingTier::LlmFallback);
        assert_eq!(response.clinical_interpretation, "Tinnitus");
        assert_eq!(response.rationale, "Interpreted 'my ears are ringing' as Tinnitus.");
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn unsafe_term_degrades_after_regeneration() {
        let unsafe_term = r#"{
            "clinical_term": "Prognosis Poor",
            "snomed_code": "12345",
            "icd10_code": "R99",
            "confidence": 0.6,
            "rationale": "Your condition will worsen without care."
        }"#;
        let (resolver, client) = resolver_with(vec![
            ScriptStep::Reply(unsafe_term.to_string()),
            ScriptStep::Reply(unsafe_term.to_string()),
        ]);
        let response = resolver.translate(&request("my ears are ringing")).await.unwrap();

        assert_eq!(response.tier, MappingTier::Degraded);
        assert_eq!(response.clinical_interpretation, "Unspecified Symptom");
        assert!(response.rationale.contains("safety"));
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn regeneration_failure_degrades() {
        let (resolver, client) = resolver_with(vec![
            ScriptStep::Reply(unsafe_tinnitus_reply()),
            ScriptStep::Timeout,
        ]);
        let response = resolver.translate(&request("my ears are ringing")).await.unwrap();

        assert_eq!(response.tier, MappingTier::Degraded);
        assert_eq!(client.calls(), 2);
    }

    #[tokio::test]
    async fn pii_is_scrubbed_before_anything_else() {
        let (resolver, client) = resolver_with(vec![]);
        let response = resolver
            .translate(&request("My name is John and my feet are burning"))
            .await
            .unwrap();

        assert!(response.pii_detected);
        assert!(response.raw_input.contains("[NAME_REDACTED]"));
        assert!(!response.raw_input.contains("John"));
        // Scrubbing must not break the curated hit.
        assert_eq!(response.clinical_interpretation, "Burning Feet Sensation");
        assert_eq!(client.calls(), 0);
    }

    #[tokio::test]
    async fn fully_redacted_input_still_resolves() {
        // Nothing but a phone number: scrubbing leaves only a placeholder,
        // which misses the curated table and rides the fallback path.
        let (resolver, client) = resolver_with(vec![ScriptStep::Timeout]);
        let response = resolver.translate(&request("9876543210")).await.unwrap();

        assert!(response.pii_detected);
        assert!(!response.raw_input.contains("9876543210"));
        assert_eq!(response.tier, MappingTier::Degraded);
        assert_eq!(client.calls(), 1);
    }

    #[tokio::test]
    async fn curated_resolution_is_deterministic() {
        let (resolver, _client) = resolver_with(vec![]);
        let first = resolver.translate(&request("my feet are burning")).await.unwrap();
        let second = resolver.translate(&request("my feet are burning")).await.unwrap();

        assert_eq!(first.clinical_interpretation, second.clinical_interpretation);
        assert_eq!(
            first.standard_codes.iter().map(|c| c.code.clone()).collect::<Vec<_>>(),
            second.standard_codes.iter().map(|c| c.code.clone()).collect::<Vec<_>>()
        );
        assert_eq!(first.confidence, second.confidence);
    }

    #[tokio::test]
    async fn every_tier_stays_inside_its_confidence_band() {
        let cases: Vec<(&str, Vec<ScriptStep>, MappingTier)> = vec![
            ("my feet are burning", vec![], MappingTier::Curated),
            (
                "my ears are ringing",
                vec![ScriptStep::Reply(tinnitus_reply())],
                MappingTier::LlmFallback,
            ),
            ("my ears are ringing", vec![ScriptStep::Timeout], MappingTier::Degraded),
        ];
        for (text, steps, expected_tier) in cases {
            let (resolver, _client) = resolver_with(steps);
            let response = resolver.translate(&request(text)).await.unwrap();
            assert_eq!(response.tier, expected_tier);
            assert!(response.confidence > 0.0 && response.confidence <= 0.95);
            match response.tier {
                MappingTier::Curated => assert!(response.confidence >= 0.90),
                MappingTier::LlmFallback => assert!((response.confidence - 0.75).abs() < 1e-3),
                MappingTier::Degraded => assert!(response.confidence <= 0.5),
            }
            assert!(!response.standard_codes.is_empty());
            assert!(!response.rationale.is_empty());
        }
    }

    #[tokio::test]
    async fn responses_always_carry_at_least_one_standard_code() {
        let scripts: Vec<Vec<ScriptStep>> = vec![
            vec![ScriptStep::Reply(tinnitus_reply())],
            vec![ScriptStep::Reply("not json".to_string())],
            vec![ScriptStep::Status(500, "boom".to_string())],
        ];
        for steps in scripts {
            let (resolver, _client) = resolver_with(steps);
            let response = resolver.translate(&request("my ears are ringing")).await.unwrap();
            assert!(!response.standard_codes.is_empty());
        }
    }
}
