use std::sync::Arc;

use dashmap::DashMap;
use tracing::warn;
use uuid::Uuid;

use crate::compliance::safety::SafetyClassifier;
use crate::engine::error::FeedbackError;
use crate::engine::types::{TranslationFeedback, TranslationResponse};

/// Longest correction a clinician may submit.
pub const MAX_CORRECTION_CHARS: usize = 1000;

/// In-memory record of issued translations, keyed by response id. Holds
/// what clinician feedback needs to land on; durable storage sits behind
/// a different service.
#[derive(Clone)]
pub struct TranslationStore {
    translations: Arc<DashMap<Uuid, TranslationResponse>>,
    classifier: Arc<SafetyClassifier>,
}

impl TranslationStore {
    pub fn new() -> Self {
        Self {
            translations: Arc::new(DashMap::new()),
            classifier: Arc::new(SafetyClassifier::new()),
        }
    }

    pub fn insert(&self, response: TranslationResponse) {
        self.translations.insert(response.id, response);
    }

    pub fn get(&self, id: &Uuid) -> Option<TranslationResponse> {
        self.translations.get(id).map(|entry| entry.clone())
    }

    pub fn len(&self) -> usize {
        self.translations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.translations.is_empty()
    }

    /// Apply clinician feedback to a stored translation and return the
    /// updated record.
    ///
    /// A correction replaces the clinical interpretation verbatim; the
    /// clinician outranks the engine. Corrections that trip the safety
    /// rules are still accepted but logged for review. Corrections over
    /// [`MAX_CORRECTION_CHARS`] are rejected without touching the record.
    pub fn apply_feedback(
        &self,
        id: Uuid,
        feedback: &TranslationFeedback,
    ) -> Result<TranslationResponse, FeedbackError> {
        if let Some(correction) = feedback.correction.as_deref() {
            if correction.chars().count() > MAX_CORRECTION_CHARS {
                return Err(FeedbackError::CorrectionTooLong { max: MAX_CORRECTION_CHARS });
            }
        }

        let mut entry = self
            .translations
            .get_mut(&id)
            .ok_or(FeedbackError::UnknownTranslation(id))?;

        entry.approved = Some(feedback.approved);
        if let Some(correction) = feedback.correction.as_deref() {
            let correction = correction.trim();
            if !correction.is_empty() {
                let verdict = self.classifier.classify(correction);
                if !verdict.is_safe {
                    warn!(%id, "clinician correction tripped safety rules, accepted anyway");
                }
                entry.clinical_interpretation = correction.to_string();
                entry.edited = true;
            }
        }

        Ok(entry.clone())
    }
}

impl Default for TranslationStore {
    fn default() -> Self {
        Self::new()
    }
}
