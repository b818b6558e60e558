use sha2::{Digest, Sha256};
use tracing::info;

use crate::engine::types::TranslationResponse;

/// SHA-256 hex digest of a piece of content. The audit trail stores digests
/// instead of patient text.
pub fn content_digest(content: &str) -> String {
    format!("{:x}", Sha256::digest(content.as_bytes()))
}

/// Emit the audit record for a finished translation. Events go to the
/// `audit` target so operators can route them separately from app logs.
pub fn log_translation(response: &TranslationResponse, session_id: Option<&str>) {
    info!(
        target: "audit",
        action = "slang_translation",
        id = %response.id,
        input_hash = %content_digest(&response.raw_input),
        output_hash = %content_digest(&response.clinical_interpretation),
        tier = ?response.tier,
        language = %response.detected_language,
        confidence = response.confidence,
        pii_detected = response.pii_detected,
        duration_ms = response.processing_time_ms,
        session = session_id.unwrap_or("anonymous"),
        "translation completed"
    );
}

/// Emit the audit record for a clinician feedback action.
pub fn log_feedback(id: uuid::Uuid, approved: bool, edited: bool) {
    info!(
        target: "audit",
        action = "translation_feedback",
        id = %id,
        approved,
        edited,
        "clinician feedback recorded"
    );
}
