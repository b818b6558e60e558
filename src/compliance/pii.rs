use regex::Regex;
use serde::Serialize;
use tracing::debug;

/// What the scrubber found, without the text itself. Surfaced as response
/// metadata and audit fields.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScrubReport {
    pub pii_found: bool,
    pub types: Vec<String>,
    pub count: usize,
}

struct PiiPattern {
    kind: &'static str,
    pattern: Regex,
    placeholder: &'static str,
}

/// Redacts personally identifiable information before any other component
/// (including the LLM collaborator) sees the text.
///
/// Scrubbing fails open: it never errors and never blocks translation.
pub struct PiiScrubber {
    patterns: Vec<PiiPattern>,
    name_patterns: Vec<Regex>,
}

impl PiiScrubber {
    pub fn new() -> Self {
        // Order matters: longer digit runs (cards) are claimed before
        // shorter overlapping shapes (Aadhaar, SSN) can split them.
        let specs: &[(&str, &str, &str)] = &[
            ("email", r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b", "[EMAIL_REDACTED]"),
            ("mrn", r"(?i)\b(?:MRN|MR|Patient\s*ID)[\s:#-]*\d{4,12}\b", "[MRN_REDACTED]"),
            ("dob", r"(?i)\b(?:DOB|Date\s*of\s*Birth|Born)[\s:]*\d{1,2}[-/]\d{1,2}[-/]\d{2,4}\b", "[DOB_REDACTED]"),
            ("credit_card", r"\b(?:\d{4}[\s-]?){3}\d{4}\b", "[CARD_REDACTED]"),
            ("phone_india", r"\b(?:\+91[\-\s]?)?[6-9]\d{9}\b", "[PHONE_REDACTED]"),
            ("phone_us", r"\b(?:\+1[\-\s]?)?\(?\d{3}\)?[\-\s]?\d{3}[\-\s]?\d{4}\b", "[PHONE_REDACTED]"),
            ("phone_generic", r"\b\d{10,15}\b", "[PHONE_REDACTED]"),
            ("aadhaar", r"\b\d{4}[\s-]?\d{4}[\s-]?\d{4}\b", "[AADHAAR_REDACTED]"),
            ("ssn", r"\b\d{3}[\s-]?\d{2}[\s-]?\d{4}\b", "[SSN_REDACTED]"),
            ("date", r"\b\d{1,2}[-/]\d{1,2}[-/]\d{2,4}\b", "[DATE_REDACTED]"),
            ("ip_address", r"\b(?:\d{1,3}\.){3}\d{1,3}\b", "[IP_REDACTED]"),
        ];
        let patterns = specs
            .iter()
            .map(|(kind, pattern, placeholder)| PiiPattern {
                kind,
                pattern: Regex::new(pattern).unwrap(),
                placeholder,
            })
            .collect();

        // Capitalization carries the signal for names, so only the trigger
        // phrases are case-insensitive.
        let name_patterns = vec![
            Regex::new(r"\b(?:Mr|Mrs|Ms|Dr|Prof)\.\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)*\b").unwrap(),
            Regex::new(r"\b(?i:my name is|i am|i'm)\s+[A-Z][a-z]+\b").unwrap(),
        ];

        Self { patterns, name_patterns }
    }

    /// Replace every detected PII span with its typed placeholder and
    /// report what was found.
    pub fn scrub(&self, text: &str) -> (String, ScrubReport) {
        let mut sanitized = text.to_string();
        let mut report = ScrubReport::default();

        for entry in &self.patterns {
            let hits = entry.pattern.find_iter(&sanitized).count();
            if hits > 0 {
                sanitized = entry
                    .pattern
                    .replace_all(&sanitized, entry.placeholder)
                    .into_owned();
                report.pii_found = true;
                report.types.push(entry.kind.to_string());
                report.count += hits;
            }
        }

        for pattern in &self.name_patterns {
            let hits = pattern.find_iter(&sanitized).count();
            if hits > 0 {
                sanitized = pattern.replace_all(&sanitized, "[NAME_REDACTED]").into_owned();
                report.pii_found = true;
                if !report.types.iter().any(|t| t == "name") {
                    report.types.push("name".to_string());
                }
                report.count += hits;
            }
        }

        if report.pii_found {
            debug!(types = ?report.types, count = report.count, "redacted PII from input");
        }
        (sanitized, report)
    }

    /// True when no pattern fires on the text. Used to check that redacted
    /// output really is clean before it leaves the process.
    pub fn is_clean(&self, text: &str) -> bool {
        self.patterns.iter().all(|e| !e.pattern.is_match(text))
            && self.name_patterns.iter().all(|p| !p.is_match(text))
    }
}

impl Default for PiiScrubber {
    fn default() -> Self {
        Self::new()
    }
}
