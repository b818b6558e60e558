use std::fmt;

use regex::Regex;
use serde::Serialize;
use tracing::warn;

/// Categories of language the engine must never emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SafetyCategory {
    /// Claims that the patient has a condition.
    Diagnostic,
    /// Medication or dosage instructions.
    Prescriptive,
    /// Statements about how the condition will develop.
    Prognosis,
    /// Recommending procedures or therapies.
    TreatmentAdvice,
}

impl fmt::Display for SafetyCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SafetyCategory::Diagnostic => "diagnostic",
            SafetyCategory::Prescriptive => "prescriptive",
            SafetyCategory::Prognosis => "prognosis",
            SafetyCategory::TreatmentAdvice => "treatment",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
}

/// Outcome of classifying a piece of output text.
#[derive(Debug, Clone, Serialize)]
pub struct SafetyVerdict {
    pub is_safe: bool,
    pub categories: Vec<SafetyCategory>,
    pub risk: RiskLevel,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl SafetyVerdict {
    fn safe(risk: RiskLevel) -> Self {
        Self { is_safe: true, categories: Vec::new(), risk, reason: None }
    }
}

struct CategoryRules {
    category: SafetyCategory,
    patterns: Vec<Regex>,
}

/// Blocks diagnostic, prescriptive, prognosis, and treatment language in
/// anything the engine emits. The pipeline gates on `is_safe`; `risk` is
/// telemetry for review queues.
pub struct SafetyClassifier {
    rules: Vec<CategoryRules>,
    medication_watchlist: Regex,
}

impl SafetyClassifier {
    pub fn new() -> Self {
        let diagnostic = [
            r"(?i)\byou have\b.*(?:disease|disorder|condition|syndrome|infection)",
            r"(?i)\byou are suffering from\b",
            r"(?i)\bdiagnosis:?\s*(?:is|would be|appears to be)",
            r"(?i)\bthis (?:is|indicates|suggests|confirms)\s+(?:a|an)?\s*(?:disease|disorder|condition)",
            r"(?i)\byou(?:'ve| have) (?:got|contracted|developed)\b",
            r"(?i)\btest results (?:show|indicate|confirm) (?:you have|presence of)",
        ];
        let prescriptive = [
            r"(?i)\byou should take\b",
            r"(?i)\btake\s+\d+\s*(?:mg|ml|tablets?|pills?|capsules?)",
            r"(?i)\bI (?:recommend|suggest|advise) (?:you take|taking)",
            r"(?i)\bprescription:?\s",
            r"(?i)\bstart (?:taking|on|with)\s+\w+\s*(?:mg|ml)?",
            r"(?i)\byou need\s+(?:to take|medication|medicine|treatment)",
            r"(?i)\bdosage:?\s*\d+",
        ];
        let prognosis = [
            r"(?i)\bthis will\s+(?:get|become|turn|progress)",
            r"(?i)\byour condition will\b",
            r"(?i)\bexpect\s+(?:recovery|improvement|deterioration)",
            r"(?i)\blikely to\s+(?:recover|worsen|die|survive)",
            r"(?i)\bprognosis:?\s",
            r"(?i)\blife expectancy\b",
        ];
        let treatment = [
            r"(?i)\byou should\s+(?:undergo|have|get|consider)\s+(?:surgery|treatment|therapy)",
            r"(?i)\btreatment options include\b",
            r"(?i)\bI recommend\s+(?:surgery|treatment|therapy|procedure)",
            r"(?i)\bconsider\s+(?:surgery|chemotherapy|radiation|transplant)",
        ];

        let compile = |category, patterns: &[&str]| CategoryRules {
            category,
            patterns: patterns.iter().map(|p| Regex::new(p).unwrap()).collect(),
        };

        Self {
            rules: vec![
                compile(SafetyCategory::Diagnostic, &diagnostic),
                compile(SafetyCategory::Prescriptive, &prescriptive),
                compile(SafetyCategory::Prognosis, &prognosis),
                compile(SafetyCategory::TreatmentAdvice, &treatment),
            ],
            // Drug mentions without prescriptive framing are allowed but
            // flagged Low so reviewers can spot them.
            medication_watchlist: Regex::new(
                r"(?i)\b(?:ibuprofen|paracetamol|acetaminophen|aspirin|antibiotics?|painkillers?|insulin)\b",
            )
            .unwrap(),
        }
    }

    /// Classify a piece of text. Violation logs carry category names only,
    /// never the text itself.
    pub fn classify(&self, text: &str) -> SafetyVerdict {
        let mut categories = Vec::new();
        for rules in &self.rules {
            if rules.patterns.iter().any(|p| p.is_match(text)) {
                categories.push(rules.category);
            }
        }

        if categories.is_empty() {
            let risk = if self.medication_watchlist.is_match(text) {
                RiskLevel::Low
            } else {
                RiskLevel::None
            };
            return SafetyVerdict::safe(risk);
        }

        let risk = if categories.len() == 1 { RiskLevel::Medium } else { RiskLevel::High };
        let names: Vec<String> = categories.iter().map(|c| c.to_string()).collect();
        let reason = format!("output contains {} language", names.join(", "));
        warn!(categories = ?names, risk = risk_display(&risk), "blocked unsafe output language");

        SafetyVerdict { is_safe: false, categories, risk, reason: Some(reason) }
    }

    /// Classify an interpretation together with its rationale, the unit the
    /// pipeline gates on before finalizing a response.
    pub fn classify_output(&self, clinical_term: &str, rationale: &str) -> SafetyVerdict {
        self.classify(&format!("{clinical_term} {rationale}"))
    }
}

impl Default for SafetyClassifier {
    fn default() -> Self {
        Self::new()
    }
}

fn risk_display(risk: &RiskLevel) -> &'static str {
    match risk {
        RiskLevel::None => "none",
        RiskLevel::Low => "low",
        RiskLevel::Medium => "medium",
        RiskLevel::High => "high",
    }
}
