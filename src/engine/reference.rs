/// Vetted symptom codes for terms the fallback tier commonly returns.
///
/// When the language model names one of these terms, its codes are snapped
/// to the vetted row instead of trusting model-supplied codes. The table is
/// read-only and symptom-coded throughout.
#[derive(Debug)]
pub struct ReferenceEntry {
    pub term: &'static str,
    pub clinical: &'static str,
    pub snomed: &'static str,
    pub icd10: &'static str,
}

/// Codes for the degraded "Unspecified Symptom" response.
pub const UNSPECIFIED_SNOMED: &str = "267038008";
pub const UNSPECIFIED_ICD10: &str = "R68.89";
pub const UNSPECIFIED_TERM: &str = "Unspecified Symptom";

static REFERENCE_CODES: &[ReferenceEntry] = &[
    ReferenceEntry { term: "tinnitus", clinical: "Tinnitus", snomed: "60862009", icd10: "H93.1" },
    ReferenceEntry { term: "ear ringing", clinical: "Tinnitus", snomed: "60862009", icd10: "H93.1" },
    ReferenceEntry { term: "ringing ears", clinical: "Tinnitus", snomed: "60862009", icd10: "H93.1" },
    ReferenceEntry { term: "ringing in ears", clinical: "Tinnitus", snomed: "60862009", icd10: "H93.1" },
    ReferenceEntry { term: "jaw pain", clinical: "Jaw Pain", snomed: "30968004", icd10: "R68.84" },
    ReferenceEntry { term: "mandibular pain", clinical: "Jaw Pain", snomed: "30968004", icd10: "R68.84" },
    ReferenceEntry { term: "swollen glands", clinical: "Lymphadenopathy", snomed: "30746007", icd10: "R59.9" },
    ReferenceEntry { term: "lymph nodes", clinical: "Lymphadenopathy", snomed: "30746007", icd10: "R59.9" },
    ReferenceEntry { term: "sore throat", clinical: "Throat Pain", snomed: "162397003", icd10: "R07.0" },
    ReferenceEntry { term: "throat pain", clinical: "Throat Pain", snomed: "162397003", icd10: "R07.0" },
    ReferenceEntry { term: "difficulty swallowing", clinical: "Dysphagia", snomed: "40739000", icd10: "R13.10" },
    ReferenceEntry { term: "trouble swallowing", clinical: "Dysphagia", snomed: "40739000", icd10: "R13.10" },
    ReferenceEntry { term: "difficulty breathing", clinical: "Dyspnea", snomed: "267036007", icd10: "R06.00" },
    ReferenceEntry { term: "back stiffness", clinical: "Spinal Stiffness", snomed: "249917008", icd10: "M54.9" },
    ReferenceEntry { term: "stiff neck", clinical: "Neck Stiffness", snomed: "249917008", icd10: "M54.2" },
    ReferenceEntry { term: "tremor", clinical: "Tremor", snomed: "26079004", icd10: "R25.1" },
    ReferenceEntry { term: "shaking", clinical: "Tremor", snomed: "26079004", icd10: "R25.1" },
    ReferenceEntry { term: "muscle weakness", clinical: "Muscle Weakness", snomed: "26544005", icd10: "M62.81" },
    ReferenceEntry { term: "weakness", clinical: "Generalized Weakness", snomed: "80449002", icd10: "R53.1" },
    ReferenceEntry { term: "headache", clinical: "Headache", snomed: "25064002", icd10: "R51.9" },
    ReferenceEntry { term: "head pain", clinical: "Headache", snomed: "25064002", icd10: "R51.9" },
    ReferenceEntry { term: "vision problems", clinical: "Visual Disturbance", snomed: "63033001", icd10: "H53.9" },
    ReferenceEntry { term: "blurred vision", clinical: "Blurred Vision", snomed: "4148004", icd10: "H53.8" },
    ReferenceEntry { term: "eye pain", clinical: "Ocular Pain", snomed: "40638003", icd10: "H57.1" },
    ReferenceEntry { term: "ear pain", clinical: "Otalgia", snomed: "16001004", icd10: "H92.0" },
    ReferenceEntry { term: "ear ache", clinical: "Otalgia", snomed: "16001004", icd10: "H92.0" },
    ReferenceEntry { term: "shoulder pain", clinical: "Shoulder Pain", snomed: "55680006", icd10: "M25.51" },
    ReferenceEntry { term: "hip pain", clinical: "Hip Pain", snomed: "49218002", icd10: "M25.55" },
    ReferenceEntry { term: "knee pain", clinical: "Knee Pain", snomed: "30989003", icd10: "M25.56" },
    ReferenceEntry { term: "ankle pain", clinical: "Ankle Pain", snomed: "10601006", icd10: "M25.57" },
    ReferenceEntry { term: "foot pain", clinical: "Foot Pain", snomed: "47411000", icd10: "M79.6" },
    ReferenceEntry { term: "skin rash", clinical: "Rash", snomed: "271807003", icd10: "R21" },
    ReferenceEntry { term: "rash", clinical: "Rash", snomed: "271807003", icd10: "R21" },
    ReferenceEntry { term: "itching", clinical: "Pruritus", snomed: "418290006", icd10: "L29.9" },
    ReferenceEntry { term: "itchy", clinical: "Pruritus", snomed: "418290006", icd10: "L29.9" },
    ReferenceEntry { term: "dry skin", clinical: "Dry Skin", snomed: "16386004", icd10: "R23.4" },
    ReferenceEntry { term: "lip swelling", clinical: "Lip Swelling", snomed: "423666004", icd10: "R60.0" },
    ReferenceEntry { term: "bad taste", clinical: "Dysgeusia", snomed: "367069002", icd10: "R43.2" },
    ReferenceEntry { term: "metallic taste", clinical: "Dysgeusia", snomed: "367069002", icd10: "R43.2" },
    ReferenceEntry { term: "nausea", clinical: "Nausea", snomed: "422587007", icd10: "R11.0" },
    ReferenceEntry { term: "dizziness", clinical: "Dizziness", snomed: "404640003", icd10: "R42" },
    ReferenceEntry { term: "vertigo", clinical: "Vertigo", snomed: "399153001", icd10: "R42" },
    ReferenceEntry { term: "fatigue", clinical: "Fatigue", snomed: "84229001", icd10: "R53.83" },
    ReferenceEntry { term: "palpitations", clinical: "Palpitations", snomed: "80313002", icd10: "R00.2" },
    ReferenceEntry { term: "chest tightness", clinical: "Chest Tightness", snomed: "23924001", icd10: "R07.89" },
    ReferenceEntry { term: "night sweats", clinical: "Night Sweats", snomed: "42984000", icd10: "R61" },
    ReferenceEntry { term: "loss of appetite", clinical: "Loss of Appetite", snomed: "79890006", icd10: "R63.0" },
    ReferenceEntry { term: "muscle cramps", clinical: "Muscle Cramp", snomed: "55300003", icd10: "R25.2" },
    ReferenceEntry { term: "leg cramps", clinical: "Muscle Cramp", snomed: "55300003", icd10: "R25.2" },
    ReferenceEntry { term: "cramps", clinical: "Muscle Cramp", snomed: "55300003", icd10: "R25.2" },
];

/// ICD-10 regions that code symptoms rather than diseases. R-chapter codes
/// pass outright; the prefixes cover symptom codes living in other
/// chapters (otalgia, pruritus, joint pain and the like).
const SYMPTOM_CODE_PREFIXES: &[&str] = &[
    "H53", "H57", "H92", "H93.1", "L29", "M25.5", "M25.6", "M54", "M62.81", "M79.1", "M79.6",
];

/// Find a vetted row for a fallback term, exact first, then the partial
/// containment match the fallback tier has always used.
pub fn lookup_term(term: &str) -> Option<&'static ReferenceEntry> {
    let needle = term.trim().to_lowercase();
    if needle.is_empty() {
        return None;
    }
    REFERENCE_CODES
        .iter()
        .find(|entry| entry.term == needle)
        .or_else(|| {
            REFERENCE_CODES
                .iter()
                .find(|entry| needle.contains(entry.term) || entry.term.contains(needle.as_str()))
        })
}

/// Whether an ICD-10 code plausibly denotes a symptom rather than a
/// disease or diagnosis.
pub fn is_plausible_symptom_code(icd10: &str) -> bool {
    let code = icd10.trim().to_uppercase();
    if code.is_empty() {
        return false;
    }
    code.starts_with('R') || SYMPTOM_CODE_PREFIXES.iter().any(|prefix| code.starts_with(prefix))
}
