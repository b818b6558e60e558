use tracing::debug;

use crate::engine::types::ClinicalMapping;

/// One curated row: every phrase maps to the same vetted interpretation.
/// Codes are symptom codes only, never disease or diagnosis codes.
#[derive(Debug)]
pub struct CuratedMapping {
    pub phrases: &'static [&'static str],
    pub clinical: &'static str,
    pub snomed: &'static str,
    pub icd10: &'static str,
    pub body_system: &'static str,
}

impl CuratedMapping {
    pub fn to_clinical_mapping(&self) -> ClinicalMapping {
        ClinicalMapping {
            term: self.clinical.to_string(),
            snomed_code: self.snomed.to_string(),
            snomed_display: self.clinical.to_string(),
            icd10_code: self.icd10.to_string(),
            icd10_display: self.clinical.to_string(),
            body_system: Some(self.body_system.to_string()),
        }
    }
}

/// A lookup hit: the winning phrase plus its row.
#[derive(Debug, Clone, Copy)]
pub struct CuratedMatch {
    pub phrase: &'static str,
    pub mapping: &'static CuratedMapping,
}

/// Vetted colloquial-to-clinical rows. Declaration order is the tiebreak
/// order for equal-length matches, so it is part of the contract.
static CURATED_MAPPINGS: &[CuratedMapping] = &[
    // Cardiovascular
    CuratedMapping {
        phrases: &["heart feels funny", "heart is fluttering", "palpitations"],
        clinical: "Palpitations",
        snomed: "80313002",
        icd10: "R00.2",
        body_system: "cardiovascular",
    },
    CuratedMapping {
        phrases: &["chest is tight", "chest pain", "chest tightness", "pressure in my chest"],
        clinical: "Chest Tightness",
        snomed: "23924001",
        icd10: "R07.89",
        body_system: "cardiovascular",
    },
    CuratedMapping {
        phrases: &["heart racing", "racing heart", "heart is pounding"],
        clinical: "Tachycardia",
        snomed: "3424008",
        icd10: "R00.0",
        body_system: "cardiovascular",
    },
    CuratedMapping {
        phrases: &["heart skipping", "skipped a beat"],
        clinical: "Irregular Heartbeat",
        snomed: "361137007",
        icd10: "R00.8",
        body_system: "cardiovascular",
    },
    // Respiratory
    CuratedMapping {
        phrases: &["stuffy nose", "blocked nose", "nose is blocked"],
        clinical: "Nasal Congestion",
        snomed: "68235000",
        icd10: "R09.81",
        body_system: "respiratory",
    },
    CuratedMapping {
        phrases: &["runny nose", "nose keeps running"],
        clinical: "Rhinorrhea",
        snomed: "64531003",
        icd10: "R09.89",
        body_system: "respiratory",
    },
    CuratedMapping {
        phrases: &["can't breathe", "short of breath", "breathless", "out of breath", "hard to breathe"],
        clinical: "Dyspnea",
        snomed: "267036007",
        icd10: "R06.00",
        body_system: "respiratory",
    },
    CuratedMapping {
        phrases: &["wheezing", "whistling when i breathe"],
        clinical: "Wheezing",
        snomed: "56018004",
        icd10: "R06.2",
        body_system: "respiratory",
    },
    CuratedMapping {
        phrases: &["cough", "coughing", "bad cough"],
        clinical: "Cough",
        snomed: "49727002",
        icd10: "R05.9",
        body_system: "respiratory",
    },
    CuratedMapping {
        phrases: &["hiccups", "hiccups won't stop"],
        clinical: "Hiccups",
        snomed: "65958008",
        icd10: "R06.6",
        body_system: "respiratory",
    },
    CuratedMapping {
        phrases: &["sneezing", "keep sneezing", "sneezing a lot"],
        clinical: "Sneezing",
        snomed: "76067001",
        icd10: "R06.7",
        body_system: "respiratory",
    },
    // Ear, nose and throat
    CuratedMapping {
        phrases: &["sore throat", "throat pain", "throat is sore"],
        clinical: "Throat Pain",
        snomed: "162397003",
        icd10: "R07.0",
        body_system: "ent",
    },
    CuratedMapping {
        phrases: &["ear pain", "ear ache", "earache", "my ear hurts"],
        clinical: "Otalgia",
        snomed: "16001004",
        icd10: "H92.0",
        body_system: "ent",
    },
    CuratedMapping {
        phrases: &["hoarse", "lost my voice", "voice is hoarse"],
        clinical: "Hoarseness",
        snomed: "50219008",
        icd10: "R49.0",
        body_system: "ent",
    },
    CuratedMapping {
        phrases: &["nosebleed", "nose is bleeding", "bleeding from my nose"],
        clinical: "Epistaxis",
        snomed: "12441001",
        icd10: "R04.0",
        body_system: "ent",
    },
    // Gastrointestinal
    CuratedMapping {
        phrases: &["stomach is churning", "queasy", "feel sick to my stomach", "nauseous"],
        clinical: "Nausea",
        snomed: "422587007",
        icd10: "R11.0",
        body_system: "gastrointestinal",
    },
    CuratedMapping {
        phrases: &["feeling bloated", "bloated"],
        clinical: "Bloating",
        snomed: "248490000",
        icd10: "R14.0",
        body_system: "gastrointestinal",
    },
    CuratedMapping {
        phrases: &["throwing up", "puking", "vomiting"],
        clinical: "Vomiting",
        snomed: "422400008",
        icd10: "R11.10",
        body_system: "gastrointestinal",
    },
    CuratedMapping {
        phrases: &["belly hurts", "stomach hurts", "stomach ache", "tummy hurts", "stomach cramps"],
        clinical: "Abdominal Pain",
        snomed: "21522001",
        icd10: "R10.9",
        body_system: "gastrointestinal",
    },
    CuratedMapping {
        phrases: &["runs", "diarrhea", "loose motions"],
        clinical: "Diarrhea",
        snomed: "62315008",
        icd10: "R19.7",
        body_system: "gastrointestinal",
    },
    CuratedMapping {
        phrases: &["heartburn", "acid coming up", "burning in my chest"],
        clinical: "Heartburn",
        snomed: "16331000",
        icd10: "R12",
        body_system: "gastrointestinal",
    },
    CuratedMapping {
        phrases: &["hard to swallow", "can't swallow", "trouble swallowing"],
        clinical: "Dysphagia",
        snomed: "40739000",
        icd10: "R13.10",
        body_system: "gastrointestinal",
    },
    // Neurological
    CuratedMapping {
        phrases: &["head is pounding", "headache", "head hurts", "splitting headache"],
        clinical: "Headache",
        snomed: "25064002",
        icd10: "R51.9",
        body_system: "neurological",
    },
    CuratedMapping {
        phrases: &["dizzy", "lightheaded", "light headed", "room is spinning"],
        clinical: "Dizziness",
        snomed: "404640003",
        icd10: "R42",
        body_system: "neurological",
    },
    CuratedMapping {
        phrases: &["seeing double", "double vision"],
        clinical: "Diplopia",
        snomed: "24982008",
        icd10: "H53.2",
        body_system: "neurological",
    },
    CuratedMapping {
        phrases: &["blurred vision", "blurry vision", "vision is blurry"],
        clinical: "Blurred Vision",
        snomed: "4148004",
        icd10: "H53.8",
        body_system: "neurological",
    },
    CuratedMapping {
        phrases: &["numb", "numbness", "tingling", "pins and needles"],
        clinical: "Paresthesia",
        snomed: "91019004",
        icd10: "R20.2",
        body_system: "neurological",
    },
    CuratedMapping {
        phrases: &["burning feet", "feet burning", "feet are burning"],
        clinical: "Burning Feet Sensation",
        snomed: "39072002",
        icd10: "R20.8",
        body_system: "neurological",
    },
    CuratedMapping {
        phrases: &["hands are shaking", "shaky hands", "trembling"],
        clinical: "Tremor",
        snomed: "26079004",
        icd10: "R25.1",
        body_system: "neurological",
    },
    CuratedMapping {
        phrases: &["fainted", "passed out", "blacked out"],
        clinical: "Syncope",
        snomed: "271594007",
        icd10: "R55",
        body_system: "neurological",
    },
    // Skin
    CuratedMapping {
        phrases: &["burning", "burning sensation"],
        clinical: "Burning Sensation",
        snomed: "19387006",
        icd10: "R20.8",
        body_system: "skin",
    },
    CuratedMapping {
        phrases: &["itchy", "itching", "itchy skin"],
        clinical: "Pruritus",
        snomed: "418290006",
        icd10: "L29.9",
        body_system: "skin",
    },
    CuratedMapping {
        phrases: &["rash", "skin rash"],
        clinical: "Rash",
        snomed: "271807003",
        icd10: "R21",
        body_system: "skin",
    },
    // Musculoskeletal
    CuratedMapping {
        phrases: &["joints are stiff", "stiff joints", "joint stiffness"],
        clinical: "Joint Stiffness",
        snomed: "84445001",
        icd10: "M25.60",
        body_system: "musculoskeletal",
    },
    CuratedMapping {
        phrases: &["back is killing me"],
        clinical: "Severe Back Pain",
        snomed: "161891005",
        icd10: "M54.9",
        body_system: "musculoskeletal",
    },
    CuratedMapping {
        phrases: &["back pain", "my back hurts"],
        clinical: "Back Pain",
        snomed: "161891005",
        icd10: "M54.9",
        body_system: "musculoskeletal",
    },
    CuratedMapping {
        phrases: &["muscles ache", "muscle pain", "body aches", "sore all over"],
        clinical: "Myalgia",
        snomed: "68962001",
        icd10: "M79.1",
        body_system: "musculoskeletal",
    },
    CuratedMapping {
        phrases: &["my legs hurt", "leg pain", "legs hurt"],
        clinical: "Leg Pain",
        snomed: "10601006",
        icd10: "M79.6",
        body_system: "musculoskeletal",
    },
    CuratedMapping {
        phrases: &["arm pain", "my arms hurt"],
        clinical: "Arm Pain",
        snomed: "102556003",
        icd10: "M79.6",
        body_system: "musculoskeletal",
    },
    CuratedMapping {
        phrases: &["neck pain", "my neck hurts"],
        clinical: "Cervical Pain",
        snomed: "81680005",
        icd10: "M54.2",
        body_system: "musculoskeletal",
    },
    CuratedMapping {
        phrases: &["muscle cramps", "leg cramps", "charley horse"],
        clinical: "Muscle Cramp",
        snomed: "55300003",
        icd10: "R25.2",
        body_system: "musculoskeletal",
    },
    // General and systemic
    CuratedMapping {
        phrases: &["feeling tired", "no energy", "exhausted", "worn out", "tired all the time"],
        clinical: "Fatigue",
        snomed: "84229001",
        icd10: "R53.83",
        body_system: "general",
    },
    CuratedMapping {
        phrases: &["fever", "feverish", "running a temperature", "high temperature"],
        clinical: "Pyrexia",
        snomed: "386661006",
        icd10: "R50.9",
        body_system: "general",
    },
    CuratedMapping {
        phrases: &["chills", "shivering"],
        clinical: "Chills",
        snomed: "43724002",
        icd10: "R68.83",
        body_system: "general",
    },
    CuratedMapping {
        phrases: &["sweating", "sweating a lot", "night sweats"],
        clinical: "Hyperhidrosis",
        snomed: "52613005",
        icd10: "R61",
        body_system: "general",
    },
    CuratedMapping {
        phrases: &["losing weight", "weight loss"],
        clinical: "Weight Loss",
        snomed: "89362005",
        icd10: "R63.4",
        body_system: "general",
    },
    CuratedMapping {
        phrases: &["no appetite", "not hungry", "lost my appetite"],
        clinical: "Loss of Appetite",
        snomed: "79890006",
        icd10: "R63.0",
        body_system: "general",
    },
    CuratedMapping {
        phrases: &["swollen feet", "feet are swollen", "swollen legs", "legs are swollen"],
        clinical: "Peripheral Swelling",
        snomed: "65124004",
        icd10: "R60.0",
        body_system: "general",
    },
    CuratedMapping {
        phrases: &["dry mouth", "mouth is dry", "mouth feels dry"],
        clinical: "Dry Mouth",
        snomed: "87715008",
        icd10: "R68.2",
        body_system: "general",
    },
    // Genitourinary
    CuratedMapping {
        phrases: &["peeing a lot", "keep peeing", "urinating a lot"],
        clinical: "Polyuria",
        snomed: "56574000",
        icd10: "R35.0",
        body_system: "genitourinary",
    },
    CuratedMapping {
        phrases: &["burns when i pee", "hurts to pee", "painful urination"],
        clinical: "Dysuria",
        snomed: "49650001",
        icd10: "R30.0",
        body_system: "genitourinary",
    },
    CuratedMapping {
        phrases: &["blood in my urine", "peeing blood", "blood in my pee"],
        clinical: "Hematuria",
        snomed: "34436003",
        icd10: "R31.9",
        body_system: "genitourinary",
    },
];

/// The tier-1 lookup table. Pure CPU and memory; the curated path never
/// touches the network.
pub struct CuratedTable {
    entries: &'static [CuratedMapping],
}

impl CuratedTable {
    pub fn builtin() -> Self {
        Self { entries: CURATED_MAPPINGS }
    }

    /// Find the best curated row for normalized text.
    ///
    /// A phrase matches when every one of its words occurs as a whole word
    /// in the input, so "feet burning" hits "my feet are burning" without
    /// matching inside other words. The longest phrase wins; equal lengths
    /// fall back to declaration order. Same input, same result, always.
    pub fn lookup(&self, text: &str) -> Option<CuratedMatch> {
        let tokens = tokenize(text);
        if tokens.is_empty() {
            return None;
        }

        let mut best: Option<CuratedMatch> = None;
        for mapping in self.entries {
            for &phrase in mapping.phrases {
                let matches = phrase
                    .split_whitespace()
                    .all(|word| tokens.iter().any(|t| t == word));
                if matches && best.map_or(true, |b| phrase.len() > b.phrase.len()) {
                    best = Some(CuratedMatch { phrase, mapping });
                }
            }
        }

        if let Some(hit) = best {
            debug!(phrase = hit.phrase, term = hit.mapping.clinical, "curated table hit");
        }
        best
    }

    pub fn phrase_count(&self) -> usize {
        self.entries.iter().map(|e| e.phrases.len()).sum()
    }
}

impl Default for CuratedTable {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Lowercased word tokens; apostrophes stay inside words so "can't"
/// survives as one token.
pub(crate) fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .replace('\u{2019}', "'")
        .split(|c: char| !c.is_alphanumeric() && c != '\'')
        .filter(|t| !t.is_empty())
        .map(|t| t.trim_matches('\'').to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
