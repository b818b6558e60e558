use whatlang::Lang;

/// Outcome of language detection. `reliable: false` means the pipeline
/// proceeds on a best-effort language and the assembler applies the
/// detection penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detection {
    /// ISO 639-1 code, always within the supported set.
    pub code: &'static str,
    pub reliable: bool,
}

impl Detection {
    fn reliable(code: &'static str) -> Self {
        Self { code, reliable: true }
    }

    fn unreliable(code: &'static str) -> Self {
        Self { code, reliable: false }
    }
}

/// Common Hindi/Urdu words as patients type them in Latin script.
/// Statistical detectors are trained on native scripts and miss these, so
/// two distinct hits force Hindi before statistics run.
const ROMANIZED_HINDI_WORDS: &[&str] = &[
    "mein", "mera", "mere", "meri", "hai", "hain", "nahi", "nahin", "raha",
    "rahi", "hoon", "kya", "kyun", "dard", "bukhar", "seene", "pet", "gala",
    "khansi", "thakan", "chakkar",
];

/// Detect the input language, mapped onto the supported catalog.
///
/// Unsupported and unreliable detections fall back to English; ASCII text
/// is trusted as English without penalty, anything else keeps the
/// best-effort language but is marked unreliable.
pub fn detect(text: &str) -> Detection {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Detection::unreliable("en");
    }

    let ascii = trimmed.is_ascii();
    if ascii && romanized_hindi_hits(trimmed) >= 2 {
        return Detection::reliable("hi");
    }

    match whatlang::detect(trimmed) {
        Some(info) => match lang_to_code(info.lang()) {
            Some(code) if info.is_reliable() => Detection::reliable(code),
            Some(code) if !ascii => Detection::unreliable(code),
            // Latin-script text the detector is unsure about is
            // overwhelmingly English in this intake flow.
            Some(_) => Detection::reliable("en"),
            None if ascii && !info.is_reliable() => Detection::reliable("en"),
            None => Detection::unreliable("en"),
        },
        None if ascii => Detection::reliable("en"),
        None => Detection::unreliable("en"),
    }
}

fn romanized_hindi_hits(text: &str) -> usize {
    let lower = text.to_lowercase();
    let tokens: Vec<&str> = lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    ROMANIZED_HINDI_WORDS
        .iter()
        .filter(|word| tokens.iter().any(|t| t == *word))
        .count()
}

fn lang_to_code(lang: Lang) -> Option<&'static str> {
    let code = match lang {
        Lang::Eng => "en",
        Lang::Hin => "hi",
        Lang::Spa => "es",
        Lang::Fra => "fr",
        Lang::Deu => "de",
        Lang::Por => "pt",
        Lang::Cmn => "zh",
        Lang::Jpn => "ja",
        Lang::Kor => "ko",
        Lang::Ara => "ar",
        Lang::Rus => "ru",
        Lang::Tam => "ta",
        Lang::Tel => "te",
        Lang::Ben => "bn",
        Lang::Mar => "mr",
        Lang::Guj => "gu",
        Lang::Kan => "kn",
        Lang::Mal => "ml",
        Lang::Pan => "pa",
        Lang::Urd => "ur",
        _ => return None,
    };
    Some(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_english_sentences_detect_as_english() {
        let detection = detect("my feet are burning and I cannot sleep at night");
        assert_eq!(detection.code, "en");
        assert!(detection.reliable);
    }

    #[test]
    fn short_ascii_fragments_stay_english_without_penalty() {
        let detection = detect("dizzy");
        assert_eq!(detection.code, "en");
        assert!(detection.reliable);
    }

    #[test]
    fn romanized_hindi_is_recognized() {
        let detection = detect("mere seene mein dard hai");
        assert_eq!(detection.code, "hi");
        assert!(detection.reliable);
    }

    #[test]
    fn devanagari_hindi_is_recognized() {
        let detection = detect("मेरे सीने में दर्द हो रहा है और सांस लेने में तकलीफ है");
        assert_eq!(detection.code, "hi");
    }

    #[test]
    fn spanish_is_recognized() {
        let detection = detect("me duele mucho la cabeza desde esta mañana y tengo náuseas");
        assert_eq!(detection.code, "es");
    }

    #[test]
    fn empty_input_falls_back_unreliably() {
        let detection = detect("   ");
        assert_eq!(detection.code, "en");
        assert!(!detection.reliable);
    }

    #[test]
    fn single_hindi_word_is_not_enough_evidence() {
        // "hai" alone could be a typo; two distinct hits are required.
        let detection = detect("hai there friend how are you doing today");
        assert_eq!(detection.code, "en");
    }

    #[test]
    fn every_mapped_language_is_in_the_catalog() {
        for lang in Lang::all() {
            if let Some(code) = lang_to_code(*lang) {
                assert!(
                    crate::language::registry::find(code).is_some(),
                    "{code} missing from catalog"
                );
            }
        }
    }
}
