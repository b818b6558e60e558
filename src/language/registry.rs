use serde::Serialize;

/// A language the intake pipeline accepts.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct LanguageSpec {
    /// ISO 639-1 code.
    pub code: &'static str,
    /// English name, used for `original_language` in responses.
    pub name: &'static str,
    /// Name in the language itself, for patient-facing pickers.
    pub native_name: &'static str,
}

/// Supported intake languages. Order is presentation order for the
/// languages endpoint; English stays first.
pub const SUPPORTED_LANGUAGES: &[LanguageSpec] = &[
    LanguageSpec { code: "en", name: "English", native_name: "English" },
    LanguageSpec { code: "hi", name: "Hindi", native_name: "हिन्दी" },
    LanguageSpec { code: "es", name: "Spanish", native_name: "Español" },
    LanguageSpec { code: "fr", name: "French", native_name: "Français" },
    LanguageSpec { code: "de", name: "German", native_name: "Deutsch" },
    LanguageSpec { code: "pt", name: "Portuguese", native_name: "Português" },
    LanguageSpec { code: "zh", name: "Chinese (Simplified)", native_name: "简体中文" },
    LanguageSpec { code: "ja", name: "Japanese", native_name: "日本語" },
    LanguageSpec { code: "ko", name: "Korean", native_name: "한국어" },
    LanguageSpec { code: "ar", name: "Arabic", native_name: "العربية" },
    LanguageSpec { code: "ru", name: "Russian", native_name: "Русский" },
    LanguageSpec { code: "ta", name: "Tamil", native_name: "தமிழ்" },
    LanguageSpec { code: "te", name: "Telugu", native_name: "తెలుగు" },
    LanguageSpec { code: "bn", name: "Bengali", native_name: "বাংলা" },
    LanguageSpec { code: "mr", name: "Marathi", native_name: "मराठी" },
    LanguageSpec { code: "gu", name: "Gujarati", native_name: "ગુજરાતી" },
    LanguageSpec { code: "kn", name: "Kannada", native_name: "ಕನ್ನಡ" },
    LanguageSpec { code: "ml", name: "Malayalam", native_name: "മലയാളം" },
    LanguageSpec { code: "pa", name: "Punjabi", native_name: "ਪੰਜਾਬੀ" },
    LanguageSpec { code: "ur", name: "Urdu", native_name: "اردو" },
];

/// Look up a language by ISO 639-1 code.
pub fn find(code: &str) -> Option<&'static LanguageSpec> {
    let code = code.trim().to_ascii_lowercase();
    SUPPORTED_LANGUAGES.iter().find(|spec| spec.code == code)
}

/// English name for a code, e.g. "hi" -> "Hindi". Unknown codes report
/// "Unknown" rather than leaking the raw code into responses.
pub fn display_name(code: &str) -> &'static str {
    find(code).map(|spec| spec.name).unwrap_or("Unknown")
}
