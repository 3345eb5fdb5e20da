//! Text translation providers.
//!
//! Google Cloud Translation v2 is the default; Gemini is available for
//! deployments that prefer a generative model.

mod base;
pub mod gemini;
pub mod google;

pub use base::{
    BaseTranslator, TRANSLATION_ERROR_PREFIX, TranslationError, TranslatorConfig,
    translate_or_passthrough,
};
pub use gemini::GeminiTranslator;
pub use google::GoogleTranslator;

/// Supported translation providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TranslationProvider {
    /// Google Cloud Translation API v2
    #[default]
    Google,
    /// Gemini generateContent API
    Gemini,
}

impl std::fmt::Display for TranslationProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslationProvider::Google => write!(f, "google"),
            TranslationProvider::Gemini => write!(f, "gemini"),
        }
    }
}

impl std::str::FromStr for TranslationProvider {
    type Err = TranslationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "google" | "google-translate" | "google_translate" => Ok(TranslationProvider::Google),
            "gemini" | "google-gemini" => Ok(TranslationProvider::Gemini),
            _ => Err(TranslationError::ConfigurationError(format!(
                "Unsupported translation provider: {s}. Supported providers: google, gemini"
            ))),
        }
    }
}

/// Create a translator by provider name.
pub fn create_translator(
    provider: &str,
    client: reqwest::Client,
    config: TranslatorConfig,
) -> Result<Box<dyn BaseTranslator>, TranslationError> {
    match provider.parse::<TranslationProvider>()? {
        TranslationProvider::Google => Ok(Box::new(GoogleTranslator::new(client, config)?)),
        TranslationProvider::Gemini => Ok(Box::new(GeminiTranslator::new(client, config)?)),
    }
}

pub fn get_supported_translation_providers() -> Vec<&'static str> {
    vec!["google", "gemini"]
}
