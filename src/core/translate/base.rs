//! Base trait and types for text translation providers.

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, warn};

/// Prefix marking text that could not be translated.
pub const TRANSLATION_ERROR_PREFIX: &str = "[Translation Error]";

/// Errors raised by translation providers.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TranslationError {
    /// No API key configured for the provider
    #[error("Missing API key: {0}")]
    MissingApiKey(String),

    /// Request never produced an HTTP response
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Non-2xx response from the provider
    #[error("Translation API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    /// Response did not contain a translation
    #[error("Invalid response structure from Translation API: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    ConfigurationError(String),
}

/// Provider-agnostic translator configuration.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TranslatorConfig {
    /// Provider name ("google" or "gemini")
    pub provider: String,
    pub api_key: String,
    /// Model identifier; only generative providers use it
    pub model: Option<String>,
    /// Override for the provider's base URL
    pub endpoint: Option<String>,
}

/// Text translation provider.
#[async_trait]
pub trait BaseTranslator: Send + Sync {
    /// Translate `text` from `source` to `target` language codes.
    async fn translate(
        &self,
        source: &str,
        target: &str,
        text: &str,
    ) -> Result<String, TranslationError>;

    fn get_provider_info(&self) -> &'static str;
}

/// Translate, degrading instead of failing.
///
/// Without a translator the original text comes back unchanged. A failed
/// call yields the original text behind [`TRANSLATION_ERROR_PREFIX`].
pub async fn translate_or_passthrough(
    translator: Option<&dyn BaseTranslator>,
    source: &str,
    target: &str,
    text: &str,
) -> String {
    let Some(translator) = translator else {
        warn!("No translation API key configured, passing text through");
        return text.to_string();
    };

    match translator.translate(source, target, text).await {
        Ok(translated) => translated,
        Err(e) => {
            error!(
                provider = translator.get_provider_info(),
                source, target, "Translation failed: {}", e
            );
            format!("{TRANSLATION_ERROR_PREFIX} {text}")
        }
    }
}
