//! Routing of transcripts to client-facing output.
//!
//! Every transcript, whether it comes from the upstream speech provider or
//! from a client `translate` request, passes through [`TranscriptRouter`].
//! The router decides whether the text is relayed as-is or translated first.

use std::sync::Arc;

use tracing::debug;

use super::translate::{BaseTranslator, translate_or_passthrough};

pub const DEFAULT_INPUT_LANGUAGE: &str = "nl";
pub const DEFAULT_OUTPUT_LANGUAGE: &str = "en";

/// Spoken language and the language shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguagePair {
    pub input: String,
    pub output: String,
}

impl Default for LanguagePair {
    fn default() -> Self {
        Self {
            input: DEFAULT_INPUT_LANGUAGE.to_string(),
            output: DEFAULT_OUTPUT_LANGUAGE.to_string(),
        }
    }
}

impl LanguagePair {
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
        }
    }

    /// Build a pair from optional client values, using `defaults` for
    /// missing or blank entries.
    pub fn from_request(input: Option<&str>, output: Option<&str>, defaults: &LanguagePair) -> Self {
        let pick = |value: Option<&str>, fallback: &str| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .unwrap_or(fallback)
                .to_string()
        };

        Self {
            input: pick(input, &defaults.input),
            output: pick(output, &defaults.output),
        }
    }

    #[inline]
    pub fn needs_translation(&self) -> bool {
        !self.input.eq_ignore_ascii_case(&self.output)
    }
}

/// What the router decided to send to the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutput {
    Transcription {
        text: String,
        is_final: bool,
    },
    Translation {
        text: String,
        original: String,
        is_final: bool,
    },
}

/// Decides between relaying and translating each transcript.
#[derive(Clone)]
pub struct TranscriptRouter {
    translator: Option<Arc<dyn BaseTranslator>>,
    translate_interim: bool,
}

impl TranscriptRouter {
    pub fn new(translator: Option<Arc<dyn BaseTranslator>>, translate_interim: bool) -> Self {
        Self {
            translator,
            translate_interim,
        }
    }

    /// Route one transcript.
    ///
    /// Same-language text is relayed untouched. Otherwise final text is
    /// translated, and interim text only when interim translation is on.
    pub async fn route(&self, languages: &LanguagePair, text: &str, is_final: bool) -> RelayOutput {
        if !languages.needs_translation() || !(is_final || self.translate_interim) {
            return RelayOutput::Transcription {
                text: text.to_string(),
                is_final,
            };
        }

        let translated = translate_or_passthrough(
            self.translator.as_deref(),
            &languages.input,
            &languages.output,
            text,
        )
        .await;

        debug!(
            input = %languages.input,
            output = %languages.output,
            is_final,
            "Routed transcript through translation"
        );

        RelayOutput::Translation {
            text: translated,
            original: text.to_string(),
            is_final,
        }
    }
}

impl std::fmt::Debug for TranscriptRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TranscriptRouter")
            .field(
                "translator",
                &self.translator.as_ref().map(|t| t.get_provider_info()),
            )
            .field("translate_interim", &self.translate_interim)
            .finish()
    }
}
