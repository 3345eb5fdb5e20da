//! Google Cloud Translation API v2 (Basic).

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use super::base::{BaseTranslator, TranslationError, TranslatorConfig};

pub const DEFAULT_GOOGLE_TRANSLATE_URL: &str = "https://translation.googleapis.com";

const TRANSLATE_PATH: &str = "/language/translate/v2";

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    data: Option<TranslateData>,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    #[serde(default)]
    translations: Vec<Translation>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Translation {
    translated_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorResponse {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Translator backed by the Translation v2 REST endpoint.
pub struct GoogleTranslator {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

impl GoogleTranslator {
    pub fn new(client: reqwest::Client, config: TranslatorConfig) -> Result<Self, TranslationError> {
        if config.api_key.is_empty() {
            return Err(TranslationError::MissingApiKey(
                "GOOGLE_CLOUD_API_KEY is required for Google Translate".to_string(),
            ));
        }

        Ok(Self {
            client,
            api_key: config.api_key,
            base_url: config
                .endpoint
                .unwrap_or_else(|| DEFAULT_GOOGLE_TRANSLATE_URL.to_string()),
        })
    }
}

#[async_trait]
impl BaseTranslator for GoogleTranslator {
    async fn translate(
        &self,
        source: &str,
        target: &str,
        text: &str,
    ) -> Result<String, TranslationError> {
        let url = format!("{}{}", self.base_url.trim_end_matches('/'), TRANSLATE_PATH);

        let response = self
            .client
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", text),
                ("source", source),
                ("target", target),
                ("format", "text"),
            ])
            .send()
            .await
            .map_err(|e| TranslationError::NetworkError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorResponse>()
                .await
                .ok()
                .and_then(|body| body.error)
                .and_then(|error| error.message)
                .unwrap_or_else(|| "Unknown error".to_string());
            return Err(TranslationError::ApiError {
                status: status.as_u16(),
                message,
            });
        }

        let body: TranslateResponse = response
            .json()
            .await
            .map_err(|e| TranslationError::InvalidResponse(e.to_string()))?;

        let translated = body
            .data
            .and_then(|data| data.translations.into_iter().next())
            .and_then(|t| t.translated_text)
            .ok_or_else(|| {
                TranslationError::InvalidResponse("missing data.translations[0]".to_string())
            })?;

        debug!(source, target, "Google translation complete");
        Ok(translated)
    }

    fn get_provider_info(&self) -> &'static str {
        "Google Cloud Translation v2"
    }
}
