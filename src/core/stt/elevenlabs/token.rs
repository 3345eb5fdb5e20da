//! Single-use token minting for browser-side Scribe sessions.

use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

const TOKEN_PATH: &str = "/v1/single-use-token/realtime_scribe";

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("Failed to reach ElevenLabs: {0}")]
    Request(String),

    #[error("ElevenLabs API error: {status} - {message}")]
    Api { status: u16, message: String },

    #[error("Invalid token response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    token: String,
}

/// Extract a readable message from an ElevenLabs error body.
///
/// Accepts `{"error": "..."}`, `{"detail": {"message": "..."}}` and
/// `{"detail": "..."}`.
fn error_message(body: &str) -> String {
    let Ok(value) = serde_json::from_str::<serde_json::Value>(body) else {
        return "Unknown error".to_string();
    };

    value
        .get("error")
        .and_then(|v| v.as_str())
        .or_else(|| {
            value.get("detail").and_then(|detail| {
                detail
                    .get("message")
                    .and_then(|m| m.as_str())
                    .or_else(|| detail.as_str())
            })
        })
        .unwrap_or("Unknown error")
        .to_string()
}

/// Request a single-use realtime Scribe token.
///
/// `api_base_url` is the REST base (scheme + host), e.g.
/// `https://api.elevenlabs.io`.
pub async fn request_single_use_token(
    client: &reqwest::Client,
    api_base_url: &str,
    api_key: &str,
) -> Result<String, TokenError> {
    let url = format!("{}{}", api_base_url.trim_end_matches('/'), TOKEN_PATH);

    let response = client
        .post(&url)
        .header("xi-api-key", api_key)
        .header("Content-Type", "application/json")
        .send()
        .await
        .map_err(|e| TokenError::Request(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TokenError::Api {
            status: status.as_u16(),
            message: error_message(&body),
        });
    }

    let parsed: TokenResponse = response
        .json()
        .await
        .map_err(|e| TokenError::InvalidResponse(e.to_string()))?;

    debug!("Minted single-use Scribe token");
    Ok(parsed.token)
}
