//! Credential endpoints.
//!
//! `POST /api/scribe-token` mints a single-use Scribe token so the browser
//! can open its own realtime session. `POST /api/test-keys` checks that the
//! configured provider keys actually work.

use axum::{extract::State, response::Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info};

use crate::core::stt::{TokenError, request_single_use_token};
use crate::core::translate::{TRANSLATION_ERROR_PREFIX, translate_or_passthrough};
use crate::errors::{AppError, AppResult};
use crate::state::AppState;

/// Probe text for the translation check
const PROBE_TEXT: &str = "Hello";

#[derive(Debug, Serialize)]
pub struct ScribeTokenResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub struct TestKeysResponse {
    pub success: bool,
    pub elevenlabs: bool,
    /// Name browser clients read for the translation check
    pub gemini: bool,
    pub translation: bool,
}

/// Mint a single-use realtime Scribe token.
pub async fn scribe_token(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<ScribeTokenResponse>> {
    let api_key = state
        .config
        .get_api_key("elevenlabs")
        .map_err(AppError::MissingApiKey)?;

    let token = request_single_use_token(
        &state.http_client,
        &state.config.elevenlabs_api_url,
        &api_key,
    )
    .await
    .map_err(|e| {
        error!(error = %e, "Failed to mint Scribe token");
        AppError::from(e)
    })?;

    info!("Issued single-use Scribe token");
    Ok(Json(ScribeTokenResponse { token }))
}

/// Check the ElevenLabs key by minting a token, then the translation key by
/// translating a probe word.
pub async fn test_keys(State(state): State<Arc<AppState>>) -> AppResult<Json<TestKeysResponse>> {
    let api_key = state
        .config
        .get_api_key("elevenlabs")
        .map_err(AppError::BadRequest)?;

    let token = request_single_use_token(
        &state.http_client,
        &state.config.elevenlabs_api_url,
        &api_key,
    )
    .await
    .map_err(|e| {
        let message = match e {
            TokenError::Api { status, .. } => format!("ElevenLabs test failed: {status}"),
            other => format!("ElevenLabs test failed: {other}"),
        };
        error!(error = %message, "Provider key check failed");
        AppError::BadRequest(message)
    })?;

    let probe = translate_or_passthrough(state.translator.as_deref(), "en", "es", PROBE_TEXT).await;
    let translation = probe != PROBE_TEXT && !probe.starts_with(TRANSLATION_ERROR_PREFIX);

    info!(translation, "Provider key check finished");
    Ok(Json(TestKeysResponse {
        success: true,
        elevenlabs: !token.is_empty(),
        gemini: translation,
        translation,
    }))
}
