//! Configuration types for the ElevenLabs realtime Scribe API.
//!
//! This module contains:
//! - Audio format selection derived from the sample rate
//! - Provider-specific configuration and URL construction

use std::time::Duration;

use url::Url;

use super::super::base::{STTConfig, STTError};

/// Default WebSocket base URL for the realtime Scribe API.
pub const DEFAULT_WS_BASE_URL: &str = "wss://api.elevenlabs.io";

/// Default HTTP base URL for the ElevenLabs REST API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.elevenlabs.io";

/// Default realtime model.
pub const DEFAULT_MODEL_ID: &str = "scribe_v2_realtime";

const REALTIME_PATH: &str = "/v1/speech-to-text/realtime";

/// How long the upstream socket may stay silent before the stream is closed.
pub const MESSAGE_IDLE_TIMEOUT: Duration = Duration::from_secs(60);

/// Transcripts are committed by provider-side voice activity detection.
pub const COMMIT_STRATEGY: &str = "vad";

// =============================================================================
// Audio Format
// =============================================================================

/// Audio formats accepted by the realtime endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ElevenLabsAudioFormat {
    Pcm8000,
    #[default]
    Pcm16000,
    Pcm22050,
    Pcm24000,
    Pcm44100,
    Pcm48000,
}

impl ElevenLabsAudioFormat {
    /// Query parameter value for `audio_format`.
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pcm8000 => "pcm_8000",
            Self::Pcm16000 => "pcm_16000",
            Self::Pcm22050 => "pcm_22050",
            Self::Pcm24000 => "pcm_24000",
            Self::Pcm44100 => "pcm_44100",
            Self::Pcm48000 => "pcm_48000",
        }
    }

    #[inline]
    pub fn sample_rate(&self) -> u32 {
        match self {
            Self::Pcm8000 => 8000,
            Self::Pcm16000 => 16000,
            Self::Pcm22050 => 22050,
            Self::Pcm24000 => 24000,
            Self::Pcm44100 => 44100,
            Self::Pcm48000 => 48000,
        }
    }

    /// Pick the 16-bit PCM format for `sample_rate`.
    pub fn from_sample_rate(sample_rate: u32) -> Result<Self, STTError> {
        match sample_rate {
            8000 => Ok(Self::Pcm8000),
            16000 => Ok(Self::Pcm16000),
            22050 => Ok(Self::Pcm22050),
            24000 => Ok(Self::Pcm24000),
            44100 => Ok(Self::Pcm44100),
            48000 => Ok(Self::Pcm48000),
            other => Err(STTError::ConfigurationError(format!(
                "Unsupported sample rate {other} Hz. Supported: 8000, 16000, 22050, 24000, 44100, 48000"
            ))),
        }
    }
}

// =============================================================================
// Main Configuration
// =============================================================================

/// Configuration for the ElevenLabs realtime Scribe client.
#[derive(Debug, Clone)]
pub struct ElevenLabsSTTConfig {
    /// Base STT configuration shared by all providers.
    pub base: STTConfig,

    /// Audio format announced to the provider.
    pub audio_format: ElevenLabsAudioFormat,

    /// WebSocket base URL (scheme + host, no path).
    pub ws_base_url: String,

    /// Closes the stream when no provider message arrives for this long.
    /// Outgoing audio does not extend it.
    pub idle_timeout: Duration,
}

impl ElevenLabsSTTConfig {
    /// Derive the provider configuration from the shared base config.
    pub fn from_base(base: STTConfig) -> Result<Self, STTError> {
        let audio_format = ElevenLabsAudioFormat::from_sample_rate(base.sample_rate)?;
        let ws_base_url = base
            .endpoint
            .clone()
            .unwrap_or_else(|| DEFAULT_WS_BASE_URL.to_string());

        Ok(Self {
            base,
            audio_format,
            ws_base_url,
            idle_timeout: MESSAGE_IDLE_TIMEOUT,
        })
    }

    /// Model identifier, falling back to the default realtime model.
    pub fn model_id(&self) -> &str {
        if self.base.model.is_empty() {
            DEFAULT_MODEL_ID
        } else {
            &self.base.model
        }
    }

    /// Build the realtime WebSocket URL with query parameters.
    pub fn build_websocket_url(&self) -> Result<String, STTError> {
        let base = self.ws_base_url.trim_end_matches('/');
        let mut url = Url::parse(&format!("{base}{REALTIME_PATH}")).map_err(|e| {
            STTError::ConfigurationError(format!("Invalid ElevenLabs WebSocket URL '{base}': {e}"))
        })?;

        {
            let mut query = url.query_pairs_mut();
            query.append_pair("model_id", self.model_id());
            query.append_pair("audio_format", self.audio_format.as_str());
            query.append_pair("commit_strategy", COMMIT_STRATEGY);
            if !self.base.language.is_empty() {
                query.append_pair("language_code", &self.base.language);
            }
        }

        Ok(url.into())
    }
}
