//! Base traits and types for streaming speech-to-text providers.
//!
//! Every upstream transcription provider implements [`BaseSTT`]. The relay
//! handler only talks to this trait, so a connection holds a
//! `Box<dyn BaseSTT>` regardless of which provider is configured.

use async_trait::async_trait;
use bytes::Bytes;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised by speech-to-text providers.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum STTError {
    /// Connection to the provider failed
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Authentication with the provider failed
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    ConfigurationError(String),

    /// Network error while streaming
    #[error("Network error: {0}")]
    NetworkError(String),

    /// Audio chunk rejected before it reached the provider
    #[error("Invalid audio format: {0}")]
    InvalidAudioFormat(String),

    /// Error reported by the provider itself
    #[error("Provider error: {0}")]
    ProviderError(String),
}

/// A single transcription result delivered by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct STTResult {
    /// Transcribed text
    pub transcript: String,
    /// Whether the provider will not revise this text any more
    pub is_final: bool,
    /// Whether the result closes an utterance
    pub is_speech_final: bool,
    /// Confidence score (0.0 to 1.0)
    pub confidence: f32,
}

impl STTResult {
    pub fn new(
        transcript: impl Into<String>,
        is_final: bool,
        is_speech_final: bool,
        confidence: f32,
    ) -> Self {
        Self {
            transcript: transcript.into(),
            is_final,
            is_speech_final,
            confidence,
        }
    }
}

/// Provider-agnostic stream configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct STTConfig {
    /// Provider name (e.g. "elevenlabs")
    pub provider: String,
    /// API key used to authenticate the upstream stream
    pub api_key: String,
    /// Spoken language code; empty means provider auto-detection
    pub language: String,
    /// Sample rate of the incoming PCM audio
    pub sample_rate: u32,
    /// Provider model identifier
    pub model: String,
    /// Override for the provider's streaming endpoint base URL
    pub endpoint: Option<String>,
}

impl Default for STTConfig {
    fn default() -> Self {
        Self {
            provider: "elevenlabs".to_string(),
            api_key: String::new(),
            language: String::new(),
            sample_rate: 16000,
            model: String::new(),
            endpoint: None,
        }
    }
}

/// Callback invoked for every transcription result.
pub type STTResultCallback =
    Arc<dyn Fn(STTResult) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Callback invoked when the upstream stream fails.
pub type STTErrorCallback =
    Arc<dyn Fn(STTError) -> Pin<Box<dyn Future<Output = ()> + Send>> + Send + Sync>;

/// Streaming speech-to-text provider.
///
/// Implementations own their upstream connection. Results are delivered
/// through the registered callbacks one at a time, in provider order: the
/// next callback invocation starts only after the previous one completed.
#[async_trait]
pub trait BaseSTT: Send + Sync {
    /// Create a provider from configuration without connecting.
    fn new(config: STTConfig) -> Result<Self, STTError>
    where
        Self: Sized;

    /// Open the upstream stream and wait until it accepts audio.
    async fn connect(&mut self) -> Result<(), STTError>;

    /// Close the upstream stream and release its tasks.
    async fn disconnect(&mut self) -> Result<(), STTError>;

    /// Whether audio can be sent right now.
    fn is_ready(&self) -> bool;

    /// Forward a chunk of raw audio bytes.
    async fn send_audio(&mut self, audio_data: Bytes) -> Result<(), STTError>;

    /// Register the result callback.
    async fn on_result(&mut self, callback: STTResultCallback) -> Result<(), STTError>;

    /// Register the error callback.
    async fn on_error(&mut self, callback: STTErrorCallback) -> Result<(), STTError>;

    fn get_config(&self) -> Option<&STTConfig>;

    fn get_provider_info(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stt_result_new() {
        let result = STTResult::new("hallo", true, false, 0.9);
        assert_eq!(result.transcript, "hallo");
        assert!(result.is_final);
        assert!(!result.is_speech_final);
    }

    #[test]
    fn test_default_config() {
        let config = STTConfig::default();
        assert_eq!(config.provider, "elevenlabs");
        assert_eq!(config.sample_rate, 16000);
        assert!(config.api_key.is_empty());
        assert!(config.endpoint.is_none());
    }

    #[test]
    fn test_error_display() {
        let err = STTError::AuthenticationFailed("bad key".to_string());
        assert_eq!(err.to_string(), "Authentication failed: bad key");
    }
}
