//! WebSocket message types for the ElevenLabs realtime Scribe API.
//!
//! - **Incoming**: `session_started`, `partial_transcript`,
//!   `committed_transcript` (and its timestamped variant), plus a family of
//!   error messages that all carry an `error` field.
//! - **Outgoing**: [`InputAudioChunk`], the only message the client sends.
//!   Audio travels base64-encoded inside it.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use serde::{Deserialize, Serialize};

// =============================================================================
// Incoming Messages (Server to Client)
// =============================================================================

/// Sent once the provider accepted the session.
#[derive(Debug, Clone, Deserialize)]
pub struct SessionStartedMessage {
    pub session_id: String,
    #[serde(default)]
    pub config: Option<serde_json::Value>,
}

/// Interim or committed transcript text.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptMessage {
    #[serde(default)]
    pub text: String,
    /// Detected language, only present on some committed transcripts
    #[serde(default)]
    pub language_code: Option<String>,
}

/// Any of the provider's error messages.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorMessage {
    #[serde(default)]
    pub error: String,
}

/// Error categories reported through `message_type`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElevenLabsErrorKind {
    Auth,
    Quota,
    RateLimited,
    Input,
    Other,
}

/// All messages the realtime endpoint can send.
#[derive(Debug)]
pub enum ElevenLabsMessage {
    SessionStarted(SessionStartedMessage),
    PartialTranscript(TranscriptMessage),
    CommittedTranscript(TranscriptMessage),
    /// Timestamped duplicate of a committed transcript
    CommittedTranscriptWithTimestamps(TranscriptMessage),
    Error {
        kind: ElevenLabsErrorKind,
        message_type: String,
        message: ErrorMessage,
    },
    /// Unknown message type (for forward compatibility)
    Unknown(String),
}

impl ElevenLabsMessage {
    /// Parse a WebSocket text frame.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        #[derive(Deserialize)]
        struct TypePeek {
            message_type: String,
        }

        let peek: TypePeek = serde_json::from_str(text)?;

        let kind = match peek.message_type.as_str() {
            "session_started" => return Ok(Self::SessionStarted(serde_json::from_str(text)?)),
            "partial_transcript" => {
                return Ok(Self::PartialTranscript(serde_json::from_str(text)?));
            }
            "committed_transcript" => {
                return Ok(Self::CommittedTranscript(serde_json::from_str(text)?));
            }
            "committed_transcript_with_timestamps" => {
                return Ok(Self::CommittedTranscriptWithTimestamps(
                    serde_json::from_str(text)?,
                ));
            }
            "auth_error" | "unaccepted_terms" => ElevenLabsErrorKind::Auth,
            "quota_exceeded" | "resource_exhausted" | "session_time_limit_exceeded" => {
                ElevenLabsErrorKind::Quota
            }
            "rate_limited" | "commit_throttled" => ElevenLabsErrorKind::RateLimited,
            "input_error" | "chunk_size_exceeded" | "insufficient_audio_activity" => {
                ElevenLabsErrorKind::Input
            }
            "error" | "transcriber_error" => ElevenLabsErrorKind::Other,
            _ => return Ok(Self::Unknown(text.to_string())),
        };

        Ok(Self::Error {
            kind,
            message: serde_json::from_str(text)?,
            message_type: peek.message_type,
        })
    }
}

// =============================================================================
// Outgoing Messages (Client to Server)
// =============================================================================

/// Audio chunk sent to the provider.
#[derive(Debug, Clone, Serialize)]
pub struct InputAudioChunk {
    pub message_type: &'static str,
    pub audio_base_64: String,
    /// Ask the provider to commit everything received so far
    pub commit: bool,
    pub sample_rate: u32,
}

impl InputAudioChunk {
    pub fn new(audio: &[u8], sample_rate: u32) -> Self {
        Self {
            message_type: "input_audio_chunk",
            audio_base_64: BASE64.encode(audio),
            commit: false,
            sample_rate,
        }
    }

    /// Empty chunk that flushes pending audio into a committed transcript.
    pub fn commit(sample_rate: u32) -> Self {
        Self {
            message_type: "input_audio_chunk",
            audio_base_64: String::new(),
            commit: true,
            sample_rate,
        }
    }
}
