//! Relay WebSocket message types
//!
//! Text frames carry JSON control messages tagged by `type`. Binary frames
//! carry raw PCM audio and have no message type.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::is_valid_language_code;
use crate::core::relay::RelayOutput;

/// Maximum allowed size for client-submitted transcript text (50 KB)
pub const MAX_TEXT_SIZE: usize = 50 * 1024;

// =============================================================================
// Incoming Messages (Client -> Server)
// =============================================================================

#[derive(Debug, Deserialize, Serialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayIncomingMessage {
    /// Set the spoken and displayed languages
    Config {
        #[serde(rename = "inputLanguage", default)]
        input_language: Option<String>,
        #[serde(rename = "outputLanguage", default)]
        output_language: Option<String>,
    },

    /// Open the upstream transcription stream
    Start {
        #[serde(rename = "sampleRate", default)]
        sample_rate: Option<u32>,
    },

    /// Close the upstream transcription stream
    Stop,

    /// Transcript produced on the client side
    Translate {
        text: String,
        #[serde(rename = "isFinal", default)]
        is_final: bool,
    },
}

// =============================================================================
// Outgoing Messages (Server -> Client)
// =============================================================================

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelayOutgoingMessage {
    Status {
        message: String,
    },

    Transcription {
        text: String,
        #[serde(rename = "isFinal")]
        is_final: bool,
    },

    Translation {
        text: String,
        original: String,
        #[serde(rename = "isFinal")]
        is_final: bool,
    },

    Error {
        #[serde(skip_serializing_if = "Option::is_none", default)]
        code: Option<String>,
        message: String,
    },
}

impl RelayOutgoingMessage {
    pub fn status(message: impl Into<String>) -> Self {
        Self::Status {
            message: message.into(),
        }
    }

    pub fn error(code: &str, message: impl Into<String>) -> Self {
        Self::Error {
            code: Some(code.to_string()),
            message: message.into(),
        }
    }
}

impl From<RelayOutput> for RelayOutgoingMessage {
    fn from(output: RelayOutput) -> Self {
        match output {
            RelayOutput::Transcription { text, is_final } => Self::Transcription { text, is_final },
            RelayOutput::Translation {
                text,
                original,
                is_final,
            } => Self::Translation {
                text,
                original,
                is_final,
            },
        }
    }
}

/// Message routing for the sender task
#[derive(Debug)]
pub enum RelayMessageRoute {
    Outgoing(RelayOutgoingMessage),
    Close,
}

// =============================================================================
// Validation
// =============================================================================

#[derive(Debug, Clone, Error, PartialEq)]
pub enum RelayValidationError {
    #[error("Invalid language code: '{0}'")]
    InvalidLanguage(String),

    #[error("Text too large: {size} bytes (max: {max} bytes)")]
    TextTooLarge { size: usize, max: usize },

    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),
}

impl RelayIncomingMessage {
    /// Reject malformed language codes and oversized text before handling.
    ///
    /// Blank language values are accepted; they fall back to the defaults.
    pub fn validate(&self) -> Result<(), RelayValidationError> {
        match self {
            RelayIncomingMessage::Config {
                input_language,
                output_language,
            } => {
                for code in [input_language, output_language].into_iter().flatten() {
                    let code = code.trim();
                    if !code.is_empty() && !is_valid_language_code(code) {
                        return Err(RelayValidationError::InvalidLanguage(code.to_string()));
                    }
                }
            }
            RelayIncomingMessage::Start {
                sample_rate: Some(0),
            } => return Err(RelayValidationError::InvalidSampleRate(0)),
            RelayIncomingMessage::Translate { text, .. } => {
                if text.len() > MAX_TEXT_SIZE {
                    return Err(RelayValidationError::TextTooLarge {
                        size: text.len(),
                        max: MAX_TEXT_SIZE,
                    });
                }
            }
            RelayIncomingMessage::Start { .. } | RelayIncomingMessage::Stop => {}
        }
        Ok(())
    }
}
