//! ElevenLabs realtime Scribe speech-to-text integration.
//!
//! - [`config`]: audio format, commit strategy and URL construction
//! - [`messages`]: WebSocket message types
//! - [`client`]: the streaming [`ElevenLabsSTT`] client
//! - [`token`]: single-use tokens for browser-side sessions
//!
//! # Example
//!
//! ```rust,no_run
//! use translate_gateway::core::stt::{BaseSTT, ElevenLabsSTT, STTConfig};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = STTConfig {
//!         api_key: "your-elevenlabs-api-key".to_string(),
//!         language: "nl".to_string(),
//!         ..Default::default()
//!     };
//!
//!     let mut stt = ElevenLabsSTT::new(config)?;
//!     stt.on_result(Arc::new(|result| {
//!         Box::pin(async move {
//!             println!("{} (final: {})", result.transcript, result.is_final);
//!         })
//!     }))
//!     .await?;
//!     stt.connect().await?;
//!
//!     // 16-bit little-endian PCM at 16 kHz
//!     stt.send_audio(vec![0u8; 3200].into()).await?;
//!     stt.disconnect().await?;
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod messages;
mod token;

pub use client::{ElevenLabsSTT, MAX_AUDIO_CHUNK_SIZE};
pub use config::{
    COMMIT_STRATEGY, DEFAULT_API_BASE_URL, DEFAULT_MODEL_ID, DEFAULT_WS_BASE_URL,
    ElevenLabsAudioFormat, ElevenLabsSTTConfig,
};
pub use messages::{ElevenLabsErrorKind, ElevenLabsMessage, InputAudioChunk};
pub use token::{TokenError, request_single_use_token};
