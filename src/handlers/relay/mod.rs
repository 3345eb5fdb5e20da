//! Live transcription and translation WebSocket
//!
//! # Protocol
//!
//! ## Client → Server
//!
//! - **config**: `{"type":"config","inputLanguage":"nl","outputLanguage":"en"}`
//! - **start**: `{"type":"start","sampleRate":16000}` opens the upstream stream
//! - **stop**: `{"type":"stop"}` closes it
//! - **translate**: `{"type":"translate","text":"...","isFinal":true}`
//! - **Binary frames**: PCM 16-bit mono audio at the announced sample rate
//!
//! ## Server → Client
//!
//! - **status**: lifecycle messages such as `Translation service ready`
//! - **transcription**: `{"type":"transcription","text":"...","isFinal":false}`
//! - **translation**: `{"type":"translation","text":"...","original":"...","isFinal":true}`
//! - **error**: `{"type":"error","code":"...","message":"..."}`

mod handler;
pub mod messages;

pub use handler::relay_handler;
