//! HTTP and WebSocket request handlers
//!
//! - `api` - Health check and favicon
//! - `token` - Single-use Scribe tokens and provider key checks
//! - `relay` - Live transcription and translation WebSocket

pub mod api;
pub mod relay;
pub mod token;

pub use relay::relay_handler;
