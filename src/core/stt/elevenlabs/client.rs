//! ElevenLabs realtime Scribe WebSocket client.
//!
//! Implements [`BaseSTT`] on top of the `/v1/speech-to-text/realtime`
//! endpoint. Audio is base64-encoded into `input_audio_chunk` messages and
//! the provider's voice activity detection decides when a transcript is
//! committed.

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock, mpsc, oneshot};
use tokio::time::{Instant, sleep, timeout};
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::protocol::Message;
use tracing::{debug, error, info, warn};

use super::config::ElevenLabsSTTConfig;
use super::messages::{ElevenLabsErrorKind, ElevenLabsMessage, InputAudioChunk};
use crate::core::stt::base::{
    BaseSTT, STTConfig, STTError, STTErrorCallback, STTResult, STTResultCallback,
};

// =============================================================================
// Constants
// =============================================================================

/// Maximum audio chunk size in bytes accepted by [`ElevenLabsSTT::send_audio`].
pub const MAX_AUDIO_CHUNK_SIZE: usize = 256 * 1024;

/// How long `connect` waits for `session_started`.
const SESSION_START_TIMEOUT: Duration = Duration::from_secs(10);

const API_KEY_HEADER: &str = "xi-api-key";

// =============================================================================
// Connection State
// =============================================================================

#[derive(Debug, Clone, PartialEq)]
pub(crate) enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Error(String),
}

// =============================================================================
// ElevenLabsSTT Client
// =============================================================================

/// Streaming client for the ElevenLabs realtime Scribe API.
///
/// Three tasks cooperate per connection:
///
/// ```text
/// send_audio() ──▶ audio mpsc ──▶ connection task ──▶ result mpsc ──▶ result task ──▶ callback
///                                        │
///                                        └──────────▶ error mpsc ──▶ error task ──▶ callback
/// ```
///
/// The result task awaits each callback before taking the next result, so
/// transcripts reach the caller in the order the provider produced them.
pub struct ElevenLabsSTT {
    pub(crate) config: Option<ElevenLabsSTTConfig>,

    pub(crate) state: ConnectionState,

    /// Audio queue towards the connection task
    ws_sender: Option<mpsc::Sender<Bytes>>,

    shutdown_tx: Option<oneshot::Sender<()>>,

    connection_handle: Option<tokio::task::JoinHandle<()>>,
    result_forward_handle: Option<tokio::task::JoinHandle<()>>,
    error_forward_handle: Option<tokio::task::JoinHandle<()>>,

    result_callback: Arc<Mutex<Option<STTResultCallback>>>,
    error_callback: Arc<Mutex<Option<STTErrorCallback>>>,

    /// Session ID assigned by the provider
    session_id: Arc<RwLock<Option<String>>>,

    is_connected: Arc<AtomicBool>,
}

impl ElevenLabsSTT {
    /// Handle one message from the provider.
    ///
    /// # Returns
    /// * `Ok(true)` - keep reading
    /// * `Ok(false)` - the provider closed the session
    /// * `Err(STTError)` - fatal error, close the connection
    pub(crate) async fn handle_websocket_message(
        message: Message,
        result_tx: &mpsc::Sender<STTResult>,
        error_tx: &mpsc::Sender<STTError>,
        session_id: &Arc<RwLock<Option<String>>>,
    ) -> Result<bool, STTError> {
        match message {
            Message::Text(text) => {
                debug!("Received ElevenLabs message: {}", text);

                match ElevenLabsMessage::parse(&text) {
                    Ok(ElevenLabsMessage::SessionStarted(started)) => {
                        info!("ElevenLabs STT session started: {}", started.session_id);
                        *session_id.write().await = Some(started.session_id);
                    }

                    Ok(ElevenLabsMessage::PartialTranscript(partial)) => {
                        let result = STTResult::new(partial.text, false, false, 1.0);
                        if result_tx.send(result).await.is_err() {
                            warn!("Failed to send partial transcript - channel closed");
                        }
                    }

                    Ok(ElevenLabsMessage::CommittedTranscript(committed)) => {
                        if let Some(lang) = &committed.language_code {
                            debug!("Detected language: {}", lang);
                        }
                        let result = STTResult::new(committed.text, true, true, 1.0);
                        if result_tx.send(result).await.is_err() {
                            warn!("Failed to send committed transcript - channel closed");
                        }
                    }

                    Ok(ElevenLabsMessage::CommittedTranscriptWithTimestamps(_)) => {
                        // Same text as the preceding committed_transcript.
                        debug!("Ignoring timestamped committed transcript");
                    }

                    Ok(ElevenLabsMessage::Error {
                        kind,
                        message_type,
                        message,
                    }) => {
                        error!("ElevenLabs STT error ({}): {}", message_type, message.error);

                        match kind {
                            ElevenLabsErrorKind::Auth => {
                                return Err(STTError::AuthenticationFailed(message.error));
                            }
                            ElevenLabsErrorKind::Quota => {
                                return Err(STTError::ProviderError(format!(
                                    "Quota exceeded: {}",
                                    message.error
                                )));
                            }
                            ElevenLabsErrorKind::Other => {
                                return Err(STTError::ProviderError(message.error));
                            }
                            // The session stays usable after these.
                            ElevenLabsErrorKind::RateLimited => {
                                let _ = error_tx.try_send(STTError::ProviderError(format!(
                                    "Rate limited: {}",
                                    message.error
                                )));
                            }
                            ElevenLabsErrorKind::Input => {
                                let _ =
                                    error_tx.try_send(STTError::InvalidAudioFormat(message.error));
                            }
                        }
                    }

                    Ok(ElevenLabsMessage::Unknown(raw)) => {
                        debug!("Received unknown ElevenLabs message type: {}", raw);
                    }

                    Err(e) => {
                        warn!("Failed to parse ElevenLabs message: {}", e);
                    }
                }
            }

            Message::Close(close_frame) => {
                info!("ElevenLabs WebSocket closed: {:?}", close_frame);
                return Ok(false);
            }

            Message::Binary(_) => {
                debug!("Received unexpected binary message from ElevenLabs");
            }

            _ => {}
        }

        Ok(true)
    }

    /// Spawn the connection and forwarding tasks and wait for `session_started`.
    async fn start_connection(&mut self, config: ElevenLabsSTTConfig) -> Result<(), STTError> {
        let ws_url = config.build_websocket_url()?;

        let mut request = ws_url.as_str().into_client_request().map_err(|e| {
            STTError::ConnectionFailed(format!("Failed to create WebSocket request: {e}"))
        })?;
        let api_key = HeaderValue::from_str(&config.base.api_key).map_err(|_| {
            STTError::AuthenticationFailed("API key contains invalid characters".to_string())
        })?;
        request.headers_mut().insert(API_KEY_HEADER, api_key);

        let (ws_tx, mut ws_rx) = mpsc::channel::<Bytes>(32);
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let (result_tx, mut result_rx) = mpsc::channel::<STTResult>(256);
        let (error_tx, mut error_rx) = mpsc::channel::<STTError>(64);
        let (connected_tx, connected_rx) = oneshot::channel::<Result<(), STTError>>();

        self.ws_sender = Some(ws_tx);
        self.shutdown_tx = Some(shutdown_tx);

        let sample_rate = config.audio_format.sample_rate();
        let idle_timeout = config.idle_timeout;
        let session_id = self.session_id.clone();
        let is_connected = self.is_connected.clone();

        let connection_handle = tokio::spawn(async move {
            let mut connected_tx = Some(connected_tx);

            let (ws_stream, _response) = match connect_async(request).await {
                Ok(result) => result,
                Err(e) => {
                    let stt_error =
                        STTError::ConnectionFailed(format!("Failed to connect to ElevenLabs: {e}"));
                    error!("{}", stt_error);
                    if let Some(tx) = connected_tx.take() {
                        let _ = tx.send(Err(stt_error));
                    }
                    return;
                }
            };

            info!("Connected to ElevenLabs STT WebSocket");

            let (mut ws_sink, mut ws_stream) = ws_stream.split();

            // Reports a fatal error to whoever is waiting: `connect` while the
            // session is starting, the error callback afterwards.
            let report = |connected_tx: &mut Option<oneshot::Sender<Result<(), STTError>>>,
                          err: STTError| {
                match connected_tx.take() {
                    Some(tx) => {
                        let _ = tx.send(Err(err));
                    }
                    None => {
                        let _ = error_tx.try_send(err);
                    }
                }
            };

            // Only provider messages move the deadline.
            let idle = sleep(idle_timeout);
            tokio::pin!(idle);

            loop {
                tokio::select! {
                    Some(audio_data) = ws_rx.recv() => {
                        let data_len = audio_data.len();
                        let chunk = InputAudioChunk::new(&audio_data, sample_rate);
                        let json = match serde_json::to_string(&chunk) {
                            Ok(json) => json,
                            Err(e) => {
                                warn!("Failed to serialize audio chunk: {}", e);
                                continue;
                            }
                        };

                        if let Err(e) = ws_sink.send(Message::Text(json.into())).await {
                            report(&mut connected_tx, STTError::NetworkError(format!(
                                "Failed to send audio to ElevenLabs: {e}"
                            )));
                            break;
                        }

                        debug!("Sent {} bytes of audio to ElevenLabs", data_len);
                    }

                    message = ws_stream.next() => {
                        idle.as_mut().reset(Instant::now() + idle_timeout);
                        match message {
                            Some(Ok(msg)) => {
                                match Self::handle_websocket_message(
                                    msg,
                                    &result_tx,
                                    &error_tx,
                                    &session_id,
                                ).await {
                                    Ok(true) => {
                                        if session_id.read().await.is_some()
                                            && let Some(tx) = connected_tx.take()
                                        {
                                            is_connected.store(true, Ordering::Release);
                                            let _ = tx.send(Ok(()));
                                        }
                                    }
                                    Ok(false) => {
                                        info!("ElevenLabs session closed by provider");
                                        break;
                                    }
                                    Err(e) => {
                                        report(&mut connected_tx, e);
                                        break;
                                    }
                                }
                            }
                            Some(Err(e)) => {
                                report(&mut connected_tx, STTError::NetworkError(format!(
                                    "WebSocket error: {e}"
                                )));
                                break;
                            }
                            None => {
                                info!("ElevenLabs WebSocket stream ended");
                                break;
                            }
                        }
                    }

                    _ = &mut idle => {
                        report(&mut connected_tx, STTError::NetworkError(format!(
                            "WebSocket idle timeout: no message for {}s",
                            idle_timeout.as_secs()
                        )));
                        break;
                    }

                    _ = &mut shutdown_rx => {
                        info!("Received shutdown signal for ElevenLabs STT");

                        // Flush whatever the provider still buffers.
                        if let Ok(json) = serde_json::to_string(&InputAudioChunk::commit(sample_rate)) {
                            let _ = ws_sink.send(Message::Text(json.into())).await;
                        }
                        let _ = ws_sink.send(Message::Close(None)).await;
                        break;
                    }
                }
            }

            is_connected.store(false, Ordering::Release);
            info!("ElevenLabs STT WebSocket connection closed");
        });

        self.connection_handle = Some(connection_handle);

        let callback_ref = self.result_callback.clone();
        self.result_forward_handle = Some(tokio::spawn(async move {
            while let Some(result) = result_rx.recv().await {
                let callback = callback_ref.lock().await.clone();
                match callback {
                    Some(callback) => callback(result).await,
                    None => debug!(
                        "ElevenLabs STT result (no callback): {} (final: {})",
                        result.transcript, result.is_final
                    ),
                }
            }
        }));

        let error_callback_ref = self.error_callback.clone();
        self.error_forward_handle = Some(tokio::spawn(async move {
            while let Some(error) = error_rx.recv().await {
                let callback = error_callback_ref.lock().await.clone();
                match callback {
                    Some(callback) => callback(error).await,
                    None => error!("ElevenLabs STT error (no callback registered): {}", error),
                }
            }
        }));

        self.state = ConnectionState::Connecting;

        let outcome = match timeout(SESSION_START_TIMEOUT, connected_rx).await {
            Ok(Ok(Ok(()))) => Ok(()),
            Ok(Ok(Err(e))) => Err(e),
            Ok(Err(_)) => Err(STTError::ConnectionFailed(
                "Connection closed before session started".to_string(),
            )),
            Err(_) => Err(STTError::ConnectionFailed(
                "Connection timeout waiting for session_started".to_string(),
            )),
        };

        match outcome {
            Ok(()) => {
                self.state = ConnectionState::Connected;
                info!("Successfully connected to ElevenLabs STT");
                Ok(())
            }
            Err(e) => {
                self.stop_tasks().await;
                self.state = ConnectionState::Error(e.to_string());
                Err(e)
            }
        }
    }

    /// Signal shutdown and wait for the tasks to finish.
    async fn stop_tasks(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }

        if let Some(handle) = self.connection_handle.take() {
            let _ = timeout(Duration::from_secs(5), handle).await;
        }

        // The connection task owned the result and error senders, so the
        // forwarding tasks drain what is left and finish on their own.
        if let Some(mut handle) = self.result_forward_handle.take()
            && timeout(Duration::from_secs(2), &mut handle).await.is_err()
        {
            debug!("Result forwarding task did not finish in time");
            handle.abort();
        }

        if let Some(handle) = self.error_forward_handle.take() {
            handle.abort();
            let _ = handle.await;
        }

        self.ws_sender = None;
        self.is_connected.store(false, Ordering::Release);
    }

    /// Session ID assigned by ElevenLabs, once connected.
    pub async fn get_session_id(&self) -> Option<String> {
        self.session_id.read().await.clone()
    }
}

impl Drop for ElevenLabsSTT {
    fn drop(&mut self) {
        if let Some(shutdown_tx) = self.shutdown_tx.take() {
            let _ = shutdown_tx.send(());
        }
    }
}

// =============================================================================
// BaseSTT Trait Implementation
// =============================================================================

#[async_trait::async_trait]
impl BaseSTT for ElevenLabsSTT {
    fn new(config: STTConfig) -> Result<Self, STTError> {
        if config.api_key.is_empty() {
            return Err(STTError::AuthenticationFailed(
                "API key is required for ElevenLabs STT".to_string(),
            ));
        }

        let elevenlabs_config = ElevenLabsSTTConfig::from_base(config)?;

        Ok(Self {
            config: Some(elevenlabs_config),
            state: ConnectionState::Disconnected,
            ws_sender: None,
            shutdown_tx: None,
            connection_handle: None,
            result_forward_handle: None,
            error_forward_handle: None,
            result_callback: Arc::new(Mutex::new(None)),
            error_callback: Arc::new(Mutex::new(None)),
            session_id: Arc::new(RwLock::new(None)),
            is_connected: Arc::new(AtomicBool::new(false)),
        })
    }

    async fn connect(&mut self) -> Result<(), STTError> {
        let config = self.config.clone().ok_or_else(|| {
            STTError::ConfigurationError("No configuration available".to_string())
        })?;

        self.start_connection(config).await
    }

    async fn disconnect(&mut self) -> Result<(), STTError> {
        self.stop_tasks().await;

        *self.result_callback.lock().await = None;
        *self.error_callback.lock().await = None;
        *self.session_id.write().await = None;

        self.state = ConnectionState::Disconnected;
        info!("Disconnected from ElevenLabs STT");
        Ok(())
    }

    fn is_ready(&self) -> bool {
        self.is_connected.load(Ordering::Acquire) && self.ws_sender.is_some()
    }

    async fn send_audio(&mut self, audio_data: Bytes) -> Result<(), STTError> {
        if !self.is_ready() {
            return Err(STTError::ConnectionFailed(
                "Not connected to ElevenLabs STT".to_string(),
            ));
        }

        let data_len = audio_data.len();
        if data_len > MAX_AUDIO_CHUNK_SIZE {
            return Err(STTError::InvalidAudioFormat(format!(
                "Audio chunk size {data_len} bytes exceeds maximum {MAX_AUDIO_CHUNK_SIZE} bytes"
            )));
        }

        if let Some(ws_sender) = &self.ws_sender {
            ws_sender
                .send(audio_data)
                .await
                .map_err(|e| STTError::NetworkError(format!("Failed to send audio data: {e}")))?;
        }

        Ok(())
    }

    async fn on_result(&mut self, callback: STTResultCallback) -> Result<(), STTError> {
        *self.result_callback.lock().await = Some(callback);
        Ok(())
    }

    async fn on_error(&mut self, callback: STTErrorCallback) -> Result<(), STTError> {
        *self.error_callback.lock().await = Some(callback);
        Ok(())
    }

    fn get_config(&self) -> Option<&STTConfig> {
        self.config.as_ref().map(|c| &c.base)
    }

    fn get_provider_info(&self) -> &'static str {
        "ElevenLabs Scribe Realtime STT"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;
    use tokio_tungstenite::accept_hdr_async;
    use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

    fn test_config() -> STTConfig {
        STTConfig {
            api_key: "test_key".to_string(),
            language: "nl".to_string(),
            ..Default::default()
        }
    }

    fn channels() -> (
        mpsc::Sender<STTResult>,
        mpsc::Receiver<STTResult>,
        mpsc::Sender<STTError>,
        mpsc::Receiver<STTError>,
        Arc<RwLock<Option<String>>>,
    ) {
        let (result_tx, result_rx) = mpsc::channel(16);
        let (error_tx, error_rx) = mpsc::channel(16);
        (
            result_tx,
            result_rx,
            error_tx,
            error_rx,
            Arc::new(RwLock::new(None)),
        )
    }

    /// Minimal Scribe endpoint: checks the API key, starts a session and
    /// answers each audio chunk with a partial, then a committed transcript.
    async fn spawn_mock_scribe() -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (seen_tx, seen_rx) = mpsc::channel::<String>(32);

        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let ws = accept_hdr_async(stream, |req: &Request, resp: Response| {
                assert_eq!(
                    req.headers().get("xi-api-key").unwrap().to_str().unwrap(),
                    "test_key"
                );
                assert!(req.uri().query().unwrap().contains("language_code=nl"));
                Ok::<_, ErrorResponse>(resp)
            })
            .await
            .unwrap();
            let (mut sink, mut stream) = ws.split();

            sink.send(Message::Text(
                r#"{"message_type":"session_started","session_id":"sess-42"}"#.into(),
            ))
            .await
            .unwrap();

            let mut chunks = 0;
            while let Some(Ok(msg)) = stream.next().await {
                if let Message::Text(text) = msg {
                    let _ = seen_tx.send(text.to_string()).await;
                    chunks += 1;
                    let reply = if chunks == 1 {
                        r#"{"message_type":"partial_transcript","text":"hallo"}"#
                    } else {
                        r#"{"message_type":"committed_transcript","text":"hallo wereld"}"#
                    };
                    if sink.send(Message::Text(reply.into())).await.is_err() {
                        break;
                    }
                }
            }
        });

        (format!("ws://{addr}"), seen_rx)
    }

    #[test]
    fn test_new_with_valid_config() {
        let stt = ElevenLabsSTT::new(test_config()).unwrap();
        assert!(!stt.is_ready());
        assert_eq!(stt.state, ConnectionState::Disconnected);
        assert_eq!(stt.get_config().unwrap().language, "nl");
        assert_eq!(stt.get_provider_info(), "ElevenLabs Scribe Realtime STT");
    }

    #[test]
    fn test_new_with_empty_api_key() {
        let result = ElevenLabsSTT::new(STTConfig::default());
        match result {
            Err(STTError::AuthenticationFailed(msg)) => assert!(msg.contains("API key")),
            _ => panic!("Expected AuthenticationFailed error"),
        }
    }

    #[test]
    fn test_new_with_unsupported_sample_rate() {
        let config = STTConfig {
            sample_rate: 12345,
            ..test_config()
        };
        assert!(matches!(
            ElevenLabsSTT::new(config),
            Err(STTError::ConfigurationError(_))
        ));
    }

    #[tokio::test]
    async fn test_send_audio_when_not_connected() {
        let mut stt = ElevenLabsSTT::new(test_config()).unwrap();
        let result = stt.send_audio(Bytes::from(vec![0u8; 1024])).await;
        match result {
            Err(STTError::ConnectionFailed(msg)) => assert!(msg.contains("Not connected")),
            _ => panic!("Expected ConnectionFailed error"),
        }
    }

    #[tokio::test]
    async fn test_handle_session_started() {
        let (result_tx, _result_rx, error_tx, _error_rx, session_id) = channels();
        let msg = Message::Text(
            r#"{"message_type":"session_started","session_id":"abc"}"#.into(),
        );

        let keep_going =
            ElevenLabsSTT::handle_websocket_message(msg, &result_tx, &error_tx, &session_id)
                .await
                .unwrap();

        assert!(keep_going);
        assert_eq!(session_id.read().await.as_deref(), Some("abc"));
    }

    #[tokio::test]
    async fn test_handle_partial_and_committed() {
        let (result_tx, mut result_rx, error_tx, _error_rx, session_id) = channels();

        let partial = Message::Text(r#"{"message_type":"partial_transcript","text":"goede"}"#.into());
        ElevenLabsSTT::handle_websocket_message(partial, &result_tx, &error_tx, &session_id)
            .await
            .unwrap();
        let committed = Message::Text(
            r#"{"message_type":"committed_transcript","text":"goedemorgen"}"#.into(),
        );
        ElevenLabsSTT::handle_websocket_message(committed, &result_tx, &error_tx, &session_id)
            .await
            .unwrap();

        let first = result_rx.try_recv().unwrap();
        assert_eq!(first.transcript, "goede");
        assert!(!first.is_final);

        let second = result_rx.try_recv().unwrap();
        assert_eq!(second.transcript, "goedemorgen");
        assert!(second.is_final);
        assert!(second.is_speech_final);
    }

    #[tokio::test]
    async fn test_timestamped_commit_is_not_duplicated() {
        let (result_tx, mut result_rx, error_tx, _error_rx, session_id) = channels();
        let msg = Message::Text(
            r#"{"message_type":"committed_transcript_with_timestamps","text":"hallo","words":[]}"#
                .into(),
        );

        ElevenLabsSTT::handle_websocket_message(msg, &result_tx, &error_tx, &session_id)
            .await
            .unwrap();
        assert!(result_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_handle_auth_error_is_fatal() {
        let (result_tx, _result_rx, error_tx, _error_rx, session_id) = channels();
        let msg = Message::Text(
            r#"{"message_type":"auth_error","error":"Invalid API key"}"#.into(),
        );

        let result =
            ElevenLabsSTT::handle_websocket_message(msg, &result_tx, &error_tx, &session_id).await;
        match result {
            Err(STTError::AuthenticationFailed(msg)) => assert!(msg.contains("Invalid")),
            other => panic!("Expected AuthenticationFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_handle_input_error_keeps_session() {
        let (result_tx, _result_rx, error_tx, mut error_rx, session_id) = channels();
        let msg = Message::Text(
            r#"{"message_type":"insufficient_audio_activity","error":"No speech"}"#.into(),
        );

        let keep_going =
            ElevenLabsSTT::handle_websocket_message(msg, &result_tx, &error_tx, &session_id)
                .await
                .unwrap();
        assert!(keep_going);
        assert!(matches!(
            error_rx.try_recv().unwrap(),
            STTError::InvalidAudioFormat(_)
        ));
    }

    #[tokio::test]
    async fn test_handle_close_frame() {
        let (result_tx, _result_rx, error_tx, _error_rx, session_id) = channels();
        let keep_going = ElevenLabsSTT::handle_websocket_message(
            Message::Close(None),
            &result_tx,
            &error_tx,
            &session_id,
        )
        .await
        .unwrap();
        assert!(!keep_going);
    }

    #[tokio::test]
    async fn test_connect_stream_and_disconnect() {
        let (endpoint, mut seen_rx) = spawn_mock_scribe().await;
        let mut stt = ElevenLabsSTT::new(STTConfig {
            endpoint: Some(endpoint),
            ..test_config()
        })
        .unwrap();

        let (tx, mut rx) = mpsc::channel::<STTResult>(8);
        stt.on_result(Arc::new(move |result| {
            let tx = tx.clone();
            Box::pin(async move {
                let _ = tx.send(result).await;
            })
        }))
        .await
        .unwrap();

        stt.connect().await.unwrap();
        assert!(stt.is_ready());
        assert_eq!(stt.get_session_id().await.as_deref(), Some("sess-42"));

        stt.send_audio(Bytes::from_static(&[1, 2, 3])).await.unwrap();
        let sent = timeout(Duration::from_secs(2), seen_rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(sent.contains(r#""audio_base_64":"AQID""#));
        assert!(sent.contains(r#""sample_rate":16000"#));

        let partial = timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(partial.transcript, "hallo");
        assert!(!partial.is_final);

        stt.send_audio(Bytes::from_static(&[4, 5, 6])).await.unwrap();
        let committed = timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(committed.transcript, "hallo wereld");
        assert!(committed.is_final);

        stt.disconnect().await.unwrap();
        assert!(!stt.is_ready());
    }

    #[tokio::test]
    async fn test_outgoing_audio_does_not_extend_idle_timeout() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (stream, _) = listener.accept().await.unwrap();
            let ws = tokio_tungstenite::accept_async(stream).await.unwrap();
            let (mut sink, mut stream) = ws.split();
            sink.send(Message::Text(
                r#"{"message_type":"session_started","session_id":"quiet"}"#.into(),
            ))
            .await
            .unwrap();
            // Swallow audio without ever answering.
            while let Some(Ok(_)) = stream.next().await {}
        });

        let mut stt = ElevenLabsSTT::new(STTConfig {
            endpoint: Some(format!("ws://{addr}")),
            ..test_config()
        })
        .unwrap();
        stt.config.as_mut().unwrap().idle_timeout = Duration::from_millis(300);

        let (tx, mut errors) = mpsc::channel::<STTError>(4);
        stt.on_error(Arc::new(move |err| {
            let tx = tx.clone();
            Box::pin(async move {
                let _ = tx.send(err).await;
            })
        }))
        .await
        .unwrap();
        stt.connect().await.unwrap();

        let idle_error = timeout(Duration::from_secs(3), async {
            loop {
                if stt.is_ready() {
                    let _ = stt.send_audio(Bytes::from_static(&[0, 1])).await;
                }
                tokio::select! {
                    err = errors.recv() => break err,
                    _ = sleep(Duration::from_millis(50)) => {}
                }
            }
        })
        .await
        .expect("idle timeout should fire while audio keeps flowing")
        .unwrap();

        assert!(idle_error.to_string().contains("idle timeout"));
    }

    #[tokio::test]
    async fn test_connect_to_unreachable_endpoint_fails() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let mut stt = ElevenLabsSTT::new(STTConfig {
            endpoint: Some(format!("ws://{addr}")),
            ..test_config()
        })
        .unwrap();

        let result = stt.connect().await;
        assert!(matches!(result, Err(STTError::ConnectionFailed(_))));
        assert!(!stt.is_ready());
    }
}
