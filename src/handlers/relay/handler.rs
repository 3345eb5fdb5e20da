//! Relay WebSocket handler
//!
//! Each client connection owns at most one upstream transcription stream.
//! Binary frames are forwarded to that stream; JSON text frames control the
//! language pair and the stream lifecycle. Transcripts coming back from the
//! provider pass through the [`TranscriptRouter`] before reaching the client.

use axum::{
    Extension,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::mpsc;
use tokio::{select, time::Duration};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::core::relay::{LanguagePair, TranscriptRouter};
use crate::core::stt::{BaseSTT, STTError, STTResult, create_stt_provider};
use crate::middleware::ClientIp;
use crate::state::{AppState, ConnectionGuard};

use super::messages::{RelayIncomingMessage, RelayMessageRoute, RelayOutgoingMessage};

/// Channel buffer between the receive loop and the sender task
const CHANNEL_BUFFER_SIZE: usize = 1024;

/// Maximum WebSocket frame size (10 MB)
const MAX_WS_FRAME_SIZE: usize = 10 * 1024 * 1024;

/// Maximum WebSocket message size (10 MB)
const MAX_WS_MESSAGE_SIZE: usize = 10 * 1024 * 1024;

/// How often the receive loop checks for an idle client
const IDLE_CHECK_INTERVAL: Duration = Duration::from_secs(30);

const BASE_IDLE_SECS: u64 = 300;
const IDLE_JITTER_SECS: u64 = 30;

/// Time the sender task gets to flush queued frames on shutdown
const SENDER_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Relay WebSocket handler
///
/// Upgrades the request and hands the socket to the relay loop. When the
/// connection-limit middleware admitted the request, the slot it reserved is
/// released once the socket closes.
pub async fn relay_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
    client_ip: Option<Extension<ClientIp>>,
) -> Response {
    let client_ip = client_ip.map(|Extension(ClientIp(ip))| ip);
    debug!(ip = ?client_ip, "Relay WebSocket upgrade requested");

    ws.max_frame_size(MAX_WS_FRAME_SIZE)
        .max_message_size(MAX_WS_MESSAGE_SIZE)
        .on_upgrade(move |socket| async move {
            let _guard = client_ip.map(|ip| ConnectionGuard::new(state.clone(), ip));
            handle_relay_socket(socket, state).await;
        })
}

/// Idle timeout around five minutes, jittered per connection so that
/// abandoned clients do not all time out together.
fn idle_timeout(connection_id: &Uuid) -> Duration {
    let offset = (connection_id.as_u128() % (IDLE_JITTER_SECS as u128 * 2)) as u64;
    Duration::from_secs(BASE_IDLE_SECS - IDLE_JITTER_SECS + offset)
}

/// Per-connection relay state.
struct RelaySession {
    connection_id: Uuid,
    state: Arc<AppState>,
    message_tx: mpsc::Sender<RelayMessageRoute>,
    languages: Arc<RwLock<LanguagePair>>,
    router: TranscriptRouter,
    stt: Option<Box<dyn BaseSTT>>,
    /// Sample rate of the current stream, reused when the stream restarts
    sample_rate: Option<u32>,
}

impl RelaySession {
    fn new(
        connection_id: Uuid,
        state: Arc<AppState>,
        message_tx: mpsc::Sender<RelayMessageRoute>,
    ) -> Self {
        Self {
            connection_id,
            languages: Arc::new(RwLock::new(state.default_languages())),
            router: state.router(),
            state,
            message_tx,
            stt: None,
            sample_rate: None,
        }
    }

    async fn send(&self, message: RelayOutgoingMessage) {
        if self
            .message_tx
            .send(RelayMessageRoute::Outgoing(message))
            .await
            .is_err()
        {
            debug!(connection_id = %self.connection_id, "Sender task gone, dropping message");
        }
    }

    async fn send_error(&self, code: &str, message: impl Into<String>) {
        self.send(RelayOutgoingMessage::error(code, message)).await;
    }

    /// Handle one client frame. Returns `false` when the connection should close.
    async fn process_message(&mut self, msg: Message) -> bool {
        match msg {
            Message::Text(text) => {
                debug!(connection_id = %self.connection_id, "Received text message: {} bytes", text.len());

                let incoming: RelayIncomingMessage = match serde_json::from_str(&text) {
                    Ok(msg) => msg,
                    Err(e) => {
                        warn!(connection_id = %self.connection_id, "Failed to parse relay message: {}", e);
                        self.send_error("parse_error", format!("Invalid message format: {e}"))
                            .await;
                        return true;
                    }
                };

                if let Err(e) = incoming.validate() {
                    warn!(connection_id = %self.connection_id, "Message validation failed: {}", e);
                    self.send_error("validation_error", e.to_string()).await;
                    return true;
                }

                self.handle_incoming(incoming).await;
                true
            }
            Message::Binary(data) => {
                self.forward_audio(data).await;
                true
            }
            Message::Ping(_) | Message::Pong(_) => true,
            Message::Close(_) => {
                info!(connection_id = %self.connection_id, "Relay WebSocket close received");
                false
            }
        }
    }

    async fn handle_incoming(&mut self, msg: RelayIncomingMessage) {
        match msg {
            RelayIncomingMessage::Config {
                input_language,
                output_language,
            } => {
                self.handle_config(input_language.as_deref(), output_language.as_deref())
                    .await
            }
            RelayIncomingMessage::Start { sample_rate } => {
                if self.start_stream(sample_rate).await {
                    self.send(RelayOutgoingMessage::status("Transcription started"))
                        .await;
                }
            }
            RelayIncomingMessage::Stop => {
                self.stop_stream().await;
                self.send(RelayOutgoingMessage::status("Transcription stopped"))
                    .await;
            }
            RelayIncomingMessage::Translate { text, is_final } => {
                let languages = self.languages.read().clone();
                let output = self.router.route(&languages, &text, is_final).await;
                self.send(output.into()).await;
            }
        }
    }

    async fn handle_config(&mut self, input: Option<&str>, output: Option<&str>) {
        let updated = LanguagePair::from_request(input, output, &self.state.default_languages());
        let input_changed = {
            let mut current = self.languages.write();
            let changed = !current.input.eq_ignore_ascii_case(&updated.input);
            *current = updated.clone();
            changed
        };

        info!(
            connection_id = %self.connection_id,
            input = %updated.input,
            output = %updated.output,
            "Language pair updated"
        );
        self.send(RelayOutgoingMessage::status(format!(
            "Ready - Input: {}, Output: {}",
            updated.input, updated.output
        )))
        .await;

        if input_changed && self.stt.is_some() {
            info!(connection_id = %self.connection_id, "Input language changed, restarting transcription");
            if self.start_stream(self.sample_rate).await {
                self.send(RelayOutgoingMessage::status("Transcription started"))
                    .await;
            }
        }
    }

    /// Open a fresh upstream stream, closing any existing one first.
    ///
    /// Errors are reported to the client; returns whether the stream is up.
    async fn start_stream(&mut self, sample_rate: Option<u32>) -> bool {
        self.stop_stream().await;

        let language = self.languages.read().input.clone();
        let config = match self.state.stt_config(&language, sample_rate) {
            Ok(config) => config,
            Err(message) => {
                warn!(connection_id = %self.connection_id, "Cannot start transcription: {}", message);
                self.send_error("missing_api_key", message).await;
                return false;
            }
        };

        let provider_name = config.provider.clone();
        let mut provider = match create_stt_provider(&provider_name, config) {
            Ok(provider) => provider,
            Err(e) => {
                error!(connection_id = %self.connection_id, "Failed to create STT provider: {}", e);
                self.send_error("stt_config_error", e.to_string()).await;
                return false;
            }
        };

        if let Err(e) = self.register_callbacks(provider.as_mut()).await {
            error!(connection_id = %self.connection_id, "Failed to register STT callbacks: {}", e);
            self.send_error("stt_config_error", e.to_string()).await;
            return false;
        }

        if let Err(e) = provider.connect().await {
            error!(connection_id = %self.connection_id, "Failed to connect to ElevenLabs: {}", e);
            self.send_error(
                "stt_connection_error",
                format!("Failed to connect to ElevenLabs: {e}"),
            )
            .await;
            return false;
        }

        info!(
            connection_id = %self.connection_id,
            language = %language,
            provider = provider.get_provider_info(),
            "Transcription stream started"
        );
        self.stt = Some(provider);
        self.sample_rate = sample_rate;
        true
    }

    async fn register_callbacks(&self, provider: &mut dyn BaseSTT) -> Result<(), STTError> {
        let result_tx = self.message_tx.clone();
        let languages = self.languages.clone();
        let router = self.router.clone();

        provider
            .on_result(Arc::new(move |result: STTResult| {
                let tx = result_tx.clone();
                let languages = languages.clone();
                let router = router.clone();
                Box::pin(async move {
                    if result.transcript.trim().is_empty() {
                        return;
                    }
                    let pair = languages.read().clone();
                    let output = router
                        .route(&pair, &result.transcript, result.is_final)
                        .await;
                    let _ = tx.send(RelayMessageRoute::Outgoing(output.into())).await;
                })
            }))
            .await?;

        let error_tx = self.message_tx.clone();
        let connection_id = self.connection_id;
        provider
            .on_error(Arc::new(move |err: STTError| {
                let tx = error_tx.clone();
                Box::pin(async move {
                    warn!(connection_id = %connection_id, "Upstream transcription error: {}", err);
                    let _ = tx
                        .send(RelayMessageRoute::Outgoing(RelayOutgoingMessage::error(
                            "stt_error",
                            err.to_string(),
                        )))
                        .await;
                })
            }))
            .await
    }

    async fn stop_stream(&mut self) {
        if let Some(mut provider) = self.stt.take() {
            if let Err(e) = provider.disconnect().await {
                warn!(connection_id = %self.connection_id, "Failed to disconnect STT provider: {}", e);
            }
            info!(connection_id = %self.connection_id, "Transcription stream stopped");
        }
    }

    async fn forward_audio(&mut self, data: Bytes) {
        let Some(provider) = self.stt.as_mut().filter(|p| p.is_ready()) else {
            debug!(
                connection_id = %self.connection_id,
                "No active transcription stream, dropping {} bytes of audio",
                data.len()
            );
            return;
        };

        if let Err(e) = provider.send_audio(data).await {
            warn!(connection_id = %self.connection_id, "Failed to forward audio: {}", e);
            self.send_error("audio_error", format!("Failed to send audio: {e}"))
                .await;
        }
    }
}

/// Drive one relay connection until the client leaves or goes idle.
async fn handle_relay_socket(socket: WebSocket, app_state: Arc<AppState>) {
    let connection_id = Uuid::new_v4();
    info!(connection_id = %connection_id, "Relay WebSocket connection established");

    let (mut sender, mut receiver) = socket.split();
    let (message_tx, mut message_rx) = mpsc::channel::<RelayMessageRoute>(CHANNEL_BUFFER_SIZE);

    let sender_task = tokio::spawn(async move {
        while let Some(route) = message_rx.recv().await {
            let result = match route {
                RelayMessageRoute::Outgoing(message) => match serde_json::to_string(&message) {
                    Ok(json) => sender.send(Message::Text(json.into())).await,
                    Err(e) => {
                        error!("Failed to serialize outgoing message: {}", e);
                        continue;
                    }
                },
                RelayMessageRoute::Close => {
                    let _ = sender.send(Message::Close(None)).await;
                    break;
                }
            };

            if let Err(e) = result {
                debug!("Failed to send WebSocket message: {}", e);
                break;
            }
        }
    });

    let mut session = RelaySession::new(connection_id, app_state, message_tx.clone());
    session
        .send(RelayOutgoingMessage::status("Translation service ready"))
        .await;

    let idle_timeout = idle_timeout(&connection_id);
    let mut last_activity = Instant::now();

    loop {
        select! {
            msg_result = receiver.next() => {
                last_activity = Instant::now();

                match msg_result {
                    Some(Ok(msg)) => {
                        if !session.process_message(msg).await {
                            break;
                        }
                    }
                    Some(Err(e)) => {
                        warn!(connection_id = %connection_id, "Relay WebSocket error: {}", e);
                        break;
                    }
                    None => {
                        info!(connection_id = %connection_id, "Relay WebSocket closed by client");
                        break;
                    }
                }
            }
            _ = tokio::time::sleep(IDLE_CHECK_INTERVAL) => {
                if last_activity.elapsed() > idle_timeout {
                    warn!(
                        connection_id = %connection_id,
                        "Relay WebSocket idle for {}s, closing",
                        last_activity.elapsed().as_secs()
                    );
                    session
                        .send_error("idle_timeout", "Connection closed due to inactivity")
                        .await;
                    break;
                }
            }
        }
    }

    session.stop_stream().await;
    drop(session);

    let _ = message_tx.send(RelayMessageRoute::Close).await;
    drop(message_tx);

    let mut sender_task = sender_task;
    if tokio::time::timeout(SENDER_DRAIN_TIMEOUT, &mut sender_task)
        .await
        .is_err()
    {
        sender_task.abort();
    }

    info!(connection_id = %connection_id, "Relay WebSocket connection terminated");
}
