//! WebSocket mock of the ElevenLabs realtime Scribe endpoint
//!
//! Starts a session on connect, then answers audio chunks with a scripted
//! sequence of transcript messages. Every text frame it receives is recorded.

use futures::{SinkExt, StreamExt};
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::accept_hdr_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::tungstenite::handshake::server::{ErrorResponse, Request, Response};

/// What the mock saw on the wire.
#[derive(Default)]
pub struct ScribeMockState {
    /// Connections accepted so far
    pub total_connections: AtomicUsize,
    /// Connections currently open
    pub active_connections: AtomicUsize,
    /// `xi-api-key` header of each handshake
    pub api_keys: Mutex<Vec<String>>,
    /// Query string of each handshake
    pub queries: Mutex<Vec<String>>,
    /// Every JSON message received, in order
    pub messages: Mutex<Vec<Value>>,
}

impl ScribeMockState {
    pub fn audio_chunks(&self) -> Vec<Value> {
        self.messages
            .lock()
            .iter()
            .filter(|m| m["message_type"] == "input_audio_chunk" && m["commit"] == false)
            .cloned()
            .collect()
    }

    pub fn commits(&self) -> usize {
        self.messages
            .lock()
            .iter()
            .filter(|m| m["commit"] == true)
            .count()
    }

    pub fn active(&self) -> usize {
        self.active_connections.load(Ordering::SeqCst)
    }
}

/// Scripted replies, one list per received audio chunk.
#[derive(Clone)]
pub struct ScribeScript {
    replies: Vec<Vec<Value>>,
}

impl ScribeScript {
    pub fn new(replies: Vec<Vec<Value>>) -> Self {
        Self { replies }
    }

    /// First chunk yields a partial, second a committed transcript.
    pub fn partial_then_committed(partial: &str, committed: &str) -> Self {
        Self::new(vec![
            vec![json!({"message_type": "partial_transcript", "text": partial})],
            vec![json!({"message_type": "committed_transcript", "text": committed})],
        ])
    }

    /// Replies to the `index`th audio chunk; chunks past the script get none.
    fn replies_for(&self, index: usize) -> &[Value] {
        self.replies.get(index).map(Vec::as_slice).unwrap_or(&[])
    }
}

async fn handle_connection(
    stream: TcpStream,
    state: Arc<ScribeMockState>,
    script: ScribeScript,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let handshake_state = state.clone();
    let ws_stream = accept_hdr_async(stream, move |req: &Request, resp: Response| {
        let key = req
            .headers()
            .get("xi-api-key")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        handshake_state.api_keys.lock().push(key);
        handshake_state
            .queries
            .lock()
            .push(req.uri().query().unwrap_or_default().to_string());
        Ok::<_, ErrorResponse>(resp)
    })
    .await?;

    let (mut write, mut read) = ws_stream.split();

    let conn_id = state.total_connections.fetch_add(1, Ordering::SeqCst) + 1;
    state.active_connections.fetch_add(1, Ordering::SeqCst);

    let started = json!({
        "message_type": "session_started",
        "session_id": format!("mock-session-{conn_id}"),
    });
    write.send(Message::Text(started.to_string().into())).await?;

    let result = async {
        let mut audio_chunk_count = 0usize;

        while let Some(msg) = read.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    let Ok(value) = serde_json::from_str::<Value>(&text) else {
                        continue;
                    };
                    let is_audio =
                        value["message_type"] == "input_audio_chunk" && value["commit"] == false;
                    state.messages.lock().push(value);

                    if is_audio {
                        for reply in script.replies_for(audio_chunk_count) {
                            write.send(Message::Text(reply.to_string().into())).await?;
                        }
                        audio_chunk_count += 1;
                    }
                }
                Ok(Message::Close(_)) => break,
                Ok(Message::Ping(data)) => {
                    write.send(Message::Pong(data)).await?;
                }
                Err(_) => break,
                _ => {}
            }
        }
        Ok::<(), Box<dyn std::error::Error + Send + Sync>>(())
    }
    .await;

    state.active_connections.fetch_sub(1, Ordering::SeqCst);
    result
}

/// Spawn the mock on an ephemeral port; returns its `ws://` base URL.
pub async fn spawn_scribe_mock(script: ScribeScript) -> (String, Arc<ScribeMockState>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let state = Arc::new(ScribeMockState::default());

    let accept_state = state.clone();
    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let state = accept_state.clone();
            let script = script.clone();
            tokio::spawn(async move {
                if let Err(e) = handle_connection(stream, state, script).await {
                    eprintln!("Scribe mock connection error: {e}");
                }
            });
        }
    });

    (format!("ws://{addr}"), state)
}
