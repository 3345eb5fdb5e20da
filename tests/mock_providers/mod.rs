//! Mock provider servers and gateway helpers shared by the integration suites
//!
//! - HTTP (ElevenLabs token endpoint, Google Cloud Translation) via wiremock
//! - WebSocket (ElevenLabs realtime Scribe) via tokio-tungstenite

// Each suite uses a different subset of the helpers
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use serde_json::Value;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use translate_gateway::{ServerConfig, routes, state::AppState};

pub mod http_mock;
pub mod websocket_mock;

pub type ClientSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Configuration with rate limiting off and no provider keys.
pub fn test_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.host = "127.0.0.1".to_string();
    config.port = 0;
    config.rate_limit_requests_per_second = 100_000;
    config
}

/// A gateway serving on an ephemeral port.
pub struct TestGateway {
    pub addr: SocketAddr,
    pub state: Arc<AppState>,
}

impl TestGateway {
    pub async fn spawn(config: ServerConfig) -> Self {
        let state = AppState::new(config).await;
        let app = routes::create_app(state.clone());

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            axum::serve(
                listener,
                app.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        Self { addr, state }
    }

    pub fn http_url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Open a relay connection and consume the greeting.
    pub async fn connect(&self) -> ClientSocket {
        let (mut socket, _) = connect_async(format!("ws://{}/ws", self.addr))
            .await
            .expect("relay connection");
        let greeting = next_json(&mut socket).await;
        assert_eq!(greeting["type"], "status");
        assert_eq!(greeting["message"], "Translation service ready");
        socket
    }
}

/// Next JSON text frame from the gateway, failing the test after 5 seconds.
pub async fn next_json(socket: &mut ClientSocket) -> Value {
    let deadline = Duration::from_secs(5);
    loop {
        let frame = tokio::time::timeout(deadline, socket.next())
            .await
            .expect("timed out waiting for gateway message")
            .expect("socket closed")
            .expect("socket error");
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).expect("gateway sent invalid JSON");
        }
    }
}

pub async fn send_json(socket: &mut ClientSocket, value: Value) {
    socket
        .send(Message::Text(value.to_string().into()))
        .await
        .unwrap();
}
