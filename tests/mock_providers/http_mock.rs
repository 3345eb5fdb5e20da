//! HTTP mocks for the ElevenLabs token endpoint and Google Cloud Translation

use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

pub const TOKEN_PATH: &str = "/v1/single-use-token/realtime_scribe";
pub const GOOGLE_TRANSLATE_PATH: &str = "/language/translate/v2";

/// Answers every translation request with `<target>:<text>`.
pub struct EchoTranslation;

impl Respond for EchoTranslation {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let param = |name: &str| {
            request
                .url
                .query_pairs()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.into_owned())
                .unwrap_or_default()
        };

        ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "translations": [
                    { "translatedText": format!("{}:{}", param("target"), param("q")) }
                ]
            }
        }))
    }
}

/// ElevenLabs REST mock that mints `token` for `api_key`.
pub async fn elevenlabs_token_server(api_key: &str, token: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .and(header("xi-api-key", api_key))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": token })))
        .mount(&server)
        .await;
    server
}

/// ElevenLabs REST mock that rejects every request with `status`.
pub async fn elevenlabs_failing_server(status: u16, error: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(TOKEN_PATH))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({ "error": error })))
        .mount(&server)
        .await;
    server
}

/// Google Translate mock that echoes `<target>:<text>` for `api_key`.
pub async fn google_translate_server(api_key: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GOOGLE_TRANSLATE_PATH))
        .and(query_param("key", api_key))
        .respond_with(EchoTranslation)
        .mount(&server)
        .await;
    server
}

/// Google Translate mock that always fails.
pub async fn google_translate_failing_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(GOOGLE_TRANSLATE_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": { "code": 403, "message": "API key not valid" }
        })))
        .mount(&server)
        .await;
    server
}
