//! Process-wide application state.

use dashmap::DashMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::core::relay::{LanguagePair, TranscriptRouter};
use crate::core::stt::STTConfig;
use crate::core::translate::{BaseTranslator, TranslatorConfig, create_translator};

/// Timeout for outbound HTTP calls to providers
const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Reasons a new WebSocket connection is refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionLimitError {
    GlobalLimitReached,
    PerIpLimitReached,
}

/// Shared state handed to every handler.
pub struct AppState {
    pub config: ServerConfig,
    /// Shared HTTP client for token and translation requests
    pub http_client: reqwest::Client,
    /// Translator for the configured provider; `None` when its key is missing
    pub translator: Option<Arc<dyn BaseTranslator>>,
    ws_connections: AtomicUsize,
    ip_connections: DashMap<IpAddr, usize>,
}

impl AppState {
    pub async fn new(config: ServerConfig) -> Arc<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!(error = %e, "Failed to build tuned HTTP client, using defaults");
                reqwest::Client::new()
            });

        let translator = build_translator(&config, http_client.clone());

        Arc::new(Self {
            config,
            http_client,
            translator,
            ws_connections: AtomicUsize::new(0),
            ip_connections: DashMap::new(),
        })
    }

    /// Languages a new connection starts with.
    pub fn default_languages(&self) -> LanguagePair {
        LanguagePair::new(
            self.config.default_input_language.clone(),
            self.config.default_output_language.clone(),
        )
    }

    pub fn router(&self) -> TranscriptRouter {
        TranscriptRouter::new(
            self.translator.clone(),
            self.config.translate_interim_results,
        )
    }

    /// Stream configuration for a new upstream transcription session.
    ///
    /// Fails with the configuration message when no ElevenLabs key is set.
    pub fn stt_config(&self, language: &str, sample_rate: Option<u32>) -> Result<STTConfig, String> {
        let api_key = self.config.get_api_key("elevenlabs")?;

        Ok(STTConfig {
            provider: "elevenlabs".to_string(),
            api_key,
            language: language.to_string(),
            sample_rate: sample_rate.unwrap_or(self.config.stt_sample_rate),
            model: self.config.stt_model.clone(),
            endpoint: Some(self.config.elevenlabs_ws_url.clone()),
            ..Default::default()
        })
    }

    /// Reserve a WebSocket slot for `ip`.
    ///
    /// Every successful call must be paired with [`AppState::release_connection`].
    pub fn try_acquire_connection(&self, ip: IpAddr) -> Result<(), ConnectionLimitError> {
        if let Some(max) = self.config.max_websocket_connections {
            let acquired = self
                .ws_connections
                .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                    (current < max).then_some(current + 1)
                });
            if acquired.is_err() {
                return Err(ConnectionLimitError::GlobalLimitReached);
            }
        } else {
            self.ws_connections.fetch_add(1, Ordering::AcqRel);
        }

        let per_ip_limit = self.config.max_connections_per_ip as usize;
        let mut entry = self.ip_connections.entry(ip).or_insert(0);
        if *entry >= per_ip_limit {
            drop(entry);
            self.ws_connections.fetch_sub(1, Ordering::AcqRel);
            return Err(ConnectionLimitError::PerIpLimitReached);
        }
        *entry += 1;

        Ok(())
    }

    pub fn release_connection(&self, ip: IpAddr) {
        let _ = self
            .ws_connections
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |current| {
                current.checked_sub(1)
            });

        self.ip_connections
            .remove_if_mut(&ip, |_, count| {
                *count = count.saturating_sub(1);
                *count == 0
            });
    }

    pub fn ws_connection_count(&self) -> usize {
        self.ws_connections.load(Ordering::Acquire)
    }

    pub fn ip_connection_count(&self, ip: &IpAddr) -> usize {
        self.ip_connections.get(ip).map(|c| *c).unwrap_or(0)
    }
}

fn build_translator(
    config: &ServerConfig,
    client: reqwest::Client,
) -> Option<Arc<dyn BaseTranslator>> {
    let Some(api_key) = config.translation_api_key() else {
        warn!(
            provider = %config.translation_provider,
            "No translation API key configured, transcripts will pass through untranslated"
        );
        return None;
    };

    let translator_config = TranslatorConfig {
        provider: config.translation_provider.clone(),
        api_key,
        model: config.translation_model.clone(),
        endpoint: config.translation_endpoint(),
    };

    match create_translator(&config.translation_provider, client, translator_config) {
        Ok(translator) => {
            info!(provider = translator.get_provider_info(), "Translation enabled");
            Some(Arc::from(translator))
        }
        Err(e) => {
            warn!(error = %e, "Failed to create translator, translation disabled");
            None
        }
    }
}

/// Holds a connection slot and releases it on drop.
pub struct ConnectionGuard {
    state: Arc<AppState>,
    ip: IpAddr,
}

impl ConnectionGuard {
    pub fn new(state: Arc<AppState>, ip: IpAddr) -> Self {
        Self { state, ip }
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.state.release_connection(self.ip);
    }
}
