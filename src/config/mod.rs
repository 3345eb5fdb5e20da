//! Configuration module for the translate gateway
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//!
//! # Example
//! ```rust,no_run
//! use translate_gateway::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

mod env;
mod merge;
mod validation;
mod yaml;

pub(crate) use validation::is_valid_language_code;

use crate::core::stt::elevenlabs::{DEFAULT_API_BASE_URL, DEFAULT_MODEL_ID, DEFAULT_WS_BASE_URL};
use crate::core::translate::TranslationProvider;

/// Canonical provider name for known aliases; unknown names are lowercased
/// and left for validation to reject.
fn normalize_translation_provider(raw: &str) -> String {
    raw.parse::<TranslationProvider>()
        .map(|provider| provider.to_string())
        .unwrap_or_else(|_| raw.to_lowercase())
}

/// TLS configuration for HTTPS and WSS
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// Server configuration
///
/// Contains all configuration needed to run the gateway:
/// - Server settings (host, port, TLS, static directory)
/// - Provider API keys (ElevenLabs, Google Cloud Translation, Gemini)
/// - Provider endpoints, overridable for proxies and tests
/// - Speech and translation defaults
/// - Security settings (CORS, rate limiting, connection limits)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // TLS configuration (optional)
    pub tls: Option<TlsConfig>,

    /// Directory with the browser client, served as the fallback route
    pub static_dir: PathBuf,

    // Provider API keys
    pub elevenlabs_api_key: Option<String>,
    /// Google Cloud Translation API key (`GOOGLE_CLOUD_API_KEY`)
    pub google_translate_api_key: Option<String>,
    pub gemini_api_key: Option<String>,

    // Translation settings
    /// "google" (default) or "gemini"
    pub translation_provider: String,
    /// Model for generative translation providers
    pub translation_model: Option<String>,
    /// Translate interim transcripts as well as final ones
    pub translate_interim_results: bool,

    // Provider endpoints
    pub elevenlabs_api_url: String,
    pub elevenlabs_ws_url: String,
    /// None uses the provider default
    pub google_translate_url: Option<String>,
    /// None uses the provider default
    pub gemini_api_url: Option<String>,

    // Speech-to-text settings
    pub stt_model: String,
    /// Sample rate assumed when a client does not announce one
    pub stt_sample_rate: u32,

    // Language defaults for new connections
    pub default_input_language: String,
    pub default_output_language: String,

    // Security configuration
    /// CORS allowed origins (comma-separated list or "*" for all)
    /// Default: None (CORS disabled, same-origin only)
    pub cors_allowed_origins: Option<String>,

    // Rate limiting configuration
    /// Maximum requests per second per IP address
    /// Default: 60
    pub rate_limit_requests_per_second: u32,
    /// Maximum burst size for rate limiting
    /// Default: 10
    pub rate_limit_burst_size: u32,

    // Connection limits
    /// Maximum concurrent WebSocket connections
    /// Default: None (unlimited)
    pub max_websocket_connections: Option<usize>,
    /// Maximum connections per IP address
    /// Default: 100
    pub max_connections_per_ip: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            tls: None,
            static_dir: PathBuf::from("public"),
            elevenlabs_api_key: None,
            google_translate_api_key: None,
            gemini_api_key: None,
            translation_provider: "google".to_string(),
            translation_model: None,
            translate_interim_results: false,
            elevenlabs_api_url: DEFAULT_API_BASE_URL.to_string(),
            elevenlabs_ws_url: DEFAULT_WS_BASE_URL.to_string(),
            google_translate_url: None,
            gemini_api_url: None,
            stt_model: DEFAULT_MODEL_ID.to_string(),
            stt_sample_rate: 16000,
            default_input_language: "nl".to_string(),
            default_output_language: "en".to_string(),
            cors_allowed_origins: None,
            rate_limit_requests_per_second: 60,
            rate_limit_burst_size: 10,
            max_websocket_connections: None,
            max_connections_per_ip: 100,
        }
    }
}

/// Zeroize all secret fields when ServerConfig is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut key) = self.elevenlabs_api_key {
            key.zeroize();
        }
        if let Some(ref mut key) = self.google_translate_api_key {
            key.zeroize();
        }
        if let Some(ref mut key) = self.gemini_api_key {
            key.zeroize();
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// `.env` values are expected to be loaded into the environment already
    /// (`main` does this with dotenvy). Validates the result.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = merge::merge_config(None)?;
        validation::validate_config(&config)?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        validation::validate_config(&config)?;
        Ok(config)
    }

    /// Get the server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check if TLS is enabled
    pub fn is_tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    /// Get API key for a specific provider
    ///
    /// # Arguments
    /// * `provider` - "elevenlabs", "google" or "gemini"
    ///
    /// # Returns
    /// * `Result<String, String>` - The API key on success, or an error message on failure
    pub fn get_api_key(&self, provider: &str) -> Result<String, String> {
        if provider.eq_ignore_ascii_case("elevenlabs") {
            return self
                .elevenlabs_api_key
                .clone()
                .ok_or_else(|| "ELEVENLABS_API_KEY not configured".to_string());
        }

        match provider.parse::<TranslationProvider>() {
            Ok(TranslationProvider::Google) => self
                .google_translate_api_key
                .clone()
                .ok_or_else(|| "GOOGLE_CLOUD_API_KEY not configured".to_string()),
            Ok(TranslationProvider::Gemini) => self
                .gemini_api_key
                .clone()
                .ok_or_else(|| "GEMINI_API_KEY not configured".to_string()),
            Err(_) => Err(format!("Unsupported provider: {provider}")),
        }
    }

    /// API key of the configured translation provider, if any.
    pub fn translation_api_key(&self) -> Option<String> {
        self.get_api_key(&self.translation_provider).ok()
    }

    /// Base URL override for the configured translation provider.
    pub fn translation_endpoint(&self) -> Option<String> {
        match self.translation_provider.parse::<TranslationProvider>() {
            Ok(TranslationProvider::Gemini) => self.gemini_api_url.clone(),
            _ => self.google_translate_url.clone(),
        }
    }
}
