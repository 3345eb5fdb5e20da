use serde::Deserialize;
use std::path::PathBuf;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present
/// here override environment variables.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 3000
///   static_dir: "public"
///   tls:
///     cert_path: "/etc/gateway/cert.pem"
///     key_path: "/etc/gateway/key.pem"
///
/// providers:
///   elevenlabs_api_key: "your-elevenlabs-key"
///   google_cloud_api_key: "your-google-key"
///   gemini_api_key: "your-gemini-key"
///
/// endpoints:
///   elevenlabs_api_url: "https://api.elevenlabs.io"
///   elevenlabs_ws_url: "wss://api.elevenlabs.io"
///   google_translate_url: "https://translation.googleapis.com"
///   gemini_api_url: "https://generativelanguage.googleapis.com"
///
/// translation:
///   provider: "google"
///   model: "gemini-2.0-flash"
///   translate_interim_results: false
///
/// stt:
///   model: "scribe_v2_realtime"
///   sample_rate: 16000
///
/// languages:
///   default_input: "nl"
///   default_output: "en"
///
/// security:
///   cors_allowed_origins: "*"
///   rate_limit_requests_per_second: 60
///   rate_limit_burst_size: 10
///   max_websocket_connections: 1000
///   max_connections_per_ip: 100
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub providers: Option<ProvidersYaml>,
    pub endpoints: Option<EndpointsYaml>,
    pub translation: Option<TranslationYaml>,
    pub stt: Option<SttYaml>,
    pub languages: Option<LanguagesYaml>,
    pub security: Option<SecurityYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub tls: Option<TlsYaml>,
    /// Directory served for the browser client
    pub static_dir: Option<String>,
}

/// TLS configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TlsYaml {
    pub enabled: Option<bool>,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

/// Provider API keys from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ProvidersYaml {
    pub elevenlabs_api_key: Option<String>,
    /// Google Cloud Translation API key
    pub google_cloud_api_key: Option<String>,
    pub gemini_api_key: Option<String>,
}

/// Provider base URLs from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct EndpointsYaml {
    pub elevenlabs_api_url: Option<String>,
    pub elevenlabs_ws_url: Option<String>,
    pub google_translate_url: Option<String>,
    pub gemini_api_url: Option<String>,
}

/// Translation settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TranslationYaml {
    /// "google" or "gemini"
    pub provider: Option<String>,
    /// Model name, only used by gemini
    pub model: Option<String>,
    pub translate_interim_results: Option<bool>,
}

/// Speech-to-text settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SttYaml {
    pub model: Option<String>,
    pub sample_rate: Option<u32>,
}

/// Default language pair from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LanguagesYaml {
    pub default_input: Option<String>,
    pub default_output: Option<String>,
}

/// Security configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SecurityYaml {
    /// CORS allowed origins (comma-separated list or "*" for all)
    pub cors_allowed_origins: Option<String>,
    /// Maximum requests per second per IP address
    pub rate_limit_requests_per_second: Option<u32>,
    /// Maximum burst size for rate limiting
    pub rate_limit_burst_size: Option<u32>,
    /// Maximum concurrent WebSocket connections
    pub max_websocket_connections: Option<usize>,
    /// Maximum connections per IP address
    pub max_connections_per_ip: Option<u32>,
}

impl YamlConfig {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or the YAML is malformed.
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_config_full() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 8080
  static_dir: "web"

providers:
  elevenlabs_api_key: "el-key"
  google_cloud_api_key: "g-key"
  gemini_api_key: "gm-key"

endpoints:
  elevenlabs_ws_url: "ws://localhost:9000"

translation:
  provider: "gemini"
  model: "gemini-1.5-pro"
  translate_interim_results: true

stt:
  model: "scribe_v2_realtime"
  sample_rate: 48000

languages:
  default_input: "de"
  default_output: "fr"

security:
  cors_allowed_origins: "*"
  rate_limit_requests_per_second: 20
  max_connections_per_ip: 5
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();

        let server = config.server.unwrap();
        assert_eq!(server.host.as_deref(), Some("127.0.0.1"));
        assert_eq!(server.port, Some(8080));
        assert_eq!(server.static_dir.as_deref(), Some("web"));

        let providers = config.providers.unwrap();
        assert_eq!(providers.elevenlabs_api_key.as_deref(), Some("el-key"));
        assert_eq!(providers.google_cloud_api_key.as_deref(), Some("g-key"));
        assert_eq!(providers.gemini_api_key.as_deref(), Some("gm-key"));

        let endpoints = config.endpoints.unwrap();
        assert_eq!(
            endpoints.elevenlabs_ws_url.as_deref(),
            Some("ws://localhost:9000")
        );
        assert!(endpoints.gemini_api_url.is_none());

        let translation = config.translation.unwrap();
        assert_eq!(translation.provider.as_deref(), Some("gemini"));
        assert_eq!(translation.translate_interim_results, Some(true));

        assert_eq!(config.stt.unwrap().sample_rate, Some(48000));

        let languages = config.languages.unwrap();
        assert_eq!(languages.default_input.as_deref(), Some("de"));
        assert_eq!(languages.default_output.as_deref(), Some("fr"));

        let security = config.security.unwrap();
        assert_eq!(security.rate_limit_requests_per_second, Some(20));
        assert_eq!(security.max_connections_per_ip, Some(5));
        assert!(security.rate_limit_burst_size.is_none());
    }

    #[test]
    fn test_yaml_config_partial() {
        let yaml = r#"
server:
  port: 4000
"#;
        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        let server = config.server.unwrap();
        assert_eq!(server.port, Some(4000));
        assert!(server.host.is_none());
        assert!(config.providers.is_none());
        assert!(config.translation.is_none());
    }

    #[test]
    fn test_yaml_config_empty() {
        let config: YamlConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.server.is_none());
        assert!(config.security.is_none());
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "providers:\n  elevenlabs_api_key: \"file-key\"\n").unwrap();

        let config = YamlConfig::from_file(&path).unwrap();
        assert_eq!(
            config.providers.unwrap().elevenlabs_api_key.as_deref(),
            Some("file-key")
        );
    }

    #[test]
    fn test_from_file_not_found() {
        let result = YamlConfig::from_file(&PathBuf::from("/nonexistent/config.yaml"));
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }

    #[test]
    fn test_from_file_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.yaml");
        fs::write(&path, "server: [unterminated").unwrap();

        let result = YamlConfig::from_file(&path);
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse YAML config")
        );
    }
}
