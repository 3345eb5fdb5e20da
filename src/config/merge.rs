//! Merging YAML overrides onto the environment configuration.

use std::path::PathBuf;

use super::yaml::YamlConfig;
use super::{ServerConfig, TlsConfig, env};

/// Load the environment configuration and apply YAML overrides on top.
pub(super) fn merge_config(
    yaml: Option<YamlConfig>,
) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let mut config = env::load_from_env()?;

    let Some(yaml) = yaml else {
        return Ok(config);
    };

    if let Some(server) = yaml.server {
        if let Some(host) = server.host {
            config.host = host;
        }
        if let Some(port) = server.port {
            config.port = port;
        }
        if let Some(dir) = server.static_dir {
            config.static_dir = PathBuf::from(dir);
        }
        if let Some(tls) = server.tls {
            if tls.enabled == Some(false) {
                config.tls = None;
            } else {
                match (tls.cert_path, tls.key_path) {
                    (Some(cert), Some(key)) => {
                        config.tls = Some(TlsConfig {
                            cert_path: PathBuf::from(cert),
                            key_path: PathBuf::from(key),
                        });
                    }
                    (None, None) => {}
                    _ => {
                        return Err(
                            "server.tls requires both cert_path and key_path".into()
                        );
                    }
                }
            }
        }
    }

    if let Some(providers) = yaml.providers {
        if providers.elevenlabs_api_key.is_some() {
            config.elevenlabs_api_key = providers.elevenlabs_api_key;
        }
        if providers.google_cloud_api_key.is_some() {
            config.google_translate_api_key = providers.google_cloud_api_key;
        }
        if providers.gemini_api_key.is_some() {
            config.gemini_api_key = providers.gemini_api_key;
        }
    }

    if let Some(endpoints) = yaml.endpoints {
        if let Some(url) = endpoints.elevenlabs_api_url {
            config.elevenlabs_api_url = url;
        }
        if let Some(url) = endpoints.elevenlabs_ws_url {
            config.elevenlabs_ws_url = url;
        }
        if endpoints.google_translate_url.is_some() {
            config.google_translate_url = endpoints.google_translate_url;
        }
        if endpoints.gemini_api_url.is_some() {
            config.gemini_api_url = endpoints.gemini_api_url;
        }
    }

    if let Some(translation) = yaml.translation {
        if let Some(provider) = translation.provider {
            config.translation_provider = super::normalize_translation_provider(&provider);
        }
        if translation.model.is_some() {
            config.translation_model = translation.model;
        }
        if let Some(flag) = translation.translate_interim_results {
            config.translate_interim_results = flag;
        }
    }

    if let Some(stt) = yaml.stt {
        if let Some(model) = stt.model {
            config.stt_model = model;
        }
        if let Some(rate) = stt.sample_rate {
            config.stt_sample_rate = rate;
        }
    }

    if let Some(languages) = yaml.languages {
        if let Some(input) = languages.default_input {
            config.default_input_language = input;
        }
        if let Some(output) = languages.default_output {
            config.default_output_language = output;
        }
    }

    if let Some(security) = yaml.security {
        if security.cors_allowed_origins.is_some() {
            config.cors_allowed_origins = security.cors_allowed_origins;
        }
        if let Some(rps) = security.rate_limit_requests_per_second {
            config.rate_limit_requests_per_second = rps;
        }
        if let Some(burst) = security.rate_limit_burst_size {
            config.rate_limit_burst_size = burst;
        }
        if security.max_websocket_connections.is_some() {
            config.max_websocket_connections = security.max_websocket_connections;
        }
        if let Some(per_ip) = security.max_connections_per_ip {
            config.max_connections_per_ip = per_ip;
        }
    }

    Ok(config)
}
