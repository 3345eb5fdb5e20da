//! Environment variable loading.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use super::{ServerConfig, TlsConfig};

/// Read a variable, treating empty values as unset.
pub(super) fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Parse a variable into `T`, naming the variable in the error.
pub(super) fn parse_env<T>(name: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_var(name) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| format!("Invalid value for {name}: '{raw}' ({e})")),
        None => Ok(None),
    }
}

/// Parse a boolean flag. Accepts true/false, 1/0, yes/no and on/off.
pub(super) fn parse_bool_env(name: &str) -> Result<Option<bool>, String> {
    match env_var(name) {
        Some(raw) => match raw.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Ok(Some(true)),
            "false" | "0" | "no" | "off" => Ok(Some(false)),
            _ => Err(format!("Invalid boolean for {name}: '{raw}'")),
        },
        None => Ok(None),
    }
}

/// Build a configuration from environment variables on top of defaults.
pub(super) fn load_from_env() -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let mut config = ServerConfig::default();

    if let Some(host) = env_var("HOST") {
        config.host = host;
    }
    if let Some(port) = parse_env::<u16>("PORT")? {
        config.port = port;
    }

    config.tls = match (env_var("TLS_CERT_PATH"), env_var("TLS_KEY_PATH")) {
        (Some(cert), Some(key)) => Some(TlsConfig {
            cert_path: PathBuf::from(cert),
            key_path: PathBuf::from(key),
        }),
        (None, None) => None,
        _ => return Err("TLS_CERT_PATH and TLS_KEY_PATH must be set together".into()),
    };

    config.elevenlabs_api_key = env_var("ELEVENLABS_API_KEY");
    config.google_translate_api_key = env_var("GOOGLE_CLOUD_API_KEY");
    config.gemini_api_key = env_var("GEMINI_API_KEY");

    if let Some(provider) = env_var("TRANSLATION_PROVIDER") {
        config.translation_provider = super::normalize_translation_provider(&provider);
    }
    config.translation_model = env_var("TRANSLATION_MODEL");
    if let Some(flag) = parse_bool_env("TRANSLATE_INTERIM_RESULTS")? {
        config.translate_interim_results = flag;
    }

    if let Some(url) = env_var("ELEVENLABS_API_URL") {
        config.elevenlabs_api_url = url;
    }
    if let Some(url) = env_var("ELEVENLABS_WS_URL") {
        config.elevenlabs_ws_url = url;
    }
    config.google_translate_url = env_var("GOOGLE_TRANSLATE_URL");
    config.gemini_api_url = env_var("GEMINI_API_URL");

    if let Some(model) = env_var("STT_MODEL") {
        config.stt_model = model;
    }
    if let Some(rate) = parse_env::<u32>("STT_SAMPLE_RATE")? {
        config.stt_sample_rate = rate;
    }

    if let Some(lang) = env_var("DEFAULT_INPUT_LANGUAGE") {
        config.default_input_language = lang;
    }
    if let Some(lang) = env_var("DEFAULT_OUTPUT_LANGUAGE") {
        config.default_output_language = lang;
    }

    if let Some(dir) = env_var("STATIC_DIR") {
        config.static_dir = PathBuf::from(dir);
    }

    config.cors_allowed_origins = env_var("CORS_ALLOWED_ORIGINS");
    if let Some(rps) = parse_env::<u32>("RATE_LIMIT_REQUESTS_PER_SECOND")? {
        config.rate_limit_requests_per_second = rps;
    }
    if let Some(burst) = parse_env::<u32>("RATE_LIMIT_BURST_SIZE")? {
        config.rate_limit_burst_size = burst;
    }
    config.max_websocket_connections = parse_env::<usize>("MAX_WEBSOCKET_CONNECTIONS")?;
    if let Some(per_ip) = parse_env::<u32>("MAX_CONNECTIONS_PER_IP")? {
        config.max_connections_per_ip = per_ip;
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_env_var_ignores_blank() {
        unsafe {
            env::set_var("GATEWAY_TEST_BLANK", "   ");
        }
        assert!(env_var("GATEWAY_TEST_BLANK").is_none());
        unsafe {
            env::remove_var("GATEWAY_TEST_BLANK");
        }
    }

    #[test]
    #[serial]
    fn test_parse_env_reports_variable() {
        unsafe {
            env::set_var("GATEWAY_TEST_PORT", "eighty");
        }
        let err = parse_env::<u16>("GATEWAY_TEST_PORT").unwrap_err();
        assert!(err.contains("GATEWAY_TEST_PORT"));
        assert!(err.contains("eighty"));
        unsafe {
            env::remove_var("GATEWAY_TEST_PORT");
        }
    }

    #[test]
    #[serial]
    fn test_parse_bool_env_variants() {
        for (raw, expected) in [("TRUE", true), ("1", true), ("off", false), ("no", false)] {
            unsafe {
                env::set_var("GATEWAY_TEST_FLAG", raw);
            }
            assert_eq!(parse_bool_env("GATEWAY_TEST_FLAG").unwrap(), Some(expected));
        }

        unsafe {
            env::set_var("GATEWAY_TEST_FLAG", "maybe");
        }
        assert!(parse_bool_env("GATEWAY_TEST_FLAG").is_err());

        unsafe {
            env::remove_var("GATEWAY_TEST_FLAG");
        }
        assert_eq!(parse_bool_env("GATEWAY_TEST_FLAG").unwrap(), None);
    }
}
