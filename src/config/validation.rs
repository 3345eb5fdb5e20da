//! Configuration validation.

use super::{ServerConfig, TlsConfig};
use crate::core::stt::ElevenLabsAudioFormat;
use crate::core::translate::TranslationProvider;

/// Validate a fully merged configuration.
pub(super) fn validate_config(config: &ServerConfig) -> Result<(), String> {
    validate_tls(&config.tls)?;
    validate_translation_provider(&config.translation_provider)?;
    validate_sample_rate(config.stt_sample_rate)?;
    validate_language_code("default input language", &config.default_input_language)?;
    validate_language_code("default output language", &config.default_output_language)?;
    Ok(())
}

/// TLS certificate and key must exist when TLS is configured.
pub(super) fn validate_tls(tls: &Option<TlsConfig>) -> Result<(), String> {
    if let Some(tls) = tls {
        if !tls.cert_path.exists() {
            return Err(format!(
                "TLS certificate file not found: {}",
                tls.cert_path.display()
            ));
        }
        if !tls.key_path.exists() {
            return Err(format!(
                "TLS key file not found: {}",
                tls.key_path.display()
            ));
        }
    }
    Ok(())
}

pub(super) fn validate_translation_provider(provider: &str) -> Result<(), String> {
    provider
        .parse::<TranslationProvider>()
        .map(|_| ())
        .map_err(|e| e.to_string())
}

pub(super) fn validate_sample_rate(sample_rate: u32) -> Result<(), String> {
    ElevenLabsAudioFormat::from_sample_rate(sample_rate)
        .map(|_| ())
        .map_err(|e| e.to_string())
}

/// Accepts BCP-47 style codes such as `nl`, `fil`, `en-US` or `zh-Hant-TW`.
pub(crate) fn is_valid_language_code(code: &str) -> bool {
    let mut parts = code.split('-');

    let primary_ok = parts
        .next()
        .is_some_and(|p| (2..=3).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphabetic()));

    primary_ok && parts.all(|p| (2..=8).contains(&p.len()) && p.chars().all(|c| c.is_ascii_alphanumeric()))
}

pub(super) fn validate_language_code(label: &str, code: &str) -> Result<(), String> {
    if is_valid_language_code(code) {
        Ok(())
    } else {
        Err(format!("Invalid {label}: '{code}'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::NamedTempFile;

    #[test]
    fn test_language_codes() {
        for valid in ["nl", "en", "fil", "en-US", "zh-Hant-TW", "pt-BR"] {
            assert!(is_valid_language_code(valid), "{valid} should be valid");
        }
        for invalid in ["", "e", "english", "en_US", "en-", "1a", "en-U"] {
            assert!(!is_valid_language_code(invalid), "{invalid} should be invalid");
        }
    }

    #[test]
    fn test_validate_translation_provider() {
        assert!(validate_translation_provider("google").is_ok());
        assert!(validate_translation_provider("gemini").is_ok());
        let err = validate_translation_provider("deepl").unwrap_err();
        assert!(err.contains("Unsupported translation provider"));
    }

    #[test]
    fn test_validate_sample_rate() {
        assert!(validate_sample_rate(16000).is_ok());
        assert!(validate_sample_rate(44100).is_ok());
        assert!(validate_sample_rate(11025).is_err());
    }

    #[test]
    fn test_validate_tls() {
        assert!(validate_tls(&None).is_ok());

        let cert = NamedTempFile::new().unwrap();
        let key = NamedTempFile::new().unwrap();
        let present = Some(TlsConfig {
            cert_path: cert.path().to_path_buf(),
            key_path: key.path().to_path_buf(),
        });
        assert!(validate_tls(&present).is_ok());

        let missing = Some(TlsConfig {
            cert_path: PathBuf::from("/nonexistent/cert.pem"),
            key_path: key.path().to_path_buf(),
        });
        assert!(
            validate_tls(&missing)
                .unwrap_err()
                .contains("certificate file not found")
        );
    }

    #[test]
    fn test_validate_config_defaults() {
        assert!(validate_config(&ServerConfig::default()).is_ok());

        let mut config = ServerConfig::default();
        config.default_output_language = "english".to_string();
        assert!(validate_config(&config).unwrap_err().contains("output"));
    }
}
