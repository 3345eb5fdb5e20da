mod base;
pub mod elevenlabs;

// Re-export public types and traits
pub use base::{
    BaseSTT, STTConfig, STTError, STTErrorCallback, STTResult, STTResultCallback,
};

// Re-export ElevenLabs implementation
pub use elevenlabs::{
    COMMIT_STRATEGY, ElevenLabsAudioFormat, ElevenLabsMessage, ElevenLabsSTT, ElevenLabsSTTConfig,
    TokenError, request_single_use_token,
};

/// Supported STT providers
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum STTProvider {
    /// ElevenLabs realtime Scribe WebSocket API
    ElevenLabs,
}

impl std::fmt::Display for STTProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            STTProvider::ElevenLabs => write!(f, "elevenlabs"),
        }
    }
}

impl std::str::FromStr for STTProvider {
    type Err = STTError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "elevenlabs" | "eleven-labs" | "scribe" => Ok(STTProvider::ElevenLabs),
            _ => Err(STTError::ConfigurationError(format!(
                "Unsupported STT provider: {s}. Supported providers: elevenlabs"
            ))),
        }
    }
}

/// Factory function to create STT providers by name
///
/// # Arguments
/// * `provider` - The name of the STT provider (e.g., "elevenlabs")
/// * `config` - Configuration for the STT provider
///
/// # Examples
/// ```rust,no_run
/// use translate_gateway::core::stt::{create_stt_provider, STTConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = STTConfig {
///         api_key: "your-elevenlabs-api-key".to_string(),
///         language: "nl".to_string(),
///         ..Default::default()
///     };
///
///     let mut stt = create_stt_provider("elevenlabs", config)?;
///     stt.connect().await?;
///     stt.send_audio(vec![0u8; 1024].into()).await?;
///     Ok(())
/// }
/// ```
pub fn create_stt_provider(
    provider: &str,
    config: STTConfig,
) -> Result<Box<dyn BaseSTT>, STTError> {
    create_stt_provider_from_enum(provider.parse()?, config)
}

/// Factory function to create STT providers using the enum directly
pub fn create_stt_provider_from_enum(
    provider: STTProvider,
    config: STTConfig,
) -> Result<Box<dyn BaseSTT>, STTError> {
    match provider {
        STTProvider::ElevenLabs => Ok(Box::new(ElevenLabsSTT::new(config)?)),
    }
}

/// Get a list of all supported STT providers
pub fn get_supported_stt_providers() -> Vec<&'static str> {
    vec!["elevenlabs"]
}
