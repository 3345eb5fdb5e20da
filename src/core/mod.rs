pub mod relay;
pub mod stt;
pub mod translate;

// Re-export commonly used types for convenience
pub use stt::{
    BaseSTT, ElevenLabsSTT, STTConfig, STTError, STTProvider, STTResult, STTResultCallback,
    create_stt_provider, create_stt_provider_from_enum, get_supported_stt_providers,
};

pub use translate::{
    BaseTranslator, GeminiTranslator, GoogleTranslator, TranslationError, TranslationProvider,
    TranslatorConfig, create_translator, translate_or_passthrough,
};

pub use relay::{LanguagePair, RelayOutput, TranscriptRouter};
