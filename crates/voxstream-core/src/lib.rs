pub mod config;
pub mod error;
pub mod types;

pub use config::{AppConfig, DEFAULT_CHUNK_SIZE};
pub use error::{AudioError, ChannelError, ConfigError, SessionError, SessionPhase, SinkError};
pub use types::{
    AudioEncoding, InterimResultsConfig, RecognitionConfig, RecognitionOptions,
    SpeechRecognitionAlternative, SpeechRecognitionResult, StreamingConfig,
    StreamingRecognitionResult, StreamingRequest, StreamingResponse, VadMode,
};
