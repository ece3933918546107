use std::fmt;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("invalid config value: {0}")]
    Invalid(String),
}

#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to open audio input: {0}")]
    Open(String),

    #[error("failed to read audio input: {0}")]
    Read(#[from] std::io::Error),

    #[error("failed to decode WAV container: {0}")]
    Decode(String),

    #[error("audio format mismatch: {0}")]
    FormatMismatch(String),

    #[error("unsupported audio encoding: {0}")]
    UnsupportedEncoding(String),
}

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("transport not found: {0}")]
    NotFound(String),

    #[error("transport initialization failed: {0}")]
    InitializationFailed(String),

    #[error("failed to open recognition channel: {0}")]
    OpenFailed(String),

    #[error("failed to send request: {0}")]
    SendFailed(String),

    #[error("failed to receive response: {0}")]
    ReceiveFailed(String),

    #[error("recognition channel closed")]
    Closed,
}

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("sink not found: {0}")]
    NotFound(String),

    #[error("sink initialization failed: {0}")]
    InitializationFailed(String),

    #[error("failed to render result: {0}")]
    RenderFailed(String),
}

/// The part of a streaming session a fatal error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Setup,
    ConfigSend,
    AudioStreaming,
    ResultReceiving,
    ResultRendering,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SessionPhase::Setup => "setup",
            SessionPhase::ConfigSend => "config send",
            SessionPhase::AudioStreaming => "audio streaming",
            SessionPhase::ResultReceiving => "result receiving",
            SessionPhase::ResultRendering => "result rendering",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("chunk size must be greater than zero")]
    InvalidChunkSize,

    #[error("config send failed: {0}")]
    ConfigSend(ChannelError),

    #[error("audio streaming failed: {0}")]
    AudioRead(AudioError),

    #[error("audio streaming failed: {0}")]
    AudioSend(ChannelError),

    #[error("result receiving failed: {0}")]
    ResultReceive(ChannelError),

    #[error("result rendering failed: {0}")]
    ResultRender(SinkError),

    #[error("audio task failed: {0}")]
    TaskFailed(String),
}

impl SessionError {
    pub fn phase(&self) -> SessionPhase {
        match self {
            SessionError::InvalidChunkSize => SessionPhase::Setup,
            SessionError::ConfigSend(_) => SessionPhase::ConfigSend,
            SessionError::AudioRead(_)
            | SessionError::AudioSend(_)
            | SessionError::TaskFailed(_) => SessionPhase::AudioStreaming,
            SessionError::ResultReceive(_) => SessionPhase::ResultReceiving,
            SessionError::ResultRender(_) => SessionPhase::ResultRendering,
        }
    }
}
