use crate::error::ConfigError;
use crate::types::RecognitionOptions;
use regex::Regex;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub streaming: StreamingSettings,

    #[serde(default)]
    pub recognition: RecognitionOptions,

    #[serde(default)]
    pub transport: TransportConfig,

    #[serde(default)]
    pub sink: SinkConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct GeneralConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct StreamingSettings {
    /// Bytes read from the audio source per audio frame.
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

impl Default for StreamingSettings {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct TransportConfig {
    #[serde(default = "default_transport")]
    pub name: String,

    #[serde(flatten)]
    pub extra: toml::Table,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            name: default_transport(),
            extra: toml::Table::new(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct SinkConfig {
    #[serde(default = "default_sink")]
    pub plugin: String,

    #[serde(flatten)]
    pub extra: toml::Table,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            plugin: default_sink(),
            extra: toml::Table::new(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

pub const DEFAULT_CHUNK_SIZE: usize = 1024;

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

fn default_transport() -> String {
    "loopback".to_string()
}

fn default_sink() -> String {
    "stdout".to_string()
}

/// Interpolate `${VAR}` patterns with environment variable values.
fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let re = Regex::new(r"\$\{([^}]+)\}").expect("static regex is valid");
    let mut result = input.to_string();

    for cap in re.captures_iter(input) {
        let var_name = &cap[1];
        let val = std::env::var(var_name)
            .map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
        tracing::debug!(var = var_name, "interpolated config variable");
        result = result.replace(&cap[0], &val);
    }

    Ok(result)
}

impl AppConfig {
    /// Load configuration from a TOML file, with environment variable interpolation.
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        tracing::debug!(path = ?path, "loading config");
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let interpolated = interpolate_env_vars(s)?;
        let config: AppConfig = toml::from_str(&interpolated)?;
        config.validate()?;
        tracing::debug!(
            transport = %config.transport.name,
            sink = %config.sink.plugin,
            chunk_size = config.streaming.chunk_size,
            "config parsed"
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.streaming.chunk_size == 0 {
            return Err(ConfigError::Invalid(
                "streaming.chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.recognition.rate == 0 {
            return Err(ConfigError::Invalid(
                "recognition.rate must be greater than zero".to_string(),
            ));
        }
        if self.recognition.num_channels == 0 {
            return Err(ConfigError::Invalid(
                "recognition.num_channels must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Transport settings passed to `Transport::initialize`.
    pub fn transport_settings(&self) -> toml::Value {
        toml::Value::Table(self.transport.extra.clone())
    }

    /// Sink settings passed to `ResultSink::initialize`.
    pub fn sink_settings(&self) -> toml::Value {
        toml::Value::Table(self.sink.extra.clone())
    }
}
