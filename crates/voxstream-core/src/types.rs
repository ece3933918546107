use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ── Request side ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AudioEncoding {
    #[serde(rename = "LINEAR16")]
    Linear16,
    #[serde(rename = "ALAW")]
    Alaw,
    #[serde(rename = "MULAW")]
    Mulaw,
    #[serde(rename = "LINEAR32F")]
    Linear32F,
    #[serde(rename = "RAW_OPUS")]
    RawOpus,
    #[serde(rename = "MPEG_AUDIO")]
    MpegAudio,
}

impl AudioEncoding {
    pub fn as_str(&self) -> &'static str {
        match self {
            AudioEncoding::Linear16 => "LINEAR16",
            AudioEncoding::Alaw => "ALAW",
            AudioEncoding::Mulaw => "MULAW",
            AudioEncoding::Linear32F => "LINEAR32F",
            AudioEncoding::RawOpus => "RAW_OPUS",
            AudioEncoding::MpegAudio => "MPEG_AUDIO",
        }
    }
}

impl fmt::Display for AudioEncoding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AudioEncoding {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "LINEAR16" => Ok(AudioEncoding::Linear16),
            "ALAW" => Ok(AudioEncoding::Alaw),
            "MULAW" => Ok(AudioEncoding::Mulaw),
            "LINEAR32F" => Ok(AudioEncoding::Linear32F),
            "RAW_OPUS" => Ok(AudioEncoding::RawOpus),
            "MPEG_AUDIO" => Ok(AudioEncoding::MpegAudio),
            other => Err(ConfigError::Invalid(format!("unknown audio encoding '{other}'"))),
        }
    }
}

/// Server-side voice activity detection for one session.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum VadMode {
    /// The recognizer processes the whole stream as one segment.
    Disabled,
    /// Utterances end after `silence_duration_threshold` seconds of silence.
    Enabled { silence_duration_threshold: f32 },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionConfig {
    pub encoding: AudioEncoding,
    pub sample_rate_hertz: u32,
    pub language_code: String,
    pub max_alternatives: u32,
    pub profanity_filter: bool,
    pub enable_automatic_punctuation: bool,
    pub num_channels: u32,
    pub vad: VadMode,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InterimResultsConfig {
    pub enable_interim_results: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StreamingConfig {
    pub config: RecognitionConfig,
    pub single_utterance: bool,
    pub interim_results_config: InterimResultsConfig,
}

/// A frame on the send direction of a recognition channel.
///
/// Exactly one `Config` frame opens a session; `Audio` frames follow it in
/// read order.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamingRequest {
    Config(StreamingConfig),
    Audio(Vec<u8>),
}

impl StreamingRequest {
    pub fn is_config(&self) -> bool {
        matches!(self, StreamingRequest::Config(_))
    }
}

/// User-facing recognition options, as given on the command line or in
/// the `[recognition]` section of the config file.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecognitionOptions {
    #[serde(default = "default_encoding")]
    pub encoding: AudioEncoding,

    #[serde(default = "default_rate")]
    pub rate: u32,

    #[serde(default = "default_num_channels")]
    pub num_channels: u16,

    #[serde(default = "default_language_code")]
    pub language_code: String,

    #[serde(default = "default_max_alternatives")]
    pub max_alternatives: u32,

    #[serde(default)]
    pub disable_profanity_filter: bool,

    #[serde(default)]
    pub disable_automatic_punctuation: bool,

    #[serde(default)]
    pub single_utterance: bool,

    #[serde(default)]
    pub interim_results: bool,

    #[serde(default)]
    pub do_not_perform_vad: bool,

    #[serde(default = "default_silence_duration_threshold")]
    pub silence_duration_threshold: f32,
}

fn default_encoding() -> AudioEncoding {
    AudioEncoding::Linear16
}

fn default_rate() -> u32 {
    16000
}

fn default_num_channels() -> u16 {
    1
}

fn default_language_code() -> String {
    "ru-RU".to_string()
}

fn default_max_alternatives() -> u32 {
    1
}

fn default_silence_duration_threshold() -> f32 {
    0.6
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self {
            encoding: default_encoding(),
            rate: default_rate(),
            num_channels: default_num_channels(),
            language_code: default_language_code(),
            max_alternatives: default_max_alternatives(),
            disable_profanity_filter: false,
            disable_automatic_punctuation: false,
            single_utterance: false,
            interim_results: false,
            do_not_perform_vad: false,
            silence_duration_threshold: default_silence_duration_threshold(),
        }
    }
}

impl RecognitionOptions {
    pub fn vad_mode(&self) -> VadMode {
        if self.do_not_perform_vad {
            VadMode::Disabled
        } else {
            VadMode::Enabled {
                silence_duration_threshold: self.silence_duration_threshold,
            }
        }
    }

    /// Build the payload of the session's single config frame.
    pub fn to_streaming_config(&self) -> StreamingConfig {
        StreamingConfig {
            config: RecognitionConfig {
                encoding: self.encoding,
                sample_rate_hertz: self.rate,
                language_code: self.language_code.clone(),
                max_alternatives: self.max_alternatives,
                profanity_filter: !self.disable_profanity_filter,
                enable_automatic_punctuation: !self.disable_automatic_punctuation,
                num_channels: u32::from(self.num_channels),
                vad: self.vad_mode(),
            },
            single_utterance: self.single_utterance,
            interim_results_config: InterimResultsConfig {
                enable_interim_results: self.interim_results,
            },
        }
    }
}

// ── Response side ─────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingResponse {
    #[serde(default)]
    pub results: Vec<StreamingRecognitionResult>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreamingRecognitionResult {
    pub recognition_result: SpeechRecognitionResult,
    pub is_final: bool,
    #[serde(default)]
    pub stability: f32,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRecognitionResult {
    #[serde(default)]
    pub alternatives: Vec<SpeechRecognitionAlternative>,
    #[serde(default)]
    pub channel: u32,
    /// Seconds from the start of the stream.
    #[serde(default)]
    pub start_time: f64,
    #[serde(default)]
    pub end_time: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeechRecognitionAlternative {
    pub transcript: String,
    #[serde(default)]
    pub confidence: f32,
}

impl StreamingResponse {
    /// A response carrying a single one-alternative result.
    pub fn single(transcript: impl Into<String>, is_final: bool) -> Self {
        Self {
            results: vec![StreamingRecognitionResult {
                recognition_result: SpeechRecognitionResult {
                    alternatives: vec![SpeechRecognitionAlternative {
                        transcript: transcript.into(),
                        confidence: 1.0,
                    }],
                    ..Default::default()
                },
                is_final,
                stability: if is_final { 1.0 } else { 0.0 },
            }],
        }
    }

    /// Transcript of the first alternative of the first result, if any.
    pub fn top_transcript(&self) -> Option<&str> {
        self.results
            .first()
            .and_then(|r| r.recognition_result.alternatives.first())
            .map(|a| a.transcript.as_str())
    }

    pub fn is_final(&self) -> bool {
        self.results.iter().any(|r| r.is_final)
    }
}
