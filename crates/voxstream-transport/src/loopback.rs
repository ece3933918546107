use crate::channel::{RecognitionChannel, ServerEnd};
use crate::transport_trait::Transport;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::task::JoinHandle;
use voxstream_core::{
    AudioEncoding, ChannelError, SpeechRecognitionAlternative, SpeechRecognitionResult,
    StreamingConfig, StreamingRecognitionResult, StreamingRequest, StreamingResponse,
};

const DEFAULT_CAPACITY: usize = 16;
const DEFAULT_INTERIM_EVERY: usize = 1;

/// In-process stand-in recognizer.
///
/// Every opened stream is served by a task that expects the streaming
/// config first, emits an interim result every `interim_every` audio
/// chunks when interim results are enabled, and answers the client's
/// half-close with one final result describing the audio it received.
pub struct LoopbackTransport {
    capacity: usize,
    interim_every: usize,
    open_count: AtomicUsize,
    servers: Mutex<Vec<JoinHandle<()>>>,
}

impl LoopbackTransport {
    pub fn new() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            interim_every: DEFAULT_INTERIM_EVERY,
            open_count: AtomicUsize::new(0),
            servers: Mutex::new(Vec::new()),
        }
    }

    pub fn open_count(&self) -> usize {
        self.open_count.load(Ordering::Relaxed)
    }
}

impl Default for LoopbackTransport {
    fn default() -> Self {
        Self::new()
    }
}

fn positive_setting(config: &toml::Value, key: &str, default: usize) -> Result<usize, ChannelError> {
    match config.get(key) {
        None => Ok(default),
        Some(value) => value
            .as_integer()
            .filter(|n| *n > 0)
            .map(|n| n as usize)
            .ok_or_else(|| {
                ChannelError::InitializationFailed(format!("'{key}' must be a positive integer"))
            }),
    }
}

fn bytes_per_second(config: &StreamingConfig) -> Option<f64> {
    let sample_width = match config.config.encoding {
        AudioEncoding::Linear16 => 2,
        AudioEncoding::Linear32F => 4,
        AudioEncoding::Alaw | AudioEncoding::Mulaw => 1,
        AudioEncoding::RawOpus | AudioEncoding::MpegAudio => return None,
    };
    let rate = f64::from(config.config.sample_rate_hertz)
        * f64::from(config.config.num_channels)
        * f64::from(sample_width);
    (rate > 0.0).then_some(rate)
}

fn describe(
    config: &StreamingConfig,
    total_bytes: usize,
    chunks: usize,
    is_final: bool,
) -> StreamingResponse {
    let end_time = bytes_per_second(config)
        .map(|rate| total_bytes as f64 / rate)
        .unwrap_or_default();
    StreamingResponse {
        results: vec![StreamingRecognitionResult {
            recognition_result: SpeechRecognitionResult {
                alternatives: vec![SpeechRecognitionAlternative {
                    transcript: format!("[loopback] {total_bytes} bytes in {chunks} chunks"),
                    confidence: 1.0,
                }],
                channel: 0,
                start_time: 0.0,
                end_time,
            },
            is_final,
            stability: if is_final { 1.0 } else { 0.5 },
        }],
    }
}

async fn serve(mut server: ServerEnd, interim_every: usize) {
    let config = match server.requests.recv().await {
        Some(StreamingRequest::Config(config)) => config,
        Some(StreamingRequest::Audio(_)) => {
            tracing::warn!("loopback: stream opened without a streaming config");
            let _ = server
                .responses
                .send(Err(ChannelError::ReceiveFailed(
                    "first request must carry the streaming config".to_string(),
                )))
                .await;
            return;
        }
        None => {
            tracing::debug!("loopback: client closed before sending a config");
            return;
        }
    };

    tracing::debug!(
        encoding = %config.config.encoding,
        sample_rate = config.config.sample_rate_hertz,
        language = %config.config.language_code,
        vad = ?config.config.vad,
        "loopback: session configured"
    );

    let interim = config.interim_results_config.enable_interim_results;
    let mut total_bytes = 0usize;
    let mut chunks = 0usize;

    while let Some(request) = server.requests.recv().await {
        match request {
            StreamingRequest::Config(_) => {
                let _ = server
                    .responses
                    .send(Err(ChannelError::ReceiveFailed(
                        "streaming config may only be sent once".to_string(),
                    )))
                    .await;
                return;
            }
            StreamingRequest::Audio(bytes) => {
                total_bytes += bytes.len();
                chunks += 1;
                tracing::trace!(chunk = chunks, bytes = bytes.len(), "loopback: audio");
                if interim && chunks % interim_every == 0 {
                    let response = describe(&config, total_bytes, chunks, false);
                    if server.responses.send(Ok(response)).await.is_err() {
                        tracing::debug!("loopback: client stopped receiving");
                        return;
                    }
                }
            }
        }
    }

    let _ = server
        .responses
        .send(Ok(describe(&config, total_bytes, chunks, true)))
        .await;
    tracing::debug!(total_bytes, chunks, "loopback: stream finished");
}

#[async_trait]
impl Transport for LoopbackTransport {
    fn name(&self) -> &str {
        "loopback"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), ChannelError> {
        self.capacity = positive_setting(&config, "capacity", DEFAULT_CAPACITY)?;
        self.interim_every = positive_setting(&config, "interim_every", DEFAULT_INTERIM_EVERY)?;
        Ok(())
    }

    async fn open(&self) -> Result<RecognitionChannel, ChannelError> {
        let (channel, server) = RecognitionChannel::in_memory(self.capacity);
        let handle = tokio::spawn(serve(server, self.interim_every));
        self.servers
            .lock()
            .map_err(|_| ChannelError::OpenFailed("server list poisoned".to_string()))?
            .push(handle);
        let count = self.open_count.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::debug!("loopback stream #{count} opened");
        Ok(channel)
    }

    async fn shutdown(&self) -> Result<(), ChannelError> {
        let handles = match self.servers.lock() {
            Ok(mut servers) => std::mem::take(&mut *servers),
            Err(_) => return Ok(()),
        };
        for handle in handles {
            if let Err(e) = handle.await {
                tracing::warn!("loopback server task failed: {e}");
            }
        }
        Ok(())
    }
}
