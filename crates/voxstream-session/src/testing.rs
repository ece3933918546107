//! Scripted channel halves, sources and sinks for session tests.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::watch;
use voxstream_audio::{AudioRead, AudioSource};
use voxstream_core::{
    AudioError, ChannelError, SinkError, StreamingRequest, StreamingResponse,
};
use voxstream_sink::ResultSink;
use voxstream_transport::{RequestSender, ResponseReceiver};

#[derive(Default)]
pub struct Log {
    pub frames: Vec<StreamingRequest>,
    pub closes: usize,
}

impl Log {
    pub fn audio_frames(&self) -> Vec<Vec<u8>> {
        self.frames
            .iter()
            .filter_map(|f| match f {
                StreamingRequest::Audio(bytes) => Some(bytes.clone()),
                StreamingRequest::Config(_) => None,
            })
            .collect()
    }

    pub fn config_count(&self) -> usize {
        self.frames.iter().filter(|f| f.is_config()).count()
    }
}

/// Records every frame and half-close; can be told to fail.
pub struct LogSender {
    pub log: Arc<Mutex<Log>>,
    pub fail_config: bool,
    /// Fail the n-th audio frame (1-based).
    pub fail_audio_at: Option<usize>,
    audio_sent: usize,
    closed_tx: watch::Sender<bool>,
}

impl LogSender {
    /// Returns the sender, its log, and a signal raised on half-close.
    pub fn new() -> (Self, Arc<Mutex<Log>>, watch::Receiver<bool>) {
        let log = Arc::new(Mutex::new(Log::default()));
        let (closed_tx, closed_rx) = watch::channel(false);
        let sender = Self {
            log: Arc::clone(&log),
            fail_config: false,
            fail_audio_at: None,
            audio_sent: 0,
            closed_tx,
        };
        (sender, log, closed_rx)
    }
}

#[async_trait]
impl RequestSender for LogSender {
    async fn send(&mut self, request: StreamingRequest) -> Result<(), ChannelError> {
        if request.is_config() {
            if self.fail_config {
                return Err(ChannelError::SendFailed("config refused".to_string()));
            }
        } else {
            self.audio_sent += 1;
            if self.fail_audio_at == Some(self.audio_sent) {
                return Err(ChannelError::Closed);
            }
        }
        self.log.lock().unwrap().frames.push(request);
        Ok(())
    }

    async fn close_send(&mut self) -> Result<(), ChannelError> {
        self.log.lock().unwrap().closes += 1;
        let _ = self.closed_tx.send(true);
        Ok(())
    }
}

pub enum Step {
    Respond(StreamingResponse),
    Fail(ChannelError),
    /// End of stream right away.
    End,
    /// End of stream once the client has half-closed.
    EndAfterClose,
    /// Never yield anything.
    Hang,
}

/// Plays back a script of receive outcomes.
pub struct ScriptedReceiver {
    steps: VecDeque<Step>,
    closed_rx: watch::Receiver<bool>,
}

impl ScriptedReceiver {
    pub fn new(steps: Vec<Step>, closed_rx: watch::Receiver<bool>) -> Self {
        Self {
            steps: steps.into(),
            closed_rx,
        }
    }
}

#[async_trait]
impl ResponseReceiver for ScriptedReceiver {
    async fn recv(&mut self) -> Result<Option<StreamingResponse>, ChannelError> {
        match self.steps.pop_front() {
            Some(Step::Respond(response)) => Ok(Some(response)),
            Some(Step::Fail(e)) => Err(e),
            Some(Step::End) | None => Ok(None),
            Some(Step::EndAfterClose) => {
                // Cancel-safe: put the step back until the close is observed.
                self.steps.push_front(Step::EndAfterClose);
                let _ = self.closed_rx.wait_for(|closed| *closed).await;
                self.steps.pop_front();
                Ok(None)
            }
            Some(Step::Hang) => {
                self.steps.push_front(Step::Hang);
                std::future::pending().await
            }
        }
    }
}

pub enum Read {
    Bytes(Vec<u8>),
    Empty,
    Fail,
    Delay(Duration),
}

/// Replays read outcomes, then reports end of input with the last bytes.
pub struct ScriptedSource {
    steps: VecDeque<Read>,
}

impl ScriptedSource {
    pub fn new(steps: Vec<Read>) -> Self {
        Self {
            steps: steps.into(),
        }
    }
}

#[async_trait]
impl AudioSource for ScriptedSource {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<AudioRead, AudioError> {
        loop {
            match self.steps.pop_front() {
                None => return Ok(AudioRead::End(0)),
                Some(Read::Delay(d)) => tokio::time::sleep(d).await,
                Some(Read::Empty) => return Ok(AudioRead::Data(0)),
                Some(Read::Fail) => {
                    return Err(AudioError::Read(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        "disk gone",
                    )))
                }
                Some(Read::Bytes(bytes)) => {
                    buf[..bytes.len()].copy_from_slice(&bytes);
                    return if self.steps.is_empty() {
                        Ok(AudioRead::End(bytes.len()))
                    } else {
                        Ok(AudioRead::Data(bytes.len()))
                    };
                }
            }
        }
    }
}

/// Never reaches end of input on its own.
pub struct EndlessSource;

#[async_trait]
impl AudioSource for EndlessSource {
    fn name(&self) -> &str {
        "endless"
    }

    async fn read(&mut self, buf: &mut [u8]) -> Result<AudioRead, AudioError> {
        tokio::time::sleep(Duration::from_millis(2)).await;
        buf.fill(0);
        Ok(AudioRead::Data(buf.len()))
    }
}

/// Keeps every rendered transcript; optionally fails on the n-th call.
#[derive(Default)]
pub struct CollectingSink {
    pub transcripts: Vec<String>,
    pub calls: usize,
    /// 1-based call number that fails.
    pub fail_on: Option<usize>,
}

#[async_trait]
impl ResultSink for CollectingSink {
    fn name(&self) -> &str {
        "collect"
    }

    async fn initialize(&mut self, _config: toml::Value) -> Result<(), SinkError> {
        Ok(())
    }

    async fn render(&mut self, response: &StreamingResponse) -> Result<(), SinkError> {
        self.calls += 1;
        if self.fail_on == Some(self.calls) {
            return Err(SinkError::RenderFailed("terminal detached".to_string()));
        }
        self.transcripts
            .push(response.top_transcript().unwrap_or_default().to_string());
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}
