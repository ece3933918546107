use crate::sender::{stream_audio, AudioStats, ConfiguredSender};
use tokio::sync::watch;
use tokio::task::JoinError;
use voxstream_audio::AudioSource;
use voxstream_core::{SessionError, StreamingConfig};
use voxstream_sink::ResultSink;
use voxstream_transport::RecognitionChannel;

/// Totals reported by a session that finished without error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub chunks_sent: usize,
    pub bytes_sent: usize,
    pub responses_rendered: usize,
    /// The server ended the stream before all audio was sent.
    pub audio_cancelled: bool,
}

/// One streaming recognition session: one channel, one audio source.
pub struct StreamingSession {
    channel: RecognitionChannel,
    source: Box<dyn AudioSource>,
    chunk_size: usize,
}

fn flatten_join(
    joined: Result<Result<AudioStats, SessionError>, JoinError>,
) -> Result<AudioStats, SessionError> {
    joined.unwrap_or_else(|e| Err(SessionError::TaskFailed(e.to_string())))
}

impl StreamingSession {
    pub fn new(
        channel: RecognitionChannel,
        source: Box<dyn AudioSource>,
        chunk_size: usize,
    ) -> Result<Self, SessionError> {
        if chunk_size == 0 {
            return Err(SessionError::InvalidChunkSize);
        }
        Ok(Self {
            channel,
            source,
            chunk_size,
        })
    }

    /// Drive the session to completion.
    ///
    /// Sends `config` first, then streams audio on a spawned task while
    /// rendering responses into `sink` on the calling task. Returns once
    /// the receive side has ended and the audio task has half-closed the
    /// send side. The first fatal error is returned; the other activity is
    /// cancelled and joined before that happens.
    pub async fn run(
        self,
        config: StreamingConfig,
        sink: &mut dyn ResultSink,
    ) -> Result<SessionSummary, SessionError> {
        let (sender, mut receiver) = self.channel.into_split();

        tracing::debug!(
            encoding = %config.config.encoding,
            sample_rate = config.config.sample_rate_hertz,
            vad = ?config.config.vad,
            single_utterance = config.single_utterance,
            interim_results = config.interim_results_config.enable_interim_results,
            "sending streaming config"
        );
        let sender = ConfiguredSender::configure(sender, config)
            .await
            .map_err(SessionError::ConfigSend)?;

        let (cancel_tx, cancel_rx) = watch::channel(false);
        tracing::info!(
            source = %self.source.name(),
            chunk_size = self.chunk_size,
            "streaming audio"
        );
        let mut audio_task = tokio::spawn(stream_audio(
            sender,
            self.source,
            self.chunk_size,
            cancel_rx,
        ));

        let mut audio_outcome: Option<Result<AudioStats, SessionError>> = None;
        let mut rendered = 0usize;

        let receive_outcome = loop {
            tokio::select! {
                joined = &mut audio_task, if audio_outcome.is_none() => {
                    let outcome = flatten_join(joined);
                    let failed = outcome.is_err();
                    audio_outcome = Some(outcome);
                    if failed {
                        break Ok(());
                    }
                }
                received = receiver.recv() => match received {
                    Ok(Some(response)) => {
                        if let Err(e) = sink.render(&response).await {
                            break Err(SessionError::ResultRender(e));
                        }
                        rendered += 1;
                    }
                    Ok(None) => break Ok(()),
                    Err(e) => break Err(SessionError::ResultReceive(e)),
                },
            }
        };

        // Join barrier: the audio task must have half-closed before we return.
        let _ = cancel_tx.send(true);
        let audio_outcome = match audio_outcome {
            Some(outcome) => outcome,
            None => flatten_join(audio_task.await),
        };
        drop(receiver);

        match (receive_outcome, audio_outcome) {
            (Err(e), audio) => {
                if let Err(audio_err) = audio {
                    tracing::debug!("audio task ended with: {audio_err}");
                }
                tracing::debug!(phase = %e.phase(), rendered, "session failed: {e}");
                Err(e)
            }
            (Ok(()), Err(e)) => {
                tracing::debug!(phase = %e.phase(), rendered, "session failed: {e}");
                Err(e)
            }
            (Ok(()), Ok(stats)) => {
                if stats.cancelled {
                    tracing::warn!(
                        chunks = stats.chunks,
                        "server closed the stream before all audio was sent"
                    );
                }
                let summary = SessionSummary {
                    chunks_sent: stats.chunks,
                    bytes_sent: stats.bytes,
                    responses_rendered: rendered,
                    audio_cancelled: stats.cancelled,
                };
                tracing::info!(
                    chunks = summary.chunks_sent,
                    bytes = summary.bytes_sent,
                    responses = summary.responses_rendered,
                    "session complete"
                );
                Ok(summary)
            }
        }
    }
}
