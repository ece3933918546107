use tokio::sync::watch;
use voxstream_audio::{AudioRead, AudioSource};
use voxstream_core::{ChannelError, SessionError, StreamingConfig, StreamingRequest};
use voxstream_transport::RequestSender;

/// Send half of a channel whose config frame has already gone out.
///
/// Audio can only be sent through this type, and [`close`](Self::close)
/// consumes it, so the half-close happens at most once.
pub struct ConfiguredSender {
    inner: Box<dyn RequestSender>,
}

impl ConfiguredSender {
    /// Send the session's single config frame.
    ///
    /// On failure the send direction is still half-closed before the error
    /// is returned.
    pub async fn configure(
        mut inner: Box<dyn RequestSender>,
        config: StreamingConfig,
    ) -> Result<Self, ChannelError> {
        if let Err(e) = inner.send(StreamingRequest::Config(config)).await {
            if let Err(close_err) = inner.close_send().await {
                tracing::debug!("half-close after failed config send: {close_err}");
            }
            return Err(e);
        }
        Ok(Self { inner })
    }

    pub async fn send_audio(&mut self, bytes: Vec<u8>) -> Result<(), ChannelError> {
        self.inner.send(StreamingRequest::Audio(bytes)).await
    }

    /// Half-close the send direction.
    pub async fn close(mut self) -> Result<(), ChannelError> {
        self.inner.close_send().await
    }
}

/// What the audio-sending task did before it stopped.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AudioStats {
    pub chunks: usize,
    pub bytes: usize,
    /// The task stopped on the session's cancellation signal rather than at
    /// end of input.
    pub cancelled: bool,
}

async fn pump(
    sender: &mut ConfiguredSender,
    source: &mut dyn AudioSource,
    chunk_size: usize,
    stats: &mut AudioStats,
) -> Result<(), SessionError> {
    let mut buf = vec![0u8; chunk_size];
    loop {
        let (n, at_end) = match source.read(&mut buf).await.map_err(SessionError::AudioRead)? {
            AudioRead::Data(n) => (n, false),
            AudioRead::End(n) => (n, true),
        };

        if n > 0 {
            sender
                .send_audio(buf[..n].to_vec())
                .await
                .map_err(SessionError::AudioSend)?;
            stats.chunks += 1;
            stats.bytes += n;
            tracing::trace!(chunk = stats.chunks, bytes = n, "sent audio chunk");
        } else if !at_end {
            // Nothing ready yet; let the receive side make progress.
            tokio::task::yield_now().await;
        }

        if at_end {
            return Ok(());
        }
    }
}

async fn wait_for_cancel(cancel: &mut watch::Receiver<bool>) {
    loop {
        if *cancel.borrow_and_update() {
            return;
        }
        // A dropped session counts as cancellation.
        if cancel.changed().await.is_err() {
            return;
        }
    }
}

/// Body of the audio-sending task.
///
/// Drains `source` in `chunk_size` pieces until end of input, a failure, or
/// cancellation, then half-closes the send direction on every path.
pub async fn stream_audio(
    mut sender: ConfiguredSender,
    mut source: Box<dyn AudioSource>,
    chunk_size: usize,
    mut cancel: watch::Receiver<bool>,
) -> Result<AudioStats, SessionError> {
    let mut stats = AudioStats::default();

    let outcome = tokio::select! {
        result = pump(&mut sender, source.as_mut(), chunk_size, &mut stats) => result.map(|()| false),
        () = wait_for_cancel(&mut cancel) => Ok(true),
    };
    if let Ok(true) = outcome {
        stats.cancelled = true;
        tracing::debug!(source = %source.name(), "audio streaming cancelled");
    }

    let closed = sender.close().await;
    match (outcome, closed) {
        (Ok(_), Ok(())) => {
            tracing::debug!(
                chunks = stats.chunks,
                bytes = stats.bytes,
                "audio stream half-closed"
            );
            Ok(stats)
        }
        (Ok(_), Err(e)) => Err(SessionError::AudioSend(e)),
        (Err(e), close_result) => {
            if let Err(close_err) = close_result {
                tracing::debug!("half-close after audio failure also failed: {close_err}");
            }
            Err(e)
        }
    }
}
