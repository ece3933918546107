use async_trait::async_trait;
use voxstream_core::AudioError;

/// Outcome of a single [`AudioSource::read`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioRead {
    /// `n` bytes were written to the buffer and more may follow. `n` may
    /// be zero when the source had nothing ready yet.
    Data(usize),
    /// The stream is exhausted after the `n` bytes written by this call.
    End(usize),
}

/// A sequential byte stream of raw audio.
///
/// Sources are drained by the audio-sending task of a streaming session and
/// must not spin forever returning `Data(0)`.
#[async_trait]
pub trait AudioSource: Send {
    /// Short human-readable description for logs (file name, `"memory"`).
    fn name(&self) -> &str;
    /// Read up to `buf.len()` bytes into `buf`.
    async fn read(&mut self, buf: &mut [u8]) -> Result<AudioRead, AudioError>;
}
