use crate::source_trait::{AudioRead, AudioSource};
use async_trait::async_trait;
use std::path::Path;
use tokio::io::AsyncReadExt;
use voxstream_core::AudioError;

/// Streams the raw bytes of a file on disk.
pub struct FileSource {
    name: String,
    file: tokio::fs::File,
    finished: bool,
}

impl FileSource {
    pub async fn open(path: &Path) -> Result<Self, AudioError> {
        let file = tokio::fs::File::open(path)
            .await
            .map_err(|e| AudioError::Open(format!("{}: {e}", path.display())))?;
        tracing::debug!(path = %path.display(), "opened raw audio file");
        Ok(Self {
            name: path.display().to_string(),
            file,
            finished: false,
        })
    }
}

#[async_trait]
impl AudioSource for FileSource {
    fn name(&self) -> &str {
        &self.name
    }

    /// Fills `buf` completely unless the file ends first, so every chunk but
    /// the last one is full-sized.
    async fn read(&mut self, buf: &mut [u8]) -> Result<AudioRead, AudioError> {
        if self.finished {
            return Ok(AudioRead::End(0));
        }

        let mut filled = 0;
        while filled < buf.len() {
            let n = self.file.read(&mut buf[filled..]).await?;
            if n == 0 {
                self.finished = true;
                return Ok(AudioRead::End(filled));
            }
            filled += n;
        }
        Ok(AudioRead::Data(filled))
    }
}
