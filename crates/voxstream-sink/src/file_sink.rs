use crate::sink_trait::ResultSink;
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use voxstream_core::{SinkError, StreamingResponse};

/// Appends each response to a file as one line of JSON.
pub struct FileSink {
    output_path: Option<PathBuf>,
    file: Option<tokio::fs::File>,
    write_count: usize,
}

impl FileSink {
    pub fn new() -> Self {
        Self {
            output_path: None,
            file: None,
            write_count: 0,
        }
    }

    pub fn write_count(&self) -> usize {
        self.write_count
    }

    pub fn output_path(&self) -> Option<&PathBuf> {
        self.output_path.as_ref()
    }
}

impl Default for FileSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResultSink for FileSink {
    fn name(&self) -> &str {
        "file"
    }

    async fn initialize(&mut self, config: toml::Value) -> Result<(), SinkError> {
        let path = config
            .get("path")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                SinkError::InitializationFailed("missing 'path' in config".to_string())
            })?;
        let path = PathBuf::from(path);
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .map_err(|e| SinkError::InitializationFailed(format!("{}: {e}", path.display())))?;

        tracing::debug!(path = %path.display(), "file sink opened");
        self.output_path = Some(path);
        self.file = Some(file);
        Ok(())
    }

    async fn render(&mut self, response: &StreamingResponse) -> Result<(), SinkError> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| SinkError::RenderFailed("not initialized".to_string()))?;

        let mut line =
            serde_json::to_vec(response).map_err(|e| SinkError::RenderFailed(e.to_string()))?;
        line.push(b'\n');
        file.write_all(&line)
            .await
            .map_err(|e| SinkError::RenderFailed(e.to_string()))?;

        self.write_count += 1;
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), SinkError> {
        if let Some(mut file) = self.file.take() {
            file.flush()
                .await
                .map_err(|e| SinkError::RenderFailed(e.to_string()))?;
        }
        Ok(())
    }
}
