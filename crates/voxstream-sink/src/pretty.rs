use crate::sink_trait::ResultSink;
use async_trait::async_trait;
use std::io::Write;
use voxstream_core::{SinkError, StreamingResponse};

/// Pretty-prints each response as an indented JSON document.
pub struct PrettyPrintSink {
    writer: Box<dyn Write + Send>,
    rendered: usize,
}

impl PrettyPrintSink {
    /// Sink writing to standard output.
    pub fn new() -> Self {
        Self::with_writer(Box::new(std::io::stdout()))
    }

    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            writer,
            rendered: 0,
        }
    }

    pub fn rendered(&self) -> usize {
        self.rendered
    }
}

impl Default for PrettyPrintSink {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ResultSink for PrettyPrintSink {
    fn name(&self) -> &str {
        "stdout"
    }

    async fn initialize(&mut self, _config: toml::Value) -> Result<(), SinkError> {
        Ok(())
    }

    async fn render(&mut self, response: &StreamingResponse) -> Result<(), SinkError> {
        let text = serde_json::to_string_pretty(response)
            .map_err(|e| SinkError::RenderFailed(e.to_string()))?;
        writeln!(self.writer, "{text}").map_err(|e| SinkError::RenderFailed(e.to_string()))?;
        self.writer
            .flush()
            .map_err(|e| SinkError::RenderFailed(e.to_string()))?;
        self.rendered += 1;
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<(), SinkError> {
        self.writer
            .flush()
            .map_err(|e| SinkError::RenderFailed(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct BrokenPipe;

    impl Write for BrokenPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_pretty_sink_name() {
        assert_eq!(PrettyPrintSink::new().name(), "stdout");
    }

    #[tokio::test]
    async fn test_pretty_sink_renders_camel_case_json() {
        let buffer = SharedBuffer::default();
        let mut sink = PrettyPrintSink::with_writer(Box::new(buffer.clone()));

        sink.render(&StreamingResponse::single("hello", true))
            .await
            .unwrap();

        let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        assert!(output.contains("\"recognitionResult\""));
        assert!(output.contains("\"isFinal\": true"));
        assert!(output.contains("\"transcript\": \"hello\""));
        assert!(output.ends_with("}\n"));
        assert_eq!(sink.rendered(), 1);
    }

    #[tokio::test]
    async fn test_pretty_sink_output_parses_back() {
        let buffer = SharedBuffer::default();
        let mut sink = PrettyPrintSink::with_writer(Box::new(buffer.clone()));
        let response = StreamingResponse::single("round trip", false);

        sink.render(&response).await.unwrap();

        let output = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        let parsed: StreamingResponse = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, response);
    }

    #[tokio::test]
    async fn test_pretty_sink_write_failure_is_render_error() {
        let mut sink = PrettyPrintSink::with_writer(Box::new(BrokenPipe));
        let result = sink.render(&StreamingResponse::single("lost", true)).await;
        match result {
            Err(SinkError::RenderFailed(msg)) => assert!(msg.contains("closed")),
            _ => panic!("expected RenderFailed"),
        }
        assert_eq!(sink.rendered(), 0);
    }
}
