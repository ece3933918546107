use async_trait::async_trait;
use voxstream_core::{SinkError, StreamingResponse};

/// Renders recognition results somewhere a user can see them.
///
/// Implementations are registered via [`SinkRegistry`](crate::SinkRegistry).
/// A render failure ends the streaming session.
#[async_trait]
pub trait ResultSink: Send {
    /// Returns the sink's plugin name (e.g. `"stdout"`, `"file"`).
    fn name(&self) -> &str;
    /// One-time initialisation with sink-specific TOML configuration.
    async fn initialize(&mut self, config: toml::Value) -> Result<(), SinkError>;
    /// Render one response, in receive order.
    async fn render(&mut self, response: &StreamingResponse) -> Result<(), SinkError>;
    /// Flush and release resources.
    async fn shutdown(&mut self) -> Result<(), SinkError>;
}
