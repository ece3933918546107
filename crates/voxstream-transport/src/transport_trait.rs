use crate::channel::RecognitionChannel;
use async_trait::async_trait;
use voxstream_core::ChannelError;

/// A client able to open recognition streams against some recognizer.
///
/// Implementations are registered via [`TransportRegistry`](crate::TransportRegistry).
#[async_trait]
pub trait Transport: Send + Sync {
    /// Returns the transport's registry name (e.g. `"loopback"`).
    fn name(&self) -> &str;
    /// One-time initialisation with transport-specific TOML configuration.
    async fn initialize(&mut self, config: toml::Value) -> Result<(), ChannelError>;
    /// Open a new bidirectional recognition stream.
    async fn open(&self) -> Result<RecognitionChannel, ChannelError>;
    /// Release the client and any streams it still serves.
    async fn shutdown(&self) -> Result<(), ChannelError>;
}
