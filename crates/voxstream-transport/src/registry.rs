use crate::loopback::LoopbackTransport;
use crate::transport_trait::Transport;
use std::collections::HashMap;
use voxstream_core::ChannelError;

pub struct TransportRegistry {
    factories: HashMap<String, fn() -> Box<dyn Transport>>,
}

impl TransportRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("loopback", || Box::new(LoopbackTransport::new()));
        registry
    }

    pub fn register(&mut self, name: &str, factory: fn() -> Box<dyn Transport>) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn Transport>, ChannelError> {
        self.factories
            .get(name)
            .map(|f| f())
            .ok_or_else(|| ChannelError::NotFound(name.to_string()))
    }

    /// Create and initialise a transport in one step.
    pub async fn connect(
        &self,
        name: &str,
        config: toml::Value,
    ) -> Result<Box<dyn Transport>, ChannelError> {
        let mut transport = self.create(name)?;
        transport.initialize(config).await?;
        tracing::info!(transport = %transport.name(), "transport ready");
        Ok(transport)
    }

    pub fn list_transports(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for TransportRegistry {
    fn default() -> Self {
        Self::new()
    }
}
