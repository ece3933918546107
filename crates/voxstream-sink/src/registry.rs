use crate::file_sink::FileSink;
use crate::pretty::PrettyPrintSink;
use crate::sink_trait::ResultSink;
use std::collections::HashMap;
use voxstream_core::SinkError;

pub struct SinkRegistry {
    factories: HashMap<String, fn() -> Box<dyn ResultSink>>,
}

impl SinkRegistry {
    pub fn new() -> Self {
        let mut registry = Self {
            factories: HashMap::new(),
        };
        registry.register("stdout", || Box::new(PrettyPrintSink::new()));
        registry.register("file", || Box::new(FileSink::new()));
        registry
    }

    pub fn register(&mut self, name: &str, factory: fn() -> Box<dyn ResultSink>) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(&self, name: &str) -> Result<Box<dyn ResultSink>, SinkError> {
        self.factories
            .get(name)
            .map(|f| f())
            .ok_or_else(|| SinkError::NotFound(name.to_string()))
    }

    /// Create and initialise a sink in one step.
    pub async fn build(
        &self,
        name: &str,
        config: toml::Value,
    ) -> Result<Box<dyn ResultSink>, SinkError> {
        let mut sink = self.create(name)?;
        sink.initialize(config).await?;
        Ok(sink)
    }

    pub fn list_sinks(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.factories.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }
}

impl Default for SinkRegistry {
    fn default() -> Self {
        Self::new()
    }
}
