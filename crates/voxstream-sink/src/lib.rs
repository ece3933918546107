pub mod file_sink;
pub mod pretty;
pub mod registry;
pub mod sink_trait;

pub use file_sink::FileSink;
pub use pretty::PrettyPrintSink;
pub use registry::SinkRegistry;
pub use sink_trait::ResultSink;
