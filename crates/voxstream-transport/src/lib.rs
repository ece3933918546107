pub mod channel;
pub mod loopback;
pub mod registry;
pub mod transport_trait;

pub use channel::{RecognitionChannel, RequestSender, ResponseReceiver, ServerEnd};
pub use loopback::LoopbackTransport;
pub use registry::TransportRegistry;
pub use transport_trait::Transport;
