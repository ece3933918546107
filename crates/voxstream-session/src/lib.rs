pub mod sender;
pub mod session;
#[cfg(test)]
mod testing;

pub use sender::{AudioStats, ConfiguredSender};
pub use session::{SessionSummary, StreamingSession};
