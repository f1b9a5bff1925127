//! Logging abstractions
//!
//! Core components log through the `Logger` seam so the binaries decide
//! where output goes. `TracingLogger` forwards to `tracing`; `NoOpLogger`
//! keeps tests quiet.

mod traits;
mod noop;
mod tracing_logger;

pub use traits::{Logger, SharedLogger};
pub use noop::NoOpLogger;
pub use tracing_logger::TracingLogger;
