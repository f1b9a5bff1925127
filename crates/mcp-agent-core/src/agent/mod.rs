//! Agent runner
//!
//! An `Agent` owns its instructions, model binding and turn budget. Each call
//! to `run` is one invocation: it borrows a `ToolInvoker` (normally the
//! request's `SessionPool`) and cannot keep it past the call.

mod error;
mod routing;
mod runner;

pub use error::{AgentError, AgentResult};
pub use routing::{ToolRoute, ToolRoutes};
pub use runner::{Agent, AgentOutcome, DEFAULT_MAX_TURNS};
