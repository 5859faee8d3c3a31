//! Ties tenant resolution, session state, the LLM tool-call loop, and CRM
//! dispatch into one request lifecycle. See `engine::Orchestrator::handle_message`.

pub mod deadlines;
pub mod engine;
pub mod error;
pub mod locks;
pub mod message;
pub mod prompt;
pub mod transitions;

pub use engine::Orchestrator;
pub use error::OrchestratorError;
pub use message::{InboundMessage, OrchestratorReply};
