//! Continuation-based handling of Add, Modify and Rename

pub mod context;
pub mod module;
pub mod next_stage;
pub mod transform;

pub use context::{AfterForward, OperationContext, Phase, Resume};
pub use module::{ObjectClassModule, Outcome};
pub use next_stage::{NextStage, Ticket};
