//! Background extraction queue: fire-and-forget scheduling of screenshot
//! extraction jobs, decoupled from the request/response cycle.

mod context;
mod queue;

pub use context::ExtractionContext;
pub use queue::{ExtractionQueue, QueueConfig};
