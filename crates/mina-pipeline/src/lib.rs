//! Query processing and delivery pipeline.
//!
//! Submissions flow: pending-store write → queue enqueue → credit deduction
//! → model invocation → delivery with bounded retry → chat log append →
//! pending-store clear. One worker drains the queue, so at most one model
//! invocation is in flight process-wide.

pub mod cache;
pub mod chatlog;
pub mod delivery;
pub mod error;
pub mod pipeline;
pub mod queue;

pub use cache::{MemoryPendingStore, PendingStore};
pub use chatlog::ChatLogAppender;
pub use delivery::{
    ChatTransport, DeliveryAgent, DeliveryError, Requester, ResponsePayload, TransportError,
};
pub use error::PipelineError;
pub use pipeline::QueryPipeline;
pub use queue::{QueryQueue, QueueSettings, TaskHandle};
