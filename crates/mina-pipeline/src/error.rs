use thiserror::Error;

use mina_agent::ModelError;
use mina_credits::CreditError;

/// Failures at the queue-processing layer. Each one rejects its task's
/// outcome and is logged with user context; none of them crash the worker.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Bad user-supplied query or identifier, rejected before queueing.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The credit gate refused the deduction: terminal, no retry.
    #[error("insufficient credits for user {user_id}")]
    InsufficientCredits { user_id: String },

    /// The submission path failed to populate the pending store before
    /// enqueueing, an internal invariant violation.
    #[error("no pending query cached for user {user_id}")]
    NoPendingQuery { user_id: String },

    /// Transient credit store failure, distinct from a refusal.
    #[error("credit gate error: {0}")]
    Credit(#[from] CreditError),

    /// Upstream model failure: terminal per task, not retried here.
    #[error("model invocation failed: {0}")]
    Model(#[from] ModelError),

    /// The model call exceeded the per-task deadline.
    #[error("model invocation timed out after {secs}s")]
    Timeout { secs: u64 },

    /// The worker is gone; only possible during shutdown.
    #[error("query queue is closed")]
    QueueClosed,
}

pub type Result<T> = std::result::Result<T, PipelineError>;
