//! Serialized query queue: a single worker drains submissions in strict
//! FIFO order, so at most one model invocation is in flight at any instant.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::{error, info};

use mina_agent::{CompletionRequest, ConversationStore, ModelClient};
use mina_core::types::DeliveryResult;
use mina_credits::CreditGate;

use crate::cache::PendingStore;
use crate::error::{PipelineError, Result};

/// Worker-side knobs for the model invocation.
#[derive(Debug, Clone)]
pub struct QueueSettings {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    /// Turns of history (beyond the system turn) sent upstream. 0 = all.
    pub history_limit: usize,
    /// Deadline for a single model invocation.
    pub request_timeout: Duration,
}

struct QueueTask {
    user_id: String,
    done: oneshot::Sender<Result<DeliveryResult>>,
}

/// Handle to a queued task's eventual outcome.
pub struct TaskHandle {
    rx: oneshot::Receiver<Result<DeliveryResult>>,
}

impl TaskHandle {
    /// Wait until the task's full processing completes or fails.
    pub async fn outcome(self) -> Result<DeliveryResult> {
        self.rx.await.unwrap_or(Err(PipelineError::QueueClosed))
    }
}

/// Orders concurrent submissions into a single stream processed one task at
/// a time, in arrival order. Enqueueing never blocks the submitter.
pub struct QueryQueue {
    tx: mpsc::UnboundedSender<QueueTask>,
}

impl QueryQueue {
    /// Spawn the single worker and return the queue handle.
    pub fn new(
        gate: Arc<dyn CreditGate>,
        cache: Arc<dyn PendingStore>,
        store: Arc<ConversationStore>,
        model: Arc<dyn ModelClient>,
        settings: QueueSettings,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(rx, gate, cache, store, model, settings));
        Self { tx }
    }

    /// Queue a task for `user_id`.
    ///
    /// Rejects an empty identifier immediately, without entering the queue.
    /// The returned handle resolves once processing completes or fails.
    pub fn enqueue(&self, user_id: &str) -> Result<TaskHandle> {
        if user_id.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "user id must be a non-empty string".into(),
            ));
        }

        let (done, rx) = oneshot::channel();
        let task = QueueTask {
            user_id: user_id.to_string(),
            done,
        };
        self.tx.send(task).map_err(|_| PipelineError::QueueClosed)?;
        Ok(TaskHandle { rx })
    }
}

/// Worker loop. A task failure is resolved to its handle and logged; the
/// loop itself keeps draining whatever is queued behind it.
async fn run_worker(
    mut rx: mpsc::UnboundedReceiver<QueueTask>,
    gate: Arc<dyn CreditGate>,
    cache: Arc<dyn PendingStore>,
    store: Arc<ConversationStore>,
    model: Arc<dyn ModelClient>,
    settings: QueueSettings,
) {
    while let Some(task) = rx.recv().await {
        let outcome = process_task(
            &task.user_id,
            gate.as_ref(),
            cache.as_ref(),
            &store,
            model.as_ref(),
            &settings,
        )
        .await;

        match &outcome {
            Ok(_) => info!(user_id = %task.user_id, "query processed"),
            Err(e) => error!(user_id = %task.user_id, error = %e, "query processing failed"),
        }

        // The enqueuer may have gone away; its outcome is then dropped.
        let _ = task.done.send(outcome);
    }
    info!("query queue worker exiting (channel closed)");
}

async fn process_task(
    user_id: &str,
    gate: &dyn CreditGate,
    cache: &dyn PendingStore,
    store: &ConversationStore,
    model: &dyn ModelClient,
    settings: &QueueSettings,
) -> Result<DeliveryResult> {
    // Credit gate first; a refusal is terminal for the task.
    if !gate.deduct(user_id).await? {
        return Err(PipelineError::InsufficientCredits {
            user_id: user_id.to_string(),
        });
    }

    // The submission path populates the store before enqueueing; an absent
    // entry here means that contract was broken.
    let query = cache
        .query(user_id)
        .ok_or_else(|| PipelineError::NoPendingQuery {
            user_id: user_id.to_string(),
        })?;

    // Blank queries never reach the network.
    if query.trim().is_empty() {
        return Err(PipelineError::InvalidInput(
            "query text must be a non-empty string".into(),
        ));
    }

    store.append_user(user_id, &query);
    let request = CompletionRequest {
        model: settings.model.clone(),
        temperature: settings.temperature,
        max_tokens: settings.max_tokens,
        messages: store.window(user_id, settings.history_limit),
    };

    let response = match tokio::time::timeout(settings.request_timeout, model.complete(&request))
        .await
    {
        Ok(result) => result?,
        Err(_) => {
            return Err(PipelineError::Timeout {
                secs: settings.request_timeout.as_secs(),
            })
        }
    };

    store.append_assistant(user_id, &response);
    Ok(DeliveryResult {
        success: true,
        response: Some(response),
    })
}
