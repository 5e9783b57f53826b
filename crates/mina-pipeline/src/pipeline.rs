use std::sync::Arc;

use mina_core::types::PendingRequest;

use crate::cache::PendingStore;
use crate::delivery::DeliveryAgent;
use crate::error::{PipelineError, Result};
use crate::queue::QueryQueue;

/// Public entry point for submitted queries.
///
/// `submit` returns once the query is validated and queued; the response
/// reaches the user asynchronously through the delivery agent.
pub struct QueryPipeline {
    cache: Arc<dyn PendingStore>,
    queue: QueryQueue,
    delivery: Arc<DeliveryAgent>,
}

impl QueryPipeline {
    pub fn new(
        cache: Arc<dyn PendingStore>,
        queue: QueryQueue,
        delivery: Arc<DeliveryAgent>,
    ) -> Self {
        Self {
            cache,
            queue,
            delivery,
        }
    }

    /// Validate, cache, and enqueue one submission.
    ///
    /// `Ok(())` only acknowledges that processing has started. Blank input
    /// is rejected here, before the cache, the queue, and the credit gate.
    pub fn submit(&self, req: PendingRequest) -> Result<()> {
        if req.user_id.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "user id must be a non-empty string".into(),
            ));
        }
        if req.query.trim().is_empty() {
            return Err(PipelineError::InvalidInput(
                "query text must be a non-empty string".into(),
            ));
        }

        let user_id = req.user_id.clone();
        self.cache.put(req);

        let handle = match self.queue.enqueue(&user_id) {
            Ok(handle) => handle,
            Err(e) => {
                // A failed enqueue must not leave the entry behind.
                self.cache.clear(&user_id);
                return Err(e);
            }
        };

        let delivery = Arc::clone(&self.delivery);
        tokio::spawn(async move {
            let outcome = handle.outcome().await;
            delivery.deliver(&user_id, outcome).await;
        });

        Ok(())
    }
}
