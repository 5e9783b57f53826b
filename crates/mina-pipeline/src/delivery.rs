//! Delivery agent: gets a processed result back to the originating channel
//! with bounded retry, and clears the per-user pending state on every exit
//! path.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{error, info, warn};

use mina_core::types::DeliveryResult;

use crate::cache::PendingStore;
use crate::chatlog::ChatLogAppender;
use crate::error::PipelineError;

/// The requesting user's display identity, for attribution.
#[derive(Debug, Clone)]
pub struct Requester {
    pub name: String,
    pub avatar_url: Option<String>,
}

/// Presentation object handed to the transport.
#[derive(Debug, Clone)]
pub struct ResponsePayload {
    pub title: String,
    pub query: String,
    pub response: String,
    pub requester: Requester,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("platform error: {0}")]
    Platform(String),
}

/// Chat-platform delivery primitives.
///
/// `&self` on every method so a connected transport can be shared across
/// tasks without a mutable borrow.
#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Verify the destination channel exists and is reachable.
    async fn resolve_channel(&self, channel_id: &str) -> Result<(), TransportError>;

    /// Resolve the requesting user's display identity.
    async fn resolve_user(&self, user_id: &str) -> Result<Requester, TransportError>;

    /// Deliver one formatted payload to the channel.
    async fn send(&self, channel_id: &str, payload: &ResponsePayload)
        -> Result<(), TransportError>;

    /// Generic failure notice; no technical detail reaches the user.
    async fn notify_failure(&self, channel_id: &str) -> Result<(), TransportError>;
}

/// Failures fully contained inside the delivery agent. They are logged with
/// user/channel context and never propagate to the platform user.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("no channel cached for user {user_id}")]
    NoChannel { user_id: String },

    #[error("channel resolution failed: {0}")]
    Channel(TransportError),

    #[error("user resolution failed: {0}")]
    User(TransportError),

    #[error("send failed after {attempts} attempts: {last_error}")]
    SendExhausted {
        attempts: u32,
        last_error: TransportError,
    },
}

/// Delivers processed results and guarantees the pending-store entry for the
/// user is cleared no matter how delivery goes.
pub struct DeliveryAgent {
    transport: Arc<dyn ChatTransport>,
    cache: Arc<dyn PendingStore>,
    chat_log: ChatLogAppender,
    title: String,
    attempts: u32,
    backoff: Duration,
}

impl DeliveryAgent {
    pub fn new(
        transport: Arc<dyn ChatTransport>,
        cache: Arc<dyn PendingStore>,
        chat_log: ChatLogAppender,
        title: String,
        attempts: u32,
        backoff: Duration,
    ) -> Self {
        Self {
            transport,
            cache,
            chat_log,
            title,
            // At least one attempt, whatever the config says.
            attempts: attempts.max(1),
            backoff,
        }
    }

    /// Deliver `outcome` for `user_id`.
    ///
    /// Never propagates: a failed delivery is logged, a failed task gets a
    /// generic notice, and every path ends with the cache entry cleared.
    pub async fn deliver(&self, user_id: &str, outcome: Result<DeliveryResult, PipelineError>) {
        match outcome {
            Ok(result) => {
                if let Err(e) = self.deliver_response(user_id, &result).await {
                    error!(user_id, error = %e, "delivery failed");
                }
            }
            Err(e) => {
                warn!(user_id, error = %e, "query failed before delivery");
                self.notify_failure(user_id).await;
            }
        }

        // Unconditional: transient per-user state never outlives delivery.
        self.cache.clear(user_id);
    }

    async fn deliver_response(
        &self,
        user_id: &str,
        result: &DeliveryResult,
    ) -> Result<(), DeliveryError> {
        let Some(pending) = self.cache.get(user_id) else {
            return Err(DeliveryError::NoChannel {
                user_id: user_id.to_string(),
            });
        };

        self.transport
            .resolve_channel(&pending.channel_id)
            .await
            .map_err(DeliveryError::Channel)?;
        let requester = self
            .transport
            .resolve_user(user_id)
            .await
            .map_err(DeliveryError::User)?;

        let payload = ResponsePayload {
            title: self.title.clone(),
            query: pending.query.clone(),
            response: result.response.clone().unwrap_or_default(),
            requester,
        };

        self.send_with_retry(&pending.channel_id, &payload).await?;

        // Best-effort audit append, reported but swallowed.
        if let Err(e) = self.chat_log.append(&payload.query, &payload.response).await {
            warn!(user_id, error = %e, "chat log append failed");
        }

        info!(user_id, channel_id = %pending.channel_id, "response delivered");
        Ok(())
    }

    /// Up to `attempts` sends; each failure retries after `backoff`
    /// (zero means immediately).
    async fn send_with_retry(
        &self,
        channel_id: &str,
        payload: &ResponsePayload,
    ) -> Result<(), DeliveryError> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.transport.send(channel_id, payload).await {
                Ok(()) => return Ok(()),
                Err(e) if attempt >= self.attempts => {
                    return Err(DeliveryError::SendExhausted {
                        attempts: attempt,
                        last_error: e,
                    });
                }
                Err(e) => {
                    warn!(attempt, channel_id, error = %e, "send failed, retrying");
                    if !self.backoff.is_zero() {
                        tokio::time::sleep(self.backoff).await;
                    }
                }
            }
        }
    }

    async fn notify_failure(&self, user_id: &str) {
        let Some(channel_id) = self.cache.channel(user_id) else {
            return;
        };
        if let Err(e) = self.transport.notify_failure(&channel_id).await {
            warn!(user_id, channel_id = %channel_id, error = %e, "failure notice not delivered");
        }
    }
}
