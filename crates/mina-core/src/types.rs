use serde::{Deserialize, Serialize};

/// Transient record of an accepted-but-not-yet-delivered query.
///
/// Produced at submission time and held in the pending store until delivery
/// completes or fails terminally. At most one exists per user; a newer
/// submission overwrites the older one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingRequest {
    pub user_id: String,
    pub channel_id: String,
    /// Origin guild, or `"unknown"` for direct messages. Carried for log
    /// context only; routing uses `channel_id`.
    pub guild_id: String,
    pub query: String,
}

/// Outcome of queue processing, consumed by the delivery agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryResult {
    pub success: bool,
    pub response: Option<String>,
}
