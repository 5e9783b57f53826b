use dashmap::DashMap;

use mina_core::types::PendingRequest;

/// Store for the transient per-user pending request.
///
/// Injected into the pipeline so tests can substitute doubles and the
/// backing can change without touching the pipeline.
pub trait PendingStore: Send + Sync {
    /// Record (or overwrite, last-write-wins) the pending request for its
    /// user.
    fn put(&self, req: PendingRequest);

    /// The full pending record, if any.
    fn get(&self, user_id: &str) -> Option<PendingRequest>;

    /// The origin channel of the pending request, if any.
    fn channel(&self, user_id: &str) -> Option<String>;

    /// The pending query text, if any.
    fn query(&self, user_id: &str) -> Option<String>;

    /// Remove all transient state for `user_id`. A no-op when nothing is
    /// cached.
    fn clear(&self, user_id: &str);
}

/// In-memory pending store.
///
/// One slot per user: a submission racing an in-flight task for the same
/// user overwrites the slot, so both queued tasks see the newer query.
#[derive(Default)]
pub struct MemoryPendingStore {
    entries: DashMap<String, PendingRequest>,
}

impl MemoryPendingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PendingStore for MemoryPendingStore {
    fn put(&self, req: PendingRequest) {
        self.entries.insert(req.user_id.clone(), req);
    }

    fn get(&self, user_id: &str) -> Option<PendingRequest> {
        self.entries.get(user_id).map(|e| e.value().clone())
    }

    fn channel(&self, user_id: &str) -> Option<String> {
        self.entries.get(user_id).map(|e| e.channel_id.clone())
    }

    fn query(&self, user_id: &str) -> Option<String> {
        self.entries.get(user_id).map(|e| e.query.clone())
    }

    fn clear(&self, user_id: &str) {
        self.entries.remove(user_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(user_id: &str, query: &str) -> PendingRequest {
        PendingRequest {
            user_id: user_id.to_string(),
            channel_id: "chan-1".to_string(),
            guild_id: "guild-1".to_string(),
            query: query.to_string(),
        }
    }

    #[test]
    fn put_overwrites_previous_entry() {
        let store = MemoryPendingStore::new();
        store.put(request("u1", "first"));
        store.put(request("u1", "second"));

        assert_eq!(store.query("u1").as_deref(), Some("second"));
        assert_eq!(store.channel("u1").as_deref(), Some("chan-1"));
    }

    #[test]
    fn absent_user_yields_none() {
        let store = MemoryPendingStore::new();
        assert!(store.get("nobody").is_none());
        assert!(store.channel("nobody").is_none());
        assert!(store.query("nobody").is_none());
    }

    #[test]
    fn clear_on_absent_entry_is_a_noop() {
        let store = MemoryPendingStore::new();
        store.clear("nobody");
        assert!(store.get("nobody").is_none());
    }

    #[test]
    fn clear_removes_all_state_for_the_user() {
        let store = MemoryPendingStore::new();
        store.put(request("u1", "q"));
        store.put(request("u2", "other"));
        store.clear("u1");

        assert!(store.get("u1").is_none());
        assert_eq!(store.query("u2").as_deref(), Some("other"));
    }
}
