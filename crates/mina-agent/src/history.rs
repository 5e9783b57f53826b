use dashmap::DashMap;

use crate::provider::{Role, Turn};

/// Per-user conversation history, owned by the pipeline for the process
/// lifetime.
///
/// A conversation is created lazily on the first query from a user, seeded
/// with the fixed system instruction. History grows append-only (a user
/// turn followed on success by the assistant turn) and is never
/// reordered or evicted. Callers bound what they send upstream with
/// [`window`](Self::window).
pub struct ConversationStore {
    system_prompt: String,
    conversations: DashMap<String, Vec<Turn>>,
}

impl ConversationStore {
    pub fn new(system_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            conversations: DashMap::new(),
        }
    }

    /// Append the user's turn, creating the conversation if needed.
    pub fn append_user(&self, user_id: &str, content: &str) {
        let mut entry = self
            .conversations
            .entry(user_id.to_string())
            .or_insert_with(|| {
                vec![Turn {
                    role: Role::System,
                    content: self.system_prompt.clone(),
                }]
            });
        entry.push(Turn {
            role: Role::User,
            content: content.to_string(),
        });
    }

    /// Append the assistant's turn to an existing conversation.
    pub fn append_assistant(&self, user_id: &str, content: &str) {
        if let Some(mut entry) = self.conversations.get_mut(user_id) {
            entry.push(Turn {
                role: Role::Assistant,
                content: content.to_string(),
            });
        }
    }

    /// The system turn plus the most recent `limit` turns, in order.
    /// A `limit` of 0 returns the full history.
    pub fn window(&self, user_id: &str, limit: usize) -> Vec<Turn> {
        let Some(entry) = self.conversations.get(user_id) else {
            return Vec::new();
        };
        let turns = entry.value();
        if limit == 0 || turns.len() <= limit + 1 {
            return turns.clone();
        }
        let mut out = Vec::with_capacity(limit + 1);
        out.push(turns[0].clone());
        out.extend_from_slice(&turns[turns.len() - limit..]);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_turn_is_the_system_instruction() {
        let store = ConversationStore::new("you are mina");
        store.append_user("u1", "hello");

        let turns = store.window("u1", 0);
        assert_eq!(turns[0].role, Role::System);
        assert_eq!(turns[0].content, "you are mina");
    }

    #[test]
    fn two_round_trips_keep_conversational_order() {
        let store = ConversationStore::new("sys");
        store.append_user("u1", "q1");
        store.append_assistant("u1", "a1");
        store.append_user("u1", "q2");
        store.append_assistant("u1", "a2");

        let roles: Vec<Role> = store.window("u1", 0).iter().map(|t| t.role).collect();
        assert_eq!(
            roles,
            vec![
                Role::System,
                Role::User,
                Role::Assistant,
                Role::User,
                Role::Assistant
            ]
        );
    }

    #[test]
    fn window_keeps_system_turn_and_most_recent_tail() {
        let store = ConversationStore::new("sys");
        for i in 0..5 {
            store.append_user("u1", &format!("q{i}"));
            store.append_assistant("u1", &format!("a{i}"));
        }

        let turns = store.window("u1", 4);
        assert_eq!(turns.len(), 5);
        assert_eq!(turns[0].role, Role::System);
        assert_eq!(turns.last().unwrap().content, "a4");
    }

    #[test]
    fn conversations_never_interleave_across_users() {
        let store = ConversationStore::new("sys");
        store.append_user("u1", "from u1");
        store.append_user("u2", "from u2");

        let u1 = store.window("u1", 0);
        assert_eq!(u1.len(), 2);
        assert_eq!(u1[1].content, "from u1");
    }

    #[test]
    fn assistant_turn_without_conversation_is_ignored() {
        let store = ConversationStore::new("sys");
        store.append_assistant("ghost", "orphan");
        assert!(store.window("ghost", 0).is_empty());
    }
}
