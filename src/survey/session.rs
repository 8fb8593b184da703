//! Per-user conversation sessions and the in-memory session store.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

use super::question::QuestionKey;

/// Identifies one remote user for the duration of a dialog.
///
/// Telegram user id plus chat id: the same user in two chats runs two
/// independent dialogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct UserKey {
    pub user_id: i64,
    pub chat_id: i64,
}

/// One in-progress dialog.
///
/// Created on `/start`, mutated once per answer, removed right after the
/// final answer's summary is emitted. A session therefore never exists in a
/// "completed" state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSession {
    /// The question currently awaiting an answer.
    pub current_question: QuestionKey,
    /// Collected answers, in question order. Never contains the key in
    /// `current_question` or any key after it.
    pub answers: Vec<(QuestionKey, String)>,
    /// Message ids to delete before the next prompt: the last prompt sent
    /// and the message that triggered it (0–2 entries).
    pub pending_prompt_ids: Vec<i64>,
    pub started_at: DateTime<Utc>,
}

impl ConversationSession {
    /// Fresh session at the first question.
    pub fn new() -> Self {
        Self {
            current_question: QuestionKey::first(),
            answers: Vec::new(),
            pending_prompt_ids: Vec::new(),
            started_at: Utc::now(),
        }
    }
}

impl Default for ConversationSession {
    fn default() -> Self {
        Self::new()
    }
}

/// In-memory session store, keyed per user.
///
/// Mutation of one user's session never touches another's; concurrent
/// dispatches for the same user are last-write-wins.
pub struct SessionStore {
    sessions: RwLock<HashMap<UserKey, ConversationSession>>,
}

impl SessionStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
        })
    }

    /// Get a snapshot of a user's session, if one exists.
    pub async fn get(&self, user: UserKey) -> Option<ConversationSession> {
        self.sessions.read().await.get(&user).cloned()
    }

    /// Store (or overwrite) a user's session.
    pub async fn put(&self, user: UserKey, session: ConversationSession) {
        debug!(
            user_id = user.user_id,
            chat_id = user.chat_id,
            question = %session.current_question,
            "Session stored"
        );
        self.sessions.write().await.insert(user, session);
    }

    /// Remove a user's session. Removing an absent session is a no-op.
    pub async fn clear(&self, user: UserKey) {
        if self.sessions.write().await.remove(&user).is_some() {
            debug!(user_id = user.user_id, chat_id = user.chat_id, "Session cleared");
        }
    }

    /// Number of active sessions.
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(n: i64) -> UserKey {
        UserKey {
            user_id: n,
            chat_id: n * 100,
        }
    }

    #[tokio::test]
    async fn put_get_clear() {
        let store = SessionStore::new();
        assert!(store.is_empty().await);
        assert!(store.get(user(1)).await.is_none());

        store.put(user(1), ConversationSession::new()).await;
        assert_eq!(store.len().await, 1);
        let session = store.get(user(1)).await.unwrap();
        assert_eq!(session.current_question, QuestionKey::first());
        assert!(session.answers.is_empty());

        store.clear(user(1)).await;
        assert!(store.get(user(1)).await.is_none());
    }

    #[tokio::test]
    async fn clear_absent_is_noop() {
        let store = SessionStore::new();
        store.clear(user(42)).await;
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn put_overwrites() {
        let store = SessionStore::new();
        store.put(user(1), ConversationSession::new()).await;

        let mut advanced = ConversationSession::new();
        advanced.answers.push((QuestionKey::Zen, "Si".into()));
        advanced.current_question = QuestionKey::TradeRepublic;
        store.put(user(1), advanced).await;

        let session = store.get(user(1)).await.unwrap();
        assert_eq!(session.current_question, QuestionKey::TradeRepublic);
        assert_eq!(session.answers.len(), 1);
    }

    #[tokio::test]
    async fn sessions_are_isolated_per_user() {
        let store = SessionStore::new();
        store.put(user(1), ConversationSession::new()).await;

        let mut other = ConversationSession::new();
        other.answers.push((QuestionKey::Zen, "No".into()));
        other.current_question = QuestionKey::TradeRepublic;
        store.put(user(2), other).await;

        store.clear(user(1)).await;
        let survivor = store.get(user(2)).await.unwrap();
        assert_eq!(survivor.answers[0].1, "No");
    }

    #[tokio::test]
    async fn same_user_different_chats_are_distinct() {
        let store = SessionStore::new();
        let a = UserKey { user_id: 7, chat_id: 1 };
        let b = UserKey { user_id: 7, chat_id: 2 };
        store.put(a, ConversationSession::new()).await;
        assert!(store.get(b).await.is_none());
    }

    #[tokio::test]
    async fn concurrent_access_distinct_users() {
        let store = SessionStore::new();
        let mut handles = Vec::new();
        for n in 0..32 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let key = user(n);
                store.put(key, ConversationSession::new()).await;
                let mut session = store.get(key).await.unwrap();
                session.answers.push((QuestionKey::Zen, format!("answer-{n}")));
                session.current_question = QuestionKey::TradeRepublic;
                store.put(key, session).await;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(store.len().await, 32);
        for n in 0..32 {
            let session = store.get(user(n)).await.unwrap();
            assert_eq!(session.answers[0].1, format!("answer-{n}"));
        }
    }
}
