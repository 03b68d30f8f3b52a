//! Per-session conversation memory with a sliding window.
//!
//! Each session owns an ordered turn log bounded by a configured maximum;
//! when the bound is exceeded the oldest turns are evicted first. Sessions
//! are created implicitly on first append and are fully isolated from one
//! another.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use tracing::{debug, error};

use tome_core::types::{ChatRole, ChatTurn};

/// Thread-safe, windowed per-session turn store.
///
/// Reads never fail: an unknown session is an empty one. Each append is
/// atomic under the interior mutex, so a turn is never partially visible.
pub struct ConversationMemory {
    max_messages: usize,
    sessions: Mutex<HashMap<String, VecDeque<ChatTurn>>>,
}

impl ConversationMemory {
    /// Create a memory store keeping at most `max_messages` turns per session.
    pub fn new(max_messages: usize) -> Self {
        Self {
            max_messages,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    /// Append one turn to a session, evicting the oldest turns while the
    /// window bound is exceeded.
    pub fn append(&self, session_id: &str, role: ChatRole, content: &str) {
        let mut sessions = match self.sessions.lock() {
            Ok(s) => s,
            Err(e) => {
                error!(session_id, "Memory lock poisoned on append: {}", e);
                return;
            }
        };

        let turns = sessions.entry(session_id.to_string()).or_default();
        turns.push_back(ChatTurn::new(role, content));
        while turns.len() > self.max_messages {
            turns.pop_front();
        }

        debug!(session_id, turns = turns.len(), "Turn appended");
    }

    /// All turns for a session, oldest first. Empty for unknown sessions.
    pub fn get(&self, session_id: &str) -> Vec<ChatTurn> {
        match self.sessions.lock() {
            Ok(sessions) => sessions
                .get(session_id)
                .map(|turns| turns.iter().cloned().collect())
                .unwrap_or_default(),
            Err(e) => {
                error!(session_id, "Memory lock poisoned on get: {}", e);
                Vec::new()
            }
        }
    }

    /// Discard all turns for a session. Clearing an unknown or already-empty
    /// session is a no-op.
    pub fn clear(&self, session_id: &str) {
        match self.sessions.lock() {
            Ok(mut sessions) => {
                sessions.remove(session_id);
                debug!(session_id, "Session cleared");
            }
            Err(e) => error!(session_id, "Memory lock poisoned on clear: {}", e),
        }
    }

    /// Number of turns currently held for a session.
    pub fn len(&self, session_id: &str) -> usize {
        self.sessions
            .lock()
            .map(|s| s.get(session_id).map(|t| t.len()).unwrap_or(0))
            .unwrap_or(0)
    }

    /// True if the session holds no turns.
    pub fn is_empty(&self, session_id: &str) -> bool {
        self.len(session_id) == 0
    }
}
