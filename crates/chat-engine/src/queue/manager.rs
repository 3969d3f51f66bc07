use std::collections::VecDeque;

use dashmap::DashMap;
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::session::{ChatSession, SessionId};

/// FIFO of sessions waiting for an agent, plus a table of all accepted sessions
///
/// Refused sessions never enter this structure. Each operation is its own
/// critical section; compound sequences (admission check, enqueue, assign)
/// are serialized by the coordinator.
pub struct SessionQueue {
    /// Waiting sessions in arrival order
    pending: Mutex<VecDeque<SessionId>>,
    /// Every accepted session, whatever its status
    sessions: DashMap<SessionId, ChatSession>,
}

impl SessionQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            sessions: DashMap::new(),
        }
    }

    /// Add a session to the tail of the queue and to the lookup table
    pub fn enqueue(&self, session: ChatSession) -> SessionId {
        let session_id = session.id;
        let mut pending = self.pending.lock();
        self.sessions.insert(session_id, session);
        pending.push_back(session_id);
        info!("📥 Enqueued session {} (queue size: {})", session_id, pending.len());
        session_id
    }

    /// Remove and return the head of the queue
    pub fn dequeue(&self) -> Option<SessionId> {
        let session_id = self.pending.lock().pop_front();
        if let Some(id) = &session_id {
            debug!("📤 Dequeued session {}", id);
        }
        session_id
    }

    /// Remove the head of the queue only if it is `session_id`
    pub fn dequeue_if_head(&self, session_id: &SessionId) -> bool {
        let mut pending = self.pending.lock();
        if pending.front() == Some(session_id) {
            pending.pop_front();
            debug!("📤 Dequeued session {}", session_id);
            true
        } else {
            false
        }
    }

    /// Snapshot of the head of the queue without removing it
    pub fn peek(&self) -> Option<ChatSession> {
        let pending = self.pending.lock();
        pending
            .front()
            .and_then(|id| self.sessions.get(id).map(|s| s.clone()))
    }

    /// Drop a session from the waiting line, keeping it in the lookup table
    pub fn remove_pending(&self, session_id: &SessionId) -> bool {
        let mut pending = self.pending.lock();
        match pending.iter().position(|id| id == session_id) {
            Some(index) => {
                pending.remove(index);
                true
            }
            None => false,
        }
    }

    /// Snapshot of a session by id
    pub fn session(&self, session_id: &SessionId) -> Option<ChatSession> {
        self.sessions.get(session_id).map(|s| s.clone())
    }

    /// Mutate a session in place
    pub(crate) fn update_session<R>(
        &self,
        session_id: &SessionId,
        f: impl FnOnce(&mut ChatSession) -> R,
    ) -> Option<R> {
        self.sessions.get_mut(session_id).map(|mut s| f(s.value_mut()))
    }

    /// Ids of every known session
    pub fn session_ids(&self) -> Vec<SessionId> {
        self.sessions.iter().map(|entry| *entry.key()).collect()
    }

    /// Snapshot of every known session
    pub fn all_sessions(&self) -> Vec<ChatSession> {
        self.sessions.iter().map(|entry| entry.value().clone()).collect()
    }

    /// Number of sessions waiting for an agent
    pub fn queued_count(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    /// Sessions that count against the queue limit
    pub fn total_active_or_queued(&self) -> usize {
        self.sessions
            .iter()
            .filter(|entry| entry.value().status.is_active_or_queued())
            .count()
    }

    /// Queue statistics
    pub fn stats(&self) -> QueueStats {
        let mut stats = QueueStats {
            queued: self.queued_count(),
            ..Default::default()
        };

        for entry in self.sessions.iter() {
            stats.total_sessions += 1;
            if entry.value().status.is_active_or_queued() {
                stats.active_or_queued += 1;
            }
        }

        stats
    }
}

impl Default for SessionQueue {
    fn default() -> Self {
        Self::new()
    }
}

/// Queue statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub queued: usize,
    pub active_or_queued: usize,
    pub total_sessions: usize,
}
