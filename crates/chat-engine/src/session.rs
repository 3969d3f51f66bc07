//! Chat session types

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::agent::AgentId;

/// Unique identifier for a chat session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(SessionId)
    }
}

/// Session status
///
/// `Queued -> Active -> Inactive` is the only forward path; `Queued` may also
/// go straight to `Inactive` if the client stops polling. `Inactive` and
/// `Refused` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChatSessionStatus {
    Queued,
    Active,
    Inactive,
    Refused,
}

impl ChatSessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ChatSessionStatus::Inactive | ChatSessionStatus::Refused)
    }

    /// Counted against the queue limit
    pub fn is_active_or_queued(&self) -> bool {
        matches!(self, ChatSessionStatus::Queued | ChatSessionStatus::Active)
    }
}

impl fmt::Display for ChatSessionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ChatSessionStatus::Queued => "Queued",
            ChatSessionStatus::Active => "Active",
            ChatSessionStatus::Inactive => "Inactive",
            ChatSessionStatus::Refused => "Refused",
        };
        write!(f, "{}", s)
    }
}

/// A customer chat request as tracked by the engine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSession {
    pub id: SessionId,
    pub status: ChatSessionStatus,
    pub created_at: DateTime<Utc>,
    pub last_poll_at: DateTime<Utc>,
    pub missed_polls: u32,
    /// Back-reference only; the agent's active set is authoritative
    pub assigned_agent_id: Option<AgentId>,
}

impl ChatSession {
    /// A fresh session waiting in the queue
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: SessionId::new(),
            status: ChatSessionStatus::Queued,
            created_at: now,
            last_poll_at: now,
            missed_polls: 0,
            assigned_agent_id: None,
        }
    }

    /// A session that exists only to carry a refusal back to the caller
    pub fn refused(now: DateTime<Utc>) -> Self {
        Self {
            status: ChatSessionStatus::Refused,
            ..Self::new(now)
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Successful client poll: liveness is reset
    pub fn record_poll(&mut self, now: DateTime<Utc>) {
        self.last_poll_at = now;
        self.missed_polls = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_queued() {
        let now = Utc::now();
        let session = ChatSession::new(now);
        assert_eq!(session.status, ChatSessionStatus::Queued);
        assert_eq!(session.missed_polls, 0);
        assert_eq!(session.created_at, now);
        assert_eq!(session.last_poll_at, now);
        assert!(session.assigned_agent_id.is_none());
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(ChatSessionStatus::Inactive.is_terminal());
        assert!(ChatSessionStatus::Refused.is_terminal());
        assert!(!ChatSessionStatus::Queued.is_terminal());
        assert!(!ChatSessionStatus::Active.is_terminal());
        assert!(ChatSession::refused(Utc::now()).is_terminal());
    }

    #[test]
    fn test_session_id_parse() {
        let id = SessionId::new();
        let parsed: SessionId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert!("not-a-session".parse::<SessionId>().is_err());
    }
}
