//! Response and snapshot types returned by the coordinator

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::{Agent, Seniority};
use crate::session::{ChatSessionStatus, SessionId};

pub const MSG_CONNECTED: &str = "You are now connected to an agent.";
pub const MSG_QUEUED: &str = "You are in the queue. Please wait.";
pub const MSG_REFUSED: &str = "All agents are busy. Please try again later.";
pub const MSG_POLL_OK: &str = "OK";
pub const MSG_NO_LONGER_ACTIVE: &str = "Session is no longer active.";
pub const MSG_NOT_FOUND: &str = "Session not found.";

/// Outcome of a create-session request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateChatResponse {
    pub session_id: SessionId,
    pub status: ChatSessionStatus,
    pub message: String,
}

impl CreateChatResponse {
    pub(crate) fn accepted(session_id: SessionId, status: ChatSessionStatus) -> Self {
        let message = if status == ChatSessionStatus::Active {
            MSG_CONNECTED
        } else {
            MSG_QUEUED
        };
        Self {
            session_id,
            status,
            message: message.to_string(),
        }
    }

    pub(crate) fn refused(session_id: SessionId) -> Self {
        Self {
            session_id,
            status: ChatSessionStatus::Refused,
            message: MSG_REFUSED.to_string(),
        }
    }

    pub fn is_refused(&self) -> bool {
        self.status == ChatSessionStatus::Refused
    }
}

/// Outcome of a client poll
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PollResponse {
    pub session_id: SessionId,
    pub status: ChatSessionStatus,
    pub message: String,
}

impl PollResponse {
    pub(crate) fn ok(session_id: SessionId, status: ChatSessionStatus) -> Self {
        Self {
            session_id,
            status,
            message: MSG_POLL_OK.to_string(),
        }
    }

    pub(crate) fn no_longer_active(session_id: SessionId) -> Self {
        Self {
            session_id,
            status: ChatSessionStatus::Inactive,
            message: MSG_NO_LONGER_ACTIVE.to_string(),
        }
    }

    pub(crate) fn not_found(session_id: SessionId) -> Self {
        Self {
            session_id,
            status: ChatSessionStatus::Inactive,
            message: MSG_NOT_FOUND.to_string(),
        }
    }
}

/// Read-only view of an on-shift agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub name: String,
    pub team: String,
    pub seniority: Seniority,
    pub max_concurrency: usize,
    pub available_slots: usize,
    pub active_chats: usize,
    pub is_overflow: bool,
}

impl From<&Agent> for AgentSnapshot {
    fn from(agent: &Agent) -> Self {
        Self {
            name: agent.name.clone(),
            team: agent.team.clone(),
            seniority: agent.seniority(),
            max_concurrency: agent.max_concurrency(),
            available_slots: agent.available_slots(),
            active_chats: agent.active_chat_count(),
            is_overflow: agent.is_overflow(),
        }
    }
}

/// Capacity and staffing at a point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusSnapshot {
    pub current_time: DateTime<Utc>,
    pub team_capacity: usize,
    pub overflow_capacity: usize,
    pub max_queue_length: usize,
    pub queued_sessions: usize,
    pub active_or_queued_sessions: usize,
    pub active_agents: Vec<AgentSnapshot>,
}
