//! Agent identity, seniority tiers and per-agent chat capacity

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::CAPACITY_FACTOR;
use crate::session::SessionId;
use crate::shift::ShiftType;

/// Unique identifier for an agent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub Uuid);

impl AgentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for AgentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Agent seniority tier
///
/// The TeamLead multiplier sits below Senior on purpose: leads carry fewer
/// concurrent chats than seniors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Seniority {
    Junior,
    MidLevel,
    Senior,
    TeamLead,
}

impl Seniority {
    /// Order in which tiers are offered new chats
    pub const ASSIGNMENT_PRIORITY: [Seniority; 4] = [
        Seniority::Junior,
        Seniority::MidLevel,
        Seniority::Senior,
        Seniority::TeamLead,
    ];

    /// Capacity multiplier for this tier
    pub fn multiplier(&self) -> f64 {
        match self {
            Seniority::Junior => 0.4,
            Seniority::MidLevel => 0.6,
            Seniority::Senior => 0.8,
            Seniority::TeamLead => 0.5,
        }
    }

    /// Dense index, used for per-tier tables
    pub fn index(&self) -> usize {
        match self {
            Seniority::Junior => 0,
            Seniority::MidLevel => 1,
            Seniority::Senior => 2,
            Seniority::TeamLead => 3,
        }
    }
}

impl fmt::Display for Seniority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Seniority::Junior => "Junior",
            Seniority::MidLevel => "MidLevel",
            Seniority::Senior => "Senior",
            Seniority::TeamLead => "TeamLead",
        };
        write!(f, "{}", s)
    }
}

/// A support agent and the chats currently assigned to them
///
/// `active_sessions` is only changed through [`Agent::assign_chat`] and
/// [`Agent::remove_chat`], and never grows past `max_concurrency()`.
#[derive(Debug, Clone)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub team: String,
    seniority: Seniority,
    home_shift: ShiftType,
    is_overflow: bool,
    is_shift_over: bool,
    active_sessions: Vec<SessionId>,
}

impl Agent {
    /// Create a regular team agent
    pub fn new(
        name: impl Into<String>,
        team: impl Into<String>,
        seniority: Seniority,
        home_shift: ShiftType,
    ) -> Self {
        Self {
            id: AgentId::new(),
            name: name.into(),
            team: team.into(),
            seniority,
            home_shift,
            is_overflow: false,
            is_shift_over: false,
            active_sessions: Vec::new(),
        }
    }

    /// Create an overflow agent. Overflow agents are Junior and work office hours.
    pub fn overflow(name: impl Into<String>) -> Self {
        Self {
            is_overflow: true,
            ..Self::new(name, "Overflow", Seniority::Junior, ShiftType::Day)
        }
    }

    pub fn seniority(&self) -> Seniority {
        self.seniority
    }

    /// Tier this agent is matched at; overflow agents always count as Junior
    pub fn assignment_tier(&self) -> Seniority {
        if self.is_overflow {
            Seniority::Junior
        } else {
            self.seniority
        }
    }

    pub fn home_shift(&self) -> ShiftType {
        self.home_shift
    }

    pub fn is_overflow(&self) -> bool {
        self.is_overflow
    }

    pub fn is_shift_over(&self) -> bool {
        self.is_shift_over
    }

    pub fn set_shift_over(&mut self, shift_over: bool) {
        self.is_shift_over = shift_over;
    }

    /// Capacity units this agent contributes before truncation
    pub fn capacity_units(&self) -> f64 {
        CAPACITY_FACTOR * self.seniority.multiplier()
    }

    pub fn max_concurrency(&self) -> usize {
        self.capacity_units() as usize
    }

    pub fn active_sessions(&self) -> &[SessionId] {
        &self.active_sessions
    }

    pub fn active_chat_count(&self) -> usize {
        self.active_sessions.len()
    }

    pub fn available_slots(&self) -> usize {
        self.max_concurrency() - self.active_sessions.len()
    }

    pub fn can_accept_chat(&self) -> bool {
        !self.is_shift_over && self.available_slots() > 0
    }

    /// Take on a chat. Returns `false` without touching the active set when
    /// the agent is off shift, full, or already holds the session.
    pub fn assign_chat(&mut self, session_id: SessionId) -> bool {
        if !self.can_accept_chat() || self.active_sessions.contains(&session_id) {
            return false;
        }

        self.active_sessions.push(session_id);
        assert!(
            self.active_sessions.len() <= self.max_concurrency(),
            "agent {} exceeded max concurrency {}",
            self.name,
            self.max_concurrency()
        );
        true
    }

    /// Release a chat. Unknown ids are ignored.
    pub fn remove_chat(&mut self, session_id: &SessionId) -> bool {
        match self.active_sessions.iter().position(|s| s == session_id) {
            Some(index) => {
                self.active_sessions.remove(index);
                true
            }
            None => false,
        }
    }
}
