use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::{Mutex, RwLock};
use tracing::{debug, info, warn};

use super::types::{AgentSnapshot, CreateChatResponse, PollResponse, StatusSnapshot};
use crate::agent::{Agent, AgentId, Roster};
use crate::clock::{Clock, SystemClock};
use crate::config::QUEUE_ELASTICITY;
use crate::error::{ChatEngineError, Result};
use crate::queue::{QueueStats, SessionQueue};
use crate::routing::AssignmentEngine;
use crate::session::{ChatSession, ChatSessionStatus, SessionId};
use crate::shift::ShiftClock;

/// Capacity and admission coordinator
///
/// Owns the roster and the session queue. Everything outside the crate goes
/// through the methods here; the collections themselves are never handed
/// out for mutation.
///
/// Lock order is admission → roster → round-robin table → queue. Session
/// creation is serialized by the admission lock; polls and capacity reads do
/// not take it and may see occupancy that is one operation stale.
pub struct ChatCoordinator {
    roster: RwLock<Roster>,
    queue: SessionQueue,
    assignment: AssignmentEngine,
    shift_clock: ShiftClock,
    clock: Arc<dyn Clock>,
    admission: Mutex<()>,
}

impl ChatCoordinator {
    /// Create a coordinator over `roster`, reading time from `clock`
    pub fn new(roster: Roster, clock: Arc<dyn Clock>) -> Self {
        info!("🎯 Creating ChatCoordinator with {} agents", roster.len());
        Self {
            roster: RwLock::new(roster),
            queue: SessionQueue::new(),
            assignment: AssignmentEngine::new(),
            shift_clock: ShiftClock::new(),
            clock,
            admission: Mutex::new(()),
        }
    }

    /// Create a coordinator on the system clock
    pub fn with_system_clock(roster: Roster) -> Self {
        Self::new(roster, Arc::new(SystemClock))
    }

    /// Current time according to the coordinator's clock
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Recompute every agent's on/off shift flag
    pub fn refresh_shift_status(&self, now: DateTime<Utc>) {
        let mut roster = self.roster.write();
        self.shift_clock.update_agent_shift_status(roster.agents_mut(), now);
    }

    /// Capacity of the on-shift regular team.
    ///
    /// The sum is truncated once, after adding every agent's units.
    pub fn current_team_capacity(&self, now: DateTime<Utc>) -> usize {
        self.refresh_shift_status(now);
        Self::sum_capacity(&self.roster.read(), |agent| !agent.is_overflow())
    }

    /// Capacity of the on-shift overflow pool; zero outside office hours
    pub fn overflow_capacity(&self, now: DateTime<Utc>) -> usize {
        if !self.shift_clock.is_office_hours(now) {
            return 0;
        }

        self.refresh_shift_status(now);
        Self::sum_capacity(&self.roster.read(), |agent| agent.is_overflow())
    }

    /// Maximum number of queued plus active sessions accepted right now.
    ///
    /// Overflow room is added only while in office hours and once occupancy
    /// has reached the base limit; this is re-evaluated on every call.
    pub fn max_queue_length(&self, now: DateTime<Utc>) -> usize {
        let occupancy = self.queue.total_active_or_queued();
        self.admission_limit(now, occupancy)
    }

    fn admission_limit(&self, now: DateTime<Utc>, occupancy: usize) -> usize {
        let team_capacity = self.current_team_capacity(now);
        let base = Self::elastic(team_capacity);

        if self.shift_clock.is_office_hours(now) && occupancy >= base {
            let overflow_capacity = self.overflow_capacity(now);
            debug!(
                "Overflow activated: occupancy {} >= base limit {}, adding {} overflow capacity",
                occupancy, base, overflow_capacity
            );
            return base + Self::elastic(overflow_capacity);
        }

        base
    }

    fn elastic(capacity: usize) -> usize {
        (capacity as f64 * QUEUE_ELASTICITY) as usize
    }

    fn sum_capacity(roster: &Roster, include: impl Fn(&Agent) -> bool) -> usize {
        let total: f64 = roster
            .agents()
            .iter()
            .filter(|agent| include(agent) && !agent.is_shift_over())
            .map(|agent| agent.capacity_units())
            .sum();
        total as usize
    }

    /// Admit or refuse a new chat and try to place it with an agent at once.
    ///
    /// A refused session is never stored; polling its id reports
    /// "Session not found.".
    pub fn create_chat_session(&self) -> CreateChatResponse {
        let _admission = self.admission.lock();
        let now = self.clock.now();

        self.refresh_shift_status(now);
        let occupancy = self.queue.total_active_or_queued();
        let limit = self.admission_limit(now, occupancy);

        if occupancy >= limit {
            let refused = ChatSession::refused(now);
            warn!(
                "🚫 Refusing chat {}: {} sessions active or queued, limit {}",
                refused.id, occupancy, limit
            );
            return CreateChatResponse::refused(refused.id);
        }

        let session_id = self.queue.enqueue(ChatSession::new(now));

        {
            let mut roster = self.roster.write();
            self.assignment.assign_next(&self.queue, &mut roster);
        }

        let status = self
            .queue
            .session(&session_id)
            .map(|s| s.status)
            .unwrap_or(ChatSessionStatus::Queued);

        info!(
            "💬 Accepted chat {} ({}), occupancy {}/{}",
            session_id,
            status,
            occupancy + 1,
            limit
        );

        CreateChatResponse::accepted(session_id, status)
    }

    /// Client keep-alive
    pub fn poll(&self, session_id: &SessionId) -> PollResponse {
        let now = self.clock.now();

        let outcome = self.queue.update_session(session_id, |session| {
            if session.status == ChatSessionStatus::Inactive {
                None
            } else {
                session.record_poll(now);
                Some(session.status)
            }
        });

        match outcome {
            None => PollResponse::not_found(*session_id),
            Some(None) => PollResponse::no_longer_active(*session_id),
            Some(Some(status)) => PollResponse::ok(*session_id, status),
        }
    }

    /// Capacity figures and on-shift agents at `now`
    pub fn status(&self, now: DateTime<Utc>) -> StatusSnapshot {
        let team_capacity = self.current_team_capacity(now);
        let overflow_capacity = self.overflow_capacity(now);
        let max_queue_length = self.max_queue_length(now);
        let stats = self.queue.stats();

        let active_agents = self
            .roster
            .read()
            .agents()
            .iter()
            .filter(|agent| !agent.is_shift_over())
            .map(AgentSnapshot::from)
            .collect();

        StatusSnapshot {
            current_time: now,
            team_capacity,
            overflow_capacity,
            max_queue_length,
            queued_sessions: stats.queued,
            active_or_queued_sessions: stats.active_or_queued,
            active_agents,
        }
    }

    /// Drain the queue in order until the head cannot be placed
    pub fn assign_all_pending(&self) -> usize {
        let mut roster = self.roster.write();
        self.assignment.assign_all_pending(&self.queue, &mut roster)
    }

    /// Free the slot `session_id` holds on `agent_id`
    pub(crate) fn release_agent_slot(
        &self,
        agent_id: &AgentId,
        session_id: &SessionId,
    ) -> Result<bool> {
        let mut roster = self.roster.write();
        let agent = roster
            .get_mut(agent_id)
            .ok_or_else(|| ChatEngineError::not_found(format!("agent {}", agent_id)))?;
        Ok(agent.remove_chat(session_id))
    }

    pub(crate) fn queue(&self) -> &SessionQueue {
        &self.queue
    }

    /// Snapshot of a session
    pub fn session(&self, session_id: &SessionId) -> Option<ChatSession> {
        self.queue.session(session_id)
    }

    /// Snapshot of every known session
    pub fn sessions(&self) -> Vec<ChatSession> {
        self.queue.all_sessions()
    }

    pub fn queue_stats(&self) -> QueueStats {
        self.queue.stats()
    }

    /// Snapshot of the roster
    pub fn agents(&self) -> Vec<Agent> {
        self.roster.read().agents().to_vec()
    }
}
