//! # Session Monitoring Module
//!
//! Periodic reconciliation of the session table. Every tick:
//!
//! 1. Each queued or active session that has not polled within the poll
//!    interval gets one more missed poll. At three misses the session becomes
//!    Inactive and its agent slot, if any, is freed. A queued session that
//!    expires is also taken out of the waiting line so it cannot block the
//!    sessions behind it.
//! 2. Agent on/off shift flags are recomputed for the current time.
//! 3. The queue is drained in order for as long as the head can be placed.
//!
//! ```text
//!   interval ──► tick ──► liveness sweep ──► shift refresh ──► assign
//!      ▲                                                          │
//!      └──────────────────────────────────────────────────────────┘
//! ```
//!
//! A failing tick is logged and the loop keeps going; a panic inside a tick
//! is caught for the same reason.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::{interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::agent::AgentId;
use crate::config::{MAX_MISSED_POLLS, POLL_INTERVAL};
use crate::error::{ChatEngineError, Result};
use crate::orchestrator::ChatCoordinator;
use crate::session::{ChatSessionStatus, SessionId};

/// What a single reconciliation tick did
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonitorTickReport {
    /// Sessions marked Inactive on this tick
    pub expired: Vec<SessionId>,
    /// Sessions that missed a poll on this tick (including the expired ones)
    pub missed_poll_increments: usize,
    /// Queued sessions handed to an agent on this tick
    pub assigned: usize,
}

/// A session that crossed the missed-poll limit during the sweep
struct Expired {
    session_id: SessionId,
    agent_id: Option<AgentId>,
    was_queued: bool,
}

/// Reconciliation loop over a coordinator
pub struct SessionMonitor {
    coordinator: Arc<ChatCoordinator>,
    tick_interval: Duration,
}

impl SessionMonitor {
    pub fn new(coordinator: Arc<ChatCoordinator>) -> Self {
        Self {
            coordinator,
            tick_interval: POLL_INTERVAL,
        }
    }

    /// Override how often the loop ticks
    pub fn with_tick_interval(mut self, tick_interval: Duration) -> Self {
        self.tick_interval = tick_interval;
        self
    }

    pub fn coordinator(&self) -> &Arc<ChatCoordinator> {
        &self.coordinator
    }

    /// Run one reconciliation pass
    pub fn tick(&self) -> Result<MonitorTickReport> {
        let now = self.coordinator.now();
        let poll_interval = chrono::Duration::from_std(POLL_INTERVAL)
            .map_err(|e| ChatEngineError::internal(format!("invalid poll interval: {}", e)))?;

        let mut report = MonitorTickReport::default();
        let mut expired = Vec::new();

        let queue = self.coordinator.queue();
        for session_id in queue.session_ids() {
            // The table entry is released before any roster lock is taken
            let outcome = queue.update_session(&session_id, |session| {
                if !session.status.is_active_or_queued() {
                    return (false, None);
                }
                if now - session.last_poll_at < poll_interval {
                    return (false, None);
                }

                session.missed_polls += 1;
                if session.missed_polls < MAX_MISSED_POLLS {
                    return (true, None);
                }

                let was_queued = session.status == ChatSessionStatus::Queued;
                session.status = ChatSessionStatus::Inactive;
                (
                    true,
                    Some(Expired {
                        session_id: session.id,
                        agent_id: session.assigned_agent_id,
                        was_queued,
                    }),
                )
            });

            if let Some((missed, newly_expired)) = outcome {
                if missed {
                    report.missed_poll_increments += 1;
                }
                if let Some(entry) = newly_expired {
                    expired.push(entry);
                }
            }
        }

        let mut release_failures = Vec::new();
        for entry in expired {
            warn!(
                "⏰ Session {} missed {} polls, marking inactive",
                entry.session_id, MAX_MISSED_POLLS
            );

            if entry.was_queued {
                queue.remove_pending(&entry.session_id);
            }

            if let Some(agent_id) = entry.agent_id {
                match self.coordinator.release_agent_slot(&agent_id, &entry.session_id) {
                    Ok(true) => debug!("🔓 Freed slot on agent {} from session {}", agent_id, entry.session_id),
                    Ok(false) => debug!("Agent {} no longer held session {}", agent_id, entry.session_id),
                    Err(e) => release_failures.push(e.to_string()),
                }
            }

            report.expired.push(entry.session_id);
        }

        self.coordinator.refresh_shift_status(now);
        report.assigned = self.coordinator.assign_all_pending();

        if !release_failures.is_empty() {
            return Err(ChatEngineError::agent(format!(
                "failed to free {} agent slot(s): {}",
                release_failures.len(),
                release_failures.join(", ")
            )));
        }

        if !report.expired.is_empty() || report.assigned > 0 {
            info!(
                "🔄 Reconciled: {} expired, {} missed polls, {} assigned",
                report.expired.len(),
                report.missed_poll_increments,
                report.assigned
            );
        }

        Ok(report)
    }

    /// Tick until `cancel` fires
    pub async fn run(self, cancel: CancellationToken) {
        info!("👀 Starting session monitor (every {:?})", self.tick_interval);

        let mut ticker = interval(self.tick_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("🛑 Session monitor stopped");
                    break;
                }
                _ = ticker.tick() => {
                    match catch_unwind(AssertUnwindSafe(|| self.tick())) {
                        Ok(Ok(_)) => {}
                        Ok(Err(e)) => error!("Reconciliation tick failed: {}", e),
                        Err(_) => error!("🚨 Panic caught during reconciliation tick - monitor keeps running"),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{Agent, Roster, Seniority};
    use crate::clock::ManualClock;
    use crate::shift::ShiftType;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 2, 20, hour, 0, 0).unwrap()
    }

    fn monitor_with(agents: Vec<Agent>, hour: u32) -> (SessionMonitor, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(at(hour)));
        let coordinator = Arc::new(ChatCoordinator::new(Roster::new(agents), clock.clone()));
        (SessionMonitor::new(coordinator), clock)
    }

    #[test]
    fn test_fresh_session_not_penalized() {
        let (monitor, _) = monitor_with(vec![Agent::new("Jnr", "T", Seniority::Junior, ShiftType::Day)], 10);
        let created = monitor.coordinator().create_chat_session();

        let report = monitor.tick().unwrap();

        assert_eq!(report.missed_poll_increments, 0);
        let session = monitor.coordinator().session(&created.session_id).unwrap();
        assert_eq!(session.missed_polls, 0);
    }

    #[test]
    fn test_three_missed_polls_frees_agent() {
        let (monitor, clock) = monitor_with(vec![Agent::new("Jnr", "T", Seniority::Junior, ShiftType::Day)], 10);
        let created = monitor.coordinator().create_chat_session();
        assert_eq!(created.status, ChatSessionStatus::Active);

        for expected in 1..=2 {
            clock.advance(chrono::Duration::seconds(1));
            let report = monitor.tick().unwrap();
            assert!(report.expired.is_empty());
            assert_eq!(monitor.coordinator().session(&created.session_id).unwrap().missed_polls, expected);
        }

        clock.advance(chrono::Duration::seconds(1));
        let report = monitor.tick().unwrap();

        assert_eq!(report.expired, vec![created.session_id]);
        let session = monitor.coordinator().session(&created.session_id).unwrap();
        assert_eq!(session.status, ChatSessionStatus::Inactive);
        assert_eq!(session.missed_polls, 3);
        let agents = monitor.coordinator().agents();
        assert_eq!(agents[0].active_chat_count(), 0);
    }

    #[test]
    fn test_inactive_sessions_are_not_counted_again() {
        let (monitor, clock) = monitor_with(vec![Agent::new("Jnr", "T", Seniority::Junior, ShiftType::Day)], 10);
        let created = monitor.coordinator().create_chat_session();

        for _ in 0..5 {
            clock.advance(chrono::Duration::seconds(1));
            monitor.tick().unwrap();
        }

        let session = monitor.coordinator().session(&created.session_id).unwrap();
        assert_eq!(session.missed_polls, 3);
        assert_eq!(session.status, ChatSessionStatus::Inactive);
    }

    #[test]
    fn test_poll_keeps_session_alive() {
        let (monitor, clock) = monitor_with(vec![Agent::new("Jnr", "T", Seniority::Junior, ShiftType::Day)], 10);
        let created = monitor.coordinator().create_chat_session();

        for _ in 0..10 {
            clock.advance(chrono::Duration::milliseconds(600));
            monitor.coordinator().poll(&created.session_id);
            monitor.tick().unwrap();
        }

        let session = monitor.coordinator().session(&created.session_id).unwrap();
        assert_eq!(session.status, ChatSessionStatus::Active);
        assert_eq!(session.missed_polls, 0);
    }

    #[test]
    fn test_freed_slot_goes_to_queued_session() {
        let (monitor, clock) = monitor_with(vec![Agent::new("Jnr", "T", Seniority::Junior, ShiftType::Day)], 10);
        let coordinator = monitor.coordinator().clone();
        let active: Vec<_> = (0..4).map(|_| coordinator.create_chat_session()).collect();
        let waiting = coordinator.create_chat_session();
        assert_eq!(waiting.status, ChatSessionStatus::Queued);

        for _ in 0..3 {
            clock.advance(chrono::Duration::seconds(1));
            for response in &active[1..] {
                coordinator.poll(&response.session_id);
            }
            coordinator.poll(&waiting.session_id);
            monitor.tick().unwrap();
        }

        let expired = coordinator.session(&active[0].session_id).unwrap();
        assert_eq!(expired.status, ChatSessionStatus::Inactive);
        let promoted = coordinator.session(&waiting.session_id).unwrap();
        assert_eq!(promoted.status, ChatSessionStatus::Active);
        assert_eq!(coordinator.queue_stats().queued, 0);
    }

    #[test]
    fn test_expired_queued_session_leaves_queue() {
        // One junior: four chats active, the fifth waits
        let (monitor, clock) = monitor_with(vec![Agent::new("Jnr", "T", Seniority::Junior, ShiftType::Day)], 10);
        let coordinator = monitor.coordinator().clone();
        let responses: Vec<_> = (0..5).map(|_| coordinator.create_chat_session()).collect();
        let queued = &responses[4];
        assert_eq!(queued.status, ChatSessionStatus::Queued);

        for _ in 0..3 {
            clock.advance(chrono::Duration::seconds(1));
            for response in &responses[..4] {
                coordinator.poll(&response.session_id);
            }
            monitor.tick().unwrap();
        }

        let session = coordinator.session(&queued.session_id).unwrap();
        assert_eq!(session.status, ChatSessionStatus::Inactive);
        assert!(session.assigned_agent_id.is_none());
        assert_eq!(coordinator.queue_stats().queued, 0);
    }

    #[test]
    fn test_tick_refreshes_shifts_and_assigns() {
        let (monitor, clock) = monitor_with(
            vec![
                Agent::new("Day", "T", Seniority::Junior, ShiftType::Day),
                Agent::new("Afternoon", "T", Seniority::Junior, ShiftType::Afternoon),
            ],
            13,
        );
        let coordinator = monitor.coordinator().clone();
        let responses: Vec<_> = (0..6).map(|_| coordinator.create_chat_session()).collect();
        assert_eq!(coordinator.queue_stats().queued, 2);

        clock.set(at(14));
        for response in &responses {
            coordinator.poll(&response.session_id);
        }
        let report = monitor.tick().unwrap();

        assert_eq!(report.assigned, 2);
        let afternoon = coordinator
            .agents()
            .into_iter()
            .find(|a| a.name == "Afternoon")
            .unwrap();
        assert_eq!(afternoon.active_chat_count(), 2);
        assert!(!afternoon.is_shift_over());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_on_cancel() {
        let (monitor, _) = monitor_with(vec![Agent::new("Jnr", "T", Seniority::Junior, ShiftType::Day)], 10);
        let cancel = CancellationToken::new();
        let handle = tokio::spawn(monitor.run(cancel.clone()));

        tokio::time::sleep(Duration::from_secs(3)).await;
        cancel.cancel();

        handle.await.unwrap();
    }

    #[test]
    fn test_tick_fails_when_agent_slot_cannot_be_freed() {
        let (monitor, clock) = monitor_with(vec![Agent::new("Jnr", "T", Seniority::Junior, ShiftType::Day)], 10);
        let coordinator = monitor.coordinator().clone();
        let orphan = coordinator.create_chat_session();
        let healthy = coordinator.create_chat_session();
        coordinator
            .queue()
            .update_session(&orphan.session_id, |s| s.assigned_agent_id = Some(AgentId::new()));

        for _ in 0..2 {
            clock.advance(chrono::Duration::seconds(1));
            monitor.tick().unwrap();
        }
        clock.advance(chrono::Duration::seconds(1));
        let result = monitor.tick();

        assert!(matches!(result, Err(ChatEngineError::Agent(_))));
        // The rest of the tick still ran
        for id in [orphan.session_id, healthy.session_id] {
            assert_eq!(coordinator.session(&id).unwrap().status, ChatSessionStatus::Inactive);
        }
        assert_eq!(coordinator.agents()[0].active_chat_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_keeps_ticking_after_failed_tick() {
        let (monitor, clock) = monitor_with(vec![Agent::new("Jnr", "T", Seniority::Junior, ShiftType::Day)], 10);
        let coordinator = monitor.coordinator().clone();
        let orphan = coordinator.create_chat_session();
        coordinator
            .queue()
            .update_session(&orphan.session_id, |s| s.assigned_agent_id = Some(AgentId::new()));
        clock.advance(chrono::Duration::seconds(10));

        let cancel = CancellationToken::new();
        let handle = tokio::spawn(monitor.run(cancel.clone()));

        // Ticks at 0s, 1s and 2s; the third one fails
        tokio::time::sleep(Duration::from_millis(3500)).await;
        assert_eq!(coordinator.session(&orphan.session_id).unwrap().status, ChatSessionStatus::Inactive);

        let later = coordinator.create_chat_session();
        clock.advance(chrono::Duration::seconds(10));
        tokio::time::sleep(Duration::from_secs(4)).await;
        cancel.cancel();
        handle.await.unwrap();

        assert_eq!(coordinator.session(&later.session_id).unwrap().status, ChatSessionStatus::Inactive);
    }
}
