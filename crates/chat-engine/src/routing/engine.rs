use parking_lot::Mutex;
use tracing::{debug, warn};

use crate::agent::{AgentId, Roster, Seniority};
use crate::queue::SessionQueue;
use crate::session::{ChatSessionStatus, SessionId};

/// Result of a single assignment attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignmentDecision {
    /// Head session handed to an agent
    Assigned { session_id: SessionId, agent_id: AgentId },
    /// Nothing waiting
    QueueEmpty,
    /// Head session is no longer waiting (already inactive)
    HeadNotQueued { session_id: SessionId },
    /// No tier has an agent with a free slot
    NoAgentAvailable { session_id: SessionId },
}

impl AssignmentDecision {
    pub fn is_assigned(&self) -> bool {
        matches!(self, AssignmentDecision::Assigned { .. })
    }
}

/// Seniority-tiered round-robin dispatcher
///
/// Holding the round-robin table lock for a whole attempt also serializes
/// every dequeue, so the head that was peeked is the head that gets removed.
pub struct AssignmentEngine {
    /// Next pick per tier, indexed by `Seniority::index()`
    round_robin: Mutex<[usize; 4]>,
}

impl AssignmentEngine {
    pub fn new() -> Self {
        Self {
            round_robin: Mutex::new([0; 4]),
        }
    }

    /// Try to hand the head of the queue to an agent.
    ///
    /// The caller holds the roster exclusively for the duration of the call.
    pub fn assign_next(&self, queue: &SessionQueue, roster: &mut Roster) -> AssignmentDecision {
        let mut round_robin = self.round_robin.lock();

        let head = match queue.peek() {
            Some(session) => session,
            None => return AssignmentDecision::QueueEmpty,
        };

        if head.status != ChatSessionStatus::Queued {
            debug!("Head session {} is {}, not assignable", head.id, head.status);
            return AssignmentDecision::HeadNotQueued { session_id: head.id };
        }

        for tier in Seniority::ASSIGNMENT_PRIORITY {
            let candidates: Vec<usize> = roster
                .agents()
                .iter()
                .enumerate()
                .filter(|(_, agent)| agent.can_accept_chat())
                .filter(|(_, agent)| agent.assignment_tier() == tier)
                .filter(|(_, agent)| agent.available_slots() > 0)
                .map(|(index, _)| index)
                .collect();

            if candidates.is_empty() {
                continue;
            }

            let counter = &mut round_robin[tier.index()];
            let chosen = candidates[*counter % candidates.len()];
            *counter = counter.wrapping_add(1);

            let agent = &mut roster.agents_mut()[chosen];
            if !agent.assign_chat(head.id) {
                warn!("Agent {} refused session {} despite free slot", agent.name, head.id);
                return AssignmentDecision::NoAgentAvailable { session_id: head.id };
            }

            let agent_id = agent.id;
            let activated = queue
                .update_session(&head.id, |session| {
                    if session.status == ChatSessionStatus::Queued {
                        session.status = ChatSessionStatus::Active;
                        session.assigned_agent_id = Some(agent_id);
                        true
                    } else {
                        false
                    }
                })
                .unwrap_or(false);

            if !activated {
                // Expired between peek and activation
                agent.remove_chat(&head.id);
                return AssignmentDecision::HeadNotQueued { session_id: head.id };
            }

            if !queue.dequeue_if_head(&head.id) {
                warn!("Session {} left the queue head during assignment", head.id);
            }

            debug!(
                "🎯 Assigned session {} to {} ({} tier, {} slots left)",
                head.id,
                agent.name,
                tier,
                agent.available_slots()
            );

            return AssignmentDecision::Assigned {
                session_id: head.id,
                agent_id,
            };
        }

        AssignmentDecision::NoAgentAvailable { session_id: head.id }
    }

    /// Assign queued sessions in order until the queue is empty or the head
    /// cannot be placed. Returns the number of sessions assigned.
    pub fn assign_all_pending(&self, queue: &SessionQueue, roster: &mut Roster) -> usize {
        let mut assigned = 0;

        while !queue.is_empty() {
            if !self.assign_next(queue, roster).is_assigned() {
                break;
            }
            assigned += 1;
        }

        assigned
    }
}

impl Default for AssignmentEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Agent;
    use crate::session::ChatSession;
    use crate::shift::ShiftType;
    use chrono::Utc;

    fn agent(name: &str, seniority: Seniority) -> Agent {
        Agent::new(name, "TeamT", seniority, ShiftType::Day)
    }

    fn enqueue(queue: &SessionQueue, count: usize) -> Vec<SessionId> {
        (0..count).map(|_| queue.enqueue(ChatSession::new(Utc::now()))).collect()
    }

    fn active_counts(roster: &Roster) -> Vec<usize> {
        roster.agents().iter().map(|a| a.active_chat_count()).collect()
    }

    #[test]
    fn test_prefers_junior_first() {
        let engine = AssignmentEngine::new();
        let queue = SessionQueue::new();
        let mut roster = Roster::new(vec![agent("Snr", Seniority::Senior), agent("Jnr", Seniority::Junior)]);
        let ids = enqueue(&queue, 1);

        let decision = engine.assign_next(&queue, &mut roster);

        let junior_id = roster.agents()[1].id;
        assert_eq!(decision, AssignmentDecision::Assigned { session_id: ids[0], agent_id: junior_id });
        let session = queue.session(&ids[0]).unwrap();
        assert_eq!(session.status, ChatSessionStatus::Active);
        assert_eq!(session.assigned_agent_id, Some(junior_id));
        assert_eq!(active_counts(&roster), vec![0, 1]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_falls_back_to_next_tier_when_junior_full() {
        let engine = AssignmentEngine::new();
        let queue = SessionQueue::new();
        let mut roster = Roster::new(vec![agent("Snr", Seniority::Senior), agent("Jnr", Seniority::Junior)]);
        for _ in 0..4 {
            roster.agents_mut()[1].assign_chat(SessionId::new());
        }
        let ids = enqueue(&queue, 1);

        engine.assign_next(&queue, &mut roster);

        let session = queue.session(&ids[0]).unwrap();
        assert_eq!(session.assigned_agent_id, Some(roster.agents()[0].id));
    }

    #[test]
    fn test_empty_queue() {
        let engine = AssignmentEngine::new();
        let queue = SessionQueue::new();
        let mut roster = Roster::new(vec![agent("Jnr", Seniority::Junior)]);

        assert_eq!(engine.assign_next(&queue, &mut roster), AssignmentDecision::QueueEmpty);
    }

    #[test]
    fn test_no_agent_leaves_head_in_place() {
        let engine = AssignmentEngine::new();
        let queue = SessionQueue::new();
        let mut roster = Roster::new(vec![agent("Jnr", Seniority::Junior)]);
        roster.agents_mut()[0].set_shift_over(true);
        let ids = enqueue(&queue, 2);

        let decision = engine.assign_next(&queue, &mut roster);

        assert_eq!(decision, AssignmentDecision::NoAgentAvailable { session_id: ids[0] });
        assert_eq!(queue.queued_count(), 2);
        assert_eq!(queue.peek().map(|s| s.id), Some(ids[0]));
        assert_eq!(queue.session(&ids[0]).unwrap().status, ChatSessionStatus::Queued);
        assert_eq!(active_counts(&roster), vec![0]);
    }

    #[test]
    fn test_head_not_queued_blocks() {
        let engine = AssignmentEngine::new();
        let queue = SessionQueue::new();
        let mut roster = Roster::new(vec![agent("Jnr", Seniority::Junior)]);
        let ids = enqueue(&queue, 2);
        queue.update_session(&ids[0], |s| s.status = ChatSessionStatus::Inactive);

        let decision = engine.assign_next(&queue, &mut roster);

        assert_eq!(decision, AssignmentDecision::HeadNotQueued { session_id: ids[0] });
        assert_eq!(queue.session(&ids[1]).unwrap().status, ChatSessionStatus::Queued);
        assert_eq!(active_counts(&roster), vec![0]);
    }

    #[test]
    fn test_round_robin_within_tier() {
        let engine = AssignmentEngine::new();
        let queue = SessionQueue::new();
        let mut roster = Roster::new(vec![
            agent("Mid1", Seniority::MidLevel),
            agent("Mid2", Seniority::MidLevel),
            agent("Mid3", Seniority::MidLevel),
        ]);
        enqueue(&queue, 3);

        assert_eq!(engine.assign_all_pending(&queue, &mut roster), 3);
        assert_eq!(active_counts(&roster), vec![1, 1, 1]);
    }

    #[test]
    fn test_senior_and_junior_five_chats() {
        let engine = AssignmentEngine::new();
        let queue = SessionQueue::new();
        let mut roster = Roster::new(vec![agent("Snr", Seniority::Senior), agent("Jnr", Seniority::Junior)]);
        enqueue(&queue, 5);

        engine.assign_all_pending(&queue, &mut roster);

        assert_eq!(active_counts(&roster), vec![1, 4]);
    }

    #[test]
    fn test_two_juniors_one_mid_six_chats() {
        let engine = AssignmentEngine::new();
        let queue = SessionQueue::new();
        let mut roster = Roster::new(vec![
            agent("Mid", Seniority::MidLevel),
            agent("Jnr1", Seniority::Junior),
            agent("Jnr2", Seniority::Junior),
        ]);
        enqueue(&queue, 6);

        engine.assign_all_pending(&queue, &mut roster);

        assert_eq!(active_counts(&roster), vec![0, 3, 3]);
    }

    #[test]
    fn test_fifo_when_only_one_slot() {
        let engine = AssignmentEngine::new();
        let queue = SessionQueue::new();
        let mut roster = Roster::new(vec![agent("Jnr", Seniority::Junior)]);
        for _ in 0..3 {
            roster.agents_mut()[0].assign_chat(SessionId::new());
        }
        let ids = enqueue(&queue, 2);

        assert_eq!(engine.assign_all_pending(&queue, &mut roster), 1);

        assert_eq!(queue.session(&ids[0]).unwrap().status, ChatSessionStatus::Active);
        assert_eq!(queue.session(&ids[1]).unwrap().status, ChatSessionStatus::Queued);
        assert_eq!(queue.peek().map(|s| s.id), Some(ids[1]));
    }

    #[test]
    fn test_overflow_agents_only_in_junior_tier() {
        let engine = AssignmentEngine::new();
        let queue = SessionQueue::new();
        let mut roster = Roster::new(vec![agent("Snr", Seniority::Senior), Agent::overflow("Overflow-1")]);
        enqueue(&queue, 5);

        engine.assign_all_pending(&queue, &mut roster);

        // Overflow fills its four Junior-tier slots before the senior is used
        assert_eq!(active_counts(&roster), vec![1, 4]);
    }

    #[test]
    fn test_round_robin_counter_persists_across_skips() {
        let engine = AssignmentEngine::new();
        let queue = SessionQueue::new();
        let mut roster = Roster::new(vec![agent("Mid1", Seniority::MidLevel), agent("Mid2", Seniority::MidLevel)]);

        enqueue(&queue, 1);
        engine.assign_all_pending(&queue, &mut roster);
        assert_eq!(active_counts(&roster), vec![1, 0]);

        // Mid tier skipped while a junior is on duty
        roster = {
            let mut agents = roster.agents().to_vec();
            agents.push(agent("Jnr", Seniority::Junior));
            Roster::new(agents)
        };
        enqueue(&queue, 1);
        engine.assign_all_pending(&queue, &mut roster);
        assert_eq!(active_counts(&roster), vec![1, 0, 1]);

        roster.agents_mut()[2].set_shift_over(true);
        enqueue(&queue, 1);
        engine.assign_all_pending(&queue, &mut roster);
        assert_eq!(active_counts(&roster), vec![1, 1, 1]);
    }

    #[test]
    fn test_never_exceeds_capacity() {
        let engine = AssignmentEngine::new();
        let queue = SessionQueue::new();
        let mut roster = Roster::new(vec![agent("Jnr", Seniority::Junior), agent("Lead", Seniority::TeamLead)]);
        enqueue(&queue, 20);

        assert_eq!(engine.assign_all_pending(&queue, &mut roster), 9);
        assert_eq!(queue.queued_count(), 11);
        for agent in roster.agents() {
            assert!(agent.active_chat_count() <= agent.max_concurrency());
        }
    }
}
