//! The fixed agent roster, built from configuration

use tracing::info;

use super::entry::{Agent, AgentId};
use crate::config::{AgentSpec, RosterConfig};

/// The fixed set of agents the engine dispatches to
///
/// Built once at startup; agents are never added or removed afterwards.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    agents: Vec<Agent>,
}

impl Roster {
    pub fn new(agents: Vec<Agent>) -> Self {
        Self { agents }
    }

    /// The three shift teams plus the overflow pool
    pub fn standard() -> Self {
        Self::from_config(&RosterConfig::default())
    }

    pub fn from_config(config: &RosterConfig) -> Self {
        let agents: Vec<Agent> = config.agents.iter().map(Agent::from).collect();
        info!(
            "👥 Roster built with {} agents ({} overflow)",
            agents.len(),
            agents.iter().filter(|a| a.is_overflow()).count()
        );
        Self { agents }
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agents_mut(&mut self) -> &mut [Agent] {
        &mut self.agents
    }

    pub fn get(&self, id: &AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| &a.id == id)
    }

    pub fn get_mut(&mut self, id: &AgentId) -> Option<&mut Agent> {
        self.agents.iter_mut().find(|a| &a.id == id)
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

impl From<&AgentSpec> for Agent {
    fn from(spec: &AgentSpec) -> Self {
        if spec.overflow {
            let mut agent = Agent::overflow(spec.name.clone());
            agent.team = spec.team.clone();
            agent
        } else {
            Agent::new(spec.name.clone(), spec.team.clone(), spec.seniority, spec.shift)
        }
    }
}
