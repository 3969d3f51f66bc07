use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::agent::Seniority;
use crate::error::{ChatEngineError, Result};
use crate::shift::ShiftType;

/// Expected client poll cadence; also the reconciliation tick period
pub const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Consecutive missed polls after which a session is marked inactive
pub const MAX_MISSED_POLLS: u32 = 3;

/// Capacity units of a full-time agent (multiplied by the seniority multiplier)
pub const CAPACITY_FACTOR: f64 = 10.0;

/// Queue length allowed per unit of capacity
pub const QUEUE_ELASTICITY: f64 = 1.5;

/// UTC hour the Day shift starts
pub const DAY_SHIFT_START_HOUR: u32 = 6;

/// UTC hour the Afternoon shift starts
pub const AFTERNOON_SHIFT_START_HOUR: u32 = 14;

/// UTC hour the Night shift starts
pub const NIGHT_SHIFT_START_HOUR: u32 = 22;

/// Chat engine configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatEngineConfig {
    /// General server settings
    pub general: GeneralConfig,

    /// Agents available to the engine
    pub roster: RosterConfig,
}

/// General server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// HTTP listen address
    pub bind_addr: String,

    /// Name used in logs
    pub app_name: String,
}

/// Static roster configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RosterConfig {
    pub agents: Vec<AgentSpec>,
}

/// One roster line
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSpec {
    pub name: String,
    pub team: String,
    pub seniority: Seniority,
    pub shift: ShiftType,
    /// Overflow agents are always Junior and only work office hours
    #[serde(default)]
    pub overflow: bool,
}

impl AgentSpec {
    pub fn new(name: &str, team: &str, seniority: Seniority, shift: ShiftType) -> Self {
        Self {
            name: name.to_string(),
            team: team.to_string(),
            seniority,
            shift,
            overflow: false,
        }
    }

    pub fn overflow(name: &str) -> Self {
        Self {
            overflow: true,
            ..Self::new(name, "Overflow", Seniority::Junior, ShiftType::Day)
        }
    }
}

impl ChatEngineConfig {
    /// Load configuration from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: ChatEngineConfig = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration for consistency and correctness
    pub fn validate(&self) -> Result<()> {
        if self.general.bind_addr.is_empty() {
            return Err(ChatEngineError::config("bind_addr cannot be empty"));
        }

        if self.general.bind_addr.parse::<SocketAddr>().is_err() {
            return Err(ChatEngineError::config(format!(
                "Invalid bind address: {}",
                self.general.bind_addr
            )));
        }

        if self.roster.agents.is_empty() {
            return Err(ChatEngineError::config("roster must contain at least one agent"));
        }

        let mut names = HashSet::new();
        for spec in &self.roster.agents {
            if spec.name.trim().is_empty() {
                return Err(ChatEngineError::config("agent name cannot be empty"));
            }
            if !names.insert(spec.name.as_str()) {
                return Err(ChatEngineError::config(format!("duplicate agent name: {}", spec.name)));
            }
        }

        Ok(())
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8080".to_string(),
            app_name: "chatdesk-chat-engine".to_string(),
        }
    }
}

impl Default for RosterConfig {
    /// Three shift teams plus six overflow agents
    fn default() -> Self {
        use Seniority::*;
        use ShiftType::*;

        let mut agents = vec![
            // Team A - Day
            AgentSpec::new("A-Lead", "TeamA", TeamLead, Day),
            AgentSpec::new("A-Mid1", "TeamA", MidLevel, Day),
            AgentSpec::new("A-Mid2", "TeamA", MidLevel, Day),
            AgentSpec::new("A-Jnr", "TeamA", Junior, Day),
            // Team B - Afternoon
            AgentSpec::new("B-Snr", "TeamB", Senior, Afternoon),
            AgentSpec::new("B-Mid", "TeamB", MidLevel, Afternoon),
            AgentSpec::new("B-Jnr1", "TeamB", Junior, Afternoon),
            AgentSpec::new("B-Jnr2", "TeamB", Junior, Afternoon),
            // Team C - Night
            AgentSpec::new("C-Mid1", "TeamC", MidLevel, Night),
            AgentSpec::new("C-Mid2", "TeamC", MidLevel, Night),
        ];

        agents.extend((1..=6).map(|i| AgentSpec::overflow(&format!("Overflow-{}", i))));

        Self { agents }
    }
}
