//! # Chat Engine
//!
//! Admission control and agent dispatch for a live-chat support queue.
//!
//! Customers open a chat session, which is either refused (the queue is
//! full), queued, or handed to an agent straight away. Clients keep their
//! session alive by polling; a background monitor expires sessions that stop
//! polling and frees the agent slot they held.
//!
//! ## Architecture
//!
//! ```text
//!   HTTP (api) ─────────────► ChatCoordinator ◄──────────── SessionMonitor
//!                               │        │                  (every second)
//!                 ┌─────────────┘        └─────────────┐
//!                 ▼                                    ▼
//!          Roster + ShiftClock                   SessionQueue
//!                 │                                    │
//!                 └──────────► AssignmentEngine ◄──────┘
//! ```
//!
//! - Capacity is derived from the agents on shift: each agent contributes
//!   `10 × seniority multiplier` concurrent chats.
//! - The queue accepts up to 1.5× the team's capacity, plus 1.5× the overflow
//!   pool's capacity during office hours once the base limit is reached.
//! - Chats go to the least senior tier with free slots, round robin inside
//!   the tier, strictly in arrival order.
//!
//! ## Quick start
//!
//! ```rust
//! use chatdesk_chat_engine::prelude::*;
//!
//! let coordinator = ChatCoordinator::with_system_clock(Roster::standard());
//! let response = coordinator.create_chat_session();
//! println!("{}: {}", response.status, response.message);
//! ```

pub mod agent;
pub mod api;
pub mod clock;
pub mod config;
pub mod error;
pub mod logging;
pub mod monitoring;
pub mod orchestrator;
pub mod queue;
pub mod routing;
pub mod server;
pub mod session;
pub mod shift;

pub use error::{ChatEngineError, Result};
pub use server::{ChatEngineServer, ChatEngineServerBuilder};

/// Re-export of common types for easier use
pub mod prelude {
    pub use crate::agent::{Agent, AgentId, Roster, Seniority};
    pub use crate::clock::{Clock, ManualClock, SystemClock};
    pub use crate::config::{AgentSpec, ChatEngineConfig, GeneralConfig, RosterConfig};
    pub use crate::error::{ChatEngineError, Result};
    pub use crate::monitoring::{MonitorTickReport, SessionMonitor};
    pub use crate::orchestrator::{
        AgentSnapshot, ChatCoordinator, CreateChatResponse, PollResponse, StatusSnapshot,
    };
    pub use crate::queue::{QueueStats, SessionQueue};
    pub use crate::routing::{AssignmentDecision, AssignmentEngine};
    pub use crate::server::{ChatEngineServer, ChatEngineServerBuilder};
    pub use crate::session::{ChatSession, ChatSessionStatus, SessionId};
    pub use crate::shift::{ShiftClock, ShiftType};
}
