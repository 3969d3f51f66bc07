//! # Chat Orchestration Module
//!
//! The orchestrator is the single entry point for the chat engine. It owns
//! the agent roster and the session queue, decides whether a new chat is
//! admitted, and hands admitted chats to the assignment engine.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │                      ChatCoordinator                       │
//! ├────────────────────────────────────────────────────────────┤
//! │  create_chat_session ──► admission check ──► enqueue       │
//! │                                │                 │         │
//! │                                ▼                 ▼         │
//! │                             Refused      AssignmentEngine  │
//! │                                                            │
//! │  poll ──────────► session table (liveness reset)           │
//! │  status ────────► capacity figures + on-shift agents       │
//! └──────────────┬──────────────────────────────┬──────────────┘
//!                │                              │
//!       ┌────────▼────────┐            ┌────────▼────────┐
//!       │ RwLock<Roster>  │            │  SessionQueue   │
//!       │ + ShiftClock    │            │ FIFO + table    │
//!       └─────────────────┘            └─────────────────┘
//! ```
//!
//! ## Admission
//!
//! The base limit is `floor(team_capacity × 1.5)`. During office hours, once
//! the number of queued plus active sessions reaches the base limit, the
//! overflow pool's elastic capacity is added on top. Outside office hours the
//! overflow pool never counts.
//!
//! ## Examples
//!
//! ```rust
//! use chatdesk_chat_engine::prelude::*;
//!
//! let coordinator = ChatCoordinator::with_system_clock(Roster::standard());
//! let created = coordinator.create_chat_session();
//!
//! if !created.is_refused() {
//!     let poll = coordinator.poll(&created.session_id);
//!     assert_eq!(poll.message, "OK");
//! }
//! ```
//!
//! ## Modules
//!
//! - [`core`]: the coordinator itself
//! - [`types`]: responses and snapshots

pub mod core;
pub mod types;

pub use self::core::ChatCoordinator;
pub use types::{AgentSnapshot, CreateChatResponse, PollResponse, StatusSnapshot};
