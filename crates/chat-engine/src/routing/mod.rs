//! # Chat Assignment Module
//!
//! This module decides which agent picks up the chat at the head of the
//! session queue. It never reorders the queue: only the head is offered, and
//! if no agent can take it, everything behind it waits too.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │            Session Queue head            │
//! └────────────────────┬─────────────────────┘
//!                      │
//! ┌────────────────────▼─────────────────────┐
//! │           Assignment Engine              │
//! │  - filter agents that can accept chats   │
//! │  - walk tiers Junior → TeamLead          │
//! │  - round robin inside the first tier     │
//! │    that has free slots                   │
//! └────────────────────┬─────────────────────┘
//!                      │
//!          ┌───────────┴───────────┐
//!          │                       │
//! ┌────────▼─────────┐   ┌─────────▼────────┐
//! │ Assigned         │   │ Stays queued     │
//! │ session → Active │   │ (head blocks)    │
//! └──────────────────┘   └──────────────────┘
//! ```
//!
//! ## Tier order
//!
//! Juniors are offered chats first so that senior staff stay free for
//! escalations. Overflow agents are matched only in the Junior tier.
//!
//! ## Round robin
//!
//! Each tier keeps its own counter. The counter only ever grows, so a tier
//! that was skipped for a while resumes where it left off.
//!
//! ## Modules
//!
//! - [`engine`]: the assignment engine and its decisions

pub mod engine;

pub use engine::{AssignmentDecision, AssignmentEngine};
