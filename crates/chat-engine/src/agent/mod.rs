//! Agent management module
//!
//! This module provides the per-agent capacity bookkeeping and the static
//! roster the engine dispatches to.

pub mod entry;
pub mod roster;

pub use entry::{Agent, AgentId, Seniority};
pub use roster::Roster;
