//! Session queue module
//!
//! This module provides the FIFO admission queue and the lookup table of
//! every session the engine has accepted.

pub mod manager;

pub use manager::{QueueStats, SessionQueue};
