//! Shift clock
//!
//! Classifies a UTC instant into one of three eight-hour shift windows and
//! stamps agents as on or off shift. Nothing here caches or schedules;
//! callers refresh agent flags before any capacity computation that needs
//! them to be current.

use std::fmt;

use chrono::{DateTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use crate::agent::Agent;
use crate::config::{AFTERNOON_SHIFT_START_HOUR, DAY_SHIFT_START_HOUR, NIGHT_SHIFT_START_HOUR};

/// Shift window an agent normally works
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShiftType {
    /// 06:00 - 14:00 UTC
    Day,
    /// 14:00 - 22:00 UTC
    Afternoon,
    /// 22:00 - 06:00 UTC
    Night,
}

impl fmt::Display for ShiftType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShiftType::Day => write!(f, "Day"),
            ShiftType::Afternoon => write!(f, "Afternoon"),
            ShiftType::Night => write!(f, "Night"),
        }
    }
}

/// Stateless shift classification
#[derive(Debug, Default, Clone, Copy)]
pub struct ShiftClock;

impl ShiftClock {
    pub fn new() -> Self {
        Self
    }

    /// Shift window containing `now`
    pub fn current_shift(&self, now: DateTime<Utc>) -> ShiftType {
        match now.hour() {
            h if (DAY_SHIFT_START_HOUR..AFTERNOON_SHIFT_START_HOUR).contains(&h) => ShiftType::Day,
            h if (AFTERNOON_SHIFT_START_HOUR..NIGHT_SHIFT_START_HOUR).contains(&h) => ShiftType::Afternoon,
            _ => ShiftType::Night,
        }
    }

    /// Office hours are the Day and Afternoon windows (06:00 - 22:00 UTC)
    pub fn is_office_hours(&self, now: DateTime<Utc>) -> bool {
        matches!(self.current_shift(now), ShiftType::Day | ShiftType::Afternoon)
    }

    /// Recompute `is_shift_over` for every agent.
    ///
    /// Overflow agents follow office hours; everyone else is on shift only
    /// while the current window matches their home shift. Agents going off
    /// shift keep the chats they already have.
    pub fn update_agent_shift_status(&self, agents: &mut [Agent], now: DateTime<Utc>) {
        let current = self.current_shift(now);
        let office_hours = self.is_office_hours(now);

        for agent in agents.iter_mut() {
            let shift_over = if agent.is_overflow() {
                !office_hours
            } else {
                agent.home_shift() != current
            };
            agent.set_shift_over(shift_over);
        }
    }
}
