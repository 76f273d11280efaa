//! Event priority levels and their presentation helpers.
//!
//! Priorities drive allocation order: higher-priority events get first
//! claim on scarce purchase capacity. The wire format uses the integer
//! levels 1-3; anything outside that range renders as "Unknown" but is
//! never allowed to influence allocation.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Error returned when converting an out-of-range level into a [`Priority`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
#[error("priority level must be 1-3, got {level}")]
pub struct PriorityError {
    /// The rejected level.
    pub level: u8,
}

/// How important an event is to the group.
///
/// The variant order matters: derived `Ord` makes `Normal < Important <
/// Critical`, which is the allocation ordering.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum Priority {
    /// Nice to have; bought when capacity allows.
    #[default]
    Normal,
    /// The group actively wants this event covered.
    Important,
    /// Must not be missed; allocated before everything else.
    Critical,
}

impl Priority {
    /// The integer level used on the wire (1, 2, or 3).
    pub const fn level(self) -> u8 {
        match self {
            Self::Normal => 1,
            Self::Important => 2,
            Self::Critical => 3,
        }
    }

    /// Map a wire level to a priority, if it is in range.
    pub const fn from_level(level: u8) -> Option<Self> {
        match level {
            1 => Some(Self::Normal),
            2 => Some(Self::Important),
            3 => Some(Self::Critical),
            _ => None,
        }
    }

    /// Human-readable label for display.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Normal => "Normal",
            Self::Important => "Important",
            Self::Critical => "Critical",
        }
    }

    /// Short glyph shown next to event titles in summaries.
    pub const fn glyph(self) -> &'static str {
        match self {
            Self::Normal => "",
            Self::Important => "!",
            Self::Critical => "!!",
        }
    }
}

impl TryFrom<u8> for Priority {
    type Error = PriorityError;

    fn try_from(level: u8) -> Result<Self, Self::Error> {
        Self::from_level(level).ok_or(PriorityError { level })
    }
}

impl core::fmt::Display for Priority {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Label for a raw wire level, tolerating out-of-range values.
///
/// Anything outside 1-3 renders as `"Unknown"`; used by the planner's
/// summaries where a raw level may appear before normalization.
pub const fn priority_label(level: u8) -> &'static str {
    match Priority::from_level(level) {
        Some(priority) => priority.label(),
        None => "Unknown",
    }
}

/// Glyph for a raw wire level, tolerating out-of-range values.
pub const fn priority_glyph(level: u8) -> &'static str {
    match Priority::from_level(level) {
        Some(priority) => priority.glyph(),
        None => "?",
    }
}
