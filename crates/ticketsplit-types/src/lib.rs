//! Shared type definitions for the ticketsplit purchase planner.
//!
//! This crate is the single source of truth for the types crossing the
//! planning boundary. Types defined here flow downstream to `TypeScript`
//! via `ts-rs` for the convention-planner web frontend.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe string wrappers for participant and event ids
//! - [`priority`] -- The 1-3 priority scale and its presentation helpers
//! - [`wants`] -- Input records (roster entries and raw want rows)
//! - [`plan`] -- Output records (purchases, assignments, run result)

pub mod ids;
pub mod plan;
pub mod priority;
pub mod wants;

// Re-export all public types at crate root for convenience.
pub use ids::{EventId, ParticipantId};
pub use plan::{Assignment, EventPurchase, PlanRequest, PlanResult};
pub use priority::{Priority, PriorityError, priority_glyph, priority_label};
pub use wants::{Participant, WantRecord};
