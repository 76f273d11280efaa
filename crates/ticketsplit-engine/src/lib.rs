//! Ticket-purchase allocation engine for group convention buying.
//!
//! Given a roster and a wishlist of event wants, the engine decides who
//! in the group executes each purchase so that every wanted event is
//! covered, popular events get redundant independent buyers to hedge
//! against sell-outs, nobody exceeds the per-person cap, and purchase
//! workload stays fair across the group.
//!
//! # Pipeline
//!
//! One synchronous, in-memory pass; no I/O, no shared state between runs:
//!
//! ```text
//! normalize -> index -> allocate (capacity ledger) -> rebalance -> assemble
//! ```
//!
//! - [`normalize`] -- collapse duplicate wants, resolve event priorities
//! - [`index`] -- group wants into per-event demand records
//! - [`capacity`] -- per-participant purchase quotas behind
//!   `try_reserve`/`release`
//! - [`allocate`] -- the greedy coverage loop with the proxy fallback
//! - [`rebalance`] -- narrow the load spread without breaking coverage
//! - [`assemble`] -- one assignment per roster participant, plus
//!   diagnostics
//!
//! # Guarantees
//!
//! On any well-formed input the engine returns a best-effort plan and
//! never panics. The only fatal precondition is an empty roster, which
//! short-circuits to a `"No users found"` diagnostic. Every event with
//! at least one interested participant either appears in some
//! assignment's purchases or is named in a `"No buyers"` diagnostic --
//! never neither.
//!
//! # Usage
//!
//! ```
//! use ticketsplit_engine::{EngineConfig, plan};
//! use ticketsplit_types::{Participant, WantRecord};
//!
//! let roster = vec![
//!     Participant::new("usr_1", "Ada"),
//!     Participant::new("usr_2", "Grace"),
//! ];
//! let wants = vec![WantRecord {
//!     participant_id: "usr_1".into(),
//!     participant_name: "Ada".to_owned(),
//!     event_id: "evt_1".into(),
//!     event_title: "True Dungeon".to_owned(),
//!     cost: "$4.00".to_owned(),
//!     priority: Some(2),
//!     event_priority: None,
//! }];
//!
//! let result = plan(&roster, &wants, &EngineConfig::default());
//! assert_eq!(result.assignments.len(), 2);
//! assert!(result.errors.is_empty());
//! ```

pub mod allocate;
pub mod assemble;
pub mod capacity;
pub mod config;
pub mod index;
pub mod normalize;
pub mod rebalance;

// Re-export primary types at crate root.
pub use allocate::{AllocationBook, PlannedPurchase};
pub use capacity::CapacityLedger;
pub use config::EngineConfig;
pub use index::EventDemand;
pub use normalize::{NormalizedWant, NormalizedWants};

use tracing::info;

use ticketsplit_types::{Participant, PlanResult, WantRecord};

/// Diagnostic emitted for the empty-roster fatal precondition.
pub const NO_USERS_FOUND: &str = "No users found";

/// Plan who buys what.
///
/// The single entry point: runs the full pipeline over the given roster
/// and raw want rows. All state is created fresh for the call and
/// discarded afterwards; concurrent calls over separate inputs are safe.
///
/// An empty roster returns immediately with empty assignments and the
/// [`NO_USERS_FOUND`] diagnostic, regardless of the want list.
pub fn plan(roster: &[Participant], wants: &[WantRecord], config: &EngineConfig) -> PlanResult {
    if roster.is_empty() {
        return PlanResult {
            assignments: Vec::new(),
            errors: vec![NO_USERS_FOUND.to_owned()],
        };
    }

    let normalized = normalize::normalize(roster, wants);
    let event_index = index::build_index(&normalized);
    let mut ledger = CapacityLedger::seed(roster, config.per_user_cap);

    let mut book = allocate::allocate(&event_index, roster, &mut ledger);
    let moves = rebalance::rebalance(&mut book, &event_index, roster, &mut ledger, config);

    let result = assemble::assemble(roster, book);
    info!(
        participants = roster.len(),
        events = event_index.len(),
        tickets = result.total_tickets(),
        rebalance_moves = moves,
        diagnostics = result.errors.len(),
        "purchase plan complete"
    );
    result
}
