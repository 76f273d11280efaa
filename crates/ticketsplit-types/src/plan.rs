//! Output records for a planning run, plus the request envelope.
//!
//! A run produces one [`Assignment`] per roster participant and a list of
//! advisory diagnostic strings. Diagnostics never abort a run; the engine
//! always returns its best-effort plan alongside them.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{EventId, ParticipantId};
use crate::priority::Priority;
use crate::wants::{Participant, WantRecord};

/// The full input to a planning run, as posted by the web application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PlanRequest {
    /// Everyone in the purchasing group.
    #[serde(default)]
    pub roster: Vec<Participant>,
    /// Raw interest records, possibly containing duplicates.
    #[serde(default)]
    pub wants: Vec<WantRecord>,
}

/// One ticket purchase a participant is assigned to execute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct EventPurchase {
    /// The event being bought.
    pub event_id: EventId,
    /// Event title, for display.
    pub event_title: String,
    /// The event's resolved effective priority.
    pub priority: Priority,
    /// Ticket cost.
    #[ts(as = "String")]
    pub cost: Decimal,
    /// Display names of everyone this purchase covers. Normally just the
    /// buyer; under the proxy fallback, everyone who wanted the event.
    /// Ordered and de-duplicated.
    pub buying_for: Vec<String>,
}

/// A participant's complete purchase workload for the run.
///
/// Every roster participant gets exactly one of these, including those
/// with nothing to buy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Assignment {
    /// The assigned participant.
    pub participant_id: ParticipantId,
    /// The assigned participant's display name.
    pub participant_name: String,
    /// Purchases to execute, in allocation order.
    pub purchases: Vec<EventPurchase>,
    /// Number of purchases; always equals `purchases.len()`.
    pub total_tickets: usize,
}

/// The outcome of a planning run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct PlanResult {
    /// One assignment per roster participant, in roster order.
    pub assignments: Vec<Assignment>,
    /// Advisory diagnostics, in emission order.
    pub errors: Vec<String>,
}

impl PlanResult {
    /// Total tickets assigned across the whole group.
    pub fn total_tickets(&self) -> usize {
        self.assignments
            .iter()
            .fold(0usize, |sum, a| sum.saturating_add(a.total_tickets))
    }

    /// Whether any event was left without a buyer.
    pub fn has_coverage_gaps(&self) -> bool {
        self.errors.iter().any(|e| e.contains("No buyers"))
    }
}
