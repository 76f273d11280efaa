//! Input records for a planning run: the roster and the raw want list.
//!
//! These mirror the JSON the convention-planner web application sends:
//! camelCase field names, costs as decimal strings, and priorities as raw
//! integer levels. The engine normalizes all of this before allocating;
//! nothing here is trusted to be well-formed.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::{EventId, ParticipantId};

/// A member of the purchasing group.
///
/// The roster is the identity set for a run: every participant gets an
/// assignment (possibly empty), and only roster members may be recruited
/// as buyers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct Participant {
    /// The participant's identifier (issued by the web application).
    pub participant_id: ParticipantId,
    /// Display name used in `buyingFor` lists and summaries.
    pub participant_name: String,
}

impl Participant {
    /// Convenience constructor, mainly for tests and seed data.
    pub fn new(id: impl Into<ParticipantId>, name: impl Into<String>) -> Self {
        Self {
            participant_id: id.into(),
            participant_name: name.into(),
        }
    }
}

/// One raw interest record: a participant wants a ticket for an event.
///
/// Duplicate (participant, event) pairs may appear with differing
/// priorities; the normalizer keeps the maximum. Every field except the
/// two identifiers is best-effort: missing values deserialize to their
/// defaults and malformed rows are dropped rather than failing the run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export, export_to = "bindings/")]
pub struct WantRecord {
    /// Who wants the ticket.
    #[serde(default)]
    pub participant_id: ParticipantId,
    /// The wanting participant's display name.
    #[serde(default)]
    pub participant_name: String,
    /// The wanted event. Empty means a malformed row.
    #[serde(default)]
    pub event_id: EventId,
    /// Event title, carried through to the purchase record.
    #[serde(default)]
    pub event_title: String,
    /// Ticket cost as a decimal string (e.g. `"$4.00"` or `"4"`).
    #[serde(default)]
    pub cost: String,
    /// Per-want priority level (1-3). Out-of-range values are treated
    /// as absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<u8>,
    /// Event-scoped priority override. When present on any record for an
    /// event it is authoritative for that event's effective priority.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub event_priority: Option<u8>,
}
