//! The Event Index Builder: groups normalized wants by event.
//!
//! Produces one [`EventDemand`] per distinct event, carrying the resolved
//! effective priority and the interested participants in first-seen order.
//! That order is load-bearing: it is the stable tie-break for who gets
//! first refusal at buying, and it must survive unchanged through the
//! allocator for runs to be reproducible.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use tracing::debug;

use ticketsplit_types::{EventId, ParticipantId, Priority};

use crate::normalize::NormalizedWants;

/// One event and everyone who wants a ticket for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventDemand {
    /// The event's identifier.
    pub event_id: EventId,
    /// Event title from the first want seen.
    pub event_title: String,
    /// Ticket cost from the first want seen.
    pub cost: Decimal,
    /// The event's resolved effective priority.
    pub priority: Priority,
    /// Interested participants, in first-seen input order.
    pub interested: Vec<ParticipantId>,
}

/// Group normalized wants into per-event demand records.
///
/// Events appear in first-seen order; the allocator later re-sorts them by
/// priority and contention but uses this position as its final tie-break.
pub fn build_index(normalized: &NormalizedWants) -> Vec<EventDemand> {
    let mut index: Vec<EventDemand> = Vec::new();
    let mut positions: BTreeMap<&EventId, usize> = BTreeMap::new();

    for want in &normalized.wants {
        if let Some(&position) = positions.get(&want.event_id) {
            if let Some(demand) = index.get_mut(position) {
                // Normalization already removed duplicate pairs, so this
                // participant cannot be in the list yet.
                demand.interested.push(want.participant_id.clone());
            }
        } else {
            positions.insert(&want.event_id, index.len());
            index.push(EventDemand {
                event_id: want.event_id.clone(),
                event_title: want.event_title.clone(),
                cost: want.cost,
                priority: normalized
                    .event_priorities
                    .get(&want.event_id)
                    .copied()
                    .unwrap_or_default(),
                interested: vec![want.participant_id.clone()],
            });
        }
    }

    debug!(events = index.len(), "event index built");
    index
}
