//! The Want Normalizer: first stage of the planning pipeline.
//!
//! Raw want rows arrive straight from the web application and may contain
//! duplicate (participant, event) pairs, missing fields, and rows for
//! people who are not on the roster. This stage collapses all of that into
//! a clean want list plus the resolved effective priority for every event.
//!
//! Resolution rules:
//!
//! - Duplicate (participant, event) pairs keep the **maximum** priority
//!   seen across the duplicates; title and cost come from the first row.
//! - An explicit `eventPriority` on any row for an event is authoritative
//!   for that event. Absent an override, the effective priority is the max
//!   across all interested participants' wants.
//! - Rows with an empty event id, an empty participant id, or a
//!   participant who is not on the roster are dropped with a debug log --
//!   malformed input is tolerated, never fatal.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;
use tracing::debug;

use ticketsplit_types::{EventId, Participant, ParticipantId, Priority, WantRecord};

/// A deduplicated want: one participant's interest in one event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedWant {
    /// Who wants the ticket.
    pub participant_id: ParticipantId,
    /// The wanted event.
    pub event_id: EventId,
    /// Event title from the first row seen for this pair.
    pub event_title: String,
    /// Parsed ticket cost.
    pub cost: Decimal,
    /// The maximum per-want priority seen across duplicates.
    pub priority: Priority,
}

/// The normalizer's output: clean wants plus resolved event priorities.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedWants {
    /// Deduplicated wants, in first-seen input order.
    pub wants: Vec<NormalizedWant>,
    /// Effective priority for every event with at least one surviving want.
    pub event_priorities: BTreeMap<EventId, Priority>,
}

/// Collapse raw want rows into a normalized want list.
///
/// Never fails: malformed rows are dropped, out-of-range priorities are
/// treated as absent (defaulting to [`Priority::Normal`]), and an
/// out-of-range `eventPriority` never overrides a valid aggregation.
pub fn normalize(roster: &[Participant], records: &[WantRecord]) -> NormalizedWants {
    let roster_ids: BTreeSet<&ParticipantId> =
        roster.iter().map(|p| &p.participant_id).collect();

    let mut wants: Vec<NormalizedWant> = Vec::new();
    let mut seen: BTreeMap<(ParticipantId, EventId), usize> = BTreeMap::new();
    let mut aggregated: BTreeMap<EventId, Priority> = BTreeMap::new();
    let mut overrides: BTreeMap<EventId, Priority> = BTreeMap::new();
    let mut dropped = 0usize;

    for record in records {
        if record.event_id.is_empty()
            || record.participant_id.is_empty()
            || !roster_ids.contains(&record.participant_id)
        {
            dropped = dropped.saturating_add(1);
            debug!(
                participant_id = %record.participant_id,
                event_id = %record.event_id,
                "dropping malformed or non-roster want row"
            );
            continue;
        }

        let priority = record
            .priority
            .and_then(Priority::from_level)
            .unwrap_or_default();

        if let Some(override_priority) = record.event_priority.and_then(Priority::from_level) {
            overrides
                .entry(record.event_id.clone())
                .and_modify(|current| {
                    if override_priority > *current {
                        *current = override_priority;
                    }
                })
                .or_insert(override_priority);
        }

        aggregated
            .entry(record.event_id.clone())
            .and_modify(|current| {
                if priority > *current {
                    *current = priority;
                }
            })
            .or_insert(priority);

        let key = (record.participant_id.clone(), record.event_id.clone());
        if let Some(&existing) = seen.get(&key) {
            // Duplicate pair: max priority wins, first row keeps its
            // title and cost.
            if let Some(want) = wants.get_mut(existing) {
                if priority > want.priority {
                    want.priority = priority;
                }
            }
        } else {
            seen.insert(key, wants.len());
            wants.push(NormalizedWant {
                participant_id: record.participant_id.clone(),
                event_id: record.event_id.clone(),
                event_title: record.event_title.clone(),
                cost: parse_cost(&record.cost),
                priority,
            });
        }
    }

    let event_priorities: BTreeMap<EventId, Priority> = aggregated
        .into_iter()
        .map(|(event_id, max_priority)| {
            let effective = overrides
                .get(&event_id)
                .copied()
                .unwrap_or(max_priority);
            (event_id, effective)
        })
        .collect();

    debug!(
        rows_in = records.len(),
        wants_out = wants.len(),
        dropped,
        events = event_priorities.len(),
        "want normalization complete"
    );

    NormalizedWants {
        wants,
        event_priorities,
    }
}

/// Parse a cost string leniently.
///
/// Accepts a leading `$` and thousands separators; anything unparseable
/// degrades to zero. The engine only reports costs, it never computes
/// with them, so this is safe best-effort tolerance.
pub(crate) fn parse_cost(raw: &str) -> Decimal {
    let cleaned = raw.trim().trim_start_matches('$').replace(',', "");
    cleaned.parse::<Decimal>().unwrap_or_default()
}
