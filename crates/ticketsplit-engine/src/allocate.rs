//! The Coverage Allocator: decides who executes each purchase.
//!
//! Events are visited highest effective priority first; within a priority
//! tier, more contested events (more interested participants) go first so
//! they get first claim on scarce capacity, and first-seen order is the
//! final tie-break. The ordering is total and must stay exactly this way
//! -- runs are expected to be reproducible.
//!
//! For each event:
//!
//! 1. Every interested participant with spare capacity becomes an
//!    independent buyer. With abundant capacity this yields full
//!    redundancy: multiple people hedging the same sell-out risk.
//! 2. If nobody interested had capacity left, the first roster member
//!    with a free slot (interested or not) buys once as a proxy,
//!    covering everyone who wanted the event.
//! 3. If the whole roster is exhausted, the event is reported as
//!    uncovered via a diagnostic and skipped.
//!
//! A participant being at cap is never an error; `try_reserve` refuses
//! silently and the loop moves to the next candidate.

use std::collections::BTreeMap;

use tracing::debug;

use ticketsplit_types::{EventId, EventPurchase, Participant, ParticipantId};

use crate::capacity::CapacityLedger;
use crate::index::EventDemand;

/// A purchase plus the allocation path that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedPurchase {
    /// The purchase record, as it will appear in the assignment.
    pub purchase: EventPurchase,
    /// Whether this came from the proxy fallback. Proxy purchases are
    /// pinned: the rebalancer never moves them.
    pub proxy: bool,
}

/// Working state shared by the allocator and rebalancer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationBook {
    /// Planned purchases per participant. Seeded with an empty list for
    /// every roster member so zero-ticket participants still appear.
    pub purchases: BTreeMap<ParticipantId, Vec<PlannedPurchase>>,
    /// Advisory diagnostics, in emission order.
    pub diagnostics: Vec<String>,
}

impl AllocationBook {
    /// Create a book with an empty purchase list per roster participant.
    pub fn seed(roster: &[Participant]) -> Self {
        Self {
            purchases: roster
                .iter()
                .map(|p| (p.participant_id.clone(), Vec::new()))
                .collect(),
            diagnostics: Vec::new(),
        }
    }

    /// Number of purchases currently held by the participant.
    pub fn load(&self, participant_id: &ParticipantId) -> usize {
        self.purchases
            .get(participant_id)
            .map_or(0, Vec::len)
    }

    /// Whether the participant already holds a purchase for the event.
    pub fn holds(&self, participant_id: &ParticipantId, event_id: &EventId) -> bool {
        self.purchases
            .get(participant_id)
            .is_some_and(|list| list.iter().any(|p| &p.purchase.event_id == event_id))
    }

    /// Append a planned purchase to the participant's list.
    pub fn push(&mut self, participant_id: &ParticipantId, planned: PlannedPurchase) {
        self.purchases
            .entry(participant_id.clone())
            .or_default()
            .push(planned);
    }

    /// Total purchases across all participants.
    pub fn total(&self) -> usize {
        self.purchases
            .values()
            .fold(0usize, |sum, list| sum.saturating_add(list.len()))
    }
}

/// Run the allocation loop over the event index.
///
/// Consumes capacity from the ledger and returns the populated book.
/// Never fails: capacity refusals are silent, uncovered events become
/// diagnostics.
pub fn allocate(
    index: &[EventDemand],
    roster: &[Participant],
    ledger: &mut CapacityLedger,
) -> AllocationBook {
    let names: BTreeMap<&ParticipantId, &str> = roster
        .iter()
        .map(|p| (&p.participant_id, p.participant_name.as_str()))
        .collect();

    let mut book = AllocationBook::seed(roster);

    // Priority desc, contention desc, first-seen asc. Total and stable.
    let mut ordered: Vec<(usize, &EventDemand)> = index.iter().enumerate().collect();
    ordered.sort_by(|(position_a, a), (position_b, b)| {
        b.priority
            .cmp(&a.priority)
            .then_with(|| b.interested.len().cmp(&a.interested.len()))
            .then_with(|| position_a.cmp(position_b))
    });

    let mut proxied = 0usize;
    let mut uncovered = 0usize;

    for (_, event) in ordered {
        let mut buyers = 0usize;

        // Step 1: everyone interested with spare capacity buys
        // independently.
        for participant_id in &event.interested {
            if ledger.try_reserve(participant_id) {
                let name = names
                    .get(participant_id)
                    .copied()
                    .unwrap_or_default()
                    .to_owned();
                book.push(
                    participant_id,
                    PlannedPurchase {
                        purchase: purchase_record(event, vec![name]),
                        proxy: false,
                    },
                );
                buyers = buyers.saturating_add(1);
            }
        }
        if buyers > 0 {
            continue;
        }

        // Step 2: everyone interested was at cap. Recruit the first
        // roster member with a free slot as a proxy covering them all.
        let recipients = recipient_names(event, &names);
        let proxy = roster
            .iter()
            .find(|p| ledger.try_reserve(&p.participant_id))
            .map(|p| p.participant_id.clone());
        if let Some(buyer_id) = proxy {
            book.push(
                &buyer_id,
                PlannedPurchase {
                    purchase: purchase_record(event, recipients),
                    proxy: true,
                },
            );
            proxied = proxied.saturating_add(1);
            continue;
        }

        // Step 3: the whole roster is exhausted.
        book.diagnostics.push(format!(
            "No buyers available for event {} ({})",
            event.event_id, event.event_title
        ));
        uncovered = uncovered.saturating_add(1);
    }

    debug!(
        events = index.len(),
        purchases = book.total(),
        proxied,
        uncovered,
        "allocation complete"
    );
    book
}

/// Build the purchase record for an event with the given recipients.
fn purchase_record(event: &EventDemand, buying_for: Vec<String>) -> EventPurchase {
    EventPurchase {
        event_id: event.event_id.clone(),
        event_title: event.event_title.clone(),
        priority: event.priority,
        cost: event.cost,
        buying_for,
    }
}

/// Ordered, de-duplicated display names of everyone interested in the
/// event. Used for the proxy fallback's `buyingFor` list.
fn recipient_names(
    event: &EventDemand,
    names: &BTreeMap<&ParticipantId, &str>,
) -> Vec<String> {
    let mut recipients: Vec<String> = Vec::new();
    for participant_id in &event.interested {
        if let Some(&name) = names.get(participant_id) {
            if !recipients.iter().any(|existing| existing == name) {
                recipients.push(name.to_owned());
            }
        }
    }
    recipients
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use ticketsplit_types::Priority;

    use super::*;

    fn demand(event: &str, priority: Priority, interested: &[&str]) -> EventDemand {
        EventDemand {
            event_id: EventId::new(event),
            event_title: format!("Event {event}"),
            cost: Decimal::new(400, 2),
            priority,
            interested: interested.iter().copied().map(ParticipantId::from).collect(),
        }
    }

    fn roster() -> Vec<Participant> {
        vec![
            Participant::new("usr_1", "Ada"),
            Participant::new("usr_2", "Grace"),
            Participant::new("usr_3", "Edsger"),
        ]
    }

    #[test]
    fn every_interested_participant_with_capacity_buys() {
        let roster = roster();
        let mut ledger = CapacityLedger::seed(&roster, 50);
        let index = vec![demand("evt_1", Priority::Important, &["usr_1", "usr_2"])];

        let book = allocate(&index, &roster, &mut ledger);

        assert_eq!(book.load(&ParticipantId::new("usr_1")), 1);
        assert_eq!(book.load(&ParticipantId::new("usr_2")), 1);
        assert_eq!(book.load(&ParticipantId::new("usr_3")), 0);
        assert!(book.diagnostics.is_empty());
    }

    #[test]
    fn higher_priority_events_claim_capacity_first() {
        let roster = roster();
        // One slot each: only the critical event gets usr_1 directly.
        let mut ledger = CapacityLedger::seed(&roster, 1);
        let index = vec![
            demand("evt_low", Priority::Normal, &["usr_1"]),
            demand("evt_high", Priority::Critical, &["usr_1"]),
        ];

        let book = allocate(&index, &roster, &mut ledger);

        let ada = book.purchases.get(&ParticipantId::new("usr_1")).unwrap();
        assert_eq!(ada.len(), 1);
        assert_eq!(ada.first().unwrap().purchase.event_id.as_str(), "evt_high");
        // The normal event fell back to a proxy buyer.
        let proxy_holder = book.purchases.get(&ParticipantId::new("usr_2")).unwrap();
        assert!(proxy_holder.first().unwrap().proxy);
    }

    #[test]
    fn contested_events_go_first_within_a_tier() {
        let roster = roster();
        let mut ledger = CapacityLedger::seed(&roster, 1);
        let index = vec![
            demand("evt_solo", Priority::Important, &["usr_1"]),
            demand("evt_busy", Priority::Important, &["usr_1", "usr_2", "usr_3"]),
        ];

        let book = allocate(&index, &roster, &mut ledger);

        // evt_busy was visited first and took everyone's single slot.
        for participant in ["usr_1", "usr_2", "usr_3"] {
            let list = book.purchases.get(&ParticipantId::new(participant)).unwrap();
            assert_eq!(list.first().unwrap().purchase.event_id.as_str(), "evt_busy");
        }
        // evt_solo found no capacity anywhere.
        assert_eq!(book.diagnostics.len(), 1);
        assert!(book.diagnostics.first().unwrap().contains("evt_solo"));
    }

    #[test]
    fn proxy_covers_all_interested_names() {
        let roster = roster();
        let mut ledger = CapacityLedger::seed(&roster, 1);
        let index = vec![
            demand("evt_first", Priority::Critical, &["usr_1", "usr_2"]),
            demand("evt_second", Priority::Normal, &["usr_1", "usr_2"]),
        ];

        let book = allocate(&index, &roster, &mut ledger);

        // usr_1 and usr_2 spent their slots on evt_first; usr_3 proxies.
        let edsger = book.purchases.get(&ParticipantId::new("usr_3")).unwrap();
        let planned = edsger.first().unwrap();
        assert!(planned.proxy);
        assert_eq!(planned.purchase.event_id.as_str(), "evt_second");
        assert_eq!(planned.purchase.buying_for, vec!["Ada", "Grace"]);
    }

    #[test]
    fn exhausted_roster_yields_no_buyers_diagnostic() {
        let roster = vec![Participant::new("usr_1", "Ada")];
        let mut ledger = CapacityLedger::seed(&roster, 1);
        let index = vec![
            demand("evt_1", Priority::Critical, &["usr_1"]),
            demand("evt_2", Priority::Normal, &["usr_1"]),
        ];

        let book = allocate(&index, &roster, &mut ledger);

        assert_eq!(book.total(), 1);
        assert_eq!(book.diagnostics.len(), 1);
        let diagnostic = book.diagnostics.first().unwrap();
        assert!(diagnostic.contains("No buyers"));
        assert!(diagnostic.contains("evt_2"));
        assert!(!diagnostic.contains("over limit"));
    }

    #[test]
    fn zero_ticket_participants_still_appear_in_the_book() {
        let roster = roster();
        let mut ledger = CapacityLedger::seed(&roster, 50);
        let book = allocate(&[], &roster, &mut ledger);

        assert_eq!(book.purchases.len(), 3);
        assert_eq!(book.total(), 0);
    }
}
