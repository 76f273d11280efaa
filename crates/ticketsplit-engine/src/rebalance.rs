//! The Fairness Rebalancer: narrows the purchase-load spread.
//!
//! After allocation, the gap between the most- and least-loaded
//! participants may exceed the configured spread. Each pass moves one
//! purchase from the most-loaded participant to an interested,
//! lighter-loaded participant with spare capacity who does not already
//! hold that event. Moves transfer capacity usage, never create it, and
//! never reduce an event's buyer count, so coverage and the cap both
//! survive rebalancing untouched.
//!
//! Constraints on a legal move:
//!
//! - Proxy purchases are pinned. They cover several recipients at once;
//!   handing one to a different buyer would silently change who is
//!   covered.
//! - The receiver must be interested in the event, must not already hold
//!   it, must have ledger capacity, and must sit at least two purchases
//!   below the donor (otherwise the move widens the spread elsewhere).
//!
//! The pass budget bounds the loop on pathological inputs; in practice
//! the loop exits because no legal move remains.

use std::collections::BTreeMap;

use tracing::debug;

use ticketsplit_types::{EventId, Participant, ParticipantId};

use crate::allocate::AllocationBook;
use crate::capacity::CapacityLedger;
use crate::config::EngineConfig;
use crate::index::EventDemand;

/// A legal purchase transfer, located but not yet applied.
struct MoveStep {
    donor: ParticipantId,
    purchase_index: usize,
    receiver: ParticipantId,
}

/// Run rebalancing passes until the spread closes, no legal move remains,
/// or the pass budget is exhausted. Returns the number of moves applied.
pub fn rebalance(
    book: &mut AllocationBook,
    index: &[EventDemand],
    roster: &[Participant],
    ledger: &mut CapacityLedger,
    config: &EngineConfig,
) -> usize {
    let events: BTreeMap<&EventId, &EventDemand> =
        index.iter().map(|e| (&e.event_id, e)).collect();
    let names: BTreeMap<&ParticipantId, &str> = roster
        .iter()
        .map(|p| (&p.participant_id, p.participant_name.as_str()))
        .collect();

    let mut moves = 0usize;
    for _pass in 0..config.max_rebalance_passes {
        let spread = load_spread(book, roster);
        if spread <= config.fairness_spread {
            break;
        }
        let Some(step) = find_move(book, &events, roster, ledger) else {
            break;
        };
        if apply_move(book, ledger, &names, &step) {
            moves = moves.saturating_add(1);
        } else {
            break;
        }
    }

    debug!(
        moves,
        spread = load_spread(book, roster),
        "rebalancing complete"
    );
    moves
}

/// Gap between the most- and least-loaded roster participants.
fn load_spread(book: &AllocationBook, roster: &[Participant]) -> usize {
    let loads = roster.iter().map(|p| book.load(&p.participant_id));
    let max = loads.clone().max().unwrap_or(0);
    let min = loads.min().unwrap_or(0);
    max.saturating_sub(min)
}

/// Locate the first legal move, scanning donors from most loaded down
/// (roster order breaks ties) and receivers in each event's first-seen
/// interest order. Deterministic by construction.
fn find_move(
    book: &AllocationBook,
    events: &BTreeMap<&EventId, &EventDemand>,
    roster: &[Participant],
    ledger: &CapacityLedger,
) -> Option<MoveStep> {
    let mut donors: Vec<(usize, &Participant)> = roster.iter().enumerate().collect();
    donors.sort_by(|(position_a, a), (position_b, b)| {
        book.load(&b.participant_id)
            .cmp(&book.load(&a.participant_id))
            .then_with(|| position_a.cmp(position_b))
    });

    for (_, donor) in donors {
        let donor_load = book.load(&donor.participant_id);
        let Some(held) = book.purchases.get(&donor.participant_id) else {
            continue;
        };
        for (purchase_index, planned) in held.iter().enumerate() {
            if planned.proxy {
                continue;
            }
            let Some(demand) = events.get(&planned.purchase.event_id) else {
                continue;
            };
            for receiver_id in &demand.interested {
                if receiver_id == &donor.participant_id {
                    continue;
                }
                // A move only helps if the receiver ends up still below
                // the donor.
                if book.load(receiver_id).saturating_add(2) > donor_load {
                    continue;
                }
                if book.holds(receiver_id, &planned.purchase.event_id) {
                    continue;
                }
                if !ledger.has_spare(receiver_id) {
                    continue;
                }
                return Some(MoveStep {
                    donor: donor.participant_id.clone(),
                    purchase_index,
                    receiver: receiver_id.clone(),
                });
            }
        }
    }
    None
}

/// Transfer the located purchase: reserve the receiver's slot, release
/// the donor's, and hand the record over. The `buyingFor` list becomes
/// the receiver's name followed by the previous recipients -- the record
/// now fulfils the receiver's own want and still hedges whoever it
/// covered before.
fn apply_move(
    book: &mut AllocationBook,
    ledger: &mut CapacityLedger,
    names: &BTreeMap<&ParticipantId, &str>,
    step: &MoveStep,
) -> bool {
    if !ledger.try_reserve(&step.receiver) {
        return false;
    }
    let Some(held) = book.purchases.get_mut(&step.donor) else {
        ledger.release(&step.receiver);
        return false;
    };
    if step.purchase_index >= held.len() {
        ledger.release(&step.receiver);
        return false;
    }

    let mut planned = held.remove(step.purchase_index);
    ledger.release(&step.donor);

    let receiver_name = names.get(&step.receiver).copied().unwrap_or_default();
    let mut buying_for = vec![receiver_name.to_owned()];
    for name in planned.purchase.buying_for.drain(..) {
        if !buying_for.iter().any(|existing| existing == &name) {
            buying_for.push(name);
        }
    }
    planned.purchase.buying_for = buying_for;

    debug!(
        donor = %step.donor,
        receiver = %step.receiver,
        event_id = %planned.purchase.event_id,
        "moved purchase"
    );
    book.push(&step.receiver, planned);
    true
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;
    use ticketsplit_types::{EventPurchase, Priority};

    use super::*;
    use crate::allocate::PlannedPurchase;

    fn roster() -> Vec<Participant> {
        vec![
            Participant::new("usr_1", "Ada"),
            Participant::new("usr_2", "Grace"),
        ]
    }

    fn demand(event: &str, interested: &[&str]) -> EventDemand {
        EventDemand {
            event_id: EventId::new(event),
            event_title: format!("Event {event}"),
            cost: Decimal::new(400, 2),
            priority: Priority::Normal,
            interested: interested.iter().copied().map(ParticipantId::from).collect(),
        }
    }

    fn planned(event: &str, buyer_name: &str, proxy: bool) -> PlannedPurchase {
        PlannedPurchase {
            purchase: EventPurchase {
                event_id: EventId::new(event),
                event_title: format!("Event {event}"),
                priority: Priority::Normal,
                cost: Decimal::new(400, 2),
                buying_for: vec![buyer_name.to_owned()],
            },
            proxy,
        }
    }

    /// Build a book where Ada holds the given events and Grace none,
    /// with the ledger reflecting the reservations.
    fn loaded_book(
        events: &[&str],
        proxy: bool,
        cap: u32,
    ) -> (AllocationBook, CapacityLedger) {
        let roster = roster();
        let mut book = AllocationBook::seed(&roster);
        let mut ledger = CapacityLedger::seed(&roster, cap);
        let ada = ParticipantId::new("usr_1");
        for event in events {
            assert!(ledger.try_reserve(&ada));
            book.push(&ada, planned(event, "Ada", proxy));
        }
        (book, ledger)
    }

    #[test]
    fn spread_narrows_by_moving_to_an_interested_receiver() {
        let roster = roster();
        let index = vec![
            demand("evt_1", &["usr_1"]),
            demand("evt_2", &["usr_1"]),
            demand("evt_3", &["usr_1", "usr_2"]),
        ];
        let (mut book, mut ledger) = loaded_book(&["evt_1", "evt_2", "evt_3"], false, 50);

        let moves = rebalance(
            &mut book,
            &index,
            &roster,
            &mut ledger,
            &EngineConfig::default(),
        );

        assert_eq!(moves, 1);
        assert_eq!(book.load(&ParticipantId::new("usr_1")), 2);
        assert_eq!(book.load(&ParticipantId::new("usr_2")), 1);

        // The moved record fulfils Grace's own want and still hedges Ada.
        let grace = book.purchases.get(&ParticipantId::new("usr_2")).unwrap();
        let moved = grace.first().unwrap();
        assert_eq!(moved.purchase.event_id.as_str(), "evt_3");
        assert_eq!(moved.purchase.buying_for, vec!["Grace", "Ada"]);
    }

    #[test]
    fn proxy_purchases_are_pinned() {
        let roster = roster();
        let index = vec![
            demand("evt_1", &["usr_1", "usr_2"]),
            demand("evt_2", &["usr_1", "usr_2"]),
            demand("evt_3", &["usr_1", "usr_2"]),
        ];
        let (mut book, mut ledger) = loaded_book(&["evt_1", "evt_2", "evt_3"], true, 50);

        let moves = rebalance(
            &mut book,
            &index,
            &roster,
            &mut ledger,
            &EngineConfig::default(),
        );

        assert_eq!(moves, 0);
        assert_eq!(book.load(&ParticipantId::new("usr_1")), 3);
    }

    #[test]
    fn receiver_already_holding_the_event_is_skipped() {
        let roster = roster();
        let index = vec![
            demand("evt_1", &["usr_1", "usr_2"]),
            demand("evt_2", &["usr_1"]),
            demand("evt_3", &["usr_1"]),
        ];
        let (mut book, mut ledger) = loaded_book(&["evt_1", "evt_2", "evt_3"], false, 50);
        let grace = ParticipantId::new("usr_2");
        assert!(ledger.try_reserve(&grace));
        book.push(&grace, planned("evt_1", "Grace", false));

        let moves = rebalance(
            &mut book,
            &index,
            &roster,
            &mut ledger,
            &EngineConfig::default(),
        );

        // Spread is 3-1=2, already within tolerance; and the only shared
        // event is one Grace holds. Nothing to do.
        assert_eq!(moves, 0);
    }

    #[test]
    fn receiver_without_capacity_is_skipped() {
        let roster = roster();
        let index = vec![
            demand("evt_1", &["usr_1", "usr_2"]),
            demand("evt_2", &["usr_1", "usr_2"]),
            demand("evt_3", &["usr_1", "usr_2"]),
        ];
        // Cap of 3: Ada's three reservations exhaust her, and Grace gets
        // drained manually below.
        let (mut book, mut ledger) = loaded_book(&["evt_1", "evt_2", "evt_3"], false, 3);
        let grace = ParticipantId::new("usr_2");
        for _ in 0..3 {
            assert!(ledger.try_reserve(&grace));
        }

        let moves = rebalance(
            &mut book,
            &index,
            &roster,
            &mut ledger,
            &EngineConfig::default(),
        );

        assert_eq!(moves, 0);
    }

    #[test]
    fn pass_budget_bounds_the_loop() {
        let roster = roster();
        let index = vec![
            demand("evt_1", &["usr_1", "usr_2"]),
            demand("evt_2", &["usr_1", "usr_2"]),
            demand("evt_3", &["usr_1", "usr_2"]),
            demand("evt_4", &["usr_1", "usr_2"]),
        ];
        let (mut book, mut ledger) =
            loaded_book(&["evt_1", "evt_2", "evt_3", "evt_4"], false, 50);

        let config = EngineConfig {
            max_rebalance_passes: 0,
            ..EngineConfig::default()
        };
        let moves = rebalance(&mut book, &index, &roster, &mut ledger, &config);

        assert_eq!(moves, 0);
        assert_eq!(book.load(&ParticipantId::new("usr_1")), 4);
    }

    #[test]
    fn capacity_is_transferred_not_created() {
        let roster = roster();
        let index = vec![
            demand("evt_1", &["usr_1"]),
            demand("evt_2", &["usr_1"]),
            demand("evt_3", &["usr_1", "usr_2"]),
        ];
        let (mut book, mut ledger) = loaded_book(&["evt_1", "evt_2", "evt_3"], false, 50);
        let before_total = book.total();

        let _ = rebalance(
            &mut book,
            &index,
            &roster,
            &mut ledger,
            &EngineConfig::default(),
        );

        assert_eq!(book.total(), before_total);
        // Donor got a slot back, receiver spent one.
        assert_eq!(ledger.remaining(&ParticipantId::new("usr_1")), 48);
        assert_eq!(ledger.remaining(&ParticipantId::new("usr_2")), 49);
    }
}
