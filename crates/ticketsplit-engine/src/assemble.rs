//! The Result Assembler: final stage of the pipeline.
//!
//! Flattens the allocation book into one [`Assignment`] per roster
//! participant, in roster order, including participants with nothing to
//! buy. Diagnostics pass through in their original emission order.

use ticketsplit_types::{Assignment, EventPurchase, Participant, PlanResult};

use crate::allocate::AllocationBook;

/// Produce the final plan from the populated book.
pub fn assemble(roster: &[Participant], book: AllocationBook) -> PlanResult {
    let AllocationBook {
        mut purchases,
        diagnostics,
    } = book;

    let assignments = roster
        .iter()
        .map(|participant| {
            let held: Vec<EventPurchase> = purchases
                .remove(&participant.participant_id)
                .unwrap_or_default()
                .into_iter()
                .map(|planned| planned.purchase)
                .collect();
            Assignment {
                participant_id: participant.participant_id.clone(),
                participant_name: participant.participant_name.clone(),
                total_tickets: held.len(),
                purchases: held,
            }
        })
        .collect();

    PlanResult {
        assignments,
        errors: diagnostics,
    }
}
