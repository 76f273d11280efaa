//! The Capacity Ledger: per-participant purchase quotas.
//!
//! Every roster participant starts with the configured cap (50 in
//! production), including participants with no wants at all -- they can
//! still be recruited as proxy buyers. No other component mutates
//! capacity: the allocator and rebalancer go through [`try_reserve`] and
//! [`release`], full stop. That contract is what makes the cap invariant
//! (`totalTickets <= cap`, always) auditable in one file.
//!
//! [`try_reserve`]: CapacityLedger::try_reserve
//! [`release`]: CapacityLedger::release

use std::collections::BTreeMap;

use ticketsplit_types::{Participant, ParticipantId};

/// Mutable map of remaining purchase capacity per participant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapacityLedger {
    /// The seeded cap; remaining capacity never exceeds this.
    cap: u32,
    /// Remaining capacity per roster participant.
    remaining: BTreeMap<ParticipantId, u32>,
}

impl CapacityLedger {
    /// Seed the ledger with the full cap for every roster participant.
    pub fn seed(roster: &[Participant], cap: u32) -> Self {
        Self {
            cap,
            remaining: roster
                .iter()
                .map(|p| (p.participant_id.clone(), cap))
                .collect(),
        }
    }

    /// The configured per-participant cap.
    pub const fn cap(&self) -> u32 {
        self.cap
    }

    /// Reserve one purchase slot for the participant.
    ///
    /// Returns `true` and decrements iff capacity remains. Returns `false`
    /// and leaves state unchanged for exhausted or unknown participants --
    /// refusal is normal flow control, never an error.
    pub fn try_reserve(&mut self, participant_id: &ParticipantId) -> bool {
        match self.remaining.get_mut(participant_id) {
            Some(remaining) if *remaining > 0 => {
                *remaining = remaining.saturating_sub(1);
                true
            }
            _ => false,
        }
    }

    /// Return one previously reserved slot.
    ///
    /// Only the rebalancer calls this, when moving a purchase between
    /// buyers. Clamped at the cap so a stray release can never mint
    /// capacity.
    pub fn release(&mut self, participant_id: &ParticipantId) {
        if let Some(remaining) = self.remaining.get_mut(participant_id) {
            *remaining = remaining.saturating_add(1).min(self.cap);
        }
    }

    /// Remaining capacity for the participant (zero for unknown ids).
    pub fn remaining(&self, participant_id: &ParticipantId) -> u32 {
        self.remaining.get(participant_id).copied().unwrap_or(0)
    }

    /// Whether the participant has at least one free slot.
    pub fn has_spare(&self, participant_id: &ParticipantId) -> bool {
        self.remaining(participant_id) > 0
    }
}
