//! Point-in-time views of a bakery lock, for debugging and tests.

use core::fmt;
use serde::{Deserialize, Serialize};
use super::registry::SlotId;

/// Where a slot sits in its acquire/release cycle.
///
/// A slot that holds the lock is indistinguishable from one still in the
/// waiting room: both are `Ticketed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotPhase {
    /// No pending request.
    Idle,
    /// Inside the doorway, choosing a ticket.
    Entering,
    /// Holding a ticket: waiting or in the critical section.
    Ticketed,
}

/// Doorway flag and ticket of one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotState {
    /// The slot these values were read from.
    pub slot: SlotId,
    /// Derived from `choosing` and `ticket`.
    pub phase: SlotPhase,
    /// Doorway flag.
    pub choosing: bool,
    /// Ticket; `0` when idle.
    pub ticket: usize,
}

impl SlotState {
    pub(crate) fn new(slot: SlotId, choosing: bool, ticket: usize) -> Self {
        let phase = if choosing {
            SlotPhase::Entering
        } else if ticket != 0 {
            SlotPhase::Ticketed
        } else {
            SlotPhase::Idle
        };
        Self {
            slot,
            phase,
            choosing,
            ticket,
        }
    }
}

/// Every slot of a lock, read one after another.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BakerySnapshot {
    capacity: usize,
    registered: usize,
    slots: Vec<SlotState>,
}

impl BakerySnapshot {
    pub(crate) fn new(capacity: usize, registered: usize, slots: Vec<SlotState>) -> Self {
        Self {
            capacity,
            registered,
            slots,
        }
    }

    /// Number of slots in the lock.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of slots that had an owner.
    #[inline]
    pub fn registered(&self) -> usize {
        self.registered
    }

    /// Per-slot state, indexed by slot.
    #[inline]
    pub fn slots(&self) -> &[SlotState] {
        &self.slots
    }

    /// Ticketed slots in the order the lock serves them: by ticket, then slot.
    pub fn service_order(&self) -> Vec<SlotId> {
        let mut ticketed: Vec<_> = self
            .slots
            .iter()
            .filter(|s| s.ticket != 0)
            .map(|s| (s.ticket, s.slot))
            .collect();
        ticketed.sort_unstable();
        ticketed.into_iter().map(|(_, slot)| slot).collect()
    }

    /// Returns `true` if no slot is choosing or holding a ticket.
    pub fn is_quiescent(&self) -> bool {
        self.slots.iter().all(|s| s.phase == SlotPhase::Idle)
    }
}

impl fmt::Display for BakerySnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "bakery: {}/{} slots registered", self.registered, self.capacity)?;
        for s in &self.slots {
            match s.phase {
                SlotPhase::Idle => writeln!(f, "  slot {}: idle", s.slot)?,
                SlotPhase::Entering => writeln!(f, "  slot {}: choosing", s.slot)?,
                SlotPhase::Ticketed => writeln!(f, "  slot {}: ticket {}", s.slot, s.ticket)?,
            }
        }
        Ok(())
    }
}
