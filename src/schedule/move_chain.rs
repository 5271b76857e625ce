use log::debug;

use super::generic::{Ledger, PendingFixture, MAX_REPAIR_ATTEMPTS};

/// Represents a move in a chain of slot reassignments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub fixture: PendingFixture,
    /// `None` for a fixture that had no slot yet
    pub from_slot: Option<usize>,
    pub to_slot: usize,
}

/// Tries to find a slot for an unplaced fixture, evicting one placed game if needed
///
/// A free slot that already works is taken directly. Otherwise every
/// occupied slot is tried in time order: the occupant is taken out, and if
/// the fixture fits there and the occupant fits some other free slot, the
/// chain `[fixture -> slot, occupant -> free slot]` is returned. Each
/// eviction counts against `attempts`. The ledger is left as it was found.
pub fn find_move_chain(
    ledger: &mut Ledger<'_, '_>,
    fixture: PendingFixture,
    attempts: &mut u32,
) -> Option<Vec<Move>> {
    let slot_count = ledger.slots().len();

    // Try to find a free slot first
    if let Some(slot) = (0..slot_count).find(|&s| ledger.is_open(s) && ledger.check(&fixture, s).is_ok()) {
        return Some(vec![Move {
            fixture,
            from_slot: None,
            to_slot: slot,
        }]);
    }

    for target_slot in ledger.occupied_slots() {
        if *attempts >= MAX_REPAIR_ATTEMPTS {
            debug!("repair: attempt budget of {} spent", MAX_REPAIR_ATTEMPTS);
            return None;
        }
        *attempts += 1;

        let Some(blocking) = ledger.unplace(target_slot) else {
            continue;
        };

        let mut relocation = None;
        if ledger.check_removed(&blocking, target_slot).is_ok() && ledger.check(&fixture, target_slot).is_ok() {
            // The blocking game has to fit around the fixture in its new slot
            ledger.place(fixture, target_slot);
            relocation = (0..slot_count)
                .find(|&s| s != target_slot && ledger.is_open(s) && ledger.check(&blocking, s).is_ok());
            ledger.unplace(target_slot);
        }
        ledger.place(blocking, target_slot);

        if let Some(free_slot) = relocation {
            return Some(vec![
                Move {
                    fixture,
                    from_slot: None,
                    to_slot: target_slot,
                },
                Move {
                    fixture: blocking,
                    from_slot: Some(target_slot),
                    to_slot: free_slot,
                },
            ]);
        }
    }

    None
}

/// Applies a chain of moves to the ledger
/// Moves must be applied in REVERSE order to avoid conflicts where
/// a later move's from_slot is an earlier move's to_slot
pub fn apply_move_chain(moves: &[Move], ledger: &mut Ledger<'_, '_>) {
    for mv in moves.iter().rev() {
        if let Some(from) = mv.from_slot {
            match ledger.occupant(from) {
                Some(current) if current == mv.fixture => {
                    ledger.unplace(from);
                }
                _ => {
                    debug!("repair: slot {} no longer holds the game being moved", from);
                    continue;
                }
            }
        }
        ledger.place(mv.fixture, mv.to_slot);
    }
}
