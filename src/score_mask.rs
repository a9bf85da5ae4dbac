//! Precomputed prune masks for partial-combination bookkeeping.
//!
//! For every ordered pair of values-word bit positions `(c1, c2)` with
//! `c1 > c2` the table stores a mask describing which rank bits can still
//! matter once that pair is the best-known partial combination: everything
//! below the locked-in ranks (and any same-or-lower duplicate category) is
//! pruned, and a residual "how many more cards may count" budget is encoded
//! in the unused bits 13..15 of lane 0.
//!
//! Built once at start-up and immutable afterwards; pass a reference to
//! whoever wants it instead of going through a global.

use crate::card::INVALID_RANK;
use crate::hand::{FULL_HOUSE_SCORE, LANE0, LANE1, LANE2, LANE3, TWO_PAIR_SCORE};

const TABLE_LEN: usize = 64 * 64;

/// Bits every mask pins regardless of the pair's class: the two category
/// markers and a saturated pick budget.
const FIXED: u64 = FULL_HOUSE_SCORE | TWO_PAIR_SCORE | to_pick(7);

/// Encode a remaining-pick budget in lane-0 bits 13..15.
const fn to_pick(n: u64) -> u64 {
    n << 13
}

/// Spread a lane bit down into every lower lane (same rank, lower counts).
const fn below(b: u64) -> u64 {
    (b >> 16) | (b >> 32) | (b >> 48)
}

/// All ranks strictly below `b` within its own lane.
fn up_to(b: u64) -> u64 {
    debug_assert_ne!(b, 0);
    let lane = [LANE0, LANE1, LANE2, LANE3][(b.trailing_zeros() / 16) as usize];
    (b - 1) & lane
}

pub struct ScoreMaskTable {
    masks: Vec<u64>,
}

impl ScoreMaskTable {
    pub fn new() -> ScoreMaskTable {
        let mut masks = vec![0u64; TABLE_LEN];

        for c1 in 0u64..64 {
            if (c1 & 0xF) as u8 >= INVALID_RANK {
                continue;
            }
            for c2 in 0..c1 {
                if (c2 & 0xF) as u8 >= INVALID_RANK {
                    continue;
                }

                let h = 1u64 << c1;
                let l = 1u64 << c2;

                masks[((c1 << 6) + c2) as usize] = if h & LANE0 != 0 {
                    // High card: nothing locked in, five picks left.
                    !FIXED | to_pick(5)
                } else if h & LANE1 != 0 && l & LANE0 != 0 {
                    // Pair: the paired rank's lower lanes are spent.
                    !(FIXED | below(h)) | to_pick(3)
                } else if h & LANE1 != 0 && l & LANE1 != 0 {
                    // Two pair: a third pair at a lower rank never matters.
                    !(FIXED | below(h) | below(l) | up_to(l)) | TWO_PAIR_SCORE | to_pick(1)
                } else if h & LANE2 != 0 && l & LANE0 != 0 {
                    // Trips.
                    !(FIXED | below(h)) | to_pick(2)
                } else if h & LANE2 != 0 && l & LANE1 != 0 {
                    // Full house: any second pair below the used one drops,
                    // and no kicker can count.
                    (!(FIXED | below(h) | below(l) | up_to(l)) | FULL_HOUSE_SCORE | to_pick(0))
                        & !LANE0
                } else if h & LANE2 != 0 && l & LANE2 != 0 {
                    // Double trips: a full house with the lower trip folded
                    // down to a pair.
                    ((!(FIXED | below(h) | below(l) | up_to(h)))
                        | (l >> 16)
                        | FULL_HOUSE_SCORE
                        | to_pick(0))
                        & !LANE0
                } else {
                    debug_assert_ne!(h & LANE3, 0);
                    // Quad: everything else is irrelevant but one kicker.
                    !(FIXED | below(h) | up_to(h) | LANE2 | LANE1) | to_pick(1)
                };
            }
        }

        ScoreMaskTable { masks }
    }

    /// Mask for the kept pair `(c1, c2)`, both values-word bit positions
    /// with valid rank nibbles and `c1 > c2`.
    #[inline(always)]
    pub fn get(&self, c1: u8, c2: u8) -> u64 {
        debug_assert!(c1 > c2 && c1 < 64);
        debug_assert!((c1 & 0xF) < INVALID_RANK && (c2 & 0xF) < INVALID_RANK);
        self.masks[((c1 as usize) << 6) + c2 as usize]
    }
}

impl Default for ScoreMaskTable {
    fn default() -> Self {
        ScoreMaskTable::new()
    }
}
