//! Bit-packed hand accumulator and scorer.
//!
//! A [`Hand`] tracks cards in two 64-bit words of four stacked 16-bit lanes:
//!
//! - `values`: lane `k` holds bit `r` once `k + 1` cards of rank `r` have
//!   been seen (lane 0 = at least one, 1 = pair, 2 = trips, 3 = quad).
//! - `colors`: lane `s` holds bit `r` when rank `r` of suit `s` is present.
//!   Doubles as the duplicate-card guard.
//!
//! [`Hand::do_score`] folds the hand into a single `score` word whose plain
//! numeric comparison is the complete poker ordering: category ranks land in
//! their lanes and the categories the lanes cannot separate get a dedicated
//! marker in an otherwise unused high bit.

use std::fmt;

use crate::card::Card;

/// Lane masks, shared by the multiplicity view (`values`) and the suit view
/// (`colors`).
pub(crate) const LANE0: u64 = 0xFFFF;
pub(crate) const LANE1: u64 = 0xFFFF << 16;
pub(crate) const LANE2: u64 = 0xFFFF << 32;
pub(crate) const LANE3: u64 = 0xFFFF << 48;

/// Achieved-category flags, accumulated strictly upward during one scoring
/// pass.
pub mod flag {
    pub const PAIR: u32 = 1 << 0;
    pub const TWO_PAIR: u32 = 1 << 1;
    pub const TRIPS: u32 = 1 << 2;
    pub const STRAIGHT: u32 = 1 << 3;
    pub const FLUSH: u32 = 1 << 4;
    pub const FULL_HOUSE: u32 = 1 << 5;
    pub const QUADS: u32 = 1 << 6;
    pub const STRAIGHT_FLUSH: u32 = 1 << 7;
}

// Score marker bits for the categories that rank bits alone cannot order.
// They sit in the unused high bits of the lanes so that a straight flush
// outranks any quad, a full house outranks any flush, a flush outranks any
// straight, and both outrank anything pair-based.
pub(crate) const STRAIGHT_SCORE: u64 = 1 << (32 + 13);
pub(crate) const FLUSH_SCORE: u64 = 1 << (32 + 14);
pub(crate) const FULL_HOUSE_SCORE: u64 = 1 << (32 + 15);
pub(crate) const STRAIGHT_FLUSH_SCORE: u64 = 1 << (48 + 15);
pub(crate) const TWO_PAIR_SCORE: u64 = 1 << (16 + 15);

/// Highest set bit of `b`, as a one-bit word.
#[inline(always)]
fn msb(b: u64) -> u64 {
    debug_assert_ne!(b, 0);
    1 << (63 - b.leading_zeros())
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct Hand {
    pub values: u64,
    pub colors: u64,
    pub score: u64,
    pub flags: u32,
}

impl Hand {
    /// Add one card. Fails on an invalid rank, or when the card's
    /// (rank, suit) bit is already present in this hand's `colors` or in the
    /// caller-supplied `exclusion` mask. On success the rank is promoted
    /// into the lowest multiplicity lane not yet holding it.
    #[inline]
    pub fn add(&mut self, card: Card, exclusion: u64) -> bool {
        if !card.is_valid() {
            return false;
        }

        let color = card.lane_bit();
        if (self.colors | exclusion) & color != 0 {
            return false;
        }
        self.colors |= color;

        // Promotion scan: at most four lanes, the colors guard above caps
        // any rank at four cards.
        let mut n = 1u64 << card.rank_idx();
        loop {
            if self.values & n == 0 {
                self.values |= n;
                return true;
            }
            n <<= 16;
        }
    }

    /// Union another hand's card set into this one. When no rank collides a
    /// plain OR is exact; otherwise the other hand's cards are re-derived
    /// from its `colors` bits and added one by one so lane promotion stays
    /// correct.
    #[inline]
    pub fn merge(&mut self, other: &Hand) {
        if self.values & other.values == 0 {
            self.values |= other.values;
            self.colors |= other.colors;
            return;
        }

        let mut v = other.colors;
        while v != 0 {
            let card = Card::from_lane_bit(v.trailing_zeros() as u8);
            v &= v - 1;
            // The two card sets are disjoint by the exclusion-mask
            // discipline; a rejected add here is a dealing logic error.
            let added = self.add(card, 0);
            debug_assert!(added);
        }
    }

    /// Iterate the cards currently in the hand, lowest lane bit first.
    pub fn cards(&self) -> impl Iterator<Item = Card> {
        let mut v = self.colors;
        std::iter::from_fn(move || {
            if v == 0 {
                return None;
            }
            let card = Card::from_lane_bit(v.trailing_zeros() as u8);
            v &= v - 1;
            Some(card)
        })
    }

    /// If any suit holds five or more cards, normalize that suit's ranks
    /// into lane 0 of `values` and return the new word (it may carry more
    /// than five bits, which lets the straight check still find a straight
    /// flush). Returns 0 and leaves `values` untouched otherwise.
    #[inline]
    pub fn is_flush(&mut self) -> u64 {
        if (self.colors & LANE3).count_ones() >= 5 {
            self.values = (self.colors & LANE3) >> 48;
        } else if (self.colors & LANE2).count_ones() >= 5 {
            self.values = (self.colors & LANE2) >> 32;
        } else if (self.colors & LANE1).count_ones() >= 5 {
            self.values = (self.colors & LANE1) >> 16;
        } else if (self.colors & LANE0).count_ones() >= 5 {
            self.values = self.colors & LANE0;
        } else {
            return 0;
        }
        self.values
    }

    /// Detect five consecutive ranks in lane 0, with the ace counting both
    /// high and low. On success `values` is rewritten to the single bit of
    /// the best straight's top card, so equal-top straights compare equal
    /// no matter how long the consecutive run was.
    #[inline]
    pub fn is_straight(&mut self) -> u64 {
        let mut v = self.values & LANE0;
        v = (v << 1) | (v >> 12); // duplicate the ace below the deuce
        v &= v >> 1;
        v &= v >> 1;
        v &= v >> 1;
        v &= v >> 1;
        if v == 0 {
            return 0;
        }
        // A surviving bit marks the bottom of a straight; +3 lands on its
        // top card after the initial shift.
        self.values = msb(v) << 3;
        self.values
    }

    /// Remove a rank (given as its bit in lane `N - 1`) from all `N` lanes
    /// it occupies.
    #[inline(always)]
    fn drop_rank<const N: u32>(&mut self, b: u64) {
        let mut all = b;
        if N >= 2 {
            all |= b >> 16;
        }
        if N >= 3 {
            all |= b >> 32;
        }
        if N >= 4 {
            all |= b >> 48;
        }
        debug_assert_eq!(self.values & all, all);
        self.values ^= all;
    }

    /// Single-pass category selection consuming a five-card budget. Must run
    /// exactly once, after all seven cards have been merged in.
    pub fn do_score(&mut self) {
        let mut budget = 5i32;

        // is_flush() and is_straight() normalize values into lane 0, so the
        // multiplicity checks below are always false once either hits.
        if self.is_flush() != 0 {
            self.flags |= flag::FLUSH;
            self.score |= FLUSH_SCORE;
        }

        if self.is_straight() != 0 {
            self.flags |= flag::STRAIGHT;
            self.score |= STRAIGHT_SCORE;
        }

        // A quad can never coexist with a straight or flush in seven cards.
        let quads = self.values & LANE3;
        if quads != 0 && budget >= 4 {
            self.flags |= flag::QUADS;
            let b = msb(quads);
            self.score |= b;
            self.drop_rank::<4>(b);
            budget -= 4;
        }

        let trips = self.values & LANE2;
        if trips != 0 && budget >= 3 {
            self.flags |= flag::TRIPS;
            let b = msb(trips);
            self.score |= b;
            self.drop_rank::<3>(b);
            budget -= 3;
        }

        let pair = self.values & LANE1;
        if pair != 0 && budget >= 2 {
            self.flags |= flag::PAIR;
            let b = msb(pair);
            self.score |= b;
            self.drop_rank::<2>(b);
            budget -= 2;
        }

        let second = self.values & LANE1;
        if second != 0 && budget >= 2 {
            self.flags |= flag::TWO_PAIR;
            let b = msb(second);
            self.score |= b | TWO_PAIR_SCORE;
            self.drop_rank::<2>(b);
            budget -= 2;
        }

        if self.flags & (flag::FLUSH | flag::STRAIGHT) == (flag::FLUSH | flag::STRAIGHT) {
            self.flags |= flag::STRAIGHT_FLUSH;
            self.score |= STRAIGHT_FLUSH_SCORE;
        }

        if self.flags & (flag::TRIPS | flag::PAIR) == (flag::TRIPS | flag::PAIR) {
            self.flags |= flag::FULL_HOUSE;
            self.score |= FULL_HOUSE_SCORE;
        }

        // Fill what is left of the budget with the highest untouched cards.
        let mut kickers = self.values & LANE0;
        let mut n = kickers.count_ones() as i32;
        while n > budget {
            kickers &= kickers - 1;
            n -= 1;
        }
        self.score |= kickers;
    }
}

/// Render a 4x16 lane word as a rank/lane grid, one row per lane from the
/// top lane down.
pub fn lane_grid(b: u64, suit_headers: bool) -> String {
    let mut s = String::from("\n");
    if suit_headers {
        s += "    | 2 | 3 | 4 | 5 | 6 | 7 | 8 | 9 | T | J | Q | K | A \n";
    }
    let cols = if suit_headers { 13 } else { 16 };
    let rule = format!("    +{}\n", "---+".repeat(cols));

    s += &rule;
    for lane in (0..4).rev() {
        s += &if suit_headers {
            format!("   {}", b"dhcs"[lane] as char)
        } else {
            "    ".to_string()
        };
        for r in 0..cols {
            s += if b & (1u64 << (lane * 16 + r)) != 0 {
                "| X "
            } else {
                "|   "
            };
        }
        s += "|\n";
        s += &rule;
    }
    s
}

impl fmt::Display for Hand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut cards: Vec<Card> = self.cards().collect();
        cards.sort_by(|a, b| b.rank_idx().cmp(&a.rank_idx()));

        write!(f, "Hand:")?;
        for c in cards {
            write!(f, " {c}")?;
        }
        write!(f, "\n{}", lane_grid(self.colors, true))?;
        if self.score != 0 {
            write!(f, "\nScore:\n{}", lane_grid(self.score, false))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Card, Rank::*, Suit, Suit::*};

    fn hand_of(cards: &[Card]) -> Hand {
        let mut h = Hand::default();
        for &c in cards {
            assert!(h.add(c, 0), "duplicate or invalid card {c}");
        }
        h
    }

    fn scored(cards: &[Card]) -> Hand {
        let mut h = hand_of(cards);
        h.do_score();
        h
    }

    #[test]
    fn duplicate_add_leaves_hand_untouched() {
        let mut h = Hand::default();
        assert!(h.add(Card::new(Ace, Spades), 0));

        let before = h;
        assert!(!h.add(Card::new(Ace, Spades), 0));
        assert_eq!(h, before);
    }

    #[test]
    fn exclusion_mask_blocks_committed_cards() {
        let committed = Card::new(King, Hearts).lane_bit();
        let mut h = Hand::default();
        assert!(!h.add(Card::new(King, Hearts), committed));
        assert_eq!(h, Hand::default());
    }

    #[test]
    fn rank_promotion_climbs_lanes() {
        let mut h = Hand::default();
        for suit in Suit::ALL {
            assert!(h.add(Card::new(Seven, suit), 0));
        }
        let bit = 1u64 << (Seven as u8);
        assert_eq!(h.values, bit | bit << 16 | bit << 32 | bit << 48);
    }

    #[test]
    fn merge_paths_agree() {
        // Rank collision between the sets forces the slow path.
        let a = [Card::new(Five, Clubs), Card::new(Nine, Diamonds)];
        let b = [Card::new(Five, Hearts), Card::new(King, Spades)];

        let mut fast = hand_of(&a);
        let disjoint = hand_of(&[Card::new(Two, Hearts), Card::new(King, Spades)]);
        fast.merge(&disjoint); // no shared rank: OR fast path

        let mut slow = hand_of(&a);
        slow.merge(&hand_of(&b)); // shared five: add-one-by-one path

        let mut reference = hand_of(&a);
        for c in b {
            assert!(reference.add(c, 0));
        }
        assert_eq!(slow.values, reference.values);
        assert_eq!(slow.colors, reference.colors);

        let mut fast_reference = hand_of(&a);
        for c in [Card::new(Two, Hearts), Card::new(King, Spades)] {
            assert!(fast_reference.add(c, 0));
        }
        assert_eq!(fast.values, fast_reference.values);
        assert_eq!(fast.colors, fast_reference.colors);
    }

    #[test]
    fn category_ladder_orders_by_raw_score() {
        let straight_flush = scored(&[
            Card::new(Ten, Spades),
            Card::new(Jack, Spades),
            Card::new(Queen, Spades),
            Card::new(King, Spades),
            Card::new(Ace, Spades),
            Card::new(Two, Hearts),
            Card::new(Three, Diamonds),
        ]);
        let quads = scored(&[
            Card::new(Two, Clubs),
            Card::new(Two, Diamonds),
            Card::new(Two, Hearts),
            Card::new(Two, Spades),
            Card::new(Ace, Clubs),
            Card::new(King, Hearts),
            Card::new(Queen, Diamonds),
        ]);
        let full_house = scored(&[
            Card::new(Three, Clubs),
            Card::new(Three, Diamonds),
            Card::new(Three, Hearts),
            Card::new(Four, Clubs),
            Card::new(Four, Diamonds),
            Card::new(Nine, Spades),
            Card::new(King, Hearts),
        ]);
        let flush = scored(&[
            Card::new(Ace, Hearts),
            Card::new(King, Hearts),
            Card::new(Nine, Hearts),
            Card::new(Seven, Hearts),
            Card::new(Three, Hearts),
            Card::new(Two, Clubs),
            Card::new(Five, Diamonds),
        ]);
        let straight = scored(&[
            Card::new(Two, Clubs),
            Card::new(Three, Diamonds),
            Card::new(Four, Hearts),
            Card::new(Five, Spades),
            Card::new(Six, Clubs),
            Card::new(Nine, Diamonds),
            Card::new(King, Hearts),
        ]);
        let trips = scored(&[
            Card::new(Seven, Clubs),
            Card::new(Seven, Diamonds),
            Card::new(Seven, Hearts),
            Card::new(Two, Spades),
            Card::new(Nine, Clubs),
            Card::new(King, Diamonds),
            Card::new(Four, Spades),
        ]);
        let two_pair = scored(&[
            Card::new(Eight, Clubs),
            Card::new(Eight, Diamonds),
            Card::new(Five, Hearts),
            Card::new(Five, Spades),
            Card::new(Two, Clubs),
            Card::new(Nine, Diamonds),
            Card::new(King, Hearts),
        ]);
        let pair = scored(&[
            Card::new(Queen, Clubs),
            Card::new(Queen, Diamonds),
            Card::new(Two, Hearts),
            Card::new(Five, Spades),
            Card::new(Nine, Clubs),
            Card::new(Jack, Diamonds),
            Card::new(Three, Clubs),
        ]);
        let high_card = scored(&[
            Card::new(Two, Clubs),
            Card::new(Five, Diamonds),
            Card::new(Nine, Hearts),
            Card::new(Jack, Clubs),
            Card::new(King, Diamonds),
            Card::new(Seven, Spades),
            Card::new(Three, Hearts),
        ]);

        assert_ne!(straight_flush.flags & flag::STRAIGHT_FLUSH, 0);
        assert_ne!(quads.flags & flag::QUADS, 0);
        assert_ne!(full_house.flags & flag::FULL_HOUSE, 0);
        assert_ne!(flush.flags & flag::FLUSH, 0);
        assert_ne!(straight.flags & flag::STRAIGHT, 0);
        assert_ne!(trips.flags & flag::TRIPS, 0);
        assert_ne!(two_pair.flags & flag::TWO_PAIR, 0);
        assert_ne!(pair.flags & flag::PAIR, 0);
        assert_eq!(high_card.flags, 0);

        let ladder = [
            high_card,
            pair,
            two_pair,
            trips,
            straight,
            flush,
            full_house,
            quads,
            straight_flush,
        ];
        for pair in ladder.windows(2) {
            assert!(
                pair[0].score < pair[1].score,
                "expected {:#x} < {:#x}",
                pair[0].score,
                pair[1].score
            );
        }
    }

    #[test]
    fn low_two_pair_beats_high_pair() {
        let two_pair = scored(&[
            Card::new(Two, Clubs),
            Card::new(Two, Diamonds),
            Card::new(Three, Hearts),
            Card::new(Three, Spades),
            Card::new(Five, Clubs),
            Card::new(Eight, Diamonds),
            Card::new(Jack, Hearts),
        ]);
        let pair_of_aces = scored(&[
            Card::new(Ace, Clubs),
            Card::new(Ace, Diamonds),
            Card::new(Three, Clubs),
            Card::new(Five, Spades),
            Card::new(Eight, Hearts),
            Card::new(Jack, Diamonds),
            Card::new(King, Spades),
        ]);
        assert!(two_pair.score > pair_of_aces.score);
    }

    #[test]
    #[should_panic]
    fn merge_rejects_overlapping_card_sets() {
        // Sharing an identical card between the two sets is a dealing
        // logic error, not something to score around.
        let mut a = hand_of(&[Card::new(Five, Clubs), Card::new(Nine, Diamonds)]);
        let b = hand_of(&[Card::new(Five, Clubs), Card::new(King, Spades)]);
        a.merge(&b);
    }

    #[test]
    fn ordering_edge_cases() {
        // Steel wheel straight flush beats quad aces.
        let steel_wheel = scored(&[
            Card::new(Ace, Spades),
            Card::new(Two, Spades),
            Card::new(Three, Spades),
            Card::new(Four, Spades),
            Card::new(Five, Spades),
            Card::new(Nine, Diamonds),
            Card::new(King, Hearts),
        ]);
        let quad_aces = scored(&[
            Card::new(Ace, Clubs),
            Card::new(Ace, Diamonds),
            Card::new(Ace, Hearts),
            Card::new(Ace, Spades),
            Card::new(King, Clubs),
            Card::new(Queen, Diamonds),
            Card::new(Two, Hearts),
        ]);
        assert_ne!(steel_wheel.flags & flag::STRAIGHT_FLUSH, 0);
        assert!(steel_wheel.score > quad_aces.score);

        // Quads with a board pair: the pair is a kicker, never a full house.
        let quads_with_pair = scored(&[
            Card::new(Seven, Clubs),
            Card::new(Seven, Diamonds),
            Card::new(Seven, Hearts),
            Card::new(Seven, Spades),
            Card::new(King, Clubs),
            Card::new(King, Diamonds),
            Card::new(Two, Hearts),
        ]);
        assert_ne!(quads_with_pair.flags & flag::QUADS, 0);
        assert_eq!(quads_with_pair.flags & flag::FULL_HOUSE, 0);
        assert_eq!(quads_with_pair.score & LANE0, 1 << (King as u8));

        // Three pairs: the best two play, the third rank is the kicker pool.
        let three_pairs = scored(&[
            Card::new(Ace, Clubs),
            Card::new(Ace, Diamonds),
            Card::new(King, Clubs),
            Card::new(King, Diamonds),
            Card::new(Queen, Hearts),
            Card::new(Queen, Spades),
            Card::new(Jack, Hearts),
        ]);
        assert_ne!(three_pairs.flags & flag::TWO_PAIR, 0);
        assert_eq!(three_pairs.score & LANE0, 1 << (Queen as u8));

        // Flushes differing only in the fifth card still order correctly.
        let flush_high = scored(&[
            Card::new(Ace, Hearts),
            Card::new(King, Hearts),
            Card::new(Nine, Hearts),
            Card::new(Seven, Hearts),
            Card::new(Four, Hearts),
            Card::new(Two, Clubs),
            Card::new(Five, Diamonds),
        ]);
        let flush_low = scored(&[
            Card::new(Ace, Hearts),
            Card::new(King, Hearts),
            Card::new(Nine, Hearts),
            Card::new(Seven, Hearts),
            Card::new(Three, Hearts),
            Card::new(Two, Clubs),
            Card::new(Five, Diamonds),
        ]);
        assert!(flush_high.score > flush_low.score);

        // Full house: the trips rank dominates the pair rank.
        let fours_full = scored(&[
            Card::new(Four, Clubs),
            Card::new(Four, Diamonds),
            Card::new(Four, Hearts),
            Card::new(Two, Clubs),
            Card::new(Two, Diamonds),
            Card::new(Nine, Spades),
            Card::new(King, Hearts),
        ]);
        let threes_full_of_aces = scored(&[
            Card::new(Three, Clubs),
            Card::new(Three, Diamonds),
            Card::new(Three, Hearts),
            Card::new(Ace, Clubs),
            Card::new(Ace, Diamonds),
            Card::new(Nine, Hearts),
            Card::new(King, Spades),
        ]);
        assert_ne!(fours_full.flags & flag::FULL_HOUSE, 0);
        assert!(fours_full.score > threes_full_of_aces.score);
    }

    #[test]
    fn one_pair_never_scores_two_pair() {
        let h = scored(&[
            Card::new(Queen, Clubs),
            Card::new(Queen, Diamonds),
            Card::new(Two, Hearts),
            Card::new(Five, Spades),
            Card::new(Nine, Clubs),
            Card::new(Jack, Diamonds),
            Card::new(Three, Clubs),
        ]);
        assert_ne!(h.flags & flag::PAIR, 0);
        assert_eq!(h.flags & flag::TWO_PAIR, 0);
        assert_eq!(h.flags & flag::FULL_HOUSE, 0);
    }

    #[test]
    fn equal_top_straights_tie_regardless_of_run_length() {
        // Six-card run 2..7 against a plain 3..7 straight: both are
        // seven-high and must score identically.
        let long_run = scored(&[
            Card::new(Two, Clubs),
            Card::new(Three, Diamonds),
            Card::new(Four, Hearts),
            Card::new(Five, Spades),
            Card::new(Six, Clubs),
            Card::new(Seven, Diamonds),
            Card::new(Jack, Hearts),
        ]);
        let short_run = scored(&[
            Card::new(Three, Clubs),
            Card::new(Four, Diamonds),
            Card::new(Five, Hearts),
            Card::new(Six, Spades),
            Card::new(Seven, Clubs),
            Card::new(King, Diamonds),
            Card::new(Nine, Hearts),
        ]);
        assert_eq!(long_run.score, short_run.score);
    }

    #[test]
    fn wheel_is_lowest_straight() {
        let wheel = scored(&[
            Card::new(Ace, Clubs),
            Card::new(Two, Diamonds),
            Card::new(Three, Hearts),
            Card::new(Four, Spades),
            Card::new(Five, Clubs),
            Card::new(Nine, Diamonds),
            Card::new(King, Hearts),
        ]);
        let six_high = scored(&[
            Card::new(Two, Clubs),
            Card::new(Three, Diamonds),
            Card::new(Four, Hearts),
            Card::new(Five, Spades),
            Card::new(Six, Clubs),
            Card::new(Nine, Diamonds),
            Card::new(King, Hearts),
        ]);
        assert_ne!(wheel.flags & flag::STRAIGHT, 0);
        assert!(wheel.score < six_high.score);
    }

    #[test]
    fn flush_with_trips_scores_as_flush() {
        // Five hearts plus two more aces: the flush outranks the trips and
        // the normalization must not leave a bogus full house behind.
        let h = scored(&[
            Card::new(Ace, Hearts),
            Card::new(King, Hearts),
            Card::new(Jack, Hearts),
            Card::new(Nine, Hearts),
            Card::new(Four, Hearts),
            Card::new(Ace, Clubs),
            Card::new(Ace, Diamonds),
        ]);
        assert_ne!(h.flags & flag::FLUSH, 0);
        assert_eq!(h.flags & flag::FULL_HOUSE, 0);
        assert_eq!(h.flags & flag::TRIPS, 0);
    }

    #[test]
    fn display_lists_cards() {
        let h = scored(&[
            Card::new(Ace, Hearts),
            Card::new(King, Spades),
            Card::new(Two, Clubs),
            Card::new(Seven, Diamonds),
            Card::new(Nine, Hearts),
            Card::new(Jack, Clubs),
            Card::new(Four, Spades),
        ]);
        let s = h.to_string();
        assert!(s.contains("Ah"));
        assert!(s.contains("Ks"));
        assert!(s.contains("Score:"));
    }
}
