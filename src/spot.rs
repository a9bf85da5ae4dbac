//! A Spot is one concrete (possibly partially unknown) deal: the fixed hole
//! cards per player, the fixed community cards and the player count. Each
//! call to [`Spot::run`] completes the unknowns with uniform draws, scores
//! every player and credits the outcome.

use std::fmt;
use std::str::FromStr;

use log::trace;
use rand::Rng;
use thiserror::Error;

use crate::card::{Card, ParseCardError};
use crate::hand::Hand;

pub const MAX_PLAYERS: usize = 9;
pub const HOLE_CARDS: u8 = 2;
pub const BOARD_CARDS: u8 = 5;

/// One full pot in tie-credit units. Divisible by every split 2..=9 so an
/// N-way tie accumulates exactly.
pub const TIE_UNIT: u64 = 2520;

/// Per-player outcome counters: outright wins and fractional pot units won
/// across tied trials.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq)]
pub struct PlayerResult {
    pub wins: u64,
    pub tie_units: u64,
}

impl PlayerResult {
    #[inline]
    pub fn merge(&mut self, other: PlayerResult) {
        self.wins += other.wins;
        self.tie_units += other.tie_units;
    }

    /// Fraction of trials won outright.
    pub fn win_rate(&self, games: u64) -> f64 {
        if games == 0 {
            return 0.0;
        }
        self.wins as f64 / games as f64
    }

    /// Fraction of the pot collected through ties.
    pub fn tie_rate(&self, games: u64) -> f64 {
        if games == 0 {
            return 0.0;
        }
        self.tie_units as f64 / (TIE_UNIT as f64 * games as f64)
    }

    /// Expected pot share: wins plus split-tie credit, normalized to [0, 1].
    pub fn equity(&self, games: u64) -> f64 {
        if games == 0 {
            return 0.0;
        }
        (self.wins * TIE_UNIT + self.tie_units) as f64 / (TIE_UNIT as f64 * games as f64)
    }
}

/// A position string could not be turned into a runnable Spot.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum SpotError {
    #[error("missing player count token, expected e.g. `4P`")]
    MissingPlayerCount,
    #[error("unsupported player count {0}, expected 2..={MAX_PLAYERS}")]
    PlayerCount(usize),
    #[error(transparent)]
    Card(#[from] ParseCardError),
    #[error("hole group `{0}` must hold one or two cards")]
    HoleGroup(String),
    #[error("hole cards given for more players than the declared count")]
    TooManyHoleGroups,
    #[error("more than {BOARD_CARDS} community cards")]
    TooManyCommons,
    #[error("duplicate card `{0}`")]
    DuplicateCard(Card),
}

#[derive(Clone, Debug)]
pub struct Spot {
    holes: [Hand; MAX_PLAYERS],
    holes_given: [u8; MAX_PLAYERS],
    common: Hand,
    commons_given: u8,
    /// Every card already committed to a hand or the board, as lane bits.
    committed: u64,
    players: usize,
}

impl Spot {
    pub fn players(&self) -> usize {
        self.players
    }

    fn deal_hole(&mut self, player: usize, card: Card) -> Result<(), SpotError> {
        if !self.holes[player].add(card, self.committed) {
            return Err(SpotError::DuplicateCard(card));
        }
        self.committed |= card.lane_bit();
        self.holes_given[player] += 1;
        Ok(())
    }

    fn deal_common(&mut self, card: Card) -> Result<(), SpotError> {
        if self.commons_given == BOARD_CARDS {
            return Err(SpotError::TooManyCommons);
        }
        if !self.common.add(card, self.committed) {
            return Err(SpotError::DuplicateCard(card));
        }
        self.committed |= card.lane_bit();
        self.commons_given += 1;
        Ok(())
    }

    /// Play out one trial: complete the board and every player's holes with
    /// uniform draws (never touching a committed or already-drawn card),
    /// score each player once and credit the winner or split the tie.
    pub fn run<R: Rng>(&self, rng: &mut R, results: &mut [PlayerResult]) {
        debug_assert!(results.len() >= self.players);

        let mut taken = self.committed;

        let mut common = self.common;
        for _ in self.commons_given..BOARD_CARDS {
            let added = common.add(draw(rng, &mut taken), 0);
            debug_assert!(added);
        }

        let mut scores = [0u64; MAX_PLAYERS];
        let mut best = 0u64;
        for p in 0..self.players {
            let mut hand = self.holes[p];
            for _ in self.holes_given[p]..HOLE_CARDS {
                let added = hand.add(draw(rng, &mut taken), 0);
                debug_assert!(added);
            }
            hand.merge(&common);
            hand.do_score();
            scores[p] = hand.score;
            if hand.score > best {
                best = hand.score;
            }
        }

        let winners = scores[..self.players].iter().filter(|&&s| s == best).count() as u64;
        if winners == 1 {
            for p in 0..self.players {
                if scores[p] == best {
                    results[p].wins += 1;
                    break;
                }
            }
        } else {
            let share = TIE_UNIT / winners;
            for p in 0..self.players {
                if scores[p] == best {
                    results[p].tie_units += share;
                }
            }
        }
    }
}

/// Uniform draw of a card not yet in `taken`, marking it taken.
#[inline]
fn draw<R: Rng>(rng: &mut R, taken: &mut u64) -> Card {
    loop {
        let card = Card::from_deck_index(rng.gen_range(0..52));
        let bit = card.lane_bit();
        if *taken & bit == 0 {
            *taken |= bit;
            return card;
        }
    }
}

impl FromStr for Spot {
    type Err = SpotError;

    /// Parse a position like `"4P AcTc TdTh - 5h 6h 9c"`: a player count,
    /// up to one hole group (one or two cards) per player, then `-` and
    /// 0..=5 community cards. Both trailing sections are optional.
    fn from_str(s: &str) -> Result<Spot, SpotError> {
        let mut tokens = s.split_whitespace();

        let head = tokens.next().ok_or(SpotError::MissingPlayerCount)?;
        let players = head
            .strip_suffix(['P', 'p'])
            .and_then(|n| n.parse::<usize>().ok())
            .ok_or(SpotError::MissingPlayerCount)?;
        if !(2..=MAX_PLAYERS).contains(&players) {
            return Err(SpotError::PlayerCount(players));
        }

        let mut spot = Spot {
            holes: [Hand::default(); MAX_PLAYERS],
            holes_given: [0; MAX_PLAYERS],
            common: Hand::default(),
            commons_given: 0,
            committed: 0,
            players,
        };

        let mut player = 0usize;
        let mut on_board = false;
        for tok in tokens {
            if tok == "-" {
                on_board = true;
                continue;
            }
            if on_board {
                spot.deal_common(tok.parse()?)?;
            } else {
                if player == players {
                    return Err(SpotError::TooManyHoleGroups);
                }
                if !tok.is_ascii() || (tok.len() != 2 && tok.len() != 4) {
                    return Err(SpotError::HoleGroup(tok.to_string()));
                }
                let mut i = 0;
                while i < tok.len() {
                    spot.deal_hole(player, tok[i..i + 2].parse()?)?;
                    i += 2;
                }
                player += 1;
            }
        }

        trace!("parsed position `{s}` as `{spot}`");
        Ok(spot)
    }
}

impl fmt::Display for Spot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}P", self.players)?;
        for p in 0..self.players {
            if self.holes_given[p] == 0 {
                continue;
            }
            write!(f, " ")?;
            for card in self.holes[p].cards() {
                write!(f, "{card}")?;
            }
        }
        write!(f, " -")?;
        for card in self.common.cards() {
            write!(f, " {card}")?;
        }
        Ok(())
    }
}
