//! Card encoding: low nibble is the rank (0 = Two .. 12 = Ace), bits 4..5
//! are the suit.
//!
//! The byte value of a card is also its bit index inside a 4x16-lane suit
//! word, so a set of cards is exactly a set of bits and no translation is
//! needed between the two views.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// First invalid rank value. Any card whose rank nibble reaches this is
/// inert: it cannot be added to a hand.
pub const INVALID_RANK: u8 = 13;

const RANK_CHARS: &[u8; 13] = b"23456789TJQKA";
const SUIT_CHARS: &[u8; 4] = b"dhcs";

/// A playing card suit.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Suit {
    Diamonds = 0,
    Hearts = 1,
    Clubs = 2,
    Spades = 3,
}

impl Suit {
    pub const ALL: [Suit; 4] = [Suit::Diamonds, Suit::Hearts, Suit::Clubs, Suit::Spades];

    #[inline(always)]
    pub const fn from_u8(x: u8) -> Suit {
        match x & 0x3 {
            0 => Suit::Diamonds,
            1 => Suit::Hearts,
            2 => Suit::Clubs,
            _ => Suit::Spades,
        }
    }
}

/// A playing card rank, 0..12 (Two..Ace). Matches a 13-bit rank mask.
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum Rank {
    Two = 0,
    Three = 1,
    Four = 2,
    Five = 3,
    Six = 4,
    Seven = 5,
    Eight = 6,
    Nine = 7,
    Ten = 8,
    Jack = 9,
    Queen = 10,
    King = 11,
    Ace = 12,
}

impl Rank {
    pub const ALL: [Rank; 13] = [
        Rank::Two,
        Rank::Three,
        Rank::Four,
        Rank::Five,
        Rank::Six,
        Rank::Seven,
        Rank::Eight,
        Rank::Nine,
        Rank::Ten,
        Rank::Jack,
        Rank::Queen,
        Rank::King,
        Rank::Ace,
    ];

    /// Convert 0..12 to a Rank (Two..Ace). Values above 12 saturate to Ace;
    /// callers check validity first.
    #[inline(always)]
    pub const fn from_u8(x: u8) -> Rank {
        match x {
            0 => Rank::Two,
            1 => Rank::Three,
            2 => Rank::Four,
            3 => Rank::Five,
            4 => Rank::Six,
            5 => Rank::Seven,
            6 => Rank::Eight,
            7 => Rank::Nine,
            8 => Rank::Ten,
            9 => Rank::Jack,
            10 => Rank::Queen,
            11 => Rank::King,
            _ => Rank::Ace,
        }
    }
}

/// A card packed into one byte: `(suit << 4) | rank`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Card(u8);

impl Card {
    #[inline(always)]
    pub const fn new(rank: Rank, suit: Suit) -> Card {
        Card(((suit as u8) << 4) | rank as u8)
    }

    /// Rebuild a card from its bit index in a suit-lane word.
    #[inline(always)]
    pub(crate) const fn from_lane_bit(bit: u8) -> Card {
        Card(bit & 0x3F)
    }

    /// Map a uniform 0..51 deck index to a card.
    #[inline(always)]
    pub(crate) const fn from_deck_index(i: u8) -> Card {
        Card(((i / 13) << 4) | (i % 13))
    }

    #[inline(always)]
    pub const fn raw(self) -> u8 {
        self.0
    }

    /// Pure bit extraction of (rank, suit) indices.
    #[inline(always)]
    pub const fn decode(self) -> (u8, u8) {
        (self.0 & 0xF, (self.0 >> 4) & 0x3)
    }

    #[inline(always)]
    pub const fn rank_idx(self) -> u8 {
        self.0 & 0xF
    }

    #[inline(always)]
    pub const fn suit_idx(self) -> u8 {
        (self.0 >> 4) & 0x3
    }

    #[inline(always)]
    pub const fn is_valid(self) -> bool {
        (self.0 & 0xF) < INVALID_RANK
    }

    #[inline(always)]
    pub fn rank(self) -> Rank {
        debug_assert!(self.is_valid());
        Rank::from_u8(self.0 & 0xF)
    }

    #[inline(always)]
    pub fn suit(self) -> Suit {
        Suit::from_u8((self.0 >> 4) & 0x3)
    }

    /// The card's bit inside a 4x16 suit-lane word (bit index = byte value).
    #[inline(always)]
    pub(crate) const fn lane_bit(self) -> u64 {
        1u64 << (self.0 & 0x3F)
    }
}

/// A card token could not be parsed (`"Ah"`, `"Td"`, ... expected).
#[derive(Clone, Debug, Error, Eq, PartialEq)]
#[error("malformed card token `{0}`")]
pub struct ParseCardError(pub String);

impl FromStr for Card {
    type Err = ParseCardError;

    fn from_str(s: &str) -> Result<Card, ParseCardError> {
        let b = s.as_bytes();
        if b.len() != 2 {
            return Err(ParseCardError(s.to_string()));
        }
        let rank = RANK_CHARS
            .iter()
            .position(|&c| c == b[0])
            .ok_or_else(|| ParseCardError(s.to_string()))?;
        let suit = SUIT_CHARS
            .iter()
            .position(|&c| c == b[1])
            .ok_or_else(|| ParseCardError(s.to_string()))?;
        Ok(Card(((suit as u8) << 4) | rank as u8))
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_valid() {
            write!(
                f,
                "{}{}",
                RANK_CHARS[self.rank_idx() as usize] as char,
                SUIT_CHARS[self.suit_idx() as usize] as char
            )
        } else {
            write!(f, "--")
        }
    }
}
