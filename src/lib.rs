//! Monte Carlo poker equity core.
//!
//! Builds a [`Spot`] from a position string (fixed hole cards, fixed board,
//! player count), then resolves millions of randomly completed deals in
//! parallel, folding every seven-card hand into a single totally-ordered
//! 64-bit score.
//!
//! ```
//! use showdown::{simulate, Spot};
//!
//! let spot: Spot = "2P AhAd KsKd - 2c 7h Qs".parse()?;
//! let games = 10_000;
//! let results = simulate(&spot, games, 2, 42);
//! assert!(results[0].equity(games) > results[1].equity(games));
//! # Ok::<(), showdown::SpotError>(())
//! ```

pub mod card;
pub mod hand;
pub mod score_mask;
pub mod sim;
pub mod spot;

pub use card::{Card, ParseCardError, Rank, Suit};
pub use hand::Hand;
pub use score_mask::ScoreMaskTable;
pub use sim::simulate;
pub use spot::{PlayerResult, Spot, SpotError, MAX_PLAYERS, TIE_UNIT};
