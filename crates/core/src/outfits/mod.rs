//! Outfit construction and ranking over a closet snapshot.

pub mod enumerator;
pub mod ranking;

pub use enumerator::{OutfitEnumerator, Triple};
pub use ranking::rank;

/// Bonus applied once when an outerwear layer is attached in cold weather.
pub const OUTERWEAR_BONUS: f64 = 0.12;
/// Candidates kept after ranking for internal use.
pub const SHORTLIST_SIZE: usize = 4;
/// Candidates surfaced to callers and to the advice generator by default.
pub const SURFACED_SIZE: usize = 3;
