//! Scoring signals: color families, embedding similarity and occasion rules.

pub mod color;
pub mod occasion;
pub mod similarity;

pub use color::{are_compatible, family_of, items_compatible, ColorFamily};
pub use occasion::{occasion_bonus, GarmentSignal, Occasion, OutfitLabels};
pub use similarity::cosine_similarity;
