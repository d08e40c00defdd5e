pub mod advice;
pub mod config;
pub mod domain;
pub mod errors;
pub mod outfits;
pub mod styling;

pub use advice::{
    fallback_verdict, parse_advice_text, repair, validate_generation, AdviceContext,
    AdviceGenerator, AdviceOutcome, AdviceRequest, AdviceVerdict, GeneratorError, RankingEntry,
    RepairState, Verdict,
};
pub use domain::closet::{
    CategoryMain, ClosetSnapshot, ClothingItem, ItemId, RejectedItem, Wardrobe,
};
pub use domain::outfit::{GarmentView, OutfitCandidate, OutfitView, ScoreBreakdown};
pub use domain::weather::WeatherContext;
pub use errors::{DomainError, InterfaceError};
pub use outfits::{rank, OutfitEnumerator};
pub use styling::occasion::Occasion;
