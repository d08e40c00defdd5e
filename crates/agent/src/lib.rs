//! Recommendation runtime and its external collaborators.
//!
//! - `llm` - Gemini and Ollama completion clients
//! - `stylist` - prompt construction and the LLM-backed `AdviceGenerator`
//! - `weather` - current-conditions lookup with an unknown-weather fallback
//! - `runtime` - `RecommendationRuntime`, which ties the core engine to the stylist
//!
//! The LLM only comments on outfits the engine already ranked. Whatever it
//! returns passes through the core advice contract before reaching a caller.

pub mod llm;
pub mod runtime;
pub mod stylist;
pub mod weather;

pub use runtime::{Recommendation, RecommendationRuntime, RuntimeSettings};
pub use stylist::{advice_generator_from_config, DisabledStylist, StylistAdviceGenerator};
pub use weather::{lookup_or_unknown, weather_source_from_config, WeatherSource};
