//! Advice contract: whatever the external generator returns, callers receive
//! an [`AdviceVerdict`] that satisfies [`AdviceVerdict::check_contract`].

pub mod fallback;
pub mod parser;
pub mod repair;

use std::collections::BTreeSet;
use std::num::NonZeroUsize;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::outfit::OutfitView;
use crate::domain::weather::WeatherContext;
use crate::errors::DomainError;
use crate::styling::occasion::Occasion;

pub use fallback::{fallback_verdict, FALLBACK_TIPS};
pub use parser::{parse_advice_text, strip_code_fences, ParsedAdvice};
pub use repair::{clamp_words, repair, RawAdvice, RawRanking, TIP_FILLERS};

pub const REASON_WORD_LIMIT: usize = 16;
pub const EXPLANATION_WORD_LIMIT: usize = 28;
pub const TIP_WORD_LIMIT: usize = 12;
pub const WEATHER_ALTERNATIVE_WORD_LIMIT: usize = 18;
pub const TIP_COUNT: usize = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Pass,
    Good,
    Best,
}

impl Verdict {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "pass" => Some(Self::Pass),
            "good" => Some(Self::Good),
            "best" => Some(Self::Best),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Good => "good",
            Self::Best => "best",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankingEntry {
    pub index: usize,
    pub verdict: Verdict,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdviceVerdict {
    pub best_index: usize,
    pub rankings: Vec<RankingEntry>,
    pub explanation: String,
    pub tips: Vec<String>,
    pub weather_alternative: String,
}

impl AdviceVerdict {
    /// Checks the shape guarantees promised for `candidate_count` outfits.
    pub fn check_contract(&self, candidate_count: usize) -> Result<(), DomainError> {
        let violation = |message: String| Err(DomainError::AdviceContract(message));

        if self.rankings.len() != candidate_count {
            return violation(format!(
                "expected {candidate_count} rankings, found {}",
                self.rankings.len()
            ));
        }
        if let Some(entry) = self.rankings.iter().enumerate().find(|(i, e)| e.index != *i) {
            return violation(format!("ranking at position {} has index {}", entry.0, entry.1.index));
        }

        let best: Vec<usize> = self
            .rankings
            .iter()
            .filter(|entry| entry.verdict == Verdict::Best)
            .map(|entry| entry.index)
            .collect();
        if best != [self.best_index] {
            return violation(format!(
                "bestIndex {} must be the only best verdict, best at {best:?}",
                self.best_index
            ));
        }

        if let Some(entry) =
            self.rankings.iter().find(|entry| word_count(&entry.reason) > REASON_WORD_LIMIT)
        {
            return violation(format!("reason for outfit {} is too long", entry.index));
        }
        if word_count(&self.explanation) > EXPLANATION_WORD_LIMIT {
            return violation("explanation is too long".to_string());
        }
        if word_count(&self.weather_alternative) > WEATHER_ALTERNATIVE_WORD_LIMIT {
            return violation("weatherAlternative is too long".to_string());
        }

        let distinct: BTreeSet<&str> = self.tips.iter().map(String::as_str).collect();
        if self.tips.len() != TIP_COUNT || distinct.len() != TIP_COUNT {
            return violation(format!("expected {TIP_COUNT} distinct tips, found {:?}", self.tips));
        }
        if self.tips.iter().any(|tip| tip.trim().is_empty() || word_count(tip) > TIP_WORD_LIMIT) {
            return violation("tips must be non-empty and short".to_string());
        }

        Ok(())
    }
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// What the generator and the fallback know about the request.
#[derive(Clone, Debug, PartialEq)]
pub struct AdviceContext {
    pub occasion: Occasion,
    pub weather: WeatherContext,
}

impl AdviceContext {
    pub fn new(occasion: Occasion, weather: WeatherContext) -> Self {
        Self { occasion, weather }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct AdviceRequest<'a> {
    pub outfits: &'a [OutfitView],
    pub context: &'a AdviceContext,
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum GeneratorError {
    #[error("advice generator is not configured")]
    Unavailable,
    #[error("advice generator transport failed: {0}")]
    Transport(String),
    #[error("advice generator quota exhausted")]
    QuotaExhausted,
    #[error("advice generator timed out after {after_ms}ms")]
    Timeout { after_ms: u64 },
    #[error("advice generator rejected the request with status {status}: {message}")]
    Rejected { status: u16, message: String },
}

/// External capability producing free-form text that is meant to be advice JSON.
#[async_trait]
pub trait AdviceGenerator: Send + Sync {
    fn name(&self) -> &str;

    async fn generate(&self, request: AdviceRequest<'_>) -> Result<String, GeneratorError>;
}

/// How a verdict was obtained.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairState {
    /// Generator output needed only field-level normalization.
    Unchecked,
    /// The best verdict had to be reassigned.
    RepairedByDemotion,
    /// Nothing usable came back; the deterministic verdict was used.
    RepairedByFallback,
}

impl RepairState {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unchecked => "unchecked",
            Self::RepairedByDemotion => "repaired_by_demotion",
            Self::RepairedByFallback => "repaired_by_fallback",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AdviceOutcome {
    pub verdict: AdviceVerdict,
    pub state: RepairState,
    /// Set when the fallback was used.
    pub fallback_cause: Option<String>,
}

/// Turns the generator call result into a contract-satisfying verdict. Never fails.
pub fn validate_generation(
    generated: Result<String, GeneratorError>,
    candidate_count: NonZeroUsize,
    context: &AdviceContext,
) -> AdviceOutcome {
    let fallback = |cause: String| AdviceOutcome {
        verdict: fallback_verdict(candidate_count, context),
        state: RepairState::RepairedByFallback,
        fallback_cause: Some(cause),
    };

    let text = match generated {
        Ok(text) => text,
        Err(error) => return fallback(error.to_string()),
    };

    match parse_advice_text(&text) {
        ParsedAdvice::Strict(object) | ParsedAdvice::Extracted(object) => {
            let (verdict, state) = repair(RawAdvice::from_json(&object), candidate_count, context);
            match verdict.check_contract(candidate_count.get()) {
                Ok(()) => AdviceOutcome { verdict, state, fallback_cause: None },
                Err(violation) => fallback(violation.to_string()),
            }
        }
        ParsedAdvice::Unparseable => fallback("generator returned no recoverable JSON".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::num::NonZeroUsize;

    use crate::domain::weather::WeatherContext;
    use crate::styling::occasion::Occasion;

    use super::{
        validate_generation, AdviceContext, GeneratorError, RepairState, Verdict,
        EXPLANATION_WORD_LIMIT,
    };

    fn context() -> AdviceContext {
        AdviceContext::new(Occasion::Casual, WeatherContext::new(Some(28.0), "clear sky"))
    }

    fn count(n: usize) -> NonZeroUsize {
        NonZeroUsize::new(n).expect("non-zero")
    }

    #[test]
    fn generator_failures_fall_back_for_every_error_kind() {
        let errors = [
            GeneratorError::Unavailable,
            GeneratorError::Transport("connection reset".to_string()),
            GeneratorError::QuotaExhausted,
            GeneratorError::Timeout { after_ms: 8000 },
            GeneratorError::Rejected { status: 400, message: "bad key".to_string() },
        ];

        for error in errors {
            let outcome = validate_generation(Err(error.clone()), count(3), &context());
            assert_eq!(outcome.state, RepairState::RepairedByFallback);
            assert_eq!(outcome.fallback_cause, Some(error.to_string()));
            assert_eq!(outcome.verdict.rankings[0].verdict, Verdict::Best);
            assert!(outcome.verdict.check_contract(3).is_ok());
        }
    }

    #[test]
    fn garbage_text_falls_back() {
        for text in ["", "sorry, I cannot help", "{not json}", "} backwards {", "[1, 2, 3]"] {
            let outcome = validate_generation(Ok(text.to_string()), count(2), &context());
            assert_eq!(outcome.state, RepairState::RepairedByFallback, "input {text:?}");
            assert!(outcome.verdict.check_contract(2).is_ok());
        }
    }

    #[test]
    fn fenced_well_formed_advice_is_accepted() {
        let text = r#"```json
{
  "bestIndex": 1,
  "rankings": [
    {"index": 0, "verdict": "good", "reason": "28°C sun suits the linen shirt."},
    {"index": 1, "verdict": "best", "reason": "28°C calls for the breezy tee."}
  ],
  "explanation": "At 28°C under clear sky the tee keeps things light.",
  "tips": ["Roll the sleeves once.", "Pick white sneakers.", "Skip the belt."],
  "weatherAlternative": "At 28°C swap jeans for chinos if it gets humid."
}
```"#;
        let outcome = validate_generation(Ok(text.to_string()), count(2), &context());
        assert_eq!(outcome.state, RepairState::Unchecked);
        assert_eq!(outcome.fallback_cause, None);
        assert_eq!(outcome.verdict.best_index, 1);
        assert_eq!(outcome.verdict.tips[2], "Skip the belt.");
        assert!(outcome.verdict.check_contract(2).is_ok());
    }

    #[test]
    fn chatty_wrapper_around_json_is_extracted_and_repaired() {
        let long_explanation = "word ".repeat(40);
        let text = format!(
            "Here you go! {{\"rankings\": [{{\"verdict\": \"BEST\"}}, {{\"verdict\": \"best\"}}], \
             \"bestIndex\": 7, \"explanation\": \"{long_explanation}\"}} Enjoy."
        );
        let outcome = validate_generation(Ok(text), count(3), &context());

        assert_eq!(outcome.state, RepairState::RepairedByDemotion);
        assert_eq!(outcome.verdict.best_index, 0);
        let verdicts: Vec<Verdict> = outcome.verdict.rankings.iter().map(|r| r.verdict).collect();
        assert_eq!(verdicts, vec![Verdict::Best, Verdict::Good, Verdict::Pass]);
        assert_eq!(
            outcome.verdict.explanation.split_whitespace().count(),
            EXPLANATION_WORD_LIMIT
        );
        assert!(outcome.verdict.check_contract(3).is_ok());
    }

    #[test]
    fn contract_check_reports_violations() {
        let mut verdict = validate_generation(Err(GeneratorError::Unavailable), count(2), &context())
            .verdict;
        assert!(verdict.check_contract(3).is_err());

        verdict.rankings[1].verdict = Verdict::Best;
        assert!(verdict.check_contract(2).is_err());

        let mut verdict = validate_generation(Err(GeneratorError::Unavailable), count(2), &context())
            .verdict;
        verdict.tips[1] = verdict.tips[0].clone();
        assert!(verdict.check_contract(2).is_err());
    }
}
