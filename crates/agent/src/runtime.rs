use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};
use wardrobe_core::advice::{
    validate_generation, AdviceContext, AdviceGenerator, AdviceRequest, AdviceVerdict,
    GeneratorError, RepairState,
};
use wardrobe_core::config::AppConfig;
use wardrobe_core::domain::closet::{ClosetSnapshot, RejectedItem, Wardrobe};
use wardrobe_core::domain::outfit::OutfitView;
use wardrobe_core::domain::weather::WeatherContext;
use wardrobe_core::outfits::{rank, OutfitEnumerator, SHORTLIST_SIZE, SURFACED_SIZE};
use wardrobe_core::styling::occasion::Occasion;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuntimeSettings {
    pub advice_timeout: Duration,
    pub max_results: usize,
    pub default_occasion: String,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            advice_timeout: Duration::from_secs(20),
            max_results: SURFACED_SIZE,
            default_occasion: "casual".to_string(),
        }
    }
}

impl RuntimeSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            advice_timeout: Duration::from_secs(config.stylist.timeout_secs),
            max_results: config.recommend.max_results,
            default_occasion: config.recommend.default_occasion.clone(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub occasion: String,
    pub weather: WeatherContext,
    pub candidates: Vec<OutfitView>,
    /// Absent only when no outfit could be formed.
    pub advice: Option<AdviceVerdict>,
    pub advice_source: Option<RepairState>,
    pub rejected_items: Vec<RejectedItem>,
}

/// Runs one recommendation: enumerate, rank, ask the stylist, enforce the advice contract.
pub struct RecommendationRuntime {
    generator: Arc<dyn AdviceGenerator>,
    settings: RuntimeSettings,
}

impl RecommendationRuntime {
    pub fn new(generator: Arc<dyn AdviceGenerator>, settings: RuntimeSettings) -> Self {
        Self { generator, settings }
    }

    pub fn generator_name(&self) -> &str {
        self.generator.name()
    }

    pub fn settings(&self) -> &RuntimeSettings {
        &self.settings
    }

    /// Blank or missing occasions fall back to the configured default.
    pub fn resolve_occasion(&self, raw: Option<&str>) -> Occasion {
        match raw.map(str::trim).filter(|value| !value.is_empty()) {
            Some(value) => Occasion::parse(value),
            None => Occasion::parse(&self.settings.default_occasion),
        }
    }

    /// Top-ranked outfits for the snapshot, without embeddings.
    pub fn shortlist(
        &self,
        closet: &ClosetSnapshot,
        occasion: &Occasion,
        weather: &WeatherContext,
    ) -> Vec<OutfitView> {
        let wardrobe = Wardrobe::partition(&closet.items);
        if !wardrobe.can_form_outfit() {
            return Vec::new();
        }
        let enumerator = OutfitEnumerator::new(wardrobe, occasion.clone(), weather);
        let surfaced = self.settings.max_results.clamp(1, SHORTLIST_SIZE);

        rank(enumerator.candidates(), SHORTLIST_SIZE)
            .iter()
            .take(surfaced)
            .map(|candidate| candidate.to_view())
            .collect()
    }

    pub async fn recommend(
        &self,
        closet: &ClosetSnapshot,
        occasion: Option<&str>,
        weather: WeatherContext,
        correlation_id: &str,
    ) -> Recommendation {
        let occasion = self.resolve_occasion(occasion);

        if !closet.rejected.is_empty() {
            warn!(
                event_name = "recommend.closet.items_rejected",
                correlation_id,
                rejected_count = closet.rejected.len(),
                "skipping malformed closet items"
            );
        }

        let candidates = self.shortlist(closet, &occasion, &weather);
        info!(
            event_name = "recommend.outfits.ranked",
            correlation_id,
            occasion = %occasion,
            item_count = closet.items.len(),
            candidate_count = candidates.len(),
            cold = weather.is_cold(),
            "outfit candidates ranked"
        );

        let mut recommendation = Recommendation {
            occasion: occasion.label().to_string(),
            weather,
            candidates,
            advice: None,
            advice_source: None,
            rejected_items: closet.rejected.clone(),
        };

        let Some(count) = NonZeroUsize::new(recommendation.candidates.len()) else {
            return recommendation;
        };

        let context = AdviceContext::new(occasion, recommendation.weather.clone());
        let generated = self.generate_with_timeout(&recommendation.candidates, &context).await;
        let outcome = validate_generation(generated, count, &context);

        match &outcome.fallback_cause {
            Some(cause) => warn!(
                event_name = "recommend.advice.fallback",
                correlation_id,
                generator = self.generator.name(),
                cause = %cause,
                "stylist advice unavailable; using deterministic verdict"
            ),
            None => info!(
                event_name = "recommend.advice.validated",
                correlation_id,
                generator = self.generator.name(),
                repair_state = outcome.state.as_str(),
                best_index = outcome.verdict.best_index,
                "stylist advice validated"
            ),
        }

        recommendation.advice = Some(outcome.verdict);
        recommendation.advice_source = Some(outcome.state);
        recommendation
    }

    async fn generate_with_timeout(
        &self,
        outfits: &[OutfitView],
        context: &AdviceContext,
    ) -> Result<String, GeneratorError> {
        let request = AdviceRequest { outfits, context };
        let timeout = self.settings.advice_timeout;
        match tokio::time::timeout(timeout, self.generator.generate(request)).await {
            Ok(generated) => generated,
            Err(_) => Err(GeneratorError::Timeout { after_ms: timeout.as_millis() as u64 }),
        }
    }
}
