use std::num::NonZeroUsize;

use super::repair::clamp_words;
use super::{
    AdviceContext, AdviceVerdict, RankingEntry, Verdict, EXPLANATION_WORD_LIMIT,
    REASON_WORD_LIMIT, TIP_COUNT, WEATHER_ALTERNATIVE_WORD_LIMIT,
};

pub const FALLBACK_TIPS: [&str; TIP_COUNT] =
    ["Add one warm layer.", "Keep colors consistent.", "Choose clean footwear."];

/// Generator-free verdict: the engine's top pick is `best`, the rest `good`.
///
/// Occasion and temperature lead every sentence so word clamping only ever cuts
/// into the free-text conditions.
pub fn fallback_verdict(candidate_count: NonZeroUsize, context: &AdviceContext) -> AdviceVerdict {
    let reason = clamp_words(
        &format!(
            "Engine pick for {} at {}: {}.",
            context.occasion,
            context.weather.temperature_label(),
            context.weather.conditions()
        ),
        REASON_WORD_LIMIT,
    );

    let rankings = (0..candidate_count.get())
        .map(|index| RankingEntry {
            index,
            verdict: if index == 0 { Verdict::Best } else { Verdict::Good },
            reason: reason.clone(),
        })
        .collect();

    AdviceVerdict {
        best_index: 0,
        rankings,
        explanation: clamp_words(&fallback_explanation(context), EXPLANATION_WORD_LIMIT),
        tips: FALLBACK_TIPS.iter().map(|tip| tip.to_string()).collect(),
        weather_alternative: clamp_words(
            &fallback_weather_alternative(context),
            WEATHER_ALTERNATIVE_WORD_LIMIT,
        ),
    }
}

pub(crate) fn fallback_explanation(context: &AdviceContext) -> String {
    format!(
        "Engine picked outfit 0 for {} at {}; conditions: {}.",
        context.occasion,
        context.weather.temperature_label(),
        context.weather.conditions()
    )
}

pub(crate) fn fallback_weather_alternative(context: &AdviceContext) -> String {
    match context.weather.temperature_tag() {
        Some(tag) => format!("At {tag}, add a jacket or coat as an outer layer."),
        None => "If it turns cool, add a jacket or coat as an outer layer.".to_string(),
    }
}
