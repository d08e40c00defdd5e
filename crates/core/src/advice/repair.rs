use std::num::NonZeroUsize;

use serde_json::{Map, Value};

use super::fallback::{fallback_explanation, fallback_weather_alternative};
use super::{
    AdviceContext, AdviceVerdict, RankingEntry, RepairState, Verdict, EXPLANATION_WORD_LIMIT,
    REASON_WORD_LIMIT, TIP_COUNT, TIP_WORD_LIMIT, WEATHER_ALTERNATIVE_WORD_LIMIT,
};

/// Distinct fillers used, in order, when fewer than three usable tips arrive.
pub const TIP_FILLERS: [&str; TIP_COUNT] = [
    "Add one clean layer to sharpen the silhouette.",
    "Keep one accent color and let neutrals anchor the rest.",
    "Match belt and shoe tones for a finished look.",
];

/// Keeps the first `max_words` whitespace-delimited words, joined by single spaces.
pub fn clamp_words(text: &str, max_words: usize) -> String {
    text.split_whitespace().take(max_words).collect::<Vec<_>>().join(" ")
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawRanking {
    pub verdict: Option<Verdict>,
    pub reason: Option<String>,
}

/// Generator fields pulled out of a JSON object, without any validation.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RawAdvice {
    pub best_index: Option<f64>,
    /// `None` entries were present but not objects.
    pub rankings: Vec<Option<RawRanking>>,
    pub explanation: Option<String>,
    pub tips: Vec<String>,
    pub weather_alternative: Option<String>,
}

impl RawAdvice {
    pub fn from_json(object: &Map<String, Value>) -> Self {
        let field = |camel: &str, snake: &str| object.get(camel).or_else(|| object.get(snake));
        let text = |value: Option<&Value>| value.and_then(Value::as_str).map(str::to_string);

        let rankings = object
            .get("rankings")
            .and_then(Value::as_array)
            .map(|entries| entries.iter().map(raw_ranking).collect())
            .unwrap_or_default();

        let tips = object
            .get("tips")
            .and_then(Value::as_array)
            .map(|tips| tips.iter().filter_map(Value::as_str).map(str::to_string).collect())
            .unwrap_or_default();

        Self {
            best_index: field("bestIndex", "best_index").and_then(Value::as_f64),
            rankings,
            explanation: text(object.get("explanation")),
            tips,
            weather_alternative: text(field("weatherAlternative", "weather_alternative")),
        }
    }

    /// `bestIndex` when it is a whole number inside `0..candidate_count`.
    pub fn valid_best_index(&self, candidate_count: usize) -> Option<usize> {
        self.best_index
            .filter(|value| value.is_finite() && value.fract() == 0.0 && *value >= 0.0)
            .filter(|value| *value < candidate_count as f64)
            .map(|value| value as usize)
    }
}

fn raw_ranking(entry: &Value) -> Option<RawRanking> {
    let object = entry.as_object()?;
    Some(RawRanking {
        verdict: object.get("verdict").and_then(Value::as_str).and_then(Verdict::parse),
        reason: object.get("reason").and_then(Value::as_str).map(str::to_string),
    })
}

/// Normalizes generator fields into a verdict for `candidate_count` outfits.
pub fn repair(
    raw: RawAdvice,
    candidate_count: NonZeroUsize,
    context: &AdviceContext,
) -> (AdviceVerdict, RepairState) {
    let count = candidate_count.get();
    let padded_reason = padded_reason(context);

    let mut rankings: Vec<RankingEntry> = (0..count)
        .map(|index| {
            let entry = raw.rankings.get(index).and_then(Option::as_ref);
            let reason = entry
                .and_then(|entry| entry.reason.as_deref())
                .map(|reason| clamp_words(reason, REASON_WORD_LIMIT))
                .filter(|reason| !reason.is_empty())
                .unwrap_or_else(|| clamp_words(&padded_reason, REASON_WORD_LIMIT));
            RankingEntry {
                index,
                verdict: entry.and_then(|entry| entry.verdict).unwrap_or(Verdict::Pass),
                reason,
            }
        })
        .collect();

    let best: Vec<usize> = rankings
        .iter()
        .filter(|entry| entry.verdict == Verdict::Best)
        .map(|entry| entry.index)
        .collect();

    let (best_index, state) = match best.as_slice() {
        [only] => (*only, RepairState::Unchecked),
        _ => {
            for entry in &mut rankings {
                entry.verdict =
                    if entry.verdict == Verdict::Best { Verdict::Good } else { Verdict::Pass };
            }
            let target = raw.valid_best_index(count).unwrap_or(0);
            rankings[target].verdict = Verdict::Best;
            (target, RepairState::RepairedByDemotion)
        }
    };

    let explanation = non_empty_clamped(raw.explanation.as_deref(), EXPLANATION_WORD_LIMIT)
        .unwrap_or_else(|| clamp_words(&fallback_explanation(context), EXPLANATION_WORD_LIMIT));
    let weather_alternative =
        non_empty_clamped(raw.weather_alternative.as_deref(), WEATHER_ALTERNATIVE_WORD_LIMIT)
            .unwrap_or_else(|| {
                clamp_words(&fallback_weather_alternative(context), WEATHER_ALTERNATIVE_WORD_LIMIT)
            });

    let verdict = AdviceVerdict {
        best_index,
        rankings,
        explanation,
        tips: normalize_tips(&raw.tips),
        weather_alternative,
    };
    (verdict, state)
}

fn padded_reason(context: &AdviceContext) -> String {
    match context.weather.temperature_tag() {
        Some(tag) => format!("{tag} tuned for {}.", context.occasion),
        None => format!("Tuned for {}.", context.occasion),
    }
}

fn non_empty_clamped(text: Option<&str>, max_words: usize) -> Option<String> {
    text.map(|text| clamp_words(text, max_words)).filter(|text| !text.is_empty())
}

fn normalize_tips(tips: &[String]) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(TIP_COUNT);
    let candidates = tips
        .iter()
        .map(|tip| clamp_words(tip, TIP_WORD_LIMIT))
        .chain(TIP_FILLERS.iter().map(|filler| filler.to_string()));

    for tip in candidates {
        if normalized.len() == TIP_COUNT {
            break;
        }
        if !tip.is_empty() && !normalized.contains(&tip) {
            normalized.push(tip);
        }
    }
    normalized
}
