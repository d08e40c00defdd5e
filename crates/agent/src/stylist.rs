use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use wardrobe_core::advice::{
    AdviceGenerator, AdviceRequest, GeneratorError, EXPLANATION_WORD_LIMIT, REASON_WORD_LIMIT,
    TIP_COUNT, TIP_WORD_LIMIT, WEATHER_ALTERNATIVE_WORD_LIMIT,
};
use wardrobe_core::config::{StylistConfig, StylistProvider};

use crate::llm::{GeminiClient, LlmClient, LlmError, OllamaClient};

impl From<LlmError> for GeneratorError {
    fn from(error: LlmError) -> Self {
        match error {
            LlmError::NotConfigured(_) => Self::Unavailable,
            LlmError::Timeout { after_ms } => Self::Timeout { after_ms },
            LlmError::Status { status: 429, .. } => Self::QuotaExhausted,
            LlmError::Status { status, body } => Self::Rejected { status, message: body },
            LlmError::Transport(message) | LlmError::Decode(message) => Self::Transport(message),
            error @ LlmError::EmptyResponse => Self::Transport(error.to_string()),
        }
    }
}

/// Prompt asking the model for advice JSON about `request.outfits`.
pub fn build_stylist_prompt(request: &AdviceRequest<'_>) -> String {
    let weather = &request.context.weather;
    let city = weather.city.as_deref().filter(|city| !city.trim().is_empty()).unwrap_or("Unknown");
    let temperature = weather.temperature_tag().unwrap_or_else(|| "Unknown".to_string());
    let example_tag = weather.temperature_tag().unwrap_or_else(|| "°C".to_string());
    let outfits = serde_json::to_string_pretty(request.outfits).unwrap_or_else(|_| "[]".to_string());
    let count = request.outfits.len();

    format!(
        r#"You are "Wardrobe AI", a confident, modern fashion stylist. No disclaimers.

WEATHER (reference it in the explanation, every ranking and weatherAlternative):
City: {city}
Temperature: {temperature}
Conditions: {conditions}

OCCASION:
{occasion}

OUTFITS (JSON array of {count}, indexes matter):
{outfits}

TASK:
A) Review every outfit index with a short verdict and reason.
B) Pick exactly one best outfit.

STRICT RULES:
- Return strict JSON only, no markdown and no extra text.
- rankings: array length must equal {count}.
- rankings[i].index must equal i.
- rankings[i].verdict must be one of "pass", "good", "best", with exactly one "best".
- rankings[i].reason: at most {reason_words} words and must include the temperature (e.g. "{example_tag}").
- explanation: at most 2 sentences and {explanation_words} words, mentioning temperature and conditions.
- tips: exactly {tip_count} different strings, each at most {tip_words} words.
- weatherAlternative: exactly 1 sentence, at most {alternative_words} words, mentioning the temperature.
- No uncertainty ("appears", "seems", "looks like"). Keep it constructive.

OUTPUT JSON SHAPE:
{{
  "bestIndex": number,
  "rankings": [{{ "index": number, "verdict": "pass" | "good" | "best", "reason": string }}],
  "explanation": string,
  "tips": [string, string, string],
  "weatherAlternative": string
}}
"#,
        conditions = weather.conditions(),
        occasion = request.context.occasion,
        reason_words = REASON_WORD_LIMIT,
        explanation_words = EXPLANATION_WORD_LIMIT,
        tip_count = TIP_COUNT,
        tip_words = TIP_WORD_LIMIT,
        alternative_words = WEATHER_ALTERNATIVE_WORD_LIMIT,
    )
}

/// Advice generator backed by an LLM completion endpoint.
pub struct StylistAdviceGenerator {
    client: Arc<dyn LlmClient>,
}

impl StylistAdviceGenerator {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AdviceGenerator for StylistAdviceGenerator {
    fn name(&self) -> &str {
        self.client.provider()
    }

    async fn generate(&self, request: AdviceRequest<'_>) -> Result<String, GeneratorError> {
        let prompt = build_stylist_prompt(&request);
        self.client.complete(&prompt).await.map_err(GeneratorError::from)
    }
}

/// Used when no stylist provider is configured; every request takes the fallback path.
#[derive(Clone, Copy, Debug, Default)]
pub struct DisabledStylist;

#[async_trait]
impl AdviceGenerator for DisabledStylist {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn generate(&self, _request: AdviceRequest<'_>) -> Result<String, GeneratorError> {
        Err(GeneratorError::Unavailable)
    }
}

pub fn advice_generator_from_config(
    config: &StylistConfig,
) -> Result<Arc<dyn AdviceGenerator>, LlmError> {
    let timeout = Duration::from_secs(config.timeout_secs);
    let client: Arc<dyn LlmClient> = match config.provider {
        StylistProvider::Disabled => return Ok(Arc::new(DisabledStylist)),
        StylistProvider::Gemini => {
            let api_key = config.api_key.clone().ok_or_else(|| {
                LlmError::NotConfigured("stylist.api_key is required for gemini".to_string())
            })?;
            Arc::new(GeminiClient::new(
                api_key,
                config.model.clone(),
                config.base_url.clone(),
                timeout,
            )?)
        }
        StylistProvider::Ollama => {
            let base_url = config.base_url.clone().ok_or_else(|| {
                LlmError::NotConfigured("stylist.base_url is required for ollama".to_string())
            })?;
            Arc::new(OllamaClient::new(base_url, config.model.clone(), timeout)?)
        }
    };
    Ok(Arc::new(StylistAdviceGenerator::new(client)))
}
