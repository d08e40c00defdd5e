use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::Value;
use wardrobe_agent::{
    advice_generator_from_config, lookup_or_unknown, weather_source_from_config,
    RecommendationRuntime, RuntimeSettings,
};
use wardrobe_core::config::{AppConfig, LoadOptions};
use wardrobe_core::domain::closet::ClosetSnapshot;
use wardrobe_core::domain::weather::WeatherContext;

use super::{CommandResult, EXIT_COLLABORATOR, EXIT_CONFIG, EXIT_INPUT};

const COMMAND: &str = "recommend";

#[derive(Debug, Clone, Default)]
pub struct RecommendArgs {
    pub closet: PathBuf,
    pub occasion: Option<String>,
    pub temperature: Option<f64>,
    pub conditions: Option<String>,
    pub city: Option<String>,
}

impl RecommendArgs {
    /// Explicit conditions on the command line, if any were given.
    fn manual_weather(&self) -> Option<WeatherContext> {
        if self.temperature.is_none() && self.conditions.is_none() {
            return None;
        }
        let weather =
            WeatherContext::new(self.temperature, self.conditions.clone().unwrap_or_default());
        Some(match self.city() {
            Some(city) => weather.with_city(city),
            None => weather,
        })
    }

    fn city(&self) -> Option<&str> {
        self.city.as_deref().map(str::trim).filter(|city| !city.is_empty())
    }
}

pub fn run(args: RecommendArgs) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "config_validation",
                format!("config validation failed: {error}"),
                EXIT_CONFIG,
            );
        }
    };

    let closet = match read_closet(&args.closet) {
        Ok(closet) => closet,
        Err(message) => return CommandResult::failure(COMMAND, "closet_input", message, EXIT_INPUT),
    };

    let generator = match advice_generator_from_config(&config.stylist) {
        Ok(generator) => generator,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "stylist_setup",
                format!("stylist client setup failed: {error}"),
                EXIT_COLLABORATOR,
            );
        }
    };
    let weather_source = match weather_source_from_config(&config.weather) {
        Ok(source) => source,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "weather_setup",
                format!("weather client setup failed: {error}"),
                EXIT_COLLABORATOR,
            );
        }
    };

    let async_runtime = match tokio::runtime::Builder::new_current_thread().enable_all().build() {
        Ok(runtime) => runtime,
        Err(error) => {
            return CommandResult::failure(
                COMMAND,
                "runtime",
                format!("failed to initialize async runtime: {error}"),
                EXIT_COLLABORATOR,
            );
        }
    };

    let runtime = RecommendationRuntime::new(generator, RuntimeSettings::from_config(&config));
    let correlation_id = format!("cli-{}", uuid::Uuid::new_v4());

    let recommendation = async_runtime.block_on(async {
        let weather = match args.manual_weather() {
            Some(weather) => weather,
            None => {
                let city = args.city().unwrap_or(config.weather.default_city.as_str());
                match &weather_source {
                    Some(source) => {
                        let timeout = Duration::from_secs(config.weather.timeout_secs);
                        lookup_or_unknown(source.as_ref(), city, timeout).await
                    }
                    None => WeatherContext::unknown().with_city(city),
                }
            }
        };
        runtime.recommend(&closet, args.occasion.as_deref(), weather, &correlation_id).await
    });

    let message = format!(
        "{} outfit(s) ranked for {} from {} closet item(s); {} skipped",
        recommendation.candidates.len(),
        recommendation.occasion,
        closet.items.len(),
        closet.rejected.len()
    );
    match serde_json::to_value(&recommendation) {
        Ok(data) => CommandResult::success_with_data(COMMAND, message, Some(data)),
        Err(error) => CommandResult::failure(
            COMMAND,
            "serialization",
            format!("failed to serialize recommendation: {error}"),
            EXIT_COLLABORATOR,
        ),
    }
}

/// Reads a JSON array of closet items. Individual malformed items are kept as rejections.
fn read_closet(path: &Path) -> Result<ClosetSnapshot, String> {
    let raw = fs::read_to_string(path)
        .map_err(|error| format!("failed to read closet file `{}`: {error}", path.display()))?;
    let document: Value = serde_json::from_str(&raw)
        .map_err(|error| format!("closet file `{}` is not valid JSON: {error}", path.display()))?;

    match document {
        Value::Array(values) => Ok(ClosetSnapshot::from_values(values)),
        Value::Object(mut object) => match object.remove("items") {
            Some(Value::Array(values)) => Ok(ClosetSnapshot::from_values(values)),
            _ => Err(format!(
                "closet file `{}` must be an array of items or an object with an `items` array",
                path.display()
            )),
        },
        _ => Err(format!("closet file `{}` must be a JSON array of items", path.display())),
    }
}
