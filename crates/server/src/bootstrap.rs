use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::info;
use wardrobe_agent::llm::LlmError;
use wardrobe_agent::weather::WeatherError;
use wardrobe_agent::{
    advice_generator_from_config, weather_source_from_config, RecommendationRuntime,
    RuntimeSettings,
};
use wardrobe_core::config::{AppConfig, ConfigError};

use crate::state::AppState;

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("stylist client setup failed: {0}")]
    Stylist(#[from] LlmError),
    #[error("weather client setup failed: {0}")]
    Weather(#[from] WeatherError),
}

pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );
    let generator = advice_generator_from_config(&config.stylist)?;
    info!(
        event_name = "system.bootstrap.stylist_ready",
        correlation_id = "bootstrap",
        provider = config.stylist.provider.as_str(),
        model = %config.stylist.model,
        "stylist advice generator initialized"
    );

    let weather = weather_source_from_config(&config.weather)?;
    info!(
        event_name = "system.bootstrap.weather_ready",
        correlation_id = "bootstrap",
        enabled = weather.is_some(),
        default_city = %config.weather.default_city,
        "weather source initialized"
    );

    let runtime = RecommendationRuntime::new(generator, RuntimeSettings::from_config(&config));
    let state = AppState {
        runtime: Arc::new(runtime),
        weather,
        default_city: config.weather.default_city.clone(),
        weather_timeout: Duration::from_secs(config.weather.timeout_secs),
        stylist_provider: config.stylist.provider,
    };

    Ok(Application { config, state })
}

#[cfg(test)]
mod tests {
    use wardrobe_core::config::{AppConfig, ConfigOverrides, LoadOptions, StylistProvider};

    use crate::bootstrap::{bootstrap_with_config, Application, BootstrapError};

    fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
        let config = AppConfig::load(options)?;
        bootstrap_with_config(config)
    }

    #[test]
    fn bootstrap_fails_fast_without_stylist_credentials() {
        let result = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                stylist_provider: Some(StylistProvider::Gemini),
                stylist_api_key: Some("   ".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });

        let message = result.err().map(|error| error.to_string()).unwrap_or_default();
        assert!(message.contains("stylist.api_key"), "unexpected message: {message}");
    }

    #[test]
    fn bootstrap_with_defaults_serves_deterministic_advice() {
        let app = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                stylist_provider: Some(StylistProvider::Disabled),
                weather_enabled: Some(false),
                max_results: Some(2),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .expect("bootstrap should succeed with defaults");

        assert_eq!(app.state.runtime.generator_name(), "disabled");
        assert_eq!(app.state.runtime.settings().max_results, 2);
        assert!(app.state.weather.is_none());
        assert_eq!(app.state.stylist_provider, StylistProvider::Disabled);
    }

    #[test]
    fn enabled_weather_builds_a_source() {
        let app = bootstrap(LoadOptions {
            overrides: ConfigOverrides {
                stylist_provider: Some(StylistProvider::Disabled),
                weather_enabled: Some(true),
                weather_api_key: Some("ow-test".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        })
        .expect("bootstrap should succeed");

        assert!(app.state.weather.is_some());
        assert_eq!(app.config.weather.default_city, "Bangalore");
    }
}
