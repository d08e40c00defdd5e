use std::sync::Arc;
use std::time::Duration;

use wardrobe_agent::{lookup_or_unknown, RecommendationRuntime, WeatherSource};
use wardrobe_core::config::StylistProvider;
use wardrobe_core::domain::weather::WeatherContext;

#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<RecommendationRuntime>,
    pub weather: Option<Arc<dyn WeatherSource>>,
    pub default_city: String,
    pub weather_timeout: Duration,
    pub stylist_provider: StylistProvider,
}

impl AppState {
    /// Looks up `city` (or the default city) when a weather source is configured.
    pub async fn resolve_weather(&self, city: Option<&str>) -> WeatherContext {
        let city = city
            .map(str::trim)
            .filter(|city| !city.is_empty())
            .unwrap_or(self.default_city.as_str());
        match &self.weather {
            Some(source) => lookup_or_unknown(source.as_ref(), city, self.weather_timeout).await,
            None => WeatherContext::unknown().with_city(city),
        }
    }
}
