use serde::{Deserialize, Serialize};

/// Outerwear is considered at or below this temperature.
pub const COLD_THRESHOLD_CELSIUS: f64 = 12.0;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherContext {
    /// Degrees Celsius; `None` when the weather collaborator could not tell.
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl WeatherContext {
    pub fn new(temperature: Option<f64>, description: impl Into<String>) -> Self {
        Self { temperature, description: description.into(), city: None }
    }

    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn with_city(mut self, city: impl Into<String>) -> Self {
        self.city = Some(city.into());
        self
    }

    pub fn known_temperature(&self) -> Option<f64> {
        self.temperature.filter(|value| value.is_finite())
    }

    pub fn is_cold(&self) -> bool {
        self.known_temperature().is_some_and(|value| value <= COLD_THRESHOLD_CELSIUS)
    }

    /// `"28°C"`, or `None` when the temperature is unknown.
    pub fn temperature_tag(&self) -> Option<String> {
        self.known_temperature().map(|value| {
            if value.fract() == 0.0 {
                format!("{value:.0}°C")
            } else {
                format!("{value:.1}°C")
            }
        })
    }

    pub fn temperature_label(&self) -> String {
        self.temperature_tag().unwrap_or_else(|| "unknown temperature".to_string())
    }

    pub fn conditions(&self) -> &str {
        let description = self.description.trim();
        if description.is_empty() {
            "current conditions"
        } else {
            description
        }
    }
}
