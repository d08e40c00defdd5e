use axum::{extract::State, http::StatusCode, Json};
use chrono::Utc;
use serde::Serialize;
use wardrobe_core::config::StylistProvider;

use crate::state::AppState;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthCheck {
    pub status: &'static str,
    pub detail: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: HealthCheck,
    pub stylist: HealthCheck,
    pub weather: HealthCheck,
    pub checked_at: String,
}

pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    // advice always falls back, so the stylist never degrades readiness
    let stylist = match state.stylist_provider {
        StylistProvider::Disabled => HealthCheck {
            status: "ready",
            detail: "stylist disabled; deterministic advice only".to_string(),
        },
        provider => HealthCheck {
            status: "ready",
            detail: format!("stylist provider `{}` configured", provider.as_str()),
        },
    };

    let weather = match &state.weather {
        Some(_) => HealthCheck {
            status: "ready",
            detail: format!("weather lookup enabled, default city {}", state.default_city),
        },
        None => HealthCheck {
            status: "ready",
            detail: "weather lookup disabled; requests must supply weather".to_string(),
        },
    };

    let payload = HealthResponse {
        status: "ready",
        service: HealthCheck {
            status: "ready",
            detail: format!(
                "wardrobe-server runtime initialized (advice via {})",
                state.runtime.generator_name()
            ),
        },
        stylist,
        weather,
        checked_at: Utc::now().to_rfc3339(),
    };

    (StatusCode::OK, Json(payload))
}
