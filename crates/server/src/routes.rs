use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info, warn};
use uuid::Uuid;
use wardrobe_agent::Recommendation;
use wardrobe_core::domain::closet::ClosetSnapshot;
use wardrobe_core::domain::weather::WeatherContext;
use wardrobe_core::errors::{DomainError, InterfaceError};

use crate::health::health;
use crate::state::AppState;

/// Larger closets are rejected outright rather than partially enumerated.
pub const MAX_CLOSET_ITEMS: usize = 500;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/v1/outfits/recommend", post(recommend))
        .with_state(state)
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    #[serde(default)]
    pub closet: Vec<Value>,
    pub occasion: Option<String>,
    /// Explicit conditions win over a lookup by `city`.
    pub weather: Option<WeatherContext>,
    pub city: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendResponse {
    pub correlation_id: String,
    #[serde(flatten)]
    pub recommendation: Recommendation,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub error: String,
    pub detail: String,
    pub correlation_id: String,
}

fn interface_status(error: &InterfaceError) -> StatusCode {
    match error {
        InterfaceError::BadRequest { .. } => StatusCode::BAD_REQUEST,
        InterfaceError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(error: InterfaceError) -> (StatusCode, Json<ErrorBody>) {
    let detail = match &error {
        InterfaceError::BadRequest { message, .. } => message.clone(),
        _ => String::new(),
    };
    let body = ErrorBody {
        error: error.user_message().to_string(),
        detail,
        correlation_id: error.correlation_id().to_string(),
    };
    (interface_status(&error), Json(body))
}

pub async fn recommend(
    State(state): State<AppState>,
    Json(body): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, (StatusCode, Json<ErrorBody>)> {
    let correlation_id = Uuid::new_v4().to_string();

    if body.closet.len() > MAX_CLOSET_ITEMS {
        let error = DomainError::InvariantViolation(format!(
            "closet has {} items; at most {MAX_CLOSET_ITEMS} are accepted",
            body.closet.len()
        ))
        .into_interface(correlation_id.clone());
        warn!(
            event_name = "recommend.request.rejected",
            correlation_id = %correlation_id,
            error = %error,
            "recommend request rejected"
        );
        return Err(error_response(error));
    }

    let weather = match body.weather {
        Some(weather) => weather,
        None => state.resolve_weather(body.city.as_deref()).await,
    };
    let closet = ClosetSnapshot::from_values(body.closet);

    info!(
        event_name = "recommend.request.received",
        correlation_id = %correlation_id,
        item_count = closet.items.len(),
        rejected_count = closet.rejected.len(),
        "recommend request received"
    );

    let recommendation =
        state.runtime.recommend(&closet, body.occasion.as_deref(), weather, &correlation_id).await;

    if let Err(error) = ensure_advice_contract(&recommendation, &correlation_id) {
        error!(
            event_name = "recommend.advice.contract_violated",
            correlation_id = %correlation_id,
            error = %error,
            "advice left the runtime without satisfying its contract"
        );
        return Err(error_response(error));
    }

    Ok(Json(RecommendResponse { correlation_id, recommendation }))
}

/// Final gate before advice reaches a caller.
fn ensure_advice_contract(
    recommendation: &Recommendation,
    correlation_id: &str,
) -> Result<(), InterfaceError> {
    match &recommendation.advice {
        Some(advice) => advice
            .check_contract(recommendation.candidates.len())
            .map_err(|error| error.into_interface(correlation_id)),
        None => Ok(()),
    }
}
