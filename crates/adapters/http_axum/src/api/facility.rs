//! JSON handlers for the facility as a whole.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;

use aqrobloom_app::store::TelemetryPatch;

use crate::error::ApiError;
use crate::state::AppState;
use crate::view::FacilityView;

/// Request body for forcing the rain sensor.
#[derive(Deserialize)]
pub struct RainRequest {
    pub detected: bool,
}

/// Possible responses from the get endpoint.
pub enum GetResponse {
    Ok(Json<FacilityView>),
}

impl IntoResponse for GetResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// Responses of the command endpoints that return no body.
pub enum CommandResponse {
    NoContent,
}

impl IntoResponse for CommandResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `GET /api/facility`
pub async fn get(State(state): State<AppState>) -> Result<GetResponse, ApiError> {
    let snapshot = state.facility.snapshot().await?;
    Ok(GetResponse::Ok(Json(FacilityView::from(snapshot.as_ref()))))
}

/// `POST /api/reset`
pub async fn reset(State(state): State<AppState>) -> Result<CommandResponse, ApiError> {
    state.facility.reset().await?;
    Ok(CommandResponse::NoContent)
}

/// `DELETE /api/detail`
pub async fn close_detail(State(state): State<AppState>) -> Result<CommandResponse, ApiError> {
    state.facility.close_detail().await?;
    Ok(CommandResponse::NoContent)
}

/// `PUT /api/rain`
pub async fn set_rain(
    State(state): State<AppState>,
    Json(req): Json<RainRequest>,
) -> Result<CommandResponse, ApiError> {
    state.facility.inject_rain(req.detected).await?;
    Ok(CommandResponse::NoContent)
}

/// `PATCH /api/telemetry`
pub async fn apply_telemetry(
    State(state): State<AppState>,
    Json(patch): Json<TelemetryPatch>,
) -> Result<CommandResponse, ApiError> {
    state.facility.apply_telemetry(patch).await?;
    Ok(CommandResponse::NoContent)
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use crate::api::test_support::{json_body, send, test_state};

    #[tokio::test]
    async fn should_return_snapshot_view() {
        let state = test_state();

        let response = send(&state, "GET", "/api/facility", None).await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["reservoir_percentage"], 70);
        assert_eq!(json["devices"]["generator"]["on"], true);
        assert_eq!(json["detail"], serde_json::Value::Null);
    }

    #[tokio::test]
    async fn should_reset_and_leave_single_alert() {
        let state = test_state();
        send(&state, "POST", "/api/devices/generator/toggle", None).await;

        let response = send(&state, "POST", "/api/reset", None).await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let json = json_body(send(&state, "GET", "/api/facility", None).await).await;
        assert_eq!(json["devices"]["generator"]["on"], true);
        let alerts = json["alerts"].as_array().unwrap();
        assert_eq!(alerts.len(), 1);
        assert_eq!(alerts[0]["message"], "System reset.");
        assert_eq!(alerts[0]["severity"], "info");
    }

    #[tokio::test]
    async fn should_inject_rain_and_stop_irrigation() {
        let state = test_state();
        send(&state, "POST", "/api/devices/irrigation/toggle", None).await;

        let response = send(
            &state,
            "PUT",
            "/api/rain",
            Some(serde_json::json!({"detected": true})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let json = json_body(send(&state, "GET", "/api/facility", None).await).await;
        assert_eq!(json["devices"]["irrigation"]["on"], false);
        assert_eq!(
            json["devices"]["rain_sensor"]["reading"],
            serde_json::json!({"metric": "rain", "value": true})
        );
    }

    #[tokio::test]
    async fn should_patch_telemetry() {
        let state = test_state();

        let response = send(
            &state,
            "PATCH",
            "/api/telemetry",
            Some(serde_json::json!({"watt_production": 2100})),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
        let json = json_body(send(&state, "GET", "/api/facility", None).await).await;
        assert_eq!(json["devices"]["solar"]["reading"]["value"], 2100);
    }

    #[tokio::test]
    async fn should_return_503_when_engine_stopped() {
        let state = test_state();
        state.facility.shutdown().await.unwrap();

        let response = send(&state, "GET", "/api/facility", None).await;

        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let json = json_body(response).await;
        assert_eq!(json["error"], "facility engine is not running");
    }
}
