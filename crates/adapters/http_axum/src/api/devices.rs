//! JSON handlers for devices.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};

use aqrobloom_app::store::ToggleOutcome;
use aqrobloom_domain::device::DeviceKind;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the toggle endpoint.
///
/// A refused irrigation start is still a `200`: the refusal is reported in
/// the body and as an alert on the snapshot.
pub enum ToggleResponse {
    Ok(Json<ToggleOutcome>),
}

impl IntoResponse for ToggleResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Ok(json) => json.into_response(),
        }
    }
}

/// `POST /api/devices/{kind}/toggle`
pub async fn toggle(
    State(state): State<AppState>,
    Path(kind): Path<String>,
) -> Result<ToggleResponse, ApiError> {
    let kind: DeviceKind = kind.parse()?;
    let outcome = state.facility.toggle_device(kind).await?;
    Ok(ToggleResponse::Ok(Json(outcome)))
}
