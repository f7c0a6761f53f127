//! JSON handlers for canvas nodes.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use aqrobloom_domain::geometry::Point;
use aqrobloom_domain::id::NodeId;

use crate::error::ApiError;
use crate::state::AppState;

/// Possible responses from the position endpoint.
pub enum PositionResponse {
    NoContent,
}

impl IntoResponse for PositionResponse {
    fn into_response(self) -> Response {
        match self {
            Self::NoContent => StatusCode::NO_CONTENT.into_response(),
        }
    }
}

/// `PUT /api/nodes/{id}/position`
pub async fn set_position(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(position): Json<Point>,
) -> Result<PositionResponse, ApiError> {
    let node: NodeId = id.parse()?;
    state.facility.set_position(node, position).await?;
    Ok(PositionResponse::NoContent)
}
