//! JSON handlers for pointer gestures on the canvas.
//!
//! The client forwards raw pointer events; the engine decides whether a
//! gesture was a drag or a click.

use axum::Json;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use aqrobloom_app::controllers::{PointerButton, PointerDown, Release};
use aqrobloom_domain::geometry::Point;
use aqrobloom_domain::id::NodeId;

use crate::error::ApiError;
use crate::state::AppState;

/// Request body for a pointer-down over a node.
#[derive(Deserialize)]
pub struct DownRequest {
    pub node: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub button: PointerButton,
}

/// Response body of a pointer move: the dragged node's new position, or
/// `null` when nothing is being dragged.
#[derive(Serialize)]
pub struct MoveBody {
    pub moved: Option<Point>,
}

/// Possible responses from the pointer endpoints.
pub enum PointerResponse {
    Down(Json<PointerDown>),
    Moved(Json<MoveBody>),
    Released(Json<Release>),
}

impl IntoResponse for PointerResponse {
    fn into_response(self) -> Response {
        match self {
            Self::Down(json) => json.into_response(),
            Self::Moved(json) => json.into_response(),
            Self::Released(json) => json.into_response(),
        }
    }
}

/// `POST /api/pointer/down`
pub async fn down(
    State(state): State<AppState>,
    Json(req): Json<DownRequest>,
) -> Result<PointerResponse, ApiError> {
    let node: NodeId = req.node.parse()?;
    let outcome = state
        .facility
        .begin_drag(node, Point::new(req.x, req.y), req.button)
        .await?;
    Ok(PointerResponse::Down(Json(outcome)))
}

/// `POST /api/pointer/move`
pub async fn move_to(
    State(state): State<AppState>,
    Json(pointer): Json<Point>,
) -> Result<PointerResponse, ApiError> {
    let moved = state.facility.update_drag(pointer).await?;
    Ok(PointerResponse::Moved(Json(MoveBody { moved })))
}

/// `POST /api/pointer/up`
pub async fn up(State(state): State<AppState>) -> Result<PointerResponse, ApiError> {
    let release = state.facility.end_drag().await?;
    Ok(PointerResponse::Released(Json(release)))
}

/// `POST /api/pointer/release`
pub async fn release(State(state): State<AppState>) -> Result<PointerResponse, ApiError> {
    let release = state.facility.release_pointer().await?;
    Ok(PointerResponse::Released(Json(release)))
}
