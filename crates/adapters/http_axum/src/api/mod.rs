//! JSON API handler modules.

#[allow(clippy::missing_errors_doc)]
pub mod devices;
#[allow(clippy::missing_errors_doc)]
pub mod facility;
#[allow(clippy::missing_errors_doc)]
pub mod nodes;
#[allow(clippy::missing_errors_doc)]
pub mod pointer;
pub mod sse;

use axum::Router;
use axum::routing::{delete, get, patch, post, put};

use crate::state::AppState;

/// Build the `/api` sub-router.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Facility snapshot
        .route("/facility", get(facility::get))
        .route("/facility/stream", get(sse::stream))
        .route("/reset", post(facility::reset))
        .route("/detail", delete(facility::close_detail))
        .route("/rain", put(facility::set_rain))
        .route("/telemetry", patch(facility::apply_telemetry))
        // Devices & nodes
        .route("/devices/{kind}/toggle", post(devices::toggle))
        .route("/nodes/{id}/position", put(nodes::set_position))
        // Pointer
        .route("/pointer/down", post(pointer::down))
        .route("/pointer/move", post(pointer::move_to))
        .route("/pointer/up", post(pointer::up))
        .route("/pointer/release", post(pointer::release))
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::Router;
    use axum::body::Body;
    use axum::http::{Request, Response};
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    use aqrobloom_app::engine::{FacilityEngine, FacilityParams};
    use aqrobloom_app::ports::ScriptedRandom;
    use aqrobloom_app::runtime;

    use crate::state::AppState;

    /// State backed by a freshly spawned engine with a constant random source.
    pub(crate) fn test_state() -> AppState {
        let engine = FacilityEngine::new(FacilityParams::default(), ScriptedRandom::constant(0.0));
        AppState::new(runtime::spawn(engine))
    }

    pub(crate) fn app(state: &AppState) -> Router {
        crate::router::build(state.clone())
    }

    pub(crate) async fn send(
        state: &AppState,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> Response<Body> {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        app(state).oneshot(request).await.unwrap()
    }

    pub(crate) async fn json_body(response: Response<Body>) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }
}
