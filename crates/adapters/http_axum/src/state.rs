//! Shared application state for axum handlers.

use aqrobloom_app::runtime::FacilityHandle;

/// Application state shared across all axum handlers.
///
/// [`FacilityHandle`] is itself a cheap clone over the engine's command
/// channel, so the state derives `Clone` directly.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Handle to the running facility engine.
    pub facility: FacilityHandle,
}

impl AppState {
    #[must_use]
    pub fn new(facility: FacilityHandle) -> Self {
        Self { facility }
    }
}
