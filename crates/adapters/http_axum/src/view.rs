//! Outbound snapshot representation.

use serde::Serialize;

use aqrobloom_domain::facility::FacilityState;
use aqrobloom_domain::reservoir::LevelBand;
use aqrobloom_domain::time::{Timestamp, now};

/// A facility snapshot as sent to clients, plus derived reservoir figures.
#[derive(Debug, Clone, Serialize)]
pub struct FacilityView {
    /// Wall-clock time the view was built.
    pub generated_at: Timestamp,
    #[serde(flatten)]
    pub state: FacilityState,
    pub reservoir_percentage: u8,
    pub reservoir_level: LevelBand,
}

impl From<&FacilityState> for FacilityView {
    fn from(state: &FacilityState) -> Self {
        Self {
            generated_at: now(),
            reservoir_percentage: state.reservoir.percentage(),
            reservoir_level: state.reservoir.level(),
            state: state.clone(),
        }
    }
}
