//! Reservoir — the water tank fed by rain and drained by irrigation.

use serde::{Deserialize, Serialize};

use crate::geometry::Point;
use crate::time::SimTime;

/// Default tank capacity.
pub const DEFAULT_CAPACITY: u32 = 50_000;

/// Volume the tank holds at startup and after a reset.
pub const DEFAULT_START_VOLUME: u32 = 35_000;

/// Coarse fill level used for colouring the tank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LevelBand {
    /// Above 50 %.
    High,
    /// Above 20 %, up to 50 %.
    Medium,
    /// 20 % or less.
    Low,
}

/// Link state of the level sensor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorStatus {
    #[default]
    Connected,
}

/// The water reservoir.
///
/// `current` is kept within `[0, capacity]` by every mutating method.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Reservoir {
    current: u32,
    capacity: u32,
    pub position: Point,
    last_update: SimTime,
    sensor_status: SensorStatus,
}

impl Reservoir {
    /// Create a reservoir, clamping `current` into `[0, capacity]`.
    #[must_use]
    pub fn new(capacity: u32, current: u32, position: Point) -> Self {
        Self {
            current: current.min(capacity),
            capacity,
            position,
            last_update: SimTime::ZERO,
            sensor_status: SensorStatus::Connected,
        }
    }

    #[must_use]
    pub fn current(&self) -> u32 {
        self.current
    }

    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    #[must_use]
    pub fn last_update(&self) -> SimTime {
        self.last_update
    }

    #[must_use]
    pub fn sensor_status(&self) -> SensorStatus {
        self.sensor_status
    }

    /// Apply a signed volume change, clamp, and record a sensor update at `at`.
    ///
    /// The timestamp is refreshed even when the clamped volume is unchanged.
    /// Returns the new volume.
    pub fn apply_delta(&mut self, delta: i64, at: SimTime) -> u32 {
        let next = i64::from(self.current)
            .saturating_add(delta)
            .clamp(0, i64::from(self.capacity));
        self.current = u32::try_from(next).unwrap_or(self.capacity);
        self.last_update = at;
        self.sensor_status = SensorStatus::Connected;
        self.current
    }

    /// Refill (or drain) to `volume`, clamped to capacity.
    pub fn reset_to(&mut self, volume: u32, at: SimTime) {
        self.current = volume.min(self.capacity);
        self.last_update = at;
        self.sensor_status = SensorStatus::Connected;
    }

    /// Fill level as a whole percentage, rounded half up.
    #[must_use]
    pub fn percentage(&self) -> u8 {
        if self.capacity == 0 {
            return 0;
        }
        let current = u64::from(self.current);
        let capacity = u64::from(self.capacity);
        let pct = (current * 200 + capacity) / (capacity * 2);
        u8::try_from(pct).unwrap_or(100)
    }

    /// Fill level band, from the unrounded ratio.
    #[must_use]
    pub fn level(&self) -> LevelBand {
        let scaled = u64::from(self.current) * 100;
        let capacity = u64::from(self.capacity);
        if scaled > capacity * 50 {
            LevelBand::High
        } else if scaled > capacity * 20 {
            LevelBand::Medium
        } else {
            LevelBand::Low
        }
    }
}
