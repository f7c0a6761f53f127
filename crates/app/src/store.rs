//! Facility state store — the single owner of [`FacilityState`].
//!
//! Every mutation clones the current snapshot, changes the copy and
//! installs it as a new [`Arc`]. A published snapshot is never touched
//! again, so a reader can tell "something changed" with [`Arc::ptr_eq`].
//! Operations that turn out to be no-ops do not install a new snapshot.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use aqrobloom_domain::alert::Alert;
use aqrobloom_domain::device::{DeviceKind, Reading};
use aqrobloom_domain::facility::FacilityState;
use aqrobloom_domain::geometry::Point;
use aqrobloom_domain::id::{AlertId, NodeId};
use aqrobloom_domain::time::SimTime;

/// Lowest value the generator fuel gauge ever reports.
pub const FUEL_FLOOR: f64 = 10.0;

/// Result of [`FacilityStore::toggle_device`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ToggleOutcome {
    /// The device's `on` flag flipped to `on`.
    Switched { kind: DeviceKind, on: bool },
    /// Irrigation may not start while rain is detected; nothing changed.
    Refused { kind: DeviceKind },
}

/// Partial metric update. `None` fields are left alone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TelemetryPatch {
    #[serde(default)]
    pub soil_moisture: Option<u8>,
    #[serde(default)]
    pub fuel_level: Option<f64>,
    #[serde(default)]
    pub watt_production: Option<u32>,
}

impl TelemetryPatch {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.soil_moisture.is_none() && self.fuel_level.is_none() && self.watt_production.is_none()
    }
}

/// Result of [`FacilityStore::set_rain`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RainChange {
    /// The rain flag actually flipped.
    pub changed: bool,
    /// Irrigation was running and got forced off by the onset.
    pub irrigation_stopped: bool,
}

/// Owns the current facility snapshot.
#[derive(Debug, Clone)]
pub struct FacilityStore {
    current: Arc<FacilityState>,
}

impl FacilityStore {
    #[must_use]
    pub fn new(initial: FacilityState) -> Self {
        Self {
            current: Arc::new(initial),
        }
    }

    /// The current snapshot. Cheap: clones the `Arc`.
    #[must_use]
    pub fn snapshot(&self) -> Arc<FacilityState> {
        Arc::clone(&self.current)
    }

    /// Borrow the current state without taking a reference count.
    #[must_use]
    pub fn state(&self) -> &FacilityState {
        &self.current
    }

    fn commit<T>(&mut self, mutate: impl FnOnce(&mut FacilityState) -> T) -> T {
        let mut next = FacilityState::clone(&self.current);
        let out = mutate(&mut next);
        self.current = Arc::new(next);
        out
    }

    /// Flip a device's `on` flag.
    ///
    /// Starting irrigation while rain is detected is refused and leaves the
    /// snapshot untouched. Every other toggle flips unconditionally.
    pub fn toggle_device(&mut self, kind: DeviceKind) -> ToggleOutcome {
        let state = self.state();
        if kind == DeviceKind::Irrigation && !state.irrigation_on() && state.rain_detected() {
            return ToggleOutcome::Refused { kind };
        }
        self.commit(|state| {
            let device = state.devices.get_mut(kind);
            device.on = !device.on;
            ToggleOutcome::Switched { kind, on: device.on }
        })
    }

    /// Move a canvas node.
    pub fn set_position(&mut self, node: NodeId, position: Point) {
        self.commit(|state| *state.position_mut(node) = position);
    }

    /// Apply sensor readings. Soil moisture is capped at 100 and fuel kept
    /// within `[10, 100]`.
    pub fn apply_telemetry(&mut self, patch: TelemetryPatch) {
        if patch.is_empty() {
            return;
        }
        self.commit(|state| {
            if let Some(soil) = patch.soil_moisture {
                state.devices.irrigation.reading = Reading::SoilMoisture(soil.min(100));
            }
            if let Some(fuel) = patch.fuel_level {
                state.devices.generator.reading = Reading::FuelLevel(fuel.clamp(FUEL_FLOOR, 100.0));
            }
            if let Some(watts) = patch.watt_production {
                state.devices.solar.reading = Reading::WattProduction(watts);
            }
        });
    }

    /// Set the rain sensor's reading.
    ///
    /// When rain starts while irrigation is running, irrigation is switched
    /// off in the same snapshot. Setting the flag it already has is a no-op.
    pub fn set_rain(&mut self, detected: bool) -> RainChange {
        if self.state().rain_detected() == detected {
            return RainChange::default();
        }
        self.commit(|state| {
            state.devices.rain_sensor.reading = Reading::Rain(detected);
            let irrigation_stopped = detected && state.devices.irrigation.on;
            if irrigation_stopped {
                state.devices.irrigation.on = false;
            }
            RainChange {
                changed: true,
                irrigation_stopped,
            }
        })
    }

    /// Add `delta` to the reservoir volume (clamped) and stamp the update.
    pub fn apply_reservoir_delta(&mut self, delta: i64, at: SimTime) -> u32 {
        self.commit(|state| state.reservoir.apply_delta(delta, at))
    }

    /// Open the detail view of `node`.
    pub fn open_detail(&mut self, node: NodeId) {
        if self.state().detail == Some(node) {
            return;
        }
        self.commit(|state| state.detail = Some(node));
    }

    /// Close the detail view. Returns `false` if none was open.
    pub fn close_detail(&mut self) -> bool {
        if self.state().detail.is_none() {
            return false;
        }
        self.commit(|state| state.detail = None);
        true
    }

    /// Append an alert to the visible queue.
    pub fn push_alert(&mut self, alert: Alert) {
        self.commit(|state| state.alerts.push(alert));
    }

    /// Drop the alert with `id`. Returns `false` if it was already gone.
    pub fn remove_alert(&mut self, id: AlertId) -> bool {
        if !self.state().alerts.iter().any(|alert| alert.id == id) {
            return false;
        }
        self.commit(|state| state.alerts.retain(|alert| alert.id != id));
        true
    }

    /// Drop every visible alert.
    pub fn clear_alerts(&mut self) {
        if self.state().alerts.is_empty() {
            return;
        }
        self.commit(|state| state.alerts.clear());
    }

    /// Restore the startup switch configuration: generator and solar on,
    /// everything else off, no rain, reservoir back at `start_volume`.
    ///
    /// Node positions and metrics other than rain are kept.
    pub fn reset(&mut self, start_volume: u32, at: SimTime) {
        self.commit(|state| {
            for kind in DeviceKind::ALL {
                state.devices.get_mut(kind).on = kind.on_by_default();
            }
            state.devices.rain_sensor.reading = Reading::Rain(false);
            state.reservoir.reset_to(start_volume, at);
            state.alerts.clear();
        });
    }
}

impl Default for FacilityStore {
    fn default() -> Self {
        Self::new(FacilityState::default())
    }
}
