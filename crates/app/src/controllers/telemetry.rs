//! Telemetry generator — fresh sensor readings every 3 s.
//!
//! Readings update whether or not the device is switched on.

use std::time::Duration;

use aqrobloom_domain::facility::FacilityState;

use super::Facility;
use crate::ports::RandomSource;
use crate::scheduler::{FacilityScheduler, FacilityTimer, TimerId};
use crate::store::{FUEL_FLOOR, TelemetryPatch};

pub const TELEMETRY_TICK: Duration = Duration::from_millis(3_000);

const WET_SOIL: (i64, i64) = (50, 80);
const DRY_SOIL: (i64, i64) = (20, 50);
const SOLAR_WATTS: (i64, i64) = (2_000, 3_000);
const FUEL_BURN_MAX: f64 = 0.5;

#[derive(Debug, Default)]
pub struct TelemetryGenerator {
    timer: Option<TimerId>,
}

/// Draw the next readings: soil moisture, then solar output, then fuel.
pub fn sample<R: RandomSource + ?Sized>(state: &FacilityState, random: &mut R) -> TelemetryPatch {
    let (low, high) = if state.rain_detected() || state.irrigation_on() {
        WET_SOIL
    } else {
        DRY_SOIL
    };
    let soil = random.uniform_int(low, high);
    let watts = random.uniform_int(SOLAR_WATTS.0, SOLAR_WATTS.1);
    let fuel = state.devices.fuel_level().unwrap_or(FUEL_FLOOR);
    let burned = random.uniform_f64(0.0, FUEL_BURN_MAX);

    TelemetryPatch {
        soil_moisture: u8::try_from(soil).ok(),
        fuel_level: Some((fuel - burned).max(FUEL_FLOOR)),
        watt_production: u32::try_from(watts).ok(),
    }
}

impl TelemetryGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm<R: ?Sized>(&mut self, facility: &mut Facility<'_, R>) {
        if self.timer.is_none() {
            self.timer = Some(
                facility
                    .scheduler
                    .schedule_after(TELEMETRY_TICK, FacilityTimer::TelemetryTick),
            );
        }
    }

    /// Apply one round of readings and re-arm.
    pub fn on_tick<R: RandomSource + ?Sized>(
        &mut self,
        facility: &mut Facility<'_, R>,
    ) -> TelemetryPatch {
        self.timer = None;
        let patch = sample(facility.store.state(), facility.random);
        tracing::debug!(
            soil = ?patch.soil_moisture,
            watts = ?patch.watt_production,
            fuel = ?patch.fuel_level,
            "telemetry tick"
        );
        facility.store.apply_telemetry(patch);
        self.arm(facility);
        patch
    }

    pub fn cancel(&mut self, scheduler: &mut FacilityScheduler) {
        if let Some(timer) = self.timer.take() {
            scheduler.cancel(timer);
        }
    }
}
