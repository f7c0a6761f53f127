//! Reservoir integrator — updates the tank volume every 2 s.

use std::time::Duration;

use aqrobloom_domain::facility::FacilityState;

use super::Facility;
use crate::ports::RandomSource;
use crate::scheduler::{FacilityScheduler, FacilityTimer, TimerId};

pub const RESERVOIR_TICK: Duration = Duration::from_millis(2_000);

/// Fixed loss per tick when it is dry and irrigation is off.
pub const BASELINE_LOSS: i64 = 100;

/// Lower and upper (exclusive) bound of the rain gain / irrigation loss.
pub const FLOW_RANGE: (i64, i64) = (100, 500);

#[derive(Debug, Default)]
pub struct ReservoirIntegrator {
    timer: Option<TimerId>,
}

/// Volume change for one tick, read from the current state.
pub fn tick_delta<R: RandomSource + ?Sized>(state: &FacilityState, random: &mut R) -> i64 {
    if state.rain_detected() {
        random.uniform_int(FLOW_RANGE.0, FLOW_RANGE.1)
    } else if state.irrigation_on() {
        -random.uniform_int(FLOW_RANGE.0, FLOW_RANGE.1)
    } else {
        -BASELINE_LOSS
    }
}

impl ReservoirIntegrator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arm<R: ?Sized>(&mut self, facility: &mut Facility<'_, R>) {
        if self.timer.is_none() {
            self.timer = Some(
                facility
                    .scheduler
                    .schedule_after(RESERVOIR_TICK, FacilityTimer::ReservoirTick),
            );
        }
    }

    /// Apply one tick and re-arm.
    pub fn on_tick<R: RandomSource + ?Sized>(&mut self, facility: &mut Facility<'_, R>) -> u32 {
        self.timer = None;
        let delta = tick_delta(facility.store.state(), facility.random);
        let now = facility.scheduler.now();
        let volume = facility.store.apply_reservoir_delta(delta, now);
        tracing::debug!(delta, volume, at = %now, "reservoir tick");
        self.arm(facility);
        volume
    }

    pub fn cancel(&mut self, scheduler: &mut FacilityScheduler) {
        if let Some(timer) = self.timer.take() {
            scheduler.cancel(timer);
        }
    }
}
