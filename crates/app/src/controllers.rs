//! Timer-driven controllers and the pointer state machine.
//!
//! Each timed controller owns the [`TimerId`](crate::scheduler::TimerId) of
//! its pending timer and re-arms itself when it fires. They all act on the
//! same [`Facility`] borrow, handed over by the engine for the duration of
//! a single callback.

pub mod pointer;
pub mod rain_cycle;
pub mod reservoir;
pub mod telemetry;

use aqrobloom_domain::alert::Severity;
use aqrobloom_domain::id::AlertId;

use crate::alert_queue::AlertQueue;
use crate::scheduler::FacilityScheduler;
use crate::store::FacilityStore;

pub use pointer::{PointerButton, PointerController, PointerDown, Release};
pub use rain_cycle::{RainCycle, RainPhase};
pub use reservoir::ReservoirIntegrator;
pub use telemetry::TelemetryGenerator;

/// Mutable view of the engine's shared parts for one callback.
pub struct Facility<'a, R: ?Sized> {
    pub store: &'a mut FacilityStore,
    pub scheduler: &'a mut FacilityScheduler,
    pub alerts: &'a mut AlertQueue,
    pub random: &'a mut R,
}

impl<R: ?Sized> Facility<'_, R> {
    /// Raise an alert now.
    pub fn raise(&mut self, message: &str, severity: Severity) -> AlertId {
        self.alerts.raise(self.store, self.scheduler, message, severity)
    }
}

#[cfg(test)]
pub(crate) mod harness {
    use super::Facility;
    use crate::alert_queue::AlertQueue;
    use crate::ports::ScriptedRandom;
    use crate::scheduler::FacilityScheduler;
    use crate::store::FacilityStore;

    /// Owned parts for driving a controller without the engine.
    #[derive(Default)]
    pub(crate) struct Harness {
        pub store: FacilityStore,
        pub scheduler: FacilityScheduler,
        pub alerts: AlertQueue,
        pub random: ScriptedRandom,
    }

    impl Harness {
        pub(crate) fn with_samples(samples: impl IntoIterator<Item = f64>) -> Self {
            Self {
                random: ScriptedRandom::new(samples),
                ..Self::default()
            }
        }

        pub(crate) fn facility(&mut self) -> Facility<'_, ScriptedRandom> {
            Facility {
                store: &mut self.store,
                scheduler: &mut self.scheduler,
                alerts: &mut self.alerts,
                random: &mut self.random,
            }
        }

        pub(crate) fn messages(&self) -> Vec<&str> {
            self.store
                .state()
                .alerts
                .iter()
                .map(|alert| alert.message.as_str())
                .collect()
        }
    }
}
