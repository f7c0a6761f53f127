//! Rain cycle — a perpetual Dry/Raining automaton.
//!
//! Dry lasts 15–20 s (uniform), Raining lasts 10 s. Rain onset forces
//! irrigation off. Two latches keep each transition from alerting twice:
//! `start_notified` is cleared when rain ends, `stop_notified` when rain
//! starts.

use std::time::Duration;

use serde::Serialize;

use aqrobloom_domain::alert::Severity;

use super::Facility;
use crate::alert_queue::{IRRIGATION_AUTO_STOPPED, RAIN_DETECTED, RAIN_STOPPED};
use crate::ports::RandomSource;
use crate::scheduler::{FacilityScheduler, FacilityTimer, TimerId};

/// Shortest dry spell.
pub const DRY_MIN: Duration = Duration::from_millis(15_000);
/// Width of the random part of a dry spell.
pub const DRY_JITTER_MS: i64 = 5_000;
/// Length of a rain shower.
pub const RAIN_DWELL: Duration = Duration::from_millis(10_000);
/// Delay between rain onset and the "irrigation auto-stopped" notice.
pub const AUTO_STOP_NOTICE_DELAY: Duration = Duration::from_millis(2_000);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RainPhase {
    #[default]
    Dry,
    Raining,
}

/// Cycle state and its alert latches.
#[derive(Debug, Default)]
pub struct RainCycle {
    phase: RainPhase,
    start_notified: bool,
    stop_notified: bool,
    pending: Option<TimerId>,
}

impl RainCycle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn phase(&self) -> RainPhase {
        self.phase
    }

    #[must_use]
    pub fn start_notified(&self) -> bool {
        self.start_notified
    }

    #[must_use]
    pub fn stop_notified(&self) -> bool {
        self.stop_notified
    }

    /// The next scheduled transition, if the cycle is running.
    #[must_use]
    pub fn pending(&self) -> Option<TimerId> {
        self.pending
    }

    /// Start waiting for the next onset. Does nothing if a transition is
    /// already pending.
    pub fn arm<R: RandomSource + ?Sized>(&mut self, facility: &mut Facility<'_, R>) {
        if self.pending.is_some() {
            return;
        }
        self.schedule_onset(facility);
    }

    fn schedule_onset<R: RandomSource + ?Sized>(&mut self, facility: &mut Facility<'_, R>) {
        let jitter = facility.random.uniform_int(0, DRY_JITTER_MS);
        let delay = DRY_MIN + Duration::from_millis(jitter.unsigned_abs());
        self.pending = Some(
            facility
                .scheduler
                .schedule_after(delay, FacilityTimer::RainOnset),
        );
        tracing::debug!(delay_ms = %delay.as_millis(), "rain onset scheduled");
    }

    /// The Dry → Raining timer fired.
    pub fn on_onset_timer<R: RandomSource + ?Sized>(&mut self, facility: &mut Facility<'_, R>) {
        self.pending = None;
        self.phase = RainPhase::Raining;
        self.apply_onset(facility);
        self.pending = Some(
            facility
                .scheduler
                .schedule_after(RAIN_DWELL, FacilityTimer::RainEnd),
        );
    }

    /// The Raining → Dry timer fired. Re-arms the next onset.
    pub fn on_end_timer<R: RandomSource + ?Sized>(&mut self, facility: &mut Facility<'_, R>) {
        self.pending = None;
        self.phase = RainPhase::Dry;
        self.apply_end(facility);
        self.schedule_onset(facility);
    }

    /// Turn rain on in the store with its side effects.
    ///
    /// A no-op when the store already reports rain.
    pub fn apply_onset<R: ?Sized>(&mut self, facility: &mut Facility<'_, R>) {
        self.stop_notified = false;
        let change = facility.store.set_rain(true);
        if !change.changed {
            tracing::debug!("rain onset ignored, already raining");
            return;
        }
        if self.start_notified {
            return;
        }
        self.start_notified = true;
        facility.raise(RAIN_DETECTED, Severity::Error);
        if change.irrigation_stopped {
            tracing::info!("irrigation forced off by rain");
            facility.alerts.defer(
                facility.scheduler,
                AUTO_STOP_NOTICE_DELAY,
                IRRIGATION_AUTO_STOPPED,
                Severity::Info,
            );
        }
    }

    /// Turn rain off in the store. A no-op when it is already dry.
    pub fn apply_end<R: ?Sized>(&mut self, facility: &mut Facility<'_, R>) {
        self.start_notified = false;
        let change = facility.store.set_rain(false);
        if !change.changed {
            tracing::debug!("rain end ignored, already dry");
            return;
        }
        if self.stop_notified {
            return;
        }
        self.stop_notified = true;
        facility.raise(RAIN_STOPPED, Severity::Success);
    }

    /// Clear both latches.
    pub fn reset_latches(&mut self) {
        self.start_notified = false;
        self.stop_notified = false;
    }

    /// Drop the pending transition.
    pub fn cancel(&mut self, scheduler: &mut FacilityScheduler) {
        if let Some(timer) = self.pending.take() {
            scheduler.cancel(timer);
        }
    }
}

#[cfg(test)]
mod tests {
    use aqrobloom_domain::device::DeviceKind;
    use aqrobloom_domain::time::SimTime;

    use super::*;
    use crate::controllers::harness::Harness;

    #[test]
    fn should_schedule_onset_within_dry_window() {
        let mut harness = Harness::with_samples([0.5]);
        let mut cycle = RainCycle::new();

        cycle.arm(&mut harness.facility());

        assert_eq!(
            harness.scheduler.next_deadline(),
            Some(SimTime::from_millis(17_500))
        );
    }

    #[test]
    fn should_not_stack_onsets_when_armed_twice() {
        let mut harness = Harness::with_samples([0.0]);
        let mut cycle = RainCycle::new();

        cycle.arm(&mut harness.facility());
        cycle.arm(&mut harness.facility());

        assert_eq!(harness.scheduler.len(), 1);
    }

    #[test]
    fn should_raise_only_error_alert_when_irrigation_was_off() {
        let mut harness = Harness::default();
        let mut cycle = RainCycle::new();

        cycle.on_onset_timer(&mut harness.facility());

        assert_eq!(cycle.phase(), RainPhase::Raining);
        assert!(harness.store.state().rain_detected());
        assert_eq!(harness.messages(), vec![RAIN_DETECTED]);
        assert_eq!(harness.alerts.pending_deferred(), 0);
    }

    #[test]
    fn should_force_irrigation_off_and_defer_notice_when_irrigating() {
        let mut harness = Harness::default();
        harness.store.toggle_device(DeviceKind::Irrigation);
        let mut cycle = RainCycle::new();

        cycle.on_onset_timer(&mut harness.facility());

        assert!(!harness.store.state().irrigation_on());
        assert_eq!(harness.messages(), vec![RAIN_DETECTED]);
        assert_eq!(harness.alerts.pending_deferred(), 1);
    }

    #[test]
    fn should_schedule_end_after_dwell() {
        let mut harness = Harness::default();
        let mut cycle = RainCycle::new();

        cycle.on_onset_timer(&mut harness.facility());

        let end = cycle.pending().unwrap();
        assert!(harness.scheduler.is_pending(end));
        // ttl of the rain alert is 4 s, the end timer is the last deadline
        let mut deadlines = Vec::new();
        while let Some((_, task)) = harness.scheduler.pop_due(SimTime::from_millis(u64::MAX)) {
            deadlines.push((harness.scheduler.now(), task));
        }
        assert_eq!(
            deadlines.last(),
            Some(&(SimTime::from_millis(10_000), FacilityTimer::RainEnd))
        );
    }

    #[test]
    fn should_raise_single_alert_when_onset_reenters() {
        let mut harness = Harness::default();
        let mut cycle = RainCycle::new();

        cycle.apply_onset(&mut harness.facility());
        cycle.apply_onset(&mut harness.facility());

        assert_eq!(harness.messages(), vec![RAIN_DETECTED]);
        assert!(cycle.start_notified());
    }

    #[test]
    fn should_suppress_onset_alert_while_start_latch_is_set() {
        let mut harness = Harness::default();
        let mut cycle = RainCycle::new();
        cycle.apply_onset(&mut harness.facility());
        // flag cleared behind the cycle's back; the latch is still set
        harness.store.set_rain(false);

        cycle.apply_onset(&mut harness.facility());

        assert!(harness.store.state().rain_detected());
        assert_eq!(harness.messages(), vec![RAIN_DETECTED]);
    }

    #[test]
    fn should_resume_and_reschedule_onset_when_rain_ends() {
        let mut harness = Harness::with_samples([0.0]);
        let mut cycle = RainCycle::new();
        cycle.apply_onset(&mut harness.facility());

        cycle.on_end_timer(&mut harness.facility());

        assert_eq!(cycle.phase(), RainPhase::Dry);
        assert!(!harness.store.state().rain_detected());
        assert!(!cycle.start_notified());
        assert!(cycle.stop_notified());
        assert_eq!(harness.messages(), vec![RAIN_DETECTED, RAIN_STOPPED]);
        let onset = cycle.pending().unwrap();
        assert!(harness.scheduler.is_pending(onset));
    }

    #[test]
    fn should_only_reschedule_when_end_fires_while_already_dry() {
        let mut harness = Harness::with_samples([0.0]);
        let mut cycle = RainCycle::new();

        cycle.on_end_timer(&mut harness.facility());

        assert!(harness.messages().is_empty());
        assert!(cycle.pending().is_some());
    }

    #[test]
    fn should_clear_stop_latch_on_next_onset() {
        let mut harness = Harness::default();
        let mut cycle = RainCycle::new();
        cycle.apply_onset(&mut harness.facility());
        cycle.apply_end(&mut harness.facility());
        assert!(cycle.stop_notified());

        cycle.apply_onset(&mut harness.facility());

        assert!(!cycle.stop_notified());
        assert!(cycle.start_notified());
    }

    #[test]
    fn should_drop_pending_transition_on_cancel() {
        let mut harness = Harness::default();
        let mut cycle = RainCycle::new();
        cycle.arm(&mut harness.facility());

        cycle.cancel(&mut harness.scheduler);

        assert!(harness.scheduler.is_empty());
        assert_eq!(cycle.pending(), None);
    }
}
