//! Facility engine — owns the store, the scheduler and every controller.
//!
//! The engine is synchronous and driven from outside: call
//! [`advance_to`](FacilityEngine::advance_to) to let virtual time pass and
//! the user operations to react to input. Each call runs to completion
//! before the next one starts, so no callback ever sees a half-applied
//! mutation. [`runtime`](crate::runtime) maps this onto a tokio task.

use std::sync::Arc;
use std::time::Duration;

use aqrobloom_domain::alert::Severity;
use aqrobloom_domain::device::DeviceKind;
use aqrobloom_domain::facility::{FacilityState, Layout};
use aqrobloom_domain::geometry::Point;
use aqrobloom_domain::id::NodeId;
use aqrobloom_domain::reservoir::{DEFAULT_CAPACITY, DEFAULT_START_VOLUME};
use aqrobloom_domain::time::SimTime;

use crate::alert_queue::{
    AlertQueue, IRRIGATION_STARTED, IRRIGATION_STOPPED, RAIN_BLOCKS_IRRIGATION, SYSTEM_RESET,
};
use crate::controllers::{
    Facility, PointerButton, PointerController, PointerDown, RainCycle, RainPhase, Release,
    ReservoirIntegrator, TelemetryGenerator,
};
use crate::ports::RandomSource;
use crate::scheduler::{FacilityScheduler, FacilityTimer, TimerId};
use crate::store::{FacilityStore, TelemetryPatch, ToggleOutcome};

/// Startup parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FacilityParams {
    pub layout: Layout,
    pub reservoir_capacity: u32,
    /// Volume at startup and after [`FacilityEngine::reset`].
    pub reservoir_start: u32,
}

impl Default for FacilityParams {
    fn default() -> Self {
        Self {
            layout: Layout::default(),
            reservoir_capacity: DEFAULT_CAPACITY,
            reservoir_start: DEFAULT_START_VOLUME,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Running,
    Stopped,
}

/// The simulation and automation engine.
pub struct FacilityEngine<R> {
    params: FacilityParams,
    store: FacilityStore,
    scheduler: FacilityScheduler,
    alerts: AlertQueue,
    rain: RainCycle,
    reservoir: ReservoirIntegrator,
    telemetry: TelemetryGenerator,
    pointer: PointerController,
    random: R,
    lifecycle: Lifecycle,
}

impl<R: RandomSource> FacilityEngine<R> {
    /// Build an engine in its startup state. No timer runs until
    /// [`start`](Self::start).
    pub fn new(params: FacilityParams, random: R) -> Self {
        let state = FacilityState::commission(
            &params.layout,
            params.reservoir_capacity,
            params.reservoir_start,
        );
        Self {
            params,
            store: FacilityStore::new(state),
            scheduler: FacilityScheduler::new(),
            alerts: AlertQueue::new(),
            rain: RainCycle::new(),
            reservoir: ReservoirIntegrator::new(),
            telemetry: TelemetryGenerator::new(),
            pointer: PointerController::new(),
            random,
            lifecycle: Lifecycle::Created,
        }
    }

    /// Arm the rain cycle, the reservoir tick and the telemetry tick.
    ///
    /// Calling it again while running does nothing; after
    /// [`shutdown`](Self::shutdown) it cannot be restarted.
    pub fn start(&mut self) {
        if self.lifecycle != Lifecycle::Created {
            return;
        }
        self.lifecycle = Lifecycle::Running;
        let Self {
            store,
            scheduler,
            alerts,
            random,
            rain,
            reservoir,
            telemetry,
            ..
        } = self;
        let mut facility = Facility {
            store,
            scheduler,
            alerts,
            random,
        };
        rain.arm(&mut facility);
        reservoir.arm(&mut facility);
        telemetry.arm(&mut facility);
        tracing::info!(at = %self.scheduler.now(), "facility engine started");
    }

    /// Cancel every timer and drop any drag session. Idempotent.
    pub fn shutdown(&mut self) {
        if self.lifecycle == Lifecycle::Stopped {
            return;
        }
        self.lifecycle = Lifecycle::Stopped;
        self.rain.cancel(&mut self.scheduler);
        self.reservoir.cancel(&mut self.scheduler);
        self.telemetry.cancel(&mut self.scheduler);
        self.alerts.forget_timers();
        let dropped = self.scheduler.cancel_all();
        self.pointer.cancel();
        tracing::info!(dropped, "facility engine stopped");
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lifecycle == Lifecycle::Running
    }

    /// The current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<FacilityState> {
        self.store.snapshot()
    }

    #[must_use]
    pub fn now(&self) -> SimTime {
        self.scheduler.now()
    }

    #[must_use]
    pub fn rain_phase(&self) -> RainPhase {
        self.rain.phase()
    }

    #[must_use]
    pub fn pointer(&self) -> &PointerController {
        &self.pointer
    }

    /// When the engine next needs to run, or `None` if nothing is pending.
    #[must_use]
    pub fn next_deadline(&self) -> Option<SimTime> {
        if self.lifecycle == Lifecycle::Stopped {
            return None;
        }
        self.scheduler.next_deadline()
    }

    /// Fire every timer due at or before `to`, in deadline order, then move
    /// the clock to `to`. Returns how many timers fired.
    pub fn advance_to(&mut self, to: SimTime) -> usize {
        if self.lifecycle == Lifecycle::Stopped {
            return 0;
        }
        let mut fired = 0;
        while let Some((id, task)) = self.scheduler.pop_due(to) {
            self.dispatch(id, task);
            fired += 1;
        }
        self.scheduler.advance_clock(to);
        fired
    }

    /// [`advance_to`](Self::advance_to) relative to the current time.
    pub fn advance_by(&mut self, delta: Duration) -> usize {
        let to = self.scheduler.now() + delta;
        self.advance_to(to)
    }

    fn dispatch(&mut self, id: TimerId, task: FacilityTimer) {
        tracing::debug!(timer = %id, at = %self.scheduler.now(), ?task, "timer fired");
        let Self {
            store,
            scheduler,
            alerts,
            random,
            rain,
            reservoir,
            telemetry,
            ..
        } = self;
        let mut facility = Facility {
            store,
            scheduler,
            alerts,
            random,
        };
        match task {
            FacilityTimer::RainOnset => rain.on_onset_timer(&mut facility),
            FacilityTimer::RainEnd => rain.on_end_timer(&mut facility),
            FacilityTimer::ReservoirTick => {
                reservoir.on_tick(&mut facility);
            }
            FacilityTimer::TelemetryTick => {
                telemetry.on_tick(&mut facility);
            }
            FacilityTimer::ExpireAlert(alert) => {
                facility.alerts.expire(facility.store, alert);
            }
            FacilityTimer::DeferredAlert { message, severity } => {
                facility
                    .alerts
                    .fire_deferred(facility.store, facility.scheduler, id, message, severity);
            }
        }
    }

    fn raise(&mut self, message: &str, severity: Severity) {
        self.alerts
            .raise(&mut self.store, &mut self.scheduler, message, severity);
    }

    /// Flip a device. Starting irrigation while rain is detected is refused
    /// with an error alert and no state change.
    pub fn toggle_device(&mut self, kind: DeviceKind) -> ToggleOutcome {
        let outcome = self.store.toggle_device(kind);
        match outcome {
            ToggleOutcome::Refused { kind } => {
                tracing::warn!(%kind, "irrigation start refused, rain active");
                self.raise(RAIN_BLOCKS_IRRIGATION, Severity::Error);
            }
            ToggleOutcome::Switched {
                kind: DeviceKind::Irrigation,
                on: true,
            } => self.raise(IRRIGATION_STARTED, Severity::Success),
            ToggleOutcome::Switched {
                kind: DeviceKind::Irrigation,
                on: false,
            } => self.raise(IRRIGATION_STOPPED, Severity::Info),
            ToggleOutcome::Switched { kind, on } => {
                tracing::debug!(%kind, on, "device toggled");
            }
        }
        outcome
    }

    pub fn set_position(&mut self, node: NodeId, position: Point) {
        self.store.set_position(node, position);
    }

    pub fn apply_telemetry(&mut self, patch: TelemetryPatch) {
        self.store.apply_telemetry(patch);
    }

    /// Force the rain flag, with the same coupling and alerts as the cycle.
    /// The cycle's own schedule is left alone.
    pub fn inject_rain(&mut self, detected: bool) {
        tracing::info!(detected, "rain injected");
        let mut facility = Facility {
            store: &mut self.store,
            scheduler: &mut self.scheduler,
            alerts: &mut self.alerts,
            random: &mut self.random,
        };
        if detected {
            self.rain.apply_onset(&mut facility);
        } else {
            self.rain.apply_end(&mut facility);
        }
    }

    /// Pointer pressed over `node`.
    pub fn begin_drag(&mut self, node: NodeId, pointer: Point, button: PointerButton) -> PointerDown {
        let position = self.store.state().position(node);
        self.pointer.pointer_down(node, pointer, position, button)
    }

    /// Pointer moved. Returns the dragged node's new position, if dragging.
    pub fn update_drag(&mut self, pointer: Point) -> Option<Point> {
        let (node, position) = self.pointer.pointer_move(pointer)?;
        self.store.set_position(node, position);
        Some(position)
    }

    /// Pointer released over the dragged node. A click opens the node's
    /// detail view when it has one.
    pub fn end_drag(&mut self) -> Release {
        let release = self.pointer.pointer_up();
        if let Release::Clicked { node } = release {
            if node.has_detail() {
                self.store.open_detail(node);
            }
        }
        release
    }

    /// Pointer released anywhere. Ends the drag without a click.
    pub fn release_pointer(&mut self) -> Release {
        self.pointer.release_anywhere()
    }

    /// Returns `false` if no detail view was open.
    pub fn close_detail(&mut self) -> bool {
        self.store.close_detail()
    }

    /// Restore the startup switches, clear rain and alerts, refill the
    /// reservoir, then confirm with a single info alert.
    pub fn reset(&mut self) {
        self.alerts.clear(&mut self.store, &mut self.scheduler);
        let now = self.scheduler.now();
        self.store.reset(self.params.reservoir_start, now);
        self.rain.reset_latches();
        self.raise(SYSTEM_RESET, Severity::Info);
        tracing::info!(at = %now, "facility reset");
    }
}

#[cfg(test)]
mod tests {
    use aqrobloom_domain::alert::Alert;

    use super::*;
    use crate::alert_queue::{ALERT_TTL, IRRIGATION_AUTO_STOPPED, RAIN_DETECTED, RAIN_STOPPED};
    use crate::ports::ScriptedRandom;

    fn engine(samples: impl IntoIterator<Item = f64>) -> FacilityEngine<ScriptedRandom> {
        FacilityEngine::new(FacilityParams::default(), ScriptedRandom::new(samples))
    }

    fn messages(engine: &FacilityEngine<ScriptedRandom>) -> Vec<String> {
        engine
            .snapshot()
            .alerts
            .iter()
            .map(|alert| alert.message.clone())
            .collect()
    }

    fn only_alert(engine: &FacilityEngine<ScriptedRandom>) -> Alert {
        let snapshot = engine.snapshot();
        assert_eq!(snapshot.alerts.len(), 1, "{:?}", snapshot.alerts);
        snapshot.alerts[0].clone()
    }

    #[test]
    fn should_keep_irrigation_off_and_raise_one_error_when_raining() {
        let mut engine = engine([]);
        engine.inject_rain(true);
        engine.advance_by(Duration::from_millis(4_000));
        let before = engine.snapshot();

        let outcome = engine.toggle_device(DeviceKind::Irrigation);

        let after = engine.snapshot();
        assert_eq!(
            outcome,
            ToggleOutcome::Refused {
                kind: DeviceKind::Irrigation
            }
        );
        assert!(!after.irrigation_on());
        let alert = only_alert(&engine);
        assert_eq!(alert.message, RAIN_BLOCKS_IRRIGATION);
        assert_eq!(alert.severity, Severity::Error);
        assert_eq!(after.devices, before.devices);
        assert_eq!(after.reservoir, before.reservoir);
    }

    #[test]
    fn should_announce_irrigation_switches() {
        let mut engine = engine([]);

        engine.toggle_device(DeviceKind::Irrigation);
        engine.toggle_device(DeviceKind::Irrigation);

        assert_eq!(messages(&engine), vec![IRRIGATION_STARTED, IRRIGATION_STOPPED]);
        let severities: Vec<_> = engine.snapshot().alerts.iter().map(|a| a.severity).collect();
        assert_eq!(severities, vec![Severity::Success, Severity::Info]);
    }

    #[test]
    fn should_toggle_other_devices_silently() {
        let mut engine = engine([]);

        let outcome = engine.toggle_device(DeviceKind::Solar);

        assert_eq!(
            outcome,
            ToggleOutcome::Switched {
                kind: DeviceKind::Solar,
                on: false
            }
        );
        assert!(engine.snapshot().alerts.is_empty());
    }

    #[test]
    fn should_stop_irrigation_and_fill_reservoir_when_rain_is_injected() {
        let mut engine = engine([0.5]);
        engine.toggle_device(DeviceKind::Irrigation);
        engine.advance_by(ALERT_TTL);
        engine.start();
        let start_volume = engine.snapshot().reservoir.current();

        engine.inject_rain(true);

        let snapshot = engine.snapshot();
        assert!(!snapshot.irrigation_on());
        assert!(snapshot.rain_detected());
        assert_eq!(messages(&engine), vec![RAIN_DETECTED]);
        assert_eq!(only_alert(&engine).severity, Severity::Error);

        engine.advance_by(Duration::from_millis(1_999));
        assert_eq!(messages(&engine), vec![RAIN_DETECTED]);

        engine.advance_by(Duration::from_millis(1));
        assert_eq!(messages(&engine), vec![RAIN_DETECTED, IRRIGATION_AUTO_STOPPED]);
        let notice = engine.snapshot().alerts[1].clone();
        assert_eq!(notice.severity, Severity::Info);
        assert!(engine.snapshot().reservoir.current() > start_volume);
    }

    #[test]
    fn should_expire_alert_by_ttl() {
        let mut engine = engine([]);
        engine.advance_to(SimTime::from_millis(500));
        engine.toggle_device(DeviceKind::Irrigation);

        engine.advance_to(SimTime::from_millis(4_499));
        assert_eq!(engine.snapshot().alerts.len(), 1);

        engine.advance_to(SimTime::from_millis(4_501));
        assert!(engine.snapshot().alerts.is_empty());
    }

    #[test]
    fn should_clamp_baseline_tick_at_zero() {
        let params = FacilityParams {
            reservoir_start: 0,
            ..FacilityParams::default()
        };
        let mut engine = FacilityEngine::new(params, ScriptedRandom::default());
        engine.start();

        engine.advance_to(SimTime::from_millis(2_000));

        let reservoir = &engine.snapshot().reservoir;
        assert_eq!(reservoir.current(), 0);
        assert_eq!(reservoir.last_update(), SimTime::from_millis(2_000));
    }

    #[test]
    fn should_run_full_rain_cycle() {
        // onset draw 0.0 -> 15 s dry spell; everything else reads 0.0 too
        let mut engine = engine([0.0]);
        engine.start();

        engine.advance_to(SimTime::from_millis(14_999));
        assert!(!engine.snapshot().rain_detected());
        assert_eq!(engine.rain_phase(), RainPhase::Dry);

        engine.advance_to(SimTime::from_millis(15_000));
        assert!(engine.snapshot().rain_detected());
        assert_eq!(engine.rain_phase(), RainPhase::Raining);

        engine.advance_to(SimTime::from_millis(25_000));
        assert!(!engine.snapshot().rain_detected());
        assert_eq!(engine.rain_phase(), RainPhase::Dry);
        assert_eq!(messages(&engine), vec![RAIN_STOPPED]);

        engine.advance_to(SimTime::from_millis(40_000));
        assert!(engine.snapshot().rain_detected());
    }

    #[test]
    fn should_never_irrigate_while_raining_over_many_cycles() {
        let samples = (0..500).map(|i| f64::from(i % 10) / 10.0);
        let mut engine = engine(samples);
        engine.start();

        for step in 0..600_u64 {
            if step % 7 == 0 {
                engine.toggle_device(DeviceKind::Irrigation);
            }
            engine.advance_to(SimTime::from_millis(step * 500));
            let snapshot = engine.snapshot();
            assert!(!(snapshot.irrigation_on() && snapshot.rain_detected()));
            assert!(snapshot.reservoir.current() <= snapshot.reservoir.capacity());
        }
    }

    #[test]
    fn should_open_detail_on_click_but_not_after_drag() {
        let mut engine = engine([]);
        let reservoir = engine.snapshot().reservoir.position;

        engine.begin_drag(NodeId::Reservoir, reservoir, PointerButton::Primary);
        engine.update_drag(reservoir + Point::new(30.0, 0.0));
        assert!(matches!(engine.end_drag(), Release::Dragged { .. }));
        assert_eq!(engine.snapshot().detail, None);
        assert_eq!(
            engine.snapshot().reservoir.position,
            reservoir + Point::new(30.0, 0.0)
        );

        engine.begin_drag(NodeId::Reservoir, reservoir, PointerButton::Primary);
        assert!(matches!(engine.end_drag(), Release::Clicked { .. }));
        assert_eq!(engine.snapshot().detail, Some(NodeId::Reservoir));
    }

    #[test]
    fn should_not_open_detail_for_hub_click() {
        let mut engine = engine([]);
        let hub = engine.snapshot().hub.position;

        engine.begin_drag(NodeId::Hub, hub, PointerButton::Primary);
        engine.end_drag();

        assert_eq!(engine.snapshot().detail, None);
    }

    #[test]
    fn should_not_open_detail_on_global_release() {
        let mut engine = engine([]);
        let solar = NodeId::Device(DeviceKind::Solar);
        let position = engine.snapshot().position(solar);

        engine.begin_drag(solar, position, PointerButton::Primary);
        engine.release_pointer();

        assert_eq!(engine.snapshot().detail, None);
        assert!(!engine.pointer().global_release_armed());
    }

    #[test]
    fn should_close_detail() {
        let mut engine = engine([]);
        let node = NodeId::Device(DeviceKind::Generator);
        let position = engine.snapshot().position(node);
        engine.begin_drag(node, position, PointerButton::Primary);
        engine.end_drag();

        assert!(engine.close_detail());
        assert_eq!(engine.snapshot().detail, None);
    }

    #[test]
    fn should_restore_startup_state_on_reset() {
        let mut engine = engine([0.3]);
        engine.start();
        engine.toggle_device(DeviceKind::Irrigation);
        engine.toggle_device(DeviceKind::Generator);
        engine.inject_rain(true);
        engine.advance_to(SimTime::from_millis(8_000));

        engine.reset();

        let snapshot = engine.snapshot();
        assert!(snapshot.devices.generator.on);
        assert!(snapshot.devices.solar.on);
        assert!(!snapshot.devices.irrigation.on);
        assert!(!snapshot.rain_detected());
        assert_eq!(snapshot.reservoir.current(), DEFAULT_START_VOLUME);
        let alert = only_alert(&engine);
        assert_eq!(alert.message, SYSTEM_RESET);
        assert_eq!(alert.severity, Severity::Info);
    }

    #[test]
    fn should_drop_pending_auto_stop_notice_on_reset() {
        let mut engine = engine([]);
        engine.toggle_device(DeviceKind::Irrigation);
        engine.inject_rain(true);

        engine.reset();
        engine.advance_by(Duration::from_millis(2_000));

        assert_eq!(messages(&engine), vec![SYSTEM_RESET]);
    }

    #[test]
    fn should_cancel_all_timers_on_shutdown() {
        let mut engine = engine([]);
        engine.start();
        engine.toggle_device(DeviceKind::Irrigation);
        let solar = NodeId::Device(DeviceKind::Solar);
        engine.begin_drag(solar, Point::default(), PointerButton::Primary);

        engine.shutdown();
        engine.shutdown();

        assert!(!engine.is_running());
        assert_eq!(engine.next_deadline(), None);
        let before = engine.snapshot();
        assert_eq!(engine.advance_by(Duration::from_secs(60)), 0);
        assert!(Arc::ptr_eq(&before, &engine.snapshot()));
        assert!(!engine.pointer().global_release_armed());
    }

    #[test]
    fn should_ignore_repeated_start() {
        let mut engine = engine([]);
        engine.start();
        let deadline = engine.next_deadline();

        engine.start();

        assert_eq!(engine.next_deadline(), deadline);
        assert_eq!(engine.scheduler.len(), 3);
    }
}
