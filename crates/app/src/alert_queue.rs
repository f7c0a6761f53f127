//! Alert queue — appends alerts to the store and removes them after
//! [`ALERT_TTL`].
//!
//! The visible alerts live in the store snapshot; this type only hands out
//! ids and keeps track of the timers that will remove or raise them.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use aqrobloom_domain::alert::{Alert, Severity};
use aqrobloom_domain::id::AlertId;

use crate::scheduler::{FacilityScheduler, FacilityTimer, TimerId};
use crate::store::FacilityStore;

/// How long an alert stays visible.
pub const ALERT_TTL: Duration = Duration::from_millis(4_000);

pub const RAIN_BLOCKS_IRRIGATION: &str = "Rain active, cannot start irrigation.";
pub const IRRIGATION_STARTED: &str = "Irrigation system started.";
pub const IRRIGATION_STOPPED: &str = "Irrigation system stopped.";
pub const RAIN_DETECTED: &str = "Rain detected!";
pub const IRRIGATION_AUTO_STOPPED: &str = "Irrigation auto-stopped.";
pub const RAIN_STOPPED: &str = "Rain stopped, normal operation resumed.";
pub const SYSTEM_RESET: &str = "System reset.";

/// Id allocation and expiry bookkeeping for alerts.
#[derive(Debug)]
pub struct AlertQueue {
    next_id: AlertId,
    expiries: HashMap<AlertId, TimerId>,
    deferred: HashSet<TimerId>,
}

impl Default for AlertQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertQueue {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AlertId::new(1),
            expiries: HashMap::new(),
            deferred: HashSet::new(),
        }
    }

    /// Append an alert now and arm its removal [`ALERT_TTL`] later.
    pub fn raise(
        &mut self,
        store: &mut FacilityStore,
        scheduler: &mut FacilityScheduler,
        message: impl Into<String>,
        severity: Severity,
    ) -> AlertId {
        let id = self.next_id;
        self.next_id = id.next();
        let alert = Alert {
            id,
            message: message.into(),
            severity,
            raised_at: scheduler.now(),
        };
        tracing::info!(alert_id = %id, %severity, message = %alert.message, "alert raised");
        store.push_alert(alert);
        let timer = scheduler.schedule_after(ALERT_TTL, FacilityTimer::ExpireAlert(id));
        self.expiries.insert(id, timer);
        id
    }

    /// Raise an alert `delay` from now.
    pub fn defer(
        &mut self,
        scheduler: &mut FacilityScheduler,
        delay: Duration,
        message: impl Into<String>,
        severity: Severity,
    ) -> TimerId {
        let timer = scheduler.schedule_after(
            delay,
            FacilityTimer::DeferredAlert {
                message: message.into(),
                severity,
            },
        );
        self.deferred.insert(timer);
        timer
    }

    /// Handle a fired [`FacilityTimer::DeferredAlert`].
    pub fn fire_deferred(
        &mut self,
        store: &mut FacilityStore,
        scheduler: &mut FacilityScheduler,
        timer: TimerId,
        message: String,
        severity: Severity,
    ) -> Option<AlertId> {
        if !self.deferred.remove(&timer) {
            return None;
        }
        Some(self.raise(store, scheduler, message, severity))
    }

    /// Handle a fired [`FacilityTimer::ExpireAlert`]. Removal is by id only,
    /// so alerts may expire in any order.
    pub fn expire(&mut self, store: &mut FacilityStore, id: AlertId) -> bool {
        self.expiries.remove(&id);
        let removed = store.remove_alert(id);
        if removed {
            tracing::debug!(alert_id = %id, "alert expired");
        }
        removed
    }

    /// Drop every visible alert and cancel pending expiry and deferred timers.
    pub fn clear(&mut self, store: &mut FacilityStore, scheduler: &mut FacilityScheduler) {
        for (_, timer) in self.expiries.drain() {
            scheduler.cancel(timer);
        }
        for timer in self.deferred.drain() {
            scheduler.cancel(timer);
        }
        store.clear_alerts();
    }

    /// Number of alerts waiting to be raised.
    #[must_use]
    pub fn pending_deferred(&self) -> usize {
        self.deferred.len()
    }

    /// Forget all timer bookkeeping (the scheduler has been emptied).
    pub fn forget_timers(&mut self) {
        self.expiries.clear();
        self.deferred.clear();
    }
}
