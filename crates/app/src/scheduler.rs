//! Virtual-time scheduler for one-shot timers.
//!
//! The scheduler never sleeps. It only orders pending tasks by deadline and
//! hands out the ones that are due; whoever drives it (the engine in tests,
//! the tokio task at runtime) decides how time moves.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;

use aqrobloom_domain::alert::Severity;
use aqrobloom_domain::id::AlertId;
use aqrobloom_domain::time::SimTime;

/// Handle to a pending timer, used for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TimerId(u64);

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer-{}", self.0)
    }
}

/// Pending one-shot timers ordered by deadline.
///
/// Timers sharing a deadline fire in the order they were scheduled.
#[derive(Debug)]
pub struct Scheduler<T> {
    now: SimTime,
    next_id: u64,
    queue: BTreeMap<(SimTime, TimerId), T>,
    deadlines: HashMap<TimerId, SimTime>,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Scheduler<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            now: SimTime::ZERO,
            next_id: 0,
            queue: BTreeMap::new(),
            deadlines: HashMap::new(),
        }
    }

    /// Current virtual time.
    #[must_use]
    pub fn now(&self) -> SimTime {
        self.now
    }

    /// Number of pending timers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.deadlines.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.deadlines.is_empty()
    }

    /// Arm `task` to fire `delay` after the current time.
    pub fn schedule_after(&mut self, delay: Duration, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        let deadline = self.now + delay;
        self.queue.insert((deadline, id), task);
        self.deadlines.insert(id, deadline);
        id
    }

    /// Cancel a pending timer. Returns `false` if it already fired or was
    /// cancelled before.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        match self.deadlines.remove(&id) {
            Some(deadline) => self.queue.remove(&(deadline, id)).is_some(),
            None => false,
        }
    }

    /// Cancel every pending timer, returning how many were dropped.
    pub fn cancel_all(&mut self) -> usize {
        let dropped = self.deadlines.len();
        self.queue.clear();
        self.deadlines.clear();
        dropped
    }

    /// Whether `id` is still pending.
    #[must_use]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.deadlines.contains_key(&id)
    }

    /// Deadline of the earliest pending timer.
    #[must_use]
    pub fn next_deadline(&self) -> Option<SimTime> {
        self.queue.keys().next().map(|(deadline, _)| *deadline)
    }

    /// Remove and return the earliest timer due at or before `until`,
    /// moving the clock forward to its deadline.
    pub fn pop_due(&mut self, until: SimTime) -> Option<(TimerId, T)> {
        let entry = self.queue.first_entry()?;
        let (deadline, id) = *entry.key();
        if deadline > until {
            return None;
        }
        let task = entry.remove();
        self.deadlines.remove(&id);
        if deadline > self.now {
            self.now = deadline;
        }
        Some((id, task))
    }

    /// Move the clock forward to `to`. Never moves backwards.
    pub fn advance_clock(&mut self, to: SimTime) {
        if to > self.now {
            self.now = to;
        }
    }
}

/// Everything the facility engine schedules.
#[derive(Debug, Clone, PartialEq)]
pub enum FacilityTimer {
    /// Dry → Raining transition.
    RainOnset,
    /// Raining → Dry transition.
    RainEnd,
    /// Reservoir integrator period.
    ReservoirTick,
    /// Telemetry generator period.
    TelemetryTick,
    /// Remove an alert once its display time is over.
    ExpireAlert(AlertId),
    /// Raise an alert later (e.g. "irrigation auto-stopped").
    DeferredAlert { message: String, severity: Severity },
}

pub type FacilityScheduler = Scheduler<FacilityTimer>;
