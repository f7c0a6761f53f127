//! Tokio host for the engine.
//!
//! [`spawn`] moves a [`FacilityEngine`] into a single task. The task owns
//! the engine outright, so timers and commands interleave on one logical
//! thread. Virtual time is the engine's clock at spawn plus the tokio time
//! elapsed since.

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::time::Instant;

use aqrobloom_domain::device::DeviceKind;
use aqrobloom_domain::error::FacilityError;
use aqrobloom_domain::facility::FacilityState;
use aqrobloom_domain::geometry::Point;
use aqrobloom_domain::id::NodeId;
use aqrobloom_domain::time::SimTime;

use crate::controllers::{PointerButton, PointerDown, Release};
use crate::engine::FacilityEngine;
use crate::event_bus::SnapshotBus;
use crate::ports::RandomSource;
use crate::store::{TelemetryPatch, ToggleOutcome};

const COMMAND_BUFFER: usize = 64;

type Reply<T> = oneshot::Sender<T>;

/// Requests served by the engine task.
#[derive(Debug)]
enum Command {
    Snapshot(Reply<Arc<FacilityState>>),
    ToggleDevice(DeviceKind, Reply<ToggleOutcome>),
    SetPosition(NodeId, Point, Reply<()>),
    ApplyTelemetry(TelemetryPatch, Reply<()>),
    InjectRain(bool, Reply<()>),
    BeginDrag(NodeId, Point, PointerButton, Reply<PointerDown>),
    UpdateDrag(Point, Reply<Option<Point>>),
    EndDrag(Reply<Release>),
    ReleasePointer(Reply<Release>),
    CloseDetail(Reply<bool>),
    Reset(Reply<()>),
    Shutdown(Reply<()>),
}

/// Cloneable handle to a running engine.
///
/// Every call fails with [`FacilityError::Unavailable`] once the engine
/// task has stopped.
#[derive(Debug, Clone)]
pub struct FacilityHandle {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<Arc<FacilityState>>,
}

/// Start `engine` on a new tokio task and return a handle to it.
///
/// The engine's timers are armed here. The task ends on
/// [`FacilityHandle::shutdown`] or once every handle is dropped; either
/// way all pending timers are cancelled.
pub fn spawn<R>(engine: FacilityEngine<R>) -> FacilityHandle
where
    R: RandomSource + Send + 'static,
{
    let (commands, rx) = mpsc::channel(COMMAND_BUFFER);
    let bus = SnapshotBus::new(engine.snapshot());
    let snapshots = bus.subscribe();
    tokio::spawn(run(engine, rx, bus));
    FacilityHandle {
        commands,
        snapshots,
    }
}

struct Clock {
    origin: Instant,
    base: SimTime,
}

impl Clock {
    fn now(&self) -> SimTime {
        self.base + self.origin.elapsed()
    }

    fn instant(&self, at: SimTime) -> Instant {
        self.origin + at.saturating_duration_since(self.base)
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

async fn run<R: RandomSource>(
    mut engine: FacilityEngine<R>,
    mut commands: mpsc::Receiver<Command>,
    bus: SnapshotBus,
) {
    let clock = Clock {
        origin: Instant::now(),
        base: engine.now(),
    };
    engine.start();
    tracing::debug!("facility task running");

    loop {
        let wake = engine.next_deadline().map(|at| clock.instant(at));
        tokio::select! {
            command = commands.recv() => {
                let Some(command) = command else {
                    tracing::debug!("all facility handles dropped");
                    break;
                };
                if matches!(command, Command::Shutdown(_)) {
                    commands.close();
                }
                engine.advance_to(clock.now());
                let stop = serve(&mut engine, command);
                bus.publish(engine.snapshot());
                if stop {
                    break;
                }
            }
            () = sleep_until(wake) => {
                engine.advance_to(clock.now());
                bus.publish(engine.snapshot());
            }
        }
    }

    engine.shutdown();
}

/// Apply one command. Returns `true` when the task should stop.
fn serve<R: RandomSource>(engine: &mut FacilityEngine<R>, command: Command) -> bool {
    // a dropped reply receiver only means the caller stopped waiting
    match command {
        Command::Snapshot(reply) => {
            let _ = reply.send(engine.snapshot());
        }
        Command::ToggleDevice(kind, reply) => {
            let _ = reply.send(engine.toggle_device(kind));
        }
        Command::SetPosition(node, position, reply) => {
            engine.set_position(node, position);
            let _ = reply.send(());
        }
        Command::ApplyTelemetry(patch, reply) => {
            engine.apply_telemetry(patch);
            let _ = reply.send(());
        }
        Command::InjectRain(detected, reply) => {
            engine.inject_rain(detected);
            let _ = reply.send(());
        }
        Command::BeginDrag(node, pointer, button, reply) => {
            let _ = reply.send(engine.begin_drag(node, pointer, button));
        }
        Command::UpdateDrag(pointer, reply) => {
            let _ = reply.send(engine.update_drag(pointer));
        }
        Command::EndDrag(reply) => {
            let _ = reply.send(engine.end_drag());
        }
        Command::ReleasePointer(reply) => {
            let _ = reply.send(engine.release_pointer());
        }
        Command::CloseDetail(reply) => {
            let _ = reply.send(engine.close_detail());
        }
        Command::Reset(reply) => {
            engine.reset();
            let _ = reply.send(());
        }
        Command::Shutdown(reply) => {
            engine.shutdown();
            let _ = reply.send(());
            return true;
        }
    }
    false
}

impl FacilityHandle {
    async fn request<T>(
        &self,
        command: impl FnOnce(Reply<T>) -> Command,
    ) -> Result<T, FacilityError> {
        let (reply, response) = oneshot::channel();
        self.commands
            .send(command(reply))
            .await
            .map_err(|_| FacilityError::Unavailable)?;
        response.await.map_err(|_| FacilityError::Unavailable)
    }

    /// Receiver of every published snapshot.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Arc<FacilityState>> {
        self.snapshots.clone()
    }

    /// Whether the engine task is still accepting commands.
    #[must_use]
    pub fn is_running(&self) -> bool {
        !self.commands.is_closed()
    }

    /// The current snapshot, with every timer due by now applied.
    ///
    /// # Errors
    ///
    /// Returns [`FacilityError::Unavailable`] if the engine has stopped.
    pub async fn snapshot(&self) -> Result<Arc<FacilityState>, FacilityError> {
        self.request(Command::Snapshot).await
    }

    /// # Errors
    ///
    /// Returns [`FacilityError::Unavailable`] if the engine has stopped.
    pub async fn toggle_device(&self, kind: DeviceKind) -> Result<ToggleOutcome, FacilityError> {
        self.request(|reply| Command::ToggleDevice(kind, reply))
            .await
    }

    /// # Errors
    ///
    /// Returns [`FacilityError::Unavailable`] if the engine has stopped.
    pub async fn set_position(&self, node: NodeId, position: Point) -> Result<(), FacilityError> {
        self.request(|reply| Command::SetPosition(node, position, reply))
            .await
    }

    /// # Errors
    ///
    /// Returns [`FacilityError::Unavailable`] if the engine has stopped.
    pub async fn apply_telemetry(&self, patch: TelemetryPatch) -> Result<(), FacilityError> {
        self.request(|reply| Command::ApplyTelemetry(patch, reply))
            .await
    }

    /// # Errors
    ///
    /// Returns [`FacilityError::Unavailable`] if the engine has stopped.
    pub async fn inject_rain(&self, detected: bool) -> Result<(), FacilityError> {
        self.request(|reply| Command::InjectRain(detected, reply))
            .await
    }

    /// # Errors
    ///
    /// Returns [`FacilityError::Unavailable`] if the engine has stopped.
    pub async fn begin_drag(
        &self,
        node: NodeId,
        pointer: Point,
        button: PointerButton,
    ) -> Result<PointerDown, FacilityError> {
        self.request(|reply| Command::BeginDrag(node, pointer, button, reply))
            .await
    }

    /// # Errors
    ///
    /// Returns [`FacilityError::Unavailable`] if the engine has stopped.
    pub async fn update_drag(&self, pointer: Point) -> Result<Option<Point>, FacilityError> {
        self.request(|reply| Command::UpdateDrag(pointer, reply))
            .await
    }

    /// # Errors
    ///
    /// Returns [`FacilityError::Unavailable`] if the engine has stopped.
    pub async fn end_drag(&self) -> Result<Release, FacilityError> {
        self.request(Command::EndDrag).await
    }

    /// # Errors
    ///
    /// Returns [`FacilityError::Unavailable`] if the engine has stopped.
    pub async fn release_pointer(&self) -> Result<Release, FacilityError> {
        self.request(Command::ReleasePointer).await
    }

    /// # Errors
    ///
    /// Returns [`FacilityError::Unavailable`] if the engine has stopped.
    pub async fn close_detail(&self) -> Result<bool, FacilityError> {
        self.request(Command::CloseDetail).await
    }

    /// # Errors
    ///
    /// Returns [`FacilityError::Unavailable`] if the engine has stopped.
    pub async fn reset(&self) -> Result<(), FacilityError> {
        self.request(Command::Reset).await
    }

    /// Stop the engine and cancel all its timers.
    ///
    /// # Errors
    ///
    /// Returns [`FacilityError::Unavailable`] if it was already stopped.
    pub async fn shutdown(&self) -> Result<(), FacilityError> {
        self.request(Command::Shutdown).await
    }
}
