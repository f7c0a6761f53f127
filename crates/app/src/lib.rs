//! # aqrobloom-app
//!
//! Application layer — the facility simulation and automation engine.
//!
//! ## Responsibilities
//! - Own the single [`FacilityStore`](store::FacilityStore); every mutation
//!   goes through a named store operation and produces a fresh snapshot
//! - Drive the interacting timers on a virtual clock
//!   ([`Scheduler`](scheduler::Scheduler)):
//!   - `RainCycle` — Dry/Raining automaton that shuts irrigation off
//!   - `ReservoirIntegrator` — 2 s volume update
//!   - `TelemetryGenerator` — 3 s sensor readings
//! - Raise and expire alerts ([`AlertQueue`](alert_queue::AlertQueue))
//! - Disambiguate drag from click ([`PointerController`](controllers::pointer::PointerController))
//! - Define the **random-source port** the engine samples from
//! - Host the engine on a tokio task and expose a cloneable
//!   [`FacilityHandle`](runtime::FacilityHandle) plus a snapshot bus
//!
//! ## Dependency rule
//! Depends on `aqrobloom-domain` only (plus `tokio` for the runtime task and
//! channels, `rand` for the production random source).
//! Never imports adapter crates.

pub mod alert_queue;
pub mod controllers;
pub mod engine;
pub mod event_bus;
pub mod ports;
pub mod runtime;
pub mod scheduler;
pub mod store;
