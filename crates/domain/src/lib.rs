//! # aqrobloom-domain
//!
//! Pure domain model for the aqrobloom farm facility dashboard.
//!
//! ## Responsibilities
//! - Foundational types: node and alert identifiers, error conventions,
//!   simulation time, canvas geometry
//! - Define **Devices** (irrigation, generator, solar array, rain sensor)
//!   and their kind-specific readings
//! - Define the **Reservoir** with its clamped volume invariant
//! - Define **Alerts** (transient, severity-tagged notifications)
//! - Define the **FacilityState** snapshot handed to the presentation layer
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or async runtimes.
//! Timers, randomness and IO live behind the `app` crate.

pub mod error;
pub mod id;
pub mod time;

pub mod alert;
pub mod device;
pub mod facility;
pub mod geometry;
pub mod reservoir;
