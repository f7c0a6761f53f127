//! # aqrobloom-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve a **JSON API** over the running facility engine
//!   (`/api/facility`, `/api/devices/{kind}/toggle`, `/api/pointer/*`, …)
//! - Stream snapshot changes as **Server-Sent Events**
//!   (`/api/facility/stream`)
//! - Map HTTP requests into [`FacilityHandle`](aqrobloom_app::runtime::FacilityHandle)
//!   calls (driving adapter) and their results into HTTP responses
//!
//! ## Dependency rule
//! Depends on `aqrobloom-app` (for the engine handle and outcome types) and
//! `aqrobloom-domain` (for the snapshot types). Never leaks axum types into
//! the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
pub mod view;
