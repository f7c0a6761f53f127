//! Port definitions — traits the engine consumes from its environment.
//!
//! The engine needs only two things from the outside world: a monotonic
//! clock (provided by the [`Scheduler`](crate::scheduler::Scheduler) and,
//! at runtime, the tokio timer) and a source of uniform random numbers.

pub mod random;

pub use random::{RandomSource, ScriptedRandom};
