//! Random-source port.

use std::collections::VecDeque;

use rand::Rng;
use rand::rngs::StdRng;

/// A source of uniform samples in `[0, 1)`.
///
/// All simulation randomness is derived from [`next_unit`](Self::next_unit),
/// so a scripted implementation makes every timer delay and reading
/// reproducible.
pub trait RandomSource {
    /// Draw a uniform sample in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform float in `[low, high)`.
    fn uniform_f64(&mut self, low: f64, high: f64) -> f64 {
        low + self.next_unit() * (high - low)
    }

    /// Uniform integer in `[low, high)`: `low + floor(unit * (high - low))`.
    fn uniform_int(&mut self, low: i64, high: i64) -> i64 {
        #[allow(clippy::cast_precision_loss)]
        let span = (high - low) as f64;
        #[allow(clippy::cast_possible_truncation)]
        let step = (self.next_unit() * span).floor() as i64;
        low + step.min(high - low - 1).max(0)
    }
}

impl RandomSource for StdRng {
    fn next_unit(&mut self) -> f64 {
        self.gen_range(0.0..1.0)
    }
}

/// Deterministic source that replays a fixed list of samples.
///
/// Once the script is exhausted it keeps returning the last sample
/// (or `0.0` for an empty script).
#[derive(Debug, Clone, Default)]
pub struct ScriptedRandom {
    samples: VecDeque<f64>,
    last: f64,
}

impl ScriptedRandom {
    /// Replay `samples` in order. Each sample is clamped into `[0, 1)`.
    #[must_use]
    pub fn new(samples: impl IntoIterator<Item = f64>) -> Self {
        Self {
            samples: samples
                .into_iter()
                .map(|s| s.clamp(0.0, 1.0 - f64::EPSILON))
                .collect(),
            last: 0.0,
        }
    }

    /// A source that always returns `value`.
    #[must_use]
    pub fn constant(value: f64) -> Self {
        let mut source = Self::new([]);
        source.last = value.clamp(0.0, 1.0 - f64::EPSILON);
        source
    }
}

impl RandomSource for ScriptedRandom {
    fn next_unit(&mut self) -> f64 {
        if let Some(sample) = self.samples.pop_front() {
            self.last = sample;
        }
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn should_replay_samples_in_order() {
        let mut source = ScriptedRandom::new([0.1, 0.2]);
        assert!((source.next_unit() - 0.1).abs() < f64::EPSILON);
        assert!((source.next_unit() - 0.2).abs() < f64::EPSILON);
    }

    #[test]
    fn should_repeat_last_sample_when_exhausted() {
        let mut source = ScriptedRandom::new([0.7]);
        source.next_unit();
        assert!((source.next_unit() - 0.7).abs() < f64::EPSILON);
    }

    #[test]
    fn should_map_unit_sample_onto_integer_range() {
        let mut source = ScriptedRandom::new([0.0, 0.5, 0.999_999]);
        assert_eq!(source.uniform_int(100, 500), 100);
        assert_eq!(source.uniform_int(100, 500), 300);
        assert_eq!(source.uniform_int(100, 500), 499);
    }

    #[test]
    fn should_keep_integer_below_exclusive_bound() {
        let mut source = ScriptedRandom::constant(1.0);
        assert_eq!(source.uniform_int(20, 50), 49);
    }

    #[test]
    fn should_map_unit_sample_onto_float_range() {
        let mut source = ScriptedRandom::new([0.5]);
        assert!((source.uniform_f64(0.0, 0.5) - 0.25).abs() < 1e-12);
    }

    #[test]
    fn should_sample_std_rng_within_unit_interval() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1_000 {
            let sample = rng.next_unit();
            assert!((0.0..1.0).contains(&sample));
        }
    }
}
