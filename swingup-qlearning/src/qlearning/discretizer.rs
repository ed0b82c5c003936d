//! Discretization of continuous states.
use swingup_core::SwingupError;

/// Maps `v` to a bucket in `0..n`.
///
/// Bucket `0` takes everything below `min` and bucket `n - 1` everything from
/// `max` on. `[min, max)` is split evenly into the `n - 2` buckets in between.
pub fn digitize(v: f64, min: f64, max: f64, n: usize) -> usize {
    if v < min {
        return 0;
    }
    if v >= max {
        return n - 1;
    }
    let width = (max - min) / (n - 2) as f64;
    (1 + ((v - min) / width).floor() as usize).min(n - 2)
}

/// Maps state vectors to a single index of the Q-table.
#[derive(Debug, Clone, PartialEq)]
pub struct Discretizer {
    n_buckets: Vec<usize>,
    thresholds: Vec<[f64; 2]>,
    n_states: usize,
}

impl Discretizer {
    /// Constructs a discretizer.
    pub fn new(n_buckets: Vec<usize>, thresholds: Vec<[f64; 2]>) -> Result<Self, SwingupError> {
        if n_buckets.is_empty() {
            return Err(SwingupError::Configuration(
                "at least one state dimension is needed".to_string(),
            ));
        }
        if n_buckets.len() != thresholds.len() {
            return Err(SwingupError::Configuration(format!(
                "{} bucket counts, but {} thresholds",
                n_buckets.len(),
                thresholds.len()
            )));
        }
        for (i, (&n, &[min, max])) in n_buckets.iter().zip(thresholds.iter()).enumerate() {
            if n < 3 {
                return Err(SwingupError::Configuration(format!(
                    "dimension {} needs at least 3 buckets, but {}",
                    i, n
                )));
            }
            if !min.is_finite() || !max.is_finite() || min >= max {
                return Err(SwingupError::Configuration(format!(
                    "dimension {} has invalid thresholds [{}, {}]",
                    i, min, max
                )));
            }
        }
        let n_states = n_buckets
            .iter()
            .try_fold(1usize, |acc, &n| acc.checked_mul(n))
            .ok_or_else(|| SwingupError::Configuration("too many states".to_string()))?;

        Ok(Self {
            n_buckets,
            thresholds,
            n_states,
        })
    }

    /// Number of state dimensions.
    pub fn dim(&self) -> usize {
        self.n_buckets.len()
    }

    /// Number of distinct indices.
    pub fn n_states(&self) -> usize {
        self.n_states
    }

    /// Returns the index of a state, in `0..n_states()`.
    pub fn index(&self, s: &[f64]) -> Result<usize, SwingupError> {
        if s.len() != self.dim() {
            return Err(SwingupError::DimensionMismatch {
                expected: self.dim(),
                actual: s.len(),
            });
        }
        let index = s
            .iter()
            .zip(self.n_buckets.iter().zip(self.thresholds.iter()))
            .fold(0, |idx, (&v, (&n, &[min, max]))| {
                idx * n + digitize(v, min, max, n)
            });
        Ok(index)
    }
}
