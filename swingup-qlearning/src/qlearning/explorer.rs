//! Exploration strategy of Q-learning.
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Epsilon-greedy action selection with a fixed epsilon.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct EpsilonGreedy {
    /// Probability of a uniformly random action.
    pub eps: f64,
}

impl EpsilonGreedy {
    /// Constructs epsilon-greedy explorer.
    pub fn new(eps: f64) -> Self {
        Self { eps }
    }

    /// Takes an action index given the action values of a state.
    ///
    /// Greedy choices resolve ties to the lowest index.
    pub fn action(&self, q: &[f64], rng: &mut impl Rng) -> usize {
        if rng.gen::<f64>() < self.eps {
            rng.gen_range(0..q.len())
        } else {
            greedy(q)
        }
    }
}

/// The index of the largest value, the lowest among ties.
pub(super) fn greedy(q: &[f64]) -> usize {
    let mut best = 0;
    for (i, &v) in q.iter().enumerate().skip(1) {
        if v > q[best] {
            best = i;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::SmallRng, SeedableRng};

    #[test]
    fn test_greedy_when_eps_is_zero() {
        let mut rng = SmallRng::seed_from_u64(0);
        let explorer = EpsilonGreedy::new(0.0);
        for _ in 0..100 {
            assert_eq!(explorer.action(&[0.0, 3.0, 3.0, 1.0], &mut rng), 1);
        }
    }

    #[test]
    fn test_random_when_eps_is_one() {
        let mut rng = SmallRng::seed_from_u64(0);
        let explorer = EpsilonGreedy::new(1.0);
        let mut counts = [0usize; 4];
        for _ in 0..1000 {
            counts[explorer.action(&[0.0, 3.0, 3.0, 1.0], &mut rng)] += 1;
        }
        assert!(counts.iter().all(|&c| c > 150), "{:?}", counts);
    }
}
