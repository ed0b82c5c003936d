//! Configuration of Q-learning agent.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    f64::consts::PI,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use swingup_core::SwingupError;

/// Constructs [`QLearning`](super::QLearning).
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct QLearningConfig {
    /// Learning rate.
    pub alpha: f64,

    /// Discount factor.
    pub gamma: f64,

    /// Probability of a random action in training mode.
    pub epsilon: f64,

    /// Number of buckets of each state dimension, at least 3.
    pub n_buckets: Vec<usize>,

    /// `[min, max]` of each state dimension. Values outside fall into the
    /// first or the last bucket.
    pub thresholds: Vec<[f64; 2]>,

    /// The action catalog.
    pub actions: Vec<Vec<f64>>,

    /// Initial action value.
    pub init_q: f64,

    /// Seed of the random number generator.
    pub seed: u64,
}

impl Default for QLearningConfig {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            gamma: 0.99,
            epsilon: 0.1,
            n_buckets: vec![5, 9, 5, 9],
            thresholds: vec![[-2.0, 2.0], [-PI, PI], [-3.0, 3.0], [-10.0, 10.0]],
            actions: vec![vec![-10.0], vec![0.0], vec![10.0]],
            init_q: 0.0,
            seed: 42,
        }
    }
}

impl QLearningConfig {
    /// Sets the learning rate.
    pub fn alpha(mut self, v: f64) -> Self {
        self.alpha = v;
        self
    }

    /// Sets the discount factor.
    pub fn gamma(mut self, v: f64) -> Self {
        self.gamma = v;
        self
    }

    /// Sets the exploration rate.
    pub fn epsilon(mut self, v: f64) -> Self {
        self.epsilon = v;
        self
    }

    /// Sets the discretization of the state space.
    pub fn buckets(mut self, n_buckets: Vec<usize>, thresholds: Vec<[f64; 2]>) -> Self {
        self.n_buckets = n_buckets;
        self.thresholds = thresholds;
        self
    }

    /// Sets the action catalog.
    pub fn actions(mut self, v: Vec<Vec<f64>>) -> Self {
        self.actions = v;
        self
    }

    /// Sets the initial action value.
    pub fn init_q(mut self, v: f64) -> Self {
        self.init_q = v;
        self
    }

    /// Sets the random seed.
    pub fn seed(mut self, v: u64) -> Self {
        self.seed = v;
        self
    }

    /// Checks the rates and the initial value.
    ///
    /// The discretization and the catalog are checked when they are built.
    pub fn validate(&self) -> Result<(), SwingupError> {
        for (name, v) in [
            ("alpha", self.alpha),
            ("gamma", self.gamma),
            ("epsilon", self.epsilon),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(SwingupError::Configuration(format!(
                    "{} must be in [0, 1], but {}",
                    name, v
                )));
            }
        }
        if !self.init_q.is_finite() {
            return Err(SwingupError::Configuration(format!(
                "init_q must be finite, but {}",
                self.init_q
            )));
        }
        Ok(())
    }

    /// Constructs [`QLearningConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`QLearningConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_qlearning_config() -> Result<()> {
        let config = QLearningConfig::default()
            .alpha(0.2)
            .buckets(vec![3, 4], vec![[-1.0, 1.0], [0.0, 2.0]])
            .actions(vec![vec![-1.0], vec![1.0]])
            .seed(7);
        let dir = TempDir::new("qlearning_config")?;
        let path = dir.path().join("qlearning.yaml");
        config.save(&path)?;
        assert_eq!(config, QLearningConfig::load(&path)?);
        Ok(())
    }

    #[test]
    fn test_validate() {
        assert!(QLearningConfig::default().validate().is_ok());
        assert!(QLearningConfig::default().alpha(1.5).validate().is_err());
        assert!(QLearningConfig::default().gamma(-0.1).validate().is_err());
        assert!(QLearningConfig::default().epsilon(f64::NAN).validate().is_err());
        assert!(QLearningConfig::default()
            .init_q(f64::INFINITY)
            .validate()
            .is_err());
    }
}
