//! Configuration of a run.
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use swingup_core::TrainerConfig;
use swingup_env::PendulumEnvConfig;
use swingup_qlearning::QLearningConfig;

/// Everything a run needs, read from one YAML file.
#[derive(Debug, Default, Deserialize, Serialize, PartialEq, Clone)]
pub struct SwingupConfig {
    /// The environment, simulated or physical.
    pub env: PendulumEnvConfig,

    /// The swing-up agent.
    pub agent_up: QLearningConfig,

    /// The balance-down agent.
    pub agent_down: QLearningConfig,

    /// The training loop.
    pub trainer: TrainerConfig,
}

impl SwingupConfig {
    /// Constructs [`SwingupConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`SwingupConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}
