//! Configuration of [`Trainer`](super::Trainer).
use crate::{Regime, SwingupError};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::{
    fs::File,
    io::{BufReader, Write},
    path::{Path, PathBuf},
};

/// Which regimes are trained, and in which order.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy)]
pub enum Mode {
    /// A swing-up episode followed by a balance-down episode, repeatedly.
    UpDown,

    /// Swing-up episodes only.
    Up,

    /// Balance-down episodes only.
    Down,
}

impl Mode {
    /// Regimes of one outer iteration, in order.
    pub fn regimes(&self) -> &'static [Regime] {
        match self {
            Self::UpDown => &[Regime::Up, Regime::Down],
            Self::Up => &[Regime::Up],
            Self::Down => &[Regime::Down],
        }
    }
}

/// Configuration of [`Trainer`](super::Trainer).
///
/// Limits use `-1` for "unbounded", matching the values operators already
/// keep in their configuration files.
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct TrainerConfig {
    /// Which regimes are trained.
    pub mode: Mode,

    /// The maximum number of episodes, `-1` to run until stopped.
    pub max_episodes: i64,

    /// The maximum number of ticks of a swing-up episode, `-1` for no limit.
    pub max_steps_up: i64,

    /// The maximum number of ticks of a balance-down episode, `-1` for no limit.
    pub max_steps_down: i64,

    /// Interval of saving agents in episodes, `-1` to save after every episode.
    pub save_interval: i64,

    /// Where the swing-up agent is loaded from and saved to.
    pub agent_up_path: PathBuf,

    /// Where the balance-down agent is loaded from and saved to.
    pub agent_down_path: PathBuf,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            mode: Mode::UpDown,
            max_episodes: -1,
            max_steps_up: 1000,
            max_steps_down: 1000,
            save_interval: 100,
            agent_up_path: PathBuf::from("agent_up.bin"),
            agent_down_path: PathBuf::from("agent_down.bin"),
        }
    }
}

impl TrainerConfig {
    /// Sets the run mode.
    pub fn mode(mut self, v: Mode) -> Self {
        self.mode = v;
        self
    }

    /// Sets the number of episodes.
    pub fn max_episodes(mut self, v: i64) -> Self {
        self.max_episodes = v;
        self
    }

    /// Sets the step limit of swing-up episodes.
    pub fn max_steps_up(mut self, v: i64) -> Self {
        self.max_steps_up = v;
        self
    }

    /// Sets the step limit of balance-down episodes.
    pub fn max_steps_down(mut self, v: i64) -> Self {
        self.max_steps_down = v;
        self
    }

    /// Sets the interval of saving in episodes.
    pub fn save_interval(mut self, v: i64) -> Self {
        self.save_interval = v;
        self
    }

    /// Sets the path of the swing-up agent.
    pub fn agent_up_path(mut self, v: impl Into<PathBuf>) -> Self {
        self.agent_up_path = v.into();
        self
    }

    /// Sets the path of the balance-down agent.
    pub fn agent_down_path(mut self, v: impl Into<PathBuf>) -> Self {
        self.agent_down_path = v.into();
        self
    }

    /// Returns the step limit of the given regime.
    pub fn max_steps(&self, regime: Regime) -> i64 {
        match regime {
            Regime::Up => self.max_steps_up,
            Regime::Down => self.max_steps_down,
        }
    }

    /// Returns the agent path of the given regime.
    pub fn agent_path(&self, regime: Regime) -> &Path {
        match regime {
            Regime::Up => &self.agent_up_path,
            Regime::Down => &self.agent_down_path,
        }
    }

    /// Checks that every limit is either `-1` or in its valid range.
    pub fn validate(&self) -> Result<(), SwingupError> {
        let limits = [
            ("max_episodes", self.max_episodes),
            ("max_steps_up", self.max_steps_up),
            ("max_steps_down", self.max_steps_down),
        ];
        for (name, v) in limits {
            if v < -1 {
                return Err(SwingupError::Configuration(format!(
                    "{} must be -1 or non-negative, but {}",
                    name, v
                )));
            }
        }
        if self.save_interval == 0 || self.save_interval < -1 {
            return Err(SwingupError::Configuration(format!(
                "save_interval must be -1 or positive, but {}",
                self.save_interval
            )));
        }
        Ok(())
    }

    /// Constructs [`TrainerConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`TrainerConfig`].
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
    fn test_serde_trainer_config() -> Result<()> {
        let config = TrainerConfig::default()
            .mode(Mode::Up)
            .max_episodes(10)
            .max_steps_up(-1)
            .save_interval(-1)
            .agent_up_path("some/directory/up.bin");

        let dir = TempDir::new("trainer_config")?;
        let path = dir.path().join("trainer_config.yaml");

        config.save(&path)?;
        let config_ = TrainerConfig::load(&path)?;
        assert_eq!(config, config_);
        Ok(())
    }

    #[test]
    fn test_validate() {
        assert!(TrainerConfig::default().validate().is_ok());
        assert!(TrainerConfig::default().max_steps_up(-1).validate().is_ok());
        assert!(TrainerConfig::default().save_interval(0).validate().is_err());
        assert!(TrainerConfig::default().save_interval(-2).validate().is_err());
        assert!(TrainerConfig::default().max_episodes(-5).validate().is_err());
    }
}
