//! Pendulum environments.
//!
//! * [`Cartpole`] integrates cart-pole dynamics with a fixed step.
//! * [`RotaryPendulum`] drives a physical rotary inverted pendulum through a
//!   [`Transport`], speaking the wire format in [`codec`].
//!
//! [`PendulumEnv`] selects one of them from [`PendulumEnvConfig`] once at
//! startup.
mod cartpole;
pub mod codec;
mod obs_act;
pub mod physics;
mod rotary;
mod transport;
pub mod units;
use anyhow::Result;
pub use cartpole::{Cartpole, CartpoleConfig};
pub use obs_act::{PendulumAct, PendulumObs};
pub use rotary::{RotaryPendulum, RotaryPendulumConfig};
use serde::{Deserialize, Serialize};
use std::{fs::File, io::BufReader, path::Path};
use swingup_core::Env;
pub use transport::{ReplayTransport, Transport};

/// Configuration of [`PendulumEnv`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub enum PendulumEnvConfig {
    /// A simulated cart-pole.
    Cartpole(CartpoleConfig),

    /// A rotary pendulum on a serial device.
    RotaryPendulum(RotaryPendulumConfig),
}

impl Default for PendulumEnvConfig {
    fn default() -> Self {
        Self::Cartpole(CartpoleConfig::default())
    }
}

impl PendulumEnvConfig {
    /// Constructs [`PendulumEnvConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }
}

/// One of the pendulum environments.
pub enum PendulumEnv {
    /// A simulated cart-pole.
    Cartpole(Cartpole),

    /// A rotary pendulum on a serial device.
    RotaryPendulum(RotaryPendulum<File>),
}

macro_rules! dispatch {
    ($self:expr, $env:ident => $body:expr) => {
        match $self {
            PendulumEnv::Cartpole($env) => $body,
            PendulumEnv::RotaryPendulum($env) => $body,
        }
    };
}

impl Env for PendulumEnv {
    type Config = PendulumEnvConfig;
    type Obs = PendulumObs;
    type Act = PendulumAct;

    fn build(config: &Self::Config) -> Result<Self> {
        Ok(match config {
            PendulumEnvConfig::Cartpole(c) => Self::Cartpole(Cartpole::build(c)?),
            PendulumEnvConfig::RotaryPendulum(c) => {
                Self::RotaryPendulum(RotaryPendulum::build(c)?)
            }
        })
    }

    fn reset(&mut self) -> Result<()> {
        dispatch!(self, env => env.reset())
    }

    fn state(&self) -> PendulumObs {
        dispatch!(self, env => env.state())
    }

    fn step(&mut self, a: &PendulumAct) -> Result<()> {
        dispatch!(self, env => env.step(a))
    }

    fn neutral_act(&self) -> PendulumAct {
        dispatch!(self, env => env.neutral_act())
    }

    fn is_finish_up(&self, obs: &PendulumObs) -> bool {
        dispatch!(self, env => env.is_finish_up(obs))
    }

    fn is_finish_down(&self, obs: &PendulumObs) -> bool {
        dispatch!(self, env => env.is_finish_down(obs))
    }

    fn reward_up(&self, obs: &PendulumObs) -> f64 {
        dispatch!(self, env => env.reward_up(obs))
    }

    fn reward_down(&self, obs: &PendulumObs) -> f64 {
        dispatch!(self, env => env.reward_down(obs))
    }

    fn close(&mut self) -> Result<()> {
        dispatch!(self, env => env.close())
    }
}
