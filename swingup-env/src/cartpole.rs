//! Simulated cart-pole.
use crate::{
    physics::{CartpoleDynamics, State},
    PendulumAct, PendulumObs,
};
use anyhow::Result;
use log::trace;
use serde::{Deserialize, Serialize};
use std::{
    f64::consts::PI,
    fs::File,
    io::{BufReader, Write},
    path::Path,
};
use swingup_core::Env;

/// Configuration of [`Cartpole`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct CartpoleConfig {
    /// Gravitational acceleration.
    pub gravity: f64,

    /// Mass of the pole.
    pub pole_mass: f64,

    /// Length of the pole.
    pub pole_length: f64,

    /// Mass of the cart.
    pub cart_mass: f64,

    /// Duration of a tick in seconds.
    pub dt: f64,

    /// State at the start of every episode.
    pub init_state: [f64; 4],

    /// The swing-up episode fails once the cart is further than this.
    pub max_abs_x: f64,

    /// Angle from upright within which the pole counts as upright.
    pub upright_angle: f64,

    /// The swing-up episode fails if the upright pole spins faster than this.
    pub max_upright_theta_dot: f64,

    /// The cart counts as centered within this distance.
    pub settle_abs_x: f64,

    /// Angle from the bottom within which the pole counts as hanging.
    pub settle_angle: f64,

    /// The hanging pole counts as settled below this angular velocity.
    pub settle_theta_dot: f64,

    /// Reward of a failed swing-up.
    pub bad_reward: f64,

    /// Reward of a settled pole.
    pub good_reward: f64,

    /// Subtracted from every other reward.
    pub step_penalty: f64,
}

impl Default for CartpoleConfig {
    fn default() -> Self {
        Self {
            gravity: 9.80665,
            pole_mass: 0.1,
            pole_length: 0.5,
            cart_mass: 1.0,
            dt: 0.02,
            init_state: [0.0, PI, 0.0, 0.0],
            max_abs_x: 2.0,
            upright_angle: PI / 8.0,
            max_upright_theta_dot: 3.0 * PI,
            settle_abs_x: 0.5,
            settle_angle: PI / 16.0,
            settle_theta_dot: 0.5,
            bad_reward: -1e7,
            good_reward: 100.0,
            step_penalty: 0.1,
        }
    }
}

impl CartpoleConfig {
    /// Sets the initial state.
    pub fn init_state(mut self, v: [f64; 4]) -> Self {
        self.init_state = v;
        self
    }

    /// Sets the duration of a tick.
    pub fn dt(mut self, v: f64) -> Self {
        self.dt = v;
        self
    }

    /// Sets the limit of the cart position.
    pub fn max_abs_x(mut self, v: f64) -> Self {
        self.max_abs_x = v;
        self
    }

    /// Sets the reward of a failed swing-up.
    pub fn bad_reward(mut self, v: f64) -> Self {
        self.bad_reward = v;
        self
    }

    /// Sets the reward of a settled pole.
    pub fn good_reward(mut self, v: f64) -> Self {
        self.good_reward = v;
        self
    }

    /// Constructs [`CartpoleConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`CartpoleConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// A cart-pole simulated one tick at a time.
pub struct Cartpole {
    config: CartpoleConfig,
    dynamics: CartpoleDynamics,
    s: State,
}

impl Env for Cartpole {
    type Config = CartpoleConfig;
    type Obs = PendulumObs;
    type Act = PendulumAct;

    fn build(config: &Self::Config) -> Result<Self> {
        let dynamics = CartpoleDynamics::new(
            config.gravity,
            config.pole_mass,
            config.pole_length,
            config.cart_mass,
            config.dt,
        );
        Ok(Self {
            config: config.clone(),
            dynamics,
            s: config.init_state,
        })
    }

    fn reset(&mut self) -> Result<()> {
        self.s = self.config.init_state;
        Ok(())
    }

    fn state(&self) -> PendulumObs {
        PendulumObs(self.s)
    }

    fn step(&mut self, a: &PendulumAct) -> Result<()> {
        let u = a.command()?;
        self.s = self.dynamics.step(&self.s, u);
        trace!("u={} s={:?}", u, self.s);
        Ok(())
    }

    fn neutral_act(&self) -> PendulumAct {
        PendulumAct::single(0.0)
    }

    fn is_finish_up(&self, obs: &PendulumObs) -> bool {
        let [x, theta, _, theta_dot] = obs.0;
        let c = &self.config;
        x.abs() > c.max_abs_x
            || (theta.abs() < c.upright_angle && theta_dot.abs() > c.max_upright_theta_dot)
    }

    fn is_finish_down(&self, obs: &PendulumObs) -> bool {
        let [x, theta, _, theta_dot] = obs.0;
        let c = &self.config;
        x.abs() < c.settle_abs_x
            && theta.abs() > PI - c.settle_angle
            && theta_dot.abs() < c.settle_theta_dot
    }

    fn reward_up(&self, obs: &PendulumObs) -> f64 {
        if self.is_finish_up(obs) {
            return self.config.bad_reward;
        }
        let [x, theta, _, _] = obs.0;
        -theta.abs() + PI / 2.0 - 0.01 * x.abs() - self.config.step_penalty
    }

    fn reward_down(&self, obs: &PendulumObs) -> f64 {
        if self.is_finish_down(obs) {
            return self.config.good_reward;
        }
        let [x, theta, _, _] = obs.0;
        theta.abs() - PI / 2.0 - 0.01 * x.abs() - self.config.step_penalty
    }

    fn close(&mut self) -> Result<()> {
        Ok(())
    }
}
