//! Rotary inverted pendulum attached through a serial link.
use crate::{
    codec::{encode_command, Telemetry, COMMAND_LEN, TELEMETRY_LEN},
    transport::Transport,
    units::{relative_angle, Sample, UnitScales},
    PendulumAct, PendulumObs,
};
use anyhow::{anyhow, Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::{
    f64::consts::PI,
    fs::File,
    io::{self, BufReader, Write},
    path::{Path, PathBuf},
    thread,
    time::Duration,
};
use swingup_core::{Env, SwingupError};

/// Configuration of [`RotaryPendulum`].
#[derive(Debug, Deserialize, Serialize, PartialEq, Clone)]
pub struct RotaryPendulumConfig {
    /// Device the controller is attached to.
    pub device: PathBuf,

    /// Duration of a control tick in milliseconds.
    pub tick_millis: u64,

    /// Magnitude of the command driving the base back on reset.
    pub reset_input: f64,

    /// Reset ends once the base is within this angle of its origin.
    pub reset_base_angle: f64,

    /// The swing-up episode fails once the base turns further than this.
    pub max_base_angle: f64,

    /// Angle from upright within which the pendulum counts as upright.
    pub upright_angle: f64,

    /// The swing-up episode fails if the upright pendulum spins faster than this.
    pub max_upright_velocity: f64,

    /// The base counts as centered within this angle.
    pub settle_base_angle: f64,

    /// Angle from the bottom within which the pendulum counts as hanging.
    pub settle_angle: f64,

    /// The hanging pendulum counts as settled below this angular velocity.
    pub settle_velocity: f64,

    /// Reward of a settled pendulum.
    pub good_reward: f64,

    /// Reward of a failed swing-up.
    pub bad_reward: f64,

    /// Subtracted from every other reward.
    pub step_penalty: f64,

    /// Sensor and motor scales.
    pub units: UnitScales,

    /// Ticks to wait for the first full state.
    pub init_attempts: usize,

    /// Ticks allowed for a reset.
    pub max_reset_ticks: usize,
}

impl Default for RotaryPendulumConfig {
    fn default() -> Self {
        Self {
            device: PathBuf::from("/dev/ttyAMA0"),
            tick_millis: 20,
            reset_input: 0.25,
            reset_base_angle: PI / 32.0,
            max_base_angle: PI / 2.0,
            upright_angle: PI / 32.0,
            max_upright_velocity: 10.0,
            settle_base_angle: PI / 32.0,
            settle_angle: PI / 16.0,
            settle_velocity: 0.5,
            good_reward: 100.0,
            bad_reward: -1e7,
            step_penalty: 1.0,
            units: UnitScales::default(),
            init_attempts: 100,
            max_reset_ticks: 5000,
        }
    }
}

impl RotaryPendulumConfig {
    /// Sets the device.
    pub fn device(mut self, v: impl Into<PathBuf>) -> Self {
        self.device = v.into();
        self
    }

    /// Sets the duration of a control tick.
    pub fn tick_millis(mut self, v: u64) -> Self {
        self.tick_millis = v;
        self
    }

    /// Sets the number of ticks to wait for the first full state.
    pub fn init_attempts(mut self, v: usize) -> Self {
        self.init_attempts = v;
        self
    }

    /// Sets the number of ticks allowed for a reset.
    pub fn max_reset_ticks(mut self, v: usize) -> Self {
        self.max_reset_ticks = v;
        self
    }

    /// Constructs [`RotaryPendulumConfig`] from YAML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = File::open(path)?;
        let rdr = BufReader::new(file);
        let b = serde_yaml::from_reader(rdr)?;
        Ok(b)
    }

    /// Saves [`RotaryPendulumConfig`].
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let mut file = File::create(path)?;
        file.write_all(serde_yaml::to_string(&self)?.as_bytes())?;
        Ok(())
    }
}

/// A rotary inverted pendulum driven over a [`Transport`].
///
/// Every tick sleeps for the configured duration, sends one command and reads
/// one telemetry frame. Velocities are estimated from consecutive frames, so a
/// state is available only after two frames with increasing timestamps.
///
/// A rejected frame, a short read or write, a timed out link or a timestamp
/// that did not advance fail the tick with [`SwingupError::TransportFault`]
/// and keep the previous state. Other I/O errors are fatal.
///
/// The state is `[base angle, pendulum angle, base velocity, pendulum velocity]`.
/// The pendulum angle is measured from upright, which is taken to be half a
/// turn from where the pendulum rests when the environment is built.
pub struct RotaryPendulum<T: Transport> {
    config: RotaryPendulumConfig,
    transport: T,
    tick: Duration,
    last: Option<Sample>,

    /// `[base angle, raw pendulum angle, base velocity, pendulum velocity]`
    raw_state: Option<[f64; 4]>,
    rest_angle: f64,
}

impl<T: Transport> RotaryPendulum<T> {
    /// Builds the environment on an open transport and waits for a full state.
    pub fn with_transport(config: &RotaryPendulumConfig, transport: T) -> Result<Self> {
        config.units.validate()?;
        let mut env = Self {
            config: config.clone(),
            transport,
            tick: Duration::from_millis(config.tick_millis),
            last: None,
            raw_state: None,
            rest_angle: 0.0,
        };
        env.init()?;
        Ok(env)
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Resting angle of the pendulum sampled on build.
    pub fn rest_angle(&self) -> f64 {
        self.rest_angle
    }

    fn init(&mut self) -> Result<()> {
        for attempt in 0..self.config.init_attempts {
            match self.tick(0.0) {
                Ok(()) => {
                    self.rest_angle = self.raw_state.map_or(0.0, |s| s[1]);
                    info!(
                        "Rotary pendulum ready after {} ticks, resting at {:.4} rad",
                        attempt + 1,
                        self.rest_angle
                    );
                    return Ok(());
                }
                Err(e) if SwingupError::is_recoverable_error(&e) => {
                    debug!("Init tick {}: {}", attempt, e);
                }
                Err(e) => return Err(e.context("cannot init rotary pendulum")),
            }
        }
        Err(anyhow!(
            "cannot init rotary pendulum: no state after {} ticks",
            self.config.init_attempts
        ))
    }

    /// Sends one command and reads one frame.
    fn tick(&mut self, u: f64) -> Result<()> {
        thread::sleep(self.tick);

        let n = self.transport.write(&encode_command(u)).map_err(io_fault)?;
        if n != COMMAND_LEN {
            return Err(SwingupError::TransportFault(format!(
                "tx data len must be {}, but {}",
                COMMAND_LEN, n
            ))
            .into());
        }

        let mut buf = [0u8; TELEMETRY_LEN];
        let n = self.transport.read(&mut buf).map_err(io_fault)?;
        let telemetry = Telemetry::decode(&buf[..n]).map_err(SwingupError::from)?;
        let sample = self.config.units.sample(&telemetry);

        // The newest frame becomes the reference even if it is stale.
        let prev = self.last.replace(sample);
        match prev.and_then(|prev| sample.velocities_since(&prev)) {
            Some([base_vel, pendulum_vel]) => {
                self.raw_state = Some([
                    sample.base_angle,
                    sample.pendulum_angle,
                    base_vel,
                    pendulum_vel,
                ]);
                Ok(())
            }
            None => Err(SwingupError::TransportFault(format!(
                "state not yet available at timestamp {}",
                telemetry.timestamp
            ))
            .into()),
        }
    }

    fn base_angle(&self) -> f64 {
        self.raw_state.map_or(0.0, |s| s[0])
    }
}

fn io_fault(e: io::Error) -> anyhow::Error {
    match e.kind() {
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => {
            SwingupError::TransportFault(e.to_string()).into()
        }
        _ => anyhow::Error::new(e).context("run step error"),
    }
}

impl<T: Transport> Env for RotaryPendulum<T> {
    type Config = RotaryPendulumConfig;
    type Obs = PendulumObs;
    type Act = PendulumAct;

    fn build(config: &Self::Config) -> Result<Self> {
        config.units.validate()?;
        let transport = T::open(&config.device)
            .with_context(|| format!("cannot open {:?}", config.device))?;
        Self::with_transport(config, transport)
    }

    /// Drives the base back to its origin, then applies the zero command.
    fn reset(&mut self) -> Result<()> {
        for _ in 0..self.config.max_reset_ticks {
            let base = self.base_angle();
            if base.abs() < self.config.reset_base_angle {
                return match self.tick(0.0) {
                    Err(e) if !SwingupError::is_recoverable_error(&e) => {
                        Err(e.context("reset error"))
                    }
                    _ => Ok(()),
                };
            }

            let direction = if base > 0.0 { -1.0 } else { 1.0 };
            match self.tick(direction * self.config.reset_input) {
                Err(e) if SwingupError::is_recoverable_error(&e) => debug!("Reset tick: {}", e),
                Err(e) => return Err(e.context("reset error")),
                Ok(()) => {}
            }
        }
        Err(anyhow!(
            "reset error: base did not return within {} ticks",
            self.config.max_reset_ticks
        ))
    }

    fn state(&self) -> PendulumObs {
        let [base, pendulum, base_vel, pendulum_vel] = self.raw_state.unwrap_or_default();
        let theta = relative_angle(self.rest_angle + PI, pendulum);
        PendulumObs([base, theta, base_vel, pendulum_vel])
    }

    fn step(&mut self, a: &PendulumAct) -> Result<()> {
        let u = a.command()?;
        self.tick(u)
    }

    fn neutral_act(&self) -> PendulumAct {
        PendulumAct::single(0.0)
    }

    fn is_finish_up(&self, obs: &PendulumObs) -> bool {
        let [base, theta, _, theta_dot] = obs.0;
        let c = &self.config;
        base.abs() >= c.max_base_angle
            || (theta.abs() < c.upright_angle && theta_dot.abs() > c.max_upright_velocity)
    }

    fn is_finish_down(&self, obs: &PendulumObs) -> bool {
        let [base, theta, _, theta_dot] = obs.0;
        let c = &self.config;
        base.abs() < c.settle_base_angle
            && theta.abs() > PI - c.settle_angle
            && theta_dot.abs() < c.settle_velocity
    }

    fn reward_up(&self, obs: &PendulumObs) -> f64 {
        if self.is_finish_up(obs) {
            return self.config.bad_reward;
        }
        let [base, theta, _, _] = obs.0;
        -theta.abs() + PI / 2.0 - 0.01 * base.abs() - self.config.step_penalty
    }

    fn reward_down(&self, obs: &PendulumObs) -> f64 {
        if self.is_finish_down(obs) {
            return self.config.good_reward;
        }
        let [base, theta, _, _] = obs.0;
        theta.abs() - PI / 2.0 - 0.01 * base.abs() - self.config.step_penalty
    }

    /// Applies the zero command and closes the transport.
    ///
    /// The transport is closed even if the zero command was not acknowledged.
    fn close(&mut self) -> Result<()> {
        let res = self.tick(0.0);
        self.transport.close().context("rotary pendulum close error")?;
        match res {
            Err(e) if !SwingupError::is_recoverable_error(&e) => {
                Err(e.context("rotary pendulum close error"))
            }
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    #[test]
    fn test_serde_rotary_pendulum_config() -> Result<()> {
        let config = RotaryPendulumConfig::default()
            .device("/dev/ttyUSB0")
            .tick_millis(10)
            .init_attempts(3);
        let dir = TempDir::new("rotary_pendulum_config")?;
        let path = dir.path().join("rotary.yaml");
        config.save(&path)?;
        assert_eq!(config, RotaryPendulumConfig::load(&path)?);
        Ok(())
    }

    #[test]
    fn test_io_fault_kinds() {
        let timeout = io_fault(io::Error::new(io::ErrorKind::TimedOut, "timeout"));
        assert!(SwingupError::is_recoverable_error(&timeout));
        let broken = io_fault(io::Error::new(io::ErrorKind::BrokenPipe, "gone"));
        assert!(!SwingupError::is_recoverable_error(&broken));
    }
}
