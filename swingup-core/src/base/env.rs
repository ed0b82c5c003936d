//! Environment.
use super::{Act, Obs, Regime};
use anyhow::Result;

/// Represents a pendulum, driven one control tick at a time.
///
/// The environment keeps the latest valid state. A failed [`Env::step`] leaves
/// that state untouched; whether the failure is recoverable is signalled by
/// returning [`SwingupError::TransportFault`](crate::SwingupError::TransportFault).
pub trait Env {
    /// Configurations.
    type Config: Clone;

    /// Observation of the environment.
    type Obs: Obs;

    /// Action of the environment.
    type Act: Act;

    /// Builds and initializes an environment.
    fn build(config: &Self::Config) -> Result<Self>
    where
        Self: Sized;

    /// Brings the environment to the initial state of an episode.
    fn reset(&mut self) -> Result<()>;

    /// Returns the current state.
    fn state(&self) -> Self::Obs;

    /// Applies an action for one control tick.
    fn step(&mut self, a: &Self::Act) -> Result<()>;

    /// The zero command, applied at the end of episodes and on shutdown.
    fn neutral_act(&self) -> Self::Act;

    /// Termination predicate of the swing-up regime.
    fn is_finish_up(&self, obs: &Self::Obs) -> bool;

    /// Termination predicate of the balance-down regime.
    fn is_finish_down(&self, obs: &Self::Obs) -> bool;

    /// Reward of the swing-up regime.
    fn reward_up(&self, obs: &Self::Obs) -> f64;

    /// Reward of the balance-down regime.
    fn reward_down(&self, obs: &Self::Obs) -> f64;

    /// Applies the zero command and releases the underlying resources.
    fn close(&mut self) -> Result<()>;

    /// Termination predicate of the given regime.
    fn is_finish(&self, regime: Regime, obs: &Self::Obs) -> bool {
        match regime {
            Regime::Up => self.is_finish_up(obs),
            Regime::Down => self.is_finish_down(obs),
        }
    }

    /// Reward of the given regime.
    fn reward(&self, regime: Regime, obs: &Self::Obs) -> f64 {
        match regime {
            Regime::Up => self.reward_up(obs),
            Regime::Down => self.reward_down(obs),
        }
    }
}
