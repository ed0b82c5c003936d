//! Agent.
use super::{Env, Policy};
use anyhow::Result;
use std::path::Path;

/// A policy that improves from the transitions it experiences.
pub trait Agent<E: Env>: Policy<E> {
    /// Switches to exploration and learning.
    fn train(&mut self);

    /// Switches to greedy action selection.
    fn eval(&mut self);

    /// `true` between [`Agent::train`] and [`Agent::eval`].
    fn is_train(&self) -> bool;

    /// Resets the episodic state of the agent.
    ///
    /// Called once at the beginning of every episode.
    fn reset(&mut self) {}

    /// Learns from the transition `(obs, act, reward, next_obs)`.
    ///
    /// `next_act` is the action already chosen for `next_obs`. Off-policy agents
    /// are free to ignore it.
    fn learn(
        &mut self,
        obs: &E::Obs,
        act: &E::Act,
        reward: f64,
        next_obs: &E::Obs,
        next_act: &E::Act,
    ) -> Result<()>;

    /// Writes the learned parameters to `path`.
    fn save_params(&self, path: &Path) -> Result<()>;

    /// Replaces the learned parameters with those stored at `path`.
    ///
    /// Fails with [`SwingupError::PersistenceAbsent`](crate::SwingupError::PersistenceAbsent)
    /// if nothing has been saved there yet, in which case the agent is unchanged.
    fn load_params(&mut self, path: &Path) -> Result<()>;
}
