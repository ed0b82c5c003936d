//! Tabular Q-learning for pendulum environments.
//!
//! [`QLearning`] discretizes every dimension of the state into buckets, keeps
//! one action value per bucket combination and catalog action, and picks
//! actions epsilon-greedily. It works with any [`Env`](swingup_core::Env)
//! whose observations and actions are slices of `f64`.
mod qlearning;
pub use qlearning::{
    digitize, ActionCatalog, Discretizer, EpsilonGreedy, QLearning, QLearningConfig, QTable,
};
