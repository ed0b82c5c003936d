#![warn(missing_docs)]
//! Core abstractions for learning to swing up and balance an inverted pendulum.
//!
//! The crate defines the seams between the environment, the agent and the
//! training loop:
//!
//! * [`Env`] - a pendulum, simulated or physical, driven one tick at a time.
//! * [`Policy`] and [`Agent`] - map observations to actions and learn from transitions.
//! * [`Trainer`] - runs swing-up and balance-down episodes, persists agents and
//!   honours a cooperative stop flag.
//! * [`record`] - per-episode metrics handed to a [`Recorder`](record::Recorder).
pub mod error;
pub mod record;

mod base;
pub use base::{Act, Agent, Configurable, Env, Obs, Policy, Regime};

mod evaluator;
pub use evaluator::{DefaultEvaluator, Evaluator};

mod trainer;
pub use error::SwingupError;
pub use trainer::{EpisodeStats, Mode, Trainer, TrainerConfig};
