//! Q-learning agent.
mod base;
mod catalog;
mod config;
mod discretizer;
mod explorer;
mod qtable;
pub use base::QLearning;
pub use catalog::ActionCatalog;
pub use config::QLearningConfig;
pub use discretizer::{digitize, Discretizer};
pub use explorer::EpsilonGreedy;
pub use qtable::QTable;
