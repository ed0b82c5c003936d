//! Core functionalities.
mod agent;
mod env;
mod policy;
pub use agent::Agent;
pub use env::Env;
pub use policy::{Configurable, Policy};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display};

/// An observation of an environment, the state vector.
pub trait Obs: Clone + Debug {
    /// Returns the number of elements in the observation.
    fn len(&self) -> usize;
}

/// An action on an environment.
pub trait Act: Clone + Debug {
    /// Returns the number of elements in the action.
    fn len(&self) -> usize;
}

/// Control regime of an episode.
///
/// Both regimes share one environment but are learned by independent agents
/// with opposing reward shaping.
#[derive(Debug, Deserialize, Serialize, PartialEq, Eq, Clone, Copy, Hash)]
pub enum Regime {
    /// Swing the pendulum up and keep it balanced.
    Up,

    /// Bring the pendulum back down and let it settle.
    Down,
}

impl Display for Regime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Up => write!(f, "up"),
            Self::Down => write!(f, "down"),
        }
    }
}
