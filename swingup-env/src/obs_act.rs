//! Observation and action of the pendulum environments.
use swingup_core::{Act, Obs, SwingupError};

/// State vector of a pendulum, `[position, angle, velocity, angular velocity]`.
///
/// The angle is zero with the pendulum upright.
#[derive(Clone, Debug, PartialEq)]
pub struct PendulumObs(pub [f64; 4]);

impl Obs for PendulumObs {
    fn len(&self) -> usize {
        self.0.len()
    }
}

impl AsRef<[f64]> for PendulumObs {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl From<[f64; 4]> for PendulumObs {
    fn from(s: [f64; 4]) -> Self {
        Self(s)
    }
}

/// Motor command of a pendulum.
///
/// Kept as a vector so that it can be looked up in an action catalog. Only
/// single-element actions can be applied.
#[derive(Clone, Debug, PartialEq)]
pub struct PendulumAct(pub Vec<f64>);

impl PendulumAct {
    /// An action with a single command.
    pub fn single(v: f64) -> Self {
        Self(vec![v])
    }

    /// Returns the command, failing unless the action has exactly one element.
    pub fn command(&self) -> Result<f64, SwingupError> {
        match self.0.as_slice() {
            [v] => Ok(*v),
            a => Err(SwingupError::DimensionMismatch {
                expected: 1,
                actual: a.len(),
            }),
        }
    }
}

impl Act for PendulumAct {
    fn len(&self) -> usize {
        self.0.len()
    }
}

impl AsRef<[f64]> for PendulumAct {
    fn as_ref(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for PendulumAct {
    fn from(v: Vec<f64>) -> Self {
        Self(v)
    }
}
