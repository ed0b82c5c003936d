//! Policy.
use super::Env;
use anyhow::Result;
use serde::de::DeserializeOwned;
use std::{fs::File, io::BufReader, path::Path};

/// Chooses an action for an observation, possibly at random.
pub trait Policy<E: Env> {
    /// Chooses an action for `obs`.
    fn sample(&mut self, obs: &E::Obs) -> E::Act;
}

/// Something built from a serializable configuration.
pub trait Configurable {
    /// Configuration.
    type Config: Clone + DeserializeOwned;

    /// Builds the object.
    ///
    /// Fails if the configuration is inconsistent.
    fn build(config: Self::Config) -> Result<Self>
    where
        Self: Sized;

    /// Builds the object from the configuration in a YAML file.
    fn build_from_path(path: impl AsRef<Path>) -> Result<Self>
    where
        Self: Sized,
    {
        let rdr = BufReader::new(File::open(path)?);
        Self::build(serde_yaml::from_reader(rdr)?)
    }
}
