//! Tabular Q-learning agent.
use super::{
    catalog::ActionCatalog, config::QLearningConfig, discretizer::Discretizer,
    explorer::EpsilonGreedy, qtable::QTable,
};
use anyhow::Result;
use log::trace;
use rand::{rngs::SmallRng, SeedableRng};
use std::{marker::PhantomData, path::Path};
use swingup_core::{Agent, Configurable, Env, Policy, SwingupError};

/// Tabular Q-learning agent.
///
/// The update is
/// `Q[s1][a1] = (1 - alpha) Q[s1][a1] + alpha (r + gamma max_a Q[s2][a])`.
/// The action chosen for `s2` is not used, which makes this plain
/// Q-learning rather than SARSA.
///
/// Only the Q-table is persisted.
pub struct QLearning<E> {
    alpha: f64,
    gamma: f64,
    explorer: EpsilonGreedy,
    discretizer: Discretizer,
    catalog: ActionCatalog,
    qtable: QTable,
    train: bool,
    rng: SmallRng,
    phantom: PhantomData<E>,
}

impl<E> QLearning<E>
where
    E: Env,
    E::Obs: AsRef<[f64]>,
    E::Act: AsRef<[f64]> + From<Vec<f64>>,
{
    /// The Q-table.
    pub fn qtable(&self) -> &QTable {
        &self.qtable
    }

    /// The action catalog.
    pub fn catalog(&self) -> &ActionCatalog {
        &self.catalog
    }

    /// Number of observation dimensions the agent discretizes.
    pub fn state_dim(&self) -> usize {
        self.discretizer.dim()
    }

    /// Index of the bucket combination of an observation.
    pub fn state_index(&self, obs: &E::Obs) -> Result<usize, SwingupError> {
        self.discretizer.index(obs.as_ref())
    }
}

impl<E: Env> Configurable for QLearning<E> {
    type Config = QLearningConfig;

    /// Constructs Q-learning agent with every value set to `init_q`.
    fn build(config: Self::Config) -> Result<Self> {
        config.validate()?;
        let discretizer = Discretizer::new(config.n_buckets, config.thresholds)?;
        let catalog = ActionCatalog::new(config.actions)?;
        let qtable = QTable::new(discretizer.n_states(), catalog.len(), config.init_q);

        Ok(Self {
            alpha: config.alpha,
            gamma: config.gamma,
            explorer: EpsilonGreedy::new(config.epsilon),
            discretizer,
            catalog,
            qtable,
            train: true,
            rng: SmallRng::seed_from_u64(config.seed),
            phantom: PhantomData,
        })
    }
}

impl<E> Policy<E> for QLearning<E>
where
    E: Env,
    E::Obs: AsRef<[f64]>,
    E::Act: AsRef<[f64]> + From<Vec<f64>>,
{
    /// Epsilon-greedy in training mode, greedy in evaluation mode.
    ///
    /// # Panics
    ///
    /// Panics if the observation has a different number of dimensions than
    /// the discretizer.
    fn sample(&mut self, obs: &E::Obs) -> E::Act {
        let s = match self.discretizer.index(obs.as_ref()) {
            Ok(s) => s,
            Err(e) => panic!("{}", e),
        };
        let a = if self.train {
            self.explorer.action(self.qtable.row(s), &mut self.rng)
        } else {
            self.qtable.argmax(s)
        };
        self.catalog.get(a).to_vec().into()
    }
}

impl<E> Agent<E> for QLearning<E>
where
    E: Env,
    E::Obs: AsRef<[f64]>,
    E::Act: AsRef<[f64]> + From<Vec<f64>>,
{
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn learn(
        &mut self,
        obs: &E::Obs,
        act: &E::Act,
        reward: f64,
        next_obs: &E::Obs,
        _next_act: &E::Act,
    ) -> Result<()> {
        let i1 = self.discretizer.index(obs.as_ref())?;
        let j1 = self.catalog.index_of(act.as_ref())?;
        let i2 = self.discretizer.index(next_obs.as_ref())?;

        let old = self.qtable.get(i1, j1);
        let target = reward + self.gamma * self.qtable.max(i2);
        let new = (1.0 - self.alpha) * old + self.alpha * target;
        self.qtable.set(i1, j1, new);
        trace!("Q[{}][{}]: {} -> {}", i1, j1, old, new);
        Ok(())
    }

    fn save_params(&self, path: &Path) -> Result<()> {
        self.qtable.save(path)
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        self.qtable = QTable::load(path, self.discretizer.n_states(), self.catalog.len())?;
        Ok(())
    }
}
