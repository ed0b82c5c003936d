//! Train [`Agent`]s on an [`Env`].
mod config;
use crate::{
    record::{Record, RecordValue, Recorder},
    Agent, Env, Regime, SwingupError,
};
use anyhow::Result;
use chrono::Local;
pub use config::{Mode, TrainerConfig};
use log::{debug, info, warn};
use std::sync::{Arc, Mutex};

/// Summary of a single episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeStats {
    /// Sum of the rewards observed in the episode.
    pub returns: f64,

    /// Number of ticks, including the ones skipped because of transport faults.
    pub steps: usize,

    /// Number of ticks skipped because of transport faults.
    pub faults: usize,

    /// `true` if the episode ended on the termination predicate.
    pub finished: bool,
}

impl EpisodeStats {
    fn new(init_reward: f64) -> Self {
        Self {
            returns: init_reward,
            steps: 0,
            faults: 0,
            finished: false,
        }
    }

    fn into_record(self, regime: Regime, episode: usize) -> Record {
        Record::from_slice(&[
            ("regime", RecordValue::String(regime.to_string())),
            ("episode", RecordValue::Scalar(episode as _)),
            ("return", RecordValue::Scalar(self.returns as _)),
            ("steps", RecordValue::Scalar(self.steps as _)),
            ("faults", RecordValue::Scalar(self.faults as _)),
            ("time", RecordValue::DateTime(Local::now())),
        ])
    }
}

/// Manages the training loop of the swing-up and balance-down agents.
///
/// # Episode
///
/// For an episode of regime `up` or `down`:
///
/// 1. Reset the environment and the agent of the regime.
/// 2. Observe `s1`, compute its reward and sample `a1`.
/// 3. Tick until `max_steps` is reached (forever if `-1`) or the stop flag is set:
///     * Apply `a1`. On a transport fault, the tick is skipped and the state is kept.
///     * Observe `s2`, compute `r`, sample `a2` and learn `(s1, a1, r, s2, a2)`.
///     * Quit if the termination predicate held on the previous tick. The check
///       lags one tick behind so that the terminal transition is learned.
///     * `s1 <- s2`, `a1 <- a2`.
/// 4. Apply the zero command.
/// 5. Save the agent if `episode % save_interval == 0`, or always if `save_interval == -1`.
///
/// The stop flag is polled between ticks and between episodes. It never
/// interrupts a tick.
pub struct Trainer {
    config: TrainerConfig,

    /// Stops training if this flag is set to `true`.
    stop: Arc<Mutex<bool>>,
}

impl Trainer {
    /// Constructs a trainer.
    pub fn build(config: TrainerConfig, stop: Arc<Mutex<bool>>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, stop })
    }

    /// Returns the configuration.
    pub fn config(&self) -> &TrainerConfig {
        &self.config
    }

    /// Returns `true` once the stop flag has been set.
    ///
    /// A poisoned flag counts as set.
    pub fn is_stopped(&self) -> bool {
        self.stop.lock().map(|stop| *stop).unwrap_or(true)
    }

    /// Loads the parameters of both agents from their configured paths.
    ///
    /// An agent without saved data keeps its fresh parameters.
    pub fn load_agents<E, A>(&self, agent_up: &mut A, agent_down: &mut A) -> Result<()>
    where
        E: Env,
        A: Agent<E>,
    {
        for (regime, agent) in [(Regime::Up, agent_up), (Regime::Down, agent_down)] {
            let path = self.config.agent_path(regime);
            match agent.load_params(path) {
                Ok(()) => info!("Loaded the {} agent from {:?}.", regime, path),
                Err(e) if SwingupError::is_persistence_absent(&e) => {
                    info!("No saved {} agent in {:?}, starting fresh.", regime, path)
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Train the agents until `max_episodes` is reached or the stop flag is set.
    ///
    /// Returns the number of episodes started. In [`Mode::UpDown`] a swing-up
    /// and a balance-down episode count as one.
    pub fn train<E, A, R>(
        &mut self,
        env: &mut E,
        agent_up: &mut A,
        agent_down: &mut A,
        recorder: &mut R,
    ) -> Result<usize>
    where
        E: Env,
        A: Agent<E>,
        R: Recorder,
    {
        agent_up.train();
        agent_down.train();
        let mut episode = 0;

        while self.config.max_episodes == -1 || (episode as i64) < self.config.max_episodes {
            if self.is_stopped() {
                break;
            }

            for (i, &regime) in self.config.mode.regimes().iter().enumerate() {
                // Alternating mode may stop between the two regimes
                if i > 0 && self.is_stopped() {
                    break;
                }
                let agent = match regime {
                    Regime::Up => &mut *agent_up,
                    Regime::Down => &mut *agent_down,
                };
                self.run_episode(env, agent, regime, episode, recorder)?;
            }
            episode += 1;
        }

        info!("Training finished after {} episodes.", episode);
        Ok(episode)
    }

    /// Runs a single episode of the given regime.
    pub fn run_episode<E, A, R>(
        &mut self,
        env: &mut E,
        agent: &mut A,
        regime: Regime,
        episode: usize,
        recorder: &mut R,
    ) -> Result<EpisodeStats>
    where
        E: Env,
        A: Agent<E>,
        R: Recorder,
    {
        info!("{} start episode {}", regime, episode);
        let max_steps = self.config.max_steps(regime);

        env.reset()?;
        agent.reset();

        let mut obs = env.state();
        let mut act = agent.sample(&obs);
        let mut stats = EpisodeStats::new(env.reward(regime, &obs));
        let mut is_finish = false;

        while max_steps == -1 || (stats.steps as i64) < max_steps {
            if self.is_stopped() {
                break;
            }
            stats.steps += 1;

            if let Err(e) = env.step(&act) {
                if SwingupError::is_recoverable_error(&e) {
                    warn!("{} episode {}: tick skipped: {}", regime, episode, e);
                    stats.faults += 1;
                    continue;
                }
                return Err(e);
            }

            let next_obs = env.state();
            let reward = env.reward(regime, &next_obs);
            let next_act = agent.sample(&next_obs);
            debug!("{:?} {:?} {} {:?} {:?}", obs, act, reward, next_obs, next_act);
            agent.learn(&obs, &act, reward, &next_obs, &next_act)?;

            if is_finish {
                stats.finished = true;
                break;
            }
            is_finish = env.is_finish(regime, &next_obs);

            obs = next_obs;
            act = next_act;
            stats.returns += reward;
        }

        Self::neutral_tick(env)?;

        if self.config.save_interval == -1 || episode as i64 % self.config.save_interval == 0 {
            let path = self.config.agent_path(regime);
            agent.save_params(path)?;
            info!("Saved the {} agent in {:?}.", regime, path);
        }

        info!(
            "{} end episode {} returns {} steps {}",
            regime, episode, stats.returns, stats.steps
        );
        recorder.write(stats.clone().into_record(regime, episode));

        Ok(stats)
    }

    /// Applies the zero command, tolerating a transport fault.
    fn neutral_tick<E: Env>(env: &mut E) -> Result<()> {
        let act = env.neutral_act();
        match env.step(&act) {
            Err(e) if SwingupError::is_recoverable_error(&e) => {
                warn!("Zero command was not acknowledged: {}", e);
                Ok(())
            }
            res => res,
        }
    }
}
