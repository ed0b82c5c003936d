//! Evaluate [`Agent`].
use crate::{
    record::{Record, RecordValue},
    Agent, Env, Regime, SwingupError,
};
use anyhow::Result;
use log::{info, warn};
use std::sync::{Arc, Mutex};

/// Evaluate [`Agent`].
pub trait Evaluator<E: Env> {
    /// Evaluate [`Agent`].
    ///
    /// The caller of this method needs to handle the internal state of `agent`,
    /// like training/evaluation mode.
    fn evaluate<A>(&mut self, env: &mut E, agent: &mut A) -> Result<Record>
    where
        A: Agent<E>;
}

/// Runs a fixed number of episodes of one regime without learning and
/// reports the average return as `"Episode return"` and the number of
/// episodes run as `"Episodes"`.
///
/// Episodes end on the termination predicate or after `max_steps` ticks.
/// Ticks lost to transport faults count against the limit.
///
/// The stop flag is polled between ticks and between episodes. A stopped
/// evaluation reports the episodes run so far, the interrupted one included,
/// and omits `"Episode return"` if none was started.
pub struct DefaultEvaluator {
    n_episodes: usize,
    regime: Regime,
    max_steps: usize,
    stop: Arc<Mutex<bool>>,
}

impl DefaultEvaluator {
    /// Constructs a new [`DefaultEvaluator`].
    pub fn new(regime: Regime, n_episodes: usize, max_steps: usize) -> Result<Self> {
        if n_episodes == 0 {
            return Err(SwingupError::Configuration(
                "evaluation needs at least one episode".to_string(),
            )
            .into());
        }
        Ok(Self {
            n_episodes,
            regime,
            max_steps,
            stop: Arc::new(Mutex::new(false)),
        })
    }

    /// Shares a stop flag with the caller.
    pub fn stop(mut self, stop: Arc<Mutex<bool>>) -> Self {
        self.stop = stop;
        self
    }

    fn is_stopped(&self) -> bool {
        self.stop.lock().map(|stop| *stop).unwrap_or(true)
    }
}

impl<E: Env> Evaluator<E> for DefaultEvaluator {
    fn evaluate<A>(&mut self, env: &mut E, agent: &mut A) -> Result<Record>
    where
        A: Agent<E>,
    {
        let mut r_total = 0f64;
        let mut n_run = 0usize;

        for ix in 0..self.n_episodes {
            if self.is_stopped() {
                info!("Evaluation {} stopped after {} episodes", self.regime, n_run);
                break;
            }
            env.reset()?;
            agent.reset();
            let mut r_episode = 0f64;

            for _ in 0..self.max_steps {
                if self.is_stopped() {
                    break;
                }
                let act = agent.sample(&env.state());
                match env.step(&act) {
                    Err(e) if SwingupError::is_recoverable_error(&e) => {
                        warn!("Evaluation tick skipped: {}", e);
                        continue;
                    }
                    res => res?,
                }
                let obs = env.state();
                r_episode += env.reward(self.regime, &obs);
                if env.is_finish(self.regime, &obs) {
                    break;
                }
            }

            let act = env.neutral_act();
            if let Err(e) = env.step(&act) {
                if !SwingupError::is_recoverable_error(&e) {
                    return Err(e);
                }
            }
            info!("Evaluation {} episode {}: return {}", self.regime, ix, r_episode);
            r_total += r_episode;
            n_run += 1;
        }

        let mut record = Record::from_scalar("Episodes", n_run as f32);
        if n_run > 0 {
            let r_mean = r_total / n_run as f64;
            record.insert("Episode return", RecordValue::Scalar(r_mean as f32));
        }
        Ok(record)
    }
}
