use anyhow::Result;
use std::{
    path::Path,
    sync::{Arc, Mutex},
};
use swingup_core::{
    record::{BufferedRecorder, NullRecorder},
    Act, Agent, DefaultEvaluator, Env, Evaluator, Mode, Obs, Policy, Regime, SwingupError,
    Trainer, TrainerConfig,
};

#[derive(Clone, Debug, PartialEq)]
struct LineObs(f64);

impl Obs for LineObs {
    fn len(&self) -> usize {
        1
    }
}

#[derive(Clone, Debug, PartialEq)]
struct LineAct(f64);

impl Act for LineAct {
    fn len(&self) -> usize {
        1
    }
}

#[derive(Clone, Default)]
struct LineConfig {
    /// Ticks (1-based, counted over the lifetime of the env) failing with a transport fault.
    fault_ticks: Vec<usize>,
    /// Tick failing with a fatal error.
    fatal_tick: Option<usize>,
    /// Sets the flag after the given number of ticks.
    stop_after: Option<(usize, Arc<Mutex<bool>>)>,
}

/// A point moving on a line by the commanded amount.
struct LineEnv {
    config: LineConfig,
    pos: f64,
    ticks: usize,
    commands: Vec<f64>,
    closed: bool,
}

impl Env for LineEnv {
    type Config = LineConfig;
    type Obs = LineObs;
    type Act = LineAct;

    fn build(config: &Self::Config) -> Result<Self> {
        Ok(Self {
            config: config.clone(),
            pos: 0.0,
            ticks: 0,
            commands: vec![],
            closed: false,
        })
    }

    fn reset(&mut self) -> Result<()> {
        self.pos = 0.0;
        Ok(())
    }

    fn state(&self) -> LineObs {
        LineObs(self.pos)
    }

    fn step(&mut self, a: &LineAct) -> Result<()> {
        self.ticks += 1;
        self.commands.push(a.0);
        if let Some((n, stop)) = &self.config.stop_after {
            if self.ticks >= *n {
                *stop.lock().unwrap() = true;
            }
        }
        if self.config.fatal_tick == Some(self.ticks) {
            anyhow::bail!("serial port vanished");
        }
        if self.config.fault_ticks.contains(&self.ticks) {
            return Err(SwingupError::TransportFault("checksum".into()).into());
        }
        self.pos += a.0;
        Ok(())
    }

    fn neutral_act(&self) -> LineAct {
        LineAct(0.0)
    }

    fn is_finish_up(&self, obs: &LineObs) -> bool {
        obs.0 >= 3.0
    }

    fn is_finish_down(&self, _obs: &LineObs) -> bool {
        false
    }

    fn reward_up(&self, obs: &LineObs) -> f64 {
        obs.0
    }

    fn reward_down(&self, obs: &LineObs) -> f64 {
        -obs.0
    }

    fn close(&mut self) -> Result<()> {
        self.closed = true;
        Ok(())
    }
}

/// Always pushes forward and remembers what it was taught.
#[derive(Default)]
struct RecordingAgent {
    train: bool,
    resets: usize,
    learned: Vec<(f64, f64, f64, f64)>,
    load_error: Option<fn(&Path) -> SwingupError>,
}

impl Policy<LineEnv> for RecordingAgent {
    fn sample(&mut self, _obs: &LineObs) -> LineAct {
        LineAct(1.0)
    }
}

impl Agent<LineEnv> for RecordingAgent {
    fn train(&mut self) {
        self.train = true;
    }

    fn eval(&mut self) {
        self.train = false;
    }

    fn is_train(&self) -> bool {
        self.train
    }

    fn reset(&mut self) {
        self.resets += 1;
    }

    fn learn(
        &mut self,
        obs: &LineObs,
        act: &LineAct,
        reward: f64,
        next_obs: &LineObs,
        _next_act: &LineAct,
    ) -> Result<()> {
        self.learned.push((obs.0, act.0, reward, next_obs.0));
        Ok(())
    }

    fn save_params(&self, _path: &Path) -> Result<()> {
        Ok(())
    }

    fn load_params(&mut self, path: &Path) -> Result<()> {
        match self.load_error {
            Some(f) => Err(f(path).into()),
            None => Ok(()),
        }
    }
}

/// Counts saves through interior state, since `save_params` takes `&self`.
struct SaveCountingAgent {
    inner: RecordingAgent,
    saves: std::cell::Cell<usize>,
}

impl Policy<LineEnv> for SaveCountingAgent {
    fn sample(&mut self, obs: &LineObs) -> LineAct {
        self.inner.sample(obs)
    }
}

impl Agent<LineEnv> for SaveCountingAgent {
    fn train(&mut self) {}
    fn eval(&mut self) {}
    fn is_train(&self) -> bool {
        true
    }
    fn learn(&mut self, _: &LineObs, _: &LineAct, _: f64, _: &LineObs, _: &LineAct) -> Result<()> {
        Ok(())
    }
    fn save_params(&self, _path: &Path) -> Result<()> {
        self.saves.set(self.saves.get() + 1);
        Ok(())
    }
    fn load_params(&mut self, _path: &Path) -> Result<()> {
        Ok(())
    }
}

fn absent(path: &Path) -> SwingupError {
    SwingupError::PersistenceAbsent(path.to_path_buf())
}

fn corrupt(path: &Path) -> SwingupError {
    SwingupError::PersistenceCorrupt {
        path: path.to_path_buf(),
        reason: "truncated".into(),
    }
}

fn trainer(config: TrainerConfig) -> (Trainer, Arc<Mutex<bool>>) {
    let stop = Arc::new(Mutex::new(false));
    (Trainer::build(config, stop.clone()).unwrap(), stop)
}

#[test]
fn test_termination_is_checked_one_tick_late() -> Result<()> {
    let (mut trainer, _) = trainer(TrainerConfig::default().max_steps_up(100));
    let mut env = LineEnv::build(&LineConfig::default())?;
    let mut agent = RecordingAgent::default();

    let stats = trainer.run_episode(&mut env, &mut agent, Regime::Up, 1, &mut NullRecorder {})?;

    // The predicate first holds at position 3, the transition into 4 is still learned.
    assert!(stats.finished);
    assert_eq!(stats.steps, 4);
    assert_eq!(
        agent.learned,
        vec![
            (0.0, 1.0, 1.0, 1.0),
            (1.0, 1.0, 2.0, 2.0),
            (2.0, 1.0, 3.0, 3.0),
            (3.0, 1.0, 4.0, 4.0),
        ]
    );
    // initial reward plus the rewards of the first three transitions
    assert_eq!(stats.returns, 0.0 + 1.0 + 2.0 + 3.0);
    assert_eq!(agent.resets, 1);
    // Last command is the zero command.
    assert_eq!(env.commands, vec![1.0, 1.0, 1.0, 1.0, 0.0]);
    Ok(())
}

#[test]
fn test_max_steps_bounds_episode() -> Result<()> {
    let (mut trainer, _) = trainer(TrainerConfig::default().max_steps_down(5));
    let mut env = LineEnv::build(&LineConfig::default())?;
    let mut agent = RecordingAgent::default();

    let stats =
        trainer.run_episode(&mut env, &mut agent, Regime::Down, 1, &mut NullRecorder {})?;

    assert!(!stats.finished);
    assert_eq!(stats.steps, 5);
    assert_eq!(agent.learned.len(), 5);
    assert_eq!(env.commands.len(), 6);
    Ok(())
}

#[test]
fn test_zero_max_steps_only_sends_zero_command() -> Result<()> {
    let (mut trainer, _) = trainer(TrainerConfig::default().max_steps_down(0));
    let mut env = LineEnv::build(&LineConfig::default())?;
    let mut agent = RecordingAgent::default();

    let stats =
        trainer.run_episode(&mut env, &mut agent, Regime::Down, 1, &mut NullRecorder {})?;

    assert_eq!(stats.steps, 0);
    assert!(agent.learned.is_empty());
    assert_eq!(env.commands, vec![0.0]);
    Ok(())
}

#[test]
fn test_transport_faults_skip_ticks() -> Result<()> {
    let (mut trainer, _) = trainer(TrainerConfig::default().max_steps_down(6));
    let mut env = LineEnv::build(&LineConfig {
        fault_ticks: vec![2, 3, 7],
        ..Default::default()
    })?;
    let mut agent = RecordingAgent::default();

    let stats =
        trainer.run_episode(&mut env, &mut agent, Regime::Down, 1, &mut NullRecorder {})?;

    assert_eq!(stats.steps, 6);
    assert_eq!(stats.faults, 2);
    // Skipped ticks leave the state untouched, so learning resumes from it.
    assert_eq!(
        agent.learned.iter().map(|t| t.0).collect::<Vec<_>>(),
        vec![0.0, 1.0, 2.0, 3.0]
    );
    // The zero command on tick 7 faulted as well but the episode still completes.
    assert_eq!(env.commands.len(), 7);
    Ok(())
}

#[test]
fn test_fatal_error_propagates() -> Result<()> {
    let (mut trainer, _) = trainer(TrainerConfig::default().max_steps_down(10));
    let mut env = LineEnv::build(&LineConfig {
        fatal_tick: Some(3),
        ..Default::default()
    })?;
    let mut agent = RecordingAgent::default();

    let res = trainer.run_episode(&mut env, &mut agent, Regime::Down, 1, &mut NullRecorder {});
    assert!(res.is_err());
    assert_eq!(agent.learned.len(), 2);
    Ok(())
}

#[test]
fn test_unbounded_episode_runs_until_stopped() -> Result<()> {
    let (mut trainer, stop) = trainer(
        TrainerConfig::default()
            .mode(Mode::Down)
            .max_episodes(-1)
            .max_steps_down(-1),
    );
    let mut env = LineEnv::build(&LineConfig {
        stop_after: Some((50, stop)),
        ..Default::default()
    })?;
    let mut up = RecordingAgent::default();
    let mut down = RecordingAgent::default();
    let mut recorder = BufferedRecorder::new();

    let episodes = trainer.train(&mut env, &mut up, &mut down, &mut recorder)?;

    assert!(trainer.is_stopped());
    assert_eq!(episodes, 1);
    assert_eq!(down.learned.len(), 50);
    assert!(up.learned.is_empty());
    assert_eq!(recorder.len(), 1);
    Ok(())
}

#[test]
fn test_stopped_before_start() -> Result<()> {
    let (mut trainer, stop) = trainer(TrainerConfig::default());
    *stop.lock().unwrap() = true;
    let mut env = LineEnv::build(&LineConfig::default())?;
    let mut up = RecordingAgent::default();
    let mut down = RecordingAgent::default();

    let episodes = trainer.train(&mut env, &mut up, &mut down, &mut NullRecorder {})?;
    assert_eq!(episodes, 0);
    assert!(env.commands.is_empty());
    Ok(())
}

#[test]
fn test_up_down_alternates() -> Result<()> {
    let (mut trainer, _) = trainer(
        TrainerConfig::default()
            .mode(Mode::UpDown)
            .max_episodes(2)
            .max_steps_up(10)
            .max_steps_down(3),
    );
    let mut env = LineEnv::build(&LineConfig::default())?;
    let mut up = RecordingAgent::default();
    let mut down = RecordingAgent::default();
    let mut recorder = BufferedRecorder::new();

    let episodes = trainer.train(&mut env, &mut up, &mut down, &mut recorder)?;

    assert_eq!(episodes, 2);
    assert!(up.is_train() && down.is_train());
    assert_eq!(up.resets, 2);
    assert_eq!(down.resets, 2);
    let regimes = recorder
        .iter()
        .map(|r| r.get_string("regime").unwrap())
        .collect::<Vec<_>>();
    assert_eq!(regimes, vec!["up", "down", "up", "down"]);
    let episodes = recorder
        .iter()
        .map(|r| r.get_scalar("episode").unwrap())
        .collect::<Vec<_>>();
    assert_eq!(episodes, vec![0.0, 0.0, 1.0, 1.0]);
    Ok(())
}

#[test]
fn test_save_interval() -> Result<()> {
    for (interval, expected) in [(2, 3), (-1, 5), (10, 1)] {
        let (mut trainer, _) = trainer(
            TrainerConfig::default()
                .mode(Mode::Down)
                .max_episodes(5)
                .max_steps_down(2)
                .save_interval(interval),
        );
        let mut env = LineEnv::build(&LineConfig::default())?;
        let mut up = SaveCountingAgent {
            inner: RecordingAgent::default(),
            saves: 0.into(),
        };
        let mut down = SaveCountingAgent {
            inner: RecordingAgent::default(),
            saves: 0.into(),
        };

        trainer.train(&mut env, &mut up, &mut down, &mut NullRecorder {})?;
        assert_eq!(down.saves.get(), expected, "save_interval {}", interval);
        assert_eq!(up.saves.get(), 0);
    }
    Ok(())
}

#[test]
fn test_load_agents() -> Result<()> {
    let (trainer, _) = trainer(TrainerConfig::default());

    let mut up = RecordingAgent {
        load_error: Some(absent as fn(&Path) -> SwingupError),
        ..Default::default()
    };
    let mut down = RecordingAgent::default();
    trainer.load_agents::<LineEnv, _>(&mut up, &mut down)?;

    let mut down = RecordingAgent {
        load_error: Some(corrupt as fn(&Path) -> SwingupError),
        ..Default::default()
    };
    assert!(trainer.load_agents::<LineEnv, _>(&mut up, &mut down).is_err());
    Ok(())
}

#[test]
fn test_evaluator_does_not_learn() -> Result<()> {
    let mut env = LineEnv::build(&LineConfig::default())?;
    let mut agent = RecordingAgent::default();
    agent.eval();

    let mut evaluator = DefaultEvaluator::new(Regime::Up, 2, 100)?;
    let record = evaluator.evaluate(&mut env, &mut agent)?;

    assert!(agent.learned.is_empty());
    // 1 + 2 + 3 per episode, ending when the predicate holds
    assert_eq!(record.get_scalar("Episode return")?, 6.0);
    assert_eq!(record.get_scalar("Episodes")?, 2.0);
    assert!(DefaultEvaluator::new(Regime::Up, 0, 100).is_err());
    Ok(())
}

#[test]
fn test_evaluator_stops_unbounded_episode() -> Result<()> {
    let stop = Arc::new(Mutex::new(false));
    let config = LineConfig {
        stop_after: Some((5, stop.clone())),
        ..Default::default()
    };
    let mut env = LineEnv::build(&config)?;
    let mut agent = RecordingAgent::default();
    agent.eval();

    // Balance-down never finishes on the line
    let record = DefaultEvaluator::new(Regime::Down, 3, usize::MAX)?
        .stop(stop)
        .evaluate(&mut env, &mut agent)?;

    assert_eq!(record.get_scalar("Episodes")?, 1.0);
    assert_eq!(env.commands, vec![1.0, 1.0, 1.0, 1.0, 1.0, 0.0]);
    Ok(())
}

#[test]
fn test_evaluator_stopped_before_start() -> Result<()> {
    let mut env = LineEnv::build(&LineConfig::default())?;
    let mut agent = RecordingAgent::default();

    let record = DefaultEvaluator::new(Regime::Up, 2, 100)?
        .stop(Arc::new(Mutex::new(true)))
        .evaluate(&mut env, &mut agent)?;

    assert_eq!(record.get_scalar("Episodes")?, 0.0);
    assert!(record.get_scalar("Episode return").is_err());
    assert!(env.commands.is_empty());
    Ok(())
}
