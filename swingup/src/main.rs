mod config;
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use config::SwingupConfig;
use log::{info, warn};
use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
    thread,
};
use swingup_core::{
    record::{LogRecorder, RecordValue, Recorder},
    Agent, Configurable, DefaultEvaluator, Env, Evaluator, Mode, Regime, SwingupError, Trainer,
};
use swingup_env::PendulumEnv;
use swingup_qlearning::QLearning;

type Q = QLearning<PendulumEnv>;

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
    UpDown,
    Up,
    Down,
}

impl From<ModeArg> for Mode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::UpDown => Mode::UpDown,
            ModeArg::Up => Mode::Up,
            ModeArg::Down => Mode::Down,
        }
    }
}

/// Learn to swing up and balance down a pendulum with tabular Q-learning
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// YAML configuration file
    config: PathBuf,

    /// Overrides the mode in the configuration file
    #[arg(short, long, value_enum)]
    mode: Option<ModeArg>,

    /// Evaluate the saved agents, not train
    #[arg(short, long, default_value_t = false)]
    eval: bool,

    /// Number of evaluation episodes per regime
    #[arg(short = 'n', long, default_value_t = 5)]
    episodes: usize,
}

fn build_agents(config: &SwingupConfig, env: &PendulumEnv) -> Result<(Q, Q)> {
    let agent_up = Q::build(config.agent_up.clone()).context("swing-up agent")?;
    let agent_down = Q::build(config.agent_down.clone()).context("balance-down agent")?;

    let dim = env.state().as_ref().len();
    for (name, agent) in [("swing-up", &agent_up), ("balance-down", &agent_down)] {
        if agent.state_dim() != dim {
            return Err(anyhow::Error::new(SwingupError::DimensionMismatch {
                expected: dim,
                actual: agent.state_dim(),
            })
            .context(format!("{} agent buckets do not match the state", name)));
        }
    }
    Ok((agent_up, agent_down))
}

fn train(config: &SwingupConfig, env: &mut PendulumEnv, stop: Arc<Mutex<bool>>) -> Result<()> {
    let mut trainer = Trainer::build(config.trainer.clone(), stop)?;
    let (mut agent_up, mut agent_down) = build_agents(config, env)?;
    let mut recorder = LogRecorder::default();

    trainer.load_agents::<PendulumEnv, _>(&mut agent_up, &mut agent_down)?;
    trainer.train(env, &mut agent_up, &mut agent_down, &mut recorder)?;
    Ok(())
}

fn eval(
    config: &SwingupConfig,
    env: &mut PendulumEnv,
    n_episodes: usize,
    stop: Arc<Mutex<bool>>,
) -> Result<()> {
    let trainer = Trainer::build(config.trainer.clone(), stop.clone())?;
    let (mut agent_up, mut agent_down) = build_agents(config, env)?;
    let mut recorder = LogRecorder::default();

    trainer.load_agents::<PendulumEnv, _>(&mut agent_up, &mut agent_down)?;
    for &regime in config.trainer.mode.regimes() {
        if trainer.is_stopped() {
            break;
        }
        let agent = match regime {
            Regime::Up => &mut agent_up,
            Regime::Down => &mut agent_down,
        };
        agent.eval();

        // Unbounded episodes still end on the termination predicate
        let max_steps = usize::try_from(config.trainer.max_steps(regime)).unwrap_or(usize::MAX);
        let mut record = DefaultEvaluator::new(regime, n_episodes, max_steps)?
            .stop(stop.clone())
            .evaluate(env, agent)?;
        record.insert("regime", RecordValue::String(regime.to_string()));
        recorder.write(record);
    }
    Ok(())
}

fn run(
    args: &Args,
    config: &SwingupConfig,
    env: &mut PendulumEnv,
    stop: Arc<Mutex<bool>>,
) -> Result<()> {
    if args.eval {
        eval(config, env, args.episodes, stop)
    } else {
        train(config, env, stop)
    }
}

/// Sets `stop` on Ctrl-C.
fn stop_on_ctrl_c(stop: Arc<Mutex<bool>>) -> Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    thread::spawn(move || {
        rt.block_on(async {
            match tokio::signal::ctrl_c().await {
                Ok(()) => {
                    info!("Interrupted, stopping at the next tick");
                    if let Ok(mut stop) = stop.lock() {
                        *stop = true;
                    }
                }
                Err(e) => warn!("Cannot listen for Ctrl-C: {}", e),
            }
        })
    });
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut config = SwingupConfig::load(&args.config)
        .with_context(|| format!("cannot load {:?}", args.config))?;
    if let Some(mode) = args.mode {
        config.trainer.mode = mode.into();
    }

    let stop = Arc::new(Mutex::new(false));
    stop_on_ctrl_c(stop.clone())?;

    let mut env = PendulumEnv::build(&config.env)?;
    let res = run(&args, &config, &mut env, stop);
    match env.close() {
        Ok(()) => info!("Closed the environment"),
        Err(e) => warn!("Cannot close the environment: {:#}", e),
    }
    res
}
