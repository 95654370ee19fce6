//! Train a Q-learning smartcab in the simulated traffic world
//!
//! Runs a number of trials and prints how often the cab reached its destination.
//! Logs go to stderr, filtered by `RUST_LOG` (default `smartcab=info`), or to the
//! Logs tab of the TUI when `--display` is set.

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use smartcab::{
    algo::tabular::q_learning::{
        AgentConfig, EpisodeBoundary, LearningAgent, QLearnerConfig, UpdateRule,
    },
    decay::{self, Decay, Shape},
    exploration::EpsilonGreedy,
    gym::{Smartcab, WorldConfig},
    sim::{RunSummary, SimConfig, Simulator},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "smartcab")]
#[command(version, about = "Q-learning smartcab in a grid-world traffic simulation", long_about = None)]
struct Cli {
    /// Number of trials to run
    #[arg(long, default_value_t = 100, value_parser = clap::value_parser!(u32).range(1..))]
    trials: u32,

    /// End a trial when the deadline runs out
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    enforce_deadline: bool,

    /// Pause between time steps, in milliseconds
    #[arg(long, default_value_t = 0)]
    update_delay: u64,

    /// Show the world, plots, and logs in a terminal UI
    #[cfg(feature = "viz")]
    #[arg(long)]
    display: bool,

    /// Learning rate
    #[arg(long, default_value_t = 0.5)]
    alpha: f64,

    /// Discount factor
    #[arg(long, default_value_t = 0.3)]
    gamma: f64,

    /// Exploration probability, or its starting value when it decays
    #[arg(long, default_value_t = 0.1)]
    epsilon: f64,

    /// Decay exploration over trials: exponential, inverse-time or linear
    #[arg(long)]
    epsilon_decay: Option<Shape>,

    /// Value a decaying exploration probability settles at
    #[arg(long, default_value_t = 0.01)]
    epsilon_min: f64,

    /// Decay rate per trial
    #[arg(long, default_value_t = 0.05)]
    epsilon_rate: f64,

    /// Update rule: blended or bootstrap
    #[arg(long, default_value_t = UpdateRule::Blended)]
    rule: UpdateRule,

    /// Trial boundary handling: terminal or carry-over
    #[arg(long, default_value_t = EpisodeBoundary::Terminal)]
    boundary: EpisodeBoundary,

    /// Seed for both the agent and the world
    #[arg(long)]
    seed: Option<u64>,
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("smartcab=info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Build the agent and the world from the command line, then run every trial
fn train<D: Decay>(cli: &Cli, exploration: EpsilonGreedy<D>) -> Result<RunSummary> {
    let mut agent = LearningAgent::new(AgentConfig {
        learner: QLearnerConfig {
            alpha: cli.alpha,
            gamma: cli.gamma,
            rule: cli.rule,
            boundary: cli.boundary,
        },
        exploration,
        seed: cli.seed,
    })?;
    let mut env = Smartcab::new(WorldConfig {
        enforce_deadline: cli.enforce_deadline,
        seed: cli.seed,
        ..Default::default()
    })?;
    let sim = Simulator::new(SimConfig {
        update_delay: Duration::from_millis(cli.update_delay),
    });

    #[cfg(feature = "viz")]
    if cli.display {
        use smartcab::viz::{self, VizObserver};

        tui_logger::init_logger(log::LevelFilter::Debug)?;
        tui_logger::set_default_level(log::LevelFilter::Debug);

        let (handle, tx) = viz::init(cli.trials);
        let summary = sim.run(&mut agent, &mut env, cli.trials, &mut VizObserver::new(tx))?;
        match handle.join() {
            Ok(result) => result?,
            Err(_) => anyhow::bail!("TUI thread panicked"),
        }
        return Ok(summary);
    }

    init_tracing();
    let summary = sim.run(&mut agent, &mut env, cli.trials, &mut smartcab::sim::Silent)?;
    Ok(summary)
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let summary = match cli.epsilon_decay {
        None => train(&cli, EpsilonGreedy::new(decay::Constant::new(cli.epsilon))?)?,
        Some(shape) => {
            let schedule =
                decay::Anneal::new(shape, cli.epsilon_rate, cli.epsilon, cli.epsilon_min)?;
            train(&cli, EpsilonGreedy::new(schedule)?)?
        }
    };

    println!(
        "{} trials, {} reached the destination ({:.1}%), {} states learned",
        summary.trials,
        summary.successes,
        summary.success_rate() * 100.0,
        summary.states_learned
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let cli = Cli::try_parse_from(["smartcab"]).unwrap();
        assert_eq!(cli.trials, 100);
        assert!(cli.enforce_deadline);
        assert_eq!(cli.epsilon_decay, None);
        assert_eq!(cli.rule, UpdateRule::Blended);
        assert_eq!(cli.boundary, EpisodeBoundary::Terminal);
    }

    #[test]
    fn decaying_exploration_flags() {
        let cli = Cli::try_parse_from([
            "smartcab",
            "--epsilon",
            "1.0",
            "--epsilon-decay",
            "inverse-time",
            "--epsilon-min",
            "0.05",
            "--enforce-deadline",
            "false",
            "--boundary",
            "carry-over",
        ])
        .unwrap();
        assert_eq!(cli.epsilon_decay, Some(Shape::InverseTime));
        assert_eq!(cli.epsilon_min, 0.05);
        assert!(!cli.enforce_deadline);
        assert_eq!(cli.boundary, EpisodeBoundary::CarryOver);
    }

    #[test]
    fn rejects_unknown_values() {
        assert!(Cli::try_parse_from(["smartcab", "--epsilon-decay", "step"]).is_err());
        assert!(Cli::try_parse_from(["smartcab", "--trials", "0"]).is_err());
    }
}
