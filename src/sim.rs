use std::{ops::ControlFlow, thread, time::Duration};

use log::info;

use crate::{
    algo::tabular::q_learning::{LearningAgent, StepReport},
    decay::Decay,
    env::Environment,
    error::Result,
    exploration::Choice,
};

/// Outcome of one trial
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrialSummary {
    pub trial: u32,
    pub steps: u32,
    pub total_reward: f64,
    /// Steps on which the action was drawn at random
    pub explored: u32,
    pub reached: bool,
    /// Deadline left when the trial ended
    pub deadline: i32,
    /// Exploration threshold in force during the trial
    pub epsilon: f64,
}

/// Outcome of a whole run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunSummary {
    pub trials: u32,
    pub successes: u32,
    /// Number of distinct states the agent has values for
    pub states_learned: usize,
}

impl RunSummary {
    pub fn success_rate(&self) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            self.successes as f64 / self.trials as f64
        }
    }
}

/// Receives progress of a run as it happens
///
/// Returning [`ControlFlow::Break`] stops the run after the current step.
pub trait Observer<E: Environment> {
    fn on_step(&mut self, _env: &E, _report: &StepReport) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }

    fn on_trial(&mut self, _summary: &TrialSummary) -> ControlFlow<()> {
        ControlFlow::Continue(())
    }
}

/// An observer that ignores everything
pub struct Silent;

impl<E: Environment> Observer<E> for Silent {}

/// Configuration for the [`Simulator`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimConfig {
    /// Pause between time steps
    ///
    /// **Default**: no pause
    pub update_delay: Duration,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            update_delay: Duration::ZERO,
        }
    }
}

/// Drives a [`LearningAgent`] through consecutive trials of an [`Environment`]
///
/// Each time step ticks the world, then lets the agent sense, act, and learn. The agent's
/// values persist from one trial to the next.
pub struct Simulator {
    config: SimConfig,
}

impl Simulator {
    pub fn new(config: SimConfig) -> Self {
        Self { config }
    }

    /// Run a single trial to completion
    ///
    /// **Returns** the summary, or `None` if the observer stopped the run midway, in which
    /// case the trial is abandoned without closing its last transition
    pub fn run_trial<E, D, O>(
        &self,
        agent: &mut LearningAgent<D>,
        env: &mut E,
        observer: &mut O,
    ) -> Result<Option<TrialSummary>>
    where
        E: Environment,
        D: Decay,
        O: Observer<E>,
    {
        let trial = agent.trial();
        env.reset();

        let mut summary = TrialSummary {
            trial,
            steps: 0,
            total_reward: 0.0,
            explored: 0,
            reached: false,
            deadline: env.deadline(),
            epsilon: agent.epsilon(),
        };

        while !env.is_done() {
            env.tick();
            let report = agent.step(env)?;

            summary.steps += 1;
            summary.total_reward += report.reward;
            if report.choice == Choice::Explore {
                summary.explored += 1;
            }

            if observer.on_step(env, &report).is_break() {
                agent.abort_trial();
                return Ok(None);
            }
            if !self.config.update_delay.is_zero() {
                thread::sleep(self.config.update_delay);
            }
        }

        agent.end_trial()?;
        summary.reached = env.reached_destination();
        summary.deadline = env.deadline();

        info!(
            "Trial {} {} after {} steps, reward = {:.1}, deadline = {}, epsilon = {:.3}",
            trial,
            if summary.reached { "reached destination" } else { "timed out" },
            summary.steps,
            summary.total_reward,
            summary.deadline,
            summary.epsilon,
        );

        Ok(Some(summary))
    }

    /// Run `n_trials` trials, stopping early if the observer asks to
    pub fn run<E, D, O>(
        &self,
        agent: &mut LearningAgent<D>,
        env: &mut E,
        n_trials: u32,
        observer: &mut O,
    ) -> Result<RunSummary>
    where
        E: Environment,
        D: Decay,
        O: Observer<E>,
    {
        let mut run = RunSummary {
            trials: 0,
            successes: 0,
            states_learned: 0,
        };

        for _ in 0..n_trials {
            let Some(summary) = self.run_trial(agent, env, observer)? else {
                break;
            };
            run.trials += 1;
            if summary.reached {
                run.successes += 1;
            }
            if observer.on_trial(&summary).is_break() {
                break;
            }
        }

        run.states_learned = agent.q_table().len();
        info!(
            "Finished {} trials: {} reached the destination ({:.1}%), {} states learned",
            run.trials,
            run.successes,
            run.success_rate() * 100.0,
            run.states_learned
        );
        Ok(run)
    }
}
