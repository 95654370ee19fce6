use std::{
    io,
    ops::ControlFlow,
    sync::mpsc::{self, Sender},
    thread::{self, JoinHandle},
};

use crate::{
    algo::tabular::q_learning::StepReport,
    gym::{smartcab::Snapshot, Smartcab},
    sim::{Observer, TrialSummary},
};

pub use app::App;

mod app;
mod components;
mod tui;
mod util;

/// Names of the per-trial metrics, in the order of [`Update::Trial`] data
pub const TRIAL_METRICS: [&str; 5] = ["reward", "steps", "reached", "explored", "epsilon"];

/// Message from the simulation thread to the TUI
pub enum Update {
    /// The world after one step of the learning car
    Step {
        snapshot: Snapshot,
        report: StepReport,
    },
    /// Metrics of a finished trial, see [`TRIAL_METRICS`]
    Trial { trial: u32, data: Vec<f64> },
}

/// Spawn the TUI on its own thread
///
/// **Returns** the thread handle and the sender used to feed it updates
pub fn init(trials: u32) -> (JoinHandle<io::Result<()>>, Sender<Update>) {
    let (tx, rx) = mpsc::channel();
    let handle = thread::spawn(move || App::new(&TRIAL_METRICS, trials).run(rx));
    (handle, tx)
}

/// Forwards simulation progress to the TUI
///
/// Stops the run once the TUI has quit and dropped its receiver.
pub struct VizObserver {
    tx: Sender<Update>,
}

impl VizObserver {
    pub fn new(tx: Sender<Update>) -> Self {
        Self { tx }
    }
}

impl Observer<Smartcab> for VizObserver {
    fn on_step(&mut self, env: &Smartcab, report: &StepReport) -> ControlFlow<()> {
        let update = Update::Step {
            snapshot: env.snapshot(),
            report: *report,
        };
        match self.tx.send(update) {
            Ok(()) => ControlFlow::Continue(()),
            Err(_) => ControlFlow::Break(()),
        }
    }

    fn on_trial(&mut self, summary: &TrialSummary) -> ControlFlow<()> {
        let update = Update::Trial {
            trial: summary.trial,
            data: vec![
                summary.total_reward,
                summary.steps as f64,
                if summary.reached { 1.0 } else { 0.0 },
                summary.explored as f64,
                summary.epsilon,
            ],
        };
        match self.tx.send(update) {
            Ok(()) => ControlFlow::Continue(()),
            Err(_) => ControlFlow::Break(()),
        }
    }
}
