use log::{debug, trace};
use rand::{rngs::StdRng, SeedableRng};
use strum::{Display, EnumString};

use crate::{
    decay::{self, Decay},
    ensure_interval,
    env::{Action, Environment, Percept},
    error::Result,
    exploration::{Choice, EpsilonGreedy},
    memory::{Transition, TransitionMemory},
    state::{self, StateKey},
};

use super::q_table::{ActionValues, QTable};

/// How a pending transition is folded into its value
#[derive(Display, EnumString, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[strum(serialize_all = "kebab-case")]
pub enum UpdateRule {
    /// Q ← (1 − α)·Q + α·(r + γ·max Q(s′))
    #[default]
    Blended,
    /// Q ← r + γ·max Q(s′), the learning rate is ignored
    Bootstrap,
}

/// What happens to the transition memory when a trial ends
#[derive(Display, EnumString, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[strum(serialize_all = "kebab-case")]
pub enum EpisodeBoundary {
    /// The last transition of a trial is updated toward its reward alone, with no
    /// successor value, and the memory is cleared so the next trial starts unprimed
    #[default]
    Terminal,
    /// The memory survives the boundary and the last transition of a trial is
    /// bootstrapped off the first state of the next one
    CarryOver,
}

/// Configuration for the [`QLearner`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QLearnerConfig {
    /// Learning rate, must be in `[0,1]`
    ///
    /// **Default**: `0.5`
    pub alpha: f64,
    /// Discount factor, must be in `[0,1]`
    ///
    /// **Default**: `0.3`
    pub gamma: f64,
    /// **Default**: [`UpdateRule::Blended`]
    pub rule: UpdateRule,
    /// **Default**: [`EpisodeBoundary::Terminal`]
    pub boundary: EpisodeBoundary,
}

impl Default for QLearnerConfig {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            gamma: 0.3,
            rule: UpdateRule::default(),
            boundary: EpisodeBoundary::default(),
        }
    }
}

/// One-step temporal-difference learner over a [`QTable`]
///
/// The learner is EMPTY until the first transition is committed, and PRIMED from then
/// on. While primed, each call to [`learn`](QLearner::learn) updates the remembered
/// state-action pair using the best value of the state that followed it.
#[derive(Debug, Clone)]
pub struct QLearner {
    q_table: QTable,
    memory: TransitionMemory,
    alpha: f64,
    gamma: f64,
    rule: UpdateRule,
    boundary: EpisodeBoundary,
}

impl QLearner {
    /// **Errors** if `alpha` or `gamma` is not in the interval `[0,1]`
    pub fn new(config: QLearnerConfig) -> Result<Self> {
        ensure_interval!(config.alpha, 0.0, 1.0, "alpha");
        ensure_interval!(config.gamma, 0.0, 1.0, "gamma");
        Ok(Self {
            q_table: QTable::new(),
            memory: TransitionMemory::new(),
            alpha: config.alpha,
            gamma: config.gamma,
            rule: config.rule,
            boundary: config.boundary,
        })
    }

    pub fn q_table(&self) -> &QTable {
        &self.q_table
    }

    pub fn memory(&self) -> &TransitionMemory {
        &self.memory
    }

    pub fn rule(&self) -> UpdateRule {
        self.rule
    }

    /// Visit a state, creating its row if needed
    ///
    /// **Returns** a snapshot of the row, taken before any update of this step
    pub fn observe(&mut self, state: StateKey) -> ActionValues {
        *self.q_table.get_or_create(state)
    }

    fn blend(&self, q: f64, target: f64) -> f64 {
        match self.rule {
            UpdateRule::Blended => (1.0 - self.alpha) * q + self.alpha * target,
            UpdateRule::Bootstrap => target,
        }
    }

    fn update(&mut self, prev: Transition, target: f64) -> Result<f64> {
        let q = self.q_table.read(&prev.state, prev.action)?;
        let updated = self.blend(q, target);
        self.q_table.write(&prev.state, prev.action, updated)?;
        trace!(
            "Q({}, {}) {q:.4} -> {updated:.4} (target {target:.4})",
            prev.state,
            prev.action
        );
        Ok(updated)
    }

    /// Apply the pending update given the best value of the state just reached
    ///
    /// Does nothing while the learner is empty.
    ///
    /// **Returns** the updated value, if an update happened
    pub fn learn(&mut self, next_best: f64) -> Result<Option<f64>> {
        let Some(prev) = self.memory.peek().copied() else {
            return Ok(None);
        };
        let target = prev.reward + self.gamma * next_best;
        self.update(prev, target).map(Some)
    }

    /// Remember the transition of the current step for the next update
    pub fn commit(&mut self, transition: Transition) {
        self.memory.record(transition);
    }

    /// Give up on a trial that was cut short, without learning from its last move
    ///
    /// Under [`EpisodeBoundary::Terminal`] the pending transition is dropped, so nothing
    /// bootstraps across into the next trial. [`EpisodeBoundary::CarryOver`] keeps it, as at
    /// any other boundary.
    pub fn abort_trial(&mut self) {
        if self.boundary == EpisodeBoundary::Terminal {
            self.memory.clear();
        }
    }

    /// Close the current trial according to the configured [`EpisodeBoundary`]
    ///
    /// **Returns** the updated value, if the pending transition was closed
    pub fn end_trial(&mut self) -> Result<Option<f64>> {
        match self.boundary {
            EpisodeBoundary::CarryOver => Ok(None),
            EpisodeBoundary::Terminal => match self.memory.take() {
                Some(prev) => self.update(prev, prev.reward).map(Some),
                None => Ok(None),
            },
        }
    }
}

/// Outcome of a single agent step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepReport {
    pub deadline: i32,
    pub percept: Percept,
    pub state: StateKey,
    pub action: Action,
    pub choice: Choice,
    pub reward: f64,
}

/// Configuration for the [`LearningAgent`]
#[derive(Debug, Clone)]
pub struct AgentConfig<D: Decay> {
    pub learner: QLearnerConfig,
    pub exploration: EpsilonGreedy<D>,
    /// Seed of the agent's random source, drawn from the OS if `None`
    pub seed: Option<u64>,
}

impl Default for AgentConfig<decay::Constant> {
    fn default() -> Self {
        Self {
            learner: QLearnerConfig::default(),
            exploration: EpsilonGreedy::default(),
            seed: None,
        }
    }
}

/// A Q-learning agent that learns to drive from the rewards of its moves
///
/// Learned values persist across trials for the whole life of the agent.
#[derive(Debug, Clone)]
pub struct LearningAgent<D: Decay = decay::Constant> {
    learner: QLearner,
    exploration: EpsilonGreedy<D>,
    rng: StdRng,
    trial: u32,
}

impl<D: Decay> LearningAgent<D> {
    /// **Errors** if a hyperparameter is out of range
    pub fn new(config: AgentConfig<D>) -> Result<Self> {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Ok(Self {
            learner: QLearner::new(config.learner)?,
            exploration: config.exploration,
            rng,
            trial: 0,
        })
    }

    pub fn learner(&self) -> &QLearner {
        &self.learner
    }

    pub fn q_table(&self) -> &QTable {
        self.learner.q_table()
    }

    /// Index of the current trial
    pub fn trial(&self) -> u32 {
        self.trial
    }

    /// Current exploration threshold
    pub fn epsilon(&self) -> f64 {
        self.exploration.epsilon(self.trial)
    }

    /// Sense, act, and learn for one time step
    ///
    /// The row of the new state is read once, before anything is written. The policy picks
    /// from that snapshot and the pending update bootstraps off its maximum, so the update
    /// never sees values changed within the same step.
    pub fn step<E: Environment + ?Sized>(&mut self, env: &mut E) -> Result<StepReport> {
        let waypoint = env.next_waypoint();
        let percept = env.sense();
        let deadline = env.deadline();

        let state = state::encode(&percept, waypoint);
        let row = self.learner.observe(state);

        let selection = self.exploration.choose(self.trial, &row, &mut self.rng)?;
        let reward = env.act(selection.action);

        self.learner.learn(row.max())?;
        self.learner.commit(Transition {
            state,
            action: selection.action,
            reward,
        });

        debug!(
            "LearningAgent.update(): deadline = {deadline}, inputs = {percept}, action = {}, reward = {reward}",
            selection.action
        );

        Ok(StepReport {
            deadline,
            percept,
            state,
            action: selection.action,
            choice: selection.choice,
            reward,
        })
    }

    /// Abandon the current trial midway
    ///
    /// The trial counter is left as is, so the next trial reuses its index.
    pub fn abort_trial(&mut self) {
        self.learner.abort_trial();
    }

    /// Close the current trial and move on to the next
    pub fn end_trial(&mut self) -> Result<()> {
        self.learner.end_trial()?;
        self.trial += 1;
        Ok(())
    }
}
