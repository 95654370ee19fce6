use rand::Rng;
use strum::VariantArray;

use crate::{
    algo::tabular::q_table::ActionValues,
    decay::{self, Decay},
    ensure_interval,
    env::Action,
    error::Result,
};

use super::Choice;

/// An action picked by the policy, along with the branch that picked it
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Selection {
    pub action: Action,
    pub choice: Choice,
}

/// Pick an action from a state's values with the epsilon greedy rule
///
/// With probability `epsilon` an action is drawn uniformly from [`Action::VARIANTS`],
/// otherwise the best valued action is returned, ties going to the first in declared order.
///
/// **Errors** with [`Error::Config`](crate::error::Error::Config) if `epsilon` is not in the interval `[0,1]`
pub fn select<R: Rng + ?Sized>(row: &ActionValues, epsilon: f64, rng: &mut R) -> Result<Selection> {
    ensure_interval!(epsilon, 0.0, 1.0);
    let selection = if rng.gen::<f64>() < epsilon {
        Selection {
            action: Action::VARIANTS[rng.gen_range(0..Action::VARIANTS.len())],
            choice: Choice::Explore,
        }
    } else {
        Selection {
            action: row.argmax(),
            choice: Choice::Exploit,
        }
    };
    Ok(selection)
}

/// Epsilon greedy exploration policy with time-decaying epsilon threshold
#[derive(Debug, Clone)]
pub struct EpsilonGreedy<D: Decay> {
    epsilon: D,
}

impl Default for EpsilonGreedy<decay::Constant> {
    /// A constant epsilon of `0.1`
    fn default() -> Self {
        Self {
            epsilon: decay::Constant::new(0.1),
        }
    }
}

impl<D: Decay> EpsilonGreedy<D> {
    /// Initialize epsilon greedy policy with a decay strategy
    ///
    /// **Errors** if the schedule starts or settles outside the interval `[0,1]`
    pub fn new(decay: D) -> Result<Self> {
        ensure_interval!(decay.evaluate(0.0), 0.0, 1.0, "epsilon");
        ensure_interval!(decay.limit(), 0.0, 1.0, "epsilon");
        Ok(Self { epsilon: decay })
    }

    /// Epsilon threshold for the given trial
    pub fn epsilon(&self, trial: u32) -> f64 {
        self.epsilon.evaluate(trial as f64)
    }

    /// Invoke epsilon greedy policy for the given trial
    pub fn choose<R: Rng + ?Sized>(
        &self,
        trial: u32,
        row: &ActionValues,
        rng: &mut R,
    ) -> Result<Selection> {
        select(row, self.epsilon(trial), rng)
    }
}
