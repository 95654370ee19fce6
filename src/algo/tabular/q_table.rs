use std::{
    collections::{hash_map, HashMap},
    ops::{Index, IndexMut},
};

use strum::VariantArray;

use crate::{
    env::Action,
    error::{Error, Result},
    state::StateKey,
};

/// Learned action values of one state, one slot per [`Action`]
///
/// A fresh row is all zeros so an unseen state biases the policy toward no action.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ActionValues {
    values: [f64; 4],
}

impl ActionValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// The largest value in the row
    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max)
    }

    /// The action with the largest value
    ///
    /// Ties go to the action declared first in [`Action::VARIANTS`].
    pub fn argmax(&self) -> Action {
        Action::VARIANTS
            .iter()
            .copied()
            .fold(Action::Wait, |best, a| {
                if self[a] > self[best] {
                    a
                } else {
                    best
                }
            })
    }

    /// Pairs of action and value in declared action order
    pub fn iter(&self) -> impl Iterator<Item = (Action, f64)> + '_ {
        Action::VARIANTS.iter().map(|&a| (a, self[a]))
    }
}

impl From<[f64; 4]> for ActionValues {
    fn from(values: [f64; 4]) -> Self {
        Self { values }
    }
}

impl Index<Action> for ActionValues {
    type Output = f64;

    fn index(&self, action: Action) -> &Self::Output {
        &self.values[action.index()]
    }
}

impl IndexMut<Action> for ActionValues {
    fn index_mut(&mut self, action: Action) -> &mut Self::Output {
        &mut self.values[action.index()]
    }
}

/// Sparse mapping from visited states to their [`ActionValues`]
///
/// Rows are created lazily on first visit, so memory stays proportional to the states
/// actually seen rather than the full cross-product of sensor readings.
#[derive(Clone, Debug, Default)]
pub struct QTable {
    rows: HashMap<StateKey, ActionValues>,
}

impl QTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the row for `state`, inserting an all-zero row if it was never visited
    pub fn get_or_create(&mut self, state: StateKey) -> &mut ActionValues {
        self.rows.entry(state).or_default()
    }

    /// Get the row for `state` if it was visited
    pub fn row(&self, state: &StateKey) -> Option<&ActionValues> {
        self.rows.get(state)
    }

    /// **Errors** with [`Error::UnknownState`] if `state` was never created
    pub fn read(&self, state: &StateKey, action: Action) -> Result<f64> {
        self.row(state)
            .map(|row| row[action])
            .ok_or(Error::UnknownState(*state))
    }

    /// Replace the value of a state-action pair
    ///
    /// The value is stored as given, no range or finiteness check is made.
    ///
    /// **Errors** with [`Error::UnknownState`] if `state` was never created
    pub fn write(&mut self, state: &StateKey, action: Action, value: f64) -> Result<()> {
        let row = self
            .rows
            .get_mut(state)
            .ok_or(Error::UnknownState(*state))?;
        row[action] = value;
        Ok(())
    }

    /// Number of visited states
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate over visited states in no meaningful order
    pub fn iter(&self) -> hash_map::Iter<'_, StateKey, ActionValues> {
        self.rows.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        env::{Heading, Light, Percept},
        state::encode,
    };

    fn state(waypoint: Heading) -> StateKey {
        encode(&Percept::clear(), waypoint)
    }

    #[test]
    fn lazy_initialization() {
        let mut table = QTable::new();
        assert!(table.is_empty());

        let s = state(Heading::Forward);
        let row = *table.get_or_create(s);
        for &action in Action::VARIANTS {
            assert_eq!(row[action], 0.0, "Fresh row is zero for {action}");
        }
        assert_eq!(table.len(), 1);

        table.get_or_create(s)[Action::Left] = 1.5;
        assert_eq!(table.get_or_create(s)[Action::Left], 1.5, "Existing row is kept");
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn read_write() {
        let mut table = QTable::new();
        let s = state(Heading::Left);
        table.get_or_create(s);

        table.write(&s, Action::Right, -0.75).unwrap();
        assert_eq!(table.read(&s, Action::Right), Ok(-0.75));
        assert_eq!(table.read(&s, Action::Wait), Ok(0.0));
    }

    #[test]
    fn unknown_state() {
        let mut table = QTable::new();
        let s = encode(
            &Percept {
                light: Light::Red,
                ..Percept::clear()
            },
            Heading::Right,
        );

        assert_eq!(table.read(&s, Action::Wait), Err(Error::UnknownState(s)));
        assert_eq!(
            table.write(&s, Action::Wait, 1.0),
            Err(Error::UnknownState(s))
        );
        assert!(table.is_empty(), "Failed write does not create a row");
    }

    #[test]
    fn argmax_tie_break() {
        let row = ActionValues::new();
        for _ in 0..10 {
            assert_eq!(row.argmax(), Action::Wait);
        }

        let row = ActionValues::from([0.0, 1.0, 1.0, -1.0]);
        assert_eq!(row.argmax(), Action::Forward, "First of the tied maxima");
        assert_eq!(row.max(), 1.0);

        let row = ActionValues::from([-2.0, -3.0, -1.0, -1.0]);
        assert_eq!(row.argmax(), Action::Left);
        assert_eq!(row.max(), -1.0);
    }
}
