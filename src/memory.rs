use crate::{env::Action, state::StateKey};

/// A single step of experience whose value update is still pending
///
/// The world exposes no transition model, so the update for `(state, action)` can only
/// be computed one step later, once the state that followed is known.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transition {
    /// The state the action was taken from
    pub state: StateKey,
    /// The action taken
    pub action: Action,
    /// The reward received for taking the action
    pub reward: f64,
}

/// Single-slot buffer holding the most recent [`Transition`]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TransitionMemory {
    slot: Option<Transition>,
}

impl TransitionMemory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.slot.is_none()
    }

    pub fn peek(&self) -> Option<&Transition> {
        self.slot.as_ref()
    }

    /// Overwrite the slot with a new transition
    pub fn record(&mut self, transition: Transition) {
        self.slot = Some(transition);
    }

    /// Remove and return the stored transition, leaving the slot empty
    pub fn take(&mut self) -> Option<Transition> {
        self.slot.take()
    }

    pub fn clear(&mut self) {
        self.slot = None;
    }
}
