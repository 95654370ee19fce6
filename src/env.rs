use std::{fmt, str::FromStr};

use strum::{Display, EnumIter, EnumString, VariantArray};

use crate::error::{Error, Result};

/// Traffic light color as seen by a car approaching an intersection
#[derive(Display, EnumIter, EnumString, VariantArray, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[strum(serialize_all = "lowercase")]
pub enum Light {
    Green = 0,
    Red = 1,
}

/// Relative direction of travel
///
/// Used both for the intended heading of other cars at an intersection and for the
/// [`Waypoint`] suggested by a route planner. `None` means no car is present, or for a
/// waypoint, that the destination has been reached.
#[derive(Display, EnumIter, EnumString, VariantArray, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[strum(serialize_all = "lowercase")]
pub enum Heading {
    #[strum(to_string = "none", serialize = "None")]
    None = 0,
    Forward = 1,
    Left = 2,
    Right = 3,
}

/// The locally suggested next heading toward the destination
pub type Waypoint = Heading;

/// An action available to the agent, in the fixed order used for indexing and tie-breaks
#[derive(Display, EnumIter, EnumString, VariantArray, Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[strum(serialize_all = "lowercase")]
pub enum Action {
    #[strum(to_string = "wait", serialize = "none", serialize = "None")]
    Wait = 0,
    Forward = 1,
    Left = 2,
    Right = 3,
}

impl Action {
    /// Position of the action in [`Action::VARIANTS`]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// The heading a car intends when taking this action
    pub const fn heading(self) -> Heading {
        match self {
            Action::Wait => Heading::None,
            Action::Forward => Heading::Forward,
            Action::Left => Heading::Left,
            Action::Right => Heading::Right,
        }
    }
}

impl From<Heading> for Action {
    fn from(heading: Heading) -> Self {
        match heading {
            Heading::None => Action::Wait,
            Heading::Forward => Action::Forward,
            Heading::Left => Action::Left,
            Heading::Right => Action::Right,
        }
    }
}

/// A categorical domain whose values are read from textual symbols
pub trait Symbol: FromStr<Err = strum::ParseError> {
    /// Name of the domain, reported in [`Error::Domain`]
    const KIND: &'static str;

    /// **Errors** with [`Error::Domain`] if `symbol` is not a value of this domain
    fn from_symbol(symbol: &str) -> Result<Self> {
        symbol.parse().map_err(|_| Error::Domain {
            kind: Self::KIND,
            value: symbol.to_owned(),
        })
    }
}

impl Symbol for Light {
    const KIND: &'static str = "light";
}

impl Symbol for Heading {
    const KIND: &'static str = "heading";
}

impl Symbol for Action {
    const KIND: &'static str = "action";
}

/// Sensor readings available to a car at one time step
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Percept {
    pub light: Light,
    pub oncoming: Heading,
    pub left: Heading,
    pub right: Heading,
}

impl Percept {
    /// A green light with no other traffic around
    pub const fn clear() -> Self {
        Self {
            light: Light::Green,
            oncoming: Heading::None,
            left: Heading::None,
            right: Heading::None,
        }
    }
}

impl fmt::Display for Percept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{light: {}, oncoming: {}, left: {}, right: {}}}",
            self.light, self.oncoming, self.left, self.right
        )
    }
}

/// A discrete-time traffic world hosting one learning car
///
/// The world advances with [`tick`](Environment::tick) and scores the primary car's
/// moves with [`act`](Environment::act). It owns its own route planner, so the agent
/// only ever sees the percept and the suggested waypoint.
pub trait Environment {
    /// Read the sensors of the primary car
    fn sense(&self) -> Percept;

    /// Next heading toward the destination, as suggested by the route planner
    fn next_waypoint(&self) -> Waypoint;

    /// Time steps left before the trial's deadline
    fn deadline(&self) -> i32;

    /// Execute an action for the primary car
    ///
    /// **Returns** the reward
    fn act(&mut self, action: Action) -> f64;

    /// Advance every part of the world except the primary car by one time step
    fn tick(&mut self);

    /// Start a new trial with a fresh start, destination, and deadline
    fn reset(&mut self);

    /// Whether the current trial is over, either by reaching the destination or by timing out
    fn is_done(&self) -> bool;

    /// Whether the primary car reached its destination in the current trial
    fn reached_destination(&self) -> bool;
}
