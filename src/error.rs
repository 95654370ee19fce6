use thiserror::Error;

use crate::state::StateKey;

/// Crate-wide result alias
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the learning core and the simulated world
///
/// None of these are expected in a correctly wired run, they mark programmer errors
/// and are surfaced immediately instead of being recovered from.
#[derive(Error, Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// A hyperparameter is outside its valid interval
    #[error("invalid value {value} for `{name}`, must be in the interval [{min}, {max}]")]
    Config {
        name: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    /// A decay schedule was built with inconsistent parameters
    #[error("invalid decay schedule: {0}")]
    Decay(String),

    /// A categorical symbol does not belong to its domain
    #[error("unrecognized {kind} symbol '{value}'")]
    Domain { kind: &'static str, value: String },

    /// A value was read or written for a state that was never created
    #[error("no action values recorded for state {0}")]
    UnknownState(StateKey),

    /// The simulated world cannot be built from the given configuration
    #[error("invalid world: {0}")]
    InvalidWorld(String),
}
