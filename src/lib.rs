/// Tabular learning algorithms
pub mod algo;

/// Implementations of strategies for time-decaying hyperparameters
pub mod decay;

/// Environment interface and the categorical sensor domains
pub mod env;

/// Error types
pub mod error;

/// Exploration policies
pub mod exploration;

/// Single-step transition memory
pub mod memory;

/// Trial loop driving an agent through an environment
pub mod sim;

/// State encoding
pub mod state;

/// Simulated traffic world
#[cfg(feature = "gym")]
pub mod gym;

/// Terminal visualization
#[cfg(feature = "viz")]
pub mod viz;

mod util;
