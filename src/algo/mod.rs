pub mod tabular;

pub use tabular::{
    q_learning::{AgentConfig, LearningAgent, QLearner, QLearnerConfig},
    q_table::QTable,
};
