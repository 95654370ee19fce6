#![cfg(feature = "gym")]

use smartcab::{
    algo::tabular::q_learning::{
        AgentConfig, EpisodeBoundary, LearningAgent, QLearnerConfig, UpdateRule,
    },
    decay::{self, Decay},
    exploration::EpsilonGreedy,
    gym::{Smartcab, WorldConfig},
    sim::{RunSummary, SimConfig, Silent, Simulator},
    state::StateKey,
};

const TRIALS: u32 = 30;

fn train<D: Decay>(config: AgentConfig<D>, seed: u64) -> (RunSummary, LearningAgent<D>) {
    let mut agent = LearningAgent::new(config).unwrap();
    let mut env = Smartcab::new(WorldConfig {
        seed: Some(seed),
        ..Default::default()
    })
    .unwrap();
    let summary = Simulator::new(SimConfig::default())
        .run(&mut agent, &mut env, TRIALS, &mut Silent)
        .unwrap();
    (summary, agent)
}

fn sorted_values<D: Decay>(agent: &LearningAgent<D>) -> Vec<(StateKey, Vec<f64>)> {
    let mut rows = agent
        .q_table()
        .iter()
        .map(|(state, row)| (*state, row.iter().map(|(_, q)| q).collect()))
        .collect::<Vec<_>>();
    rows.sort_by_key(|(state, _)| *state);
    rows
}

#[test]
fn seeded_training_is_reproducible() {
    let config = || AgentConfig {
        seed: Some(42),
        ..Default::default()
    };
    let (first, first_agent) = train(config(), 42);
    let (second, second_agent) = train(config(), 42);

    assert_eq!(first, second);
    assert_eq!(sorted_values(&first_agent), sorted_values(&second_agent));
    assert_eq!(first.trials, TRIALS);
    assert!(first.successes <= first.trials);
}

#[test]
fn table_stays_bounded() {
    let gamma = 0.3;
    let (summary, agent) = train(
        AgentConfig {
            learner: QLearnerConfig {
                gamma,
                ..Default::default()
            },
            seed: Some(7),
            ..Default::default()
        },
        7,
    );

    assert!(summary.states_learned > 0);
    assert!(summary.states_learned <= StateKey::CARDINALITY);
    assert_eq!(summary.states_learned, agent.q_table().len());

    // Every reward lies in [-1, 12], so no value can leave [-1, 12] / (1 - γ)
    let (lo, hi) = (-1.0 / (1.0 - gamma), 12.0 / (1.0 - gamma));
    for (_, row) in sorted_values(&agent) {
        for q in row {
            assert!(q.is_finite());
            assert!((lo..=hi).contains(&q), "{q} outside [{lo}, {hi}]");
        }
    }
}

#[test]
fn bootstrap_carry_over_with_decaying_exploration() {
    let (summary, agent) = train(
        AgentConfig {
            learner: QLearnerConfig {
                rule: UpdateRule::Bootstrap,
                boundary: EpisodeBoundary::CarryOver,
                ..Default::default()
            },
            exploration: EpsilonGreedy::new(
                decay::Anneal::new(decay::Shape::Exponential, 0.1, 1.0, 0.05).unwrap(),
            )
            .unwrap(),
            seed: Some(3),
        },
        3,
    );

    assert_eq!(summary.trials, TRIALS);
    assert_eq!(agent.trial(), TRIALS);
    assert!(agent.epsilon() < 1.0);
    assert!(agent.epsilon() >= 0.05);
    assert!(
        !agent.learner().memory().is_empty(),
        "Carry-over keeps the last transition of the run"
    );
}

#[test]
fn terminal_boundary_clears_memory() {
    let (_, agent) = train(
        AgentConfig {
            seed: Some(11),
            ..Default::default()
        },
        11,
    );
    assert!(agent.learner().memory().is_empty());
}
