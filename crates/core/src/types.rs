use crate::config::EpsilonSchedule;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of an experiment. `run` moves it from `NotRun` to `Completed`
/// exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExperimentState {
    NotRun,
    Completed,
}

/// Which branch of the epsilon-greedy policy picked the option.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Decision {
    Explore,
    Exploit,
}

/// Final state of one option after a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptionSummary {
    pub index: usize,
    pub true_rate: f64,
    pub estimate: f64,
    pub count: u64,
    /// Estimate after every iteration; length equals the iteration count.
    pub history: Vec<f64>,
}

/// Everything a caller needs after `run`: counters for assertions and the
/// per-option histories for plotting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentReport {
    pub experiment_id: Uuid,
    pub completed_at: DateTime<Utc>,
    pub initial_epsilon: f64,
    pub iterations: u64,
    pub schedule: EpsilonSchedule,
    #[serde(default)]
    pub seed: Option<u64>,
    pub num_explored: u64,
    pub num_exploited: u64,
    pub num_optimal: u64,
    pub optimal_index: usize,
    pub overall_success_rate: f64,
    pub expected_regret: f64,
    pub options: Vec<OptionSummary>,
}

impl ExperimentReport {
    /// Share of iterations that picked the true optimum.
    pub fn optimal_share(&self) -> f64 {
        if self.iterations == 0 {
            return 0.0;
        }
        self.num_optimal as f64 / self.iterations as f64
    }

    pub fn histories(&self) -> Vec<&[f64]> {
        self.options.iter().map(|o| o.history.as_slice()).collect()
    }
}
