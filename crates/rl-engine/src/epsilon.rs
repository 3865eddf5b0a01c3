//! Exploration-rate schedules.

use abtest_core::EpsilonSchedule;

/// Exploration probability at 1-based iteration `t`: `initial_epsilon / t`.
pub fn epsilon_func(initial_epsilon: f64, t: u64) -> f64 {
    initial_epsilon / t as f64
}

/// Evaluates `schedule` at 1-based iteration `t`.
pub fn scheduled_epsilon(schedule: EpsilonSchedule, initial_epsilon: f64, t: u64) -> f64 {
    match schedule {
        EpsilonSchedule::Reciprocal => epsilon_func(initial_epsilon, t),
        EpsilonSchedule::Damped => initial_epsilon / (0.01 * t as f64 + 1.0),
        EpsilonSchedule::Constant => initial_epsilon,
    }
}
