//! Epsilon-greedy bandit engine — option arms, exploration-rate schedules and
//! the experiment decision loop.

pub mod epsilon;
pub mod experiment;
pub mod option;

pub use epsilon::{epsilon_func, scheduled_epsilon};
pub use experiment::Experiment;
pub use option::BanditOption;
