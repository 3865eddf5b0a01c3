pub mod config;
pub mod error;
pub mod types;

pub use self::config::{EpsilonSchedule, SimulationConfig};
pub use error::{AbTestError, AbTestResult};
pub use types::{Decision, ExperimentReport, ExperimentState, OptionSummary};
