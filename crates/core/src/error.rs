use thiserror::Error;

pub type AbTestResult<T> = Result<T, AbTestError>;

#[derive(Error, Debug)]
pub enum AbTestError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Experiment has already been run")]
    AlreadyRun,

    #[error("Experiment has not been run yet")]
    NotRun,

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
