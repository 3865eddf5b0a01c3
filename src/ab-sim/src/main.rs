//! ab-sim — epsilon-greedy A/B test simulator.
//!
//! Builds one experiment from config, runs it, logs the summary and exports
//! the per-option estimate histories for plotting.

use abtest_core::config::SimulationConfig;
use abtest_core::EpsilonSchedule;
use abtest_reporting::{
    series_from_report, write_report_json, CsvHistorySink, HistorySink, JsonHistorySink,
};
use abtest_rl_engine::Experiment;
use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser, Debug)]
#[command(name = "ab-sim")]
#[command(about = "Epsilon-greedy multi-armed bandit A/B test simulator")]
#[command(version)]
struct Cli {
    /// Optional TOML config file
    #[arg(long, env = "ABTEST_CONFIG")]
    config: Option<PathBuf>,

    /// True win rate per option, comma separated (overrides config)
    #[arg(long, value_delimiter = ',')]
    probs: Option<Vec<f64>>,

    /// Initial exploration rate (overrides config)
    #[arg(long)]
    epsilon: Option<f64>,

    /// Number of iterations (overrides config)
    #[arg(long)]
    iterations: Option<u64>,

    /// Random seed for a reproducible run (overrides config)
    #[arg(long)]
    seed: Option<u64>,

    /// Epsilon schedule: reciprocal, damped or constant (overrides config)
    #[arg(long)]
    schedule: Option<EpsilonSchedule>,

    /// Write estimate histories as CSV to this path
    #[arg(long)]
    csv: Option<String>,

    /// Write estimate histories as JSON to this path
    #[arg(long)]
    json: Option<String>,

    /// Write the full report as JSON to this path
    #[arg(long)]
    report: Option<PathBuf>,

    /// Human-readable logs instead of JSON
    #[arg(long, default_value_t = false)]
    pretty_logs: bool,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "abtest_sim=info,abtest_rl_engine=info,abtest_reporting=info".into());
    if cli.pretty_logs {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).json().init();
    }

    let config = match resolve_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Failed to load config");
            return Err(e);
        }
    };

    info!(
        probs = ?config.probs,
        initial_epsilon = config.initial_epsilon,
        iterations = config.iterations,
        seed = ?config.seed,
        schedule = ?config.schedule,
        "Configuration loaded"
    );

    let mut experiment =
        Experiment::from_config(&config).context("invalid experiment configuration")?;
    experiment.run()?;
    let report = experiment.report()?;

    print!("{}", abtest_reporting::render(&report));

    let series = series_from_report(&report);
    if let Some(path) = &config.output.csv_path {
        CsvHistorySink::new(path)
            .consume(&series)
            .with_context(|| format!("writing CSV to {path}"))?;
    }
    if let Some(path) = &config.output.json_path {
        JsonHistorySink::new(path)
            .consume(&series)
            .with_context(|| format!("writing JSON to {path}"))?;
    }
    if let Some(path) = cli.report.as_deref() {
        write_report_json(&report, path)
            .with_context(|| format!("writing report to {}", path.display()))?;
    }

    Ok(())
}

/// Loads the layered config and applies CLI overrides. Fields absent from
/// every source keep their defaults; a source that fails to read or parse is
/// an error.
fn resolve_config(cli: &Cli) -> anyhow::Result<SimulationConfig> {
    let mut config = SimulationConfig::load(cli.config.as_deref()).with_context(|| {
        match &cli.config {
            Some(path) => format!("loading config from {}", path.display()),
            None => "loading config from ABTEST__ environment".to_string(),
        }
    })?;

    // Apply CLI overrides
    if let Some(probs) = &cli.probs {
        config.probs = probs.clone();
    }
    if let Some(epsilon) = cli.epsilon {
        config.initial_epsilon = epsilon;
    }
    if let Some(iterations) = cli.iterations {
        config.iterations = iterations;
    }
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(schedule) = cli.schedule {
        config.schedule = schedule;
    }
    if let Some(csv) = &cli.csv {
        config.output.csv_path = Some(csv.clone());
    }
    if let Some(json) = &cli.json {
        config.output.json_path = Some(json.clone());
    }

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_config_file_aborts() {
        let missing = std::env::temp_dir().join("ab-sim-does-not-exist.toml");
        let cli = Cli::parse_from([
            "ab-sim",
            "--config",
            missing.to_str().unwrap(),
            "--seed",
            "1",
        ]);

        let err = resolve_config(&cli).unwrap_err();
        assert!(err.to_string().contains("loading config from"));
    }

    #[test]
    fn test_malformed_config_file_aborts() {
        let path = std::env::temp_dir().join(format!("ab-sim-bad-{}.toml", std::process::id()));
        std::fs::write(&path, "probs = [0.1, \n").unwrap();
        let cli = Cli::parse_from(["ab-sim", "--config", path.to_str().unwrap()]);

        let result = resolve_config(&cli);
        std::fs::remove_file(&path).ok();
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_overrides_file() {
        let path = std::env::temp_dir().join(format!("ab-sim-ok-{}.toml", std::process::id()));
        std::fs::write(&path, "probs = [0.2, 0.4]\niterations = 10\nseed = 3\n").unwrap();
        let cli = Cli::parse_from([
            "ab-sim",
            "--config",
            path.to_str().unwrap(),
            "--probs",
            "0.9",
            "--schedule",
            "damped",
            "--csv",
            "out.csv",
        ]);

        let config = resolve_config(&cli);
        std::fs::remove_file(&path).ok();
        let config = config.unwrap();
        assert_eq!(config.probs, vec![0.9]);
        assert_eq!(config.iterations, 10);
        assert_eq!(config.seed, Some(3));
        assert_eq!(config.schedule, EpsilonSchedule::Damped);
        assert_eq!(config.output.csv_path.as_deref(), Some("out.csv"));
    }
}
