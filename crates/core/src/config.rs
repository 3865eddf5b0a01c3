use crate::error::{AbTestError, AbTestResult};
use serde::de::{self, Deserializer, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Root simulation configuration. Loaded from an optional TOML file and
/// environment variables with the prefix `ABTEST__`.
#[derive(Debug, Clone, Deserialize)]
pub struct SimulationConfig {
    /// True win rate of each option, in option order.
    #[serde(default = "default_probs", deserialize_with = "deserialize_probs")]
    pub probs: Vec<f64>,
    #[serde(default = "default_initial_epsilon")]
    pub initial_epsilon: f64,
    #[serde(default = "default_iterations")]
    pub iterations: u64,
    /// Fixed seed for the random source. `None` seeds from OS entropy.
    #[serde(default)]
    pub seed: Option<u64>,
    #[serde(default)]
    pub schedule: EpsilonSchedule,
    #[serde(default)]
    pub output: OutputConfig,
}

/// How the exploration rate decays over the run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EpsilonSchedule {
    /// `initial_epsilon / t`
    #[default]
    Reciprocal,
    /// `initial_epsilon / (0.01 * t + 1)`
    Damped,
    /// `initial_epsilon` at every step.
    Constant,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub csv_path: Option<String>,
    #[serde(default)]
    pub json_path: Option<String>,
}

// Default functions
fn default_probs() -> Vec<f64> {
    vec![0.2, 0.5, 0.75]
}
fn default_initial_epsilon() -> f64 {
    0.1
}
fn default_iterations() -> u64 {
    5000
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            probs: default_probs(),
            initial_epsilon: default_initial_epsilon(),
            iterations: default_iterations(),
            seed: None,
            schedule: EpsilonSchedule::default(),
            output: OutputConfig::default(),
        }
    }
}

// ─── Win-rate list ──────────────────────────────────────────────────────────

// The env source hands `probs` over as a bare number (`ABTEST__PROBS=0.9`),
// a list of strings (`0.1,0.9`) or, from a file, a list of numbers.
fn deserialize_probs<'de, D>(deserializer: D) -> Result<Vec<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    deserializer.deserialize_any(ProbsVisitor)
}

struct ProbsVisitor;

impl<'de> Visitor<'de> for ProbsVisitor {
    type Value = Vec<f64>;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a win rate or a list of win rates")
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Self::Value, E> {
        Ok(vec![v])
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(vec![v as f64])
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        Ok(vec![v as f64])
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.split(',').map(parse_rate).collect()
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Self::Value, A::Error> {
        let mut probs = Vec::with_capacity(seq.size_hint().unwrap_or(0));
        while let Some(Rate(p)) = seq.next_element()? {
            probs.push(p);
        }
        Ok(probs)
    }
}

struct Rate(f64);

impl<'de> Deserialize<'de> for Rate {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RateVisitor;

        impl<'de> Visitor<'de> for RateVisitor {
            type Value = Rate;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a win rate")
            }

            fn visit_f64<E: de::Error>(self, v: f64) -> Result<Rate, E> {
                Ok(Rate(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Rate, E> {
                Ok(Rate(v as f64))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Rate, E> {
                Ok(Rate(v as f64))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Rate, E> {
                parse_rate(v).map(Rate)
            }
        }

        deserializer.deserialize_any(RateVisitor)
    }
}

fn parse_rate<E: de::Error>(s: &str) -> Result<f64, E> {
    s.trim()
        .parse::<f64>()
        .map_err(|_| E::custom(format!("'{s}' is not a win rate")))
}

impl std::str::FromStr for EpsilonSchedule {
    type Err = AbTestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "reciprocal" => Ok(Self::Reciprocal),
            "damped" => Ok(Self::Damped),
            "constant" => Ok(Self::Constant),
            other => Err(AbTestError::InvalidConfiguration(format!(
                "unknown epsilon schedule '{other}' (expected reciprocal, damped or constant)"
            ))),
        }
    }
}

impl SimulationConfig {
    /// Load configuration from an optional config file, then environment
    /// variables. Environment values win over the file.
    pub fn load(file: Option<&Path>) -> AbTestResult<Self> {
        let mut builder = config::Config::builder();
        if let Some(path) = file {
            builder = builder.add_source(config::File::from(path).required(true));
        }
        let builder = builder.add_source(
            config::Environment::with_prefix("ABTEST")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("probs"),
        );

        let config = builder.build()?;
        let loaded: Self = config.try_deserialize()?;
        tracing::debug!(
            options = loaded.probs.len(),
            initial_epsilon = loaded.initial_epsilon,
            iterations = loaded.iterations,
            "Simulation config loaded"
        );
        Ok(loaded)
    }

    pub fn validate(&self) -> AbTestResult<()> {
        validate_parameters(&self.probs, self.initial_epsilon, self.iterations)
    }
}

/// Checks the three construction parameters of an experiment.
pub fn validate_parameters(probs: &[f64], initial_epsilon: f64, iterations: u64) -> AbTestResult<()> {
    if probs.is_empty() {
        return Err(AbTestError::InvalidConfiguration(
            "probs must contain at least one win rate".to_string(),
        ));
    }
    if let Some((i, p)) = probs
        .iter()
        .enumerate()
        .find(|(_, p)| !p.is_finite() || **p < 0.0 || **p > 1.0)
    {
        return Err(AbTestError::InvalidConfiguration(format!(
            "probs[{i}] = {p} is outside [0, 1]"
        )));
    }
    if !initial_epsilon.is_finite() || initial_epsilon <= 0.0 || initial_epsilon > 1.0 {
        return Err(AbTestError::InvalidConfiguration(format!(
            "initial_epsilon = {initial_epsilon} is outside (0, 1]"
        )));
    }
    if iterations == 0 {
        return Err(AbTestError::InvalidConfiguration(
            "iterations must be positive".to_string(),
        ));
    }
    Ok(())
}
