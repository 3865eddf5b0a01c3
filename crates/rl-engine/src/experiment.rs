//! Epsilon-greedy A/B experiment: owns the options, runs the decision loop and
//! tallies how often it explored, exploited and hit the true optimum.
//!
//! All randomness comes from one injected stream. Each iteration draws, in
//! order: the explore/exploit coin, the uniform option index (explore only),
//! then the outcome of the selected option.

use crate::epsilon::scheduled_epsilon;
use crate::option::BanditOption;
use abtest_core::config::validate_parameters;
use abtest_core::{
    AbTestError, AbTestResult, Decision, EpsilonSchedule, ExperimentReport, ExperimentState,
    OptionSummary, SimulationConfig,
};
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};
use uuid::Uuid;

pub struct Experiment<R = StdRng> {
    options: Vec<BanditOption>,
    initial_epsilon: f64,
    iterations: u64,
    schedule: EpsilonSchedule,
    seed: Option<u64>,
    optimal_index: usize,
    num_explored: u64,
    num_exploited: u64,
    num_optimal: u64,
    successes: u64,
    expected_regret: f64,
    state: ExperimentState,
    rng: R,
}

impl Experiment<StdRng> {
    /// Builds an experiment seeded from OS entropy.
    pub fn new(probs: &[f64], initial_epsilon: f64, iterations: u64) -> AbTestResult<Self> {
        Self::with_rng(probs, initial_epsilon, iterations, StdRng::from_entropy())
    }

    /// Builds a reproducible experiment: the same seed and parameters always
    /// yield the same counters and histories.
    pub fn with_seed(
        probs: &[f64],
        initial_epsilon: f64,
        iterations: u64,
        seed: u64,
    ) -> AbTestResult<Self> {
        let mut experiment =
            Self::with_rng(probs, initial_epsilon, iterations, StdRng::seed_from_u64(seed))?;
        experiment.seed = Some(seed);
        Ok(experiment)
    }

    pub fn from_config(config: &SimulationConfig) -> AbTestResult<Self> {
        let experiment = match config.seed {
            Some(seed) => Self::with_seed(
                &config.probs,
                config.initial_epsilon,
                config.iterations,
                seed,
            )?,
            None => Self::new(&config.probs, config.initial_epsilon, config.iterations)?,
        };
        Ok(experiment.with_schedule(config.schedule))
    }
}

impl<R: Rng> Experiment<R> {
    /// Builds an experiment drawing from a caller-supplied random source.
    pub fn with_rng(
        probs: &[f64],
        initial_epsilon: f64,
        iterations: u64,
        rng: R,
    ) -> AbTestResult<Self> {
        validate_parameters(probs, initial_epsilon, iterations)?;

        let capacity = usize::try_from(iterations).map_err(|_| {
            AbTestError::InvalidConfiguration(format!(
                "iterations = {iterations} does not fit in memory on this platform"
            ))
        })?;
        let options: Vec<BanditOption> = probs
            .iter()
            .map(|&p| BanditOption::with_capacity(p, capacity))
            .collect();
        let optimal_index = first_max_index(probs.iter().copied());

        debug!(
            options = options.len(),
            initial_epsilon,
            iterations,
            optimal_index,
            "Experiment created"
        );

        Ok(Self {
            options,
            initial_epsilon,
            iterations,
            schedule: EpsilonSchedule::default(),
            seed: None,
            optimal_index,
            num_explored: 0,
            num_exploited: 0,
            num_optimal: 0,
            successes: 0,
            expected_regret: 0.0,
            state: ExperimentState::NotRun,
            rng,
        })
    }

    pub fn with_schedule(mut self, schedule: EpsilonSchedule) -> Self {
        self.schedule = schedule;
        self
    }

    /// Exploration probability used at 1-based iteration `t`.
    pub fn epsilon_at(&self, t: u64) -> f64 {
        scheduled_epsilon(self.schedule, self.initial_epsilon, t)
    }

    /// Runs the full decision loop. An experiment runs once; a second call
    /// returns `AlreadyRun` and leaves the results untouched.
    pub fn run(&mut self) -> AbTestResult<()> {
        if self.state == ExperimentState::Completed {
            return Err(AbTestError::AlreadyRun);
        }

        let best_rate = self.options[self.optimal_index].true_rate();

        for t in 1..=self.iterations {
            let eps = self.epsilon_at(t);
            let (decision, selected) = self.choose(eps);

            let outcome = self.options[selected].pull(&mut self.rng);
            self.options[selected].update(outcome);
            self.successes += u64::from(outcome);

            match decision {
                Decision::Explore => self.num_explored += 1,
                Decision::Exploit => self.num_exploited += 1,
            }
            if selected == self.optimal_index {
                self.num_optimal += 1;
            }
            self.expected_regret += best_rate - self.options[selected].true_rate();

            for option in &mut self.options {
                option.record_history();
            }

            trace!(iteration = t, epsilon = eps, ?decision, selected, outcome, "Step");
        }

        self.state = ExperimentState::Completed;

        info!(
            explored = self.num_explored,
            exploited = self.num_exploited,
            optimal = self.num_optimal,
            success_rate = self.overall_success_rate(),
            "Experiment completed"
        );

        Ok(())
    }

    fn choose(&mut self, eps: f64) -> (Decision, usize) {
        // With one option there is nothing to explore.
        if self.options.len() == 1 {
            return (Decision::Exploit, 0);
        }

        if self.rng.gen::<f64>() < eps {
            let idx = self.rng.gen_range(0..self.options.len());
            (Decision::Explore, idx)
        } else {
            (Decision::Exploit, self.best_estimate_index())
        }
    }

    /// Index of the highest current estimate; ties go to the lowest index.
    pub fn best_estimate_index(&self) -> usize {
        first_max_index(self.options.iter().map(BanditOption::estimate))
    }

    pub fn report(&self) -> AbTestResult<ExperimentReport> {
        if self.state != ExperimentState::Completed {
            return Err(AbTestError::NotRun);
        }

        let options = self
            .options
            .iter()
            .enumerate()
            .map(|(index, o)| OptionSummary {
                index,
                true_rate: o.true_rate(),
                estimate: o.estimate(),
                count: o.count(),
                history: o.history().to_vec(),
            })
            .collect();

        Ok(ExperimentReport {
            experiment_id: Uuid::new_v4(),
            completed_at: Utc::now(),
            initial_epsilon: self.initial_epsilon,
            iterations: self.iterations,
            schedule: self.schedule,
            seed: self.seed,
            num_explored: self.num_explored,
            num_exploited: self.num_exploited,
            num_optimal: self.num_optimal,
            optimal_index: self.optimal_index,
            overall_success_rate: self.overall_success_rate(),
            expected_regret: self.expected_regret,
            options,
        })
    }

    pub fn overall_success_rate(&self) -> f64 {
        let steps = self.num_explored + self.num_exploited;
        if steps == 0 {
            return 0.0;
        }
        self.successes as f64 / steps as f64
    }

    pub fn options(&self) -> &[BanditOption] {
        &self.options
    }

    pub fn state(&self) -> ExperimentState {
        self.state
    }

    pub fn optimal_index(&self) -> usize {
        self.optimal_index
    }

    pub fn initial_epsilon(&self) -> f64 {
        self.initial_epsilon
    }

    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    pub fn schedule(&self) -> EpsilonSchedule {
        self.schedule
    }

    pub fn num_explored(&self) -> u64 {
        self.num_explored
    }

    pub fn num_exploited(&self) -> u64 {
        self.num_exploited
    }

    pub fn num_optimal(&self) -> u64 {
        self.num_optimal
    }

    pub fn expected_regret(&self) -> f64 {
        self.expected_regret
    }
}

fn first_max_index(values: impl Iterator<Item = f64>) -> usize {
    let mut best_value = f64::NEG_INFINITY;
    let mut best_index = 0;
    for (i, v) in values.enumerate() {
        if v > best_value {
            best_value = v;
            best_index = i;
        }
    }
    best_index
}
