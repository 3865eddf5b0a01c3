//! A single arm of the A/B test: a hidden win rate plus the running estimate
//! the policy builds from observed outcomes.

use rand::Rng;

#[derive(Debug, Clone)]
pub struct BanditOption {
    true_rate: f64,
    estimate: f64,
    count: u64,
    history: Vec<f64>,
}

impl BanditOption {
    pub fn new(true_rate: f64) -> Self {
        Self {
            true_rate,
            estimate: 0.0,
            count: 0,
            history: Vec::new(),
        }
    }

    /// Preallocates room for `iterations` history entries.
    pub fn with_capacity(true_rate: f64, iterations: usize) -> Self {
        Self {
            history: Vec::with_capacity(iterations),
            ..Self::new(true_rate)
        }
    }

    /// Simulates one trial: 1 with probability `true_rate`, else 0.
    pub fn pull(&self, rng: &mut impl Rng) -> u8 {
        u8::from(rng.gen::<f64>() < self.true_rate)
    }

    /// Folds one outcome into the running mean.
    pub fn update(&mut self, outcome: u8) {
        let outcome = f64::from(outcome);
        self.estimate += (outcome - self.estimate) / (self.count + 1) as f64;
        self.count += 1;
    }

    pub(crate) fn record_history(&mut self) {
        self.history.push(self.estimate);
    }

    pub fn true_rate(&self) -> f64 {
        self.true_rate
    }

    pub fn estimate(&self) -> f64 {
        self.estimate
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn history(&self) -> &[f64] {
        &self.history
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_new_option_is_blank() {
        let option = BanditOption::new(0.4);
        assert_eq!(option.count(), 0);
        assert_eq!(option.estimate(), 0.0);
        assert!(option.history().is_empty());
        assert!((option.true_rate() - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn test_update_keeps_running_mean() {
        let mut option = BanditOption::new(0.5);
        let outcomes = [1u8, 0, 0, 1, 1, 1, 0];
        for (i, &o) in outcomes.iter().enumerate() {
            option.update(o);
            let seen = &outcomes[..=i];
            let mean = seen.iter().map(|&x| f64::from(x)).sum::<f64>() / seen.len() as f64;
            assert!((option.estimate() - mean).abs() < 1e-12);
            assert_eq!(option.count(), seen.len() as u64);
        }
    }

    #[test]
    fn test_first_update_sets_estimate_to_outcome() {
        let mut option = BanditOption::new(0.5);
        option.update(1);
        assert_eq!(option.estimate(), 1.0);
    }

    #[test]
    fn test_pull_extreme_rates() {
        let mut rng = StdRng::seed_from_u64(7);
        let never = BanditOption::new(0.0);
        let always = BanditOption::new(1.0);
        for _ in 0..1000 {
            assert_eq!(never.pull(&mut rng), 0);
            assert_eq!(always.pull(&mut rng), 1);
        }
    }

    #[test]
    fn test_pull_rate_converges() {
        let mut rng = StdRng::seed_from_u64(42);
        let option = BanditOption::new(0.3);
        let wins: u32 = (0..20_000).map(|_| u32::from(option.pull(&mut rng))).sum();
        let rate = f64::from(wins) / 20_000.0;
        assert!((rate - 0.3).abs() < 0.02, "observed rate {rate}");
    }

    #[test]
    fn test_pull_is_deterministic_for_seed() {
        let option = BanditOption::new(0.5);
        let mut a = StdRng::seed_from_u64(99);
        let mut b = StdRng::seed_from_u64(99);
        let left: Vec<u8> = (0..64).map(|_| option.pull(&mut a)).collect();
        let right: Vec<u8> = (0..64).map(|_| option.pull(&mut b)).collect();
        assert_eq!(left, right);
    }

    #[test]
    fn test_history_snapshots_current_estimate() {
        let mut option = BanditOption::with_capacity(0.5, 3);
        option.record_history();
        option.update(1);
        option.record_history();
        option.update(0);
        option.record_history();
        assert_eq!(option.history(), &[0.0, 1.0, 0.5]);
    }
}
