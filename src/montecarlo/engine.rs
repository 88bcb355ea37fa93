//! Stochastic accumulation engine
//!
//! Each path follows the deterministic projection recurrence with a random
//! annual return:
//!
//! ```text
//! r_t     = exp(mu_t - sigma_t^2 / 2 + sigma_t * Z) - 1
//! c_t     = annual_contrib * (1 + employer_match_rate) * (1 + salary_growth)^t
//! B_{t+1} = (B_t + c_t) * (1 + r_t) * (1 - fees_annual)
//! R_t     = B_t / (1 + inflation)^t
//! ```
//!
//! With a glidepath, `mu_t` falls linearly by 2 points and `sigma_t` to 70% of
//! its starting value over the horizon.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::input::MonteCarloInput;
use super::response::{MonteCarloResponse, PathPoint, Percentile, PercentileBands};
use super::shocks::{SeededStreams, ShockSource, ShockStreams};
use super::stats::{percentiles, Moments};
use super::validation::validate_monte_carlo_input;
use crate::error::CalcResult;

/// Drop in expected return across a glidepath
pub const GLIDEPATH_RETURN_DROP: f64 = 0.02;

/// Volatility at retirement as a fraction of the starting volatility
pub const GLIDEPATH_VOLATILITY_SCALE: f64 = 0.7;

/// Which balances the percentile bands are taken over
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PercentileBasis {
    #[default]
    Nominal,
    /// Inflation-deflated balances
    Real,
}

/// Engine settings that do not change the simulated paths
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonteCarloConfig {
    pub percentile_basis: PercentileBasis,

    /// Simulate paths on the rayon pool. Results are identical either way.
    pub parallel: bool,
}

impl Default for MonteCarloConfig {
    fn default() -> Self {
        Self {
            percentile_basis: PercentileBasis::Nominal,
            parallel: true,
        }
    }
}

/// Per-year return parameters, `years` entries each
pub fn glidepath_vectors(years: usize, mu: f64, sigma: f64, glidepath: bool) -> (Vec<f64>, Vec<f64>) {
    if !glidepath {
        return (vec![mu; years], vec![sigma; years]);
    }
    (
        linspace(mu, mu - GLIDEPATH_RETURN_DROP, years),
        linspace(sigma, sigma * GLIDEPATH_VOLATILITY_SCALE, years),
    )
}

/// `n` evenly spaced points from `start` to `end` inclusive
fn linspace(start: f64, end: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (end - start) / (n - 1) as f64;
            (0..n)
                .map(|i| if i == n - 1 { end } else { start + step * i as f64 })
                .collect()
        }
    }
}

/// Everything a single path needs, computed once per run
struct PathModel {
    start_balance: f64,
    contributions: Vec<f64>,
    drift: Vec<f64>,
    sigma: Vec<f64>,
    fee_factor: f64,
}

impl PathModel {
    fn from_input(input: &MonteCarloInput) -> Self {
        let years = input.years() as usize;
        let (mu, sigma) = glidepath_vectors(years, input.expected_return, input.return_volatility, input.glidepath);
        let drift = mu.iter().zip(&sigma).map(|(m, s)| m - 0.5 * s * s).collect();

        let matched = input.annual_contrib * (1.0 + input.employer_match_rate);
        let contributions = std::iter::successors(Some(matched), |c| Some(c * (1.0 + input.salary_growth)))
            .take(years)
            .collect();

        Self {
            start_balance: input.current_balance,
            contributions,
            drift,
            sigma,
            fee_factor: 1.0 - input.fees_annual,
        }
    }

    /// Fill `row` (length years + 1) with one path of nominal balances
    fn simulate<R: ShockSource>(&self, shocks: &mut R, row: &mut [f64]) {
        row[0] = self.start_balance;
        for t in 0..self.contributions.len() {
            let z = shocks.standard_normal();
            let growth = (self.drift[t] + self.sigma[t] * z).exp();
            row[t + 1] = (row[t] + self.contributions[t]) * growth * self.fee_factor;
        }
    }
}

const PERCENTILE_LEVELS: [f64; 5] = [
    Percentile::ALL[0].level(),
    Percentile::ALL[1].level(),
    Percentile::ALL[2].level(),
    Percentile::ALL[3].level(),
    Percentile::ALL[4].level(),
];

/// Monte Carlo engine
#[derive(Debug, Clone, Default)]
pub struct MonteCarloEngine {
    config: MonteCarloConfig,
}

impl MonteCarloEngine {
    pub fn new(config: MonteCarloConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &MonteCarloConfig {
        &self.config
    }

    /// Validate and simulate, seeding from `input.seed`
    pub fn run(&self, input: &MonteCarloInput) -> CalcResult<MonteCarloResponse> {
        validate_monte_carlo_input(input).into_result()?;
        let streams = SeededStreams::from_seed(input.seed);
        log::debug!(
            "Monte Carlo: {} paths x {} years, base seed {}",
            input.n_paths,
            input.years(),
            streams.base_seed()
        );
        Ok(self.simulate(input, &streams))
    }

    /// Validate and simulate with caller-supplied shocks (`input.seed` is ignored)
    pub fn run_with_streams<S: ShockStreams>(
        &self,
        input: &MonteCarloInput,
        streams: &S,
    ) -> CalcResult<MonteCarloResponse> {
        validate_monte_carlo_input(input).into_result()?;
        Ok(self.simulate(input, streams))
    }

    fn simulate<S: ShockStreams>(&self, input: &MonteCarloInput, streams: &S) -> MonteCarloResponse {
        let model = PathModel::from_input(input);
        let years = input.years() as usize;
        let width = years + 1;
        let n_paths = input.n_paths;

        // Row-major: path i occupies balances[i * width..(i + 1) * width]
        let mut balances = vec![0.0; n_paths * width];
        let fill = |(path, row): (usize, &mut [f64])| {
            let mut shocks = streams.stream(path);
            model.simulate(&mut shocks, row);
        };
        if self.config.parallel {
            balances.par_chunks_mut(width).enumerate().for_each(fill);
        } else {
            balances.chunks_mut(width).enumerate().for_each(fill);
        }

        let deflators: Vec<f64> = (0..width).map(|t| (1.0 + input.inflation).powi(t as i32)).collect();

        let band_row = |t: usize| {
            let deflator = match self.config.percentile_basis {
                PercentileBasis::Nominal => 1.0,
                PercentileBasis::Real => deflators[t],
            };
            let mut column: Vec<f64> = balances.iter().skip(t).step_by(width).map(|b| b / deflator).collect();
            percentiles(&mut column, PERCENTILE_LEVELS)
        };
        let rows: Vec<[f64; 5]> = if self.config.parallel {
            (0..width).into_par_iter().map(band_row).collect()
        } else {
            (0..width).map(band_row).collect()
        };

        let final_nominal: Vec<f64> = balances.iter().skip(years).step_by(width).copied().collect();
        let final_real: Vec<f64> = final_nominal.iter().map(|b| b / deflators[years]).collect();

        let success_probability = input
            .target_goal
            .and_then(|goal| goal.required_savings(input.inflation, input.expected_return))
            .map(|required| {
                let funded = final_real.iter().filter(|&&b| b >= required).count();
                funded as f64 / n_paths as f64
            });

        let sample_path = balances[..width]
            .iter()
            .zip(&deflators)
            .enumerate()
            .map(|(t, (&nominal, deflator))| PathPoint {
                age: input.current_age + t as u32,
                nominal,
                real: nominal / deflator,
            })
            .collect();

        MonteCarloResponse {
            percentiles: PercentileBands::from_rows(&rows),
            final_balances_nominal: Moments::population(&final_nominal),
            final_balances_real: Moments::population(&final_real),
            success_probability,
            sample_path,
        }
    }
}

/// Run a simulation with the default engine settings
pub fn run_monte_carlo(input: &MonteCarloInput) -> CalcResult<MonteCarloResponse> {
    MonteCarloEngine::default().run(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalcError;
    use crate::montecarlo::{estimate_required_savings, TargetGoal};
    use approx::assert_relative_eq;

    struct ZeroShocks;

    impl ShockSource for ZeroShocks {
        fn standard_normal(&mut self) -> f64 {
            0.0
        }
    }

    impl ShockStreams for ZeroShocks {
        type Stream = ZeroShocks;

        fn stream(&self, _path: usize) -> ZeroShocks {
            ZeroShocks
        }
    }

    /// Each path sees a constant shock equal to its index scaled down
    struct IndexShocks;

    impl ShockStreams for IndexShocks {
        type Stream = ConstShock;

        fn stream(&self, path: usize) -> ConstShock {
            ConstShock(path as f64 / 100.0 - 1.0)
        }
    }

    struct ConstShock(f64);

    impl ShockSource for ConstShock {
        fn standard_normal(&mut self) -> f64 {
            self.0
        }
    }

    fn sample_input() -> MonteCarloInput {
        MonteCarloInput {
            n_paths: 500,
            employer_match_rate: 0.5,
            fees_annual: 0.005,
            ..MonteCarloInput::new(35, 65, 50_000.0, 10_000.0, 0.07, 0.15)
        }
    }

    #[test]
    fn test_seeded_runs_are_identical() {
        let input = sample_input();
        let a = run_monte_carlo(&input).unwrap();
        let b = run_monte_carlo(&input).unwrap();
        assert_eq!(a, b);

        let other_seed = run_monte_carlo(&MonteCarloInput { seed: Some(7), ..input }).unwrap();
        assert_ne!(a.percentiles, other_seed.percentiles);
    }

    #[test]
    fn test_unseeded_runs_differ() {
        let input = MonteCarloInput { seed: None, ..sample_input() };
        let a = run_monte_carlo(&input).unwrap();
        let b = run_monte_carlo(&input).unwrap();
        assert_ne!(a.percentiles, b.percentiles);
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let input = MonteCarloInput { glidepath: true, ..sample_input() };
        let sequential = MonteCarloEngine::new(MonteCarloConfig { parallel: false, ..Default::default() });
        let parallel = MonteCarloEngine::new(MonteCarloConfig { parallel: true, ..Default::default() });

        assert_eq!(sequential.run(&input).unwrap(), parallel.run(&input).unwrap());
    }

    #[test]
    fn test_percentiles_are_ordered() {
        let result = run_monte_carlo(&sample_input()).unwrap();
        assert_eq!(result.percentiles.len(), 31);

        for t in 0..result.percentiles.len() {
            let values: Vec<f64> = Percentile::ALL.iter().map(|&p| result.percentiles.get(p)[t]).collect();
            for pair in values.windows(2) {
                assert!(pair[0] <= pair[1], "year {}: {:?}", t, values);
            }
        }
        // Every path starts at the current balance
        assert_eq!(result.percentiles.p5[0], 50_000.0);
        assert_eq!(result.percentiles.p95[0], 50_000.0);
    }

    #[test]
    fn test_zero_shocks_match_closed_form() {
        let input = MonteCarloInput {
            current_age: 60,
            retire_age: 63,
            current_balance: 1_000.0,
            annual_contrib: 100.0,
            employer_match_rate: 0.5,
            expected_return: 0.05,
            return_volatility: 0.2,
            inflation: 0.02,
            salary_growth: 0.1,
            fees_annual: 0.01,
            n_paths: 100,
            ..MonteCarloInput::new(0, 0, 0.0, 0.0, 0.0, 0.0)
        };
        let result = MonteCarloEngine::default().run_with_streams(&input, &ZeroShocks).unwrap();

        let growth = (0.05 - 0.5 * 0.2 * 0.2_f64).exp() * 0.99;
        let mut expected = vec![1_000.0];
        let mut contrib = 150.0;
        for _ in 0..3 {
            let prev = *expected.last().unwrap();
            expected.push((prev + contrib) * growth);
            contrib *= 1.1;
        }

        for (t, point) in result.sample_path.iter().enumerate() {
            assert_eq!(point.age, 60 + t as u32);
            assert_relative_eq!(point.nominal, expected[t], epsilon = 1e-9);
            assert_relative_eq!(point.real, expected[t] / 1.02_f64.powi(t as i32), epsilon = 1e-9);
            assert_relative_eq!(result.percentiles.p50[t], expected[t], epsilon = 1e-9);
        }
        assert_relative_eq!(result.final_balances_nominal.mean, expected[3], epsilon = 1e-9);
        assert!(result.final_balances_nominal.std < 1e-9);
    }

    #[test]
    fn test_real_basis_deflates_bands() {
        let input = sample_input();
        let nominal = MonteCarloEngine::default().run_with_streams(&input, &ZeroShocks).unwrap();
        let real = MonteCarloEngine::new(MonteCarloConfig {
            percentile_basis: PercentileBasis::Real,
            ..Default::default()
        })
        .run_with_streams(&input, &ZeroShocks)
        .unwrap();

        assert_eq!(real.percentiles.p50[0], nominal.percentiles.p50[0]);
        let deflator = 1.02_f64.powi(30);
        assert_relative_eq!(real.percentiles.p50[30], nominal.percentiles.p50[30] / deflator, epsilon = 1e-6);
    }

    #[test]
    fn test_success_probability_counts_funded_paths() {
        // Shocks rise with the path index, so final balances are all distinct
        let mut input = MonteCarloInput {
            n_paths: 100,
            ..MonteCarloInput::new(40, 60, 100_000.0, 5_000.0, 0.06, 0.1)
        };
        let engine = MonteCarloEngine::default();

        let result = engine.run_with_streams(&input, &IndexShocks).unwrap();
        assert_eq!(result.success_probability, None);

        // Required savings equal to the mean final real balance sits strictly inside the spread
        let per_unit_spend = estimate_required_savings(1.0, 25, input.inflation, input.expected_return);
        let spend = result.final_balances_real.mean / per_unit_spend;
        input.target_goal = Some(TargetGoal::new(spend, 25));

        let with_goal = engine.run_with_streams(&input, &IndexShocks).unwrap();
        let p = with_goal.success_probability.unwrap();
        assert!(p > 0.0 && p < 1.0, "probability {}", p);
        assert_eq!(with_goal.percentiles, result.percentiles);
    }

    #[test]
    fn test_success_probability_extremes() {
        let input = MonteCarloInput {
            n_paths: 200,
            target_goal: Some(TargetGoal::new(1.0, 1)),
            ..sample_input()
        };
        assert_eq!(run_monte_carlo(&input).unwrap().success_probability, Some(1.0));

        let unreachable = MonteCarloInput {
            target_goal: Some(TargetGoal::new(1e12, 30)),
            ..input
        };
        assert_eq!(run_monte_carlo(&unreachable).unwrap().success_probability, Some(0.0));
    }

    #[test]
    fn test_invalid_input_is_not_simulated() {
        let input = MonteCarloInput {
            current_age: 30,
            retire_age: 25,
            ..sample_input()
        };
        match run_monte_carlo(&input) {
            Err(CalcError::Validation(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_glidepath_endpoints() {
        let (mu, sigma) = glidepath_vectors(5, 0.07, 0.15, true);
        assert_eq!(mu.len(), 5);
        assert_eq!(mu[0], 0.07);
        assert_relative_eq!(mu[4], 0.05, epsilon = 1e-12);
        assert_relative_eq!(mu[2], 0.06, epsilon = 1e-12);
        assert_eq!(sigma[0], 0.15);
        assert_relative_eq!(sigma[4], 0.105, epsilon = 1e-12);

        let (mu, sigma) = glidepath_vectors(1, 0.07, 0.15, true);
        assert_eq!((mu, sigma), (vec![0.07], vec![0.15]));

        let (mu, _) = glidepath_vectors(3, 0.07, 0.15, false);
        assert_eq!(mu, vec![0.07; 3]);
    }

    #[test]
    fn test_sample_path_and_real_finals() {
        let input = sample_input();
        let result = run_monte_carlo(&input).unwrap();

        assert_eq!(result.sample_path.len(), 31);
        assert_eq!(result.sample_path[0].age, 35);
        assert_eq!(result.sample_path[30].age, 65);
        assert_eq!(result.sample_path[0].real, 50_000.0);

        let deflator = 1.02_f64.powi(30);
        assert_relative_eq!(
            result.final_balances_real.mean,
            result.final_balances_nominal.mean / deflator,
            max_relative = 1e-9
        );
    }
}
