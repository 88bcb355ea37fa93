//! Monte Carlo simulation inputs

use serde::{Deserialize, Serialize};

use super::helpers::estimate_required_savings;

fn default_inflation() -> f64 {
    0.02
}

fn default_salary_growth() -> f64 {
    0.03
}

fn default_n_paths() -> usize {
    10_000
}

fn default_seed() -> Option<u64> {
    Some(42)
}

fn default_true() -> bool {
    true
}

/// Accumulation-phase simulation request
///
/// Optional fields take their defaults when absent. An explicit `"seed": null`
/// requests an unseeded (non-reproducible) run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloInput {
    pub current_age: u32,
    pub retire_age: u32,
    pub current_balance: f64,
    /// Employee contribution in the first simulated year
    pub annual_contrib: f64,
    /// Expected mean annual return (decimal)
    pub expected_return: f64,
    /// Annual return standard deviation (decimal)
    pub return_volatility: f64,

    /// Employer match as a fraction of the employee contribution
    #[serde(default)]
    pub employer_match_rate: f64,
    #[serde(default = "default_inflation")]
    pub inflation: f64,
    /// Annual growth of the contribution
    #[serde(default = "default_salary_growth")]
    pub salary_growth: f64,
    #[serde(default = "default_n_paths")]
    pub n_paths: usize,
    #[serde(default = "default_seed")]
    pub seed: Option<u64>,
    /// Expense ratio deducted from the balance each year
    #[serde(default)]
    pub fees_annual: f64,
    /// Lower return and volatility linearly toward retirement
    #[serde(default)]
    pub glidepath: bool,
    /// Carried for API compatibility; the single-asset model has nothing to rebalance
    #[serde(default = "default_true")]
    pub rebalance_annually: bool,
    #[serde(default)]
    pub target_goal: Option<TargetGoal>,
}

impl MonteCarloInput {
    /// Input with the required fields set and every optional field at its default
    pub fn new(
        current_age: u32,
        retire_age: u32,
        current_balance: f64,
        annual_contrib: f64,
        expected_return: f64,
        return_volatility: f64,
    ) -> Self {
        Self {
            current_age,
            retire_age,
            current_balance,
            annual_contrib,
            expected_return,
            return_volatility,
            employer_match_rate: 0.0,
            inflation: default_inflation(),
            salary_growth: default_salary_growth(),
            n_paths: default_n_paths(),
            seed: default_seed(),
            fees_annual: 0.0,
            glidepath: false,
            rebalance_annually: true,
            target_goal: None,
        }
    }

    /// Number of simulated years (zero when retire_age <= current_age)
    pub fn years(&self) -> u32 {
        self.retire_age.saturating_sub(self.current_age)
    }
}

/// Retirement spending goal used for the success probability
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TargetGoal {
    #[serde(default)]
    pub retirement_spend: Option<f64>,
    #[serde(default)]
    pub horizon_years: Option<u32>,
}

impl TargetGoal {
    pub fn new(retirement_spend: f64, horizon_years: u32) -> Self {
        Self {
            retirement_spend: Some(retirement_spend),
            horizon_years: Some(horizon_years),
        }
    }

    /// Real balance needed at retirement to fund the goal, if the goal is complete.
    ///
    /// A missing or zero spend or horizon means there is no goal to test against.
    pub fn required_savings(&self, inflation: f64, expected_return: f64) -> Option<f64> {
        match (self.retirement_spend, self.horizon_years) {
            (Some(spend), Some(horizon)) if spend != 0.0 && horizon != 0 => {
                Some(estimate_required_savings(spend, horizon, inflation, expected_return))
            }
            _ => None,
        }
    }
}
