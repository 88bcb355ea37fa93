//! Input validation
//!
//! Every violated constraint is reported; nothing short-circuits.

use serde::{Deserialize, Serialize};

use super::input::MonteCarloInput;
use crate::error::{CalcError, CalcResult};

/// Longest accumulation horizon the engine will simulate
pub const MAX_SIMULATION_YEARS: u32 = 70;

pub const MIN_PATHS: usize = 100;
pub const MAX_PATHS: usize = 200_000;

/// Upper bound on `fees_annual` (5%)
pub const MAX_ANNUAL_FEES: f64 = 0.05;

/// Outcome of [`validate_monte_carlo_input`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Convert into a `Result`, carrying the full error list on failure
    pub fn into_result(self) -> CalcResult<()> {
        if self.valid {
            Ok(())
        } else {
            Err(CalcError::Validation(self.errors))
        }
    }
}

pub fn validate_monte_carlo_input(input: &MonteCarloInput) -> ValidationReport {
    let mut errors = Vec::new();
    let mut check = |ok: bool, message: &str| {
        if !ok {
            errors.push(message.to_string());
        }
    };

    check(
        (1..=99).contains(&input.current_age),
        "Current age must be between 1 and 99",
    );
    check(
        input.retire_age > input.current_age,
        "Retirement age must be greater than current age",
    );
    check(input.retire_age <= 100, "Retirement age cannot exceed 100");
    check(
        input.retire_age <= input.current_age || input.years() <= MAX_SIMULATION_YEARS,
        "Simulation horizon cannot exceed 70 years",
    );
    check(input.current_balance >= 0.0, "Current balance cannot be negative");
    check(input.annual_contrib >= 0.0, "Annual contribution cannot be negative");
    check(input.employer_match_rate >= 0.0, "Employer match rate cannot be negative");
    check(input.expected_return > -0.9, "Expected return must be greater than -90%");
    check(input.return_volatility >= 0.0, "Return volatility cannot be negative");
    check(input.inflation >= 0.0, "Inflation cannot be negative");
    check(
        (MIN_PATHS..=MAX_PATHS).contains(&input.n_paths),
        "Number of paths must be between 100 and 200,000",
    );
    check(
        (0.0..=MAX_ANNUAL_FEES).contains(&input.fees_annual),
        "Annual fees must be between 0% and 5%",
    );
    check(input.salary_growth.is_finite(), "Salary growth must be a finite number");
    check(
        [
            input.current_balance,
            input.annual_contrib,
            input.employer_match_rate,
            input.expected_return,
            input.return_volatility,
            input.inflation,
        ]
        .iter()
        .all(|v| v.is_finite()),
        "Balances, contributions and rates must be finite numbers",
    );

    ValidationReport::from_errors(errors)
}
