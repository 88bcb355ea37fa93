//! Deterministic compound-growth projector
//!
//! One path, fixed annual return, end-of-year contributions. Real balances are
//! the nominal balances deflated by cumulative inflation.

use serde::{Deserialize, Serialize};

use super::series::ProjectionResult;

/// Inputs for a deterministic projection
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionInput {
    /// Starting balance
    pub initial_balance: f64,

    /// Deposit made at the end of every year
    pub annual_contribution: f64,

    /// Number of years to project
    pub years: u32,

    /// Nominal annual return (decimal, e.g. 0.07)
    pub annual_return: f64,

    /// Annual inflation used to deflate nominal balances (decimal)
    pub inflation: f64,
}

/// Project balances year by year.
///
/// `nominal[i] = nominal[i-1] * (1 + annual_return) + annual_contribution` and
/// `real[i] = nominal[i] / (1 + inflation)^i`. Both series hold `years + 1` values.
pub fn simulate_deterministic(input: &ProjectionInput) -> ProjectionResult {
    let len = input.years as usize + 1;
    let mut nominal = Vec::with_capacity(len);
    let mut real = Vec::with_capacity(len);

    nominal.push(input.initial_balance);
    real.push(input.initial_balance);

    let growth = 1.0 + input.annual_return;
    let deflator_base = 1.0 + input.inflation;

    for i in 1..len {
        let next = nominal[i - 1] * growth + input.annual_contribution;
        nominal.push(next);
        real.push(next / deflator_base.powf(i as f64));
    }

    ProjectionResult {
        nominal_balances: nominal,
        real_balances: real,
    }
}
