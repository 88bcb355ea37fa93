//! Output series for deterministic projections

use serde::{Deserialize, Serialize};

/// Year-indexed nominal and inflation-adjusted balances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    /// Balances in nominal dollars, index 0 = initial balance
    pub nominal_balances: Vec<f64>,

    /// Balances in today's dollars, same length as `nominal_balances`
    pub real_balances: Vec<f64>,
}

impl ProjectionResult {
    /// Number of projected years (series length minus the starting point)
    pub fn years(&self) -> usize {
        self.nominal_balances.len().saturating_sub(1)
    }

    /// Get summary statistics
    pub fn summary(&self) -> ProjectionSummary {
        let initial = self.nominal_balances.first().copied().unwrap_or(0.0);
        let final_nominal = self.nominal_balances.last().copied().unwrap_or(0.0);
        let final_real = self.real_balances.last().copied().unwrap_or(0.0);

        ProjectionSummary {
            years: self.years() as u32,
            initial_balance: initial,
            final_nominal,
            final_real,
            nominal_growth: final_nominal - initial,
            inflation_erosion: final_nominal - final_real,
        }
    }
}

/// Summary of a projection's end state
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionSummary {
    pub years: u32,
    pub initial_balance: f64,
    pub final_nominal: f64,
    pub final_real: f64,
    pub nominal_growth: f64,
    /// Purchasing power lost to inflation at the horizon
    pub inflation_erosion: f64,
}
