//! Monte Carlo output types

use serde::{Deserialize, Serialize};

use super::stats::Moments;

/// The five reported percentile levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Percentile {
    P5,
    P25,
    P50,
    P75,
    P95,
}

impl Percentile {
    pub const ALL: [Percentile; 5] = [
        Percentile::P5,
        Percentile::P25,
        Percentile::P50,
        Percentile::P75,
        Percentile::P95,
    ];

    /// Level on the 0..=100 scale
    pub const fn level(self) -> f64 {
        match self {
            Percentile::P5 => 5.0,
            Percentile::P25 => 25.0,
            Percentile::P50 => 50.0,
            Percentile::P75 => 75.0,
            Percentile::P95 => 95.0,
        }
    }
}

/// Percentile series, each indexed by years since the start of the simulation
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PercentileBands {
    pub p5: Vec<f64>,
    pub p25: Vec<f64>,
    pub p50: Vec<f64>,
    pub p75: Vec<f64>,
    pub p95: Vec<f64>,
}

impl PercentileBands {
    /// Build from one `[p5, p25, p50, p75, p95]` row per year
    pub fn from_rows(rows: &[[f64; 5]]) -> Self {
        let column = |i: usize| rows.iter().map(|row| row[i]).collect();
        Self {
            p5: column(0),
            p25: column(1),
            p50: column(2),
            p75: column(3),
            p95: column(4),
        }
    }

    pub fn get(&self, percentile: Percentile) -> &[f64] {
        match percentile {
            Percentile::P5 => &self.p5,
            Percentile::P25 => &self.p25,
            Percentile::P50 => &self.p50,
            Percentile::P75 => &self.p75,
            Percentile::P95 => &self.p95,
        }
    }

    /// Number of year points
    pub fn len(&self) -> usize {
        self.p50.len()
    }

    pub fn is_empty(&self) -> bool {
        self.p50.is_empty()
    }
}

/// One year of the sample path
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PathPoint {
    pub age: u32,
    pub nominal: f64,
    pub real: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResponse {
    pub percentiles: PercentileBands,
    pub final_balances_nominal: Moments,
    pub final_balances_real: Moments,
    /// Fraction of paths meeting the target goal; `None` without a complete goal
    pub success_probability: Option<f64>,
    /// First simulated path, from the current age through retirement
    pub sample_path: Vec<PathPoint>,
}

impl MonteCarloResponse {
    /// Median balance in the final year
    pub fn median_final(&self) -> Option<f64> {
        self.percentiles.p50.last().copied()
    }
}
