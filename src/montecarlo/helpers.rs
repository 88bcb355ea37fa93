//! Result shaping and planning helpers around the simulation

use serde::{Deserialize, Serialize};

use super::input::MonteCarloInput;
use super::response::{MonteCarloResponse, Percentile};

/// Real returns closer to zero than this use the undiscounted sum
const NEAR_ZERO_REAL_RETURN: f64 = 0.0001;

/// Percentile bands at one age
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub age: u32,
    pub p5: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p95: f64,
}

impl ChartPoint {
    pub fn get(&self, percentile: Percentile) -> f64 {
        match percentile {
            Percentile::P5 => self.p5,
            Percentile::P25 => self.p25,
            Percentile::P50 => self.p50,
            Percentile::P75 => self.p75,
            Percentile::P95 => self.p95,
        }
    }
}

/// Re-key the percentile series by age. Series shorter than the longest are padded with 0.
pub fn transform_to_chart(response: &MonteCarloResponse, start_age: u32) -> Vec<ChartPoint> {
    let bands = &response.percentiles;
    let length = Percentile::ALL
        .iter()
        .map(|&p| bands.get(p).len())
        .max()
        .unwrap_or(0);
    let at = |p: Percentile, i: usize| bands.get(p).get(i).copied().unwrap_or(0.0);

    (0..length)
        .map(|i| ChartPoint {
            age: start_age + i as u32,
            p5: at(Percentile::P5, i),
            p25: at(Percentile::P25, i),
            p50: at(Percentile::P50, i),
            p75: at(Percentile::P75, i),
            p95: at(Percentile::P95, i),
        })
        .collect()
}

pub fn percentile_at_age(points: &[ChartPoint], age: u32, percentile: Percentile) -> Option<f64> {
    points.iter().find(|p| p.age == age).map(|p| p.get(percentile))
}

/// Median with the p95/p5 spread at one age
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PercentileRange {
    pub median: f64,
    pub best: f64,
    pub worst: f64,
    pub range: f64,
}

/// Spread at `age`; all zeros when the age is not charted
pub fn percentile_range(points: &[ChartPoint], age: u32) -> PercentileRange {
    points
        .iter()
        .find(|p| p.age == age)
        .map(|p| PercentileRange {
            median: p.p50,
            best: p.p95,
            worst: p.p5,
            range: p.p95 - p.p5,
        })
        .unwrap_or_default()
}

/// Plain-language reading of a success probability
pub fn probability_message(probability: Option<f64>) -> String {
    let Some(probability) = probability.filter(|p| !p.is_nan()) else {
        return "Unable to calculate probability".to_string();
    };
    let percent = probability * 100.0;
    let shown = percent.round();

    if percent >= 90.0 {
        format!("Excellent! {shown}% chance of meeting your retirement goal.")
    } else if percent >= 75.0 {
        format!("Good! {shown}% chance of meeting your retirement goal.")
    } else if percent >= 50.0 {
        format!("Fair. {shown}% chance of meeting your retirement goal. Consider increasing contributions.")
    } else if percent >= 25.0 {
        format!(
            "Concerning. Only {shown}% chance of meeting your retirement goal. Significant changes needed."
        )
    } else {
        format!("High risk. Only {shown}% chance of meeting your retirement goal. Major adjustments required.")
    }
}

pub fn years_to_retirement(current_age: u32, retire_age: u32) -> u32 {
    retire_age.saturating_sub(current_age)
}

/// Coarse risk bucket by return volatility
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Conservative,
    Moderate,
    Aggressive,
}

/// Return assumptions for a risk level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RiskProfile {
    pub expected_return: f64,
    pub return_volatility: f64,
}

impl RiskLevel {
    pub fn profile(self) -> RiskProfile {
        let (expected_return, return_volatility) = match self {
            RiskLevel::Conservative => (0.05, 0.08),
            RiskLevel::Moderate => (0.07, 0.15),
            RiskLevel::Aggressive => (0.09, 0.22),
        };
        RiskProfile {
            expected_return,
            return_volatility,
        }
    }
}

pub fn risk_level(volatility: f64) -> RiskLevel {
    if volatility <= 0.10 {
        RiskLevel::Conservative
    } else if volatility <= 0.18 {
        RiskLevel::Moderate
    } else {
        RiskLevel::Aggressive
    }
}

/// Copy of `input` with the return assumptions of `level`
pub fn apply_risk_profile(input: &MonteCarloInput, level: RiskLevel) -> MonteCarloInput {
    let profile = level.profile();
    MonteCarloInput {
        expected_return: profile.expected_return,
        return_volatility: profile.return_volatility,
        ..input.clone()
    }
}

/// Contribution for each of `years` years, growing at `salary_growth`
pub fn contribution_growth(initial_contribution: f64, salary_growth: f64, years: u32) -> Vec<f64> {
    std::iter::successors(Some(initial_contribution), |c| Some(c * (1.0 + salary_growth)))
        .take(years as usize)
        .collect()
}

/// Employee plus employer contributions over `years`
pub fn total_contributions(initial_contribution: f64, salary_growth: f64, employer_match_rate: f64, years: u32) -> f64 {
    let employee: f64 = contribution_growth(initial_contribution, salary_growth, years).iter().sum();
    employee + employee * employer_match_rate
}

/// Present value of a level real withdrawal of `retirement_spend` for `horizon_years`.
///
/// Discounts at the real return `(1 + expected_return) / (1 + inflation) - 1`.
pub fn estimate_required_savings(
    retirement_spend: f64,
    horizon_years: u32,
    inflation: f64,
    expected_return: f64,
) -> f64 {
    let real_return = (1.0 + expected_return) / (1.0 + inflation) - 1.0;
    let horizon = f64::from(horizon_years);

    if real_return.abs() < NEAR_ZERO_REAL_RETURN {
        return retirement_spend * horizon;
    }
    retirement_spend * (1.0 - (1.0 + real_return).powf(-horizon)) / real_return
}
