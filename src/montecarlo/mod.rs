//! Monte Carlo retirement-outcome simulation
//!
//! Runs many independent accumulation paths with random annual returns and
//! summarizes them as percentile bands, final-balance moments and the chance of
//! meeting a spending goal.

mod engine;
mod helpers;
mod input;
mod response;
mod shocks;
mod stats;
mod validation;

pub use engine::{
    glidepath_vectors, run_monte_carlo, MonteCarloConfig, MonteCarloEngine, PercentileBasis,
    GLIDEPATH_RETURN_DROP, GLIDEPATH_VOLATILITY_SCALE,
};
pub use helpers::{
    apply_risk_profile, contribution_growth, estimate_required_savings, percentile_at_age, percentile_range,
    probability_message, risk_level, total_contributions, transform_to_chart, years_to_retirement, ChartPoint,
    PercentileRange, RiskLevel, RiskProfile,
};
pub use input::{MonteCarloInput, TargetGoal};
pub use response::{MonteCarloResponse, PathPoint, Percentile, PercentileBands};
pub use shocks::{PathRng, SeededStreams, ShockSource, ShockStreams};
pub use stats::{percentile_sorted, percentiles, Moments};
pub use validation::{
    validate_monte_carlo_input, ValidationReport, MAX_ANNUAL_FEES, MAX_PATHS, MAX_SIMULATION_YEARS, MIN_PATHS,
};
