//! Retirement calculation engines
//!
//! This library provides:
//! - Deterministic compound-growth projections with nominal and real balances
//! - What-if scenario comparison to age 65
//! - Social Security estimates (wage indexing, AIME, PIA, claim-age adjustment)
//! - Monte Carlo accumulation simulations with percentile bands and goal success probability
//! - Batch running over pre-loaded SSA tables

pub mod error;
pub mod montecarlo;
pub mod projection;
pub mod scenario;
pub mod ssa;

// Re-export commonly used types
pub use error::{CalcError, CalcResult};
pub use montecarlo::{run_monte_carlo, MonteCarloEngine, MonteCarloInput, MonteCarloResponse};
pub use projection::{simulate_deterministic, ProjectionInput, ProjectionResult};
pub use scenario::{ScenarioRunner, SsaRequest};
pub use ssa::{ClaimAge, EarningsRecord, SsaCalculation, SsaCalculator, SsaTables};
