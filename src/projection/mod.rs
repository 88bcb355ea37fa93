//! Deterministic projections: single-path compound growth and what-if scenarios

mod engine;
mod series;
mod whatif;

pub use engine::{simulate_deterministic, ProjectionInput};
pub use series::{ProjectionResult, ProjectionSummary};
pub use whatif::{
    calculate_difference, calculate_projection, compare_scenarios, scenario_projection,
    ProjectionPoint, ScenarioProjection, WhatIfComparison, WhatIfScenario, ASSUMED_ANNUAL_INCOME,
    WHATIF_RETIREMENT_AGE,
};
