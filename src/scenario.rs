//! Scenario runner for batch calculations
//!
//! Loads SSA tables once, then runs many projections, benefit calculations and
//! simulations without re-reading CSV files. Batches are spread over the rayon
//! pool; results come back in request order.

use std::path::Path;
use std::sync::Arc;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::CalcResult;
use crate::montecarlo::{MonteCarloConfig, MonteCarloEngine, MonteCarloInput, MonteCarloResponse};
use crate::projection::{simulate_deterministic, ProjectionInput, ProjectionResult};
use crate::ssa::{
    AimeSource, ClaimAge, ClaimAgeBenefit, EarningsRecord, SsaCalculation, SsaCalculator, SsaTables, TableFallback,
};

/// One benefit calculation: a known AIME, or the earnings history to derive it from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsaRequest {
    pub birth_year: i32,
    pub claim_age: ClaimAge,
    /// Takes precedence over `earnings` when present
    #[serde(default)]
    pub aime: Option<f64>,
    #[serde(default)]
    pub earnings: Vec<EarningsRecord>,
}

impl SsaRequest {
    pub fn from_aime(aime: f64, birth_year: i32, claim_age: ClaimAge) -> Self {
        Self {
            birth_year,
            claim_age,
            aime: Some(aime),
            earnings: Vec::new(),
        }
    }

    pub fn from_earnings(earnings: Vec<EarningsRecord>, birth_year: i32, claim_age: ClaimAge) -> Self {
        Self {
            birth_year,
            claim_age,
            aime: None,
            earnings,
        }
    }

    pub fn source(&self) -> AimeSource<'_> {
        match self.aime {
            Some(aime) => AimeSource::Aime(aime),
            None => AimeSource::Earnings(&self.earnings),
        }
    }
}

/// Pre-loaded runner for batch calculations
///
/// # Example
/// ```ignore
/// let runner = ScenarioRunner::from_csv()?;
///
/// let requests: Vec<SsaRequest> = (62..=70)
///     .map(|age| SsaRequest::from_aime(5_000.0, 1962, ClaimAge::new(age).unwrap()))
///     .collect();
/// let results = runner.run_ssa_batch(&requests);
/// ```
#[derive(Debug, Clone)]
pub struct ScenarioRunner {
    calculator: SsaCalculator,
    engine: MonteCarloEngine,
}

impl ScenarioRunner {
    /// Runner with the built-in SSA tables
    pub fn new() -> Self {
        Self::with_tables(SsaTables::builtin())
    }

    /// Load SSA tables from the default CSV directory
    pub fn from_csv() -> CalcResult<Self> {
        Ok(Self::with_tables(SsaTables::from_csv()?))
    }

    /// Load SSA tables from a specific directory
    pub fn from_csv_path(path: &Path) -> CalcResult<Self> {
        Ok(Self::with_tables(SsaTables::from_csv_path(path)?))
    }

    pub fn with_tables(tables: SsaTables) -> Self {
        Self {
            calculator: SsaCalculator::with_shared_tables(Arc::new(tables)),
            engine: MonteCarloEngine::default(),
        }
    }

    pub fn with_engine_config(mut self, config: MonteCarloConfig) -> Self {
        self.engine = MonteCarloEngine::new(config);
        self
    }

    /// Forward table fallbacks to `observer` for every calculation this runner makes
    pub fn with_observer(mut self, observer: impl Fn(&TableFallback) + Send + Sync + 'static) -> Self {
        self.calculator = self.calculator.with_observer(observer);
        self
    }

    pub fn calculator(&self) -> &SsaCalculator {
        &self.calculator
    }

    pub fn engine(&self) -> &MonteCarloEngine {
        &self.engine
    }

    pub fn run_projections(&self, inputs: &[ProjectionInput]) -> Vec<ProjectionResult> {
        inputs.par_iter().map(simulate_deterministic).collect()
    }

    pub fn run_ssa(&self, request: &SsaRequest) -> SsaCalculation {
        self.calculator
            .calculate_ssa(request.source(), request.birth_year, request.claim_age)
    }

    pub fn run_ssa_batch(&self, requests: &[SsaRequest]) -> Vec<SsaCalculation> {
        requests.par_iter().map(|r| self.run_ssa(r)).collect()
    }

    /// Benefit at every claim age for one earner (the request's claim age is ignored)
    pub fn run_claim_age_sweep(&self, request: &SsaRequest) -> Vec<ClaimAgeBenefit> {
        self.calculator.claim_age_sweep(request.source(), request.birth_year)
    }

    pub fn run_monte_carlo(&self, input: &MonteCarloInput) -> CalcResult<MonteCarloResponse> {
        self.engine.run(input)
    }

    /// Each input is validated and simulated independently; one failure does not stop the rest
    pub fn run_monte_carlo_batch(&self, inputs: &[MonteCarloInput]) -> Vec<CalcResult<MonteCarloResponse>> {
        inputs.par_iter().map(|input| self.engine.run(input)).collect()
    }
}

impl Default for ScenarioRunner {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CalcError;
    use std::sync::Mutex;

    #[test]
    fn test_projection_batch_keeps_order() {
        let runner = ScenarioRunner::new();
        let inputs: Vec<ProjectionInput> = [0.03, 0.05, 0.07]
            .iter()
            .map(|&annual_return| ProjectionInput {
                initial_balance: 10_000.0,
                annual_contribution: 1_000.0,
                years: 10,
                annual_return,
                inflation: 0.02,
            })
            .collect();

        let results = runner.run_projections(&inputs);
        assert_eq!(results.len(), 3);

        // Higher return should give a higher final balance
        assert!(results[2].summary().final_nominal > results[1].summary().final_nominal);
        assert!(results[1].summary().final_nominal > results[0].summary().final_nominal);
    }

    #[test]
    fn test_ssa_batch_across_claim_ages() {
        let runner = ScenarioRunner::new();
        let requests: Vec<SsaRequest> = ClaimAge::all()
            .map(|age| SsaRequest::from_aime(5_000.0, 1962, age))
            .collect();

        let results = runner.run_ssa_batch(&requests);
        let sweep = runner.run_claim_age_sweep(&requests[0]);

        assert_eq!(results.len(), sweep.len());
        for (calc, point) in results.iter().zip(&sweep) {
            assert_eq!(calc.monthly_at_claim_age, point.monthly_benefit);
            assert_eq!(calc.pia, results[0].pia);
        }
    }

    #[test]
    fn test_request_json() {
        let request: SsaRequest = serde_json::from_str(
            r#"{"birthYear":1962,"claimAge":67,"earnings":[{"year":2020,"amount":75000}]}"#,
        )
        .unwrap();
        assert_eq!(request.aime, None);
        assert!(matches!(request.source(), AimeSource::Earnings(e) if e.len() == 1));

        assert!(serde_json::from_str::<SsaRequest>(r#"{"birthYear":1962,"claimAge":61}"#).is_err());
    }

    #[test]
    fn test_observer_sees_fallbacks() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let runner = ScenarioRunner::new().with_observer(move |event| sink.lock().unwrap().push(*event));

        // Born 1990: bend points for 2052 are not configured
        runner.run_ssa(&SsaRequest::from_aime(3_000.0, 1990, ClaimAge::LATEST));

        let events = seen.lock().unwrap();
        assert!(events
            .iter()
            .any(|e| matches!(e, TableFallback::BendPoints { requested: 2052, .. })));
    }

    #[test]
    fn test_monte_carlo_batch_isolates_failures() {
        let runner = ScenarioRunner::new().with_engine_config(MonteCarloConfig {
            parallel: false,
            ..Default::default()
        });
        let good = MonteCarloInput {
            n_paths: 200,
            ..MonteCarloInput::new(40, 65, 20_000.0, 6_000.0, 0.06, 0.12)
        };
        let bad = MonteCarloInput {
            n_paths: 10,
            ..good.clone()
        };

        let results = runner.run_monte_carlo_batch(&[good.clone(), bad]);
        assert!(results[0].is_ok());
        assert!(matches!(results[1], Err(CalcError::Validation(_))));

        // Same seed through the runner and directly gives the same answer
        let direct = runner.run_monte_carlo(&good).unwrap();
        assert_eq!(results[0].as_ref().unwrap(), &direct);
    }
}
