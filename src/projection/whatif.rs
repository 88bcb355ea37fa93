//! What-if scenario projections
//!
//! Simplified real-dollar projections used to compare a baseline savings plan
//! against alternatives. Contributions are a percentage of an assumed income and
//! are deposited at the start of each year; growth uses the real return
//! `(return_rate - inflation) / 100`.

use serde::{Deserialize, Serialize};

/// Age at which what-if projections stop
pub const WHATIF_RETIREMENT_AGE: u32 = 65;

/// Income used to turn a savings percentage into a dollar contribution
pub const ASSUMED_ANNUAL_INCOME: f64 = 100_000.0;

/// A savings plan to compare
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatIfScenario {
    pub id: String,
    pub name: String,
    /// Current age
    pub age: u32,
    /// Annual contribution as % of income (0-100)
    pub contribution: f64,
    /// Expected annual return in percent (e.g. 7 for 7%)
    pub return_rate: f64,
    /// Expected inflation in percent
    pub inflation: f64,
    /// Current balance in dollars
    pub current_savings: f64,
    /// Overrides `contribution` when present
    #[serde(default)]
    pub savings_rate: Option<f64>,
}

impl WhatIfScenario {
    pub fn baseline() -> Self {
        Self {
            id: "baseline".to_string(),
            name: "Baseline".to_string(),
            age: 30,
            contribution: 10.0,
            return_rate: 7.0,
            inflation: 3.0,
            current_savings: 50_000.0,
            savings_rate: None,
        }
    }

    /// A fresh numbered alternative with baseline assumptions
    pub fn numbered(index: usize) -> Self {
        Self {
            id: format!("whatif{}", index),
            name: format!("What-If {}", index),
            ..Self::baseline()
        }
    }

    /// Copy of this scenario under a new numbered id
    pub fn clone_as(&self, index: usize) -> Self {
        Self {
            id: format!("whatif{}", index),
            name: format!("{} (Copy)", self.name),
            ..self.clone()
        }
    }

    fn annual_contribution(&self) -> f64 {
        let rate = self.savings_rate.unwrap_or(self.contribution);
        ASSUMED_ANNUAL_INCOME * (rate / 100.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProjectionPoint {
    pub age: u32,
    pub balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioProjection {
    pub scenario: WhatIfScenario,
    pub data: Vec<ProjectionPoint>,
    pub final_balance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhatIfComparison {
    pub baseline: ScenarioProjection,
    pub scenarios: Vec<ScenarioProjection>,
    pub max_balance: f64,
    pub min_balance: f64,
}

/// Project a scenario from its current age to 65, one point per year.
///
/// Balances are rounded to whole dollars (halves round up). A scenario already
/// at or past 65 yields its current savings as the only point.
pub fn calculate_projection(scenario: &WhatIfScenario) -> Vec<ProjectionPoint> {
    if scenario.age >= WHATIF_RETIREMENT_AGE {
        return vec![ProjectionPoint {
            age: scenario.age,
            balance: scenario.current_savings,
        }];
    }
    let years = WHATIF_RETIREMENT_AGE - scenario.age;

    let contribution = scenario.annual_contribution();
    let real_return = (scenario.return_rate - scenario.inflation) / 100.0;

    let mut balance = scenario.current_savings;
    let mut data = Vec::with_capacity(years as usize + 1);
    for year in 0..=years {
        data.push(ProjectionPoint {
            age: scenario.age + year,
            balance: (balance + 0.5).floor(),
        });
        if year < years {
            balance = (balance + contribution) * (1.0 + real_return);
        }
    }
    data
}

pub fn scenario_projection(scenario: &WhatIfScenario) -> ScenarioProjection {
    let data = calculate_projection(scenario);
    let final_balance = data.last().map(|p| p.balance).unwrap_or(0.0);
    ScenarioProjection {
        scenario: scenario.clone(),
        data,
        final_balance,
    }
}

/// Project the baseline and every alternative, tracking the range of final balances
pub fn compare_scenarios(baseline: &WhatIfScenario, scenarios: &[WhatIfScenario]) -> WhatIfComparison {
    let baseline = scenario_projection(baseline);
    let scenarios: Vec<_> = scenarios.iter().map(scenario_projection).collect();

    let finals = std::iter::once(baseline.final_balance).chain(scenarios.iter().map(|p| p.final_balance));
    let (min_balance, max_balance) = finals.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    WhatIfComparison {
        baseline,
        scenarios,
        max_balance,
        min_balance,
    }
}

/// Final-balance difference of `scenario` over `baseline`
pub fn calculate_difference(scenario: &WhatIfScenario, baseline: &WhatIfScenario) -> f64 {
    scenario_projection(scenario).final_balance - scenario_projection(baseline).final_balance
}
