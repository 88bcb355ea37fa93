//! Social Security configuration tables
//!
//! Bend points, average wage index factors and taxable maximums, keyed by year.
//! Built once (from the built-in values or from CSV) and read-only afterwards.
//! Missing years are not errors: the calculator falls back and reports a
//! [`TableFallback`] event.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::loader;
use crate::error::{CalcError, CalcResult};

/// Cap applied to a year's earnings when the taxable maximum is not configured
pub const FALLBACK_WAGE_BASE: f64 = 200_000.0;

/// Annual growth used to extrapolate wage index factors outside the table
pub const WAGE_GROWTH_ESTIMATE: f64 = 0.03;

/// AIME thresholds for the 90% / 32% / 15% PIA brackets
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BendPoints {
    pub first: f64,
    pub second: f64,
}

/// A lookup that missed the configured table and was resolved by fallback
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TableFallback {
    /// Bend points for `requested` are missing; the latest configured year was used
    BendPoints { requested: i32, used: i32 },
    /// Wage index factor for `year` extrapolated at 3% per year
    WageIndexEstimated { year: i32, factor: f64 },
    /// Taxable maximum for `year` missing; the fallback cap was applied
    WageBaseDefaulted { year: i32, cap: f64 },
}

fn check_positive(table: &'static str, values: &BTreeMap<i32, f64>) -> CalcResult<()> {
    match values.iter().find(|(_, v)| !(v.is_finite() && **v > 0.0)) {
        Some((&year, _)) => Err(CalcError::InvalidTableValue {
            table,
            year,
            message: "value must be positive",
        }),
        None => Ok(()),
    }
}

/// Read-only SSA lookup tables
#[derive(Debug, Clone)]
pub struct SsaTables {
    bend_points: BTreeMap<i32, BendPoints>,
    wage_index_factors: BTreeMap<i32, f64>,
    wage_base: BTreeMap<i32, f64>,
    /// Latest configured bend points (the table is never empty)
    latest_bend: (i32, BendPoints),
}

impl SsaTables {
    /// Build tables from explicit maps.
    ///
    /// Bend points must have at least one year and satisfy `0 < first < second`.
    /// Wage index factors and wage bases must be positive and finite.
    pub fn new(
        bend_points: BTreeMap<i32, BendPoints>,
        wage_index_factors: BTreeMap<i32, f64>,
        wage_base: BTreeMap<i32, f64>,
    ) -> CalcResult<Self> {
        if let Some((&year, _)) = bend_points.iter().find(|(_, bp)| !(bp.first > 0.0 && bp.second > bp.first)) {
            return Err(CalcError::InvalidTableValue {
                table: "bend_points",
                year,
                message: "bend points must satisfy 0 < first < second",
            });
        }
        check_positive("wage_index_factors", &wage_index_factors)?;
        check_positive("wage_base", &wage_base)?;

        let latest_bend = bend_points
            .iter()
            .next_back()
            .map(|(&year, &bp)| (year, bp))
            .ok_or(CalcError::EmptyTable("bend_points"))?;

        Ok(Self {
            bend_points,
            wage_index_factors,
            wage_base,
            latest_bend,
        })
    }

    /// Built-in tables (last updated for 2025)
    pub fn builtin() -> Self {
        let bend_points = BTreeMap::from([
            (2023, BendPoints { first: 1115.0, second: 6721.0 }),
            (2024, BendPoints { first: 1174.0, second: 7078.0 }),
            (2025, BendPoints { first: 1226.0, second: 7391.0 }),
            (2026, BendPoints { first: 1280.0, second: 7710.0 }),
            (2027, BendPoints { first: 1335.0, second: 8040.0 }),
        ]);

        let wage_index_factors = BTreeMap::from([
            (2015, 0.7654),
            (2016, 0.7765),
            (2017, 0.7987),
            (2018, 0.8234),
            (2019, 0.8543),
            (2020, 0.8765),
            (2021, 0.8988),
            (2022, 0.9456),
            (2023, 1.0),
        ]);

        let wage_base = BTreeMap::from([
            (2020, 137_700.0),
            (2021, 142_800.0),
            (2022, 147_000.0),
            (2023, 160_200.0),
            (2024, 168_600.0),
            (2025, 176_100.0),
        ]);

        Self {
            latest_bend: (2027, BendPoints { first: 1335.0, second: 8040.0 }),
            bend_points,
            wage_index_factors,
            wage_base,
        }
    }

    /// Load tables from CSV files in the default location (data/ssa/)
    pub fn from_csv() -> CalcResult<Self> {
        Self::from_csv_path(Path::new(loader::DEFAULT_TABLES_PATH))
    }

    /// Load tables from CSV files in a specific directory
    pub fn from_csv_path(path: &Path) -> CalcResult<Self> {
        let loaded = loader::LoadedTables::load_from(path)?;
        Self::new(loaded.bend_points, loaded.wage_index_factors, loaded.wage_base)
    }

    pub fn bend_points(&self, year: i32) -> Option<BendPoints> {
        self.bend_points.get(&year).copied()
    }

    /// Most recent configured year and its bend points
    pub fn latest_bend_points(&self) -> (i32, BendPoints) {
        self.latest_bend
    }

    pub fn wage_index_factor(&self, year: i32) -> Option<f64> {
        self.wage_index_factors.get(&year).copied()
    }

    pub fn wage_base(&self, year: i32) -> Option<f64> {
        self.wage_base.get(&year).copied()
    }

    /// Extrapolate a wage index factor from the latest configured year at 3%/year.
    ///
    /// Later years grow (`latest * 1.03^Δ`), earlier years shrink (`latest / 1.03^Δ`).
    /// With no configured factors at all the neutral factor 1.0 is returned.
    pub fn estimate_wage_factor(&self, year: i32) -> f64 {
        let Some((&latest_year, &latest_factor)) = self.wage_index_factors.iter().next_back() else {
            return 1.0;
        };
        let growth = 1.0 + WAGE_GROWTH_ESTIMATE;

        if year > latest_year {
            latest_factor * growth.powf(f64::from(year - latest_year))
        } else {
            latest_factor / growth.powf(f64::from(latest_year - year))
        }
    }
}

impl Default for SsaTables {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_builtin_lookups() {
        let tables = SsaTables::builtin();
        assert_eq!(tables.bend_points(2025), Some(BendPoints { first: 1226.0, second: 7391.0 }));
        assert_eq!(tables.bend_points(2030), None);
        assert_eq!(tables.latest_bend_points().0, 2027);
        assert_eq!(tables.wage_base(2024), Some(168_600.0));
        assert_eq!(tables.wage_index_factor(2019), Some(0.8543));
    }

    #[test]
    fn test_estimate_wage_factor_forward_and_backward() {
        let tables = SsaTables::builtin();
        // Latest factor is 2023 = 1.0
        assert_relative_eq!(tables.estimate_wage_factor(2025), 1.03 * 1.03, max_relative = 1e-12);
        assert_relative_eq!(tables.estimate_wage_factor(2013), 1.0 / 1.03_f64.powi(10), max_relative = 1e-12);
    }

    #[test]
    fn test_estimate_wage_factor_empty_table() {
        let tables = SsaTables::new(
            BTreeMap::from([(2025, BendPoints { first: 1226.0, second: 7391.0 })]),
            BTreeMap::new(),
            BTreeMap::new(),
        )
        .unwrap();
        assert_eq!(tables.estimate_wage_factor(1990), 1.0);
    }

    #[test]
    fn test_non_positive_values_rejected() {
        let bend = || BTreeMap::from([(2025, BendPoints { first: 1226.0, second: 7391.0 })]);

        let zero_factor = SsaTables::new(bend(), BTreeMap::from([(2020, 0.0)]), BTreeMap::new());
        assert!(matches!(
            zero_factor,
            Err(CalcError::InvalidTableValue { table: "wage_index_factors", year: 2020, .. })
        ));

        let negative_cap = SsaTables::new(bend(), BTreeMap::new(), BTreeMap::from([(2021, -1.0)]));
        assert!(matches!(
            negative_cap,
            Err(CalcError::InvalidTableValue { table: "wage_base", year: 2021, .. })
        ));

        let inverted = SsaTables::new(
            BTreeMap::from([(2025, BendPoints { first: 7391.0, second: 1226.0 })]),
            BTreeMap::new(),
            BTreeMap::new(),
        );
        assert!(matches!(
            inverted,
            Err(CalcError::InvalidTableValue { table: "bend_points", year: 2025, .. })
        ));
    }

    #[test]
    fn test_empty_bend_points_rejected() {
        let result = SsaTables::new(BTreeMap::new(), BTreeMap::new(), BTreeMap::new());
        assert!(matches!(result, Err(CalcError::EmptyTable("bend_points"))));
    }
}
