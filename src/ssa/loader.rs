//! CSV-based table loader
//!
//! Loads SSA configuration tables from CSV files in data/ssa/

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::tables::BendPoints;
use crate::error::{CalcError, CalcResult};

/// Default path to the tables directory
pub const DEFAULT_TABLES_PATH: &str = "data/ssa";

#[derive(Debug, Deserialize)]
struct BendPointRow {
    year: i32,
    first: f64,
    second: f64,
}

#[derive(Debug, Deserialize)]
struct FactorRow {
    year: i32,
    factor: f64,
}

#[derive(Debug, Deserialize)]
struct WageBaseRow {
    year: i32,
    cap: f64,
}

/// Read every row of a headed CSV file, keeping the line number for error reports
fn read_rows<T: DeserializeOwned>(path: &Path) -> CalcResult<Vec<(u64, T)>> {
    let load_err = |source| CalcError::TableLoad {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(load_err)?;

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(load_err)?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row: T = record.deserialize(None).map_err(|e| CalcError::TableRow {
            path: path.to_path_buf(),
            line,
            message: e.to_string(),
        })?;
        rows.push((line, row));
    }
    Ok(rows)
}

fn bad_row(path: &Path, line: u64, message: impl Into<String>) -> CalcError {
    CalcError::TableRow {
        path: path.to_path_buf(),
        line,
        message: message.into(),
    }
}

/// Load bend points from CSV (`year,first,second`)
pub fn load_bend_points(path: &Path) -> CalcResult<BTreeMap<i32, BendPoints>> {
    let file = path.join("bend_points.csv");
    let mut table = BTreeMap::new();

    for (line, row) in read_rows::<BendPointRow>(&file)? {
        if !(row.first > 0.0 && row.second > row.first) {
            return Err(bad_row(&file, line, "bend points must satisfy 0 < first < second"));
        }
        table.insert(row.year, BendPoints { first: row.first, second: row.second });
    }

    if table.is_empty() {
        return Err(CalcError::EmptyTable("bend_points"));
    }
    Ok(table)
}

/// Load wage index factors from CSV (`year,factor`)
pub fn load_wage_index_factors(path: &Path) -> CalcResult<BTreeMap<i32, f64>> {
    let file = path.join("wage_index_factors.csv");
    let mut table = BTreeMap::new();

    for (line, row) in read_rows::<FactorRow>(&file)? {
        if row.factor <= 0.0 {
            return Err(bad_row(&file, line, "wage index factor must be positive"));
        }
        table.insert(row.year, row.factor);
    }
    Ok(table)
}

/// Load taxable maximums from CSV (`year,cap`)
pub fn load_wage_base(path: &Path) -> CalcResult<BTreeMap<i32, f64>> {
    let file = path.join("wage_base.csv");
    let mut table = BTreeMap::new();

    for (line, row) in read_rows::<WageBaseRow>(&file)? {
        if row.cap <= 0.0 {
            return Err(bad_row(&file, line, "wage base must be positive"));
        }
        table.insert(row.year, row.cap);
    }
    Ok(table)
}

/// All tables loaded from one directory
#[derive(Debug)]
pub struct LoadedTables {
    pub source: PathBuf,
    pub bend_points: BTreeMap<i32, BendPoints>,
    pub wage_index_factors: BTreeMap<i32, f64>,
    pub wage_base: BTreeMap<i32, f64>,
}

impl LoadedTables {
    /// Load all tables from the default path
    pub fn load_default() -> CalcResult<Self> {
        Self::load_from(Path::new(DEFAULT_TABLES_PATH))
    }

    /// Load all tables from a specific path
    pub fn load_from(path: &Path) -> CalcResult<Self> {
        let loaded = Self {
            source: path.to_path_buf(),
            bend_points: load_bend_points(path)?,
            wage_index_factors: load_wage_index_factors(path)?,
            wage_base: load_wage_base(path)?,
        };
        log::info!(
            "Loaded SSA tables from {}: {} bend point years, {} wage index years, {} wage base years",
            path.display(),
            loaded.bend_points.len(),
            loaded.wage_index_factors.len(),
            loaded.wage_base.len(),
        );
        Ok(loaded)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ssa::SsaTables;
    use std::fs;

    #[test]
    fn test_load_default_tables() {
        let result = LoadedTables::load_default();
        assert!(result.is_ok(), "Failed to load tables: {:?}", result.err());

        let tables = result.unwrap();
        let builtin = SsaTables::builtin();

        // Shipped CSVs carry the same values as the built-in tables
        for (year, bp) in &tables.bend_points {
            assert_eq!(builtin.bend_points(*year), Some(*bp));
        }
        for (year, factor) in &tables.wage_index_factors {
            assert_eq!(builtin.wage_index_factor(*year), Some(*factor));
        }
        for (year, cap) in &tables.wage_base {
            assert_eq!(builtin.wage_base(*year), Some(*cap));
        }
        assert!(tables.bend_points.len() >= 5);
    }

    #[test]
    fn test_rejects_inverted_bend_points() {
        let dir = std::env::temp_dir().join(format!("ssa_tables_bad_{}", std::process::id()));
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("bend_points.csv"), "year,first,second\n2025,7391,1226\n").unwrap();

        let err = load_bend_points(&dir).unwrap_err();
        assert!(matches!(err, CalcError::TableRow { line: 2, .. }), "got {:?}", err);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_missing_directory() {
        let err = LoadedTables::load_from(Path::new("does/not/exist")).unwrap_err();
        assert!(matches!(err, CalcError::TableLoad { .. }));
    }
}
