//! Earnings history records and lenient CSV parsing

use serde::{Deserialize, Serialize};

/// One year of covered earnings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EarningsRecord {
    pub year: i32,
    pub amount: f64,
}

impl EarningsRecord {
    pub fn new(year: i32, amount: f64) -> Self {
        Self { year, amount }
    }
}

/// Parse pasted `year,amount` lines.
///
/// Each line stands alone: quotes are not special, so a stray `"` spoils only
/// its own line. Lines whose year is not an integer in (1900, 2100) or whose
/// amount is not a number are skipped without error. Columns past the second are ignored and
/// duplicate years are kept as-is.
pub fn parse_earnings_csv(text: &str) -> Vec<EarningsRecord> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .quoting(false)
        .trim(csv::Trim::All)
        .from_reader(text.trim().as_bytes());

    let mut earnings = Vec::new();
    for record in reader.records().flatten() {
        let (Some(year), Some(amount)) = (record.get(0), record.get(1)) else {
            continue;
        };
        let (Ok(year), Ok(amount)) = (year.parse::<i32>(), amount.parse::<f64>()) else {
            continue;
        };
        if year > 1900 && year < 2100 && amount.is_finite() {
            earnings.push(EarningsRecord { year, amount });
        }
    }
    earnings
}
