//! AIME, PIA and benefit calculation over injected SSA tables
//!
//! Steps, each exposed on [`SsaCalculator`]:
//! 1. Index earnings before age 60 to the age-60 wage level, capped at the taxable maximum
//! 2. AIME = top 35 indexed years / 420, rounded to the dollar
//! 3. PIA from the bend points for the year the worker turns 62, floored to the dime
//! 4. Early reduction or delayed credit for the chosen claim age

use std::fmt;
use std::sync::Arc;

use chrono::Datelike;
use serde::{Deserialize, Serialize};

use super::claiming::{calculate_claim_age_adjustment, get_fra, ClaimAge};
use super::earnings::EarningsRecord;
use super::tables::{BendPoints, SsaTables, TableFallback, FALLBACK_WAGE_BASE, WAGE_GROWTH_ESTIMATE};

/// Number of top earning years that enter AIME
pub const COMPUTATION_YEARS: usize = 35;

/// Months in the AIME averaging period (35 years x 12)
pub const COMPUTATION_MONTHS: f64 = 420.0;

/// Default career length for the income-based AIME estimate
pub const DEFAULT_YEARS_WORKED: u32 = 35;

/// Age at which the income-based estimate assumes work starts
const CAREER_START_AGE: i32 = 22;

/// Callback invoked for every table fallback
pub type FallbackObserver = Arc<dyn Fn(&TableFallback) + Send + Sync>;

/// Either a known AIME or the earnings history to derive it from
#[derive(Debug, Clone, Copy)]
pub enum AimeSource<'a> {
    Aime(f64),
    Earnings(&'a [EarningsRecord]),
}

impl From<f64> for AimeSource<'_> {
    fn from(aime: f64) -> Self {
        AimeSource::Aime(aime)
    }
}

impl<'a> From<&'a [EarningsRecord]> for AimeSource<'a> {
    fn from(earnings: &'a [EarningsRecord]) -> Self {
        AimeSource::Earnings(earnings)
    }
}

/// Full benefit calculation for one claim age
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SsaCalculation {
    pub aime: f64,
    /// Primary insurance amount (benefit at FRA)
    pub pia: f64,
    pub monthly_at_fra: f64,
    pub monthly_at_claim_age: f64,
    /// Signed percent adjustment applied at the claim age
    pub reduction_or_credit: f64,
    /// Full retirement age in fractional years
    pub fra: f64,
}

/// Benefit at one point of a claim-age sweep
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimAgeBenefit {
    pub claim_age: ClaimAge,
    pub monthly_benefit: f64,
    pub adjustment_percent: f64,
}

/// Social Security benefit calculator
#[derive(Clone)]
pub struct SsaCalculator {
    tables: Arc<SsaTables>,
    observer: Option<FallbackObserver>,
}

impl fmt::Debug for SsaCalculator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SsaCalculator")
            .field("tables", &self.tables)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

impl SsaCalculator {
    pub fn new(tables: SsaTables) -> Self {
        Self {
            tables: Arc::new(tables),
            observer: None,
        }
    }

    /// Share already-loaded tables between calculators
    pub fn with_shared_tables(tables: Arc<SsaTables>) -> Self {
        Self { tables, observer: None }
    }

    /// Subscribe to fallback lookups (in addition to the log output)
    pub fn with_observer(mut self, observer: impl Fn(&TableFallback) + Send + Sync + 'static) -> Self {
        self.observer = Some(Arc::new(observer));
        self
    }

    pub fn tables(&self) -> &SsaTables {
        &self.tables
    }

    fn report(&self, event: TableFallback) {
        match event {
            TableFallback::BendPoints { requested, used } => {
                log::warn!("Bend points for {} not found, using {}", requested, used);
            }
            TableFallback::WageIndexEstimated { year, factor } => {
                log::debug!("Wage index factor for {} estimated as {:.6}", year, factor);
            }
            TableFallback::WageBaseDefaulted { year, cap } => {
                log::debug!("Wage base for {} not configured, capping at {:.0}", year, cap);
            }
        }
        if let Some(observer) = &self.observer {
            observer(&event);
        }
    }

    /// Extrapolated wage index factor for a year outside the table
    pub fn estimate_wage_factor(&self, year: i32) -> f64 {
        self.tables.estimate_wage_factor(year)
    }

    /// Configured factor for `year`, or the 3%/year extrapolation
    fn wage_factor(&self, year: i32) -> f64 {
        match self.tables.wage_index_factor(year) {
            Some(factor) => factor,
            None => {
                let factor = self.tables.estimate_wage_factor(year);
                self.report(TableFallback::WageIndexEstimated { year, factor });
                factor
            }
        }
    }

    fn wage_base(&self, year: i32) -> f64 {
        match self.tables.wage_base(year) {
            Some(cap) => cap,
            None => {
                self.report(TableFallback::WageBaseDefaulted {
                    year,
                    cap: FALLBACK_WAGE_BASE,
                });
                FALLBACK_WAGE_BASE
            }
        }
    }

    /// Bend points for a year, falling back to the latest configured year
    pub fn bend_points(&self, year: i32) -> BendPoints {
        if let Some(bp) = self.tables.bend_points(year) {
            return bp;
        }
        let (latest_year, latest) = self.tables.latest_bend_points();
        self.report(TableFallback::BendPoints {
            requested: year,
            used: latest_year,
        });
        latest
    }

    /// Indexed value of each earnings record, in input order
    pub fn indexed_earnings(&self, earnings: &[EarningsRecord], birth_year: i32) -> Vec<f64> {
        let index_year = birth_year + 60;
        if earnings.iter().any(|r| r.year < index_year) {
            let index_factor = self.wage_factor(index_year);
            earnings
                .iter()
                .map(|record| {
                    if record.year >= index_year {
                        record.amount
                    } else {
                        let capped = record.amount.min(self.wage_base(record.year));
                        capped * (index_factor / self.wage_factor(record.year))
                    }
                })
                .collect()
        } else {
            earnings.iter().map(|r| r.amount).collect()
        }
    }

    /// Average Indexed Monthly Earnings, rounded to the nearest dollar
    pub fn calculate_aime(&self, earnings: &[EarningsRecord], birth_year: i32) -> f64 {
        let mut indexed = self.indexed_earnings(earnings, birth_year);
        indexed.sort_by(|a, b| b.total_cmp(a));

        // Missing years count as zero, so summing fewer than 35 values is the padding
        let sum_top: f64 = indexed.iter().take(COMPUTATION_YEARS).sum();
        (sum_top / COMPUTATION_MONTHS).round()
    }

    /// Estimate AIME from today's income when no earnings history is available
    pub fn estimate_aime_from_income(&self, income_today: f64, birth_year: i32, years_worked: u32) -> f64 {
        let current_year = chrono::Local::now().year();
        self.estimate_aime_from_income_as_of(income_today, birth_year, years_worked, current_year)
    }

    /// Income-based AIME estimate with an explicit current year.
    ///
    /// Synthesizes one record per year from `max(birth_year + 22, current_year - years_worked)`
    /// through `current_year`, deflating `income_today` by 3% per year back and capping at
    /// the wage base.
    pub fn estimate_aime_from_income_as_of(
        &self,
        income_today: f64,
        birth_year: i32,
        years_worked: u32,
        current_year: i32,
    ) -> f64 {
        let years_worked = i32::try_from(years_worked).unwrap_or(i32::MAX);
        let start_year = (birth_year + CAREER_START_AGE).max(current_year.saturating_sub(years_worked));
        let growth = 1.0 + WAGE_GROWTH_ESTIMATE;

        let earnings: Vec<EarningsRecord> = (start_year..=current_year)
            .map(|year| {
                let years_ago = current_year - year;
                let estimated = income_today * growth.powf(-f64::from(years_ago));
                EarningsRecord::new(year, estimated.min(self.wage_base(year)))
            })
            .collect();

        self.calculate_aime(&earnings, birth_year)
    }

    /// Primary Insurance Amount, floored to the nearest $0.10
    pub fn calculate_pia(&self, aime: f64, birth_year: i32) -> f64 {
        let bp = self.bend_points(birth_year + 62);

        let mut pia = aime.min(bp.first) * 0.90;
        if aime > bp.first {
            pia += (aime.min(bp.second) - bp.first) * 0.32;
        }
        if aime > bp.second {
            pia += (aime - bp.second) * 0.15;
        }

        (pia * 10.0).floor() / 10.0
    }

    fn resolve_aime(&self, source: AimeSource<'_>, birth_year: i32) -> f64 {
        match source {
            AimeSource::Aime(aime) => aime,
            AimeSource::Earnings(earnings) => self.calculate_aime(earnings, birth_year),
        }
    }

    /// AIME, PIA and the monthly benefit at `claim_age`
    pub fn calculate_ssa<'a>(
        &self,
        source: impl Into<AimeSource<'a>>,
        birth_year: i32,
        claim_age: ClaimAge,
    ) -> SsaCalculation {
        let aime = self.resolve_aime(source.into(), birth_year);
        let pia = self.calculate_pia(aime, birth_year);
        let adjustment = calculate_claim_age_adjustment(pia, claim_age, birth_year);

        SsaCalculation {
            aime,
            pia,
            monthly_at_fra: pia,
            monthly_at_claim_age: adjustment.monthly_benefit,
            reduction_or_credit: adjustment.adjustment_percent,
            fra: get_fra(birth_year),
        }
    }

    /// Monthly benefit at every claim age from 62 to 70
    pub fn claim_age_sweep<'a>(&self, source: impl Into<AimeSource<'a>>, birth_year: i32) -> Vec<ClaimAgeBenefit> {
        let aime = self.resolve_aime(source.into(), birth_year);
        let pia = self.calculate_pia(aime, birth_year);

        ClaimAge::all()
            .map(|claim_age| {
                let adjustment = calculate_claim_age_adjustment(pia, claim_age, birth_year);
                ClaimAgeBenefit {
                    claim_age,
                    monthly_benefit: adjustment.monthly_benefit,
                    adjustment_percent: adjustment.adjustment_percent,
                }
            })
            .collect()
    }
}

impl Default for SsaCalculator {
    fn default() -> Self {
        Self::new(SsaTables::builtin())
    }
}
