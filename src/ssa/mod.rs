//! Social Security benefit estimation
//!
//! The pipeline runs earnings history -> wage indexing -> AIME -> PIA -> claim-age
//! adjusted monthly benefit. Regulatory tables are injected through [`SsaTables`]
//! rather than read from globals.

mod calculator;
mod claiming;
mod earnings;
mod tables;
pub mod loader;

pub use calculator::{
    AimeSource, ClaimAgeBenefit, FallbackObserver, SsaCalculation, SsaCalculator, COMPUTATION_MONTHS,
    COMPUTATION_YEARS, DEFAULT_YEARS_WORKED,
};
pub use claiming::{
    calculate_claim_age_adjustment, fra_months, get_fra, ClaimAge, ClaimAgeAdjustment,
    DELAYED_CREDIT_PER_MONTH, EARLY_REDUCTION_ADDITIONAL, EARLY_REDUCTION_FIRST_36,
};
pub use earnings::{parse_earnings_csv, EarningsRecord};
pub use loader::LoadedTables;
pub use tables::{BendPoints, SsaTables, TableFallback, FALLBACK_WAGE_BASE, WAGE_GROWTH_ESTIMATE};
