//! Full retirement age and claim-age adjustments
//!
//! - Early claiming: 5/9 of 1% per month for the first 36 months, 5/12 of 1% after
//! - Delayed claiming: 8% per year, i.e. 2/3 of 1% per month
//!
//! Adjusted benefits are rounded to the nearest cent, unlike the PIA which is
//! floored to the dime.

use serde::{Deserialize, Serialize};

use crate::error::CalcError;

/// Reduction per month for the first 36 months before FRA
pub const EARLY_REDUCTION_FIRST_36: f64 = 5.0 / 9.0 / 100.0;

/// Reduction per month beyond 36 months before FRA
pub const EARLY_REDUCTION_ADDITIONAL: f64 = 5.0 / 12.0 / 100.0;

/// Credit per month claimed after FRA
pub const DELAYED_CREDIT_PER_MONTH: f64 = 8.0 / 12.0 / 100.0;

/// Full retirement age in fractional years for a birth year
pub fn get_fra(birth_year: i32) -> f64 {
    match birth_year {
        i32::MIN..=1937 => 65.0,
        1938..=1954 => 66.0,
        1955 => 66.0 + 2.0 / 12.0,
        1956 => 66.0 + 4.0 / 12.0,
        1957 => 66.5,
        1958 => 66.0 + 8.0 / 12.0,
        1959 => 66.0 + 10.0 / 12.0,
        _ => 67.0,
    }
}

/// Full retirement age in whole months
pub fn fra_months(birth_year: i32) -> i32 {
    (get_fra(birth_year) * 12.0).round() as i32
}

/// Age at which benefits are claimed, 62 through 70 inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct ClaimAge(u8);

impl ClaimAge {
    pub const EARLIEST: ClaimAge = ClaimAge(62);
    pub const LATEST: ClaimAge = ClaimAge(70);

    pub fn new(age: u8) -> Result<Self, CalcError> {
        if (Self::EARLIEST.0..=Self::LATEST.0).contains(&age) {
            Ok(Self(age))
        } else {
            Err(CalcError::InvalidClaimAge(age))
        }
    }

    pub fn years(self) -> u8 {
        self.0
    }

    /// Every valid claim age in ascending order
    pub fn all() -> impl Iterator<Item = ClaimAge> {
        (Self::EARLIEST.0..=Self::LATEST.0).map(ClaimAge)
    }
}

impl TryFrom<u8> for ClaimAge {
    type Error = CalcError;

    fn try_from(age: u8) -> Result<Self, Self::Error> {
        Self::new(age)
    }
}

impl From<ClaimAge> for u8 {
    fn from(age: ClaimAge) -> u8 {
        age.0
    }
}

impl std::fmt::Display for ClaimAge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Benefit after applying the early reduction or delayed credit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimAgeAdjustment {
    /// Monthly benefit, rounded to the cent
    pub monthly_benefit: f64,
    /// Signed percent: negative for a reduction, positive for a credit
    pub adjustment_percent: f64,
    /// Signed months relative to FRA: negative when claiming early
    pub months_early_or_late: i32,
}

fn round_to_cent(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Adjust a PIA for claiming at `claim_age` instead of full retirement age
pub fn calculate_claim_age_adjustment(pia: f64, claim_age: ClaimAge, birth_year: i32) -> ClaimAgeAdjustment {
    let claim_months = i32::from(claim_age.years()) * 12;
    let months_diff = claim_months - fra_months(birth_year);

    match months_diff {
        0 => ClaimAgeAdjustment {
            monthly_benefit: pia,
            adjustment_percent: 0.0,
            months_early_or_late: 0,
        },
        d if d < 0 => early_reduction(pia, -d),
        d => delayed_credit(pia, d),
    }
}

fn early_reduction(pia: f64, months_early: i32) -> ClaimAgeAdjustment {
    let first_36 = months_early.min(36);
    let mut reduction = f64::from(first_36) * EARLY_REDUCTION_FIRST_36;
    if months_early > 36 {
        reduction += f64::from(months_early - 36) * EARLY_REDUCTION_ADDITIONAL;
    }

    ClaimAgeAdjustment {
        monthly_benefit: round_to_cent(pia * (1.0 - reduction)),
        adjustment_percent: -reduction * 100.0,
        months_early_or_late: -months_early,
    }
}

fn delayed_credit(pia: f64, months_delayed: i32) -> ClaimAgeAdjustment {
    let credit = f64::from(months_delayed) * DELAYED_CREDIT_PER_MONTH;

    ClaimAgeAdjustment {
        monthly_benefit: round_to_cent(pia * (1.0 + credit)),
        adjustment_percent: credit * 100.0,
        months_early_or_late: months_delayed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn age(years: u8) -> ClaimAge {
        ClaimAge::new(years).unwrap()
    }

    #[test]
    fn test_fra_table() {
        assert_eq!(get_fra(1930), 65.0);
        assert_eq!(get_fra(1937), 65.0);
        assert_eq!(get_fra(1940), 66.0);
        assert_eq!(get_fra(1954), 66.0);
        assert_relative_eq!(get_fra(1955), 66.1667, epsilon = 1e-4);
        assert_relative_eq!(get_fra(1956), 66.3333, epsilon = 1e-4);
        assert_eq!(get_fra(1957), 66.5);
        assert_relative_eq!(get_fra(1958), 66.6667, epsilon = 1e-4);
        assert_relative_eq!(get_fra(1959), 66.8333, epsilon = 1e-4);
        assert_eq!(get_fra(1960), 67.0);
        assert_eq!(get_fra(1990), 67.0);

        assert_eq!(fra_months(1955), 794);
        assert_eq!(fra_months(1959), 802);
    }

    #[test]
    fn test_claim_age_bounds() {
        assert!(ClaimAge::new(61).is_err());
        assert!(ClaimAge::new(71).is_err());
        assert_eq!(ClaimAge::try_from(66).unwrap().years(), 66);
        assert_eq!(ClaimAge::all().count(), 9);
    }

    #[test]
    fn test_claim_age_serde() {
        let parsed: ClaimAge = serde_json::from_str("67").unwrap();
        assert_eq!(parsed, age(67));
        assert!(serde_json::from_str::<ClaimAge>("75").is_err());
    }

    #[test]
    fn test_at_fra_is_noop() {
        let adj = calculate_claim_age_adjustment(1_500.0, age(67), 1962);
        assert_eq!(adj.monthly_benefit, 1_500.0);
        assert_eq!(adj.adjustment_percent, 0.0);
        assert_eq!(adj.months_early_or_late, 0);
    }

    #[test]
    fn test_claim_at_62_with_fra_67() {
        // 60 months early: 36 * 5/9% + 24 * 5/12% = 20% + 10% = 30%
        let adj = calculate_claim_age_adjustment(1_000.0, age(62), 1962);
        assert_relative_eq!(adj.adjustment_percent, -30.0, epsilon = 1e-9);
        assert_eq!(adj.monthly_benefit, 700.0);
        assert_eq!(adj.months_early_or_late, -60);
    }

    #[test]
    fn test_claim_at_70_with_fra_67() {
        // 36 months late at 2/3% per month = 24%
        let adj = calculate_claim_age_adjustment(1_000.0, age(70), 1962);
        assert_relative_eq!(adj.adjustment_percent, 24.0, epsilon = 1e-9);
        assert_eq!(adj.monthly_benefit, 1_240.0);
        assert_eq!(adj.months_early_or_late, 36);
    }

    #[test]
    fn test_partial_year_fra() {
        // Born 1955, FRA 66y2m: claiming at 66 is 2 months early
        let adj = calculate_claim_age_adjustment(2_000.0, age(66), 1955);
        assert_eq!(adj.months_early_or_late, -2);
        // 2000 * (1 - 2 * 5/900) = 1977.777... -> 1977.78
        assert_eq!(adj.monthly_benefit, 1_977.78);
    }

    proptest! {
        #[test]
        fn prop_benefit_increases_with_claim_age(
            pia in 1.0..5_000.0f64,
            birth_year in 1930i32..2000,
        ) {
            let benefits: Vec<f64> = ClaimAge::all()
                .map(|a| calculate_claim_age_adjustment(pia, a, birth_year).monthly_benefit)
                .collect();
            for pair in benefits.windows(2) {
                prop_assert!(pair[1] > pair[0], "benefits not strictly increasing: {:?}", benefits);
            }
        }

        #[test]
        fn prop_fra_claim_has_no_adjustment(pia in 0.0..5_000.0f64, birth_year in 1900i32..2030) {
            let months = fra_months(birth_year);
            if months % 12 == 0 {
                let claim = ClaimAge::new((months / 12) as u8).unwrap();
                let adj = calculate_claim_age_adjustment(pia, claim, birth_year);
                prop_assert_eq!(adj.adjustment_percent, 0.0);
                prop_assert_eq!(adj.monthly_benefit, pia);
            }
        }
    }
}
