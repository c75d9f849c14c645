//! Seat-tier pricing and checkout quotes.
//!
//! All amounts are whole rupiah.

use crate::error::{AppError, Result};
use crate::models::{BillingCycle, Package, SeatTier};

/// Months not charged on yearly billing.
pub const YEARLY_FREE_MONTHS: i64 = 2;

/// Price breakdown shown before checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub tier: SeatTier,
    pub seats: u32,
    pub months: i64,
    /// Seats × price × months, before discount.
    pub subtotal: i64,
    pub discount: i64,
    pub tax: i64,
    pub total: i64,
}

impl Quote {
    /// Effective monthly cost after discount and tax.
    pub fn per_month(&self) -> i64 {
        self.total / self.months.max(1)
    }
}

/// Check that tiers start at 1, are sorted, contiguous and priced.
pub fn validate_tiers(tiers: &[SeatTier]) -> Result<()> {
    let Some(first) = tiers.first() else {
        return Err(AppError::validation("Package has no seat tiers"));
    };
    if first.min_employees != 1 {
        return Err(AppError::validation("First tier must start at 1 employee"));
    }

    for (idx, tier) in tiers.iter().enumerate() {
        if tier.max_employees < tier.min_employees {
            return Err(AppError::validation(format!("Tier {} has an empty range", idx + 1)));
        }
        if tier.price_per_user <= 0 {
            return Err(AppError::validation(format!("Tier {} has no price", idx + 1)));
        }
        if let Some(prev) = idx.checked_sub(1).map(|i| &tiers[i]) {
            let Some(next_min) = prev.max_employees.checked_add(1) else {
                return Err(AppError::validation(format!("Tier {idx} is unbounded but is not the last tier")));
            };
            if tier.min_employees != next_min {
                return Err(AppError::validation(format!(
                    "Tier {} must start at {} employees",
                    idx + 1,
                    next_min
                )));
            }
        }
    }
    Ok(())
}

/// Tier whose range contains `headcount`.
pub fn tier_for(package: &Package, headcount: u32) -> Option<&SeatTier> {
    package.tiers.iter().find(|t| t.contains(headcount))
}

/// Largest headcount a package supports.
pub fn max_seats(package: &Package) -> u32 {
    package.tiers.iter().map(|t| t.max_employees).max().unwrap_or(0)
}

/// Seats must cover every active employee.
pub fn validate_seats(seats: u32, active_employees: u32) -> Result<()> {
    if seats == 0 {
        return Err(AppError::validation("At least one seat is required"));
    }
    if seats < active_employees {
        return Err(AppError::validation(format!(
            "{seats} seats cannot cover {active_employees} active employees"
        )));
    }
    Ok(())
}

/// Percentage of an amount, rounded half up. `None` on overflow.
fn percent_of(amount: i64, percent: u32) -> Option<i64> {
    Some(amount.checked_mul(i64::from(percent))?.checked_add(50)? / 100)
}

/// Price a package for a seat count and billing cycle.
pub fn quote(package: &Package, seats: u32, cycle: BillingCycle, tax_rate_percent: u32) -> Result<Quote> {
    if seats == 0 {
        return Err(AppError::validation("At least one seat is required"));
    }
    let tier = *tier_for(package, seats).ok_or_else(|| {
        AppError::validation(format!(
            "{} supports up to {} employees",
            package.name,
            max_seats(package)
        ))
    })?;

    let out_of_range = || AppError::validation("Quote amount is out of range");
    let monthly = tier.price_per_user.checked_mul(i64::from(seats)).ok_or_else(out_of_range)?;
    let months = cycle.months();
    let subtotal = monthly.checked_mul(months).ok_or_else(out_of_range)?;
    let discount = match cycle {
        BillingCycle::Monthly => 0,
        BillingCycle::Yearly => monthly * YEARLY_FREE_MONTHS,
    };
    let tax = percent_of(subtotal - discount, tax_rate_percent).ok_or_else(out_of_range)?;

    Ok(Quote {
        tier,
        seats,
        months,
        subtotal,
        discount,
        tax,
        total: subtotal - discount + tax,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn package() -> Package {
        Package {
            id: 1,
            name: "Standard".to_string(),
            description: None,
            features: vec!["Check-clock".to_string()],
            tiers: vec![
                SeatTier {
                    min_employees: 1,
                    max_employees: 50,
                    price_per_user: 15_000,
                },
                SeatTier {
                    min_employees: 51,
                    max_employees: 100,
                    price_per_user: 12_500,
                },
            ],
        }
    }

    #[test]
    fn test_tier_boundaries() {
        let pkg = package();
        assert_eq!(tier_for(&pkg, 50).unwrap().price_per_user, 15_000);
        assert_eq!(tier_for(&pkg, 51).unwrap().price_per_user, 12_500);
        assert!(tier_for(&pkg, 101).is_none());
        assert!(tier_for(&pkg, 0).is_none());
        assert_eq!(max_seats(&pkg), 100);
    }

    #[test]
    fn test_monthly_quote() {
        let q = quote(&package(), 10, BillingCycle::Monthly, 11).unwrap();
        assert_eq!(q.subtotal, 150_000);
        assert_eq!(q.discount, 0);
        assert_eq!(q.tax, 16_500);
        assert_eq!(q.total, 166_500);
        assert_eq!(q.per_month(), 166_500);
    }

    #[test]
    fn test_yearly_quote_two_months_free() {
        let q = quote(&package(), 60, BillingCycle::Yearly, 11).unwrap();
        assert_eq!(q.subtotal, 9_000_000);
        assert_eq!(q.discount, 1_500_000);
        assert_eq!(q.tax, 825_000);
        assert_eq!(q.total, 8_325_000);
    }

    #[test]
    fn test_tax_rounds_half_up() {
        assert_eq!(percent_of(150, 11), Some(17)); // 16.5
        assert_eq!(percent_of(149, 11), Some(16)); // 16.39
        assert_eq!(percent_of(i64::MAX, 11), None);
    }

    #[test]
    fn test_quote_rejects_out_of_range() {
        assert!(quote(&package(), 0, BillingCycle::Monthly, 11).is_err());
        assert!(quote(&package(), 150, BillingCycle::Monthly, 11).is_err());

        let mut pkg = package();
        pkg.tiers[0].price_per_user = i64::MAX / 2;
        assert!(quote(&pkg, 10, BillingCycle::Monthly, 11).is_err());
    }

    #[test]
    fn test_validate_tiers_unbounded_tier_must_be_last() {
        let tiers = vec![
            SeatTier {
                min_employees: 1,
                max_employees: u32::MAX,
                price_per_user: 10_000,
            },
            SeatTier {
                min_employees: 5,
                max_employees: 10,
                price_per_user: 9_000,
            },
        ];
        let err = validate_tiers(&tiers).unwrap_err();
        assert!(err.to_string().contains("Tier 1 is unbounded"), "{err}");

        assert!(validate_tiers(&tiers[..1]).is_ok());
    }

    #[test]
    fn test_validate_tiers() {
        let mut tiers = package().tiers;
        assert!(validate_tiers(&tiers).is_ok());

        tiers[1].min_employees = 60;
        assert!(validate_tiers(&tiers).is_err());

        tiers[1].min_employees = 51;
        tiers[1].price_per_user = 0;
        assert!(validate_tiers(&tiers).is_err());

        tiers[0].min_employees = 2;
        assert!(validate_tiers(&tiers).is_err());
        assert!(validate_tiers(&[]).is_err());
    }

    #[test]
    fn test_validate_seats() {
        assert!(validate_seats(20, 20).is_ok());
        assert!(validate_seats(19, 20).is_err());
        assert!(validate_seats(0, 0).is_err());
    }
}
