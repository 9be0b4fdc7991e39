//! Discount Calculation
//!
//! Computes the monetary discount an eligible coupon yields for a cart. All
//! arithmetic happens in minor units so the result is exact to two decimal
//! places; percentage amounts round half-up.

use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::{coupons::DiscountPolicy, metrics::CartMetrics};

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DiscountError {
    /// A percentage amount overflowed or could not be represented in minor units.
    #[error("discount amount overflowed or was not representable in minor units")]
    AmountConversion,
}

/// Compute the discount a coupon's policy yields for the given cart metrics.
///
/// Callers are expected to have established eligibility first; in particular
/// the policy's currency must match the cart's. The result is always in
/// `[0, cart value]`.
///
/// # Errors
///
/// Returns [`DiscountError::AmountConversion`] if a percentage amount cannot
/// be safely represented in minor units.
pub fn discount_amount<'a>(
    policy: &DiscountPolicy<'_>,
    metrics: &CartMetrics<'a>,
) -> Result<Money<'a, Currency>, DiscountError> {
    let cart_minor = metrics.cart_value().to_minor_units();

    let raw_minor = match policy {
        DiscountPolicy::Flat(amount) => amount.to_minor_units(),
        DiscountPolicy::Percent { rate, cap } => {
            let percent_minor = percent_of_minor(*rate, cart_minor)?;

            match cap {
                Some(cap) => percent_minor.min(cap.to_minor_units()),
                None => percent_minor,
            }
        }
    };

    // A coupon can never discount more than the cart is worth.
    let capped_minor = raw_minor.min(cart_minor).max(0);

    Ok(Money::from_minor(
        capped_minor,
        metrics.cart_value().currency(),
    ))
}

/// Calculate `rate`% of a minor-unit amount, rounding half-up.
fn percent_of_minor(rate: Decimal, minor: i64) -> Result<i64, DiscountError> {
    let Some(minor) = Decimal::from_i64(minor) else {
        unreachable!("always returns `Some` for every `i64`")
    };

    let Some(scaled) = rate.checked_mul(minor) else {
        return Err(DiscountError::AmountConversion);
    };

    let Some(applied) = scaled.checked_div(Decimal::ONE_HUNDRED) else {
        return Err(DiscountError::AmountConversion);
    };

    let rounded = applied.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let Some(rounded) = rounded.to_i64() else {
        return Err(DiscountError::AmountConversion);
    };

    Ok(rounded)
}

#[cfg(test)]
mod tests {
    use rusty_money::iso;
    use testresult::TestResult;

    use crate::carts::{Cart, CartItem};

    use super::*;

    fn metrics_for(value_minor: i64) -> TestResult<CartMetrics<'static>> {
        let cart = Cart::with_items(
            [CartItem::new(Money::from_minor(value_minor, iso::USD), 1)],
            iso::USD,
        )?;

        Ok(cart.metrics())
    }

    #[test]
    fn flat_discount_is_the_fixed_amount() -> TestResult {
        let policy = DiscountPolicy::Flat(Money::from_minor(200_00, iso::USD));
        let metrics = metrics_for(1200_00)?;

        assert_eq!(
            discount_amount(&policy, &metrics)?,
            Money::from_minor(200_00, iso::USD)
        );

        Ok(())
    }

    #[test]
    fn flat_discount_is_capped_at_cart_value() -> TestResult {
        let policy = DiscountPolicy::Flat(Money::from_minor(200_00, iso::USD));
        let metrics = metrics_for(150_00)?;

        assert_eq!(
            discount_amount(&policy, &metrics)?,
            Money::from_minor(150_00, iso::USD)
        );

        Ok(())
    }

    #[test]
    fn percent_discount_is_proportional_below_cap() -> TestResult {
        let policy = DiscountPolicy::Percent {
            rate: Decimal::from(30_u32),
            cap: Some(Money::from_minor(300_00, iso::USD)),
        };

        let metrics = metrics_for(500_00)?;

        // 30% of 500.00 = 150.00, below the 300.00 cap
        assert_eq!(
            discount_amount(&policy, &metrics)?,
            Money::from_minor(150_00, iso::USD)
        );

        Ok(())
    }

    #[test]
    fn percent_discount_is_capped_exactly_at_max() -> TestResult {
        let policy = DiscountPolicy::Percent {
            rate: Decimal::from(30_u32),
            cap: Some(Money::from_minor(300_00, iso::USD)),
        };

        let metrics = metrics_for(2000_00)?;

        // 30% of 2000.00 = 600.00, capped at 300.00
        assert_eq!(
            discount_amount(&policy, &metrics)?,
            Money::from_minor(300_00, iso::USD)
        );

        Ok(())
    }

    #[test]
    fn percent_rounding_is_half_up() -> TestResult {
        let policy = DiscountPolicy::Percent {
            rate: Decimal::from(5_u32),
            cap: None,
        };

        // 5% of 10.10 = 0.505, which rounds up to 0.51
        let metrics = metrics_for(10_10)?;

        assert_eq!(
            discount_amount(&policy, &metrics)?,
            Money::from_minor(51, iso::USD)
        );

        // 5% of 10.01 = 0.5005, which rounds down to 0.50
        let metrics = metrics_for(10_01)?;

        assert_eq!(
            discount_amount(&policy, &metrics)?,
            Money::from_minor(50, iso::USD)
        );

        Ok(())
    }

    #[test]
    fn discount_on_empty_cart_is_zero() -> TestResult {
        let policy = DiscountPolicy::Flat(Money::from_minor(10_00, iso::USD));
        let cart = Cart::new(iso::USD);

        assert_eq!(
            discount_amount(&policy, &cart.metrics())?,
            Money::from_minor(0, iso::USD)
        );

        Ok(())
    }

    #[test]
    fn full_percent_discount_equals_cart_value() -> TestResult {
        let policy = DiscountPolicy::Percent {
            rate: Decimal::ONE_HUNDRED,
            cap: None,
        };

        let metrics = metrics_for(123_45)?;

        assert_eq!(
            discount_amount(&policy, &metrics)?,
            Money::from_minor(123_45, iso::USD)
        );

        Ok(())
    }

    #[test]
    fn percent_of_minor_overflow_returns_error() {
        let huge = Decimal::MAX;

        let result = percent_of_minor(huge, i64::MAX);

        assert!(matches!(result, Err(DiscountError::AmountConversion)));
    }
}
