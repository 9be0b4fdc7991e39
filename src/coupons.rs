//! Coupons
//!
//! A coupon is an immutable catalog entry: a discount policy, a validity
//! window, an optional per-user usage limit and optional eligibility rules.

use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;

use crate::eligibility::EligibilityRules;

/// Errors raised by coupon shape validation.
#[derive(Debug, Error)]
pub enum CouponError {
    /// The coupon code is empty.
    #[error("coupon code cannot be empty")]
    EmptyCode,

    /// The discount value is not positive.
    #[error("discount value must be positive, got {0}")]
    NonPositiveValue(Decimal),

    /// A percent rate exceeds 100.
    #[error("percent rate cannot exceed 100, got {0}")]
    RateAbove100(Decimal),

    /// The maximum discount cap is not positive.
    #[error("max discount cap must be positive, got {0}")]
    NonPositiveCap(Decimal),

    /// The validity window is empty or inverted.
    #[error("validity window is empty: {starts} does not precede {ends}")]
    EmptyValidityWindow {
        /// Start of the window
        starts: Timestamp,
        /// End of the window
        ends: Timestamp,
    },

    /// The per-user usage limit is zero.
    #[error("usage limit per user must be positive")]
    ZeroUsageLimit,

    /// Monetary fields on one coupon use more than one currency.
    #[error("coupon monetary fields mix currencies: {0} and {1}")]
    MixedCurrencies(&'static str, &'static str),
}

/// Discount policy for a coupon.
#[derive(Debug, Clone, PartialEq)]
pub enum DiscountPolicy<'a> {
    /// A fixed currency amount off the cart.
    Flat(Money<'a, Currency>),

    /// A percentage of the cart value, optionally capped at a fixed amount.
    Percent {
        /// Percent rate in (0, 100].
        rate: Decimal,

        /// Upper bound on the computed discount.
        cap: Option<Money<'a, Currency>>,
    },
}

impl<'a> DiscountPolicy<'a> {
    /// Returns the currency used by the policy's monetary fields, if any.
    ///
    /// An uncapped percent policy has no monetary field and so no currency.
    pub fn currency(&self) -> Option<&'a Currency> {
        match self {
            DiscountPolicy::Flat(amount) => Some(amount.currency()),
            DiscountPolicy::Percent { cap, .. } => cap.as_ref().map(|cap| cap.currency()),
        }
    }

    fn validate(&self) -> Result<(), CouponError> {
        match self {
            DiscountPolicy::Flat(amount) => {
                if amount.to_minor_units() <= 0 {
                    return Err(CouponError::NonPositiveValue(*amount.amount()));
                }
            }
            DiscountPolicy::Percent { rate, cap } => {
                if *rate <= Decimal::ZERO {
                    return Err(CouponError::NonPositiveValue(*rate));
                }

                if *rate > Decimal::ONE_HUNDRED {
                    return Err(CouponError::RateAbove100(*rate));
                }

                if let Some(cap) = cap
                    && cap.to_minor_units() <= 0
                {
                    return Err(CouponError::NonPositiveCap(*cap.amount()));
                }
            }
        }

        Ok(())
    }
}

/// An immutable coupon catalog entry.
#[derive(Debug, Clone)]
pub struct Coupon<'a> {
    code: String,
    description: String,
    policy: DiscountPolicy<'a>,
    starts: Timestamp,
    ends: Timestamp,
    usage_limit_per_user: Option<u32>,
    eligibility: Option<EligibilityRules<'a>>,
}

impl<'a> Coupon<'a> {
    /// Create a coupon with the given code, policy and validity window.
    ///
    /// # Errors
    ///
    /// Returns a [`CouponError`] if the code is empty, the discount value is
    /// not positive, a percent rate exceeds 100, a cap is not positive, or
    /// the validity window is empty.
    pub fn new(
        code: impl Into<String>,
        description: impl Into<String>,
        policy: DiscountPolicy<'a>,
        starts: Timestamp,
        ends: Timestamp,
    ) -> Result<Self, CouponError> {
        let code = code.into();

        if code.is_empty() {
            return Err(CouponError::EmptyCode);
        }

        policy.validate()?;

        if starts >= ends {
            return Err(CouponError::EmptyValidityWindow { starts, ends });
        }

        Ok(Self {
            code,
            description: description.into(),
            policy,
            starts,
            ends,
            usage_limit_per_user: None,
            eligibility: None,
        })
    }

    /// Set a per-user redemption limit.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::ZeroUsageLimit`] for a limit of zero.
    pub fn with_usage_limit(mut self, limit: u32) -> Result<Self, CouponError> {
        if limit == 0 {
            return Err(CouponError::ZeroUsageLimit);
        }

        self.usage_limit_per_user = Some(limit);

        Ok(self)
    }

    /// Attach eligibility rules.
    ///
    /// # Errors
    ///
    /// Returns [`CouponError::MixedCurrencies`] if the rules' monetary
    /// thresholds disagree on currency, with the discount policy or with
    /// each other.
    pub fn with_eligibility(mut self, rules: EligibilityRules<'a>) -> Result<Self, CouponError> {
        let mut currency = self.policy.currency();

        for threshold in [rules.min_lifetime_spend.as_ref(), rules.min_cart_value.as_ref()] {
            let Some(threshold) = threshold else {
                continue;
            };

            match currency {
                None => currency = Some(threshold.currency()),
                Some(existing) if existing != threshold.currency() => {
                    return Err(CouponError::MixedCurrencies(
                        existing.iso_alpha_code,
                        threshold.currency().iso_alpha_code,
                    ));
                }
                Some(_) => {}
            }
        }

        self.eligibility = Some(rules);

        Ok(self)
    }

    /// Unique, case-sensitive coupon code.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// The discount policy.
    pub fn policy(&self) -> &DiscountPolicy<'a> {
        &self.policy
    }

    /// Start of the validity window (inclusive).
    pub fn starts(&self) -> Timestamp {
        self.starts
    }

    /// End of the validity window (inclusive).
    pub fn ends(&self) -> Timestamp {
        self.ends
    }

    /// Per-user redemption limit, if any.
    pub fn usage_limit_per_user(&self) -> Option<u32> {
        self.usage_limit_per_user
    }

    /// Eligibility rules, if any.
    pub fn eligibility(&self) -> Option<&EligibilityRules<'a>> {
        self.eligibility.as_ref()
    }

    /// The single currency used by the coupon's monetary fields, if it has
    /// any monetary field at all.
    pub fn currency(&self) -> Option<&'a Currency> {
        self.policy
            .currency()
            .or_else(|| self.eligibility.as_ref().and_then(EligibilityRules::currency))
    }
}
