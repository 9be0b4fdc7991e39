//! Coupon Fixtures

use rust_decimal::{Decimal, prelude::ToPrimitive};
use rustc_hash::FxHashMap;
use rusty_money::{
    Money,
    iso::{Currency, EUR, GBP, USD},
};
use serde::Deserialize;
use smallvec::SmallVec;

use crate::{
    categories::CategorySet,
    coupons::{Coupon, DiscountPolicy},
    eligibility::EligibilityRules,
    fixtures::FixtureError,
};

/// Wrapper for coupons in YAML
#[derive(Debug, Deserialize)]
pub struct CouponsFixture {
    /// Map of coupon code -> coupon fixture
    pub coupons: FxHashMap<String, CouponFixture>,
}

/// Coupon Fixture
#[derive(Debug, Deserialize)]
pub struct CouponFixture {
    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Discount policy
    pub discount: DiscountFixture,

    /// Start of the validity window
    pub starts: jiff::Timestamp,

    /// End of the validity window
    pub ends: jiff::Timestamp,

    /// Per-user redemption limit
    #[serde(default)]
    pub usage_limit_per_user: Option<u32>,

    /// Eligibility rules
    #[serde(default)]
    pub eligibility: Option<EligibilityFixture>,
}

/// Discount policy fixture
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DiscountFixture {
    /// Fixed amount off (e.g., "200.00 USD")
    Flat {
        /// Discount amount
        amount: String,
    },

    /// Percentage off, optionally capped
    Percent {
        /// Percent rate (e.g., "30%")
        rate: String,

        /// Cap on the computed discount (e.g., "300.00 USD")
        #[serde(default)]
        cap: Option<String>,
    },
}

/// Eligibility rules fixture
#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct EligibilityFixture {
    /// Allowed user tiers
    pub allowed_user_tiers: Vec<String>,

    /// Minimum lifetime spend (e.g., "500.00 USD")
    pub min_lifetime_spend: Option<String>,

    /// Minimum orders placed
    pub min_orders_placed: Option<u32>,

    /// Restrict to first orders
    pub first_order_only: bool,

    /// Allowed countries
    pub allowed_countries: Vec<String>,

    /// Minimum cart value (e.g., "200.00 USD")
    pub min_cart_value: Option<String>,

    /// Minimum item count
    pub min_items_count: Option<u64>,

    /// Applicable categories
    pub applicable_categories: Vec<String>,

    /// Excluded categories
    pub excluded_categories: Vec<String>,
}

/// Build a domain coupon from a fixture entry.
pub(crate) fn build_coupon(
    code: &str,
    fixture: CouponFixture,
) -> Result<Coupon<'static>, FixtureError> {
    let policy = match fixture.discount {
        DiscountFixture::Flat { amount } => {
            let (minor, currency) = parse_price(&amount)?;

            DiscountPolicy::Flat(Money::from_minor(minor, currency))
        }
        DiscountFixture::Percent { rate, cap } => {
            let cap = cap
                .map(|cap| {
                    let (minor, currency) = parse_price(&cap)?;

                    Ok::<_, FixtureError>(Money::from_minor(minor, currency))
                })
                .transpose()?;

            DiscountPolicy::Percent {
                rate: parse_rate(&rate)?,
                cap,
            }
        }
    };

    let mut coupon = Coupon::new(code, fixture.description, policy, fixture.starts, fixture.ends)?;

    if let Some(limit) = fixture.usage_limit_per_user {
        coupon = coupon.with_usage_limit(limit)?;
    }

    if let Some(eligibility) = fixture.eligibility {
        coupon = coupon.with_eligibility(build_rules(eligibility)?)?;
    }

    Ok(coupon)
}

fn build_rules(fixture: EligibilityFixture) -> Result<EligibilityRules<'static>, FixtureError> {
    let min_lifetime_spend = fixture
        .min_lifetime_spend
        .map(|threshold| {
            let (minor, currency) = parse_price(&threshold)?;

            Ok::<_, FixtureError>(Money::from_minor(minor, currency))
        })
        .transpose()?;

    let min_cart_value = fixture
        .min_cart_value
        .map(|threshold| {
            let (minor, currency) = parse_price(&threshold)?;

            Ok::<_, FixtureError>(Money::from_minor(minor, currency))
        })
        .transpose()?;

    let applicable: Vec<&str> = fixture
        .applicable_categories
        .iter()
        .map(String::as_str)
        .collect();

    let excluded: Vec<&str> = fixture
        .excluded_categories
        .iter()
        .map(String::as_str)
        .collect();

    Ok(EligibilityRules {
        allowed_user_tiers: SmallVec::from_vec(fixture.allowed_user_tiers),
        min_lifetime_spend,
        min_orders_placed: fixture.min_orders_placed,
        first_order_only: fixture.first_order_only,
        allowed_countries: SmallVec::from_vec(fixture.allowed_countries),
        min_cart_value,
        min_items_count: fixture.min_items_count,
        applicable_categories: CategorySet::from_strs(&applicable),
        excluded_categories: CategorySet::from_strs(&excluded),
    })
}

/// Parse a price string (e.g., "200.00 USD") into minor units and currency.
///
/// # Errors
///
/// Returns an error if the string is not in the format "AMOUNT CURRENCY",
/// if the amount cannot be parsed as a decimal, or if the currency code is
/// not recognized.
pub fn parse_price(s: &str) -> Result<(i64, &'static Currency), FixtureError> {
    let parts: Vec<&str> = s.split_whitespace().collect();

    if parts.len() != 2 {
        return Err(FixtureError::InvalidPrice(format!(
            "Expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    }

    let amount = parts
        .first()
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidPrice(s.to_string()))?;

    let minor_units = amount
        .checked_mul(Decimal::new(100, 0))
        .and_then(|value| value.round_dp(0).to_i64())
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency_code = parts
        .get(1)
        .ok_or_else(|| FixtureError::InvalidPrice(s.to_string()))?;

    let currency = match *currency_code {
        "GBP" => GBP,
        "USD" => USD,
        "EUR" => EUR,
        other => return Err(FixtureError::UnknownCurrency(other.to_string())),
    };

    Ok((minor_units, currency))
}

/// Parse a percent rate string (e.g., "30%" or "30") into percent points.
///
/// # Errors
///
/// Returns an error if the value cannot be parsed as a decimal.
pub fn parse_rate(s: &str) -> Result<Decimal, FixtureError> {
    let trimmed = s.trim();
    let digits = trimmed.strip_suffix('%').unwrap_or(trimmed);

    digits
        .trim()
        .parse::<Decimal>()
        .map_err(|_err| FixtureError::InvalidRate(s.to_string()))
}
