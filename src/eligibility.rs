//! Eligibility
//!
//! The pass/fail predicate deciding whether a coupon applies to a user and
//! cart. All configured rules combine conjunctively; an unconfigured rule is
//! vacuously true. Evaluation runs in a fixed order and short-circuits on the
//! first failing rule. The order only affects which [`Rejection`] is
//! reported, never the outcome.

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use smallvec::SmallVec;

use crate::{
    catalog::UsageLedger, categories::CategorySet, coupons::Coupon, metrics::CartMetrics,
    users::UserContext,
};

/// Eligibility rules attached to a coupon.
///
/// Every rule is independently optional: `None` or an empty set means the
/// rule is not enforced.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EligibilityRules<'a> {
    /// User tiers the coupon is restricted to.
    pub allowed_user_tiers: SmallVec<[String; 2]>,

    /// Minimum historical spend required of the user.
    pub min_lifetime_spend: Option<Money<'a, Currency>>,

    /// Minimum number of orders the user must have placed.
    pub min_orders_placed: Option<u32>,

    /// Restrict the coupon to the user's first order.
    pub first_order_only: bool,

    /// Countries the coupon is restricted to.
    pub allowed_countries: SmallVec<[String; 2]>,

    /// Minimum cart value required.
    pub min_cart_value: Option<Money<'a, Currency>>,

    /// Minimum total item count required.
    pub min_items_count: Option<u64>,

    /// The cart must contain at least one item from these categories.
    pub applicable_categories: CategorySet,

    /// The cart must contain no item from these categories.
    pub excluded_categories: CategorySet,
}

impl<'a> EligibilityRules<'a> {
    /// Returns the currency used by the rules' monetary thresholds, if any.
    pub fn currency(&self) -> Option<&'a Currency> {
        self.min_lifetime_spend
            .as_ref()
            .map(|threshold| threshold.currency())
            .or_else(|| {
                self.min_cart_value
                    .as_ref()
                    .map(|threshold| threshold.currency())
            })
    }
}

/// The first rule that failed during an eligibility evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// The coupon's monetary fields use a different currency than the cart.
    CurrencyMismatch,

    /// `now` falls outside the coupon's validity window.
    OutsideValidityWindow,

    /// The user has exhausted the per-user redemption limit.
    UsageLimitReached,

    /// The user's tier is not in the allowed set.
    TierNotAllowed,

    /// The user's lifetime spend is below the threshold.
    LifetimeSpendTooLow,

    /// The user has placed fewer orders than required.
    TooFewOrders,

    /// The coupon is restricted to first orders and the user has ordered before.
    NotFirstOrder,

    /// The user's country is not in the allowed set.
    CountryNotAllowed,

    /// The cart value is below the threshold.
    CartValueTooLow,

    /// The cart holds fewer items than required.
    TooFewItems,

    /// No cart item belongs to the applicable categories.
    NoApplicableCategory,

    /// A cart item belongs to an excluded category.
    ExcludedCategoryPresent,
}

/// A single eligibility sub-rule check.
type RuleCheck =
    fn(&EligibilityRules<'_>, &UserContext<'_>, &CartMetrics<'_>) -> Option<Rejection>;

/// The configured sub-rules, in the order they are reported.
const RULE_CHECKS: [RuleCheck; 9] = [
    tier_allowed,
    lifetime_spend_met,
    orders_placed_met,
    first_order_only,
    country_allowed,
    cart_value_met,
    items_count_met,
    applicable_category_present,
    excluded_category_absent,
];

/// Decide whether a coupon is eligible for the given user and cart.
///
/// `now` is supplied by the caller rather than read from an ambient clock, so
/// evaluations are deterministic and replayable. Both ends of the validity
/// window are inclusive.
pub fn is_eligible<U: UsageLedger>(
    coupon: &Coupon<'_>,
    user: &UserContext<'_>,
    metrics: &CartMetrics<'_>,
    now: Timestamp,
    usage: &U,
) -> bool {
    evaluate(coupon, user, metrics, now, usage).is_none()
}

/// Evaluate every applicable rule, returning the first failure or `None`
/// when the coupon is eligible.
pub fn evaluate<U: UsageLedger>(
    coupon: &Coupon<'_>,
    user: &UserContext<'_>,
    metrics: &CartMetrics<'_>,
    now: Timestamp,
    usage: &U,
) -> Option<Rejection> {
    if let Some(currency) = coupon.currency()
        && currency != metrics.cart_value().currency()
    {
        return Some(Rejection::CurrencyMismatch);
    }

    if now < coupon.starts() || now > coupon.ends() {
        return Some(Rejection::OutsideValidityWindow);
    }

    if let Some(limit) = coupon.usage_limit_per_user()
        && usage.redemptions(&user.user_id, coupon.code()) >= limit
    {
        return Some(Rejection::UsageLimitReached);
    }

    let rules = coupon.eligibility()?;

    RULE_CHECKS
        .iter()
        .find_map(|check| check(rules, user, metrics))
}

/// Compare two amounts, treating a currency mismatch as "below threshold".
fn at_least(actual: &Money<'_, Currency>, threshold: &Money<'_, Currency>) -> bool {
    actual.currency() == threshold.currency()
        && actual.to_minor_units() >= threshold.to_minor_units()
}

fn tier_allowed(
    rules: &EligibilityRules<'_>,
    user: &UserContext<'_>,
    _metrics: &CartMetrics<'_>,
) -> Option<Rejection> {
    if !rules.allowed_user_tiers.is_empty()
        && !rules.allowed_user_tiers.contains(&user.user_tier)
    {
        return Some(Rejection::TierNotAllowed);
    }

    None
}

fn lifetime_spend_met(
    rules: &EligibilityRules<'_>,
    user: &UserContext<'_>,
    _metrics: &CartMetrics<'_>,
) -> Option<Rejection> {
    if let Some(threshold) = &rules.min_lifetime_spend
        && !at_least(&user.lifetime_spend, threshold)
    {
        return Some(Rejection::LifetimeSpendTooLow);
    }

    None
}

fn orders_placed_met(
    rules: &EligibilityRules<'_>,
    user: &UserContext<'_>,
    _metrics: &CartMetrics<'_>,
) -> Option<Rejection> {
    if let Some(threshold) = rules.min_orders_placed
        && user.orders_placed < threshold
    {
        return Some(Rejection::TooFewOrders);
    }

    None
}

fn first_order_only(
    rules: &EligibilityRules<'_>,
    user: &UserContext<'_>,
    _metrics: &CartMetrics<'_>,
) -> Option<Rejection> {
    if rules.first_order_only && user.orders_placed > 0 {
        return Some(Rejection::NotFirstOrder);
    }

    None
}

fn country_allowed(
    rules: &EligibilityRules<'_>,
    user: &UserContext<'_>,
    _metrics: &CartMetrics<'_>,
) -> Option<Rejection> {
    if !rules.allowed_countries.is_empty() && !rules.allowed_countries.contains(&user.country) {
        return Some(Rejection::CountryNotAllowed);
    }

    None
}

fn cart_value_met(
    rules: &EligibilityRules<'_>,
    _user: &UserContext<'_>,
    metrics: &CartMetrics<'_>,
) -> Option<Rejection> {
    if let Some(threshold) = &rules.min_cart_value
        && !at_least(metrics.cart_value(), threshold)
    {
        return Some(Rejection::CartValueTooLow);
    }

    None
}

fn items_count_met(
    rules: &EligibilityRules<'_>,
    _user: &UserContext<'_>,
    metrics: &CartMetrics<'_>,
) -> Option<Rejection> {
    if let Some(threshold) = rules.min_items_count
        && metrics.total_items() < threshold
    {
        return Some(Rejection::TooFewItems);
    }

    None
}

fn applicable_category_present(
    rules: &EligibilityRules<'_>,
    _user: &UserContext<'_>,
    metrics: &CartMetrics<'_>,
) -> Option<Rejection> {
    if !rules.applicable_categories.is_empty()
        && !metrics.categories().intersects(&rules.applicable_categories)
    {
        return Some(Rejection::NoApplicableCategory);
    }

    None
}

fn excluded_category_absent(
    rules: &EligibilityRules<'_>,
    _user: &UserContext<'_>,
    metrics: &CartMetrics<'_>,
) -> Option<Rejection> {
    if !rules.excluded_categories.is_empty()
        && metrics.categories().intersects(&rules.excluded_categories)
    {
        return Some(Rejection::ExcludedCategoryPresent);
    }

    None
}
