//! Best-Coupon Selection
//!
//! The read-only orchestration over the catalog: compute cart metrics once,
//! filter coupons through the eligibility evaluator, compute each survivor's
//! discount, and rank survivors deterministically. Nothing here records usage
//! or mutates the catalog; redemption bookkeeping belongs to the
//! confirmed-purchase flow.

use std::cmp::Ordering;

use jiff::Timestamp;
use rusty_money::{Money, iso::Currency};
use thiserror::Error;
use tracing::debug;

use crate::{
    carts::Cart,
    catalog::{CouponCatalog, UsageLedger},
    coupons::Coupon,
    discounts::{DiscountError, discount_amount},
    eligibility,
    metrics::CartMetrics,
    users::UserContext,
};

/// Selection Errors
#[derive(Debug, Error)]
pub enum SelectionError {
    /// Wrapped discount calculation error.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// An eligible coupon together with its computed discount.
#[derive(Debug, Clone, Copy)]
pub struct RankedCoupon<'p, 'a> {
    /// The eligible coupon.
    pub coupon: &'p Coupon<'a>,

    /// The discount the coupon yields for the evaluated cart.
    pub discount: Money<'a, Currency>,
}

/// The winning coupon for one evaluation.
#[derive(Debug, Clone, Copy)]
pub struct BestCoupon<'p, 'a> {
    /// The selected coupon.
    pub coupon: &'p Coupon<'a>,

    /// The discount the coupon yields.
    pub discount: Money<'a, Currency>,

    /// The cart value the discount was computed against.
    pub cart_value: Money<'a, Currency>,
}

/// Selects the most favorable coupon from a catalog for a user and cart.
///
/// Stateless per invocation: each call reads the injected catalog and usage
/// snapshots, allocates only ephemeral per-call data, and is safe to run
/// concurrently with other selections.
#[derive(Debug, Clone, Copy)]
pub struct CouponSelector<'p, C, U> {
    catalog: &'p C,
    usage: &'p U,
}

impl<'p, C, U> CouponSelector<'p, C, U>
where
    U: UsageLedger,
{
    /// Create a selector over the given catalog and usage providers.
    pub fn new(catalog: &'p C, usage: &'p U) -> Self {
        Self { catalog, usage }
    }

    /// All eligible coupons with their discounts, ranked best-first.
    ///
    /// The order is total: higher discount first, then earlier end date,
    /// then lexicographically smaller code, so the result does not depend on
    /// catalog iteration order.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectionError`] if a survivor's discount cannot be
    /// computed.
    pub fn ranked_coupons<'a>(
        &self,
        user: &UserContext<'_>,
        cart: &Cart<'a>,
        now: Timestamp,
    ) -> Result<Vec<RankedCoupon<'p, 'a>>, SelectionError>
    where
        C: CouponCatalog<'a>,
    {
        self.ranked_with_metrics(user, &cart.metrics(), now)
    }

    fn ranked_with_metrics<'a>(
        &self,
        user: &UserContext<'_>,
        metrics: &CartMetrics<'a>,
        now: Timestamp,
    ) -> Result<Vec<RankedCoupon<'p, 'a>>, SelectionError>
    where
        C: CouponCatalog<'a>,
    {
        let mut ranked = Vec::new();

        for coupon in self.catalog.coupons() {
            match eligibility::evaluate(coupon, user, metrics, now, self.usage) {
                Some(rejection) => {
                    debug!(code = coupon.code(), ?rejection, "coupon rejected");
                }
                None => {
                    let discount = discount_amount(coupon.policy(), metrics)?;

                    ranked.push(RankedCoupon { coupon, discount });
                }
            }
        }

        ranked.sort_by(rank_order);

        Ok(ranked)
    }

    /// Find the single most favorable coupon, or `None` when no coupon in
    /// the catalog is eligible, which is a normal outcome rather than an
    /// error.
    ///
    /// Repeated calls with identical inputs against unchanged catalog and
    /// usage snapshots yield identical results.
    ///
    /// # Errors
    ///
    /// Returns a [`SelectionError`] if a survivor's discount cannot be
    /// computed.
    pub fn best_coupon<'a>(
        &self,
        user: &UserContext<'_>,
        cart: &Cart<'a>,
        now: Timestamp,
    ) -> Result<Option<BestCoupon<'p, 'a>>, SelectionError>
    where
        C: CouponCatalog<'a>,
    {
        let metrics = cart.metrics();
        let ranked = self.ranked_with_metrics(user, &metrics, now)?;

        let Some(winner) = ranked.into_iter().next() else {
            debug!("no eligible coupon");
            return Ok(None);
        };

        debug!(
            code = winner.coupon.code(),
            discount = %winner.discount,
            "best coupon selected"
        );

        Ok(Some(BestCoupon {
            coupon: winner.coupon,
            discount: winner.discount,
            cart_value: *metrics.cart_value(),
        }))
    }
}

/// Three-key ranking: discount descending, end date ascending, code
/// ascending. Total over any pair of catalog entries since codes are unique.
fn rank_order(a: &RankedCoupon<'_, '_>, b: &RankedCoupon<'_, '_>) -> Ordering {
    b.discount
        .to_minor_units()
        .cmp(&a.discount.to_minor_units())
        .then_with(|| a.coupon.ends().cmp(&b.coupon.ends()))
        .then_with(|| a.coupon.code().cmp(b.coupon.code()))
}

#[cfg(test)]
mod tests {
    use rusty_money::{Money, iso};
    use testresult::TestResult;

    use crate::{
        carts::CartItem,
        catalog::{InMemoryCatalog, InMemoryUsage},
        coupons::DiscountPolicy,
    };

    use super::*;

    const NOW: &str = "2026-06-15T12:00:00Z";

    fn user<'a>() -> UserContext<'a> {
        UserContext {
            user_id: "u1".to_string(),
            user_tier: "REGULAR".to_string(),
            lifetime_spend: Money::from_minor(600_00, iso::USD),
            orders_placed: 4,
            country: "US".to_string(),
        }
    }

    fn cart() -> TestResult<Cart<'static>> {
        Ok(Cart::with_items(
            [CartItem::new(Money::from_minor(500_00, iso::USD), 1)],
            iso::USD,
        )?)
    }

    fn flat_coupon(
        code: &str,
        amount_minor: i64,
        ends: &str,
    ) -> TestResult<Coupon<'static>> {
        Ok(Coupon::new(
            code,
            "test coupon",
            DiscountPolicy::Flat(Money::from_minor(amount_minor, iso::USD)),
            "2026-01-01T00:00:00Z".parse()?,
            ends.parse()?,
        )?)
    }

    #[test]
    fn empty_catalog_selects_nothing() -> TestResult {
        let catalog = InMemoryCatalog::new();
        let usage = InMemoryUsage::new();
        let selector = CouponSelector::new(&catalog, &usage);

        let best = selector.best_coupon(&user(), &cart()?, NOW.parse()?)?;

        assert!(best.is_none());

        Ok(())
    }

    #[test]
    fn all_ineligible_selects_nothing() -> TestResult {
        let mut catalog = InMemoryCatalog::new();

        // Expired well before the evaluation instant.
        catalog.insert(flat_coupon("EXPIRED", 10_00, "2026-02-01T00:00:00Z")?)?;

        let usage = InMemoryUsage::new();
        let selector = CouponSelector::new(&catalog, &usage);

        let best = selector.best_coupon(&user(), &cart()?, NOW.parse()?)?;

        assert!(best.is_none());

        Ok(())
    }

    #[test]
    fn highest_discount_wins() -> TestResult {
        let mut catalog = InMemoryCatalog::new();

        catalog.insert(flat_coupon("SMALL", 10_00, "2026-12-31T00:00:00Z")?)?;
        catalog.insert(flat_coupon("BIG", 50_00, "2026-12-31T00:00:00Z")?)?;

        let usage = InMemoryUsage::new();
        let selector = CouponSelector::new(&catalog, &usage);

        let Some(best) = selector.best_coupon(&user(), &cart()?, NOW.parse()?)? else {
            panic!("expected a winner");
        };

        assert_eq!(best.coupon.code(), "BIG");
        assert_eq!(best.discount, Money::from_minor(50_00, iso::USD));
        assert_eq!(best.cart_value, Money::from_minor(500_00, iso::USD));

        Ok(())
    }

    #[test]
    fn discount_tie_prefers_earlier_end_date() -> TestResult {
        let mut catalog = InMemoryCatalog::new();

        catalog.insert(flat_coupon("LATE", 50_00, "2026-12-31T00:00:00Z")?)?;
        catalog.insert(flat_coupon("EARLY", 50_00, "2026-07-01T00:00:00Z")?)?;

        let usage = InMemoryUsage::new();
        let selector = CouponSelector::new(&catalog, &usage);

        let Some(best) = selector.best_coupon(&user(), &cart()?, NOW.parse()?)? else {
            panic!("expected a winner");
        };

        assert_eq!(best.coupon.code(), "EARLY");

        Ok(())
    }

    #[test]
    fn full_tie_prefers_smaller_code() -> TestResult {
        let mut catalog = InMemoryCatalog::new();

        // Insert in reverse lexicographic order to show insertion order is
        // irrelevant.
        catalog.insert(flat_coupon("Z_X", 50_00, "2026-12-31T00:00:00Z")?)?;
        catalog.insert(flat_coupon("A_X", 50_00, "2026-12-31T00:00:00Z")?)?;

        let usage = InMemoryUsage::new();
        let selector = CouponSelector::new(&catalog, &usage);

        let Some(best) = selector.best_coupon(&user(), &cart()?, NOW.parse()?)? else {
            panic!("expected a winner");
        };

        assert_eq!(best.coupon.code(), "A_X");

        Ok(())
    }

    #[test]
    fn ranked_coupons_are_best_first() -> TestResult {
        let mut catalog = InMemoryCatalog::new();

        catalog.insert(flat_coupon("MID", 30_00, "2026-12-31T00:00:00Z")?)?;
        catalog.insert(flat_coupon("TOP", 50_00, "2026-12-31T00:00:00Z")?)?;
        catalog.insert(flat_coupon("LOW", 10_00, "2026-12-31T00:00:00Z")?)?;

        let usage = InMemoryUsage::new();
        let selector = CouponSelector::new(&catalog, &usage);

        let cart = cart()?;
        let ranked = selector.ranked_coupons(&user(), &cart, NOW.parse()?)?;

        let codes: Vec<&str> = ranked.iter().map(|entry| entry.coupon.code()).collect();

        assert_eq!(codes, vec!["TOP", "MID", "LOW"]);

        Ok(())
    }

    #[test]
    fn selection_is_idempotent() -> TestResult {
        let mut catalog = InMemoryCatalog::new();

        catalog.insert(flat_coupon("A", 50_00, "2026-12-31T00:00:00Z")?)?;
        catalog.insert(flat_coupon("B", 50_00, "2026-10-01T00:00:00Z")?)?;

        let usage = InMemoryUsage::new();
        let selector = CouponSelector::new(&catalog, &usage);

        let cart = cart()?;

        let Some(first) = selector.best_coupon(&user(), &cart, NOW.parse()?)? else {
            panic!("expected a winner");
        };
        let Some(second) = selector.best_coupon(&user(), &cart, NOW.parse()?)? else {
            panic!("expected a winner");
        };

        assert_eq!(first.coupon.code(), second.coupon.code());
        assert_eq!(first.discount, second.discount);
        assert_eq!(first.cart_value, second.cart_value);

        Ok(())
    }

    #[test]
    fn selection_does_not_mutate_usage() -> TestResult {
        let mut catalog = InMemoryCatalog::new();

        catalog.insert(
            flat_coupon("ONCE", 50_00, "2026-12-31T00:00:00Z")?.with_usage_limit(1)?,
        )?;

        let usage = InMemoryUsage::new();
        let selector = CouponSelector::new(&catalog, &usage);

        let cart = cart()?;

        // Selecting twice must not consume the single permitted redemption.
        for _ in 0..2 {
            let Some(best) = selector.best_coupon(&user(), &cart, NOW.parse()?)? else {
                panic!("expected a winner");
            };

            assert_eq!(best.coupon.code(), "ONCE");
        }

        Ok(())
    }
}
