//! Clipper prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    carts::{Cart, CartError, CartItem},
    catalog::{CatalogError, CouponCatalog, InMemoryCatalog, InMemoryUsage, UsageLedger},
    categories::CategorySet,
    coupons::{Coupon, CouponError, DiscountPolicy},
    discounts::{DiscountError, discount_amount},
    eligibility::{EligibilityRules, Rejection, evaluate, is_eligible},
    fixtures::{Fixture, FixtureError},
    metrics::CartMetrics,
    selection::{BestCoupon, CouponSelector, RankedCoupon, SelectionError},
    users::UserContext,
};
