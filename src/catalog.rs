//! Catalog & Usage Providers
//!
//! The engine reads coupons and per-user redemption counts through these
//! provider traits. Implementations own any synchronization needed to present
//! a consistent snapshot for the duration of one evaluation; the engine
//! itself never mutates them.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::coupons::{Coupon, CouponError};

/// Errors raised by the in-memory catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// A coupon with the same code already exists.
    #[error("coupon code already exists: {0}")]
    DuplicateCode(String),

    /// Wrapped coupon shape validation error.
    #[error(transparent)]
    Coupon(#[from] CouponError),
}

/// Read-only access to a coupon catalog snapshot.
pub trait CouponCatalog<'a> {
    /// All coupons in the catalog. Iteration order carries no meaning; the
    /// selector's ranking is order-independent.
    fn coupons(&self) -> &[Coupon<'a>];
}

/// Read-only access to per-user redemption counts.
pub trait UsageLedger {
    /// Number of times the user has redeemed the coupon. Defaults to zero
    /// when no record exists.
    fn redemptions(&self, user_id: &str, code: &str) -> u32;
}

/// An in-memory coupon catalog keyed by coupon code.
#[derive(Debug, Default)]
pub struct InMemoryCatalog<'a> {
    coupons: Vec<Coupon<'a>>,
    codes: FxHashMap<String, usize>,
}

impl<'a> InMemoryCatalog<'a> {
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self {
            coupons: Vec::new(),
            codes: FxHashMap::default(),
        }
    }

    /// Insert a coupon, rejecting duplicate codes.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DuplicateCode`] if a coupon with the same code
    /// is already present.
    pub fn insert(&mut self, coupon: Coupon<'a>) -> Result<(), CatalogError> {
        if self.codes.contains_key(coupon.code()) {
            return Err(CatalogError::DuplicateCode(coupon.code().to_string()));
        }

        self.codes
            .insert(coupon.code().to_string(), self.coupons.len());
        self.coupons.push(coupon);

        Ok(())
    }

    /// Look up a coupon by code.
    pub fn get(&self, code: &str) -> Option<&Coupon<'a>> {
        self.codes
            .get(code)
            .and_then(|&index| self.coupons.get(index))
    }

    /// Number of coupons in the catalog.
    pub fn len(&self) -> usize {
        self.coupons.len()
    }

    /// Check if the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.coupons.is_empty()
    }
}

impl<'a> CouponCatalog<'a> for InMemoryCatalog<'a> {
    fn coupons(&self) -> &[Coupon<'a>] {
        &self.coupons
    }
}

/// An in-memory usage ledger: user id → coupon code → redemption count.
///
/// Recording a redemption belongs to the confirmed-purchase flow, which is
/// outside the selection engine; the engine only reads counts.
#[derive(Debug, Default)]
pub struct InMemoryUsage {
    counts: FxHashMap<String, FxHashMap<String, u32>>,
}

impl InMemoryUsage {
    /// Create an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            counts: FxHashMap::default(),
        }
    }

    /// Record one redemption of a coupon by a user.
    pub fn record_redemption(&mut self, user_id: &str, code: &str) {
        let count = self
            .counts
            .entry(user_id.to_string())
            .or_default()
            .entry(code.to_string())
            .or_insert(0);

        *count += 1;
    }

    /// Overwrite the redemption count for a user and coupon.
    pub fn set_redemptions(&mut self, user_id: &str, code: &str, count: u32) {
        self.counts
            .entry(user_id.to_string())
            .or_default()
            .insert(code.to_string(), count);
    }
}

impl UsageLedger for InMemoryUsage {
    fn redemptions(&self, user_id: &str, code: &str) -> u32 {
        self.counts
            .get(user_id)
            .and_then(|by_code| by_code.get(code))
            .copied()
            .unwrap_or(0)
    }
}
