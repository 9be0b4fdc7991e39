//! Usage Fixtures

use rustc_hash::FxHashMap;
use serde::Deserialize;

/// Wrapper for usage records in YAML
#[derive(Debug, Deserialize)]
pub struct UsageFixture {
    /// Map of user id -> coupon code -> redemption count
    pub usage: FxHashMap<String, FxHashMap<String, u32>>,
}
