//! Users

use rusty_money::{Money, iso::Currency};

/// Per-request user context.
///
/// Supplied by the caller alongside the cart; the engine never persists it.
#[derive(Debug, Clone)]
pub struct UserContext<'a> {
    /// Unique user identifier, used for usage-ledger lookups.
    pub user_id: String,

    /// User tier label, e.g. `NEW`, `REGULAR`, `GOLD`.
    pub user_tier: String,

    /// Total amount the user has spent historically.
    pub lifetime_spend: Money<'a, Currency>,

    /// Number of orders the user has placed.
    pub orders_placed: u32,

    /// ISO country code for the user.
    pub country: String,
}
