//! Best Coupon Demo
//!
//! Loads a coupon catalog and usage ledger from a fixture set, evaluates a
//! sample cart for a user, and prints the ranked eligible coupons along with
//! the selected winner.
//!
//! Run with: `cargo run --example best_coupon`
//!
//! Set `RUST_LOG=clipper=debug` to see per-coupon rejection diagnostics.

use anyhow::Result;
use clap::Parser;
use jiff::Timestamp;
use rusty_money::{Money, iso};
use tabled::{Table, Tabled};

use clipper::{
    carts::{Cart, CartItem},
    fixtures::Fixture,
    selection::CouponSelector,
    users::UserContext,
    utils::DemoArgs,
};

/// One row of the ranked-coupons table.
#[derive(Tabled)]
struct RankedRow {
    #[tabled(rename = "Code")]
    code: String,

    #[tabled(rename = "Description")]
    description: String,

    #[tabled(rename = "Discount")]
    discount: String,

    #[tabled(rename = "Ends")]
    ends: String,
}

/// Best Coupon Demo
#[expect(clippy::print_stdout, reason = "Example code")]
pub fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let args = DemoArgs::parse();

    let now = match &args.now {
        Some(instant) => instant.parse()?,
        None => Timestamp::now(),
    };

    let fixture = Fixture::from_set(&args.fixture)?;

    let user = UserContext {
        user_id: args.user.clone(),
        user_tier: "REGULAR".to_string(),
        lifetime_spend: Money::from_minor(600_00, iso::USD),
        orders_placed: 4,
        country: "US".to_string(),
    };

    let cart = Cart::with_items(
        [
            CartItem::with_category(Money::from_minor(450_00, iso::USD), 1, "fashion"),
            CartItem::with_category(Money::from_minor(25_00, iso::USD), 2, "grocery"),
        ],
        iso::USD,
    )?;

    let metrics = cart.metrics();

    println!(
        "Evaluating cart worth {} ({} items) for user {} at {}\n",
        metrics.cart_value(),
        metrics.total_items(),
        user.user_id,
        now
    );

    let selector = CouponSelector::new(fixture.catalog(), fixture.usage());

    let ranked = selector.ranked_coupons(&user, &cart, now)?;

    if ranked.is_empty() {
        println!("No eligible coupon found.");
        return Ok(());
    }

    let rows: Vec<RankedRow> = ranked
        .iter()
        .map(|entry| RankedRow {
            code: entry.coupon.code().to_string(),
            description: entry.coupon.description().to_string(),
            discount: entry.discount.to_string(),
            ends: entry.coupon.ends().to_string(),
        })
        .collect();

    println!("{}\n", Table::new(rows));

    if let Some(best) = selector.best_coupon(&user, &cart, now)? {
        println!(
            "Best coupon: {} saving {} off {}",
            best.coupon.code(),
            best.discount,
            best.cart_value
        );
    }

    Ok(())
}
