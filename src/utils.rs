//! Utils

use clap::Parser;

/// Arguments for the best-coupon demo
#[derive(Debug, Parser)]
pub struct DemoArgs {
    /// Fixture set to load the catalog & usage records from
    #[clap(short, long, default_value = "seed")]
    pub fixture: String,

    /// Evaluation instant, RFC 3339 (defaults to the current time)
    #[clap(short, long)]
    pub now: Option<String>,

    /// User id to evaluate for
    #[clap(short, long, default_value = "u123")]
    pub user: String,
}
