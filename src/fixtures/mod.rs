//! Fixtures
//!
//! YAML-backed fixture sets for demos and tests: a coupon catalog seed plus
//! an optional usage-ledger seed, loaded from `fixtures/coupons/<set>.yml`
//! and `fixtures/usage/<set>.yml`.

use std::{fs, path::PathBuf};

use thiserror::Error;

use crate::{
    catalog::{CatalogError, InMemoryCatalog, InMemoryUsage},
    coupons::CouponError,
};

pub mod coupons;
pub mod usage;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price format
    #[error("Invalid price format: {0}")]
    InvalidPrice(String),

    /// Invalid percent rate format
    #[error("Invalid percent rate format: {0}")]
    InvalidRate(String),

    /// Unknown currency code
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Coupon shape validation error
    #[error(transparent)]
    Coupon(#[from] CouponError),

    /// Catalog insertion error
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// A loaded fixture set: coupon catalog plus usage ledger.
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Seeded coupon catalog
    catalog: InMemoryCatalog<'static>,

    /// Seeded usage ledger
    usage: InMemoryUsage,
}

impl Fixture {
    /// Create a new empty fixture with default base path
    #[must_use]
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            catalog: InMemoryCatalog::new(),
            usage: InMemoryUsage::new(),
        }
    }

    /// Load a complete fixture set by name: its coupon catalog and, when the
    /// file exists, its usage records.
    ///
    /// # Errors
    ///
    /// Returns an error if a fixture file cannot be read or parsed, or a
    /// seeded coupon fails validation.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::new();

        fixture.load_coupons(name)?;

        let usage_path = fixture.base_path.join("usage").join(format!("{name}.yml"));
        if usage_path.exists() {
            fixture.load_usage(name)?;
        }

        Ok(fixture)
    }

    /// Load coupons from a YAML fixture file into the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, a coupon fails
    /// shape validation, or a code is duplicated.
    pub fn load_coupons(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("coupons").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: coupons::CouponsFixture = serde_norway::from_str(&contents)?;

        for (code, coupon_fixture) in fixture.coupons {
            let coupon = coupons::build_coupon(&code, coupon_fixture)?;

            self.catalog.insert(coupon)?;
        }

        Ok(self)
    }

    /// Load usage records from a YAML fixture file into the ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_usage(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("usage").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: usage::UsageFixture = serde_norway::from_str(&contents)?;

        for (user_id, by_code) in fixture.usage {
            for (code, count) in by_code {
                self.usage.set_redemptions(&user_id, &code, count);
            }
        }

        Ok(self)
    }

    /// The seeded coupon catalog.
    pub fn catalog(&self) -> &InMemoryCatalog<'static> {
        &self.catalog
    }

    /// The seeded usage ledger.
    pub fn usage(&self) -> &InMemoryUsage {
        &self.usage
    }
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}
