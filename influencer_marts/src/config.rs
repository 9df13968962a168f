//! Configuration: payout rates, store location and logging.
//!
//! The configuration is a small TOML document. Every section is optional;
//! omitted values fall back to the rates the raw data was generated with.
//!
//! ```toml
//! [database]
//! url = "data.db"
//!
//! [rates]
//! commission_rate = 0.08
//! segmentation_threshold = 500000
//! base_multiplier = 0.05
//! progressive_increment = 0.01
//! tier_size = 300000
//! cost_of_goods_ratio = 0.55
//! profit_margin_factor = 0.45
//!
//! [logging]
//! level = "info"
//! format = "pretty"
//! ```
//!
//! Entrypoints:
//! - Parse + validate from a TOML string: [`load_config_str`]
//! - Parse + validate from a file path: [`load_config_path`]
//!
//! The database URL resolves from the file first and then from the
//! `DATABASE_URL` environment variable (see [`MartsConfig::database_url`]).

use anyhow::{Context, bail};
use serde::{Deserialize, Serialize};
use tracing_subscriber::{EnvFilter, fmt};

use crate::error::MartError;

/// Commission paid to order-basis influencers, as a fraction of revenue.
pub const COMMISSION_RATE: f64 = 0.08;
/// Follower count at and above which an influencer is paid per post.
pub const PAYOUT_SEGMENTATION_THRESHOLD: u64 = 500_000;
/// Per-post rate multiplier at the threshold.
pub const POST_PAYOUT_BASE_MULTIPLIER: f64 = 0.05;
/// Multiplier added per tier above the threshold.
pub const POST_PAYOUT_PROGRESSIVE_INCREMENT: f64 = 0.01;
/// Followers per progressive tier.
pub const POST_PAYOUT_TIER_SIZE: u64 = 300_000;
/// Cost of goods as a fraction of revenue.
pub const COST_OF_GOODS_RATIO: f64 = 0.55;
/// Gross profit as a fraction of revenue, used by the dashboard KPIs.
pub const PROFIT_MARGIN_FACTOR: f64 = 0.45;

/// Environment variable consulted when the config has no database URL.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// Top-level configuration document.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MartsConfig {
    /// Store location; optional because `DATABASE_URL` may supply it.
    pub database: Option<DatabaseCfg>,
    /// Payout and profit rates.
    #[serde(default)]
    pub rates: PayoutRates,
    /// Log level and format for the CLI.
    #[serde(default)]
    pub logging: LoggingCfg,
}

/// Store location.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct DatabaseCfg {
    /// SQLite file path or `sqlite:` URL.
    pub url: String,
}

/// Rates feeding the payout, cost and profit formulas.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PayoutRates {
    /// Fraction of influenced revenue paid to order-basis influencers.
    pub commission_rate: f64,
    /// Follower count separating post-basis from order-basis influencers.
    pub segmentation_threshold: u64,
    /// Per-post multiplier applied to the follower count.
    pub base_multiplier: f64,
    /// Multiplier increment per (fractional) tier above the threshold.
    pub progressive_increment: f64,
    /// Followers per tier; must be non-zero.
    pub tier_size: u64,
    /// Cost of goods as a fraction of revenue.
    pub cost_of_goods_ratio: f64,
    /// Gross margin used for dashboard net profit.
    pub profit_margin_factor: f64,
}

impl Default for PayoutRates {
    fn default() -> Self {
        Self {
            commission_rate: COMMISSION_RATE,
            segmentation_threshold: PAYOUT_SEGMENTATION_THRESHOLD,
            base_multiplier: POST_PAYOUT_BASE_MULTIPLIER,
            progressive_increment: POST_PAYOUT_PROGRESSIVE_INCREMENT,
            tier_size: POST_PAYOUT_TIER_SIZE,
            cost_of_goods_ratio: COST_OF_GOODS_RATIO,
            profit_margin_factor: PROFIT_MARGIN_FACTOR,
        }
    }
}

impl PayoutRates {
    /// Reject settings that break the formulas: a zero tier size, negative
    /// multipliers, or fractions outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), MartError> {
        if self.tier_size == 0 {
            return Err(MartError::InvalidRates("tier_size must be > 0".into()));
        }
        let fractions = [
            ("commission_rate", self.commission_rate),
            ("cost_of_goods_ratio", self.cost_of_goods_ratio),
            ("profit_margin_factor", self.profit_margin_factor),
        ];
        for (name, v) in fractions {
            if !(0.0..=1.0).contains(&v) {
                return Err(MartError::InvalidRates(format!(
                    "{name} must be within [0, 1], got {v}"
                )));
            }
        }
        let multipliers = [
            ("base_multiplier", self.base_multiplier),
            ("progressive_increment", self.progressive_increment),
        ];
        for (name, v) in multipliers {
            if !v.is_finite() || v < 0.0 {
                return Err(MartError::InvalidRates(format!(
                    "{name} must be a non-negative number, got {v}"
                )));
            }
        }
        Ok(())
    }
}

/// Logging configuration for the CLI.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingCfg {
    /// Default filter directive when `RUST_LOG` is unset.
    pub level: String,
    /// "pretty" or "json".
    pub format: String,
}

impl Default for LoggingCfg {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: "pretty".into(),
        }
    }
}

impl LoggingCfg {
    /// Install the global tracing subscriber. `RUST_LOG` overrides `level`.
    pub fn init(&self) {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&self.level));

        match self.format.as_str() {
            "json" => fmt().json().with_env_filter(filter).with_writer(std::io::stderr).init(),
            _ => fmt().with_env_filter(filter).with_writer(std::io::stderr).init(),
        }
    }
}

impl MartsConfig {
    /// Resolve the store location: config file first, then `DATABASE_URL`.
    pub fn database_url(&self) -> anyhow::Result<String> {
        if let Some(db) = &self.database {
            let url = db.url.trim();
            if url.is_empty() {
                bail!("database.url cannot be empty");
            }
            return Ok(url.to_string());
        }
        std::env::var(DATABASE_URL_ENV)
            .with_context(|| format!("no [database] url configured and {DATABASE_URL_ENV} is unset"))
    }
}

/// Parse and validate a configuration from a TOML string.
///
/// Errors:
/// - TOML parse failures (including unknown keys)
/// - Invalid rates (see [`PayoutRates::validate`])
pub fn load_config_str(toml_str: &str) -> anyhow::Result<MartsConfig> {
    let cfg: MartsConfig = toml::from_str(toml_str).context("failed to parse marts config TOML")?;
    cfg.rates.validate()?;
    if !matches!(cfg.logging.format.as_str(), "pretty" | "json") {
        bail!("logging.format must be \"pretty\" or \"json\", got {:?}", cfg.logging.format);
    }
    Ok(cfg)
}

/// Read a configuration file from disk, parse, and validate it.
pub fn load_config_path(path: impl AsRef<std::path::Path>) -> anyhow::Result<MartsConfig> {
    let text = std::fs::read_to_string(path.as_ref())
        .with_context(|| format!("read config file {}", path.as_ref().display()))?;
    load_config_str(&text)
}
