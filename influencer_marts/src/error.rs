//! Domain errors raised while loading raw relations or validating settings.

use thiserror::Error;

/// Errors produced by the marts library outside of the storage layer.
#[derive(Debug, Error)]
pub enum MartError {
    /// An influencer row carries a payout basis other than "Post" or "Order".
    #[error("influencer {influencer_id}: unknown payout_basis '{value}'")]
    UnknownPayoutBasis {
        /// Offending influencer.
        influencer_id: String,
        /// Raw column value.
        value: String,
    },

    /// A date column could not be parsed.
    #[error("{relation}: bad date '{value}'")]
    BadDate {
        /// Relation the value came from (e.g., "raw_posts").
        relation: &'static str,
        /// Raw column value.
        value: String,
    },

    /// A non-negative count column holds a negative value.
    #[error("{relation}.{column}: negative value {value}")]
    NegativeCount {
        /// Relation the value came from.
        relation: &'static str,
        /// Column name.
        column: &'static str,
        /// Raw column value.
        value: i64,
    },

    /// A raw relation could not be read from the store.
    #[error("raw relation {0} is unavailable")]
    MissingRelation(&'static str),

    /// Rate settings that would make the payout formulas meaningless.
    #[error("invalid rates: {0}")]
    InvalidRates(String),
}
