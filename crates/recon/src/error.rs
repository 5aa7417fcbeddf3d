use thiserror::Error;

use crate::model::Source;

/// Failure to turn a vendor record into a canonical [`Sale`](crate::Sale).
///
/// Every variant is fatal for the run: dropping the offending record would
/// silently understate one source and bias the reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReconError {
    /// A numeric field (token id, price) could not be parsed.
    #[error("{provider}: cannot parse {field} '{value}'")]
    InvalidNumber {
        provider: Source,
        field: &'static str,
        value: String,
    },
    /// A field the canonical shape requires is absent from the payload.
    #[error("{provider}: record {index} is missing required field '{field}'")]
    MissingField {
        provider: Source,
        field: &'static str,
        index: usize,
    },
}

impl ReconError {
    /// The source whose payload produced this error.
    pub fn provider(&self) -> Source {
        match self {
            Self::InvalidNumber { provider, .. } | Self::MissingField { provider, .. } => *provider,
        }
    }

    /// True when the payload shape itself was wrong rather than a value in it.
    pub fn is_schema_mismatch(&self) -> bool {
        matches!(self, Self::MissingField { .. })
    }
}
