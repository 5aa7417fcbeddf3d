use std::fmt;

use num_bigint::BigUint;
use serde::{Serialize, Serializer};

// ---------------------------------------------------------------------------
// Sources
// ---------------------------------------------------------------------------

/// Provenance of a sale record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Source {
    /// GraphQL event feed with block numbers, timestamps and log indexes.
    Defined,
    /// Trade rows with block numbers but no timestamps.
    Transpose,
    /// Activity feed with timestamps but no block numbers.
    Reservoir,
}

impl Source {
    pub const ALL: [Source; 3] = [Source::Defined, Source::Transpose, Source::Reservoir];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Defined => "Defined",
            Self::Transpose => "Transpose",
            Self::Reservoir => "Reservoir",
        }
    }

    /// Which position field says whether an unmatched record from this
    /// source lies past the reference list's coverage.
    pub fn coverage_field(&self) -> CoverageField {
        match self {
            Self::Defined | Self::Transpose => CoverageField::BlockNumber,
            Self::Reservoir => CoverageField::Timestamp,
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoverageField {
    BlockNumber,
    Timestamp,
}

// ---------------------------------------------------------------------------
// Canonical sale
// ---------------------------------------------------------------------------

/// NFT token identifier. Full uint256 range, ordered numerically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TokenId(BigUint);

impl TokenId {
    /// Parse a base-10 token id. Rejects signs, separators and empty input.
    pub fn parse(raw: &str) -> Option<Self> {
        if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        BigUint::parse_bytes(raw.as_bytes(), 10).map(Self)
    }
}

impl From<u64> for TokenId {
    fn from(value: u64) -> Self {
        Self(BigUint::from(value))
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl Serialize for TokenId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One sale, normalized from any vendor's schema.
///
/// `block_number` and `timestamp` are populated per source: Defined carries
/// both, Transpose only the block number, Reservoir only the timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sale {
    pub source: Source,
    pub contract_address: String,
    pub token_id: TokenId,
    /// Decimal string exactly as reported (or exactly converted).
    pub price: String,
    pub maker: String,
    pub taker: String,
    pub transaction_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_index: Option<u64>,
}

impl Sale {
    pub fn identity(&self) -> IdentityKey<'_> {
        IdentityKey {
            token_id: &self.token_id,
            transaction_hash: &self.transaction_hash,
            maker: &self.maker,
            taker: &self.taker,
        }
    }
}

impl fmt::Display for Sale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "token {} tx {} maker {} taker {} price {} contract {}",
            self.token_id,
            self.transaction_hash,
            self.maker,
            self.taker,
            self.price,
            self.contract_address,
        )?;
        if let Some(block) = self.block_number {
            write!(f, " block {block}")?;
        }
        if let Some(ts) = self.timestamp {
            write!(f, " ts {ts}")?;
        }
        Ok(())
    }
}

/// Join key across sources: `(token_id, transaction_hash, maker, taker)`.
///
/// No vendor exposes a shared trade id, so two records are the same trade
/// iff all four fields are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IdentityKey<'a> {
    pub token_id: &'a TokenId,
    pub transaction_hash: &'a str,
    pub maker: &'a str,
    pub taker: &'a str,
}

// ---------------------------------------------------------------------------
// Pairwise result
// ---------------------------------------------------------------------------

/// A comparable field that disagreed between two identity-matched sales.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MismatchField {
    ContractAddress,
    Price,
    BlockNumber,
}

impl fmt::Display for MismatchField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ContractAddress => write!(f, "contract_address"),
            Self::Price => write!(f, "price"),
            Self::BlockNumber => write!(f, "block_number"),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Mismatch {
    pub reference: Sale,
    pub other: Sale,
    pub fields: Vec<MismatchField>,
}

/// Output of one pairwise reconciliation.
#[derive(Debug, Clone, Serialize)]
pub struct Reconciliation {
    pub reference: Source,
    pub other: Source,
    /// Other-source sales with no match, past the reference tail.
    pub missing_from_reference: Vec<Sale>,
    /// Reference sales with no identity match in the other source.
    pub missing_from_other: Vec<Sale>,
    pub mismatched: Vec<Mismatch>,
}

impl Reconciliation {
    pub fn is_clean(&self) -> bool {
        self.missing_from_reference.is_empty()
            && self.missing_from_other.is_empty()
            && self.mismatched.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_id_parse_rejects_non_digits() {
        assert!(TokenId::parse("").is_none());
        assert!(TokenId::parse("-1").is_none());
        assert!(TokenId::parse("+1").is_none());
        assert!(TokenId::parse("1_000").is_none());
        assert!(TokenId::parse("0x10").is_none());
        assert_eq!(TokenId::parse("0042"), Some(TokenId::from(42)));
    }

    #[test]
    fn token_id_orders_numerically() {
        let small = TokenId::parse("9").unwrap();
        let large = TokenId::parse("10").unwrap();
        assert!(small < large);
    }

    #[test]
    fn token_id_keeps_uint256_range() {
        let max = "115792089237316195423570985008687907853269984665640564039457584007913129639935";
        let id = TokenId::parse(max).unwrap();
        assert_eq!(id.to_string(), max);
        assert_eq!(serde_json::to_string(&id).unwrap(), format!("\"{max}\""));
    }

    #[test]
    fn coverage_field_per_source() {
        assert_eq!(Source::Transpose.coverage_field(), CoverageField::BlockNumber);
        assert_eq!(Source::Reservoir.coverage_field(), CoverageField::Timestamp);
        assert_eq!(Source::Defined.coverage_field(), CoverageField::BlockNumber);
    }
}
