//! Vendor payload shapes, one struct per provider.
//!
//! Every field is optional at the serde layer. Which fields are actually
//! required is decided by [`crate::normalize`], so a payload with a missing
//! field fails with a named [`ReconError::MissingField`](crate::ReconError)
//! instead of an opaque deserialization error.
//!
//! Numeric fields that feed the canonical price or token id are kept as
//! `serde_json::Value`. With `arbitrary_precision` enabled the number's wire
//! text survives untouched, so `1.10` never becomes `1.1000000000000000888`.

use serde::Deserialize;

// ── Defined ─────────────────────────────────────────────────────────

/// Item of `data.getNftEvents.items` from the Defined GraphQL API.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinedEvent {
    pub id: Option<String>,
    pub contract_address: Option<String>,
    pub token_id: Option<String>,
    pub maker: Option<String>,
    pub taker: Option<String>,
    pub individual_trade_price: Option<String>,
    pub total_trade_price: Option<String>,
    pub payment_token_address: Option<String>,
    pub event_type: Option<String>,
    pub fill_source: Option<String>,
    pub exchange_address: Option<String>,
    pub block_number: Option<u64>,
    pub log_index: Option<u64>,
    pub transaction_hash: Option<String>,
    pub timestamp: Option<i64>,
    pub number_of_tokens: Option<u64>,
}

impl DefinedEvent {
    /// Transfer events move a token without a sale.
    pub fn is_transfer(&self) -> bool {
        self.event_type.as_deref() == Some("Transfer")
    }
}

// ── Transpose ───────────────────────────────────────────────────────

/// Item of `results` from the Transpose NFT sales endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransposeSale {
    pub contract_address: Option<String>,
    pub token_id: Option<serde_json::Value>,
    pub eth_price: Option<serde_json::Value>,
    pub block_number: Option<u64>,
    pub seller: Option<String>,
    pub buyer: Option<String>,
    pub transaction_hash: Option<String>,
}

// ── Reservoir ───────────────────────────────────────────────────────

/// Item of `activities` from the Reservoir collection activity feed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservoirActivity {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub price: Option<serde_json::Value>,
    pub amount: Option<u64>,
    pub timestamp: Option<i64>,
    pub contract: Option<String>,
    pub tx_hash: Option<String>,
    pub token: Option<ReservoirToken>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservoirToken {
    pub token_id: Option<String>,
    pub token_name: Option<String>,
}
