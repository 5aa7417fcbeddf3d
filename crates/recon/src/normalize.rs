//! Vendor payload -> canonical [`Sale`].
//!
//! Pure transforms. A record that cannot be normalized aborts the whole
//! payload with a [`ReconError`]; nothing is skipped silently except
//! Defined transfer events, which are not sales.

use tracing::debug;

use crate::decimal::{canonical_decimal, decimal_from_json};
use crate::error::ReconError;
use crate::model::{Sale, Source, TokenId};
use crate::raw::{DefinedEvent, ReservoirActivity, TransposeSale};

pub fn normalize_defined(events: &[DefinedEvent]) -> Result<Vec<Sale>, ReconError> {
    const SRC: Source = Source::Defined;
    let mut sales = Vec::with_capacity(events.len());

    for (index, event) in events.iter().enumerate() {
        if event.is_transfer() {
            continue;
        }

        let token_raw = required(event.token_id.as_deref(), SRC, "tokenId", index)?;
        let price = required(event.individual_trade_price.as_deref(), SRC, "individualTradePrice", index)?;
        if canonical_decimal(price).is_none() {
            return Err(invalid(SRC, "individualTradePrice", price));
        }

        sales.push(Sale {
            source: SRC,
            contract_address: lower(event.contract_address.as_deref(), SRC, "contractAddress", index)?,
            token_id: token_id_from_str(token_raw, SRC, "tokenId")?,
            price: price.to_string(),
            maker: lower(event.maker.as_deref(), SRC, "maker", index)?,
            taker: lower(event.taker.as_deref(), SRC, "taker", index)?,
            transaction_hash: required(event.transaction_hash.as_deref(), SRC, "transactionHash", index)?
                .to_string(),
            block_number: Some(required(event.block_number, SRC, "blockNumber", index)?),
            timestamp: Some(required(event.timestamp, SRC, "timestamp", index)?),
            log_index: event.log_index,
        });
    }

    let dropped = events.len() - sales.len();
    if dropped > 0 {
        debug!(dropped, "skipped Defined transfer events");
    }
    Ok(sales)
}

pub fn normalize_transpose(rows: &[TransposeSale]) -> Result<Vec<Sale>, ReconError> {
    const SRC: Source = Source::Transpose;

    rows.iter()
        .enumerate()
        .map(|(index, row)| {
            let token = required(row.token_id.as_ref(), SRC, "token_id", index)?;
            let price = required(row.eth_price.as_ref(), SRC, "eth_price", index)?;

            Ok(Sale {
                source: SRC,
                contract_address: lower(row.contract_address.as_deref(), SRC, "contract_address", index)?,
                token_id: token_id_from_json(token, SRC, "token_id")?,
                price: price_from_json(price, SRC, "eth_price")?,
                maker: lower(row.seller.as_deref(), SRC, "seller", index)?,
                taker: lower(row.buyer.as_deref(), SRC, "buyer", index)?,
                transaction_hash: required(row.transaction_hash.as_deref(), SRC, "transaction_hash", index)?
                    .to_string(),
                block_number: Some(required(row.block_number, SRC, "block_number", index)?),
                timestamp: None,
                log_index: None,
            })
        })
        .collect()
}

pub fn normalize_reservoir(activities: &[ReservoirActivity]) -> Result<Vec<Sale>, ReconError> {
    const SRC: Source = Source::Reservoir;

    activities
        .iter()
        .enumerate()
        .map(|(index, activity)| {
            let token_raw = activity
                .token
                .as_ref()
                .and_then(|t| t.token_id.as_deref());
            let token_raw = required(token_raw, SRC, "token.tokenId", index)?;
            let price = required(activity.price.as_ref(), SRC, "price", index)?;

            Ok(Sale {
                source: SRC,
                contract_address: lower(activity.contract.as_deref(), SRC, "contract", index)?,
                token_id: token_id_from_str(token_raw, SRC, "token.tokenId")?,
                price: price_from_json(price, SRC, "price")?,
                maker: lower(activity.from_address.as_deref(), SRC, "fromAddress", index)?,
                taker: lower(activity.to_address.as_deref(), SRC, "toAddress", index)?,
                transaction_hash: required(activity.tx_hash.as_deref(), SRC, "txHash", index)?.to_string(),
                block_number: None,
                timestamp: Some(required(activity.timestamp, SRC, "timestamp", index)?),
                log_index: None,
            })
        })
        .collect()
}

// ── Field helpers ───────────────────────────────────────────────────

fn required<T>(value: Option<T>, source: Source, field: &'static str, index: usize) -> Result<T, ReconError> {
    value.ok_or(ReconError::MissingField {
        provider: source,
        field,
        index,
    })
}

fn lower(value: Option<&str>, source: Source, field: &'static str, index: usize) -> Result<String, ReconError> {
    required(value, source, field, index).map(|v| v.to_lowercase())
}

fn invalid(source: Source, field: &'static str, value: &str) -> ReconError {
    ReconError::InvalidNumber {
        provider: source,
        field,
        value: value.to_string(),
    }
}

fn token_id_from_str(raw: &str, source: Source, field: &'static str) -> Result<TokenId, ReconError> {
    TokenId::parse(raw.trim()).ok_or_else(|| invalid(source, field, raw))
}

fn token_id_from_json(value: &serde_json::Value, source: Source, field: &'static str) -> Result<TokenId, ReconError> {
    match value {
        serde_json::Value::Number(n) => token_id_from_str(&n.to_string(), source, field),
        serde_json::Value::String(s) => token_id_from_str(s, source, field),
        other => Err(invalid(source, field, &other.to_string())),
    }
}

fn price_from_json(value: &serde_json::Value, source: Source, field: &'static str) -> Result<String, ReconError> {
    decimal_from_json(value).ok_or_else(|| invalid(source, field, &value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raw::ReservoirToken;

    fn defined(token: &str, event_type: &str) -> DefinedEvent {
        DefinedEvent {
            contract_address: Some("0xAbC".into()),
            token_id: Some(token.into()),
            maker: Some("0xMAKER".into()),
            taker: Some("0xTaker".into()),
            individual_trade_price: Some("1.50".into()),
            event_type: Some(event_type.into()),
            block_number: Some(100),
            log_index: Some(7),
            transaction_hash: Some("0xDeadBeef".into()),
            timestamp: Some(1_700_000_000),
            ..Default::default()
        }
    }

    fn transpose(price: serde_json::Value) -> TransposeSale {
        TransposeSale {
            contract_address: Some("0xABC".into()),
            token_id: Some(serde_json::json!(5)),
            eth_price: Some(price),
            block_number: Some(100),
            seller: Some("0xSELLER".into()),
            buyer: Some("0xBUYER".into()),
            transaction_hash: Some("0xAbc".into()),
        }
    }

    fn reservoir(token: &str) -> ReservoirActivity {
        ReservoirActivity {
            kind: Some("sale".into()),
            from_address: Some("0xFROM".into()),
            to_address: Some("0xTO".into()),
            price: Some(serde_json::json!(2)),
            amount: Some(1),
            timestamp: Some(1_700_000_100),
            contract: Some("0xABC".into()),
            tx_hash: Some("0xFeed".into()),
            token: Some(ReservoirToken {
                token_id: Some(token.into()),
                token_name: None,
            }),
        }
    }

    #[test]
    fn defined_drops_transfers_and_lowercases() {
        let sales = normalize_defined(&[defined("1", "Sale"), defined("2", "Transfer")]).unwrap();
        assert_eq!(sales.len(), 1);
        let sale = &sales[0];
        assert_eq!(sale.source, Source::Defined);
        assert_eq!(sale.contract_address, "0xabc");
        assert_eq!(sale.maker, "0xmaker");
        assert_eq!(sale.taker, "0xtaker");
        assert_eq!(sale.transaction_hash, "0xDeadBeef");
        assert_eq!(sale.token_id, TokenId::from(1));
        assert_eq!(sale.price, "1.50");
        assert_eq!(sale.block_number, Some(100));
        assert_eq!(sale.timestamp, Some(1_700_000_000));
        assert_eq!(sale.log_index, Some(7));
    }

    #[test]
    fn defined_bad_token_id_is_parse_error() {
        let err = normalize_defined(&[defined("12abc", "Sale")]).unwrap_err();
        assert_eq!(
            err,
            ReconError::InvalidNumber {
                provider: Source::Defined,
                field: "tokenId",
                value: "12abc".into(),
            }
        );
    }

    #[test]
    fn defined_missing_block_is_schema_mismatch() {
        let mut event = defined("1", "Sale");
        event.block_number = None;
        let err = normalize_defined(&[defined("0", "Sale"), event]).unwrap_err();
        assert!(err.is_schema_mismatch());
        assert_eq!(
            err,
            ReconError::MissingField {
                provider: Source::Defined,
                field: "blockNumber",
                index: 1,
            }
        );
    }

    #[test]
    fn transpose_price_converted_exactly() {
        let price: serde_json::Value = serde_json::from_str("0.0123456789012345678901").unwrap();
        let sales = normalize_transpose(&[transpose(price)]).unwrap();
        assert_eq!(sales[0].price, "0.0123456789012345678901");
        assert_eq!(sales[0].maker, "0xseller");
        assert_eq!(sales[0].taker, "0xbuyer");
        assert_eq!(sales[0].token_id, TokenId::from(5));
        assert_eq!(sales[0].timestamp, None);
        assert_eq!(sales[0].block_number, Some(100));
    }

    #[test]
    fn transpose_non_numeric_price_rejected() {
        let err = normalize_transpose(&[transpose(serde_json::json!({"eth": 1}))]).unwrap_err();
        assert!(matches!(err, ReconError::InvalidNumber { field: "eth_price", .. }));
    }

    #[test]
    fn reservoir_parses_nested_token_id() {
        let sales = normalize_reservoir(&[reservoir("42")]).unwrap();
        assert_eq!(sales[0].token_id, TokenId::from(42));
        assert_eq!(sales[0].price, "2");
        assert_eq!(sales[0].block_number, None);
        assert_eq!(sales[0].timestamp, Some(1_700_000_100));
        assert_eq!(sales[0].transaction_hash, "0xFeed");
    }

    #[test]
    fn reservoir_missing_token_is_schema_mismatch() {
        let mut activity = reservoir("1");
        activity.token = None;
        let err = normalize_reservoir(&[activity]).unwrap_err();
        assert_eq!(
            err,
            ReconError::MissingField {
                provider: Source::Reservoir,
                field: "token.tokenId",
                index: 0,
            }
        );
    }
}
