//! Defined: NFT events over GraphQL. The reference source of every run.

use nftcheck_recon::raw::DefinedEvent;
use nftcheck_recon::TimeWindow;
use tracing::info;

use crate::config::{Endpoint, DEFINED_API_URL};
use crate::exit_codes;
use crate::CliError;

use super::common::{records_at, FetchClient, HttpSettings};

// ── Constants ───────────────────────────────────────────────────────

/// Ethereum mainnet in Defined's network numbering.
const NETWORK_ID: u32 = 1;

const ITEMS_POINTER: &str = "/data/getNftEvents/items";

const EVENT_FIELDS: &str = "\
          id
          contractAddress
          networkId
          tokenId
          maker
          taker
          fillSource
          totalTradePrice
          individualTradePrice
          paymentTokenAddress
          eventType
          exchangeAddress
          blockNumber
          transactionIndex
          logIndex
          transactionHash
          timestamp
          numberOfTokens
          priceError";

// ── Query ───────────────────────────────────────────────────────────

/// GraphQL document for all events on `contract` inside `window`.
fn events_query(contract: &str, window: &TimeWindow) -> String {
    // A JSON string literal is also a valid GraphQL string literal.
    let address = serde_json::Value::String(contract.to_string());
    format!(
        "{{\n  getNftEvents(networkId: {NETWORK_ID}, address: {address}, timestamp: {{from: {}, to: {}}}) {{\n    items {{\n{EVENT_FIELDS}\n    }}\n    cursor\n  }}\n}}",
        window.from, window.to,
    )
}

/// GraphQL reports failures in a top-level `errors` array, often with 200.
fn extract_graphql_error(body: &serde_json::Value, status: u16) -> String {
    body["errors"][0]["message"]
        .as_str()
        .or_else(|| body["message"].as_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {status}"))
}

// ── Defined client ──────────────────────────────────────────────────

pub struct DefinedClient {
    client: FetchClient,
    api_key: String,
    url: String,
}

impl DefinedClient {
    pub fn new(endpoint: &Endpoint, settings: HttpSettings) -> Result<Self, CliError> {
        let url = endpoint.require_url("Defined", DEFINED_API_URL)?.to_string();
        Ok(Self {
            client: FetchClient::new("Defined", settings, extract_graphql_error)?,
            api_key: endpoint.key.clone(),
            url,
        })
    }

    /// All NFT events (sales and transfers) for `contract` in `window`.
    pub fn fetch_events(&self, contract: &str, window: &TimeWindow) -> Result<Vec<DefinedEvent>, CliError> {
        let request_body = serde_json::json!({ "query": events_query(contract, window) });

        let body = self.client.request_with_retry(|http| {
            http.post(&self.url)
                .header("x-api-key", &self.api_key)
                .json(&request_body)
        })?;

        if body.get("errors").is_some_and(|e| !e.is_null()) {
            return Err(self.client.fail(
                exit_codes::EXIT_FETCH_UPSTREAM,
                format!("query failed: {}", extract_graphql_error(&body, 200)),
            ));
        }

        let events: Vec<DefinedEvent> = records_at(&self.client, body, ITEMS_POINTER)?;
        info!(count = events.len(), from = window.from, to = window.to, "fetched Defined events");
        Ok(events)
    }
}
