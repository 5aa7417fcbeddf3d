//! Transpose: NFT sales by contract, bounded by time and row count.

use nftcheck_recon::raw::TransposeSale;
use nftcheck_recon::TimeWindow;
use tracing::{debug, info};

use crate::config::{Endpoint, TRANSPOSE_API_URL};
use crate::CliError;

use super::common::{extract_message_error, records_at, FetchClient, HttpSettings};

const CHAIN_ID: &str = "ethereum";

pub struct TransposeClient {
    client: FetchClient,
    api_key: String,
    url: String,
}

impl TransposeClient {
    pub fn new(endpoint: &Endpoint, settings: HttpSettings) -> Result<Self, CliError> {
        let url = endpoint.require_url("Transpose", TRANSPOSE_API_URL)?.to_string();
        Ok(Self {
            client: FetchClient::new("Transpose", settings, extract_message_error)?,
            api_key: endpoint.key.clone(),
            url,
        })
    }

    /// Newest-first sales on `contract` inside `window`, at most `limit`.
    ///
    /// The API rejects `limit=0`, so an empty reference skips the request.
    pub fn fetch_sales(
        &self,
        contract: &str,
        limit: usize,
        window: &TimeWindow,
    ) -> Result<Vec<TransposeSale>, CliError> {
        if limit == 0 {
            debug!("reference is empty, skipping Transpose request");
            return Ok(Vec::new());
        }

        let limit = limit.to_string();
        let sold_after = window.from.to_string();
        let sold_before = window.to.to_string();

        let body = self.client.request_with_retry(|http| {
            http.get(&self.url)
                .header("X-API-KEY", &self.api_key)
                .query(&[
                    ("chain_id", CHAIN_ID),
                    ("contract_address", contract),
                    ("order", "desc"),
                    ("limit", limit.as_str()),
                    ("sold_after", sold_after.as_str()),
                    ("sold_before", sold_before.as_str()),
                ])
        })?;

        let sales: Vec<TransposeSale> = records_at(&self.client, body, "/results")?;
        info!(count = sales.len(), limit = %limit, "fetched Transpose sales");
        Ok(sales)
    }
}
