//! Reservoir: collection activity feed. No time filter upstream; the
//! recon pipeline clips the result to the run window.

use nftcheck_recon::raw::ReservoirActivity;
use tracing::info;

use crate::config::{Endpoint, RESERVOIR_API_URL};
use crate::CliError;

use super::common::{extract_message_error, records_at, FetchClient, HttpSettings};

pub struct ReservoirClient {
    client: FetchClient,
    api_key: String,
    url: String,
}

impl ReservoirClient {
    pub fn new(endpoint: &Endpoint, settings: HttpSettings) -> Result<Self, CliError> {
        let url = endpoint.require_url("Reservoir", RESERVOIR_API_URL)?.to_string();
        Ok(Self {
            client: FetchClient::new("Reservoir", settings, extract_message_error)?,
            api_key: endpoint.key.clone(),
            url,
        })
    }

    /// One page of recent sale activity for the `contract` collection.
    pub fn fetch_activities(&self, contract: &str) -> Result<Vec<ReservoirActivity>, CliError> {
        let body = self.client.request_with_retry(|http| {
            http.get(&self.url)
                .header("X-API-KEY", &self.api_key)
                .query(&[
                    ("collection", contract),
                    ("sortBy", "eventTimestamp"),
                    ("types", "sale"),
                ])
        })?;

        let activities: Vec<ReservoirActivity> = records_at(&self.client, body, "/activities")?;
        info!(count = activities.len(), "fetched Reservoir activities");
        Ok(activities)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exit_codes;
    use httpmock::prelude::*;
    use std::time::Duration;

    const CONTRACT: &str = "0xbc4ca0eda7647a8ab7c2061c2e118a18a936f13d";

    fn client_for(server: &MockServer, max_retries: u32) -> ReservoirClient {
        let endpoint = Endpoint {
            url: server.url("/collections/activity/v6"),
            key: "r-key".into(),
        };
        let settings = HttpSettings {
            timeout: Duration::from_secs(5),
            max_retries,
        };
        ReservoirClient::new(&endpoint, settings).unwrap()
    }

    #[test]
    fn test_fetch_activities_query_params() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/collections/activity/v6")
                .header("X-API-KEY", "r-key")
                .query_param("collection", CONTRACT)
                .query_param("sortBy", "eventTimestamp")
                .query_param("types", "sale");
            then.status(200).json_body(serde_json::json!({
                "activities": [{
                    "type": "sale",
                    "fromAddress": "0x1",
                    "toAddress": "0x2",
                    "price": 1.5,
                    "amount": 1,
                    "timestamp": 1700000100,
                    "contract": CONTRACT,
                    "txHash": "0xabc",
                    "token": { "tokenId": "5", "tokenName": "#5" }
                }],
                "continuation": null
            }));
        });

        let activities = client_for(&server, 0).fetch_activities(CONTRACT).unwrap();
        mock.assert();
        assert_eq!(activities.len(), 1);
        assert_eq!(activities[0].kind.as_deref(), Some("sale"));
        assert_eq!(
            activities[0].token.as_ref().and_then(|t| t.token_id.as_deref()),
            Some("5")
        );
    }

    #[test]
    fn test_upstream_error_after_retries_exit_54() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET);
            then.status(502);
        });

        let err = client_for(&server, 1).fetch_activities(CONTRACT).unwrap_err();
        mock.assert_calls(2);
        assert_eq!(err.code, exit_codes::EXIT_FETCH_UPSTREAM);
        assert!(err.message.contains("Reservoir upstream error after 2 attempts (502)"), "{}", err.message);
    }

    #[test]
    fn test_missing_activities_exit_54() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET);
            then.status(200).json_body(serde_json::json!({ "message": "ok" }));
        });

        let err = client_for(&server, 0).fetch_activities(CONTRACT).unwrap_err();
        assert_eq!(err.code, exit_codes::EXIT_FETCH_UPSTREAM);
        assert!(err.message.contains("missing '/activities' array"));
    }
}
