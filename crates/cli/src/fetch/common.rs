//! Shared infrastructure for the vendor fetchers.
//!
//! Each fetcher (defined, transpose, reservoir) reuses:
//! - `FetchClient`: HTTP client with timeout, retry / backoff and error
//!   classification into the fetch exit codes
//! - `records_at`: pull the record array out of a response body and
//!   deserialize it into the vendor's raw record type
//!
//! Fetchers own their endpoint, auth header and query shape. They never
//! interpret records; that is the recon crate's job.

use std::thread;
use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::exit_codes;
use crate::CliError;

// ── Constants ───────────────────────────────────────────────────────

pub(super) const USER_AGENT: &str = concat!("nftcheck/", env!("CARGO_PKG_VERSION"));

/// Characters of an unparsable body quoted in the error message.
const BODY_SNIPPET_CHARS: usize = 200;

// ── FetchClient ─────────────────────────────────────────────────────

/// Per-run HTTP settings shared by all fetchers.
#[derive(Debug, Clone, Copy)]
pub struct HttpSettings {
    pub timeout: Duration,
    pub max_retries: u32,
}

/// Shared HTTP client that handles retry, backoff, and error classification.
///
/// Fetchers pass a request-building closure to [`request_with_retry`]
/// which handles the retry loop and maps HTTP status codes to the standard
/// exit codes.
///
/// [`request_with_retry`]: FetchClient::request_with_retry
pub(super) struct FetchClient {
    pub(super) http: reqwest::blocking::Client,
    source_name: &'static str,
    max_retries: u32,
    error_extractor: fn(&serde_json::Value, u16) -> String,
}

impl FetchClient {
    pub(super) fn new(
        source_name: &'static str,
        settings: HttpSettings,
        error_extractor: fn(&serde_json::Value, u16) -> String,
    ) -> Result<Self, CliError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(settings.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| CliError {
                code: exit_codes::EXIT_ERROR,
                message: format!("failed to build HTTP client: {e}"),
                hint: None,
            })?;

        Ok(Self {
            http,
            source_name,
            max_retries: settings.max_retries,
            error_extractor,
        })
    }

    /// Send a request with retry + exponential backoff and parse the JSON
    /// body.
    ///
    /// `build_request` is called once per attempt. It receives the
    /// underlying `reqwest::blocking::Client` and must return a fully
    /// configured `RequestBuilder` (URL, auth, headers, query or body).
    pub(super) fn request_with_retry(
        &self,
        build_request: impl Fn(&reqwest::blocking::Client) -> reqwest::blocking::RequestBuilder,
    ) -> Result<serde_json::Value, CliError> {
        let mut backoff_secs = 1u64;
        let mut attempt = 0u32;

        loop {
            let result = build_request(&self.http).send();

            match result {
                Ok(resp) => {
                    let status = resp.status().as_u16();

                    // Auth errors: fail immediately
                    if status == 401 || status == 403 {
                        let msg = self.error_message(resp, status);
                        return Err(self.fail(
                            exit_codes::EXIT_FETCH_AUTH,
                            format!("auth failed ({status}): {msg}"),
                        )
                        .with_hint(format!(
                            "check {}_API_KEY",
                            self.source_name.to_uppercase()
                        )));
                    }

                    // Bad request: fail immediately
                    if status == 400 {
                        let msg = self.error_message(resp, status);
                        return Err(self.fail(
                            exit_codes::EXIT_FETCH_VALIDATION,
                            format!("request rejected ({status}): {msg}"),
                        ));
                    }

                    // Other 4xx (not 429): fail immediately
                    if (400..500).contains(&status) && status != 429 {
                        let msg = self.error_message(resp, status);
                        return Err(self.fail(
                            exit_codes::EXIT_FETCH_UPSTREAM,
                            format!("error ({status}): {msg}"),
                        ));
                    }

                    // Retryable: 429, 5xx
                    if status == 429 || status >= 500 {
                        let rate_limited = status == 429;
                        if attempt >= self.max_retries {
                            let (code, what) = if rate_limited {
                                (exit_codes::EXIT_FETCH_RATE_LIMIT, "rate limited")
                            } else {
                                (exit_codes::EXIT_FETCH_UPSTREAM, "upstream error")
                            };
                            return Err(self.fail(
                                code,
                                format!("{what} after {} attempts ({status})", attempt + 1),
                            ));
                        }

                        // Respect Retry-After header for 429
                        let wait = if rate_limited {
                            resp.headers()
                                .get(reqwest::header::RETRY_AFTER)
                                .and_then(|v| v.to_str().ok())
                                .and_then(|v| v.trim().parse::<u64>().ok())
                                .unwrap_or(backoff_secs)
                        } else {
                            backoff_secs
                        };

                        attempt += 1;
                        warn!(
                            source = self.source_name,
                            status,
                            "retry {}/{} in {}s",
                            attempt,
                            self.max_retries,
                            wait,
                        );
                        thread::sleep(Duration::from_secs(wait));
                        backoff_secs *= 2;
                        continue;
                    }

                    return self.parse_body(resp);
                }
                Err(e) => {
                    // Network/timeout errors: retry
                    if attempt >= self.max_retries {
                        let what = if e.is_timeout() { "timed out" } else { "request failed" };
                        return Err(self.fail(
                            exit_codes::EXIT_FETCH_UPSTREAM,
                            format!("{what} after {} attempts: {e}", attempt + 1),
                        ));
                    }

                    attempt += 1;
                    warn!(
                        source = self.source_name,
                        "retry {}/{} in {}s ({})",
                        attempt,
                        self.max_retries,
                        backoff_secs,
                        e,
                    );
                    thread::sleep(Duration::from_secs(backoff_secs));
                    backoff_secs *= 2;
                }
            }
        }
    }

    /// Read as text first: some gateways prefix a BOM.
    fn parse_body(&self, resp: reqwest::blocking::Response) -> Result<serde_json::Value, CliError> {
        let text = resp.text().map_err(|e| {
            self.fail(
                exit_codes::EXIT_FETCH_UPSTREAM,
                format!("failed to read response body: {e}"),
            )
        })?;
        let trimmed = text.trim_start_matches('\u{feff}');
        debug!(source = self.source_name, bytes = trimmed.len(), "response received");

        serde_json::from_str(trimmed).map_err(|e| {
            let snippet: String = trimmed.chars().take(BODY_SNIPPET_CHARS).collect();
            self.fail(
                exit_codes::EXIT_FETCH_UPSTREAM,
                format!("failed to parse JSON response: {e} (body: {snippet})"),
            )
        })
    }

    fn error_message(&self, resp: reqwest::blocking::Response, status: u16) -> String {
        let body: serde_json::Value = resp.json().unwrap_or(serde_json::Value::Null);
        (self.error_extractor)(&body, status)
    }

    pub(super) fn fail(&self, code: u8, detail: String) -> CliError {
        CliError {
            code,
            message: format!("{} {}", self.source_name, detail),
            hint: None,
        }
    }
}

// ── Response helpers ────────────────────────────────────────────────

/// Deserialize the array at `pointer` (RFC 6901) into vendor records.
///
/// A missing array is a malformed response. A record that does not fit the
/// vendor's record shape is a parse error.
pub(super) fn records_at<T: DeserializeOwned>(
    client: &FetchClient,
    mut body: serde_json::Value,
    pointer: &str,
) -> Result<Vec<T>, CliError> {
    let items = match body.pointer_mut(pointer) {
        Some(v) if v.is_array() => v.take(),
        _ => {
            return Err(client.fail(
                exit_codes::EXIT_FETCH_UPSTREAM,
                format!("response missing '{pointer}' array"),
            ))
        }
    };

    serde_json::from_value(items).map_err(|e| {
        client.fail(
            exit_codes::EXIT_PARSE_ERROR,
            format!("records at '{pointer}' have an unexpected shape: {e}"),
        )
    })
}

/// Common `{"message": ..}` / `{"error": ..}` error bodies.
pub(super) fn extract_message_error(body: &serde_json::Value, status: u16) -> String {
    body["message"]
        .as_str()
        .or_else(|| body["error"].as_str())
        .map(str::to_string)
        .unwrap_or_else(|| format!("HTTP {status}"))
}
