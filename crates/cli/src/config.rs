//! Run configuration.
//!
//! Vendor endpoints and keys come from the environment (optionally seeded
//! from a `.env` file); run parameters come from CLI flags. Both are plain
//! values built once in `main` and passed down.

use std::path::PathBuf;
use std::time::Duration;

use nftcheck_recon::window::{DEFAULT_LATENCY_BUFFER_SECS, DEFAULT_LOOKBACK_SECS};
use nftcheck_recon::TimeWindow;

use crate::exit_codes;
use crate::CliError;

// ── Vendor endpoints ────────────────────────────────────────────────

/// Base URL and API key for one vendor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Endpoint {
    pub url: String,
    pub key: String,
}

impl Endpoint {
    /// Fail with a usage error when no URL was configured. An empty key is
    /// left for the vendor to reject.
    pub fn require_url(&self, source: &str, env_var: &str) -> Result<&str, CliError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(CliError {
                code: exit_codes::EXIT_USAGE,
                message: format!("no {source} API URL configured"),
                hint: Some(format!("set {env_var} in the environment or .env")),
            });
        }
        Ok(url.trim_end_matches('/'))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ApiConfig {
    pub defined: Endpoint,
    pub transpose: Endpoint,
    pub reservoir: Endpoint,
}

pub const DEFINED_API_URL: &str = "DEFINED_API_URL";
pub const DEFINED_API_KEY: &str = "DEFINED_API_KEY";
pub const TRANSPOSE_API_URL: &str = "TRANSPOSE_API_URL";
pub const TRANSPOSE_API_KEY: &str = "TRANSPOSE_API_KEY";
pub const RESERVOIR_API_URL: &str = "RESERVOIR_API_URL";
pub const RESERVOIR_API_KEY: &str = "RESERVOIR_API_KEY";

impl ApiConfig {
    /// Load from the process environment. Call [`load_env_file`] first so
    /// `.env` values are visible.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Unset variables become
    /// empty strings.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |name: &str| lookup(name).unwrap_or_default();
        Self {
            defined: Endpoint {
                url: get(DEFINED_API_URL),
                key: get(DEFINED_API_KEY),
            },
            transpose: Endpoint {
                url: get(TRANSPOSE_API_URL),
                key: get(TRANSPOSE_API_KEY),
            },
            reservoir: Endpoint {
                url: get(RESERVOIR_API_URL),
                key: get(RESERVOIR_API_KEY),
            },
        }
    }
}

/// Apply `.env` from the working directory or its parents, if any.
/// Variables already set in the environment win over the file.
pub fn load_env_file() -> Result<Option<PathBuf>, dotenvy::Error> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

// ── Run options ─────────────────────────────────────────────────────

/// Parameters of one reconciliation run, from the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    pub contract: String,
    pub lookback_secs: i64,
    pub buffer_secs: i64,
    pub timeout: Duration,
    pub max_retries: u32,
    pub debug: bool,
    pub json: bool,
    pub quiet: bool,
}

impl RunOptions {
    pub fn new(contract: impl Into<String>) -> Self {
        Self {
            contract: contract.into(),
            lookback_secs: DEFAULT_LOOKBACK_SECS,
            buffer_secs: DEFAULT_LATENCY_BUFFER_SECS,
            timeout: Duration::from_secs(30),
            max_retries: 2,
            debug: false,
            json: false,
            quiet: false,
        }
    }

    /// Reject empty contracts and windows that end before they start.
    pub fn validate(&self) -> Result<(), CliError> {
        if self.contract.trim().is_empty() {
            return Err(CliError::usage("contract address must not be empty"));
        }
        if self.buffer_secs >= self.lookback_secs {
            return Err(CliError::usage(format!(
                "buffer ({}m) must be shorter than look-back ({}m)",
                self.buffer_secs / 60,
                self.lookback_secs / 60,
            ))
            .with_hint("lower --buffer-mins or raise --lookback-mins"));
        }
        Ok(())
    }

    /// The window ending `buffer` before `now`.
    pub fn window_at(&self, now: i64) -> TimeWindow {
        TimeWindow::ending_at(now, self.lookback_secs, self.buffer_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_from_lookup_missing_values_are_empty() {
        let vars: HashMap<&str, &str> = [
            (DEFINED_API_URL, "https://graph.example/graphql"),
            (DEFINED_API_KEY, "d-key"),
            (RESERVOIR_API_URL, "https://res.example/activity"),
        ]
        .into_iter()
        .collect();

        let cfg = ApiConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()));
        assert_eq!(cfg.defined.url, "https://graph.example/graphql");
        assert_eq!(cfg.defined.key, "d-key");
        assert_eq!(cfg.transpose, Endpoint::default());
        assert_eq!(cfg.reservoir.url, "https://res.example/activity");
        assert_eq!(cfg.reservoir.key, "");
    }

    #[test]
    fn test_require_url_trims_trailing_slash() {
        let ep = Endpoint {
            url: " https://api.example/v0/sales/ ".into(),
            key: String::new(),
        };
        assert_eq!(
            ep.require_url("Transpose", TRANSPOSE_API_URL).unwrap(),
            "https://api.example/v0/sales"
        );
    }

    #[test]
    fn test_require_url_empty_is_usage_error() {
        let err = Endpoint::default()
            .require_url("Reservoir", RESERVOIR_API_URL)
            .unwrap_err();
        assert_eq!(err.code, exit_codes::EXIT_USAGE);
        assert!(err.message.contains("Reservoir"));
        assert_eq!(err.hint.as_deref(), Some("set RESERVOIR_API_URL in the environment or .env"));
    }

    #[test]
    fn test_run_options_defaults_and_window() {
        let opts = RunOptions::new("0xabc");
        assert!(opts.validate().is_ok());
        assert_eq!(
            opts.window_at(1_700_010_000),
            TimeWindow {
                from: 1_700_002_800,
                to: 1_700_009_700,
            }
        );
    }

    #[test]
    fn test_run_options_rejects_inverted_window() {
        let mut opts = RunOptions::new("0xabc");
        opts.buffer_secs = opts.lookback_secs;
        let err = opts.validate().unwrap_err();
        assert_eq!(err.code, exit_codes::EXIT_USAGE);
        assert!(err.hint.is_some());

        let err = RunOptions::new("  ").validate().unwrap_err();
        assert!(err.message.contains("contract"));
    }
}
