// nftcheck - reconcile recent NFT sales across Defined, Transpose and Reservoir

mod config;
mod exit_codes;
mod fetch;
mod run;

use std::io::{self, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use config::{ApiConfig, RunOptions};
use exit_codes::{EXIT_ERROR, EXIT_SUCCESS, EXIT_USAGE};

#[derive(Parser)]
#[command(name = "nftcheck")]
#[command(about = "Reconcile recent NFT sales reported by Defined, Transpose and Reservoir")]
#[command(long_version = long_version())]
#[command(version)]
#[command(after_help = "\
Environment:
  DEFINED_API_URL, DEFINED_API_KEY        Defined GraphQL endpoint and key
  TRANSPOSE_API_URL, TRANSPOSE_API_KEY    Transpose sales endpoint and key
  RESERVOIR_API_URL, RESERVOIR_API_KEY    Reservoir activity endpoint and key
  A .env file in the working directory is loaded if present.

Examples:
  nftcheck 0xbc4ca0eda7647a8ab7c2061c2e118a18a936f13d
  nftcheck 0xbc4ca0eda7647a8ab7c2061c2e118a18a936f13d --json | jq '.summaries'
  DEBUG=1 nftcheck 0xbc4ca0eda7647a8ab7c2061c2e118a18a936f13d --lookback-mins 60")]
struct Cli {
    /// Collection contract address to reconcile
    contract: String,

    /// Print the prepared sale lists of all three sources and log at debug level.
    /// `DEBUG` is on unless empty, 0, false, no or off
    #[arg(long, env = "DEBUG", value_parser = clap::builder::FalseyValueParser::new())]
    debug: bool,

    /// Emit the report as JSON on stdout
    #[arg(long)]
    json: bool,

    /// How far back the window starts, in minutes
    #[arg(long, default_value_t = 120, value_parser = clap::value_parser!(u32).range(1..))]
    lookback_mins: u32,

    /// How long before now the window ends, in minutes
    #[arg(long, default_value_t = 5)]
    buffer_mins: u32,

    /// Per-request HTTP timeout, in seconds
    #[arg(long, default_value_t = 30, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: u64,

    /// Retries for rate-limited, failed or timed-out requests
    #[arg(long, default_value_t = 2)]
    max_retries: u32,

    /// Suppress the summary on stderr and log only errors
    #[arg(long, short = 'q')]
    quiet: bool,
}

impl Cli {
    fn into_options(self) -> RunOptions {
        let mut opts = RunOptions::new(self.contract);
        opts.lookback_secs = i64::from(self.lookback_mins) * 60;
        opts.buffer_secs = i64::from(self.buffer_mins) * 60;
        opts.timeout = std::time::Duration::from_secs(self.timeout_secs);
        opts.max_retries = self.max_retries;
        opts.debug = self.debug;
        opts.json = self.json;
        opts.quiet = self.quiet;
        opts
    }
}

fn long_version() -> &'static str {
    if cfg!(debug_assertions) {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("NFTCHECK_GIT_HASH"), ")",
            "\nbuild:   debug",
            "\ntarget:  ", env!("NFTCHECK_TARGET"),
        )
    } else {
        concat!(
            env!("CARGO_PKG_VERSION"),
            " (", env!("NFTCHECK_GIT_HASH"), ")",
            "\nbuild:   release",
            "\ntarget:  ", env!("NFTCHECK_TARGET"),
        )
    }
}

/// Logs go to stderr so they never mix with the report. `RUST_LOG` wins
/// over the flags.
fn init_logging(debug: bool, quiet: bool) {
    let default_level = if debug {
        "debug"
    } else if quiet {
        "error"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr).with_target(false))
        .init();
}

fn main() -> ExitCode {
    // Before parsing, so DEBUG from .env reaches clap.
    let env_file = config::load_env_file();

    let cli = Cli::parse();
    init_logging(cli.debug, cli.quiet);

    match &env_file {
        Ok(Some(path)) => tracing::debug!(path = %path.display(), "loaded .env"),
        Ok(None) => {}
        Err(e) => tracing::warn!("ignoring unreadable .env: {e}"),
    }

    let api = ApiConfig::from_env();
    let opts = cli.into_options();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = run::run(&api, &opts, chrono::Utc::now(), &mut out)
        .and_then(|_| out.flush().map_err(|e| CliError::io(format!("failed to flush stdout: {e}"))));

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(CliError { code, message, hint }) => {
            if !message.is_empty() {
                eprintln!("error: {}", message);
            }
            if let Some(hint) = hint {
                eprintln!("hint:  {}", hint);
            }
            ExitCode::from(code)
        }
    }
}

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn io(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_map_to_options() {
        let cli = Cli::try_parse_from(["nftcheck", "0xabc"]).unwrap();
        let opts = cli.into_options();
        assert_eq!(opts.contract, "0xabc");
        assert_eq!(opts.lookback_secs, 7200);
        assert_eq!(opts.buffer_secs, 300);
        assert_eq!(opts.timeout, std::time::Duration::from_secs(30));
        assert_eq!(opts.max_retries, 2);
        assert!(!opts.json);
    }

    #[test]
    fn test_flags_map_to_options() {
        let cli = Cli::try_parse_from([
            "nftcheck", "0xabc", "--json", "-q",
            "--lookback-mins", "60", "--buffer-mins", "1",
            "--timeout-secs", "10", "--max-retries", "0",
        ])
        .unwrap();
        let opts = cli.into_options();
        assert_eq!(opts.lookback_secs, 3600);
        assert_eq!(opts.buffer_secs, 60);
        assert_eq!(opts.timeout, std::time::Duration::from_secs(10));
        assert_eq!(opts.max_retries, 0);
        assert!(opts.json && opts.quiet);
    }

    #[test]
    fn test_missing_contract_is_usage_error() {
        let err = Cli::try_parse_from(["nftcheck"]).err().unwrap();
        assert_eq!(err.exit_code(), i32::from(EXIT_USAGE));
    }

    #[test]
    fn test_debug_flag_without_value() {
        let cli = Cli::try_parse_from(["nftcheck", "0xabc", "--debug"]).unwrap();
        assert!(cli.into_options().debug);
    }

    #[test]
    fn test_zero_lookback_rejected() {
        assert!(Cli::try_parse_from(["nftcheck", "0xabc", "--lookback-mins", "0"]).is_err());
    }
}
