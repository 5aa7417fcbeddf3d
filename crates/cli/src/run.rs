//! One reconciliation run: fetch -> prepare -> reconcile -> print.
//!
//! Defined is fetched and prepared first. Its sale count bounds both the
//! Transpose query (`limit`) and the Reservoir trim, so the order of the
//! three fetches is fixed.

use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;

use nftcheck_recon::pipeline::{self, RunReport, SourceSet};
use nftcheck_recon::{PairReport, ReconError, Reconciliation, ReportSummary, Sale, Source, TimeWindow};

use crate::config::{ApiConfig, RunOptions};
use crate::exit_codes;
use crate::fetch::{DefinedClient, HttpSettings, ReservoirClient, TransposeClient};
use crate::CliError;

// ── JSON output ─────────────────────────────────────────────────────

#[derive(Serialize)]
struct JsonMeta<'a> {
    contract: &'a str,
    window: TimeWindow,
    run_at: String,
    engine_version: &'static str,
}

#[derive(Serialize)]
struct JsonOutput<'a> {
    meta: JsonMeta<'a>,
    empty_sources: Vec<Source>,
    summaries: &'a [ReportSummary],
    pairs: &'a [Reconciliation],
    #[serde(skip_serializing_if = "Option::is_none")]
    sources: Option<&'a SourceSet>,
}

// ── Error mapping ───────────────────────────────────────────────────

impl From<ReconError> for CliError {
    fn from(err: ReconError) -> Self {
        let hint = err
            .is_schema_mismatch()
            .then(|| format!("the {} response format may have changed", err.provider()));
        CliError {
            code: exit_codes::EXIT_PARSE_ERROR,
            message: err.to_string(),
            hint,
        }
    }
}

fn write_err(e: std::io::Error) -> CliError {
    CliError::io(format!("failed to write report: {e}"))
}

// ── Run ─────────────────────────────────────────────────────────────

/// Fetch all three sources and prepare them for reconciliation.
pub fn collect(api: &ApiConfig, opts: &RunOptions, window: &TimeWindow) -> Result<SourceSet, CliError> {
    let settings = HttpSettings {
        timeout: opts.timeout,
        max_retries: opts.max_retries,
    };
    let defined_client = DefinedClient::new(&api.defined, settings)?;
    let transpose_client = TransposeClient::new(&api.transpose, settings)?;
    let reservoir_client = ReservoirClient::new(&api.reservoir, settings)?;

    let contract = opts.contract.trim();

    let events = defined_client.fetch_events(contract, window)?;
    let defined = pipeline::prepare_defined(&events)?;

    let rows = transpose_client.fetch_sales(contract, defined.len(), window)?;
    let transpose = pipeline::prepare_transpose(&rows)?;

    let activities = reservoir_client.fetch_activities(contract)?;
    let reservoir = pipeline::prepare_reservoir(&activities, window, defined.len())?;

    info!(
        defined = defined.len(),
        transpose = transpose.len(),
        reservoir = reservoir.len(),
        "sources prepared"
    );

    Ok(SourceSet {
        defined,
        transpose,
        reservoir,
    })
}

/// Run one reconciliation for the window ending at `now` and write the
/// report to `out`. Discrepancies are not an error.
pub fn run(api: &ApiConfig, opts: &RunOptions, now: DateTime<Utc>, out: &mut impl Write) -> Result<RunReport, CliError> {
    opts.validate()?;
    let window = opts.window_at(now.timestamp());
    info!(contract = %opts.contract, from = window.from, to = window.to, "starting run");

    let sources = collect(api, opts, &window)?;
    let report = pipeline::reconcile_all(&sources);

    if opts.json {
        let output = JsonOutput {
            meta: JsonMeta {
                contract: opts.contract.trim(),
                window,
                run_at: now.to_rfc3339(),
                engine_version: env!("CARGO_PKG_VERSION"),
            },
            empty_sources: sources.empty_sources(),
            summaries: &report.summaries,
            pairs: &report.pairs,
            sources: opts.debug.then_some(&sources),
        };
        serde_json::to_writer_pretty(&mut *out, &output)
            .map_err(|e| CliError::io(format!("failed to write JSON report: {e}")))?;
        writeln!(out).map_err(write_err)?;
    } else {
        write_text(&sources, &report, opts.debug, &mut *out).map_err(write_err)?;
    }

    if !opts.quiet {
        for summary in &report.summaries {
            eprintln!("{summary}");
        }
    }

    Ok(report)
}

fn write_text(sources: &SourceSet, report: &RunReport, debug: bool, out: &mut impl Write) -> std::io::Result<()> {
    if debug {
        for source in Source::ALL {
            write_sales(&mut *out, source, sources.get(source))?;
        }
    }

    for source in sources.empty_sources() {
        writeln!(out, "No sales found for {source} in this time period.")?;
    }

    for pair in &report.pairs {
        write!(out, "{}", PairReport(pair))?;
    }
    Ok(())
}

fn write_sales(out: &mut impl Write, source: Source, sales: &[Sale]) -> std::io::Result<()> {
    writeln!(out, "{source} sales ({}):", sales.len())?;
    for sale in sales {
        writeln!(out, "  {sale}")?;
    }
    Ok(())
}
