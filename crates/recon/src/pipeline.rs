//! Staged reconciliation pipeline.
//!
//! Each source goes through normalize -> window filter -> canonical sort,
//! then Defined (the reference) is reconciled against the other two.
//! The stages are public because the caller needs the prepared Defined
//! list before it can query Transpose and Reservoir: its length is both
//! the Transpose `limit` and the Reservoir trim length.

use serde::Serialize;

use crate::error::ReconError;
use crate::model::{Reconciliation, Sale, Source};
use crate::normalize::{normalize_defined, normalize_reservoir, normalize_transpose};
use crate::raw::{DefinedEvent, ReservoirActivity, TransposeSale};
use crate::reconcile::reconcile;
use crate::report::{summarize, ReportSummary};
use crate::sort::sort_sales;
use crate::window::{clip_to_reference, TimeWindow};

/// Raw payloads as returned by the three vendor APIs.
#[derive(Debug, Clone, Default)]
pub struct RawInputs {
    pub defined: Vec<DefinedEvent>,
    pub transpose: Vec<TransposeSale>,
    pub reservoir: Vec<ReservoirActivity>,
}

/// Normalized, window-consistent, sorted sales per source.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SourceSet {
    pub defined: Vec<Sale>,
    pub transpose: Vec<Sale>,
    pub reservoir: Vec<Sale>,
}

impl SourceSet {
    pub fn get(&self, source: Source) -> &[Sale] {
        match source {
            Source::Defined => &self.defined,
            Source::Transpose => &self.transpose,
            Source::Reservoir => &self.reservoir,
        }
    }

    /// Sources with no sales in this window, in [`Source::ALL`] order.
    pub fn empty_sources(&self) -> Vec<Source> {
        Source::ALL
            .into_iter()
            .filter(|s| self.get(*s).is_empty())
            .collect()
    }
}

/// Both pairwise results of a run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub summaries: Vec<ReportSummary>,
    pub pairs: Vec<Reconciliation>,
}

impl RunReport {
    pub fn discrepancy_count(&self) -> usize {
        self.summaries.iter().map(ReportSummary::total).sum()
    }
}

/// Defined is filtered server-side; normalize and sort only.
pub fn prepare_defined(events: &[DefinedEvent]) -> Result<Vec<Sale>, ReconError> {
    let mut sales = normalize_defined(events)?;
    sort_sales(&mut sales);
    Ok(sales)
}

/// Transpose is filtered server-side; normalize and sort only.
pub fn prepare_transpose(rows: &[TransposeSale]) -> Result<Vec<Sale>, ReconError> {
    let mut sales = normalize_transpose(rows)?;
    sort_sales(&mut sales);
    Ok(sales)
}

/// Reservoir has no time filter upstream: clip to the window and to the
/// most recent `reference_len` sales before sorting.
pub fn prepare_reservoir(
    activities: &[ReservoirActivity],
    window: &TimeWindow,
    reference_len: usize,
) -> Result<Vec<Sale>, ReconError> {
    let sales = normalize_reservoir(activities)?;
    let mut sales = clip_to_reference(sales, window, reference_len);
    sort_sales(&mut sales);
    Ok(sales)
}

/// Reconcile Defined against Transpose, then against Reservoir.
pub fn reconcile_all(sources: &SourceSet) -> RunReport {
    let pairs: Vec<Reconciliation> = [Source::Transpose, Source::Reservoir]
        .into_iter()
        .map(|other| reconcile(&sources.defined, Source::Defined, sources.get(other), other))
        .collect();

    RunReport {
        summaries: pairs.iter().map(summarize).collect(),
        pairs,
    }
}

/// Prepare all three sources from raw payloads.
pub fn prepare(inputs: &RawInputs, window: &TimeWindow) -> Result<SourceSet, ReconError> {
    let defined = prepare_defined(&inputs.defined)?;
    let transpose = prepare_transpose(&inputs.transpose)?;
    let reservoir = prepare_reservoir(&inputs.reservoir, window, defined.len())?;
    Ok(SourceSet {
        defined,
        transpose,
        reservoir,
    })
}

/// Whole pipeline. Identical inputs always give identical reports.
pub fn run(inputs: &RawInputs, window: &TimeWindow) -> Result<RunReport, ReconError> {
    Ok(reconcile_all(&prepare(inputs, window)?))
}
