use std::fmt;

use serde::Serialize;

use crate::model::{Reconciliation, Source};

/// Human-readable rendering of one [`Reconciliation`].
///
/// ```text
/// ============ Compare Defined & Transpose ============
/// 1 items missing from Defined:
///   token 7 tx 0x.. maker 0x.. taker 0x.. price 0.2 contract 0x.. block 101
/// Defined & Transpose mismatched sales (1):
///   [price] token 5 tx 0xabc
///     Defined:   token 5 tx 0xabc ... price 1.5 ...
///     Transpose: token 5 tx 0xabc ... price 1.4 ...
/// ```
pub struct PairReport<'a>(pub &'a Reconciliation);

impl fmt::Display for PairReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let r = self.0;
        writeln!(f, "============ Compare {} & {} ============", r.reference, r.other)?;

        if !r.missing_from_reference.is_empty() {
            writeln!(f, "{} items missing from {}:", r.missing_from_reference.len(), r.reference)?;
            for sale in &r.missing_from_reference {
                writeln!(f, "  {sale}")?;
            }
        }

        if !r.missing_from_other.is_empty() {
            writeln!(f, "{} items missing from {}:", r.missing_from_other.len(), r.other)?;
            for sale in &r.missing_from_other {
                writeln!(f, "  {sale}")?;
            }
        }

        if !r.mismatched.is_empty() {
            writeln!(f, "{} & {} mismatched sales ({}):", r.reference, r.other, r.mismatched.len())?;
            let width = r.reference.label().len().max(r.other.label().len()) + 1;
            for m in &r.mismatched {
                let fields: Vec<String> = m.fields.iter().map(|field| field.to_string()).collect();
                writeln!(
                    f,
                    "  [{}] token {} tx {}",
                    fields.join(", "),
                    m.reference.token_id,
                    m.reference.transaction_hash,
                )?;
                writeln!(f, "    {:<width$} {}", format!("{}:", r.reference), m.reference)?;
                writeln!(f, "    {:<width$} {}", format!("{}:", r.other), m.other)?;
            }
        }

        if r.is_clean() {
            writeln!(f, "No discrepancies found!")?;
        }
        Ok(())
    }
}

/// Discrepancy counts for one pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    pub reference: Source,
    pub other: Source,
    pub missing_from_reference: usize,
    pub missing_from_other: usize,
    pub mismatched: usize,
}

impl ReportSummary {
    pub fn total(&self) -> usize {
        self.missing_from_reference + self.missing_from_other + self.mismatched
    }
}

/// Compute discrepancy counts from a reconciliation.
pub fn summarize(r: &Reconciliation) -> ReportSummary {
    ReportSummary {
        reference: r.reference,
        other: r.other,
        missing_from_reference: r.missing_from_reference.len(),
        missing_from_other: r.missing_from_other.len(),
        mismatched: r.mismatched.len(),
    }
}

impl fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} vs {}: {} missing from {}, {} missing from {}, {} mismatched",
            self.reference,
            self.other,
            self.missing_from_reference,
            self.reference,
            self.missing_from_other,
            self.other,
            self.mismatched,
        )
    }
}
