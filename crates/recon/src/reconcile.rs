use crate::model::{CoverageField, Mismatch, MismatchField, Reconciliation, Sale, Source};

/// Reconcile one source against a reference source.
///
/// Full cross-comparison, O(n·m), no early exit. Every identity match is
/// compared, so duplicated trades on the other side surface as several
/// mismatch entries instead of being collapsed.
///
/// Other-source records with no match are only reported as missing from
/// the reference when they lie past the reference list's last record, on
/// the position field `other_source` reports (see
/// [`Source::coverage_field`]). Anything at or before that tail is assumed
/// to fall outside the reference query's window.
pub fn reconcile(
    reference: &[Sale],
    reference_source: Source,
    other: &[Sale],
    other_source: Source,
) -> Reconciliation {
    let mut missing_from_other = Vec::new();
    let mut mismatched = Vec::new();

    for ref_sale in reference {
        let key = ref_sale.identity();
        let mut found = false;

        for other_sale in other.iter().filter(|o| o.identity() == key) {
            found = true;
            let fields = differing_fields(ref_sale, other_sale);
            if !fields.is_empty() {
                mismatched.push(Mismatch {
                    reference: ref_sale.clone(),
                    other: other_sale.clone(),
                    fields,
                });
            }
        }

        if !found {
            missing_from_other.push(ref_sale.clone());
        }
    }

    let tail = reference.last();
    let missing_from_reference = other
        .iter()
        .filter(|o| {
            let key = o.identity();
            !reference.iter().any(|r| r.identity() == key)
        })
        .filter(|o| past_tail(o, tail, other_source.coverage_field()))
        .cloned()
        .collect();

    Reconciliation {
        reference: reference_source,
        other: other_source,
        missing_from_reference,
        missing_from_other,
        mismatched,
    }
}

/// Comparable fields that disagree. Block numbers only count when both
/// sides report one.
pub fn differing_fields(reference: &Sale, other: &Sale) -> Vec<MismatchField> {
    let mut fields = Vec::new();
    if reference.contract_address != other.contract_address {
        fields.push(MismatchField::ContractAddress);
    }
    if reference.price != other.price {
        fields.push(MismatchField::Price);
    }
    if let (Some(a), Some(b)) = (reference.block_number, other.block_number) {
        if a != b {
            fields.push(MismatchField::BlockNumber);
        }
    }
    fields
}

/// Strictly after the reference tail on `field`. Absent values on either
/// side, including an empty reference list, never count.
fn past_tail(sale: &Sale, tail: Option<&Sale>, field: CoverageField) -> bool {
    let Some(tail) = tail else {
        return false;
    };
    match field {
        CoverageField::BlockNumber => matches!(
            (sale.block_number, tail.block_number),
            (Some(block), Some(last)) if block > last
        ),
        CoverageField::Timestamp => matches!(
            (sale.timestamp, tail.timestamp),
            (Some(ts), Some(last)) if ts > last
        ),
    }
}
