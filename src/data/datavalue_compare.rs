use crate::data::datatable::DataValue;
use std::cmp::Ordering;

/// Compare two DataValues by type. Text compares case-insensitively with a
/// case-sensitive tiebreak so the order is total and deterministic.
pub fn compare_datavalues(a: &DataValue, b: &DataValue) -> Ordering {
    match (a, b) {
        (DataValue::Integer(a), DataValue::Integer(b)) => a.cmp(b),

        // Total order, NaN included
        (DataValue::Float(a), DataValue::Float(b)) => a.total_cmp(b),

        // Compare actual numeric values, not types
        (DataValue::Integer(i), DataValue::Float(f)) => (*i as f64).total_cmp(f),
        (DataValue::Float(f), DataValue::Integer(i)) => f.total_cmp(&(*i as f64)),

        (DataValue::String(a), DataValue::String(b))
        | (DataValue::String(a), DataValue::DateTime(b))
        | (DataValue::DateTime(a), DataValue::String(b))
        | (DataValue::DateTime(a), DataValue::DateTime(b)) => compare_text(a, b),

        (DataValue::Boolean(a), DataValue::Boolean(b)) => a.cmp(b),

        (DataValue::Null, DataValue::Null) => Ordering::Equal,
        (DataValue::Null, _) => Ordering::Less,
        (_, DataValue::Null) => Ordering::Greater,

        // Cross-type comparisons keep a consistent ordering:
        // Boolean < numbers < text
        (a, b) => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &DataValue) -> u8 {
    match value {
        DataValue::Null => 0,
        DataValue::Boolean(_) => 1,
        DataValue::Integer(_) | DataValue::Float(_) => 2,
        DataValue::String(_) | DataValue::DateTime(_) => 3,
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Ordering used when sorting table rows. Missing and null values sort last
/// in both directions; only present values are reversed for descending.
pub fn compare_for_sort(a: Option<&DataValue>, b: Option<&DataValue>, ascending: bool) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());

    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(a), Some(b)) => {
            let cmp = compare_datavalues(a, b);
            if ascending {
                cmp
            } else {
                cmp.reverse()
            }
        }
    }
}
