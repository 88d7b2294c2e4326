use crate::data::datavalue::DataValue;
use std::cmp::Ordering;

/// Rank of each variant for cross-type comparisons
/// Order: Null < Boolean < Integer/Float < Text < Date < Time < DateTime
fn type_rank(value: &DataValue) -> u8 {
    match value {
        DataValue::Null => 0,
        DataValue::Boolean(_) => 1,
        DataValue::Integer(_) | DataValue::Float(_) => 2,
        DataValue::Text(_) => 3,
        DataValue::Date(_) => 4,
        DataValue::Time(_) => 5,
        DataValue::DateTime(_) => 6,
    }
}

/// Floats ordered with NaN after every number
fn compare_floats(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => a.partial_cmp(&b).unwrap_or(Ordering::Equal),
    }
}

/// Exact integer/float ordering, no rounding through `as f64`
fn compare_int_float(i: i64, f: f64) -> Ordering {
    // 2^63, the first float above i64::MAX
    const LIMIT: f64 = 9_223_372_036_854_775_808.0;

    if f.is_nan() || f >= LIMIT {
        return Ordering::Less;
    }
    if f < -LIMIT {
        return Ordering::Greater;
    }
    let whole = f.trunc();
    match i.cmp(&(whole as i64)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(f - whole)).unwrap_or(Ordering::Equal),
        unequal => unequal,
    }
}

/// Natural ordering of two cell values
///
/// Total over every pair of variants so it can drive a stable sort:
/// numbers compare by value across Integer/Float with NaN last,
/// mixed types fall back to the variant rank.
pub fn compare_datavalues(a: &DataValue, b: &DataValue) -> Ordering {
    match (a, b) {
        (DataValue::Integer(a), DataValue::Integer(b)) => a.cmp(b),
        (DataValue::Float(a), DataValue::Float(b)) => compare_floats(*a, *b),
        (DataValue::Integer(i), DataValue::Float(f)) => compare_int_float(*i, *f),
        (DataValue::Float(f), DataValue::Integer(i)) => compare_int_float(*i, *f).reverse(),
        (DataValue::Text(a), DataValue::Text(b)) => a.cmp(b),
        (DataValue::Boolean(a), DataValue::Boolean(b)) => a.cmp(b),
        (DataValue::Date(a), DataValue::Date(b)) => a.cmp(b),
        (DataValue::Time(a), DataValue::Time(b)) => a.cmp(b),
        (DataValue::DateTime(a), DataValue::DateTime(b)) => a.cmp(b),
        (DataValue::Null, DataValue::Null) => Ordering::Equal,
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

/// Compare optional values, a missing value sorts first
pub fn compare_optional_datavalues(a: Option<&DataValue>, b: Option<&DataValue>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(a), Some(b)) => compare_datavalues(a, b),
    }
}
