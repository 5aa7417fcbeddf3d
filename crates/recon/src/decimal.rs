//! Canonical decimal strings, computed on digits (never through `f64`).
//!
//! Canonical form: optional `-`, integer part without leading zeros (`0`
//! when empty), fractional part without trailing zeros and omitted when
//! zero. Exponent notation is expanded positionally.

/// Exponents beyond this are rejected rather than expanded.
const MAX_EXPONENT: i64 = 400;

/// Canonicalize a decimal literal such as `"1.50"`, `"-0.0"` or `"2.5e-3"`.
///
/// Returns `None` for anything that is not a plain decimal number.
pub fn canonical_decimal(raw: &str) -> Option<String> {
    let s = raw.trim();
    let (negative, s) = match s.as_bytes().first()? {
        b'-' => (true, &s[1..]),
        b'+' => (false, &s[1..]),
        _ => (false, s),
    };

    let (mantissa, exponent) = match s.find(|c: char| c == 'e' || c == 'E') {
        Some(pos) => (&s[..pos], parse_exponent(&s[pos + 1..])?),
        None => (s, 0),
    };

    let (int_part, frac_part) = match mantissa.split_once('.') {
        Some((i, f)) => (i, f),
        None => (mantissa, ""),
    };
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }
    if !int_part.bytes().all(|b| b.is_ascii_digit()) || !frac_part.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let digits = format!("{int_part}{frac_part}");
    let point = int_part.len() as i64 + exponent;

    let (int_digits, frac_digits) = if point <= 0 {
        ("0".to_string(), format!("{}{}", "0".repeat(point.unsigned_abs() as usize), digits))
    } else if point as usize >= digits.len() {
        (format!("{}{}", digits, "0".repeat(point as usize - digits.len())), String::new())
    } else {
        let (i, f) = digits.split_at(point as usize);
        (i.to_string(), f.to_string())
    };

    let int_digits = match int_digits.trim_start_matches('0') {
        "" => "0",
        trimmed => trimmed,
    };
    let frac_digits = frac_digits.trim_end_matches('0');

    let mut out = String::with_capacity(int_digits.len() + frac_digits.len() + 2);
    let is_zero = int_digits == "0" && frac_digits.is_empty();
    if negative && !is_zero {
        out.push('-');
    }
    out.push_str(int_digits);
    if !frac_digits.is_empty() {
        out.push('.');
        out.push_str(frac_digits);
    }
    Some(out)
}

/// Canonicalize a JSON number (or numeric string) into a decimal string.
pub fn decimal_from_json(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Number(n) => canonical_decimal(&n.to_string()),
        serde_json::Value::String(s) => canonical_decimal(s),
        _ => None,
    }
}

fn parse_exponent(s: &str) -> Option<i64> {
    let digits = s.strip_prefix(|c: char| c == '+' || c == '-').unwrap_or(s);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let exp: i64 = s.parse().ok()?;
    (exp.abs() <= MAX_EXPONENT).then_some(exp)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_decimal() {
        assert_eq!(canonical_decimal("1.5").unwrap(), "1.5");
        assert_eq!(canonical_decimal("1.50").unwrap(), "1.5");
        assert_eq!(canonical_decimal("2.0").unwrap(), "2");
        assert_eq!(canonical_decimal("2.").unwrap(), "2");
        assert_eq!(canonical_decimal(".25").unwrap(), "0.25");
        assert_eq!(canonical_decimal("007.10").unwrap(), "7.1");
        assert_eq!(canonical_decimal("0").unwrap(), "0");
        assert_eq!(canonical_decimal("-0.000").unwrap(), "0");
        assert_eq!(canonical_decimal("-12.340").unwrap(), "-12.34");
        assert_eq!(canonical_decimal("  42  ").unwrap(), "42");
        assert_eq!(
            canonical_decimal("0.1000000000000000055511151231257827").unwrap(),
            "0.1000000000000000055511151231257827",
        );
    }

    #[test]
    fn test_canonical_decimal_exponent() {
        assert_eq!(canonical_decimal("1e-7").unwrap(), "0.0000001");
        assert_eq!(canonical_decimal("1.5E3").unwrap(), "1500");
        assert_eq!(canonical_decimal("12.5e-1").unwrap(), "1.25");
        assert_eq!(canonical_decimal("1e+21").unwrap(), "1000000000000000000000");
        assert_eq!(canonical_decimal("0e10").unwrap(), "0");
    }

    #[test]
    fn test_canonical_decimal_rejects() {
        assert!(canonical_decimal("").is_none());
        assert!(canonical_decimal("-").is_none());
        assert!(canonical_decimal(".").is_none());
        assert!(canonical_decimal("abc").is_none());
        assert!(canonical_decimal("1.2.3").is_none());
        assert!(canonical_decimal("1e").is_none());
        assert!(canonical_decimal("1e5000").is_none());
        assert!(canonical_decimal("0x1f").is_none());
        assert!(canonical_decimal("NaN").is_none());
    }

    #[test]
    fn test_decimal_from_json() {
        let n: serde_json::Value = serde_json::from_str("0.0300").unwrap();
        assert_eq!(decimal_from_json(&n).unwrap(), "0.03");
        assert_eq!(decimal_from_json(&serde_json::json!("7.50")).unwrap(), "7.5");
        assert!(decimal_from_json(&serde_json::Value::Null).is_none());
        assert!(decimal_from_json(&serde_json::json!(true)).is_none());
    }
}
