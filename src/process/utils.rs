use crate::process::raw_row::Value;
use once_cell::sync::Lazy;
use regex::Regex;

static NUMERIC_FIELD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*-?(\d+\.?|\.\d+|\d+\.\d+)([eE][-+]?\d+)?\s*$").unwrap());

static FLOAT_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").unwrap());

static INT_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[+-]?\d+").unwrap());

/// Type a raw field: numeric-looking text becomes a number, an empty field
/// becomes `Empty`, anything else stays text untouched.
pub fn infer_value(raw: &str) -> Value {
    if raw.is_empty() {
        return Value::Empty;
    }
    if NUMERIC_FIELD.is_match(raw) {
        if let Ok(n) = raw.trim().parse::<f64>() {
            if n.is_finite() {
                return Value::Number(n);
            }
        }
    }
    Value::Text(raw.to_string())
}

/// Float coercion used at every aggregation site. Text is read up to the
/// longest numeric prefix; anything unreadable counts as zero.
pub fn sales_or_zero(v: Option<&Value>) -> f64 {
    let n = match v {
        Some(Value::Number(n)) => *n,
        Some(Value::Text(s)) => float_prefix(s).unwrap_or(0.0),
        _ => 0.0,
    };
    if n.is_nan() {
        0.0
    } else {
        n
    }
}

/// Integer coercion: numbers truncate toward zero, text is read up to the
/// longest integer prefix, everything else is zero.
pub fn quantity_or_zero(v: Option<&Value>) -> i64 {
    match v {
        Some(Value::Number(n)) if n.is_finite() => n.trunc() as i64,
        Some(Value::Text(s)) => int_prefix(s).unwrap_or(0),
        _ => 0,
    }
}

fn float_prefix(s: &str) -> Option<f64> {
    FLOAT_PREFIX
        .find(s.trim_start())
        .and_then(|m| m.as_str().parse::<f64>().ok())
}

fn int_prefix(s: &str) -> Option<i64> {
    let m = INT_PREFIX.find(s.trim_start())?;
    let digits = m.as_str();
    // saturate instead of failing on absurdly long digit runs
    digits.parse::<i64>().ok().or_else(|| {
        if digits.starts_with('-') {
            Some(i64::MIN)
        } else {
            Some(i64::MAX)
        }
    })
}

/// String form used as a grouping key, matching how the value is displayed.
pub fn group_key(v: &Value) -> String {
    v.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn infers_numbers_and_text() {
        assert_eq!(infer_value("1200"), Value::Number(1200.0));
        assert_eq!(infer_value(" 12.5 "), Value::Number(12.5));
        assert_eq!(infer_value("-3e2"), Value::Number(-300.0));
        assert_eq!(infer_value(".5"), Value::Number(0.5));
        assert_eq!(infer_value("2023-01-15"), Value::text("2023-01-15"));
        assert_eq!(infer_value("1,200"), Value::text("1,200"));
        assert_eq!(infer_value("+5"), Value::text("+5"));
        assert_eq!(infer_value(""), Value::Empty);
        assert_eq!(infer_value("North"), Value::text("North"));
    }

    #[test]
    fn sales_coercion_reads_prefix_or_zero() {
        assert_eq!(sales_or_zero(Some(&Value::Number(950.0))), 950.0);
        assert_eq!(sales_or_zero(Some(&Value::text("1200"))), 1200.0);
        assert_eq!(sales_or_zero(Some(&Value::text("  12.5kg"))), 12.5);
        assert_eq!(sales_or_zero(Some(&Value::text("1,200"))), 1.0);
        assert_eq!(sales_or_zero(Some(&Value::text("$1200"))), 0.0);
        assert_eq!(sales_or_zero(Some(&Value::text("n/a"))), 0.0);
        assert_eq!(sales_or_zero(Some(&Value::Empty)), 0.0);
        assert_eq!(sales_or_zero(None), 0.0);
    }

    #[test]
    fn quantity_coercion_truncates() {
        assert_eq!(quantity_or_zero(Some(&Value::Number(24.0))), 24);
        assert_eq!(quantity_or_zero(Some(&Value::Number(24.9))), 24);
        assert_eq!(quantity_or_zero(Some(&Value::Number(-2.7))), -2);
        assert_eq!(quantity_or_zero(Some(&Value::text("19 units"))), 19);
        assert_eq!(quantity_or_zero(Some(&Value::text("7.8"))), 7);
        assert_eq!(quantity_or_zero(Some(&Value::text("many"))), 0);
        assert_eq!(quantity_or_zero(None), 0);
    }

    #[test]
    fn group_key_uses_display_form() {
        assert_eq!(group_key(&Value::Number(20230115.0)), "20230115");
        assert_eq!(group_key(&Value::text("2023-01-15")), "2023-01-15");
    }
}
