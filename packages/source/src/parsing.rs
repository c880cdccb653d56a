//! Shared coercion utilities for raw source payloads.
//!
//! County APIs disagree about types as much as they disagree about field
//! names: ZIP codes arrive as numbers, coordinates and areas as strings,
//! years as floats. These helpers coerce leniently but never produce a
//! non-finite number.

use crate::RawRecord;

/// Returns the first candidate field present (and non-null) in the record.
#[must_use]
pub fn lookup<'a>(
    raw: &'a RawRecord,
    candidates: &'a [String],
) -> Option<(&'a str, &'a serde_json::Value)> {
    let object = raw.as_object()?;
    candidates.iter().find_map(|name| {
        object
            .get(name)
            .filter(|v| !v.is_null())
            .map(|v| (name.as_str(), v))
    })
}

/// Coerces a JSON value to a trimmed, non-empty string.
///
/// Accepts strings and numbers (ZIP codes are often numeric in source
/// payloads). Returns `None` for empty strings and non-scalar values.
#[must_use]
pub fn coerce_string(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        serde_json::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Coerces a JSON value to a finite `f64`.
///
/// Accepts numbers and numeric strings. Returns `None` for anything else,
/// including NaN/∞ produced by malformed input.
#[must_use]
pub fn coerce_f64(value: &serde_json::Value) -> Option<f64> {
    let parsed = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    parsed.is_finite().then_some(parsed)
}

/// Coerces a JSON value to an `i64`.
///
/// Accepts integers, integral floats (`ArcGIS` reports years as `1987.0`),
/// and numeric strings.
#[must_use]
pub fn coerce_i64(value: &serde_json::Value) -> Option<i64> {
    match value {
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                return Some(i);
            }
            let f = n.as_f64()?;
            if f.is_finite() && f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
                #[allow(clippy::cast_possible_truncation)]
                return Some(f as i64);
            }
            None
        }
        serde_json::Value::String(s) => {
            let trimmed = s.trim();
            if let Ok(i) = trimmed.parse::<i64>() {
                return Some(i);
            }
            let f = trimmed.parse::<f64>().ok()?;
            if f.is_finite() && f.fract() == 0.0 && f.abs() < 9_007_199_254_740_992.0 {
                #[allow(clippy::cast_possible_truncation)]
                return Some(f as i64);
            }
            None
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidates(names: &[&str]) -> Vec<String> {
        names.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn lookup_prefers_first_present_candidate() {
        let raw = json!({"zip": "60007", "zip_code": "99999"});
        let names = candidates(&["postal_code", "zip", "zip_code"]);
        let (name, value) = lookup(&raw, &names).unwrap();
        assert_eq!(name, "zip");
        assert_eq!(value, &json!("60007"));
    }

    #[test]
    fn lookup_skips_null_values() {
        let raw = json!({"lat": null, "latitude": 41.85});
        let names = candidates(&["lat", "latitude"]);
        let (name, _) = lookup(&raw, &names).unwrap();
        assert_eq!(name, "latitude");
    }

    #[test]
    fn coerces_numeric_zip_to_string() {
        assert_eq!(coerce_string(&json!(60007)), Some("60007".to_string()));
        assert_eq!(coerce_string(&json!("  60007 ")), Some("60007".to_string()));
        assert_eq!(coerce_string(&json!("   ")), None);
        assert_eq!(coerce_string(&json!(["60007"])), None);
    }

    #[test]
    fn coerces_numeric_strings() {
        assert_eq!(coerce_f64(&json!("50000.5")), Some(50_000.5));
        assert_eq!(coerce_f64(&json!(50_000)), Some(50_000.0));
        assert_eq!(coerce_f64(&json!("not a number")), None);
    }

    #[test]
    fn rejects_non_finite_numbers() {
        assert_eq!(coerce_f64(&json!("NaN")), None);
        assert_eq!(coerce_f64(&json!("inf")), None);
        assert_eq!(coerce_f64(&json!("-inf")), None);
    }

    #[test]
    fn coerces_years_from_floats_and_strings() {
        assert_eq!(coerce_i64(&json!(1987)), Some(1987));
        assert_eq!(coerce_i64(&json!(1987.0)), Some(1987));
        assert_eq!(coerce_i64(&json!("1987")), Some(1987));
        assert_eq!(coerce_i64(&json!("1987.0")), Some(1987));
        assert_eq!(coerce_i64(&json!(1987.5)), None);
        assert_eq!(coerce_i64(&json!("soon")), None);
    }
}
