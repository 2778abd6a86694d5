//! Lenient decoders for action parameters.
//!
//! Control servers are often scripts that send whatever JSON scalar is handy,
//! so parameters accept the same loose values a page script would.

use serde::Deserialize;
use serde::de::{Deserializer, Error};
use serde_json::{Number, Value};

/// A form value: strings as-is, numbers and booleans in their JS text form,
/// `null` as the empty string.
pub(crate) fn text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
	match Value::deserialize(deserializer)? {
		Value::String(s) => Ok(s),
		Value::Number(n) => Ok(number_text(&n)),
		Value::Bool(b) => Ok(b.to_string()),
		Value::Null => Ok(String::new()),
		other => Err(D::Error::custom(format!("expected a string or number, got {other}"))),
	}
}

/// Optional millisecond count. Fractions are truncated, negatives clamp to
/// zero and numeric strings are parsed.
pub(crate) fn millis<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<u64>, D::Error> {
	let ms = match Value::deserialize(deserializer)? {
		Value::Null => return Ok(None),
		Value::Number(n) => n.as_f64(),
		Value::String(s) => s.trim().parse::<f64>().ok(),
		_ => None,
	};
	match ms {
		Some(ms) if ms.is_finite() => Ok(Some(ms.max(0.0) as u64)),
		_ => Err(D::Error::custom("expected a number of milliseconds")),
	}
}

/// JS truthiness of any JSON value.
pub(crate) fn truthy<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
	Ok(match Value::deserialize(deserializer)? {
		Value::Null => false,
		Value::Bool(b) => b,
		Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
		Value::String(s) => !s.is_empty(),
		Value::Array(_) | Value::Object(_) => true,
	})
}

fn number_text(n: &Number) -> String {
	match n.as_f64() {
		Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
		_ => n.to_string(),
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	#[test]
	fn text_accepts_scalars() {
		assert_eq!(text(json!("a")).unwrap(), "a");
		assert_eq!(text(json!(3)).unwrap(), "3");
		assert_eq!(text(json!(2.0)).unwrap(), "2");
		assert_eq!(text(json!(2.5)).unwrap(), "2.5");
		assert_eq!(text(json!(true)).unwrap(), "true");
		assert_eq!(text(json!(null)).unwrap(), "");
		assert!(text(json!({"a": 1})).is_err());
	}

	#[test]
	fn millis_truncates_and_parses() {
		assert_eq!(millis(json!(100)).unwrap(), Some(100));
		assert_eq!(millis(json!(100.7)).unwrap(), Some(100));
		assert_eq!(millis(json!("250")).unwrap(), Some(250));
		assert_eq!(millis(json!(-5)).unwrap(), Some(0));
		assert_eq!(millis(json!(null)).unwrap(), None);
		assert!(millis(json!("soon")).is_err());
	}

	#[test]
	fn truthy_follows_js_rules() {
		assert!(truthy(json!(1)).unwrap());
		assert!(truthy(json!("yes")).unwrap());
		assert!(truthy(json!([])).unwrap());
		assert!(!truthy(json!(0)).unwrap());
		assert!(!truthy(json!("")).unwrap());
		assert!(!truthy(json!(null)).unwrap());
	}
}
