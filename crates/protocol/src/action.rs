use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::coerce;

/// Untyped action as it arrives on the wire: a `type` name plus whatever
/// parameters sit beside it.
///
/// Kept untyped so an unrecognized name can fall through to the task's raw
/// `code` instead of failing the whole frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
	#[serde(rename = "type")]
	pub kind: String,
	#[serde(flatten)]
	pub params: Map<String, Value>,
}

impl ActionRequest {
	/// Parses into a typed [`Action`].
	///
	/// Returns `None` when [`kind`](Self::kind) is not a built-in action, and
	/// `Some(Err(_))` when it is but the parameters do not fit its shape.
	pub fn parse(&self) -> Option<Result<Action, serde_json::Error>> {
		if !Action::is_known(&self.kind) {
			return None;
		}
		let mut object = self.params.clone();
		object.insert("type".to_string(), Value::String(self.kind.clone()));
		Some(serde_json::from_value(Value::Object(object)))
	}
}

/// Built-in page actions.
///
/// [`Eval`](Self::Eval) runs arbitrary code with full page privileges. That is
/// the intended trust boundary: whoever controls the server controls the page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Action {
	/// Navigate the page after a short delay so the result frame leaves first.
	Navigate { url: String },
	/// Set an element's value and fire `input` and `change`.
	Fill {
		selector: String,
		#[serde(deserialize_with = "coerce::text")]
		value: String,
	},
	/// Invoke an element's click behavior.
	Click { selector: String },
	/// Append `text` one character at a time, firing `input` after each.
	Type {
		selector: String,
		text: String,
		/// Pause between characters in milliseconds. Zero means the default.
		#[serde(default, deserialize_with = "coerce::millis", skip_serializing_if = "Option::is_none")]
		delay: Option<u64>,
	},
	/// Wait for an element to appear, or for a fixed duration.
	Wait(WaitParams),
	/// Raw execution: evaluate `code` in the page.
	Eval { code: String },
	/// Read an element's text and value, plus inner markup when `html` is set.
	Get {
		selector: String,
		#[serde(default, deserialize_with = "coerce::truthy")]
		html: bool,
	},
}

/// Parameters for [`Action::Wait`].
///
/// `selector` takes precedence over `ms`. With neither, the wait completes
/// immediately and yields nothing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WaitParams {
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub selector: Option<String>,
	/// Give up on `selector` after this many milliseconds. Zero means the default.
	#[serde(default, deserialize_with = "coerce::millis", skip_serializing_if = "Option::is_none")]
	pub timeout: Option<u64>,
	/// Fractional durations are truncated to whole milliseconds.
	#[serde(default, deserialize_with = "coerce::millis", skip_serializing_if = "Option::is_none")]
	pub ms: Option<u64>,
}

impl Action {
	/// Wire names of every built-in action.
	pub const NAMES: [&'static str; 7] = ["navigate", "fill", "click", "type", "wait", "eval", "get"];

	pub fn is_known(name: &str) -> bool {
		Self::NAMES.contains(&name)
	}

	/// Wire name of this action.
	pub fn name(&self) -> &'static str {
		match self {
			Action::Navigate { .. } => "navigate",
			Action::Fill { .. } => "fill",
			Action::Click { .. } => "click",
			Action::Type { .. } => "type",
			Action::Wait(_) => "wait",
			Action::Eval { .. } => "eval",
			Action::Get { .. } => "get",
		}
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;

	fn request(value: Value) -> ActionRequest {
		serde_json::from_value(value).unwrap()
	}

	#[test]
	fn parses_fill() {
		let action = request(json!({"type": "fill", "selector": "#q", "value": "hello"}))
			.parse()
			.unwrap()
			.unwrap();
		assert_eq!(
			action,
			Action::Fill {
				selector: "#q".to_string(),
				value: "hello".to_string()
			}
		);
		assert_eq!(action.name(), "fill");
	}

	#[test]
	fn parses_wait_variants() {
		let by_selector = request(json!({"type": "wait", "selector": "#missing", "timeout": 200}))
			.parse()
			.unwrap()
			.unwrap();
		assert_eq!(
			by_selector,
			Action::Wait(WaitParams {
				selector: Some("#missing".to_string()),
				timeout: Some(200),
				ms: None,
			})
		);

		let by_ms = request(json!({"type": "wait", "ms": 100})).parse().unwrap().unwrap();
		assert_eq!(
			by_ms,
			Action::Wait(WaitParams {
				ms: Some(100),
				..WaitParams::default()
			})
		);
	}

	#[test]
	fn get_html_defaults_to_false() {
		let action = request(json!({"type": "get", "selector": "h1"})).parse().unwrap().unwrap();
		assert_eq!(
			action,
			Action::Get {
				selector: "h1".to_string(),
				html: false
			}
		);
	}

	#[test]
	fn loose_scalars_are_coerced() {
		let fill = request(json!({"type": "fill", "selector": "#n", "value": 3})).parse().unwrap().unwrap();
		assert_eq!(
			fill,
			Action::Fill {
				selector: "#n".to_string(),
				value: "3".to_string()
			}
		);

		let wait = request(json!({"type": "wait", "ms": 100.5})).parse().unwrap().unwrap();
		assert_eq!(
			wait,
			Action::Wait(WaitParams {
				ms: Some(100),
				..WaitParams::default()
			})
		);

		let typed = request(json!({"type": "type", "selector": "#t", "text": "hi", "delay": "15"}))
			.parse()
			.unwrap()
			.unwrap();
		assert!(matches!(typed, Action::Type { delay: Some(15), .. }));

		let get = request(json!({"type": "get", "selector": "h1", "html": 1})).parse().unwrap().unwrap();
		assert!(matches!(get, Action::Get { html: true, .. }));
	}

	#[test]
	fn unknown_name_is_not_parsed() {
		assert!(request(json!({"type": "scroll", "y": 100})).parse().is_none());
	}

	#[test]
	fn known_name_with_bad_params_is_an_error() {
		let parsed = request(json!({"type": "click"})).parse().unwrap();
		let err = parsed.unwrap_err();
		assert!(err.to_string().contains("selector"), "unexpected error: {err}");
	}

	#[test]
	fn every_name_is_known() {
		for name in Action::NAMES {
			assert!(Action::is_known(name));
		}
		assert!(!Action::is_known("Navigate"));
	}
}
