use serde_json::Value;

use crate::page::{Element, PageValue};

/// Converts a raw [`PageValue`] into the JSON that goes on the wire.
///
/// One rule for every handler and for raw evaluation:
/// elements become their outer markup, lists are converted entry by entry,
/// `Undefined` drops the result field (or becomes `null` inside a list).
pub fn serialize<E: Element>(value: PageValue<E>) -> Option<Value> {
	match value {
		PageValue::Undefined => None,
		PageValue::Element(element) => Some(Value::String(element.outer_html())),
		PageValue::List(items) => Some(Value::Array(
			items
				.into_iter()
				.map(|item| serialize(item).unwrap_or(Value::Null))
				.collect(),
		)),
		PageValue::Json(json) => Some(json),
	}
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::testing::MemoryPage;

	#[test]
	fn element_becomes_outer_html() {
		let page = MemoryPage::new();
		let el = page.append("p", &[("id", "intro")], "Hi");
		assert_eq!(serialize(PageValue::Element(el)), Some(json!("<p id=\"intro\">Hi</p>")));
	}

	#[test]
	fn list_maps_elements_and_passes_other_entries() {
		let page = MemoryPage::new();
		let el = page.append("b", &[], "x");
		let value = PageValue::List(vec![
			PageValue::Element(el),
			PageValue::Json(json!(3)),
			PageValue::Undefined,
			PageValue::List(vec![PageValue::Json(json!("nested"))]),
		]);
		assert_eq!(serialize(value), Some(json!(["<b>x</b>", 3, null, ["nested"]])));
	}

	#[test]
	fn undefined_is_absent() {
		assert_eq!(serialize::<crate::testing::MemoryElement>(PageValue::Undefined), None);
	}
}
