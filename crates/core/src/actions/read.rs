//! Reading from the page: `get` and raw `eval`.

use serde_json::{Map, Value};

use super::find;
use crate::Result;
use crate::page::{Element, Page, PageValue};

/// Returns the element's rendered text and form value, plus its inner markup
/// when `html` is set. `value` is omitted for elements that have none.
pub fn get<P: Page>(page: &P, selector: &str, html: bool) -> Result<PageValue<P::Element>> {
	let el = find(page, selector)?;

	let mut out = Map::new();
	out.insert("text".to_string(), Value::String(el.inner_text()));
	if let Some(value) = el.value() {
		out.insert("value".to_string(), Value::String(value));
	}
	if html {
		out.insert("html".to_string(), Value::String(el.inner_html()));
	}
	Ok(PageValue::Json(Value::Object(out)))
}

/// Raw execution of `code` in page context.
pub async fn eval<P: Page>(page: &P, code: &str) -> Result<PageValue<P::Element>> {
	page.evaluate(code).await
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::Error;
	use crate::serialize;
	use crate::testing::MemoryPage;

	#[test]
	fn get_reads_text_and_value() {
		let page = MemoryPage::new();
		page.append("input", &[("id", "email"), ("value", "a@b.c")], "");
		page.append("h1", &[], "Checkout");

		let input = serialize(get(&page, "#email", false).unwrap());
		assert_eq!(input, Some(json!({"text": "", "value": "a@b.c"})));

		let heading = serialize(get(&page, "h1", true).unwrap());
		assert_eq!(heading, Some(json!({"text": "Checkout", "html": "Checkout"})));
	}

	#[test]
	fn get_missing_element_fails() {
		let page = MemoryPage::new();
		let err = get(&page, "#nope", false).unwrap_err();
		assert_eq!(err.to_string(), "Element not found: #nope");
	}

	#[tokio::test]
	async fn eval_surfaces_thrown_message() {
		let page = MemoryPage::new();
		let err = eval(&page, "throw new Error('boom')").await.unwrap_err();
		assert!(matches!(err, Error::Script(ref msg) if msg == "boom"));
		assert_eq!(err.to_string(), "boom");
	}

	#[tokio::test]
	async fn eval_returns_registered_script_value() {
		let page = MemoryPage::new();
		page.register_script("document.title", |_| Ok(json!("Shop").into()));

		let value = serialize(eval(&page, "document.title").await.unwrap());
		assert_eq!(value, Some(json!("Shop")));
	}
}
