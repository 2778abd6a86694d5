//! Form and pointer input: `fill`, `click`, `type`.

use std::time::Duration;

use serde_json::json;
use tracing::debug;

use super::{find, or_default};
use crate::config::ActionConfig;
use crate::page::{Element, Page, PageValue};
use crate::{Clock, Result};

/// Sets the element's value in one step and fires `input` then `change`,
/// so page listeners see the same events as a user edit.
pub fn fill<P: Page>(page: &P, selector: &str, value: &str) -> Result<PageValue<P::Element>> {
	let el = find(page, selector)?;
	el.set_value(value);
	el.dispatch_event("input");
	el.dispatch_event("change");
	Ok(json!({ "filled": selector, "value": value }).into())
}

pub fn click<P: Page>(page: &P, selector: &str) -> Result<PageValue<P::Element>> {
	let el = find(page, selector)?;
	el.click();
	Ok(json!({ "clicked": selector }).into())
}

/// Focuses the element and appends `text` one character at a time, firing
/// `input` after each and pausing `delay` ms in between.
pub async fn type_text<P, C>(
	page: &P,
	clock: &C,
	selector: &str,
	text: &str,
	delay: Option<u64>,
	config: &ActionConfig,
) -> Result<PageValue<P::Element>>
where
	P: Page,
	C: Clock,
{
	let el = find(page, selector)?;
	let pause = Duration::from_millis(or_default(delay, config.type_delay_ms));
	debug!(target = "bridge", selector, chars = text.chars().count(), delay_ms = pause.as_millis() as u64, "typing");

	el.focus();
	let mut typed = 0usize;
	for ch in text.chars() {
		let mut current = el.value().unwrap_or_default();
		current.push(ch);
		el.set_value(&current);
		el.dispatch_event("input");
		typed += 1;
		clock.sleep(pause).await;
	}
	Ok(json!({ "typed": format!("{typed} chars") }).into())
}

#[cfg(test)]
mod tests {
	use serde_json::json;

	use super::*;
	use crate::TokioClock;
	use crate::serialize;
	use crate::testing::MemoryPage;

	#[test]
	fn fill_sets_value_and_fires_events() {
		let page = MemoryPage::new();
		let input = page.append("input", &[("id", "q")], "");

		let result = serialize(fill(&page, "#q", "hello").unwrap());

		assert_eq!(result, Some(json!({"filled": "#q", "value": "hello"})));
		assert_eq!(input.value().as_deref(), Some("hello"));
		assert_eq!(input.events(), vec!["input", "change"]);
	}

	#[test]
	fn click_reports_selector() {
		let page = MemoryPage::new();
		let button = page.append("button", &[("class", "buy")], "Buy");

		let result = serialize(click(&page, ".buy").unwrap());

		assert_eq!(result, Some(json!({"clicked": ".buy"})));
		assert_eq!(button.click_count(), 1);
	}

	#[test]
	fn missing_element_names_selector() {
		let page = MemoryPage::new();
		let err = click(&page, "#absent").unwrap_err();
		assert_eq!(err.to_string(), "Element not found: #absent");
	}

	#[tokio::test(start_paused = true)]
	async fn type_appends_with_cadence() {
		let page = MemoryPage::new();
		let input = page.append("input", &[("id", "name"), ("value", ">")], "");
		let clock = TokioClock::new();
		let start = tokio::time::Instant::now();

		let result = type_text(&page, &clock, "#name", "abc", Some(30), &ActionConfig::default())
			.await
			.unwrap();

		assert_eq!(serialize(result), Some(json!({"typed": "3 chars"})));
		assert_eq!(input.value().as_deref(), Some(">abc"));
		assert_eq!(input.events(), vec!["input", "input", "input"]);
		assert!(input.is_focused());
		let elapsed = start.elapsed();
		assert!(elapsed >= Duration::from_millis(90) && elapsed < Duration::from_millis(100), "{elapsed:?}");
	}

	#[tokio::test(start_paused = true)]
	async fn type_zero_delay_uses_default() {
		let page = MemoryPage::new();
		page.append("textarea", &[("id", "t")], "");
		let clock = TokioClock::new();
		let start = tokio::time::Instant::now();

		type_text(&page, &clock, "#t", "hi", Some(0), &ActionConfig::default())
			.await
			.unwrap();

		let elapsed = start.elapsed();
		assert!(elapsed >= Duration::from_millis(40) && elapsed < Duration::from_millis(50), "{elapsed:?}");
	}
}
