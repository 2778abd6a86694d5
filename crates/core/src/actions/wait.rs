use std::time::Duration;

use bridge_protocol::WaitParams;
use serde_json::json;
use tracing::debug;

use super::or_default;
use crate::config::ActionConfig;
use crate::page::{Page, PageValue};
use crate::{Clock, Error, Result};

/// Waits for `params.selector` to match, polling until its deadline, or
/// sleeps for `params.ms` when no selector is given.
///
/// With neither (or `ms` of zero) it returns [`PageValue::Undefined`] at once.
pub async fn wait<P, C>(page: &P, clock: &C, params: &WaitParams, config: &ActionConfig) -> Result<PageValue<P::Element>>
where
	P: Page,
	C: Clock,
{
	if let Some(selector) = params.selector.as_deref() {
		let timeout = or_default(params.timeout, config.wait_timeout_ms);
		let poll = Duration::from_millis(config.wait_poll_ms);
		let start = clock.now_ms();

		while clock.now_ms().saturating_sub(start) < timeout {
			if page.query_selector(selector)?.is_some() {
				return Ok(json!({ "found": selector }).into());
			}
			clock.sleep(poll).await;
		}
		debug!(target = "bridge", selector, timeout_ms = timeout, "wait timed out");
		return Err(Error::WaitTimeout(selector.to_string()));
	}

	match params.ms.filter(|ms| *ms > 0) {
		Some(ms) => {
			clock.sleep(Duration::from_millis(ms)).await;
			Ok(json!({ "waited": ms }).into())
		}
		None => Ok(PageValue::Undefined),
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::TokioClock;
	use crate::serialize;
	use crate::testing::MemoryPage;

	fn by_selector(selector: &str, timeout: Option<u64>) -> WaitParams {
		WaitParams {
			selector: Some(selector.to_string()),
			timeout,
			ms: None,
		}
	}

	#[tokio::test(start_paused = true)]
	async fn finds_existing_element_immediately() {
		let page = MemoryPage::new();
		page.append("div", &[("id", "ready")], "");
		let start = tokio::time::Instant::now();

		let value = wait(&page, &TokioClock::new(), &by_selector("#ready", None), &ActionConfig::default())
			.await
			.unwrap();

		assert_eq!(serialize(value), Some(json!({"found": "#ready"})));
		assert_eq!(start.elapsed(), Duration::ZERO);
	}

	#[tokio::test(start_paused = true)]
	async fn finds_element_added_later() {
		let page = MemoryPage::new();
		let clock = TokioClock::new();
		let params = by_selector("#late", None);
		let config = ActionConfig::default();

		let add_later = async {
			tokio::time::sleep(Duration::from_millis(250)).await;
			page.append("div", &[("id", "late")], "");
		};
		let (value, ()) = tokio::join!(wait(&page, &clock, &params, &config), add_later);

		assert_eq!(serialize(value.unwrap()), Some(json!({"found": "#late"})));
		assert!(clock.now_ms() >= 250 && clock.now_ms() < 400, "found at {}ms", clock.now_ms());
	}

	#[tokio::test(start_paused = true)]
	async fn times_out_on_missing_selector() {
		let page = MemoryPage::new();
		let clock = TokioClock::new();

		let err = wait(&page, &clock, &by_selector("#missing", Some(200)), &ActionConfig::default())
			.await
			.unwrap_err();

		assert_eq!(err.to_string(), "Timeout waiting for: #missing");
		assert!(clock.now_ms() >= 200);
	}

	#[tokio::test(start_paused = true)]
	async fn fixed_duration_and_empty_wait() {
		let page = MemoryPage::new();
		let clock = TokioClock::new();
		let config = ActionConfig::default();

		let params = WaitParams {
			ms: Some(100),
			..WaitParams::default()
		};
		let value = wait(&page, &clock, &params, &config).await.unwrap();
		assert_eq!(serialize(value), Some(json!({"waited": 100})));
		assert!(clock.now_ms() >= 100);

		let value = wait(&page, &clock, &WaitParams::default(), &config).await.unwrap();
		assert_eq!(serialize(value), None);
	}
}
