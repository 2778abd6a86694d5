use std::time::Duration;

use serde_json::json;
use tracing::info;

use crate::Result;
use crate::config::ActionConfig;
use crate::page::{Page, PageValue};

/// Schedules navigation to `url` and returns immediately, leaving time for
/// the result frame to go out before the page unloads.
pub fn navigate<P: Page>(page: &P, url: &str, config: &ActionConfig) -> Result<PageValue<P::Element>> {
	let delay = Duration::from_millis(config.navigate_delay_ms);
	info!(target = "bridge", url, delay_ms = config.navigate_delay_ms, "navigation scheduled");
	page.navigate_after(url, delay)?;
	Ok(json!({ "navigating": url }).into())
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::serialize;
	use crate::testing::{MemoryPage, Navigation};

	#[test]
	fn defers_navigation() {
		let page = MemoryPage::new();
		let result = navigate(&page, "https://example.com/next", &ActionConfig::default()).unwrap();

		assert_eq!(serialize(result), Some(json!({"navigating": "https://example.com/next"})));
		assert_eq!(
			page.navigations(),
			vec![Navigation {
				url: "https://example.com/next".to_string(),
				delay: Duration::from_millis(50),
			}]
		);
	}
}
