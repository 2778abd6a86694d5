//! Bridge configuration.
//!
//! Every field has a default, so an empty object (or no config at all) yields
//! a working bridge that talks to `wss://admin.<host>/bridge`.

use std::time::Duration;

use bridge_protocol::admin_endpoint;
use serde::{Deserialize, Serialize};

/// Top-level configuration, read from JSON (camelCase keys).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BridgeConfig {
	/// Explicit socket URL. Derived from the page hostname when unset.
	pub endpoint: Option<String>,
	pub reconnect: ReconnectPolicy,
	pub actions: ActionConfig,
	/// Log filter directive for hosts that install a subscriber.
	pub log_level: String,
}

impl Default for BridgeConfig {
	fn default() -> Self {
		Self {
			endpoint: None,
			reconnect: ReconnectPolicy::default(),
			actions: ActionConfig::default(),
			log_level: "info".to_string(),
		}
	}
}

impl BridgeConfig {
	/// Socket URL to connect to for a page served from `hostname`.
	pub fn resolve_endpoint(&self, hostname: &str) -> String {
		self.endpoint
			.clone()
			.unwrap_or_else(|| admin_endpoint(hostname))
	}
}

/// Delay before reconnecting after the socket closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "camelCase")]
pub enum ReconnectPolicy {
	/// Same delay every time.
	#[serde(rename_all = "camelCase")]
	Fixed { delay_ms: u64 },
	/// Doubles per consecutive failure, capped at `max_ms`. Resets on a successful open.
	#[serde(rename_all = "camelCase")]
	Exponential { initial_ms: u64, max_ms: u64 },
}

impl Default for ReconnectPolicy {
	fn default() -> Self {
		ReconnectPolicy::Fixed { delay_ms: 3000 }
	}
}

impl ReconnectPolicy {
	/// Delay for the reconnect following `failures` consecutive unsuccessful
	/// connections (zero for the first reconnect after a healthy socket).
	pub fn delay(&self, failures: u32) -> Duration {
		match *self {
			ReconnectPolicy::Fixed { delay_ms } => Duration::from_millis(delay_ms),
			ReconnectPolicy::Exponential { initial_ms, max_ms } => {
				let factor = 1u64.checked_shl(failures.min(63)).unwrap_or(u64::MAX);
				Duration::from_millis(initial_ms.saturating_mul(factor).min(max_ms))
			}
		}
	}
}

/// Timing defaults for the action handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ActionConfig {
	/// Delay before `navigate` changes the location, so its result is sent first.
	pub navigate_delay_ms: u64,
	/// Per-character pause for `type` when the task gives none.
	pub type_delay_ms: u64,
	/// Deadline for `wait` on a selector when the task gives none.
	pub wait_timeout_ms: u64,
	/// Interval between selector checks in `wait`.
	pub wait_poll_ms: u64,
}

impl Default for ActionConfig {
	fn default() -> Self {
		Self {
			navigate_delay_ms: 50,
			type_delay_ms: 20,
			wait_timeout_ms: 10_000,
			wait_poll_ms: 100,
		}
	}
}
