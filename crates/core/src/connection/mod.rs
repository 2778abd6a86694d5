//! Socket lifecycle for one page.
//!
//! [`ConnectionManager`] is a sans-IO state machine. Drivers report what the
//! socket did (`opened`, `receive`, `closed`, ...) and carry out the returned
//! [`Directive`]s: open a socket, send a frame, arm or cancel the reconnect
//! timer. The same machine backs the browser driver and [`crate::native`].
//!
//! ```text
//! Disconnected --connect--> Connecting --opened--> Open
//!      ^                        |                    |
//!      |                   open_failed          errored / closed
//!      |                        |                    v
//!      +----- reconnect timer --+------------ Error / Disconnected
//! ```
//!
//! At most one reconnect timer is pending at any time. A close always
//! replaces it, so the manager never gives up and never stacks attempts.


use std::time::Duration;

use bridge_protocol::{ClientId, ClientMessage, ServerMessage, Task, TaskOutcome};
use tracing::{debug, info, warn};

use crate::Error;
use crate::config::ReconnectPolicy;

/// Lifecycle state of the bridge socket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
	Disconnected,
	Connecting,
	Open,
	/// Transport reported an error; a close is expected to follow.
	Error,
}

/// Identifies one armed reconnect timer so stale firings can be ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

/// Side effect the driver must perform, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
	/// Create a socket to `url` and report back via `opened` / `open_failed`.
	Open { url: String },
	/// Send a text frame on the current socket.
	Send(String),
	/// Arm a timer that calls [`ConnectionManager::reconnect_fired`] after `delay`.
	ScheduleReconnect { timer: TimerId, delay: Duration },
	/// Disarm a previously scheduled timer.
	CancelReconnect(TimerId),
}

/// Owns the connection bookkeeping for a page: state, assigned client id and
/// the pending reconnect timer.
#[derive(Debug)]
pub struct ConnectionManager {
	endpoint: String,
	policy: ReconnectPolicy,
	state: ConnectionState,
	client_id: Option<ClientId>,
	reconnect: Option<TimerId>,
	next_timer: u64,
	/// Consecutive connection attempts that never reached `Open`.
	failures: u32,
}

impl ConnectionManager {
	pub fn new(endpoint: impl Into<String>, policy: ReconnectPolicy) -> Self {
		Self {
			endpoint: endpoint.into(),
			policy,
			state: ConnectionState::Disconnected,
			client_id: None,
			reconnect: None,
			next_timer: 0,
			failures: 0,
		}
	}

	pub fn endpoint(&self) -> &str {
		&self.endpoint
	}

	pub fn state(&self) -> ConnectionState {
		self.state
	}

	/// Identifier from the most recent `welcome`, kept for diagnostics.
	pub fn client_id(&self) -> Option<&ClientId> {
		self.client_id.as_ref()
	}

	pub fn reconnect_pending(&self) -> bool {
		self.reconnect.is_some()
	}

	/// Starts a connection attempt.
	///
	/// No-op while a socket is open or still connecting.
	pub fn connect(&mut self) -> Vec<Directive> {
		if matches!(self.state, ConnectionState::Open | ConnectionState::Connecting) {
			debug!(target = "bridge", state = ?self.state, "connect ignored");
			return Vec::new();
		}

		let mut directives = Vec::new();
		if let Some(timer) = self.reconnect.take() {
			directives.push(Directive::CancelReconnect(timer));
		}
		self.state = ConnectionState::Connecting;
		debug!(target = "bridge", url = %self.endpoint, "connecting");
		directives.push(Directive::Open {
			url: self.endpoint.clone(),
		});
		directives
	}

	/// The socket could not be created. Treated like a close.
	pub fn open_failed(&mut self, error: &str) -> Vec<Directive> {
		warn!(target = "bridge", url = %self.endpoint, error, "connection error");
		self.failures = self.failures.saturating_add(1);
		self.state = ConnectionState::Disconnected;
		self.schedule_reconnect()
	}

	/// The socket opened: send `hello` with the current page URL.
	pub fn opened(&mut self, page_url: &str) -> Vec<Directive> {
		info!(target = "bridge", url = %self.endpoint, "connected");
		self.state = ConnectionState::Open;
		self.failures = 0;

		let hello = ClientMessage::Hello {
			url: page_url.to_string(),
		};
		encode(&hello).map(Directive::Send).into_iter().collect()
	}

	/// Handles an inbound text frame.
	///
	/// Bookkeeping messages are consumed here; a task is handed back for the
	/// executor. Malformed frames are logged and dropped: without a parsed
	/// task id there is nothing to answer.
	pub fn receive(&mut self, frame: &str) -> Option<Task> {
		match serde_json::from_str::<ServerMessage>(frame) {
			Ok(ServerMessage::Welcome { client_id }) => {
				info!(target = "bridge", client_id = %client_id, "assigned client id");
				self.client_id = Some(client_id);
				None
			}
			Ok(ServerMessage::Task(task)) => {
				debug!(target = "bridge", task_id = %task.task_id, "task received");
				Some(task)
			}
			Ok(ServerMessage::Unknown) => {
				debug!(target = "bridge", frame, "ignoring unknown message type");
				None
			}
			Err(err) => {
				warn!(target = "bridge", error = %err, "message error");
				None
			}
		}
	}

	/// Sends a finished task's result over the socket that is open now.
	///
	/// If the connection dropped while the task ran, the result is lost.
	pub fn complete(&mut self, outcome: TaskOutcome) -> Vec<Directive> {
		if self.state != ConnectionState::Open {
			warn!(
				target = "bridge",
				task_id = %outcome.task_id,
				state = ?self.state,
				"dropping result, connection not open"
			);
			return Vec::new();
		}
		encode(&ClientMessage::Result(outcome))
			.map(Directive::Send)
			.into_iter()
			.collect()
	}

	/// The transport reported an error. Reconnect waits for the close that follows.
	pub fn errored(&mut self, message: &str) {
		warn!(target = "bridge", error = message, "socket error");
		if self.state == ConnectionState::Connecting {
			self.failures = self.failures.saturating_add(1);
		}
		self.state = ConnectionState::Error;
	}

	/// The socket closed for any reason: schedule exactly one reconnect.
	pub fn closed(&mut self, reason: &str) -> Vec<Directive> {
		if self.state == ConnectionState::Connecting {
			self.failures = self.failures.saturating_add(1);
		}
		self.state = ConnectionState::Disconnected;
		let directives = self.schedule_reconnect();
		info!(target = "bridge", reason, delay_ms = self.current_delay().as_millis() as u64, "disconnected, reconnecting");
		directives
	}

	/// A reconnect timer fired. Timers that were cancelled or replaced are ignored.
	pub fn reconnect_fired(&mut self, timer: TimerId) -> Vec<Directive> {
		if self.reconnect != Some(timer) {
			debug!(target = "bridge", ?timer, "stale reconnect timer");
			return Vec::new();
		}
		self.reconnect = None;
		self.connect()
	}

	fn current_delay(&self) -> Duration {
		self.policy.delay(self.failures.saturating_sub(1))
	}

	fn schedule_reconnect(&mut self) -> Vec<Directive> {
		let mut directives = Vec::new();
		if let Some(previous) = self.reconnect.take() {
			directives.push(Directive::CancelReconnect(previous));
		}
		let timer = TimerId(self.next_timer);
		self.next_timer += 1;
		self.reconnect = Some(timer);
		directives.push(Directive::ScheduleReconnect {
			timer,
			delay: self.current_delay(),
		});
		directives
	}
}

fn encode(message: &ClientMessage) -> Option<String> {
	serde_json::to_string(message)
		.map_err(Error::from)
		.map_err(|err| warn!(target = "bridge", error = %err, "failed to encode message"))
		.ok()
}
