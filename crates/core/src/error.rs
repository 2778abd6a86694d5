//! Error types for the bridge.
//!
//! The `Display` text of each variant is what travels to the control server
//! in a result's `error` field, so wording here is part of the wire contract.

use thiserror::Error;

/// Result type alias for bridge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while executing tasks or driving the socket.
#[derive(Debug, Error)]
pub enum Error {
	/// No element matched the selector.
	#[error("Element not found: {0}")]
	ElementNotFound(String),

	/// A selector wait ran past its deadline.
	#[error("Timeout waiting for: {0}")]
	WaitTimeout(String),

	/// Evaluated code threw; carries the thrown error's message.
	#[error("{0}")]
	Script(String),

	/// A recognized action arrived with parameters that do not fit its shape.
	#[error("Invalid parameters for {action}: {source}")]
	InvalidParams {
		action: String,
		#[source]
		source: serde_json::Error,
	},

	/// Task frame had an id but its `action` or `code` had the wrong shape.
	#[error("Invalid task: {0}")]
	InvalidTask(String),

	/// Action name not in the registry and no raw code to fall back to.
	#[error("Unknown action: {0}")]
	UnknownAction(String),

	/// Task carried neither an action nor code.
	#[error("Task has no action or code")]
	EmptyTask,

	/// Page-level failure outside evaluated code (invalid selector, navigation refused).
	#[error("{0}")]
	Page(String),

	/// Socket could not be created, opened, or written.
	#[error("Transport error: {0}")]
	Transport(String),

	/// JSON serialization/deserialization error.
	#[error("JSON error: {0}")]
	Json(#[from] serde_json::Error),
}

