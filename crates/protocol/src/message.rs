use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::action::ActionRequest;

/// Server-assigned task identifier.
///
/// Opaque to the bridge: whatever JSON value the server sent is echoed back
/// verbatim on the matching [`TaskOutcome`], so string and numeric ids both
/// correlate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TaskId(pub Value);

impl From<&str> for TaskId {
	fn from(id: &str) -> Self {
		Self(Value::String(id.to_string()))
	}
}

impl From<u64> for TaskId {
	fn from(id: u64) -> Self {
		Self(Value::from(id))
	}
}

/// Server-assigned connection identifier, opaque like [`TaskId`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClientId(pub Value);

impl From<&str> for ClientId {
	fn from(id: &str) -> Self {
		Self(Value::String(id.to_string()))
	}
}

impl fmt::Display for ClientId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write_opaque(&self.0, f)
	}
}

impl fmt::Display for TaskId {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write_opaque(&self.0, f)
	}
}

fn write_opaque(value: &Value, f: &mut fmt::Formatter<'_>) -> fmt::Result {
	match value {
		Value::String(s) => f.write_str(s),
		other => write!(f, "{other}"),
	}
}

/// Message sent from the bridge to the control server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
	/// First frame on every new socket.
	Hello {
		/// Current page location.
		url: String,
	},
	/// Response to exactly one [`Task`].
	Result(TaskOutcome),
}

/// Message sent from the control server to the bridge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
	/// Handshake reply assigning this connection an identifier.
	Welcome {
		#[serde(rename = "clientId")]
		client_id: ClientId,
	},
	/// A unit of work to execute in the page.
	Task(Task),
	/// Any message type this bridge does not understand.
	#[serde(other)]
	Unknown,
}

/// Server-issued unit of work.
///
/// Carries either a structured action or a raw `code` expression. When both
/// are present the action wins if its name is recognized.
///
/// Only `taskId` is checked when the frame is decoded. `action` and `code`
/// stay raw so a malformed body still gets a result correlated to its id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
	#[serde(rename = "taskId")]
	pub task_id: TaskId,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub action: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub code: Option<Value>,
}

impl Task {
	/// The structured action, or `Some(Err(_))` when `action` is not a
	/// `{type, ...}` object.
	pub fn action_request(&self) -> Option<Result<ActionRequest, serde_json::Error>> {
		self.action.clone().map(serde_json::from_value)
	}

	/// The raw expression, or `Some(Err(value))` when `code` is not a string.
	pub fn code_str(&self) -> Option<Result<&str, &Value>> {
		self.code.as_ref().map(|code| code.as_str().ok_or(code))
	}
}

/// Result of one task, correlated by [`TaskId`].
///
/// `result` and `error` are omitted from the frame when absent; an action that
/// yields nothing produces a frame with neither.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutcome {
	#[serde(rename = "taskId")]
	pub task_id: TaskId,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub result: Option<Value>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub error: Option<String>,
}

impl TaskOutcome {
	pub fn success(task_id: TaskId, result: Option<Value>) -> Self {
		Self {
			task_id,
			result,
			error: None,
		}
	}

	pub fn failure(task_id: TaskId, error: impl Into<String>) -> Self {
		Self {
			task_id,
			result: None,
			error: Some(error.into()),
		}
	}
}
