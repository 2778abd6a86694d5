//! Wire types for the page bridge protocol.
//!
//! A bridge running inside a page holds one persistent WebSocket to the
//! control server. Frames are JSON text with a `type` discriminator:
//!
//! 1. Bridge connects and sends [`ClientMessage::Hello`] with the page URL
//! 2. Server replies with [`ServerMessage::Welcome`] carrying a client id
//! 3. Server pushes [`ServerMessage::Task`] frames
//! 4. Bridge answers each task with [`ClientMessage::Result`], echoing its [`TaskId`]
//!
//! # Main Types
//!
//! - [`ClientMessage`] - Messages from the bridge to the control server
//! - [`ServerMessage`] - Messages from the control server to the bridge
//! - [`Task`] / [`TaskOutcome`] - One unit of work and its correlated result
//! - [`Action`] - Typed parameters for each built-in action

mod action;
mod coerce;
mod endpoint;
mod message;

pub use action::{Action, ActionRequest, WaitParams};
pub use endpoint::{ADMIN_PREFIX, BRIDGE_PATH, admin_endpoint};
pub use message::{ClientId, ClientMessage, ServerMessage, Task, TaskId, TaskOutcome};
