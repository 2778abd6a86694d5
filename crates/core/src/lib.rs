//! Page bridge: remote control of a page over a persistent socket.
//!
//! The bridge lives inside a page, keeps one socket open to a control server,
//! executes the tasks it is sent and answers each with a correlated result.
//!
//! # Layers
//!
//! - [`ConnectionManager`] - sans-IO socket lifecycle: handshake, loss
//!   detection, reconnect scheduling. Emits [`Directive`]s for a driver to carry out.
//! - [`Executor`] - maps a [`Task`](bridge_protocol::Task) to an action handler
//!   or raw evaluation and produces a [`TaskOutcome`](bridge_protocol::TaskOutcome).
//! - [`actions`] - the built-in action handlers.
//! - [`Page`], [`Element`], [`Clock`] - the seams a host implements (web-sys in
//!   the browser, [`testing::MemoryPage`] in tests).
//!
//! Everything runs on one logical thread; nothing here requires `Send`.

pub mod actions;
mod clock;
mod config;
mod connection;
mod error;
mod executor;
#[cfg(not(target_arch = "wasm32"))]
pub mod native;
mod page;
mod serialize;
pub mod testing;

pub use bridge_protocol as protocol;
pub use clock::Clock;
#[cfg(not(target_arch = "wasm32"))]
pub use clock::TokioClock;
pub use config::{ActionConfig, BridgeConfig, ReconnectPolicy};
pub use connection::{ConnectionManager, ConnectionState, Directive, TimerId};
pub use error::{Error, Result};
pub use executor::Executor;
pub use page::{Element, Page, PageValue};
pub use serialize::serialize;
