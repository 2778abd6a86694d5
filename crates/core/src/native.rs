//! Native driver built on tokio and tokio-tungstenite.
//!
//! Runs the same [`ConnectionManager`] and [`Executor`] as the browser build,
//! against any [`Page`] implementation. Useful for headless harnesses and
//! for exercising a control server end to end.
//!
//! Frames are handled one at a time: while a task runs, the next frame waits.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::{Pin, pin};

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::time::Sleep;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};

use crate::connection::{ConnectionManager, Directive, TimerId};
use crate::{Clock, Error, Executor, Page};

type Socket = WebSocketStream<MaybeTlsStream<TcpStream>>;
type ReconnectTimer = Option<(TimerId, Pin<Box<Sleep>>)>;

enum Event {
	Shutdown,
	Timer(TimerId),
	Frame(Option<Result<Message, tokio_tungstenite::tungstenite::Error>>),
}

/// Drives `manager` until `shutdown` resolves, executing every task it receives.
///
/// Never returns early on transport failures; they only schedule reconnects.
pub async fn run<P, C, F>(mut manager: ConnectionManager, executor: &Executor<P, C>, shutdown: F)
where
	P: Page,
	C: Clock,
	F: Future<Output = ()>,
{
	let mut shutdown = pin!(shutdown);
	let mut socket: Option<Socket> = None;
	let mut timer: ReconnectTimer = None;
	let mut pending: VecDeque<Directive> = manager.connect().into();

	'run: loop {
		while let Some(directive) = pending.pop_front() {
			match directive {
				Directive::Open { url } => {
					let connected = tokio::select! {
						_ = &mut shutdown => break 'run,
						connected = connect_async(url.as_str()) => connected,
					};
					match connected {
						Ok((stream, _)) => {
							socket = Some(stream);
							pending.extend(manager.opened(&executor.page().location()));
						}
						Err(err) => {
							let err = Error::Transport(err.to_string());
							pending.extend(manager.open_failed(&err.to_string()));
						}
					}
				}
				Directive::Send(text) => {
					if let Some(stream) = socket.as_mut() {
						if let Err(err) = stream.send(Message::Text(text)).await {
							warn!(target = "bridge", error = %err, "send failed");
						}
					}
				}
				Directive::ScheduleReconnect { timer: id, delay } => {
					timer = Some((id, Box::pin(tokio::time::sleep(delay))));
				}
				Directive::CancelReconnect(id) => {
					if timer.as_ref().is_some_and(|(armed, _)| *armed == id) {
						timer = None;
					}
				}
			}
		}

		let event = tokio::select! {
			_ = &mut shutdown => Event::Shutdown,
			id = reconnect_due(&mut timer) => Event::Timer(id),
			frame = next_frame(&mut socket) => Event::Frame(frame),
		};

		match event {
			Event::Shutdown => break,
			Event::Timer(id) => {
				timer = None;
				pending.extend(manager.reconnect_fired(id));
			}
			Event::Frame(Some(Ok(Message::Text(text)))) => {
				if let Some(task) = manager.receive(&text) {
					let outcome = tokio::select! {
						_ = &mut shutdown => break,
						outcome = executor.execute(&task) => outcome,
					};
					pending.extend(manager.complete(outcome));
				}
			}
			Event::Frame(Some(Ok(Message::Close(frame)))) => {
				socket = None;
				let reason = frame.map(|f| f.reason.to_string()).unwrap_or_default();
				pending.extend(manager.closed(&reason));
			}
			Event::Frame(Some(Ok(other))) => {
				debug!(target = "bridge", kind = message_kind(&other), "ignoring non-text frame");
			}
			Event::Frame(Some(Err(err))) => {
				socket = None;
				manager.errored(&err.to_string());
				pending.extend(manager.closed("transport error"));
			}
			Event::Frame(None) => {
				socket = None;
				pending.extend(manager.closed("stream ended"));
			}
		}
	}

	if let Some(mut stream) = socket {
		let _ = stream.close(None).await;
	}
	info!(target = "bridge", client_id = ?manager.client_id(), "bridge stopped");
}

async fn reconnect_due(timer: &mut ReconnectTimer) -> TimerId {
	match timer {
		Some((id, sleep)) => {
			sleep.as_mut().await;
			*id
		}
		None => std::future::pending().await,
	}
}

async fn next_frame(socket: &mut Option<Socket>) -> Option<Result<Message, tokio_tungstenite::tungstenite::Error>> {
	match socket {
		Some(stream) => stream.next().await,
		None => std::future::pending().await,
	}
}

fn message_kind(message: &Message) -> &'static str {
	match message {
		Message::Text(_) => "text",
		Message::Binary(_) => "binary",
		Message::Ping(_) => "ping",
		Message::Pong(_) => "pong",
		Message::Close(_) => "close",
		Message::Frame(_) => "frame",
	}
}
