use std::future::Future;
use std::time::Duration;

/// Time source for handler delays and polling.
///
/// Milliseconds rather than `Instant` so the same handlers run on wasm32,
/// where the host supplies `Date.now()` and `setTimeout`.
pub trait Clock {
	/// Monotonic-enough milliseconds, only ever compared with earlier readings.
	fn now_ms(&self) -> u64;

	fn sleep(&self, duration: Duration) -> impl Future<Output = ()>;
}

/// [`Clock`] backed by tokio's timer, so paused-time tests advance instantly.
#[cfg(not(target_arch = "wasm32"))]
#[derive(Debug, Clone, Copy)]
pub struct TokioClock {
	origin: tokio::time::Instant,
}

#[cfg(not(target_arch = "wasm32"))]
impl TokioClock {
	pub fn new() -> Self {
		Self {
			origin: tokio::time::Instant::now(),
		}
	}
}

#[cfg(not(target_arch = "wasm32"))]
impl Default for TokioClock {
	fn default() -> Self {
		Self::new()
	}
}

#[cfg(not(target_arch = "wasm32"))]
impl Clock for TokioClock {
	fn now_ms(&self) -> u64 {
		self.origin.elapsed().as_millis() as u64
	}

	fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
		tokio::time::sleep(duration)
	}
}
