//! Built-in action handlers.
//!
//! One small, orthogonal handler per DOM primitive. [`Action::Eval`] is the
//! escape hatch for anything else and runs with full page privileges.
//!
//! Handlers return a raw [`PageValue`]; the [`Executor`](crate::Executor)
//! serializes it for the wire.

mod input;
mod navigate;
mod read;
mod wait;

use bridge_protocol::Action;

pub use self::input::{click, fill, type_text};
pub use self::navigate::navigate;
pub use self::read::{eval, get};
pub use self::wait::wait;
use crate::config::ActionConfig;
use crate::page::{Page, PageValue};
use crate::{Clock, Error, Result};

/// Runs `action` against `page`.
pub async fn run<P, C>(action: &Action, page: &P, clock: &C, config: &ActionConfig) -> Result<PageValue<P::Element>>
where
	P: Page,
	C: Clock,
{
	match action {
		Action::Navigate { url } => navigate(page, url, config),
		Action::Fill { selector, value } => fill(page, selector, value),
		Action::Click { selector } => click(page, selector),
		Action::Type { selector, text, delay } => type_text(page, clock, selector, text, *delay, config).await,
		Action::Wait(params) => wait(page, clock, params, config).await,
		Action::Eval { code } => eval(page, code).await,
		Action::Get { selector, html } => get(page, selector, *html),
	}
}

/// First element matching `selector`, or [`Error::ElementNotFound`].
pub(crate) fn find<P: Page>(page: &P, selector: &str) -> Result<P::Element> {
	page.query_selector(selector)?
		.ok_or_else(|| Error::ElementNotFound(selector.to_string()))
}

/// Treats zero like an absent value, falling back to `default`.
pub(crate) fn or_default(value: Option<u64>, default: u64) -> u64 {
	value.filter(|v| *v > 0).unwrap_or(default)
}
