//! Seams between the bridge and the page it controls.

use std::future::Future;
use std::time::Duration;

use serde_json::Value;

use crate::Result;

/// A DOM element handle.
///
/// Mirrors the handful of element operations the action handlers need.
pub trait Element: Clone {
	/// Current form value, `None` when the element has no `value` property.
	fn value(&self) -> Option<String>;

	fn set_value(&self, value: &str);

	/// Fires a bubbling DOM event named `name` (`"input"`, `"change"`, ...).
	fn dispatch_event(&self, name: &str);

	fn click(&self);

	fn focus(&self);

	/// Rendered text (`innerText`).
	fn inner_text(&self) -> String;

	fn inner_html(&self) -> String;

	fn outer_html(&self) -> String;
}

/// The page a bridge is injected into.
pub trait Page {
	type Element: Element;

	/// Current page URL, sent in the `hello` handshake.
	fn location(&self) -> String;

	/// First element matching a CSS selector.
	///
	/// Returns [`Error::Page`](crate::Error::Page) when the selector itself is invalid.
	fn query_selector(&self, selector: &str) -> Result<Option<Self::Element>>;

	/// Navigates to `url` once `delay` has passed, without blocking the caller.
	fn navigate_after(&self, url: &str, delay: Duration) -> Result<()>;

	/// Evaluates `code` as an expression in page context, awaiting it when it
	/// produces a promise. Thrown errors map to [`Error::Script`](crate::Error::Script).
	fn evaluate(&self, code: &str) -> impl Future<Output = Result<PageValue<Self::Element>>>;
}

/// Raw value produced by a handler or an evaluation, before it is
/// [serialized](crate::serialize) for the wire.
#[derive(Debug, Clone)]
pub enum PageValue<E> {
	/// Nothing was produced; the result field is omitted.
	Undefined,
	Element(E),
	/// An array or node list, in order.
	List(Vec<PageValue<E>>),
	Json(Value),
}

impl<E> From<Value> for PageValue<E> {
	fn from(value: Value) -> Self {
		PageValue::Json(value)
	}
}
