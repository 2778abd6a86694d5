//! In-memory [`Page`] for tests and headless harnesses.
//!
//! A flat list of elements with just enough DOM behavior for the built-in
//! actions: values, bubbling-event records, clicks, focus and markup.
//!
//! Selectors are limited to `#id`, `.class` and a bare tag name. Evaluation
//! understands `document.querySelector(..)`, `document.querySelectorAll(..)`,
//! `throw new Error(..)`, JSON literals and scripts registered with
//! [`MemoryPage::register_script`].

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

use serde_json::Value;

use crate::page::{Element, Page, PageValue};
use crate::{Error, Result};

const VOID_TAGS: [&str; 6] = ["input", "br", "img", "hr", "meta", "link"];
const FORM_TAGS: [&str; 3] = ["input", "textarea", "select"];

type Script = Rc<dyn Fn(&MemoryPage) -> Result<PageValue<MemoryElement>>>;

/// Deferred navigation recorded by [`Page::navigate_after`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
	pub url: String,
	pub delay: Duration,
}

#[derive(Default)]
struct PageState {
	location: String,
	elements: Vec<MemoryElement>,
	scripts: HashMap<String, Script>,
	navigations: Vec<Navigation>,
}

/// Shared handle to an in-memory page. Clones see the same elements.
#[derive(Clone, Default)]
pub struct MemoryPage {
	state: Rc<RefCell<PageState>>,
}

impl MemoryPage {
	pub fn new() -> Self {
		Self::with_location("https://example.com/")
	}

	pub fn with_location(url: &str) -> Self {
		let page = Self::default();
		page.state.borrow_mut().location = url.to_string();
		page
	}

	/// Appends an element and returns its handle.
	pub fn append(&self, tag: &str, attrs: &[(&str, &str)], text: &str) -> MemoryElement {
		let element = MemoryElement::new(tag, attrs, text);
		self.state.borrow_mut().elements.push(element.clone());
		element
	}

	/// Removes an element; existing handles stay usable but are no longer found.
	pub fn remove(&self, element: &MemoryElement) {
		self.state
			.borrow_mut()
			.elements
			.retain(|el| !Rc::ptr_eq(&el.node, &element.node));
	}

	/// Makes `code` evaluate by calling `script` instead of the built-in rules.
	pub fn register_script<F>(&self, code: &str, script: F)
	where
		F: Fn(&MemoryPage) -> Result<PageValue<MemoryElement>> + 'static,
	{
		self.state
			.borrow_mut()
			.scripts
			.insert(code.to_string(), Rc::new(script));
	}

	/// All elements matching `selector`, in document order.
	pub fn query_selector_all(&self, selector: &str) -> Result<Vec<MemoryElement>> {
		let matcher = Selector::parse(selector)?;
		Ok(self
			.state
			.borrow()
			.elements
			.iter()
			.filter(|el| matcher.matches(el))
			.cloned()
			.collect())
	}

	pub fn navigations(&self) -> Vec<Navigation> {
		self.state.borrow().navigations.clone()
	}

	fn eval_builtin(&self, code: &str) -> Result<PageValue<MemoryElement>> {
		let code = code.trim().trim_end_matches(';');

		if let Some(selector) = call_argument(code, "document.querySelectorAll") {
			let items = self
				.query_selector_all(selector)?
				.into_iter()
				.map(PageValue::Element)
				.collect();
			return Ok(PageValue::List(items));
		}
		if let Some(selector) = call_argument(code, "document.querySelector") {
			return Ok(self
				.query_selector(selector)?
				.map_or(PageValue::Json(Value::Null), PageValue::Element));
		}
		if let Some(message) = call_argument(code, "throw new Error") {
			return Err(Error::Script(message.to_string()));
		}
		if code == "undefined" {
			return Ok(PageValue::Undefined);
		}
		serde_json::from_str::<Value>(code)
			.map(PageValue::Json)
			.map_err(|_| Error::Script(format!("unsupported expression: {code}")))
	}
}

impl Page for MemoryPage {
	type Element = MemoryElement;

	fn location(&self) -> String {
		self.state.borrow().location.clone()
	}

	fn query_selector(&self, selector: &str) -> Result<Option<MemoryElement>> {
		Ok(self.query_selector_all(selector)?.into_iter().next())
	}

	fn navigate_after(&self, url: &str, delay: Duration) -> Result<()> {
		let mut state = self.state.borrow_mut();
		state.navigations.push(Navigation {
			url: url.to_string(),
			delay,
		});
		state.location = url.to_string();
		Ok(())
	}

	fn evaluate(&self, code: &str) -> impl Future<Output = Result<PageValue<MemoryElement>>> {
		let script = self.state.borrow().scripts.get(code).cloned();
		let result = match script {
			Some(script) => script(self),
			None => self.eval_builtin(code),
		};
		std::future::ready(result)
	}
}

struct Node {
	tag: String,
	attrs: Vec<(String, String)>,
	text: RefCell<String>,
	value: RefCell<Option<String>>,
	events: RefCell<Vec<String>>,
	clicks: Cell<u32>,
	focused: Cell<bool>,
}

/// Element handle of a [`MemoryPage`].
#[derive(Clone)]
pub struct MemoryElement {
	node: Rc<Node>,
}

impl std::fmt::Debug for MemoryElement {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("MemoryElement")
			.field("tag", &self.node.tag)
			.field("attrs", &self.node.attrs)
			.finish()
	}
}

impl MemoryElement {
	fn new(tag: &str, attrs: &[(&str, &str)], text: &str) -> Self {
		let initial_value = if FORM_TAGS.contains(&tag) {
			Some(
				attrs
					.iter()
					.find(|(name, _)| *name == "value")
					.map(|(_, v)| v.to_string())
					.unwrap_or_default(),
			)
		} else {
			None
		};
		Self {
			node: Rc::new(Node {
				tag: tag.to_string(),
				attrs: attrs
					.iter()
					.map(|(k, v)| (k.to_string(), v.to_string()))
					.collect(),
				text: RefCell::new(text.to_string()),
				value: RefCell::new(initial_value),
				events: RefCell::new(Vec::new()),
				clicks: Cell::new(0),
				focused: Cell::new(false),
			}),
		}
	}

	fn attr(&self, name: &str) -> Option<&str> {
		self.node
			.attrs
			.iter()
			.find(|(k, _)| k == name)
			.map(|(_, v)| v.as_str())
	}

	/// Names of dispatched events, oldest first.
	pub fn events(&self) -> Vec<String> {
		self.node.events.borrow().clone()
	}

	pub fn click_count(&self) -> u32 {
		self.node.clicks.get()
	}

	pub fn is_focused(&self) -> bool {
		self.node.focused.get()
	}
}

impl Element for MemoryElement {
	fn value(&self) -> Option<String> {
		self.node.value.borrow().clone()
	}

	fn set_value(&self, value: &str) {
		*self.node.value.borrow_mut() = Some(value.to_string());
	}

	fn dispatch_event(&self, name: &str) {
		self.node.events.borrow_mut().push(name.to_string());
	}

	fn click(&self) {
		self.node.clicks.set(self.node.clicks.get() + 1);
		self.dispatch_event("click");
	}

	fn focus(&self) {
		self.node.focused.set(true);
	}

	fn inner_text(&self) -> String {
		self.node.text.borrow().clone()
	}

	fn inner_html(&self) -> String {
		self.node.text.borrow().clone()
	}

	fn outer_html(&self) -> String {
		let mut open = format!("<{}", self.node.tag);
		for (name, value) in &self.node.attrs {
			open.push_str(&format!(" {name}=\"{value}\""));
		}
		open.push('>');
		if VOID_TAGS.contains(&self.node.tag.as_str()) {
			return open;
		}
		format!("{open}{}</{}>", self.inner_html(), self.node.tag)
	}
}

enum Selector<'a> {
	Id(&'a str),
	Class(&'a str),
	Tag(&'a str),
}

impl<'a> Selector<'a> {
	fn parse(selector: &'a str) -> Result<Self> {
		let selector = selector.trim();
		let (kind, name): (fn(&'a str) -> Self, &'a str) = if let Some(id) = selector.strip_prefix('#') {
			(Selector::Id, id)
		} else if let Some(class) = selector.strip_prefix('.') {
			(Selector::Class, class)
		} else {
			(Selector::Tag, selector)
		};
		let valid = !name.is_empty()
			&& name
				.chars()
				.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
		if !valid {
			return Err(Error::Page(format!("'{selector}' is not a valid selector")));
		}
		Ok(kind(name))
	}

	fn matches(&self, element: &MemoryElement) -> bool {
		match self {
			Selector::Id(id) => element.attr("id") == Some(*id),
			Selector::Class(class) => element
				.attr("class")
				.is_some_and(|classes| classes.split_whitespace().any(|c| c == *class)),
			Selector::Tag(tag) => element.node.tag.eq_ignore_ascii_case(tag),
		}
	}
}

/// Extracts the quoted argument of `name('arg')` / `name("arg")`.
fn call_argument<'a>(code: &'a str, name: &str) -> Option<&'a str> {
	let inner = code.strip_prefix(name)?.strip_prefix('(')?.strip_suffix(')')?;
	let quote = inner.chars().next().filter(|c| *c == '\'' || *c == '"')?;
	inner.strip_prefix(quote)?.strip_suffix(quote)
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn selectors_match_id_class_and_tag() {
		let page = MemoryPage::new();
		page.append("input", &[("id", "q")], "");
		page.append("li", &[("class", "item first")], "a");
		page.append("li", &[("class", "item")], "b");

		assert!(page.query_selector("#q").unwrap().is_some());
		assert_eq!(page.query_selector_all(".item").unwrap().len(), 2);
		assert_eq!(page.query_selector_all("LI").unwrap().len(), 2);
		assert!(page.query_selector("#nope").unwrap().is_none());
		assert!(matches!(page.query_selector("div > [x]"), Err(Error::Page(_))));
	}

	#[test]
	fn form_elements_carry_values() {
		let page = MemoryPage::new();
		let input = page.append("input", &[("value", "preset")], "");
		let div = page.append("div", &[], "text");
		assert_eq!(input.value().as_deref(), Some("preset"));
		assert_eq!(div.value(), None);
		assert_eq!(input.outer_html(), "<input value=\"preset\">");
	}

	#[test]
	fn removed_elements_are_not_found() {
		let page = MemoryPage::new();
		let el = page.append("p", &[("id", "gone")], "");
		page.remove(&el);
		assert!(page.query_selector("#gone").unwrap().is_none());
	}

	#[test]
	fn call_argument_accepts_both_quotes() {
		assert_eq!(call_argument("f('a b')", "f"), Some("a b"));
		assert_eq!(call_argument("f(\"#x\")", "f"), Some("#x"));
		assert_eq!(call_argument("f(x)", "f"), None);
	}
}
