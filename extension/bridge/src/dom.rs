//! web-sys implementation of the bridge's [`Page`] and [`Element`] seams.

use std::future::Future;
use std::time::Duration;

use bridge::{Element, Error, Page, PageValue, Result};
use js_sys::{Array, Promise, Reflect};
use serde_json::Value;
use tracing::debug;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Event, EventInit, HtmlCollection, HtmlElement, NodeList, Window};

/// The document the bridge was injected into.
#[derive(Clone)]
pub struct DomPage {
    window: Window,
    document: Document,
}

impl DomPage {
    pub fn new(window: Window) -> std::result::Result<Self, JsValue> {
        let document = window.document().ok_or("no document")?;
        Ok(Self { window, document })
    }

    pub fn hostname(&self) -> String {
        self.window.location().hostname().unwrap_or_default()
    }
}

impl Page for DomPage {
    type Element = DomElement;

    fn location(&self) -> String {
        self.window.location().href().unwrap_or_default()
    }

    fn query_selector(&self, selector: &str) -> Result<Option<DomElement>> {
        self.document
            .query_selector(selector)
            .map(|found| found.map(DomElement))
            .map_err(|err| Error::Page(js_error_message(&err)))
    }

    fn navigate_after(&self, url: &str, delay: Duration) -> Result<()> {
        let location = self.window.location();
        let url = url.to_string();
        let callback = Closure::once_into_js(move || {
            let _ = location.set_href(&url);
        });
        self.window
            .set_timeout_with_callback_and_timeout_and_arguments_0(
                callback.unchecked_ref(),
                delay.as_millis() as i32,
            )
            .map(|_| ())
            .map_err(|err| Error::Page(js_error_message(&err)))
    }

    fn evaluate(&self, code: &str) -> impl Future<Output = Result<PageValue<DomElement>>> {
        let evaluated = js_sys::eval(code);
        async move {
            let value = evaluated.map_err(|err| Error::Script(js_error_message(&err)))?;
            let value = match value.dyn_into::<Promise>() {
                Ok(promise) => JsFuture::from(promise)
                    .await
                    .map_err(|err| Error::Script(js_error_message(&err)))?,
                Err(value) => value,
            };
            Ok(to_page_value(value))
        }
    }
}

/// Handle to a live DOM element.
#[derive(Clone)]
pub struct DomElement(web_sys::Element);

impl Element for DomElement {
    fn value(&self) -> Option<String> {
        Reflect::get(&self.0, &JsValue::from_str("value"))
            .ok()
            .and_then(|v| v.as_string())
    }

    fn set_value(&self, value: &str) {
        let _ = Reflect::set(&self.0, &JsValue::from_str("value"), &JsValue::from_str(value));
    }

    fn dispatch_event(&self, name: &str) {
        let init = EventInit::new();
        init.set_bubbles(true);
        if let Ok(event) = Event::new_with_event_init_dict(name, &init) {
            let _ = self.0.dispatch_event(&event);
        }
    }

    fn click(&self) {
        if let Some(el) = self.0.dyn_ref::<HtmlElement>() {
            el.click();
        }
    }

    fn focus(&self) {
        if let Some(el) = self.0.dyn_ref::<HtmlElement>() {
            let _ = el.focus();
        }
    }

    fn inner_text(&self) -> String {
        match self.0.dyn_ref::<HtmlElement>() {
            Some(el) => el.inner_text(),
            None => self.0.text_content().unwrap_or_default(),
        }
    }

    fn inner_html(&self) -> String {
        self.0.inner_html()
    }

    fn outer_html(&self) -> String {
        self.0.outer_html()
    }
}

/// Classifies an evaluation result: elements, node lists, HTML collections and
/// arrays keep their structure for serialization, everything else is
/// converted to JSON.
fn to_page_value(value: JsValue) -> PageValue<DomElement> {
    if value.is_undefined() {
        return PageValue::Undefined;
    }
    if let Some(el) = value.dyn_ref::<web_sys::Element>() {
        return PageValue::Element(DomElement(el.clone()));
    }
    if let Some(list) = value.dyn_ref::<NodeList>() {
        let items = (0..list.length())
            .filter_map(|i| list.item(i))
            .map(|node| to_page_value(node.into()))
            .collect();
        return PageValue::List(items);
    }
    if let Some(collection) = value.dyn_ref::<HtmlCollection>() {
        let items = (0..collection.length())
            .filter_map(|i| collection.item(i))
            .map(|el| PageValue::Element(DomElement(el)))
            .collect();
        return PageValue::List(items);
    }
    if Array::is_array(&value) {
        let items = Array::from(&value).iter().map(to_page_value).collect();
        return PageValue::List(items);
    }
    match serde_wasm_bindgen::from_value::<Value>(value) {
        Ok(json) => PageValue::Json(json),
        Err(err) => {
            debug!(target = "bridge", error = %err, "result not representable as JSON, sending null");
            PageValue::Json(Value::Null)
        }
    }
}

/// Best-effort message for a thrown JS value: `error.message`, a thrown
/// string, or its JSON form.
pub fn js_error_message(err: &JsValue) -> String {
    if let Some(message) = Reflect::get(err, &JsValue::from_str("message"))
        .ok()
        .and_then(|m| m.as_string())
    {
        return message;
    }
    err.as_string()
        .or_else(|| js_sys::JSON::stringify(err).ok()?.as_string())
        .unwrap_or_else(|| format!("{:?}", err))
}

#[cfg(test)]
mod tests {
    use bridge::serialize;
    use serde_json::json;
    use wasm_bindgen_test::*;

    use super::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn page_with_list() -> DomPage {
        let page = DomPage::new(web_sys::window().unwrap()).unwrap();
        let body = page.document.body().unwrap();
        body.set_inner_html("<ul><li>one</li><li>two</li><li>three</li></ul>");
        page
    }

    const ITEMS: [&str; 3] = ["<li>one</li>", "<li>two</li>", "<li>three</li>"];

    #[wasm_bindgen_test]
    async fn node_list_serializes_in_document_order() {
        let page = page_with_list();
        let value = page.evaluate("document.querySelectorAll('li')").await.unwrap();
        assert_eq!(serialize(value), Some(json!(ITEMS)));
    }

    #[wasm_bindgen_test]
    async fn html_collection_serializes_like_node_list() {
        let page = page_with_list();
        let value = page.evaluate("document.getElementsByTagName('li')").await.unwrap();
        assert_eq!(serialize(value), Some(json!(ITEMS)));
    }

    #[wasm_bindgen_test]
    async fn plain_values_and_promises_become_json() {
        let page = page_with_list();
        let value = page.evaluate("({ name: 'x', flags: [true, null] })").await.unwrap();
        assert_eq!(serialize(value), Some(json!({"name": "x", "flags": [true, null]})));

        let value = page.evaluate("Promise.resolve('later')").await.unwrap();
        assert_eq!(serialize(value), Some(json!("later")));

        let value = page.evaluate("undefined").await.unwrap();
        assert_eq!(serialize(value), None);
    }

    #[wasm_bindgen_test]
    async fn thrown_values_surface_their_message() {
        let page = page_with_list();

        let err = page.evaluate("throw new Error('boom')").await.unwrap_err();
        assert_eq!(err.to_string(), "boom");

        let err = page.evaluate("throw 'plain'").await.unwrap_err();
        assert_eq!(err.to_string(), "plain");
    }

    #[wasm_bindgen_test]
    fn error_message_falls_back_to_json() {
        let thrown = js_sys::Object::new();
        Reflect::set(&thrown, &JsValue::from_str("code"), &JsValue::from_str("E1")).unwrap();
        assert_eq!(js_error_message(&thrown), r#"{"code":"E1"}"#);
    }
}
