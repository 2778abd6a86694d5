use std::future::Future;
use std::time::Duration;

use bridge::Clock;
use js_sys::Promise;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::Window;

/// [`Clock`] on `Date.now()` and `setTimeout`.
#[derive(Clone)]
pub struct TimeoutClock {
    window: Window,
}

impl TimeoutClock {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Clock for TimeoutClock {
    fn now_ms(&self) -> u64 {
        js_sys::Date::now() as u64
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> {
        let window = self.window.clone();
        let promise = Promise::new(&mut |resolve, _reject| {
            let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, millis(duration));
        });
        async move {
            let _ = JsFuture::from(promise).await;
        }
    }
}

/// Runs `callback` once after `delay`, returning the handle for `clearTimeout`.
pub fn set_timeout(window: &Window, delay: Duration, callback: impl FnOnce() + 'static) -> Result<i32, JsValue> {
    let callback = Closure::once_into_js(callback);
    window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), millis(delay))
}

fn millis(duration: Duration) -> i32 {
    duration.as_millis().min(i32::MAX as u128) as i32
}
