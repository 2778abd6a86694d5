//! In-page bridge: connects to the control server, runs the tasks it sends
//! against the live document and replies with correlated results.

use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::rc::{Rc, Weak};

use bridge::{ConnectionManager, Directive, Executor, Page, TimerId};
use futures::channel::mpsc::{self, UnboundedReceiver, UnboundedSender};
use futures::StreamExt;
use tracing::{debug, error, info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, Event, MessageEvent, WebSocket, Window};

mod config;
mod dom;
mod logging;
mod timer;

use dom::DomPage;
use timer::TimeoutClock;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();

    let window = web_sys::window().ok_or("no window")?;
    let (config, config_error) = match config::load_config(&window) {
        Ok(config) => (config, None),
        Err(err) => (bridge::BridgeConfig::default(), Some(err)),
    };
    logging::init_logging(&config.log_level);
    if let Some(err) = config_error {
        warn!(target = "bridge", error = %err, "using default configuration");
    }

    let page = DomPage::new(window.clone())?;
    let endpoint = config.resolve_endpoint(&page.hostname());
    info!(target = "bridge", endpoint = %endpoint, "bridge starting");

    let (frames, incoming) = mpsc::unbounded();
    let bridge = Rc::new(Bridge {
        manager: RefCell::new(ConnectionManager::new(endpoint, config.reconnect)),
        socket: RefCell::new(None),
        timers: RefCell::new(HashMap::new()),
        frames,
        executor: Executor::new(page, TimeoutClock::new(window.clone()), config.actions),
        window,
    });

    wasm_bindgen_futures::spawn_local(process_frames(bridge.clone(), incoming));
    let directives = bridge.manager.borrow_mut().connect();
    bridge.apply(directives);
    Ok(())
}

/// Shared state behind every socket and timer callback.
struct Bridge {
    manager: RefCell<ConnectionManager>,
    socket: RefCell<Option<SocketHandle>>,
    /// Armed reconnect timers and their `setTimeout` handles.
    timers: RefCell<HashMap<TimerId, i32>>,
    frames: UnboundedSender<String>,
    executor: Executor<DomPage, TimeoutClock>,
    window: Window,
}

/// A socket plus the closures registered on it; dropping it detaches them.
struct SocketHandle {
    ws: WebSocket,
    _onopen: Closure<dyn FnMut(Event)>,
    _onmessage: Closure<dyn FnMut(MessageEvent)>,
    _onerror: Closure<dyn FnMut(Event)>,
    _onclose: Closure<dyn FnMut(CloseEvent)>,
}

impl Drop for SocketHandle {
    fn drop(&mut self) {
        self.ws.set_onopen(None);
        self.ws.set_onmessage(None);
        self.ws.set_onerror(None);
        self.ws.set_onclose(None);
    }
}

impl Bridge {
    /// Carries out directives in order. Directives produced while applying are
    /// appended and handled in the same pass.
    fn apply(self: &Rc<Self>, directives: Vec<Directive>) {
        let mut queue = VecDeque::from(directives);
        while let Some(directive) = queue.pop_front() {
            match directive {
                Directive::Open { url } => {
                    if let Err(err) = self.open(&url) {
                        let err = bridge::Error::Transport(dom::js_error_message(&err));
                        queue.extend(self.manager.borrow_mut().open_failed(&err.to_string()));
                    }
                }
                Directive::Send(text) => self.send(&text),
                Directive::ScheduleReconnect { timer: id, delay } => {
                    let weak = Rc::downgrade(self);
                    let armed = timer::set_timeout(&self.window, delay, move || {
                        if let Some(bridge) = weak.upgrade() {
                            bridge.timers.borrow_mut().remove(&id);
                            let directives = bridge.manager.borrow_mut().reconnect_fired(id);
                            bridge.apply(directives);
                        }
                    });
                    match armed {
                        Ok(handle) => {
                            self.timers.borrow_mut().insert(id, handle);
                        }
                        Err(err) => {
                            error!(target = "bridge", error = %dom::js_error_message(&err), "failed to arm reconnect timer");
                        }
                    }
                }
                Directive::CancelReconnect(id) => {
                    if let Some(handle) = self.timers.borrow_mut().remove(&id) {
                        self.window.clear_timeout_with_handle(handle);
                    }
                }
            }
        }
    }

    fn open(self: &Rc<Self>, url: &str) -> Result<(), JsValue> {
        let ws = WebSocket::new(url)?;

        let weak = Rc::downgrade(self);
        let onopen = Closure::<dyn FnMut(Event)>::new(move |_: Event| {
            with_bridge(&weak, |bridge| {
                let location = bridge.executor.page().location();
                let directives = bridge.manager.borrow_mut().opened(&location);
                bridge.apply(directives);
            });
        });

        let frames = self.frames.clone();
        let onmessage = Closure::<dyn FnMut(MessageEvent)>::new(move |event: MessageEvent| {
            match event.data().as_string() {
                Some(text) => {
                    let _ = frames.unbounded_send(text);
                }
                None => debug!(target = "bridge", "ignoring non-text frame"),
            }
        });

        let weak = Rc::downgrade(self);
        let onerror = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            with_bridge(&weak, |bridge| {
                bridge.manager.borrow_mut().errored(&event.type_());
            });
        });

        let weak = Rc::downgrade(self);
        let onclose = Closure::<dyn FnMut(CloseEvent)>::new(move |event: CloseEvent| {
            with_bridge(&weak, |bridge| {
                let reason = format!("code {} {}", event.code(), event.reason());
                let directives = bridge.manager.borrow_mut().closed(reason.trim_end());
                bridge.apply(directives);
            });
        });

        ws.set_onopen(Some(onopen.as_ref().unchecked_ref()));
        ws.set_onmessage(Some(onmessage.as_ref().unchecked_ref()));
        ws.set_onerror(Some(onerror.as_ref().unchecked_ref()));
        ws.set_onclose(Some(onclose.as_ref().unchecked_ref()));

        // Reached only from startup and timer callbacks, never from a socket callback.
        *self.socket.borrow_mut() = Some(SocketHandle {
            ws,
            _onopen: onopen,
            _onmessage: onmessage,
            _onerror: onerror,
            _onclose: onclose,
        });
        Ok(())
    }

    fn send(&self, text: &str) {
        let socket = self.socket.borrow();
        let Some(handle) = socket.as_ref() else {
            warn!(target = "bridge", "no socket to send on");
            return;
        };
        if let Err(err) = handle.ws.send_with_str(text) {
            warn!(target = "bridge", error = %dom::js_error_message(&err), "send failed");
        }
    }
}

fn with_bridge(weak: &Weak<Bridge>, f: impl FnOnce(&Rc<Bridge>)) {
    if let Some(bridge) = weak.upgrade() {
        f(&bridge);
    }
}

/// Handles inbound frames one at a time, in arrival order. The next frame is
/// not looked at until the current task has produced its result.
async fn process_frames(bridge: Rc<Bridge>, mut incoming: UnboundedReceiver<String>) {
    while let Some(frame) = incoming.next().await {
        let task = bridge.manager.borrow_mut().receive(&frame);
        let Some(task) = task else { continue };
        let outcome = bridge.executor.execute(&task).await;
        let directives = bridge.manager.borrow_mut().complete(outcome);
        bridge.apply(directives);
    }
}
