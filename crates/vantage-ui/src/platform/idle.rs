//! Background scheduling via `requestIdleCallback`, with a timer fallback

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use wasm_bindgen_futures::spawn_local;

use vantage_core::env::{IdleScheduler, Job};

use crate::error::{PlatformError, describe_js};

/// Runs deferred jobs when the browser is idle.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserScheduler;

impl IdleScheduler for BrowserScheduler {
    fn supports_idle(&self) -> bool {
        web_sys::window().is_some_and(|window| {
            js_sys::Reflect::has(&window, &"requestIdleCallback".into()).unwrap_or(false)
        })
    }

    fn on_idle(&self, job: Job) {
        let slot = Rc::new(RefCell::new(Some(job)));
        let pending = Rc::clone(&slot);
        let callback = Closure::once_into_js(move || {
            if let Some(job) = pending.borrow_mut().take() {
                spawn_local(job);
            }
        });

        let requested = web_sys::window()
            .ok_or(PlatformError::WindowNotAvailable)
            .and_then(|window| {
                window
                    .request_idle_callback(callback.unchecked_ref())
                    .map_err(|e| PlatformError::IdleCallbackFailed(describe_js(&e)))
            });

        if let Err(error) = requested {
            web_sys::console::warn_1(&format!("{error}; running on next tick").into());
            if let Some(job) = slot.borrow_mut().take() {
                self.on_next_tick(job);
            }
        }
    }

    fn on_next_tick(&self, job: Job) {
        Timeout::new(0, move || spawn_local(job)).forget();
    }
}
