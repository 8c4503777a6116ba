//! `IntersectionObserver` behind the core's observer capability

use gloo_timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen::closure::Closure;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

use vantage_core::Result;
use vantage_core::env::{
    EntryCallback, IntersectionEntry, ObserverFactory, ObserverHandle, ObserverOptions,
};

use crate::error::{PlatformError, describe_js};

type ObserverClosure = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

/// Creates one browser observer per gate attachment.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserObservers;

struct BrowserObserverHandle {
    observer: IntersectionObserver,
    callback: Option<ObserverClosure>,
}

impl ObserverHandle for BrowserObserverHandle {
    fn disconnect(&mut self) {
        self.observer.disconnect();
    }
}

impl Drop for BrowserObserverHandle {
    fn drop(&mut self) {
        self.observer.disconnect();
        // The handle can be dropped from inside its own callback; release the
        // closure on a later task.
        if let Some(callback) = self.callback.take() {
            Timeout::new(0, move || drop(callback)).forget();
        }
    }
}

fn to_entry(value: &wasm_bindgen::JsValue) -> Option<IntersectionEntry> {
    value
        .dyn_ref::<IntersectionObserverEntry>()
        .map(|entry| IntersectionEntry {
            is_intersecting: entry.is_intersecting(),
            intersection_ratio: entry.intersection_ratio(),
        })
}

impl ObserverFactory for BrowserObservers {
    type Target = Element;

    fn observe(
        &self,
        target: &Element,
        options: &ObserverOptions,
        mut callback: EntryCallback,
    ) -> Result<Box<dyn ObserverHandle>> {
        let closure: ObserverClosure = Closure::wrap(Box::new(
            move |entries: js_sys::Array, _observer: IntersectionObserver| {
                for entry in entries.iter().filter_map(|value| to_entry(&value)) {
                    callback(entry);
                }
            },
        )
            as Box<dyn FnMut(js_sys::Array, IntersectionObserver)>);

        let init = IntersectionObserverInit::new();
        init.set_threshold(&wasm_bindgen::JsValue::from_f64(options.threshold));
        init.set_root_margin(&options.root_margin.to_css());

        let observer =
            IntersectionObserver::new_with_options(closure.as_ref().unchecked_ref(), &init)
                .map_err(|e| PlatformError::ObserverFailed(describe_js(&e)))?;
        observer.observe(target);

        Ok(Box::new(BrowserObserverHandle {
            observer,
            callback: Some(closure),
        }))
    }
}
