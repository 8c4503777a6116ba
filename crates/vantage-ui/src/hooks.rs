//! Reactive wrappers around the core gate

use leptos::html::Div;
use leptos::prelude::*;

use vantage_core::{GateConfig, IntersectionGate, VisibilityState};

use crate::platform::BrowserObservers;

/// Track whether `target` came near the viewport.
///
/// The gate attaches when the node mounts, re-attaches if the node is
/// replaced, releases its observer while the ref is unbound, and is torn
/// down with the owning component. An invalid
/// configuration is logged and the returned signal never changes.
pub fn use_intersection(target: NodeRef<Div>, config: GateConfig) -> ReadSignal<VisibilityState> {
    let (visibility, set_visibility) = signal(VisibilityState::default());

    let gate = match IntersectionGate::new(BrowserObservers, config) {
        Ok(gate) => gate,
        Err(error) => {
            web_sys::console::warn_1(&format!("visibility gate disabled: {error}").into());
            return visibility;
        }
    };
    gate.subscribe(Box::new(move |state| set_visibility.set(state)));
    let gate = StoredValue::new_local(gate);

    Effect::new(move |_| {
        let node = target.get();
        let element: Option<&web_sys::Element> = node.as_ref().map(AsRef::as_ref);
        if let Some(Err(error)) = gate.try_update_value(|gate| gate.attach_optional(element)) {
            web_sys::console::warn_1(&format!("visibility gate not attached: {error}").into());
        }
    });

    on_cleanup(move || {
        gate.try_update_value(IntersectionGate::detach);
    });

    visibility
}
