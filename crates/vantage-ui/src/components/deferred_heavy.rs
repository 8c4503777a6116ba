//! Deferred heavy module component
//!
//! Renders a poster until the host has mounted and the poster is within the
//! pre-emptive margin of the viewport, then fetches the module off the
//! critical path. A failed fetch keeps the poster.

use leptos::html::Div;
use leptos::prelude::*;

use vantage_core::env::ModuleFetcher;
use vantage_core::{DeferredModule, DeferredPhase, VantageConfig};

use crate::hooks::use_intersection;
use crate::platform::BrowserScheduler;

/// `data-phase` attribute value, used by styles and tests.
#[must_use]
pub fn phase_attr(phase: DeferredPhase) -> String {
    phase.to_string()
}

/// Poster until near the viewport, then the rendered module
#[component]
pub fn DeferredHeavy<F, R, V>(
    /// Where the module comes from
    fetcher: F,
    /// Renders the loaded module
    render: R,
    /// Shown until the module has loaded, and for good if it fails
    #[prop(optional, into)]
    poster: ViewFn,
    #[prop(into, optional)] class: String,
) -> impl IntoView
where
    F: ModuleFetcher + 'static,
    F::Module: Clone + 'static,
    R: Fn(F::Module) -> V + Send + Sync + 'static,
    V: IntoView + 'static,
{
    let config = use_context::<VantageConfig>().unwrap_or_default();
    let node_ref = NodeRef::<Div>::new();
    let visibility = use_intersection(
        node_ref,
        DeferredModule::<BrowserScheduler, F>::gate_config(&config.deferred),
    );

    let module = DeferredModule::new(BrowserScheduler, fetcher);
    let (phase, set_phase) = signal(module.phase());
    module.subscribe(Box::new(move |next| set_phase.set(next)));
    let module = StoredValue::new_local(module);

    // Effects run after the first commit.
    Effect::new(move |_| {
        module.try_with_value(DeferredModule::mark_mounted);
    });

    Effect::new(move |_| {
        let state = visibility.get();
        module.try_with_value(|module| module.on_visibility(state));
    });

    on_cleanup(move || {
        module.try_with_value(DeferredModule::unmount);
    });

    view! {
        <div
            node_ref=node_ref
            class=format!("vantage-deferred {class}")
            data-phase=move || phase_attr(phase.get())
        >
            {move || {
                let loaded = (phase.get() == DeferredPhase::Loaded)
                    .then(|| module.try_with_value(DeferredModule::module).flatten())
                    .flatten();
                match loaded {
                    Some(handle) => render(handle).into_any(),
                    None => poster.run(),
                }
            }}
        </div>
    }
}
