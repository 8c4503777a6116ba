//! Showcase page: a priority hero, a lazy gallery and a deferred module

use leptos::prelude::*;

use crate::components::{DeferredHeavy, OptimizedImage};
use crate::platform::DynamicImport;

/// Gallery entries: path, alt text, intrinsic width and height.
pub const GALLERY: [(&str, &str, u32, u32); 4] = [
    ("/images/coast.jpg", "Rocky coastline at dusk", 800, 533),
    ("/images/forest.jpg", "Fog over a pine forest", 800, 533),
    ("/images/desert.jpg", "Dunes under a clear sky", 800, 600),
    ("/images/harbor.jpg", "Fishing boats in a harbor", 800, 450),
];

/// Module shown in the deferred section.
pub const GLOBE_MODULE: &str = "/heavy/globe.js";

/// Home page component
#[component]
pub fn Home() -> impl IntoView {
    let (loaded, set_loaded) = signal(0_usize);
    let (failed, set_failed) = signal(0_usize);
    let on_load = Callback::new(move |()| set_loaded.update(|n| *n = n.saturating_add(1)));
    let on_error = Callback::new(move |()| set_failed.update(|n| *n = n.saturating_add(1)));

    view! {
        <div class="home-page">
            <h1>"Vantage"</h1>
            <OptimizedImage
                src="/images/hero.jpg"
                alt="Mountain range at sunrise"
                width=1200
                height=600
                priority=true
                sizes="100vw"
                on_load=on_load
                on_error=on_error
            />
            <p class="load-stats">
                {move || format!("{} loaded, {} failed", loaded.get(), failed.get())}
            </p>

            <div class="spacer"></div>

            <section class="gallery">
                {GALLERY
                    .iter()
                    .map(|&(src, alt, width, height)| {
                        view! {
                            <OptimizedImage
                                src=src
                                alt=alt
                                width=width
                                height=height
                                sizes="(max-width: 600px) 100vw, 50vw"
                                on_load=on_load
                                on_error=on_error
                            />
                        }
                    })
                    .collect_view()}
            </section>

            <div class="spacer"></div>

            <DeferredHeavy
                fetcher=DynamicImport::new(GLOBE_MODULE)
                render=|_module| view! { <div id="globe" class="globe-ready">"Globe ready"</div> }
                poster=|| view! { <div class="globe-poster">"Interactive globe"</div> }
            />
        </div>
    }
}
