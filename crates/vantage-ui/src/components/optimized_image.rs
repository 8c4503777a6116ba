//! Format-negotiating image component
//!
//! Reserves the declared box with a placeholder, waits for the visibility
//! gate (unless the image is priority or eager), negotiates a format, and
//! fades the image in once it has loaded. A failed source is retried once
//! with the original path; a second failure shows the error affordance and
//! calls `on_error`.

use leptos::html::Div;
use leptos::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::HtmlImageElement;

use vantage_core::image::{ImageNotice, LoadFailure, Placeholder, negotiate_format};
use vantage_core::{GateConfig, ImageDescriptor, ImageLoader, VantageConfig};

use crate::hooks::use_intersection;
use crate::platform::{self, probe};

/// Inline style for the wrapper: placeholder paint plus the reserved box.
#[must_use]
pub fn wrapper_style(descriptor: &ImageDescriptor) -> String {
    let mut style = descriptor.placeholder().css();
    if let Some(layout) = descriptor.placeholder_box() {
        style.push_str(&layout.css());
    }
    style
}

/// `loading` attribute for the rendered `<img>`.
#[must_use]
pub const fn loading_attr(descriptor: &ImageDescriptor) -> &'static str {
    if descriptor.is_priority() || !descriptor.is_lazy() {
        "eager"
    } else {
        "lazy"
    }
}

/// Image style for the current opacity.
#[must_use]
pub fn image_style(opacity: f64) -> String {
    format!("opacity:{opacity};")
}

#[derive(Clone, Copy)]
struct ImageSignals {
    url: RwSignal<Option<String>>,
    srcset: RwSignal<Option<String>>,
    opacity: RwSignal<f64>,
    errored: RwSignal<bool>,
}

impl ImageSignals {
    fn new() -> Self {
        Self {
            url: RwSignal::new(None),
            srcset: RwSignal::new(None),
            opacity: RwSignal::new(0.0),
            errored: RwSignal::new(false),
        }
    }

    fn sync(self, loader: StoredValue<ImageLoader, LocalStorage>) {
        loader.try_with_value(|loader| {
            self.url.set(loader.current_source().map(|source| source.url.clone()));
            self.srcset.set(loader.srcset());
            self.opacity.set(loader.opacity());
            self.errored.set(loader.is_errored());
        });
    }
}

fn rendered_src(event: &leptos::ev::Event) -> Option<String> {
    event_target::<HtmlImageElement>(event).get_attribute("src")
}

/// Viewport-gated, format-negotiating image
#[component]
pub fn OptimizedImage(
    #[prop(into)] src: String,
    #[prop(into, optional)] alt: String,
    #[prop(optional)] width: Option<u32>,
    #[prop(optional)] height: Option<u32>,
    #[prop(optional)] quality: Option<i64>,
    #[prop(optional)] priority: bool,
    #[prop(default = true)] lazy: bool,
    #[prop(into, optional)] sizes: Option<String>,
    #[prop(optional)] placeholder: Option<Placeholder>,
    #[prop(into, optional)] class: String,
    #[prop(optional)] on_load: Option<Callback<()>>,
    #[prop(optional)] on_error: Option<Callback<()>>,
) -> impl IntoView {
    let config = use_context::<VantageConfig>().unwrap_or_default();
    let quality = quality.unwrap_or_else(|| i64::from(config.image.default_quality));

    let described = ImageDescriptor::new(src, alt.clone()).and_then(|descriptor| {
        let descriptor = descriptor
            .with_quality(quality)
            .priority(priority)
            .lazy(lazy);
        let descriptor = match (width, height) {
            (Some(width), Some(height)) => descriptor.with_size(width, height)?,
            (Some(width), None) => descriptor.with_width(width)?,
            _ => descriptor,
        };
        let descriptor = match sizes {
            Some(sizes) => descriptor.with_sizes(sizes),
            None => descriptor,
        };
        Ok(match placeholder {
            Some(placeholder) => descriptor.with_placeholder(placeholder),
            None => descriptor,
        })
    });

    let descriptor = match described {
        Ok(descriptor) => descriptor,
        Err(error) => {
            web_sys::console::error_1(&format!("OptimizedImage: {error}").into());
            return view! {
                <div class=format!("vantage-image {class}")>
                    <div class="vantage-image-error" role="img" aria-label=alt.clone()>{alt}</div>
                </div>
            }
            .into_any();
        }
    };

    let node_ref = NodeRef::<Div>::new();
    let gate_config =
        GateConfig::from_settings(&config.gate).with_skip(descriptor.gate_satisfied(false));
    let visibility = use_intersection(node_ref, gate_config);

    let style = wrapper_style(&descriptor);
    let loading = loading_attr(&descriptor);
    let sizes = descriptor
        .sizes()
        .unwrap_or(&config.image.default_sizes)
        .to_string();
    let formats = config.image.formats.clone();
    let loader = StoredValue::new_local(ImageLoader::new(
        descriptor,
        config.image,
        platform::render_context(),
    ));
    let signals = ImageSignals::new();

    Effect::new(move |_| {
        let is_intersecting = visibility.get().is_intersecting;
        let started = loader
            .try_update_value(|loader| loader.begin(is_intersecting))
            .unwrap_or(false);
        if !started {
            return;
        }
        let formats = formats.clone();
        spawn_local(async move {
            let format = negotiate_format(&probe::shared(), &formats).await;
            let resolved = loader
                .try_update_value(|loader| loader.formats_resolved(format))
                .flatten();
            if resolved.is_some() {
                signals.sync(loader);
            }
        });
    });

    on_cleanup(move || {
        loader.try_with_value(ImageLoader::cancel);
    });

    let handle_load = move |event: leptos::ev::Event| {
        let Some(url) = rendered_src(&event) else {
            return;
        };
        let notice = loader
            .try_update_value(|loader| loader.load_succeeded(&url))
            .flatten();
        signals.sync(loader);
        if notice == Some(ImageNotice::Loaded) {
            if let Some(callback) = on_load {
                callback.run(());
            }
        }
    };

    let handle_error = move |event: leptos::ev::Event| {
        let Some(url) = rendered_src(&event) else {
            return;
        };
        let failure = loader
            .try_update_value(|loader| loader.load_failed(&url))
            .unwrap_or(LoadFailure::Ignored);
        match failure {
            LoadFailure::Retry(source) => {
                web_sys::console::warn_1(&format!("image failed, retrying {}", source.url).into());
                signals.sync(loader);
            }
            LoadFailure::Surfaced(_) => {
                signals.sync(loader);
                if let Some(callback) = on_error {
                    callback.run(());
                }
            }
            LoadFailure::Ignored => {}
        }
    };

    let image_alt = alt.clone();
    view! {
        <div node_ref=node_ref class=format!("vantage-image {class}") style=style>
            <Show
                when=move || !signals.errored.get()
                fallback=move || {
                    view! {
                        <div class="vantage-image-error" role="img" aria-label=alt.clone()>
                            {alt.clone()}
                        </div>
                    }
                }
            >
                <Show when=move || signals.url.with(Option::is_some)>
                    <img
                        src=move || signals.url.get()
                        srcset=move || signals.srcset.get()
                        sizes=sizes.clone()
                        alt=image_alt.clone()
                        width=width.map(|w| w.to_string())
                        height=height.map(|h| h.to_string())
                        loading=loading
                        decoding="async"
                        style=move || image_style(signals.opacity.get())
                        on:load=handle_load
                        on:error=handle_error
                    />
                </Show>
            </Show>
        </div>
    }
    .into_any()
}
