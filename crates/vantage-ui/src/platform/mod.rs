//! Browser implementations of the core capability traits
//!
//! - [`BrowserObservers`]: `IntersectionObserver`
//! - [`BrowserScheduler`]: `requestIdleCallback`, falling back to a zero timeout
//! - [`BrowserFormatProbe`]: decodes tiny AVIF/WebP samples
//! - [`DynamicImport`] / [`FutureFetcher`]: deferred module sources

pub mod fetch;
pub mod idle;
pub mod observer;
pub mod probe;

pub use fetch::{DynamicImport, FutureFetcher};
pub use idle::BrowserScheduler;
pub use observer::BrowserObservers;
pub use probe::BrowserFormatProbe;

/// Current viewport width and device pixel ratio, if a window exists.
#[must_use]
pub fn render_context() -> Option<vantage_core::image::RenderContext> {
    let window = web_sys::window()?;
    let width = window.inner_width().ok()?.as_f64()?;
    if !width.is_finite() || width <= 0.0 || width > f64::from(u32::MAX) {
        return None;
    }
    // Range checked above.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let viewport_width = width as u32;
    Some(vantage_core::image::RenderContext {
        viewport_width,
        device_pixel_ratio: window.device_pixel_ratio(),
    })
}
