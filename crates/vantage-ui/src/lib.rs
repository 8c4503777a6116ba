//! Leptos 0.7 CSR components for viewport-gated media
//!
//! Browser shell over `vantage-core`: the state machines live in the core,
//! this crate supplies the platform objects and the reactive wiring.
//!
//! ## Module Structure
//! - `platform`: `IntersectionObserver`, idle scheduling, format probing and
//!   module fetching behind the core's capability traits
//! - `hooks`: `use_intersection`
//! - `components`: `<OptimizedImage/>` and `<DeferredHeavy/>`
//! - `app`, `pages`: the showcase application
//! - `error`: platform error types

#![forbid(unsafe_code)]

pub mod app;
pub mod components;
pub mod error;
pub mod hooks;
pub mod pages;
pub mod platform;

pub use app::App;
pub use components::{DeferredHeavy, OptimizedImage};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_structure() {
        let _app = App;
        let _image = OptimizedImage;
        let _home = pages::Home;
    }

    #[test]
    fn test_error_types() {
        use error::PlatformError;
        let err = PlatformError::IdleCallbackFailed("blocked".to_string());
        assert!(err.to_string().contains("idle callback"));
    }
}
