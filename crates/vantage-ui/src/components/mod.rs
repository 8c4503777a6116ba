//! Leptos components for viewport-gated media

pub mod deferred_heavy;
pub mod optimized_image;

pub use deferred_heavy::DeferredHeavy;
pub use optimized_image::OptimizedImage;
