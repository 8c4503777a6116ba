//! # vantage-core
//!
//! Platform-free loading logic for viewport-gated media:
//!
//! - [`gate`]: an intersection gate that reports, once or continuously,
//!   whether an element came near the viewport.
//! - [`image`]: format negotiation, query-parameter layering, responsive
//!   candidates and the single-retry image load state machine.
//! - [`deferred`]: mount- and viewport-gated loading of optional heavy
//!   modules with a permanent poster fallback.
//!
//! Platform objects are reached only through the traits in [`env`], so every
//! state machine here runs natively under test doubles.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod cancel;
pub mod config;
pub mod deferred;
pub mod env;
pub mod error;
pub mod gate;
pub mod image;
pub mod margin;
pub mod result;

pub use cancel::CancellationToken;
pub use config::VantageConfig;
pub use deferred::{DeferredModule, DeferredModuleState, DeferredPhase};
pub use error::{Degradation, Error, FetchError};
pub use gate::{GateConfig, IntersectionGate, VisibilityState};
pub use image::{ImageDescriptor, ImageFormat, ImageLoader, ImagePhase, ResolvedSource};
pub use margin::RootMargin;
pub use result::{DegradeExt, Result};
