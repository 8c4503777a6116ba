//! Format-negotiating image resolution.

pub mod descriptor;
pub mod format;
pub mod machine;
pub mod plan;
pub mod source;
pub mod url;

pub use descriptor::{BoxSize, ImageDescriptor, Placeholder};
pub use format::{negotiate_format, ImageFormat, SupportedFormats};
pub use machine::{ImageLoader, ImageNotice, ImagePhase, LoadFailure};
pub use plan::{ImagePlan, PlannedSource, PreloadHint};
pub use source::{CandidateSet, RenderContext, ResolvedSource};
