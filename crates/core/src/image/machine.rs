//! Per-descriptor image loading state machine.
//!
//! ```text
//! Idle -> ProbingFormats -> SourceResolved -> Displayed
//!                                 |
//!                                 +-> RetryingOriginal -> Displayed
//!                                             |
//!                                             +-> Errored
//! ```
//!
//! The first load failure is absorbed by one retry with the caller's path.
//! The second is surfaced once and is final.

use tracing::{debug, warn};

use crate::cancel::CancellationToken;
use crate::config::ImageSettings;
use crate::env::FormatProbe;
use crate::error::Degradation;
use crate::image::format::negotiate_format;
use crate::image::source::{build_candidates, resolve_source, CandidateSet, RenderContext, ResolvedSource};
use crate::image::{BoxSize, ImageDescriptor, ImageFormat};

/// Where one resolution cycle stands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePhase {
    /// Waiting for the gate; only the placeholder is shown.
    Idle,
    ProbingFormats,
    /// The negotiated source is loading.
    SourceResolved(ResolvedSource),
    /// The negotiated source failed; the original path is loading.
    RetryingOriginal(ResolvedSource),
    Displayed(ResolvedSource),
    /// Both attempts failed.
    Errored,
}

/// Notices for the caller's `on_load` / `on_error` hooks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageNotice {
    Loaded,
    Error,
}

/// What the renderer should do after a load failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadFailure {
    /// Swap to this source; the retry budget is now spent.
    Retry(ResolvedSource),
    /// Final failure: render the error affordance and notify the caller.
    Surfaced(ImageNotice),
    /// Stale or repeated event.
    Ignored,
}

/// Drives one [`ImageDescriptor`] through its resolution cycle.
#[derive(Debug)]
pub struct ImageLoader {
    descriptor: ImageDescriptor,
    settings: ImageSettings,
    context: Option<RenderContext>,
    phase: ImagePhase,
    candidates: Option<CandidateSet>,
    token: CancellationToken,
    retried: bool,
    load_notified: bool,
    error_notified: bool,
}

impl ImageLoader {
    #[must_use]
    pub fn new(
        descriptor: ImageDescriptor,
        settings: ImageSettings,
        context: Option<RenderContext>,
    ) -> Self {
        Self {
            descriptor,
            settings,
            context,
            phase: ImagePhase::Idle,
            candidates: None,
            token: CancellationToken::new(),
            retried: false,
            load_notified: false,
            error_notified: false,
        }
    }

    #[must_use]
    pub const fn descriptor(&self) -> &ImageDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub const fn phase(&self) -> &ImagePhase {
        &self.phase
    }

    /// Token shared with pending work; cancel it on unmount.
    #[must_use]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.token.clone()
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Start probing if the gate allows it.
    ///
    /// Returns `true` exactly once per cycle, when `Idle` moves to
    /// `ProbingFormats`.
    pub fn begin(&mut self, is_intersecting: bool) -> bool {
        if self.is_cancelled() || self.phase != ImagePhase::Idle {
            return false;
        }
        if !self.descriptor.gate_satisfied(is_intersecting) {
            return false;
        }
        debug!(path = self.descriptor.source_path(), "probing formats");
        self.phase = ImagePhase::ProbingFormats;
        true
    }

    /// Record the negotiated format and build the source to request.
    pub fn formats_resolved(&mut self, format: ImageFormat) -> Option<ResolvedSource> {
        if self.is_cancelled() || self.phase != ImagePhase::ProbingFormats {
            return None;
        }
        let source = resolve_source(&self.descriptor, &self.settings, format, self.context.as_ref());
        self.candidates = Some(build_candidates(
            &self.descriptor,
            &self.settings,
            format,
            self.context.as_ref(),
        ));
        debug!(url = %source.url, %format, "source resolved");
        self.phase = ImagePhase::SourceResolved(source.clone());
        Some(source)
    }

    /// Probe formats and resolve, if currently probing.
    pub async fn resolve_with<P: FormatProbe + ?Sized>(&mut self, probe: &P) -> Option<ResolvedSource> {
        if self.phase != ImagePhase::ProbingFormats {
            return None;
        }
        let format = negotiate_format(probe, &self.settings.formats).await;
        self.formats_resolved(format)
    }

    /// The source currently requested or shown.
    #[must_use]
    pub fn current_source(&self) -> Option<&ResolvedSource> {
        match &self.phase {
            ImagePhase::SourceResolved(source)
            | ImagePhase::RetryingOriginal(source)
            | ImagePhase::Displayed(source) => Some(source),
            ImagePhase::Idle | ImagePhase::ProbingFormats | ImagePhase::Errored => None,
        }
    }

    /// Responsive candidates; withdrawn once the original is being retried.
    #[must_use]
    pub fn srcset(&self) -> Option<String> {
        match &self.phase {
            ImagePhase::SourceResolved(_) => self.candidates.as_ref().map(CandidateSet::srcset),
            ImagePhase::Displayed(_) if !self.retried => {
                self.candidates.as_ref().map(CandidateSet::srcset)
            }
            _ => None,
        }
    }

    /// `sizes` attribute matching [`ImageLoader::srcset`].
    #[must_use]
    pub fn sizes(&self) -> &str {
        self.descriptor
            .sizes()
            .unwrap_or(&self.settings.default_sizes)
    }

    /// `0.0` until the displayed asset has loaded, then `1.0`.
    #[must_use]
    pub fn opacity(&self) -> f64 {
        match self.phase {
            ImagePhase::Displayed(_) => 1.0,
            _ => 0.0,
        }
    }

    /// Whether the placeholder should still be painted.
    #[must_use]
    pub fn shows_placeholder(&self) -> bool {
        !matches!(self.phase, ImagePhase::Displayed(_))
    }

    #[must_use]
    pub fn is_errored(&self) -> bool {
        matches!(self.phase, ImagePhase::Errored)
    }

    /// Box reserved for the placeholder and the final image alike.
    #[must_use]
    pub fn layout_box(&self) -> Option<BoxSize> {
        self.descriptor.placeholder_box()
    }

    /// The asset at `url` finished loading.
    ///
    /// Returns [`ImageNotice::Loaded`] the first time the current source
    /// loads; stale URLs and repeats return `None`.
    pub fn load_succeeded(&mut self, url: &str) -> Option<ImageNotice> {
        if self.is_cancelled() {
            return None;
        }
        let source = match &self.phase {
            ImagePhase::SourceResolved(source) | ImagePhase::RetryingOriginal(source)
                if source.url == url =>
            {
                source.clone()
            }
            _ => return None,
        };
        self.phase = ImagePhase::Displayed(source);
        if self.load_notified {
            return None;
        }
        self.load_notified = true;
        Some(ImageNotice::Loaded)
    }

    /// The asset at `url` failed to load.
    pub fn load_failed(&mut self, url: &str) -> LoadFailure {
        if self.is_cancelled() {
            return LoadFailure::Ignored;
        }
        match &self.phase {
            ImagePhase::SourceResolved(source) if source.url == url => {
                warn!(
                    degradation = %Degradation::SourceLoadFailure,
                    url,
                    "negotiated source failed, retrying original"
                );
                let original = ResolvedSource::original(&self.descriptor);
                self.retried = true;
                self.phase = ImagePhase::RetryingOriginal(original.clone());
                LoadFailure::Retry(original)
            }
            ImagePhase::RetryingOriginal(source) if source.url == url => {
                warn!(
                    degradation = %Degradation::SourceLoadFailure,
                    url,
                    "original source failed"
                );
                self.phase = ImagePhase::Errored;
                if self.error_notified {
                    LoadFailure::Ignored
                } else {
                    self.error_notified = true;
                    LoadFailure::Surfaced(ImageNotice::Error)
                }
            }
            _ => LoadFailure::Ignored,
        }
    }
}
