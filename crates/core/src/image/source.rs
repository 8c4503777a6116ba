//! Resolved sources and responsive candidate sets.

use serde::Serialize;

use crate::config::ImageSettings;
use crate::image::url::build_source_url;
use crate::image::{ImageDescriptor, ImageFormat};

/// Where the image will be drawn, used to avoid over-sized widths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RenderContext {
    pub viewport_width: u32,
    pub device_pixel_ratio: f64,
}

impl RenderContext {
    /// Physical pixels needed to fill the viewport width.
    #[must_use]
    pub fn required_width(&self) -> u32 {
        let ratio = if self.device_pixel_ratio.is_finite() && self.device_pixel_ratio > 0.0 {
            self.device_pixel_ratio
        } else {
            1.0
        };
        let needed = (f64::from(self.viewport_width) * ratio).ceil();
        if needed >= f64::from(u32::MAX) {
            u32::MAX
        } else {
            // Non-negative and below u32::MAX after the checks above.
            #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
            let needed = needed.max(1.0) as u32;
            needed
        }
    }
}

/// The one URL currently chosen for a descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSource {
    pub url: String,
    pub format: ImageFormat,
}

impl ResolvedSource {
    /// The caller's path, untouched.
    #[must_use]
    pub fn original(descriptor: &ImageDescriptor) -> Self {
        Self {
            url: descriptor.source_path().to_string(),
            format: ImageFormat::Original,
        }
    }
}

/// How a candidate advertises itself in `srcset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum CandidateDescriptor {
    /// Pixel density, `1x` or `2x`.
    Density(u8),
    /// Intrinsic width, `640w`.
    Width(u32),
}

/// One responsive candidate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Candidate {
    pub url: String,
    pub width: u32,
    pub descriptor: CandidateDescriptor,
}

/// All candidates for one format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateSet {
    pub format: ImageFormat,
    pub candidates: Vec<Candidate>,
}

impl CandidateSet {
    /// Render as a `srcset` attribute value.
    #[must_use]
    pub fn srcset(&self) -> String {
        self.candidates
            .iter()
            .map(|candidate| match candidate.descriptor {
                CandidateDescriptor::Density(density) => format!("{} {density}x", candidate.url),
                CandidateDescriptor::Width(width) => format!("{} {width}w", candidate.url),
            })
            .collect::<Vec<_>>()
            .join(", ")
    }

    #[must_use]
    pub fn largest(&self) -> Option<&Candidate> {
        self.candidates.iter().max_by_key(|candidate| candidate.width)
    }
}

/// Widths to offer for an image.
///
/// An explicit width `w` yields `w` and `2w` as density candidates. Otherwise
/// the standard widths are offered up to and including the first one that
/// covers the rendering context.
#[must_use]
pub fn candidate_widths(
    explicit_width: Option<u32>,
    standard_widths: &[u32],
    context: Option<&RenderContext>,
) -> Vec<(u32, CandidateDescriptor)> {
    if let Some(width) = explicit_width {
        let double = width.saturating_mul(2);
        let mut widths = vec![(width, CandidateDescriptor::Density(1))];
        if double != width {
            widths.push((double, CandidateDescriptor::Density(2)));
        }
        return widths;
    }

    let limit = context.map(RenderContext::required_width);
    let mut widths = Vec::with_capacity(standard_widths.len());
    for &width in standard_widths {
        widths.push((width, CandidateDescriptor::Width(width)));
        if limit.is_some_and(|limit| width >= limit) {
            break;
        }
    }
    widths
}

/// The single width used for the primary source URL.
#[must_use]
pub fn target_width(
    explicit_width: Option<u32>,
    standard_widths: &[u32],
    context: Option<&RenderContext>,
) -> Option<u32> {
    explicit_width.or_else(|| {
        let needed = context?.required_width();
        standard_widths
            .iter()
            .copied()
            .find(|width| *width >= needed)
            .or_else(|| standard_widths.last().copied())
    })
}

/// Build the primary source for `format`.
#[must_use]
pub fn resolve_source(
    descriptor: &ImageDescriptor,
    settings: &ImageSettings,
    format: ImageFormat,
    context: Option<&RenderContext>,
) -> ResolvedSource {
    let width = target_width(
        descriptor.intrinsic_width(),
        &settings.standard_widths,
        context,
    );
    ResolvedSource {
        url: build_source_url(
            descriptor.source_path(),
            settings,
            format,
            descriptor.quality_hint(),
            width,
        ),
        format,
    }
}

/// Build the responsive candidate set for `format`.
#[must_use]
pub fn build_candidates(
    descriptor: &ImageDescriptor,
    settings: &ImageSettings,
    format: ImageFormat,
    context: Option<&RenderContext>,
) -> CandidateSet {
    let candidates = candidate_widths(
        descriptor.intrinsic_width(),
        &settings.standard_widths,
        context,
    )
    .into_iter()
    .map(|(width, descriptor_kind)| Candidate {
        url: build_source_url(
            descriptor.source_path(),
            settings,
            format,
            descriptor.quality_hint(),
            Some(width),
        ),
        width,
        descriptor: descriptor_kind,
    })
    .collect();

    CandidateSet { format, candidates }
}
