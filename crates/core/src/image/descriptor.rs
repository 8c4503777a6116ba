//! Caller-supplied description of one image.

use serde::{Deserialize, Serialize};

use crate::config::DEFAULT_QUALITY;
use crate::error::Error;
use crate::result::Result;

/// Neutral tone shown before any source resolves.
pub const DEFAULT_PLACEHOLDER_COLOR: &str = "#e5e7eb";

/// Stand-in rendered in the image's box while it resolves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Placeholder {
    /// A CSS color.
    Solid(String),
    /// A tiny blurred data URL.
    Blurred(String),
}

impl Default for Placeholder {
    fn default() -> Self {
        Self::Solid(DEFAULT_PLACEHOLDER_COLOR.to_string())
    }
}

impl Placeholder {
    /// Inline CSS painting the placeholder.
    #[must_use]
    pub fn css(&self) -> String {
        match self {
            Self::Solid(color) => format!("background-color:{color};"),
            Self::Blurred(url) => format!(
                "background-image:url(\"{url}\");background-size:cover;filter:blur(20px);"
            ),
        }
    }
}

/// Declared box of an image, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxSize {
    pub width: u32,
    pub height: u32,
}

impl BoxSize {
    /// Inline CSS reserving the box.
    #[must_use]
    pub fn css(self) -> String {
        format!(
            "width:{}px;height:{}px;aspect-ratio:{} / {};",
            self.width, self.height, self.width, self.height
        )
    }
}

/// Immutable description of an image; a new descriptor means a new
/// resolution cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageDescriptor {
    source_path: String,
    alt_text: String,
    intrinsic_width: Option<u32>,
    intrinsic_height: Option<u32>,
    quality_hint: u8,
    is_priority: bool,
    lazy: bool,
    sizes: Option<String>,
    placeholder: Placeholder,
}

impl ImageDescriptor {
    /// Describe a lazy, non-priority image at default quality.
    ///
    /// # Errors
    ///
    /// Returns `Error::EmptySourcePath` for an empty or blank path.
    pub fn new(source_path: impl Into<String>, alt_text: impl Into<String>) -> Result<Self> {
        let source_path = source_path.into();
        if source_path.trim().is_empty() {
            return Err(Error::EmptySourcePath);
        }
        Ok(Self {
            source_path,
            alt_text: alt_text.into(),
            intrinsic_width: None,
            intrinsic_height: None,
            quality_hint: DEFAULT_QUALITY,
            is_priority: false,
            lazy: true,
            sizes: None,
            placeholder: Placeholder::default(),
        })
    }

    /// Set the explicit intrinsic width.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidWidth` for zero.
    pub fn with_width(mut self, width: u32) -> Result<Self> {
        if width == 0 {
            return Err(Error::InvalidWidth { value: width });
        }
        self.intrinsic_width = Some(width);
        Ok(self)
    }

    /// Set both intrinsic dimensions.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidWidth` if either dimension is zero.
    pub fn with_size(self, width: u32, height: u32) -> Result<Self> {
        if height == 0 {
            return Err(Error::InvalidWidth { value: height });
        }
        let mut sized = self.with_width(width)?;
        sized.intrinsic_height = Some(height);
        Ok(sized)
    }

    /// Set the quality hint, clamped into `1..=100`.
    #[must_use]
    pub fn with_quality(mut self, quality: i64) -> Self {
        self.quality_hint = u8::try_from(quality.clamp(1, 100)).unwrap_or(DEFAULT_QUALITY);
        self
    }

    #[must_use]
    pub fn priority(mut self, is_priority: bool) -> Self {
        self.is_priority = is_priority;
        self
    }

    #[must_use]
    pub fn lazy(mut self, lazy: bool) -> Self {
        self.lazy = lazy;
        self
    }

    #[must_use]
    pub fn with_sizes(mut self, sizes: impl Into<String>) -> Self {
        self.sizes = Some(sizes.into());
        self
    }

    #[must_use]
    pub fn with_placeholder(mut self, placeholder: Placeholder) -> Self {
        self.placeholder = placeholder;
        self
    }

    #[must_use]
    pub fn source_path(&self) -> &str {
        &self.source_path
    }

    #[must_use]
    pub fn alt_text(&self) -> &str {
        &self.alt_text
    }

    #[must_use]
    pub const fn intrinsic_width(&self) -> Option<u32> {
        self.intrinsic_width
    }

    #[must_use]
    pub const fn intrinsic_height(&self) -> Option<u32> {
        self.intrinsic_height
    }

    #[must_use]
    pub const fn quality_hint(&self) -> u8 {
        self.quality_hint
    }

    #[must_use]
    pub const fn is_priority(&self) -> bool {
        self.is_priority
    }

    #[must_use]
    pub const fn is_lazy(&self) -> bool {
        self.lazy
    }

    #[must_use]
    pub fn sizes(&self) -> Option<&str> {
        self.sizes.as_deref()
    }

    #[must_use]
    pub const fn placeholder(&self) -> &Placeholder {
        &self.placeholder
    }

    /// Whether resolution may begin given the gate's current answer.
    #[must_use]
    pub const fn gate_satisfied(&self, is_intersecting: bool) -> bool {
        self.is_priority || !self.lazy || is_intersecting
    }

    /// Box the placeholder must occupy; known only when both dimensions are.
    #[must_use]
    pub fn placeholder_box(&self) -> Option<BoxSize> {
        self.intrinsic_width
            .zip(self.intrinsic_height)
            .map(|(width, height)| BoxSize { width, height })
    }
}
