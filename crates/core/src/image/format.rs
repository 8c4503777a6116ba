//! Image formats and format negotiation.

use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::env::{FormatProbe, ProbeOutcome};
use crate::error::{Degradation, Error};

/// Representation an image source is served in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageFormat {
    Avif,
    Webp,
    /// Whatever format the original path points at.
    Original,
}

impl ImageFormat {
    /// Compressed formats, most preferred first.
    pub const RANKED: [Self; 2] = [Self::Avif, Self::Webp];

    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Avif => "avif",
            Self::Webp => "webp",
            Self::Original => "original",
        }
    }

    /// MIME type for `<source type=…>`; `None` for the original.
    #[must_use]
    pub const fn mime_type(self) -> Option<&'static str> {
        match self {
            Self::Avif => Some("image/avif"),
            Self::Webp => Some("image/webp"),
            Self::Original => None,
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for ImageFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "avif" => Ok(Self::Avif),
            "webp" => Ok(Self::Webp),
            "original" => Ok(Self::Original),
            other => Err(Error::UnknownFormat {
                tag: other.to_string(),
            }),
        }
    }
}

/// Pick the first format in `ranked` the probe accepts.
///
/// Probes run in rank order and stop at the first supported format. A probe
/// error counts as unsupported. Falls back to [`ImageFormat::Original`].
pub async fn negotiate_format<P: FormatProbe + ?Sized>(probe: &P, ranked: &[ImageFormat]) -> ImageFormat {
    for &format in ranked.iter().filter(|f| **f != ImageFormat::Original) {
        match probe.probe(format).await {
            ProbeOutcome::Supported => {
                debug!(%format, "format supported");
                return format;
            }
            ProbeOutcome::Unsupported => debug!(%format, "format unsupported"),
            ProbeOutcome::Error(reason) => {
                debug!(%format, degradation = %Degradation::CapabilityProbeFailure, %reason, "probe failed");
            }
        }
    }
    ImageFormat::Original
}

/// A probe answering from a fixed list, for offline planning.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SupportedFormats(Vec<ImageFormat>);

impl SupportedFormats {
    #[must_use]
    pub fn new(formats: impl IntoIterator<Item = ImageFormat>) -> Self {
        Self(formats.into_iter().collect())
    }

    /// Parse a comma separated list such as `"avif,webp"`.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnknownFormat` for an unrecognised tag.
    pub fn parse_list(list: &str) -> Result<Self, Error> {
        list.split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(str::parse)
            .collect::<Result<Vec<_>, _>>()
            .map(Self)
    }

    #[must_use]
    pub fn contains(&self, format: ImageFormat) -> bool {
        format == ImageFormat::Original || self.0.contains(&format)
    }
}

#[async_trait(?Send)]
impl FormatProbe for SupportedFormats {
    async fn probe(&self, format: ImageFormat) -> ProbeOutcome {
        if self.contains(format) {
            ProbeOutcome::Supported
        } else {
            ProbeOutcome::Unsupported
        }
    }
}
