//! Configuration loaded from TOML.
//!
//! Every field has a default, so an empty file is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::image::ImageFormat;
use crate::margin::RootMargin;
use crate::result::Result;

/// Standard responsive widths offered when no explicit width is known.
pub const DEFAULT_STANDARD_WIDTHS: [u32; 8] = [640, 750, 828, 1080, 1200, 1920, 2048, 3840];

/// Default quality hint for descriptors that do not set one.
pub const DEFAULT_QUALITY: u8 = 75;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VantageConfig {
    pub gate: GateSettings,
    pub image: ImageSettings,
    pub deferred: DeferredSettings,
}

/// Defaults for image visibility gates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GateSettings {
    pub threshold: f64,
    pub root_margin: RootMargin,
    pub trigger_once: bool,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            threshold: 0.1,
            root_margin: RootMargin::zero(),
            trigger_once: true,
        }
    }
}

/// Source negotiation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImageSettings {
    pub default_quality: u8,
    /// Compressed formats, most preferred first.
    pub formats: Vec<ImageFormat>,
    pub standard_widths: Vec<u32>,
    pub default_sizes: String,
    pub quality_param: String,
    pub width_param: String,
    pub format_param: String,
}

impl Default for ImageSettings {
    fn default() -> Self {
        Self {
            default_quality: DEFAULT_QUALITY,
            formats: ImageFormat::RANKED.to_vec(),
            standard_widths: DEFAULT_STANDARD_WIDTHS.to_vec(),
            default_sizes: "100vw".to_string(),
            quality_param: "quality".to_string(),
            width_param: "w".to_string(),
            format_param: "format".to_string(),
        }
    }
}

/// Settings for deferred heavy modules.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DeferredSettings {
    /// Pre-emptive margin so modules load slightly before they are seen.
    pub root_margin: RootMargin,
    pub threshold: f64,
}

impl Default for DeferredSettings {
    fn default() -> Self {
        Self {
            root_margin: RootMargin::px(200.0),
            threshold: 0.0,
        }
    }
}

impl VantageConfig {
    /// Parse and validate a TOML document.
    ///
    /// # Errors
    ///
    /// Returns `Error::TomlParseFailed` for malformed TOML or unknown keys and
    /// `Error::InvalidConfig` when a value is out of range.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| Error::toml_parse_failed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    ///
    /// # Errors
    ///
    /// Returns `Error::FileReadFailed` if the file cannot be read, otherwise
    /// the errors of [`VantageConfig::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::file_read_failed(path, e.to_string()))?;
        Self::from_toml_str(&text)
    }

    /// Check value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` describing the first offending field.
    pub fn validate(&self) -> Result<()> {
        check_threshold("gate.threshold", self.gate.threshold)?;
        check_threshold("deferred.threshold", self.deferred.threshold)?;

        let image = &self.image;
        if !(1..=100).contains(&image.default_quality) {
            return Err(Error::invalid_config(format!(
                "image.default_quality must be in 1..=100, got {}",
                image.default_quality
            )));
        }
        if image.formats.contains(&ImageFormat::Original) {
            return Err(Error::invalid_config(
                "image.formats lists compressed formats only; 'original' is always the fallback",
            ));
        }
        if image.standard_widths.is_empty() || image.standard_widths.contains(&0) {
            return Err(Error::invalid_config(
                "image.standard_widths must be a non-empty list of positive widths",
            ));
        }
        let widths = &image.standard_widths;
        if widths.iter().zip(widths.iter().skip(1)).any(|(a, b)| a >= b) {
            return Err(Error::invalid_config(
                "image.standard_widths must be strictly ascending",
            ));
        }

        let (quality, width, format) = (
            &image.quality_param,
            &image.width_param,
            &image.format_param,
        );
        if quality.is_empty() || width.is_empty() || format.is_empty() {
            return Err(Error::invalid_config("query parameter names must not be empty"));
        }
        if quality == width || quality == format || width == format {
            return Err(Error::invalid_config("query parameter names must be distinct"));
        }

        Ok(())
    }
}

fn check_threshold(field: &str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::invalid_config(format!(
            "{field} must be a fraction in [0, 1], got {value}"
        )))
    }
}
