//! Image manifests: a TOML list of `[[image]]` tables.
//!
//! ```toml
//! [[image]]
//! path = "/hero.jpg"
//! alt = "Team at work"
//! width = 1200
//! height = 600
//! priority = true
//! ```

use std::path::Path;

use serde::Deserialize;

use vantage_core::config::ImageSettings;
use vantage_core::{Error, ImageDescriptor, Result};

/// One `[[image]]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManifestEntry {
    pub path: String,
    #[serde(default)]
    pub alt: String,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub quality: Option<i64>,
    #[serde(default)]
    pub priority: bool,
    pub lazy: Option<bool>,
    pub sizes: Option<String>,
}

impl ManifestEntry {
    /// Build the descriptor, filling the quality from `settings`.
    ///
    /// # Errors
    ///
    /// Returns the descriptor's construction error, or
    /// `Error::InvalidConfig` for a height without a width.
    pub fn to_descriptor(&self, settings: &ImageSettings) -> Result<ImageDescriptor> {
        let quality = self
            .quality
            .unwrap_or_else(|| i64::from(settings.default_quality));
        let descriptor = ImageDescriptor::new(self.path.clone(), self.alt.clone())?
            .with_quality(quality)
            .priority(self.priority)
            .lazy(self.lazy.unwrap_or(true));

        let descriptor = match (self.width, self.height) {
            (Some(width), Some(height)) => descriptor.with_size(width, height)?,
            (Some(width), None) => descriptor.with_width(width)?,
            (None, Some(_)) => {
                return Err(Error::invalid_config(format!(
                    "image '{}' declares a height without a width",
                    self.path
                )));
            }
            (None, None) => descriptor,
        };

        Ok(match &self.sizes {
            Some(sizes) => descriptor.with_sizes(sizes.clone()),
            None => descriptor,
        })
    }
}

/// A parsed manifest.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    #[serde(default, rename = "image")]
    pub images: Vec<ManifestEntry>,
}

impl Manifest {
    /// # Errors
    ///
    /// Returns `Error::TomlParseFailed` for malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::toml_parse_failed(e.to_string()))
    }

    /// # Errors
    ///
    /// Returns `Error::FileReadFailed` if the file cannot be read, otherwise
    /// the errors of [`Manifest::from_toml_str`].
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::file_read_failed(path, e.to_string()))?;
        Self::from_toml_str(&text)
    }

    /// Descriptors for every entry, failing on the first invalid one.
    ///
    /// # Errors
    ///
    /// Returns the first entry's construction error.
    pub fn descriptors(&self, settings: &ImageSettings) -> Result<Vec<ImageDescriptor>> {
        self.images
            .iter()
            .map(|entry| entry.to_descriptor(settings))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_parses_entries_with_defaults() {
        let manifest = Manifest::from_toml_str(
            r#"
            [[image]]
            path = "/hero.jpg"
            alt = "Hero"
            width = 1200
            height = 600
            priority = true

            [[image]]
            path = "/thumb.png"
            "#,
        )
        .unwrap();
        assert_eq!(manifest.images.len(), 2);

        let descriptors = manifest.descriptors(&ImageSettings::default()).unwrap();
        let hero = descriptors.first().unwrap();
        assert!(hero.is_priority());
        assert_eq!(hero.intrinsic_height(), Some(600));

        let thumb = descriptors.get(1).unwrap();
        assert!(thumb.is_lazy());
        assert_eq!(thumb.quality_hint(), 75);
        assert_eq!(thumb.alt_text(), "");
    }

    #[test]
    fn test_quality_falls_back_to_settings() {
        let settings = ImageSettings {
            default_quality: 60,
            ..ImageSettings::default()
        };
        let entry = ManifestEntry {
            path: "/a.jpg".into(),
            alt: String::new(),
            width: None,
            height: None,
            quality: None,
            priority: false,
            lazy: Some(false),
            sizes: Some("50vw".into()),
        };
        let descriptor = entry.to_descriptor(&settings).unwrap();
        assert_eq!(descriptor.quality_hint(), 60);
        assert!(!descriptor.is_lazy());
        assert_eq!(descriptor.sizes(), Some("50vw"));
    }

    #[test]
    fn test_rejects_bad_entries() {
        assert!(Manifest::from_toml_str("[[image]]\npath = \"/a.jpg\"\ncolour = 1\n").is_err());

        let manifest = Manifest::from_toml_str("[[image]]\npath = \"/a.jpg\"\nheight = 10\n").unwrap();
        assert!(matches!(
            manifest.descriptors(&ImageSettings::default()),
            Err(Error::InvalidConfig { .. })
        ));

        let manifest = Manifest::from_toml_str("[[image]]\npath = \"\"\n").unwrap();
        assert!(matches!(
            manifest.descriptors(&ImageSettings::default()),
            Err(Error::EmptySourcePath)
        ));
    }

    #[test]
    fn test_empty_manifest() {
        assert_eq!(Manifest::from_toml_str("").unwrap(), Manifest::default());
    }
}
