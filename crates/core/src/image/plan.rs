//! Offline `<picture>` planning for a known set of supported formats.
//!
//! Used where the negotiation has to happen ahead of time, such as
//! prerendered markup and preload hints for priority images.

use serde::Serialize;

use crate::config::ImageSettings;
use crate::image::format::SupportedFormats;
use crate::image::source::{build_candidates, resolve_source, RenderContext};
use crate::image::{BoxSize, ImageDescriptor, ImageFormat};

/// One `<source>` element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedSource {
    pub format: ImageFormat,
    pub mime_type: &'static str,
    pub srcset: String,
}

/// Data for `<link rel="preload" as="image">`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreloadHint {
    pub href: String,
    pub imagesrcset: String,
    pub imagesizes: String,
    pub mime_type: Option<&'static str>,
}

/// Everything needed to render one image without runtime negotiation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImagePlan {
    pub path: String,
    pub alt: String,
    /// Compressed sources, most preferred first.
    pub sources: Vec<PlannedSource>,
    pub fallback_src: String,
    pub fallback_srcset: String,
    pub sizes: String,
    pub layout_box: Option<BoxSize>,
    pub placeholder_css: String,
    pub loading: &'static str,
    pub fetch_priority: &'static str,
    pub preload: Option<PreloadHint>,
}

impl ImagePlan {
    /// Plan `descriptor` for clients supporting `supported`.
    #[must_use]
    pub fn build(
        descriptor: &ImageDescriptor,
        settings: &ImageSettings,
        supported: &SupportedFormats,
        context: Option<&RenderContext>,
    ) -> Self {
        let sizes = descriptor
            .sizes()
            .unwrap_or(&settings.default_sizes)
            .to_string();

        let sources: Vec<PlannedSource> = settings
            .formats
            .iter()
            .copied()
            .filter(|format| supported.contains(*format))
            .filter_map(|format| {
                format.mime_type().map(|mime_type| PlannedSource {
                    format,
                    mime_type,
                    srcset: build_candidates(descriptor, settings, format, context).srcset(),
                })
            })
            .collect();

        let fallback = resolve_source(descriptor, settings, ImageFormat::Original, context);
        let fallback_srcset =
            build_candidates(descriptor, settings, ImageFormat::Original, context).srcset();

        let preload = descriptor.is_priority().then(|| {
            let best = sources.first().map_or(ImageFormat::Original, |s| s.format);
            PreloadHint {
                href: resolve_source(descriptor, settings, best, context).url,
                imagesrcset: sources
                    .first()
                    .map_or_else(|| fallback_srcset.clone(), |s| s.srcset.clone()),
                imagesizes: sizes.clone(),
                mime_type: best.mime_type(),
            }
        });

        let eager = descriptor.is_priority() || !descriptor.is_lazy();

        Self {
            path: descriptor.source_path().to_string(),
            alt: descriptor.alt_text().to_string(),
            sources,
            fallback_src: fallback.url,
            fallback_srcset,
            sizes,
            layout_box: descriptor.placeholder_box(),
            placeholder_css: descriptor.placeholder().css(),
            loading: if eager { "eager" } else { "lazy" },
            fetch_priority: if descriptor.is_priority() { "high" } else { "auto" },
            preload,
        }
    }

    /// Render `<picture>` markup.
    #[must_use]
    pub fn to_html(&self) -> String {
        let mut html = String::from("<picture>");
        for source in &self.sources {
            html.push_str(&format!(
                "<source type=\"{}\" srcset=\"{}\" sizes=\"{}\">",
                source.mime_type,
                escape_attr(&source.srcset),
                escape_attr(&self.sizes)
            ));
        }

        let mut style = self.placeholder_css.clone();
        let mut dimensions = String::new();
        if let Some(layout) = self.layout_box {
            style.push_str(&layout.css());
            dimensions = format!(" width=\"{}\" height=\"{}\"", layout.width, layout.height);
        }

        html.push_str(&format!(
            "<img src=\"{}\" srcset=\"{}\" sizes=\"{}\" alt=\"{}\" loading=\"{}\" fetchpriority=\"{}\" decoding=\"async\"{} style=\"{}\">",
            escape_attr(&self.fallback_src),
            escape_attr(&self.fallback_srcset),
            escape_attr(&self.sizes),
            escape_attr(&self.alt),
            self.loading,
            self.fetch_priority,
            dimensions,
            escape_attr(&style),
        ));
        html.push_str("</picture>");
        html
    }

    /// Render the preload `<link>`, for priority images only.
    #[must_use]
    pub fn preload_html(&self) -> Option<String> {
        self.preload.as_ref().map(|hint| {
            let mime = hint
                .mime_type
                .map(|mime| format!(" type=\"{mime}\""))
                .unwrap_or_default();
            format!(
                "<link rel=\"preload\" as=\"image\" href=\"{}\" imagesrcset=\"{}\" imagesizes=\"{}\"{}>",
                escape_attr(&hint.href),
                escape_attr(&hint.imagesrcset),
                escape_attr(&hint.imagesizes),
                mime
            )
        })
    }
}

fn escape_attr(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '"' => escaped.push_str("&quot;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            other => escaped.push(other),
        }
    }
    escaped
}
