//! CLI command handlers.
//!
//! Each handler returns the text to print so it can be tested without a
//! process boundary.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use std::path::Path;

use anyhow::{Context, Result};
use futures::executor::block_on;
use serde::Serialize;
use tracing::{debug, info};

use vantage_core::image::source::build_candidates;
use vantage_core::image::{
    BoxSize, CandidateSet, ImagePlan, RenderContext, ResolvedSource, SupportedFormats,
};
use vantage_core::{ImageDescriptor, ImageLoader, VantageConfig};

use crate::cli::{Commands, ResolveArgs};
use crate::manifest::Manifest;

/// Output of `vantage resolve`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolveReport {
    pub path: String,
    /// Source requested first.
    pub source: ResolvedSource,
    /// Source requested once if the first one fails.
    pub fallback: ResolvedSource,
    pub srcset: Option<String>,
    pub sizes: String,
    pub candidates: CandidateSet,
    pub layout_box: Option<BoxSize>,
}

/// Execute a CLI command and return what should be printed.
///
/// # Errors
///
/// Returns an error when an input file cannot be read or is invalid.
pub fn execute_command(command: Commands) -> Result<String> {
    match command {
        Commands::Resolve(args) => cmd_resolve(&args),
        Commands::Manifest {
            manifest,
            supports,
            config,
            html,
        } => cmd_manifest(&manifest, &supports, config.as_deref(), html),
        Commands::CheckConfig { file } => cmd_check_config(&file),
    }
}

fn load_config(path: Option<&Path>) -> Result<VantageConfig> {
    path.map_or_else(
        || Ok(VantageConfig::default()),
        |path| {
            VantageConfig::load(path)
                .with_context(|| format!("Failed to load config {}", path.display()))
        },
    )
}

fn render_context(viewport_width: Option<u32>, dpr: Option<f64>) -> Option<RenderContext> {
    viewport_width.map(|viewport_width| RenderContext {
        viewport_width,
        device_pixel_ratio: dpr.unwrap_or(1.0),
    })
}

fn to_json<T: Serialize>(value: &T) -> Result<String> {
    serde_json::to_string_pretty(value)
        .map_err(|e| vantage_core::Error::json_serialize_failed(e.to_string()))
        .context("Failed to render JSON")
}

fn resolve_descriptor(args: &ResolveArgs, config: &VantageConfig) -> Result<ImageDescriptor> {
    let quality = args
        .quality
        .unwrap_or_else(|| i64::from(config.image.default_quality));
    let descriptor = ImageDescriptor::new(args.path.clone(), "")
        .context("Invalid source path")?
        .with_quality(quality)
        .priority(true);

    let descriptor = match (args.width, args.height) {
        (Some(width), Some(height)) => descriptor.with_size(width, height),
        (Some(width), None) => descriptor.with_width(width),
        (None, Some(height)) => Err(vantage_core::Error::invalid_config(format!(
            "--height {height} needs --width"
        ))),
        (None, None) => Ok(descriptor),
    };
    descriptor.context("Invalid dimensions")
}

/// Resolve one image the way the browser component would.
///
/// # Errors
///
/// Returns an error for invalid arguments or configuration.
pub fn cmd_resolve(args: &ResolveArgs) -> Result<String> {
    let config = load_config(args.config.as_deref())?;
    let supported = SupportedFormats::parse_list(&args.supports).context("Invalid --supports")?;
    let descriptor = resolve_descriptor(args, &config)?;
    let context = render_context(args.viewport_width, args.dpr);

    let mut loader = ImageLoader::new(descriptor.clone(), config.image.clone(), context);
    loader.begin(true);
    let source = block_on(loader.resolve_with(&supported))
        .context("Image resolution did not start")?;
    debug!(url = %source.url, format = %source.format, "resolved");

    let report = ResolveReport {
        path: descriptor.source_path().to_string(),
        fallback: ResolvedSource::original(&descriptor),
        srcset: loader.srcset(),
        sizes: loader.sizes().to_string(),
        candidates: build_candidates(&descriptor, &config.image, source.format, context.as_ref()),
        layout_box: descriptor.placeholder_box(),
        source,
    };
    to_json(&report)
}

/// Plan markup for every image in a manifest.
///
/// # Errors
///
/// Returns an error if the manifest or configuration is unreadable or
/// invalid.
pub fn cmd_manifest(
    manifest: &Path,
    supports: &str,
    config: Option<&Path>,
    html: bool,
) -> Result<String> {
    let config = load_config(config)?;
    let supported = SupportedFormats::parse_list(supports).context("Invalid --supports")?;
    let descriptors = Manifest::load(manifest)
        .and_then(|m| m.descriptors(&config.image))
        .with_context(|| format!("Failed to load manifest {}", manifest.display()))?;

    let plans: Vec<ImagePlan> = descriptors
        .iter()
        .map(|descriptor| ImagePlan::build(descriptor, &config.image, &supported, None))
        .collect();
    info!(images = plans.len(), "manifest planned");

    if html {
        let markup = plans
            .iter()
            .filter_map(ImagePlan::preload_html)
            .chain(plans.iter().map(ImagePlan::to_html))
            .collect::<Vec<_>>()
            .join("\n");
        Ok(markup)
    } else {
        to_json(&plans)
    }
}

/// Validate a configuration file.
///
/// # Errors
///
/// Returns the first read, parse or validation error.
pub fn cmd_check_config(file: &Path) -> Result<String> {
    let config = load_config(Some(file))?;
    info!(path = %file.display(), "configuration valid");
    Ok(format!(
        "{} is valid: {} compressed format(s), {} standard width(s), deferred margin {}",
        file.display(),
        config.image.formats.len(),
        config.image.standard_widths.len(),
        config.deferred.root_margin
    ))
}
