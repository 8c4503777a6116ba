//! CLI command definitions using clap.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

/// Vantage - viewport-aware media loading
#[derive(Parser, Debug)]
#[command(name = "vantage")]
#[command(version)]
#[command(about = "Resolve image sources, plan <picture> markup and validate loader configuration")]
#[command(
    long_about = "Vantage negotiates image formats, layers quality/width/format query parameters onto source paths, and plans responsive markup the same way the in-browser components do."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve the source and candidates for one image
    Resolve(ResolveArgs),

    /// Plan <picture> markup for every image in a manifest
    Manifest {
        /// Manifest file with [[image]] tables
        manifest: PathBuf,

        /// Formats the target clients decode, comma separated (e.g. avif,webp)
        #[arg(long, default_value = "")]
        supports: String,

        /// Configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print HTML instead of JSON
        #[arg(long, default_value_t = false)]
        html: bool,
    },

    /// Validate a configuration file
    CheckConfig {
        /// Configuration file to validate
        file: PathBuf,
    },
}

#[derive(Args, Debug, Clone, Default)]
pub struct ResolveArgs {
    /// Source path, possibly with its own query string
    pub path: String,

    /// Intrinsic width in CSS pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Intrinsic height in CSS pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Quality hint, clamped into 1..=100
    #[arg(short, long, allow_negative_numbers = true)]
    pub quality: Option<i64>,

    /// Formats the client decodes, comma separated (e.g. avif,webp)
    #[arg(long, default_value = "")]
    pub supports: String,

    /// Viewport width in CSS pixels
    #[arg(long)]
    pub viewport_width: Option<u32>,

    /// Device pixel ratio; only used with --viewport-width
    #[arg(long)]
    pub dpr: Option<f64>,

    /// Configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
