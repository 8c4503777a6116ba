//! Integration tests for the CLI command handlers.
//!
//! These tests verify that:
//! - `resolve` layers query parameters and offers the original as fallback
//! - `manifest` plans one entry per image with preload hints for priority images
//! - `check-config` accepts valid files and rejects invalid ones

#![forbid(clippy::unwrap_used)]
#![forbid(clippy::expect_used)]

use std::io::Write;

use serde_json::Value;
use tempfile::NamedTempFile;

use vantage::cli::{Commands, ResolveArgs};
use vantage::commands::{cmd_check_config, cmd_manifest, cmd_resolve, execute_command};

type TestResult = Result<(), Box<dyn std::error::Error>>;

fn temp_file(contents: &str) -> Result<NamedTempFile, Box<dyn std::error::Error>> {
    let mut file = NamedTempFile::new()?;
    file.write_all(contents.as_bytes())?;
    Ok(file)
}

/// # GIVEN
/// A client that decodes WebP but not AVIF
///
/// # WHEN
/// An image with an explicit width is resolved
///
/// # THEN
/// The source is WebP with quality, width and format layered on, and the
/// fallback is the untouched path
#[test]
fn test_resolve_negotiates_best_supported_format() -> TestResult {
    let args = ResolveArgs {
        path: "/photos/a.jpg?v=3".into(),
        width: Some(640),
        supports: "webp".into(),
        quality: Some(80),
        ..ResolveArgs::default()
    };

    let report: Value = serde_json::from_str(&cmd_resolve(&args)?)?;

    assert_eq!(report["source"]["format"], "webp");
    assert_eq!(
        report["source"]["url"],
        "/photos/a.jpg?v=3&quality=80&w=640&format=webp"
    );
    assert_eq!(report["fallback"]["url"], "/photos/a.jpg?v=3");
    assert_eq!(report["fallback"]["format"], "original");
    assert_eq!(report["sizes"], "100vw");

    let srcset = report["srcset"].as_str().ok_or("srcset missing")?;
    assert!(srcset.ends_with("&w=1280&format=webp 2x"), "got {srcset}");
    Ok(())
}

/// # GIVEN
/// No compressed format support and a 400px viewport at 2x density
///
/// # WHEN
/// An image without an explicit width is resolved
///
/// # THEN
/// The original format is used at the first standard width covering 800px
#[test]
fn test_resolve_uses_viewport_for_width() -> TestResult {
    let args = ResolveArgs {
        path: "/a.jpg".into(),
        viewport_width: Some(400),
        dpr: Some(2.0),
        ..ResolveArgs::default()
    };

    let report: Value = serde_json::from_str(&cmd_resolve(&args)?)?;

    assert_eq!(report["source"]["url"], "/a.jpg?quality=75&w=828");
    let candidates = report["candidates"]["candidates"]
        .as_array()
        .ok_or("candidates missing")?;
    assert_eq!(candidates.len(), 3);
    Ok(())
}

#[test]
fn test_resolve_rejects_bad_input() {
    let empty = ResolveArgs::default();
    assert!(cmd_resolve(&empty).is_err());

    let bad_format = ResolveArgs {
        path: "/a.jpg".into(),
        supports: "jxl".into(),
        ..ResolveArgs::default()
    };
    assert!(cmd_resolve(&bad_format).is_err());

    let height_only = ResolveArgs {
        path: "/a.jpg".into(),
        height: Some(10),
        ..ResolveArgs::default()
    };
    assert!(cmd_resolve(&height_only).is_err());
}

/// # GIVEN
/// A manifest with one priority image and one lazy image
///
/// # WHEN
/// The manifest is planned for AVIF and WebP clients
///
/// # THEN
/// Both images get ranked sources, and only the priority image is eager
/// with a preload hint
#[test]
fn test_manifest_plans_every_image() -> TestResult {
    let manifest = temp_file(
        r#"
        [[image]]
        path = "/hero.jpg"
        alt = "Hero"
        width = 1200
        height = 600
        priority = true

        [[image]]
        path = "/card.png"
        alt = "Card"
        sizes = "(max-width: 600px) 100vw, 33vw"
        "#,
    )?;

    let plans: Value = serde_json::from_str(&cmd_manifest(
        manifest.path(),
        "avif,webp",
        None,
        false,
    )?)?;
    let plans = plans.as_array().ok_or("expected a list")?;
    assert_eq!(plans.len(), 2);

    let hero = plans.first().ok_or("hero missing")?;
    assert_eq!(hero["loading"], "eager");
    assert_eq!(hero["fetch_priority"], "high");
    assert_eq!(hero["sources"][0]["mime_type"], "image/avif");
    assert_eq!(hero["sources"][1]["mime_type"], "image/webp");
    assert_eq!(hero["layout_box"]["height"], 600);
    assert_eq!(hero["preload"]["mime_type"], "image/avif");

    let card = plans.get(1).ok_or("card missing")?;
    assert_eq!(card["loading"], "lazy");
    assert!(card["preload"].is_null());
    assert_eq!(card["sizes"], "(max-width: 600px) 100vw, 33vw");
    Ok(())
}

#[test]
fn test_manifest_html_output() -> TestResult {
    let manifest = temp_file("[[image]]\npath = \"/hero.jpg\"\nalt = \"Hero\"\npriority = true\n")?;

    let html = cmd_manifest(manifest.path(), "webp", None, true)?;

    assert!(html.starts_with("<link rel=\"preload\" as=\"image\""));
    assert!(html.contains("<picture><source type=\"image/webp\""));
    assert!(html.contains("alt=\"Hero\""));
    Ok(())
}

#[test]
fn test_manifest_respects_config() -> TestResult {
    let config = temp_file("[image]\ndefault_quality = 50\nwidth_param = \"width\"\n")?;
    let manifest = temp_file("[[image]]\npath = \"/a.jpg\"\nwidth = 300\n")?;

    let plans: Value = serde_json::from_str(&cmd_manifest(
        manifest.path(),
        "",
        Some(config.path()),
        false,
    )?)?;

    assert_eq!(plans[0]["fallback_src"], "/a.jpg?quality=50&width=300");
    assert_eq!(plans[0]["sources"].as_array().map(Vec::len), Some(0));
    Ok(())
}

#[test]
fn test_check_config() -> TestResult {
    let valid = temp_file("[gate]\nthreshold = 0.5\nroot_margin = \"10px 20px\"\n")?;
    let message = execute_command(Commands::CheckConfig {
        file: valid.path().to_path_buf(),
    })?;
    assert!(message.contains("is valid"));

    let invalid = temp_file("[gate]\nthreshold = 3.0\n")?;
    assert!(cmd_check_config(invalid.path()).is_err());

    let unknown = temp_file("[gate]\nmargin = \"10px\"\n")?;
    assert!(cmd_check_config(unknown.path()).is_err());

    let missing = std::path::Path::new("/definitely/not/here.toml");
    let error = cmd_check_config(missing).err().ok_or("expected an error")?;
    assert!(format!("{error:#}").contains("here.toml"));
    Ok(())
}
