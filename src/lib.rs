#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # Vantage
//!
//! Command-line front end for `vantage-core`: resolve single images, plan
//! `<picture>` markup for manifests, and validate configuration files.

pub use vantage_core;

pub mod cli;
pub mod commands;
pub mod manifest;
