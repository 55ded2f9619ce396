#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Turns a GPS camera photo into a prefilled incident report link.
//!
//! Recognizes the photo's caption overlay, pulls out date, time,
//! coordinates, and address, resolves the coordinates to a ward, police
//! beat, and police station, and prints everything as JSON together with
//! the report form link.

mod config;
mod pipeline;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use crate::config::Config;

#[derive(Parser)]
#[command(name = "geostamp", about = "Prefill an incident report from a GPS camera photo")]
struct Cli {
    /// Image path or http(s) URL
    #[arg(required_unless_present = "text")]
    source: Option<String>,

    /// Config file (defaults to the built-in configuration)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Read already-recognized overlay text from this file instead of
    /// running OCR
    #[arg(long)]
    text: Option<PathBuf>,

    /// Tesseract languages, e.g. `eng`, `hin`, or `eng+hin` (overrides
    /// the config file)
    #[arg(long)]
    languages: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init();
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(languages) = cli.languages {
        config.ocr.languages = languages;
    }

    let text = pipeline::acquire_text(
        cli.source.as_deref(),
        cli.text.as_deref(),
        Arc::new(config.ocr.recognizer()),
    )
    .await?;

    let report = pipeline::build_report(&text, &config).await?;
    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
