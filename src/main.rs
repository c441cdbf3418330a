use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use speech_bubble_rust::bubble::RawFinalBoundsDocument;
use speech_bubble_rust::layout::{EstimatedMetrics, TextMeasure, resolve_font};
use speech_bubble_rust::{BoundsDocument, Settings, group_document, layout_document};

#[derive(Parser, Debug)]
#[command(
    name = "speech-bubble-rust",
    version,
    about = "Group OCR text into speech bubbles and fit translated text back into them"
)]
struct Cli {
    /// Read extra settings from a local TOML file
    #[arg(short = 'r', long = "read-settings")]
    read_settings: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(long = "verbose")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Cluster OCR fragments (initial bounds JSON) into bubble records
    Group {
        /// Initial bounds file (default: stdin)
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,

        /// Write the final bounds here instead of stdout
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
    /// Fit each bubble's (translated) text into its rectangle
    Layout {
        /// Final bounds file with translated text (default: stdin)
        #[arg(short = 'i', long = "input")]
        input: Option<PathBuf>,

        /// Font file used for measuring (overrides settings)
        #[arg(long = "font")]
        font: Option<PathBuf>,

        /// System font family used for measuring (overrides settings)
        #[arg(long = "font-family")]
        font_family: Option<String>,

        /// Write the layouts here instead of stdout
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    speech_bubble_rust::logging::init(cli.verbose)?;
    let settings = speech_bubble_rust::settings::load_settings(cli.read_settings.as_deref())?;

    match cli.command {
        Command::Group { input, output } => {
            let content = read_input(input.as_deref())?;
            let document: BoundsDocument =
                serde_json::from_str(&content).with_context(|| "failed to parse bounds JSON")?;
            info!("group: {} text regions", document.text_regions.len());
            let final_bounds = group_document(document, &settings)?;
            let json = serde_json::to_string_pretty(&final_bounds)?;
            write_output(output.as_deref(), &json)
        }
        Command::Layout {
            input,
            font,
            font_family,
            output,
        } => {
            let content = read_input(input.as_deref())?;
            let raw: RawFinalBoundsDocument = serde_json::from_str(&content)
                .with_context(|| "failed to parse final bounds JSON")?;
            let document = raw.validate()?;
            let metrics = load_metrics(&settings, font.as_deref(), font_family.as_deref())?;
            let layouts = layout_document(&document, &*metrics, &settings.layout_config())?;
            let json = serde_json::to_string_pretty(&layouts)?;
            write_output(output.as_deref(), &json)
        }
    }
}

fn load_metrics(
    settings: &Settings,
    font: Option<&Path>,
    font_family: Option<&str>,
) -> Result<Box<dyn TextMeasure>> {
    let font_path = font.map(Path::to_path_buf).or_else(|| {
        settings
            .font_path
            .as_ref()
            .filter(|_| font_family.is_none())
            .map(PathBuf::from)
    });
    let family = font_family.or(settings.font_family.as_deref());
    if font_path.is_none() && family.is_none() {
        info!("layout: no font configured, using estimated metrics");
        return Ok(Box::new(EstimatedMetrics));
    }
    let metrics = resolve_font(font_path.as_deref(), family, &["sans-serif"])
        .with_context(|| "failed to load font for measuring")?;
    info!(
        "layout: measuring with {}",
        metrics.family().unwrap_or("unnamed font")
    );
    Ok(Box::new(metrics))
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read input: {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .with_context(|| "failed to read stdin")?;
            Ok(buffer)
        }
    }
}

fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
    match path {
        Some(path) => fs::write(path, format!("{}\n", content))
            .with_context(|| format!("failed to write output: {}", path.display())),
        None => {
            println!("{}", content);
            Ok(())
        }
    }
}
