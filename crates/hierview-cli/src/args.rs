//! Command-line argument definitions for the hierview CLI.
//!
//! This module defines the [`Args`] structure parsed from the command line
//! using [`clap`]. Arguments control input/output paths, the view mode and
//! output format, configuration file selection, and logging verbosity.

use clap::{Parser, ValueEnum};

use hierview::view::ViewMode;

/// View mode selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Instances joined by "instantiates" edges
    Tree,
    /// Instances drawn inside their parents
    Nested,
}

impl From<ModeArg> for ViewMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Tree => ViewMode::Tree,
            ModeArg::Nested => ViewMode::Nested,
        }
    }
}

/// Output document format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum FormatArg {
    /// Static SVG preview
    #[default]
    Svg,
    /// Cytoscape elements, style and layout as JSON
    Json,
}

impl FormatArg {
    fn extension(self) -> &'static str {
        match self {
            Self::Svg => "svg",
            Self::Json => "json",
        }
    }
}

/// Command-line arguments for the hierview tool
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the design document (parser JSON output)
    #[arg(help = "Path to the input file")]
    pub input: String,

    /// Path to the output file [default: out.svg or out.json]
    #[arg(short, long)]
    pub output: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = FormatArg::Svg)]
    pub format: FormatArg,

    /// View mode; defaults to the configured one
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Path to configuration file (TOML)
    #[arg(short, long)]
    pub config: Option<String>,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

impl Args {
    /// The output path, falling back to `out.<format>`.
    pub fn output_path(&self) -> String {
        self.output
            .clone()
            .unwrap_or_else(|| format!("out.{}", self.format.extension()))
    }
}
