//! CLI logic for the hierview tool.
//!
//! Reads a design document produced by an HDL parser, renders it in the
//! requested view mode, and writes the result as SVG or JSON.

pub mod error_adapter;

mod args;
mod config;

pub use args::{Args, FormatArg, ModeArg};

use std::fs;

use log::{info, warn};

use hierview::{ViewBuilder, ViewError, design::Design, export, notice::Notice, view::ViewMode};

/// Run the hierview CLI application
///
/// # Errors
///
/// Returns `ViewError` for:
/// - File I/O errors
/// - Configuration loading errors
/// - Invalid design documents
/// - Layout or rendering errors
pub fn run(args: &Args) -> Result<(), ViewError> {
    let output_path = args.output_path();
    info!(
        input_path = args.input,
        output_path = output_path;
        "Processing design"
    );

    // Load configuration
    let app_config = config::load_config(args.config.as_ref())?;
    let mode = args
        .mode
        .map_or(app_config.view().default_mode(), ViewMode::from);

    // Read input file
    let source = fs::read_to_string(&args.input)?;

    let builder = ViewBuilder::new(app_config);
    let design = builder.parse(&source)?;

    if design.as_ref().is_none_or(Design::is_empty) {
        warn!("Design has no top-level instances, output will be empty");
    } else {
        for notice in Notice::for_mode(mode) {
            info!(notice = notice.to_string(); "View notice");
        }
    }

    let output = match args.format {
        FormatArg::Svg => builder.render_svg(design.as_ref(), mode)?,
        FormatArg::Json => builder.render_json(design.as_ref(), mode)?,
    };

    export::write_document(&output_path, &output)?;

    info!(output_file = output_path, mode = mode.as_str(); "Design exported successfully");

    Ok(())
}
