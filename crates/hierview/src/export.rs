//! Built-in graph consumers.
//!
//! - [`JsonSurface`] mounts a Cytoscape-ready JSON document.
//! - [`SvgSurface`] lays the plan out with the matching built-in engine and
//!   mounts a static SVG picture.
//!
//! [`write_document`] stores a mounted document on disk.

pub mod json;
pub mod svg;

pub use json::JsonSurface;
pub use svg::SvgSurface;

use std::{fs::File, io::Write, path::Path};

use log::{error, info};

use crate::error::ViewError;

/// Writes a rendered document to `path`.
///
/// # Errors
///
/// Returns [`ViewError::Export`] if the file cannot be created or written.
pub fn write_document(path: impl AsRef<Path>, content: &str) -> Result<(), ViewError> {
    let path = path.as_ref();
    let file_name = path.display().to_string();
    info!(file_name = file_name.as_str(); "Writing document");

    let mut file = File::create(path).map_err(|err| {
        error!(file_name = file_name.as_str(), err:err; "Failed to create output file");
        ViewError::Export(Box::new(err))
    })?;

    file.write_all(content.as_bytes()).map_err(|err| {
        error!(file_name = file_name.as_str(), err:err; "Failed to write document");
        ViewError::Export(Box::new(err))
    })
}
