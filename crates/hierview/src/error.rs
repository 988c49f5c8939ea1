//! Error types for hierview operations.
//!
//! This module provides the main error type [`ViewError`] which wraps the
//! failure conditions of loading, planning, and rendering a design view.

use std::io;

use thiserror::Error;

use crate::session::SurfaceError;

/// The main error type for hierview operations.
///
/// # Diagnostic Variants
///
/// The `Design` variant keeps the offending source text next to the JSON
/// error so front ends can point at the exact line and column.
#[derive(Debug, Error)]
pub enum ViewError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Invalid design document: {err}")]
    Design { err: serde_json::Error, src: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Layout error: {0}")]
    Layout(String),

    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),

    #[error("Export error: {0}")]
    Export(Box<dyn std::error::Error + Send + Sync>),
}

impl ViewError {
    /// Create a new `Design` error with the associated source text.
    pub fn new_design_error(err: serde_json::Error, src: impl Into<String>) -> Self {
        Self::Design {
            err,
            src: src.into(),
        }
    }
}
