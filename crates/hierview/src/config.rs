//! Configuration types for hierview.
//!
//! This module provides the configuration structures that control which view
//! is shown first, how each view is laid out, and which colors the style
//! bundles use. All types implement [`serde::Deserialize`] so front ends can
//! load them from TOML or any other serde format; every section and field is
//! optional.
//!
//! # Overview
//!
//! - [`AppConfig`] - Top-level configuration combining the sections below.
//! - [`ViewConfig`] - The view mode selected when nothing else is requested.
//! - [`LayoutConfig`] - Layout options for the tree and nested views.
//! - [`StyleConfig`] - Color overrides for the style bundles.
//!
//! # Example
//!
//! ```
//! # use hierview::config::AppConfig;
//! let config = AppConfig::default();
//! assert!(config.style().palette().is_ok());
//! ```

use serde::Deserialize;

use hierview_core::color::Color;

use crate::{
    error::ViewError,
    layout::{BreadthfirstOptions, FcoseOptions},
    style::Palette,
    view::ViewMode,
};

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// View selection section.
    #[serde(default)]
    view: ViewConfig,

    /// Layout configuration section.
    #[serde(default)]
    layout: LayoutConfig,

    /// Style configuration section.
    #[serde(default)]
    style: StyleConfig,
}

impl AppConfig {
    /// Creates a new [`AppConfig`] from its sections.
    pub fn new(view: ViewConfig, layout: LayoutConfig, style: StyleConfig) -> Self {
        Self {
            view,
            layout,
            style,
        }
    }

    /// Returns the view configuration.
    pub fn view(&self) -> &ViewConfig {
        &self.view
    }

    /// Returns the layout configuration.
    pub fn layout(&self) -> &LayoutConfig {
        &self.layout
    }

    /// Returns the style configuration.
    pub fn style(&self) -> &StyleConfig {
        &self.style
    }
}

/// Initial view selection.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ViewConfig {
    #[serde(default)]
    default_mode: ViewMode,
}

impl ViewConfig {
    pub fn new(default_mode: ViewMode) -> Self {
        Self { default_mode }
    }

    /// The [`ViewMode`] used until the user picks another one.
    pub fn default_mode(&self) -> ViewMode {
        self.default_mode
    }
}

/// Layout options for each view mode.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LayoutConfig {
    /// Options for the layered tree layout.
    #[serde(default)]
    tree: BreadthfirstOptions,

    /// Options for the compound force-directed layout.
    #[serde(default)]
    nested: FcoseOptions,
}

impl LayoutConfig {
    pub fn new(tree: BreadthfirstOptions, nested: FcoseOptions) -> Self {
        Self { tree, nested }
    }

    pub fn tree(&self) -> &BreadthfirstOptions {
        &self.tree
    }

    pub fn nested(&self) -> &FcoseOptions {
        &self.nested
    }
}

/// Color overrides for the style bundles.
///
/// Fields that are not set keep the [`Palette`] defaults. Each value must be a
/// CSS color string.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct StyleConfig {
    #[serde(default)]
    node_fill: Option<String>,

    #[serde(default)]
    node_border: Option<String>,

    #[serde(default)]
    node_text: Option<String>,

    #[serde(default)]
    parent_fill: Option<String>,

    #[serde(default)]
    parent_border: Option<String>,

    #[serde(default)]
    edge_line: Option<String>,

    #[serde(default)]
    edge_text: Option<String>,

    /// Background of rendered previews; transparent when unset.
    #[serde(default)]
    background_color: Option<String>,
}

impl StyleConfig {
    /// Sets the background color override.
    pub fn with_background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    /// Sets the plain node fill override.
    pub fn with_node_fill(mut self, color: impl Into<String>) -> Self {
        self.node_fill = Some(color.into());
        self
    }

    /// Builds the [`Palette`] with every override applied.
    ///
    /// # Errors
    ///
    /// Returns [`ViewError::Config`] naming the first field whose value is
    /// not a valid color.
    pub fn palette(&self) -> Result<Palette, ViewError> {
        let defaults = Palette::default();
        Ok(Palette {
            node_fill: pick("node_fill", &self.node_fill, defaults.node_fill)?,
            node_border: pick("node_border", &self.node_border, defaults.node_border)?,
            node_text: pick("node_text", &self.node_text, defaults.node_text)?,
            parent_fill: pick("parent_fill", &self.parent_fill, defaults.parent_fill)?,
            parent_border: pick("parent_border", &self.parent_border, defaults.parent_border)?,
            edge_line: pick("edge_line", &self.edge_line, defaults.edge_line)?,
            edge_text: pick("edge_text", &self.edge_text, defaults.edge_text)?,
            background: self
                .background_color
                .as_deref()
                .map(|value| validate("background_color", value))
                .transpose()?,
        })
    }
}

fn pick(field: &str, value: &Option<String>, default: String) -> Result<String, ViewError> {
    value
        .as_deref()
        .map_or(Ok(default), |value| validate(field, value))
}

fn validate(field: &str, value: &str) -> Result<String, ViewError> {
    Color::new(value)
        .map(|_| value.to_string())
        .map_err(|err| ViewError::Config(format!("Invalid {field} in style config: {err}")))
}
