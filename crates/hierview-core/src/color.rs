//! Color handling
//!
//! This module provides the [`Color`] type which wraps the `DynamicColor` type
//! from the color crate. Colors arrive as CSS strings from configuration and
//! are validated here before they reach a style sheet or the SVG preview.

use std::{fmt, str::FromStr};

use color::DynamicColor;

/// Wrapper around the `DynamicColor` type from the color crate
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Color {
    color: DynamicColor,
}

impl Color {
    /// Create a new `Color` from a CSS color string such as `"#4a7ba6"`,
    /// `"rgb(74, 123, 166)"` or `"steelblue"`.
    ///
    /// # Examples
    ///
    /// ```
    /// use hierview_core::color::Color;
    ///
    /// assert!(Color::new("#4a7ba6").is_ok());
    /// assert!(Color::new("no-such-color").is_err());
    /// ```
    pub fn new(color_str: &str) -> Result<Self, String> {
        match DynamicColor::from_str(color_str) {
            Ok(color) => Ok(Self { color }),
            Err(err) => Err(format!("invalid color `{color_str}`: {err}")),
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.color)
    }
}
