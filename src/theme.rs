// Color themes

use ratatui::style::Color;
use ratatui::widgets::BorderType;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::warn;

/// Border style of the list and edit panels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Border {
    Single,
    Double,
    Round,
}

impl From<Border> for BorderType {
    fn from(border: Border) -> Self {
        match border {
            Border::Single => BorderType::Plain,
            Border::Double => BorderType::Double,
            Border::Round => BorderType::Rounded,
        }
    }
}

/// Theme as written in the config file: colors are names or `#rrggbb`
///
/// Keys left out take their value from the dark preset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeSpec {
    pub name: String,
    pub accent: String,
    pub fg: String,
    pub dim: String,
    pub danger: String,
    pub selection: String,
    pub border: Border,
}

impl ThemeSpec {
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            accent: "cyan".to_string(),
            fg: "white".to_string(),
            dim: "gray".to_string(),
            danger: "red".to_string(),
            selection: "#1f2937".to_string(),
            border: Border::Round,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            accent: "blue".to_string(),
            fg: "black".to_string(),
            dim: "#6b7280".to_string(),
            danger: "red".to_string(),
            selection: "#e5e7eb".to_string(),
            border: Border::Round,
        }
    }
}

impl Default for ThemeSpec {
    fn default() -> Self {
        Self::dark()
    }
}

/// Resolved theme used by the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    pub name: String,
    pub accent: Color,
    pub fg: Color,
    pub dim: Color,
    pub danger: Color,
    pub selection: Color,
    pub border: BorderType,
}

impl Default for Theme {
    fn default() -> Self {
        Self::from_spec(&ThemeSpec::dark())
    }
}

impl Theme {
    /// Resolve color strings; unknown colors fall back to the terminal default
    pub fn from_spec(spec: &ThemeSpec) -> Self {
        Self {
            name: spec.name.clone(),
            accent: parse_color(&spec.accent),
            fg: parse_color(&spec.fg),
            dim: parse_color(&spec.dim),
            danger: parse_color(&spec.danger),
            selection: parse_color(&spec.selection),
            border: spec.border.into(),
        }
    }
}

fn parse_color(s: &str) -> Color {
    Color::from_str(s).unwrap_or_else(|_| {
        warn!(color = s, "Unknown color in theme, using default");
        Color::Reset
    })
}
