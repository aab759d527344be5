// Library exports for listing-dash

pub mod calendar;
pub mod data;
pub mod error;
pub mod graph;
pub mod ir;
pub mod palette;
pub mod runtime;
pub mod scale;
pub mod sections;
pub mod transform;

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Clone, Copy, Deserialize, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[serde(rename = "png")]
    #[default]
    Png,
    #[serde(rename = "svg")]
    Svg,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Png => "png",
            OutputFormat::Svg => "svg",
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RenderOptions {
    #[serde(default = "default_width")]
    pub width: u32,
    #[serde(default = "default_height")]
    pub height: u32,
    #[serde(default, rename = "type")]
    pub format: OutputFormat,
}

fn default_width() -> u32 { 800 }
fn default_height() -> u32 { 600 }

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            format: OutputFormat::Png,
        }
    }
}

impl RenderOptions {
    /// Read options from a JSON file, e.g. `{"width": 1024, "type": "svg"}`
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read options file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Invalid options file {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_defaults_from_empty_json() {
        let options: RenderOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, RenderOptions::default());
    }

    #[test]
    fn test_options_from_json() {
        let options: RenderOptions =
            serde_json::from_str(r#"{"width": 1024, "type": "svg"}"#).unwrap();
        assert_eq!(options.width, 1024);
        assert_eq!(options.height, 600);
        assert_eq!(options.format, OutputFormat::Svg);
        assert_eq!(options.format.extension(), "svg");
    }

    #[test]
    fn test_options_unknown_format() {
        let result: std::result::Result<RenderOptions, _> =
            serde_json::from_str(r#"{"type": "gif"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_options_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.json");
        std::fs::write(&path, r#"{"height": 300}"#).unwrap();
        let options = RenderOptions::from_file(&path).unwrap();
        assert_eq!(options.height, 300);

        let missing = RenderOptions::from_file(&dir.path().join("nope.json"));
        assert!(missing.is_err());
    }
}
