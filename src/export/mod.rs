//! Heatmap export
//!
//! Renders a projected [`Heatmap`] for consumption outside the CLI.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};

use crate::heatmap::Heatmap;

pub mod csv;
pub mod json;

pub use self::csv::heatmap_to_csv;
pub use self::json::heatmap_to_json;

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

impl ExportFormat {
    /// Guess the format from a file extension
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, ExportError> {
        let extension = path
            .as_ref()
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();
        extension.parse()
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Export errors
#[derive(Error, Debug)]
pub enum ExportError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    CsvError(#[from] ::csv::Error),
}

/// Write `heatmap` to `output_path` in the given format
pub fn export_heatmap<P: AsRef<Path>>(
    heatmap: &Heatmap,
    format: ExportFormat,
    output_path: P,
) -> Result<(), ExportError> {
    if heatmap.is_empty() {
        warn!(path = %output_path.as_ref().display(), "Exporting a heatmap with no muscles");
    }

    let mut file = File::create(output_path.as_ref())?;
    match format {
        ExportFormat::Csv => heatmap_to_csv(heatmap, &mut file)?,
        ExportFormat::Json => {
            file.write_all(heatmap_to_json(heatmap).as_bytes())?;
            file.write_all(b"\n")?;
        }
    }
    info!(path = %output_path.as_ref().display(), ?format, muscles = heatmap.len(), "Heatmap exported");
    Ok(())
}
