//! Output writers for reports and rendered artifacts.
//!
//! This module handles writing data to disk in various formats:
//! - JSON reports (versioned, readable back with `read_report`)
//! - SVG flamegraphs, DOT graphs and collapsed stacks

pub mod json;
pub mod schema;
pub mod text;

use crate::utils::error::OutputError;
use log::debug;
use std::path::Path;

// Re-export main functions
pub use json::{read_report, report_to_string, write_report};
pub use schema::{HotPath, Report, TreeStats};
pub use text::{write_collapsed, write_dot, write_svg, write_text_artifact};

/// Reject empty paths and paths naming a directory
fn validate_output_path(path: &Path) -> Result<(), OutputError> {
    if path.as_os_str().is_empty() {
        return Err(OutputError::InvalidPath("Path is empty".to_string()));
    }

    if path.is_dir() {
        return Err(OutputError::InvalidPath(format!(
            "Path is a directory: {}",
            path.display()
        )));
    }

    Ok(())
}

/// Create missing parent directories of an output file
fn create_parent_dirs(path: &Path) -> Result<(), OutputError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            debug!("Creating parent directories: {}", parent.display());
            std::fs::create_dir_all(parent).map_err(|e| {
                OutputError::InvalidPath(format!("Cannot create directory: {}", e))
            })?;
        }
    }
    Ok(())
}
