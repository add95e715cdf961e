//! JSON report writer.
//!
//! Writes Report structs to JSON files with proper formatting.
//! The tree is stored as a flat node list, so the document nesting does
//! not grow with call depth.

use super::schema::Report;
use crate::utils::config::SCHEMA_VERSION;
use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

/// Write a report to a JSON file
///
/// **Public** - main entry point for JSON output
///
/// # Arguments
/// * `report` - Report data to write
/// * `output_path` - Path to output JSON file
///
/// # Returns
/// Ok if file written successfully
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::SerializationFailed` - JSON serialization error
/// * `OutputError::InvalidPath` - Path cannot be created or is invalid
pub fn write_report(report: &Report, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing report to: {}", output_path.display());

    super::validate_output_path(output_path)?;
    super::create_parent_dirs(output_path)?;

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let writer = BufWriter::new(file);

    // Serialize to JSON with pretty printing
    serde_json::to_writer_pretty(writer, report).map_err(OutputError::SerializationFailed)?;

    info!(
        "Report written successfully ({} bytes)",
        calculate_file_size(output_path)
    );

    Ok(())
}

/// Serialize a report to a pretty JSON string
///
/// **Public** - useful for tests and stdout output
pub fn report_to_string(report: &Report) -> Result<String, OutputError> {
    serde_json::to_string_pretty(report).map_err(OutputError::SerializationFailed)
}

/// Calculate file size in bytes
fn calculate_file_size(path: &Path) -> u64 {
    std::fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// Read a report from a JSON file
///
/// **Public** - used by the validate command and tests
///
/// # Errors
/// * `OutputError::ReadFailed` - File read error
/// * `OutputError::DeserializationFailed` - JSON parse error or inconsistent tree links
/// * `OutputError::UnsupportedVersion` - major version differs from ours
pub fn read_report(input_path: impl AsRef<Path>) -> Result<Report, OutputError> {
    let input_path = input_path.as_ref();

    debug!("Reading report from: {}", input_path.display());

    let file = File::open(input_path).map_err(OutputError::ReadFailed)?;
    let report: Report = serde_json::from_reader(BufReader::new(file))
        .map_err(OutputError::DeserializationFailed)?;

    if major_version(&report.version) != major_version(SCHEMA_VERSION) {
        return Err(OutputError::UnsupportedVersion(report.version));
    }

    debug!(
        "Report loaded: version {}, {} total ticks",
        report.version, report.total_ticks
    );

    Ok(report)
}

fn major_version(version: &str) -> &str {
    version.split('.').next().unwrap_or(version)
}
