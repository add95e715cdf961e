//! Text artifact writers (SVG flamegraphs, DOT graphs, collapsed stacks).
//!
//! All renderers produce a `String`; this module puts it on disk.

use crate::utils::error::OutputError;
use log::{debug, info};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Write rendered text to a file
///
/// **Public** - shared by the SVG, DOT and collapsed-stack writers
///
/// # Arguments
/// * `content` - Rendered text
/// * `output_path` - Destination file
/// * `extension` - Expected extension, only used for a debug hint
///
/// # Errors
/// * `OutputError::WriteFailed` - I/O error during write
/// * `OutputError::InvalidPath` - Path is empty, a directory, or its parent cannot be created
pub fn write_text_artifact(
    content: &str,
    output_path: impl AsRef<Path>,
    extension: &str,
) -> Result<(), OutputError> {
    let output_path = output_path.as_ref();

    info!("Writing {} to: {}", extension, output_path.display());

    super::validate_output_path(output_path)?;
    if output_path.extension().map_or(true, |ext| ext != extension) {
        debug!(
            "File does not have .{} extension: {}",
            extension,
            output_path.display()
        );
    }
    super::create_parent_dirs(output_path)?;

    let file = File::create(output_path).map_err(OutputError::WriteFailed)?;
    let mut writer = BufWriter::new(file);

    writer
        .write_all(content.as_bytes())
        .map_err(OutputError::WriteFailed)?;
    writer.flush().map_err(OutputError::WriteFailed)?;

    info!(
        "{} written successfully ({} bytes, {:.2} KB)",
        extension,
        content.len(),
        content.len() as f64 / 1024.0
    );

    Ok(())
}

/// Write an SVG flamegraph
pub fn write_svg(svg_content: &str, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    write_text_artifact(svg_content, output_path, "svg")
}

/// Write a Graphviz DOT graph
pub fn write_dot(dot_content: &str, output_path: impl AsRef<Path>) -> Result<(), OutputError> {
    write_text_artifact(dot_content, output_path, "dot")
}

/// Write folded stacks (`a;b;c <ticks>` per line)
pub fn write_collapsed(
    collapsed: &str,
    output_path: impl AsRef<Path>,
) -> Result<(), OutputError> {
    write_text_artifact(collapsed, output_path, "folded")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    const DOT: &str = "digraph calltree {\n}\n";

    #[test]
    fn test_write_dot() {
        let temp_file = NamedTempFile::new().unwrap();
        write_dot(DOT, temp_file.path()).unwrap();

        let content = std::fs::read_to_string(temp_file.path()).unwrap();
        assert_eq!(content, DOT);
    }

    #[test]
    fn test_write_creates_parent_dirs() {
        let temp_dir = tempfile::tempdir().unwrap();
        let nested_path = temp_dir.path().join("nested/dirs/flamegraph.svg");

        write_svg("<svg/>", &nested_path).unwrap();

        assert!(nested_path.exists());
    }

    #[test]
    fn test_directory_path_rejected() {
        let temp_dir = tempfile::tempdir().unwrap();
        let result = write_collapsed("a 1\n", temp_dir.path());
        assert!(matches!(result, Err(OutputError::InvalidPath(_))));
    }
}
