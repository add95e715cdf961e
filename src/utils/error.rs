//! Error types for the entire application.
//!
//! We use `thiserror` for library-style errors with custom types,
//! and `anyhow` for application-level error propagation in main.rs and commands.

use std::fmt;
use thiserror::Error;

/// Errors that can occur while parsing a single trace line
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    MalformedLine {
        /// Full text of the offending line
        line: String,
        /// 0-based byte offset of the first unparseable character
        offset: usize,
    },
}

impl ParseError {
    /// Byte offset where parsing stopped
    pub fn offset(&self) -> usize {
        match self {
            ParseError::MalformedLine { offset, .. } => *offset,
        }
    }

    /// Text of the line that failed to parse
    pub fn line(&self) -> &str {
        match self {
            ParseError::MalformedLine { line, .. } => line,
        }
    }

    /// Caret pointer aligned under the failing character
    ///
    /// **Public** - used for diagnostic display
    pub fn caret(&self) -> String {
        caret_line(self.offset())
    }
}

fn caret_line(offset: usize) -> String {
    format!("{}^", " ".repeat(offset))
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MalformedLine { line, offset } => write!(
                f,
                "malformed line at byte {}:\n{}\n{}",
                offset,
                line,
                caret_line(*offset)
            ),
        }
    }
}

/// Kind of interned id a trace record can reference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    Engine,
    File,
    Function,
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ReferenceKind::Engine => "engine",
            ReferenceKind::File => "file",
            ReferenceKind::Function => "function",
        };
        f.write_str(name)
    }
}

/// Bare reference to an id that was never defined
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown {kind} reference {id:x} (no prior definition)")]
pub struct ReferenceError {
    pub kind: ReferenceKind,
    pub id: u64,
}

/// Errors that abort a call tree conversion pass
#[derive(Error, Debug)]
pub enum TreeError {
    #[error("line {line_number}")]
    Malformed {
        line_number: usize,
        #[source]
        source: ParseError,
    },

    #[error("line {line_number}")]
    UnknownReference {
        line_number: usize,
        #[source]
        source: ReferenceError,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Inconsistent flat (index-linked) call tree, e.g. in a hand-edited report
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FlatTreeError {
    #[error("flat tree has no nodes")]
    Empty,

    #[error("node {0}: only node 0 may be the root, and node 0 must be")]
    MisplacedRoot(usize),

    #[error("node {0}: parent must be an earlier node")]
    BadParent(usize),

    #[error("node {node}: child {child} is out of range, listed twice, or names another parent")]
    BadChild { node: usize, child: usize },

    #[error("node {0} is missing from its parent's children")]
    Unlisted(usize),
}

/// Errors that can occur while rendering a finished call tree
#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Call tree has no ticks to render")]
    EmptyTree,

    #[error("Failed to generate flamegraph: {0}")]
    Flamegraph(String),
}

/// Errors that can occur during file output
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("Failed to write file: {0}")]
    WriteFailed(#[from] std::io::Error),

    #[error("Failed to read file: {0}")]
    ReadFailed(std::io::Error),

    #[error("Failed to serialize JSON: {0}")]
    SerializationFailed(#[from] serde_json::Error),

    #[error("Failed to parse JSON: {0}")]
    DeserializationFailed(serde_json::Error),

    #[error("Invalid output path: {0}")]
    InvalidPath(String),

    #[error("Unsupported report version: {0}")]
    UnsupportedVersion(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_line_display_has_caret() {
        let err = ParseError::MalformedLine {
            line: "C1 XN1".to_string(),
            offset: 3,
        };
        assert_eq!(err.caret(), "   ^");
        assert_eq!(
            err.to_string(),
            "malformed line at byte 3:\nC1 XN1\n   ^"
        );
    }

    #[test]
    fn test_reference_error_display() {
        let err = ReferenceError {
            kind: ReferenceKind::Function,
            id: 0x1f,
        };
        assert_eq!(
            err.to_string(),
            "unknown function reference 1f (no prior definition)"
        );
    }

    #[test]
    fn test_tree_error_leaves_source_out_of_display() {
        use std::error::Error as _;

        let err = TreeError::Malformed {
            line_number: 2,
            source: ParseError::MalformedLine {
                line: "C1 XN1".to_string(),
                offset: 3,
            },
        };
        assert_eq!(err.to_string(), "line 2");
        assert_eq!(
            err.source().map(|s| s.to_string()),
            Some("malformed line at byte 3:\nC1 XN1\n   ^".to_string())
        );
    }
}
