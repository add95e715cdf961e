//! Trace dump parsing.
//!
//! This module handles:
//! - Recognizing the dump's two record shapes (program header, call frame)
//! - Reporting definitions and bare references exactly as written
//! - Pinpointing the first unparseable byte of a malformed line

pub mod igprof;
pub mod record;

// Re-export main types
pub use igprof::parse_line;
pub use record::{
    CallFrame, EngineRef, FilePos, FunctionDef, FunctionName, FunctionRef, ProgramHeader, Record,
    Ticks,
};
