//! Typed records produced by the line parser.
//!
//! One record per dump line. Every numbered reference may carry its
//! definition (`=...`) the first time its id appears; later occurrences
//! are bare references. The parser reports whichever shape it saw and
//! leaves resolution to the tree builder.

use crate::utils::config::ANONYMOUS_PREFIX;
use std::fmt;

/// A single parsed dump line
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    /// `P=(HEX ID=<hex> N=(<name>) T=<interval>)`
    ProgramHeader(ProgramHeader),
    /// `C<hex> [E..] FN.. [V0..]`
    CallFrame(CallFrame),
}

/// Program header line
#[derive(Debug, Clone, PartialEq)]
pub struct ProgramHeader {
    /// Value of the `ID=` field (process id in IgProf dumps)
    pub id: u64,
    pub name: String,
    /// Sampling interval in seconds
    pub sampling_interval: f64,
}

/// One frame of a sampled call stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallFrame {
    /// Depth-scoped call counter (`C<hex>`)
    pub call_number: u64,
    pub engine: Option<EngineRef>,
    pub function: FunctionRef,
    /// Offset of the call inside the function, kept as the hex text
    pub call_offset: String,
    pub ticks: Option<Ticks>,
}

impl CallFrame {
    /// Tick count contributed by this frame (absent ticks cost nothing)
    pub fn tick_count(&self) -> u64 {
        self.ticks.map(|t| t.ticks).unwrap_or(0)
    }
}

/// `E<hex>` or `E<hex>=<name>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineRef {
    pub id: u64,
    pub name: Option<String>,
}

/// `FN<hex>` optionally followed by `=(<file pos> N=(<name>))`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionRef {
    pub id: u64,
    pub definition: Option<FunctionDef>,
}

/// Full function definition: where it lives and what it is called
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDef {
    pub file: FilePos,
    pub name: FunctionName,
}

/// `F<hex>[=(<path>)]+<hex offset>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePos {
    pub id: u64,
    pub path: Option<String>,
    pub offset: String,
}

/// Function name: a plain symbol or an unresolved address
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FunctionName {
    Named(String),
    /// Hex digits of an `@?0x<hex>` address
    Anonymous(String),
}

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionName::Named(name) => f.write_str(name),
            FunctionName::Anonymous(addr) => write!(f, "{}{}", ANONYMOUS_PREFIX, addr),
        }
    }
}

/// Counter value triple `(ticks, value, peak)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Ticks {
    pub ticks: u64,
    pub value: u64,
    pub peak: u64,
}
