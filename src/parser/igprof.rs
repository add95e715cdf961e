//! Line parser for IgProf trace dumps.
//!
//! Recognizes the two record shapes found in a dump:
//!
//! ```text
//! P=(HEX ID=780 N=(python) T=0.008000)
//! C14 E1=python FN9=(F1=(lib/os.py)+58 N=(basename))+2 V0=(PERF_TICKS):(3d,3d,3d)
//! ```
//!
//! Tokens may be separated by spaces or tabs. Parsing is stateless per
//! line; ids are reported as found and resolved later by the tree builder.

use super::record::{
    CallFrame, EngineRef, FilePos, FunctionDef, FunctionName, FunctionRef, ProgramHeader, Record,
    Ticks,
};
use crate::utils::config::{ANONYMOUS_PREFIX, PERF_TICKS_COUNTER};
use crate::utils::error::ParseError;
use log::trace;

/// Parse one dump line into a record
///
/// **Public** - main entry point for parsing
///
/// # Arguments
/// * `line` - One line of the dump, with or without its line terminator
///
/// # Returns
/// The program header or call frame found on the line
///
/// # Errors
/// * `ParseError::MalformedLine` - the line matches neither record shape;
///   carries the byte offset of the first character that could not be parsed
pub fn parse_line(line: &str) -> Result<Record, ParseError> {
    let line = line.trim_end_matches(['\n', '\r']);
    let mut cursor = Cursor::new(line);

    let record = match cursor.peek() {
        Some(b'P') => Record::ProgramHeader(parse_program_header(&mut cursor)?),
        Some(b'C') => Record::CallFrame(parse_call_frame(&mut cursor)?),
        _ => return Err(cursor.error()),
    };
    cursor.expect_end()?;

    trace!("Parsed record: {:?}", record);
    Ok(record)
}

/// `P=(HEX ID=<hex> N=(<alnum>) T=<decimal>)`
fn parse_program_header(cursor: &mut Cursor<'_>) -> Result<ProgramHeader, ParseError> {
    cursor.expect("P=(HEX ID=")?;
    let id = cursor.hex_number()?;
    cursor.expect("N=(")?;
    let name = cursor.word(|b| b.is_ascii_alphanumeric())?.to_string();
    cursor.expect(")")?;
    cursor.expect("T=")?;

    let interval_at = cursor.token_start();
    let interval = cursor.word(|b| b.is_ascii_digit() || b == b'.')?;
    let sampling_interval = interval
        .parse::<f64>()
        .map_err(|_| cursor.error_at(interval_at))?;
    cursor.expect(")")?;

    Ok(ProgramHeader {
        id,
        name,
        sampling_interval,
    })
}

/// `C<hex> [E<hex>[=<alnum>]] FN<hex>[=(...)]+<hex> [V0[=(PERF_TICKS)]:(<hex>,<hex>,<hex>)]`
fn parse_call_frame(cursor: &mut Cursor<'_>) -> Result<CallFrame, ParseError> {
    cursor.expect("C")?;
    let call_number = cursor.hex_number()?;

    let engine = if cursor.accept("E") {
        Some(parse_engine(cursor)?)
    } else {
        None
    };

    cursor.expect("FN")?;
    let function_id = cursor.hex_number()?;
    let definition = if cursor.accept("=(") {
        let file = parse_file_pos(cursor)?;
        let name = parse_function_name(cursor)?;
        cursor.expect(")")?;
        Some(FunctionDef { file, name })
    } else {
        None
    };
    cursor.expect("+")?;
    let call_offset = cursor.hex_word()?.to_string();

    let ticks = if cursor.accept("V0") {
        Some(parse_ticks(cursor)?)
    } else {
        None
    };

    Ok(CallFrame {
        call_number,
        engine,
        function: FunctionRef {
            id: function_id,
            definition,
        },
        call_offset,
        ticks,
    })
}

/// Engine id with optional `=<alnum>` name; the leading `E` is consumed by the caller
fn parse_engine(cursor: &mut Cursor<'_>) -> Result<EngineRef, ParseError> {
    let id = cursor.hex_number()?;
    let name = if cursor.accept("=") {
        Some(cursor.word(|b| b.is_ascii_alphanumeric())?.to_string())
    } else {
        None
    };
    Ok(EngineRef { id, name })
}

/// `F<hex>[=(<path>)]+<hex>`
fn parse_file_pos(cursor: &mut Cursor<'_>) -> Result<FilePos, ParseError> {
    cursor.expect("F")?;
    let id = cursor.hex_number()?;
    let path = if cursor.accept("=(") {
        let path = cursor.word(is_path_byte)?.to_string();
        cursor.expect(")")?;
        Some(path)
    } else {
        None
    };
    cursor.expect("+")?;
    let offset = cursor.hex_word()?.to_string();
    Ok(FilePos { id, path, offset })
}

/// `N=(<name>)` or `N=(@?0x<hex>)`
fn parse_function_name(cursor: &mut Cursor<'_>) -> Result<FunctionName, ParseError> {
    cursor.expect("N=(")?;
    let name = if cursor.accept(ANONYMOUS_PREFIX) {
        FunctionName::Anonymous(cursor.hex_word()?.to_string())
    } else {
        FunctionName::Named(
            cursor
                .word(|b| b.is_ascii_alphanumeric() || b == b'_')?
                .to_string(),
        )
    };
    cursor.expect(")")?;
    Ok(name)
}

/// Value triple after `V0`; only the first element feeds aggregation
fn parse_ticks(cursor: &mut Cursor<'_>) -> Result<Ticks, ParseError> {
    if cursor.accept("=(") {
        cursor.expect(PERF_TICKS_COUNTER)?;
        cursor.expect(")")?;
    }
    cursor.expect(":(")?;
    let ticks = cursor.hex_number()?;
    cursor.expect(",")?;
    let value = cursor.hex_number()?;
    cursor.expect(",")?;
    let peak = cursor.hex_number()?;
    cursor.expect(")")?;
    Ok(Ticks { ticks, value, peak })
}

fn is_path_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'/' | b'_' | b'.' | b'-')
}

/// Byte cursor over a single line
///
/// **Private** - every token skips leading blanks before matching
struct Cursor<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(line: &'a str) -> Self {
        Self { line, pos: 0 }
    }

    fn skip_blanks(&mut self) {
        let bytes = self.line.as_bytes();
        while self.pos < bytes.len() && matches!(bytes[self.pos], b' ' | b'\t') {
            self.pos += 1;
        }
    }

    fn rest(&self) -> &'a str {
        &self.line[self.pos..]
    }

    fn peek(&mut self) -> Option<u8> {
        self.skip_blanks();
        self.rest().as_bytes().first().copied()
    }

    /// Position where the next token would start
    fn token_start(&mut self) -> usize {
        self.skip_blanks();
        self.pos
    }

    fn error(&self) -> ParseError {
        self.error_at(self.pos)
    }

    fn error_at(&self, offset: usize) -> ParseError {
        ParseError::MalformedLine {
            line: self.line.to_string(),
            offset,
        }
    }

    /// Consume `literal` or fail at the current position
    fn expect(&mut self, literal: &str) -> Result<(), ParseError> {
        self.skip_blanks();
        if self.rest().starts_with(literal) {
            self.pos += literal.len();
            Ok(())
        } else {
            Err(self.error())
        }
    }

    /// Consume `literal` if it is next; leaves the cursor untouched otherwise
    fn accept(&mut self, literal: &str) -> bool {
        let saved = self.pos;
        self.skip_blanks();
        if self.rest().starts_with(literal) {
            self.pos += literal.len();
            true
        } else {
            self.pos = saved;
            false
        }
    }

    /// Longest non-empty run of bytes matching `allowed`
    fn word(&mut self, allowed: impl Fn(u8) -> bool) -> Result<&'a str, ParseError> {
        self.skip_blanks();
        let start = self.pos;
        let len = self
            .rest()
            .bytes()
            .take_while(|b| allowed(*b))
            .count();
        if len == 0 {
            return Err(self.error());
        }
        self.pos += len;
        Ok(&self.line[start..self.pos])
    }

    fn hex_word(&mut self) -> Result<&'a str, ParseError> {
        self.word(|b| b.is_ascii_hexdigit())
    }

    fn hex_number(&mut self) -> Result<u64, ParseError> {
        let start = self.token_start();
        let digits = self.hex_word()?;
        u64::from_str_radix(digits, 16).map_err(|_| self.error_at(start))
    }

    fn expect_end(&mut self) -> Result<(), ParseError> {
        self.skip_blanks();
        if self.pos == self.line.len() {
            Ok(())
        } else {
            Err(self.error())
        }
    }
}
