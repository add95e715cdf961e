//! Fold a stream of call-frame records into an aggregated call tree.
//!
//! A dump is a sequence of stack snapshots, not an enter/exit log. Each
//! call frame is appended to the current stack; a call number that does
//! not exceed the previous one means the snapshot diverges at that depth.
//! The current stack is then folded into the tree and cut back before the
//! new frame is appended.
//!
//! Example: call numbers `1 2 3 2 3` fold the path `[1, 2, 3]` when the
//! second `2` arrives, keep `[1]`, and finish with `[1, 2', 3']`.

use super::call_tree::{CallIdentity, CallTreeNode, EngineTag, ProgramInfo};
use super::intern::InternTables;
use crate::parser::{parse_line, CallFrame, ProgramHeader, Record};
use crate::utils::error::TreeError;
use log::{debug, trace, warn};
use std::collections::HashMap;
use std::io::BufRead;

const ROOT: usize = 0;

/// Frame on the current stack, already resolved against the intern tables
#[derive(Debug, Clone)]
struct StackFrame {
    identity: CallIdentity,
    engine: EngineTag,
    ticks: u64,
}

/// Mutable tree node used while the pass is running
#[derive(Debug)]
struct ArenaNode {
    identity: Option<CallIdentity>,
    engine: EngineTag,
    count: u64,
    self_count: u64,
    /// Arena indices in first-seen order
    children: Vec<usize>,
    child_index: HashMap<CallIdentity, usize>,
}

impl ArenaNode {
    fn new(identity: Option<CallIdentity>, engine: EngineTag) -> Self {
        Self {
            identity,
            engine,
            count: 0,
            self_count: 0,
            children: Vec::new(),
            child_index: HashMap::new(),
        }
    }
}

/// Single-pass call tree builder
///
/// **Public** - incremental interface behind `build_call_tree`
///
/// Owns its intern tables and the partial tree exclusively; the finished
/// tree is only handed out by `finish`, which consumes the builder.
#[derive(Debug)]
pub struct TreeBuilder {
    tables: InternTables,
    /// Node 0 is the root; children always come after their parent
    arena: Vec<ArenaNode>,
    /// Path from the root (exclusive) to the most recent frame
    stack: Vec<StackFrame>,
    /// Leading stack frames whose ticks are already in the tree
    settled: usize,
    last_call_number: u64,
    program: Option<ProgramInfo>,
    line_number: usize,
    frames_seen: usize,
    folds: usize,
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            tables: InternTables::new(),
            arena: vec![ArenaNode::new(None, EngineTag::Root)],
            stack: Vec::new(),
            settled: 0,
            last_call_number: 0,
            program: None,
            line_number: 0,
            frames_seen: 0,
            folds: 0,
        }
    }

    /// Intern tables built so far
    pub fn tables(&self) -> &InternTables {
        &self.tables
    }

    /// Number of lines fed so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Parse and consume one dump line
    ///
    /// # Errors
    /// * `TreeError::Malformed` - the line does not match the record grammar
    /// * `TreeError::UnknownReference` - the line refers to an undefined id
    pub fn feed_line(&mut self, line: &str) -> Result<(), TreeError> {
        self.line_number += 1;
        let record = parse_line(line).map_err(|source| TreeError::Malformed {
            line_number: self.line_number,
            source,
        })?;
        self.push_record(record)
    }

    /// Consume an already-parsed record
    ///
    /// # Errors
    /// * `TreeError::UnknownReference` - the record refers to an undefined id
    pub fn push_record(&mut self, record: Record) -> Result<(), TreeError> {
        match record {
            Record::ProgramHeader(header) => {
                self.set_program(header);
                Ok(())
            }
            Record::CallFrame(frame) => self.push_frame(frame),
        }
    }

    fn set_program(&mut self, header: ProgramHeader) {
        if let Some(previous) = &self.program {
            warn!(
                "Program header repeated at line {} ({} replaces {})",
                self.line_number, header.name, previous.name
            );
        }
        debug!(
            "Program {} (id {:x}), sampling interval {}s",
            header.name, header.id, header.sampling_interval
        );
        self.program = Some(ProgramInfo {
            name: header.name,
            sampling_interval: header.sampling_interval,
        });
    }

    fn push_frame(&mut self, frame: CallFrame) -> Result<(), TreeError> {
        let line_number = self.line_number;
        let at_line = |source| TreeError::UnknownReference {
            line_number,
            source,
        };

        let engine = match &frame.engine {
            Some(engine) => EngineTag::NamedEngine(
                self.tables.resolve_engine(engine).map_err(at_line)?.to_string(),
            ),
            None => EngineTag::Native,
        };
        let (file, function) = self
            .tables
            .resolve_function(&frame.function)
            .map_err(at_line)?;
        let identity = CallIdentity {
            file: file.to_string(),
            function: function.to_string(),
            offset: frame.call_offset.clone(),
        };

        let call_number = frame.call_number;
        if call_number <= self.last_call_number {
            self.fold();
            // The root sentinel counts as the first stack element
            let keep = usize::try_from(call_number.saturating_sub(1)).unwrap_or(usize::MAX);
            self.stack.truncate(keep);
            self.settled = self.settled.min(self.stack.len());
        } else if call_number > self.last_call_number.saturating_add(1) {
            warn!(
                "Line {}: call number {:x} skips depths after {:x}",
                line_number, call_number, self.last_call_number
            );
        }

        trace!(
            "Line {}: push {} (call {:x}, {} ticks)",
            line_number,
            identity,
            call_number,
            frame.tick_count()
        );
        self.stack.push(StackFrame {
            identity,
            engine,
            ticks: frame.tick_count(),
        });
        self.last_call_number = call_number;
        self.frames_seen += 1;
        Ok(())
    }

    /// Merge the current stack into the tree
    ///
    /// Every frame appended since the previous fold contributes its ticks
    /// once: to the root, to each node on its path, and to its own node's
    /// self count. Frames folded earlier only locate their node.
    fn fold(&mut self) {
        let Self {
            arena,
            stack,
            settled,
            folds,
            ..
        } = self;

        let mut path = Vec::with_capacity(stack.len());
        let mut parent = ROOT;
        for frame in stack.iter() {
            parent = child_of(arena, parent, frame);
            path.push(parent);
        }

        for (depth, frame) in stack.iter().enumerate().skip(*settled) {
            if frame.ticks == 0 {
                continue;
            }
            arena[ROOT].count += frame.ticks;
            for &node in &path[..=depth] {
                arena[node].count += frame.ticks;
            }
            arena[path[depth]].self_count += frame.ticks;
        }

        *settled = stack.len();
        *folds += 1;
    }

    /// Flush the last stack and hand out the finished tree
    pub fn finish(mut self) -> CallTreeNode {
        self.fold();
        debug!(
            "Folded {} call frames from {} lines in {} passes into {} nodes",
            self.frames_seen,
            self.line_number,
            self.folds,
            self.arena.len()
        );
        let (engines, files, functions) = self.tables.sizes();
        debug!(
            "Interned {} engines, {} files, {} functions",
            engines, files, functions
        );
        freeze(self.arena, self.program)
    }
}

/// Index of `frame`'s node under `parent`, creating it on first sight
fn child_of(arena: &mut Vec<ArenaNode>, parent: usize, frame: &StackFrame) -> usize {
    if let Some(&index) = arena[parent].child_index.get(&frame.identity) {
        return index;
    }
    let index = arena.len();
    arena.push(ArenaNode::new(
        Some(frame.identity.clone()),
        frame.engine.clone(),
    ));
    let node = &mut arena[parent];
    node.children.push(index);
    node.child_index.insert(frame.identity.clone(), index);
    index
}

/// Convert the arena into an owned tree without recursion
///
/// Children are always stored after their parent, so walking the arena
/// backwards finishes every child before the parent that adopts it.
fn freeze(mut arena: Vec<ArenaNode>, program: Option<ProgramInfo>) -> CallTreeNode {
    let mut finished: Vec<Option<CallTreeNode>> = Vec::new();
    finished.resize_with(arena.len(), || None);

    while let Some(node) = arena.pop() {
        let index = arena.len();
        let children = node
            .children
            .iter()
            .filter_map(|&child| finished[child].take())
            .collect();
        let built = match node.identity {
            Some(identity) => CallTreeNode::new_call(identity, node.engine, node.count, node.self_count),
            None => CallTreeNode::new_root(program.clone(), node.count, node.self_count),
        };
        finished[index] = Some(built.with_children(children));
    }

    finished
        .into_iter()
        .next()
        .flatten()
        .unwrap_or_else(|| CallTreeNode::new_root(program, 0, 0))
}

/// Build a call tree from a line-oriented dump
///
/// **Public** - main entry point for aggregation
///
/// # Arguments
/// * `reader` - Buffered source of dump lines
///
/// # Returns
/// The finished, immutable call tree
///
/// # Errors
/// Any malformed line, unknown reference, or read failure aborts the pass;
/// no partial tree is returned.
pub fn build_call_tree(reader: impl BufRead) -> Result<CallTreeNode, TreeError> {
    let mut builder = TreeBuilder::new();
    for line in reader.lines() {
        builder.feed_line(&line?)?;
    }
    Ok(builder.finish())
}

/// Build a call tree from an in-memory dump
pub fn build_call_tree_from_str(trace: &str) -> Result<CallTreeNode, TreeError> {
    build_call_tree(trace.as_bytes())
}
