//! igprof-calltree
//!
//! Aggregates IgProf trace dumps into call trees: every distinct call
//! path becomes one node carrying its inclusive and self tick counts.
//!
//! ## Getting Started
//!
//! ```bash
//! igprof-calltree convert --input trace.txt --dot graph.dot --flamegraph fg.svg
//! ```
//!
//! As a library:
//!
//! ```
//! use igprof_calltree::aggregator::build_call_tree_from_str;
//!
//! let tree = build_call_tree_from_str(
//!     "P=(HEX ID=1 N=(prog) T=0.01)\nC1 FN1=(F1=(a.c)+10 N=(foo))+0 V0:(5,5,5)\n",
//! )?;
//! assert_eq!(tree.count(), 5);
//! # Ok::<(), igprof_calltree::utils::TreeError>(())
//! ```

pub mod aggregator;
pub mod commands;
pub mod output;
pub mod parser;
pub mod render;
pub mod utils;
