//! Rendering of finished call trees.
//!
//! Renderers only read the tree:
//! - Graphviz DOT graphs (node shape and label per engine)
//! - SVG flamegraphs via inferno
//! - Terminal text summaries

pub mod dot;
pub mod flamegraph;
pub mod summary;

// Re-export main types
pub use dot::render_dot;
pub use flamegraph::{collapsed_text, generate_flamegraph, FlamegraphConfig};
pub use summary::generate_text_summary;
