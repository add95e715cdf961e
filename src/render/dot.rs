//! Graphviz DOT rendering of a call tree.
//!
//! One node per call tree node and one edge per parent/child pair.
//! Node shape and label depend on the engine tag:
//! - root: `doublecircle`, `$ <program>` and the total
//! - native: `<function> @ <offset>`
//! - named engine: `box`, `<file>, line <n>` (offsets are line numbers)
//!
//! Fill color runs from cyan (cold) to red (hot) by share of the total.

use crate::aggregator::call_tree::offset_as_line;
use crate::aggregator::{CallTreeNode, EngineTag};
use crate::aggregator::metrics::percentage;
use log::{debug, info};

/// Render a call tree as a DOT digraph
///
/// **Public** - main entry point for Graphviz output
///
/// # Arguments
/// * `tree` - Root of the finished call tree
///
/// # Returns
/// DOT source; feed it to `dot -Tpng` to get an image
pub fn render_dot(tree: &CallTreeNode) -> String {
    let total = tree.count();
    let mut out = String::from("digraph calltree {\n");
    // ids of the nodes on the path to the current one, by depth
    let mut ancestors: Vec<usize> = Vec::new();

    for (node_id, (depth, node)) in tree.walk().enumerate() {
        ancestors.truncate(depth);

        let label = escape_label(&node_label(node, total));
        let shape = match node.engine() {
            EngineTag::Root => ", shape=doublecircle",
            EngineTag::NamedEngine(_) => ", shape=box",
            EngineTag::Native => "",
        };
        out.push_str(&format!(
            "  {} [label=\"{}\"{}, style=filled, fillcolor=\"{:.3} 1.000 1.000\"];\n",
            node_id,
            label,
            shape,
            hue(node.count(), total)
        ));
        if let Some(parent) = ancestors.last() {
            out.push_str(&format!("  {} -> {};\n", parent, node_id));
        }

        ancestors.push(node_id);
    }

    out.push_str("}\n");

    debug!("Rendered DOT graph for {} nodes", tree.node_count());
    info!("Graphviz graph generated ({} bytes)", out.len());
    out
}

/// Two-line node label: what the node is, then `<count> : <share>%`
fn node_label(node: &CallTreeNode, total: u64) -> String {
    let share = format!(
        "{} : {}%",
        node.count(),
        three_significant(percentage(node.count(), total))
    );
    match (node.engine(), node.identity()) {
        (EngineTag::Root, _) | (_, None) => format!(
            "$ {}\n{} : 100%",
            node.program_name().unwrap_or("root"),
            node.count()
        ),
        (EngineTag::NamedEngine(_), Some(id)) => {
            format!("{}, line {}\n{}", id.file, offset_as_line(&id.offset), share)
        }
        (EngineTag::Native, Some(id)) => format!("{} @ {}\n{}", id.function, id.offset, share),
    }
}

/// HSV hue: 0.5 (cyan) for nothing, 0.0 (red) for the whole total
fn hue(count: u64, total: u64) -> f64 {
    let ratio = if total > 0 {
        count as f64 / total as f64
    } else {
        0.0
    };
    0.5 - ratio / 2.0
}

/// Format with three significant digits, dropping trailing zeros
fn three_significant(value: f64) -> String {
    if value == 0.0 || !value.is_finite() {
        return "0".to_string();
    }
    let magnitude = value.abs().log10().floor() as i32;
    let decimals = (2 - magnitude).max(0) as usize;
    let text = format!("{:.*}", decimals, value);
    if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        text
    }
}

fn escape_label(label: &str) -> String {
    let mut escaped = String::with_capacity(label.len());
    for c in label.chars() {
        match c {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            other => escaped.push(other),
        }
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_significant() {
        assert_eq!(three_significant(100.0), "100");
        assert_eq!(three_significant(50.0), "50");
        assert_eq!(three_significant(100.0 / 3.0), "33.3");
        assert_eq!(three_significant(0.012345), "0.0123");
        assert_eq!(three_significant(0.0), "0");
    }

    #[test]
    fn test_hue_range() {
        assert_eq!(hue(0, 10), 0.5);
        assert_eq!(hue(10, 10), 0.0);
        assert_eq!(hue(5, 0), 0.5);
    }

    #[test]
    fn test_escape_label() {
        assert_eq!(escape_label("a \"b\"\nc"), "a \\\"b\\\"\\nc");
    }
}
