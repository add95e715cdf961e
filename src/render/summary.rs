//! Terminal text summary of a call tree.

use crate::aggregator::metrics::percentage;
use crate::aggregator::stack_builder::CollapsedStack;
use crate::aggregator::{CallTreeNode, EngineTag};

const RESET: &str = "\x1b[0m";

/// ANSI color for the engine of a path's last frame
fn ansi_color(engine: &EngineTag) -> &'static str {
    match engine {
        EngineTag::Root => "\x1b[37m",           // White
        EngineTag::Native => "\x1b[33m",         // Yellow
        EngineTag::NamedEngine(_) => "\x1b[36m", // Cyan
    }
}

/// Create a rich text summary with percentages and table formatting
pub fn generate_text_summary(
    tree: &CallTreeNode,
    stacks: &[CollapsedStack],
    max_lines: usize,
) -> String {
    let total = tree.count();
    let mut lines = Vec::new();

    lines.push(format!(
        "  Program: {}   Total ticks: {}   Sampling interval: {}",
        tree.program_name().unwrap_or("-"),
        total,
        tree.sampling_interval()
            .map(|t| format!("{}s", t))
            .unwrap_or_else(|| "-".to_string())
    ));
    lines.push(String::new());
    lines.push("  HOT PATHS (self ticks)".to_string());
    lines.push("  ┏━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┳━━━━━━━━━━━━━━┳━━━━━━━━━┓".to_string());
    lines.push(format!("  ┃ {:<52} ┃ {:^12} ┃ {:^7} ┃", "Call Path (Hottest First)", "TICKS", "%"));
    lines.push("  ┣━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━╋━━━━━━━━━━━━━━╋━━━━━━━━━┫".to_string());

    for stack in stacks.iter().take(max_lines) {
        // Keep the tail of long paths, it holds the hot frame
        let width = stack.stack.chars().count();
        let display_stack = if width > 52 {
            let tail: String = stack.stack.chars().skip(width - 49).collect();
            format!("...{}", tail)
        } else {
            stack.stack.clone()
        };

        lines.push(format!(
            "  ┃ {}{:<52}{} ┃ {:>12} ┃ {:>6.1}% ┃",
            ansi_color(&stack.engine),
            display_stack,
            RESET,
            stack.weight,
            percentage(stack.weight, total)
        ));
    }

    lines.push("  ┗━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━┻━━━━━━━━━━━━━━┻━━━━━━━━━┛".to_string());

    if stacks.len() > max_lines {
        lines.push(String::new());
        lines.push(format!("   (Showing top {} of {} call paths)", max_lines, stacks.len()));
    }

    lines.join("\n")
}
