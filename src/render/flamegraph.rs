//! SVG flamegraph generation using the inferno library.
//!
//! The call tree is first flattened into collapsed stacks (one line per
//! call path with self ticks), which is exactly what inferno consumes.

use crate::aggregator::stack_builder::CollapsedStack;
use crate::utils::config::{
    DEFAULT_FLAMEGRAPH_TITLE, DEFAULT_FLAMEGRAPH_WIDTH, FLAMEGRAPH_COUNT_NAME,
};
use crate::utils::error::RenderError;
use log::info;

/// Flamegraph configuration
#[derive(Debug, Clone)]
pub struct FlamegraphConfig {
    pub title: String,
    pub width: usize,
}

impl Default for FlamegraphConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_FLAMEGRAPH_TITLE.to_string(),
            width: DEFAULT_FLAMEGRAPH_WIDTH,
        }
    }
}

impl FlamegraphConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width;
        self
    }
}

/// Folded-stack text, one `a;b;c <ticks>` line per stack
pub fn collapsed_text(stacks: &[CollapsedStack]) -> String {
    let mut text = String::new();
    for stack in stacks {
        text.push_str(&stack.to_line());
        text.push('\n');
    }
    text
}

/// Generate SVG flamegraph from collapsed stacks
///
/// **Public** - main entry point for flamegraph rendering
///
/// # Errors
/// * `RenderError::EmptyTree` - no stack carries any ticks
/// * `RenderError::Flamegraph` - inferno rejected the input
pub fn generate_flamegraph(
    stacks: &[CollapsedStack],
    config: Option<&FlamegraphConfig>,
) -> Result<String, RenderError> {
    if stacks.iter().all(|s| s.weight == 0) {
        return Err(RenderError::EmptyTree);
    }

    let config = config.cloned().unwrap_or_default();
    info!("Generating flamegraph with {} stacks", stacks.len());

    let lines: Vec<String> = stacks.iter().map(CollapsedStack::to_line).collect();

    let mut options = inferno::flamegraph::Options::default();
    options.title = config.title;
    options.count_name = FLAMEGRAPH_COUNT_NAME.to_string();
    options.image_width = Some(config.width);

    let mut svg = Vec::new();
    inferno::flamegraph::from_lines(&mut options, lines.iter().map(String::as_str), &mut svg)
        .map_err(|e| RenderError::Flamegraph(e.to_string()))?;

    let svg = String::from_utf8(svg).map_err(|e| RenderError::Flamegraph(e.to_string()))?;
    info!("Flamegraph generated successfully ({} bytes)", svg.len());
    Ok(svg)
}
