//! One-shot static rendering.
//!
//! Renders a node tree once — expand, layout, paint, encode — as styled
//! lines with no cursor positioning, for command output and tests. Trailing
//! blank rows are trimmed.

use std::io::{self, Write};

use crate::buffer::CellBuffer;
use crate::intrinsics::paint_tree;
use crate::layout::{compute_layout, LayoutContext};
use crate::render::ansi::buffer_to_ansi_lines;
use crate::style::EMPTY_CELL;
use crate::vnode::VNode;

/// Dimensions for one-shot rendering; zero means "query the terminal"
/// (falling back to 80×24).
#[derive(Debug, Clone, Copy, Default)]
pub struct PrintOptions {
    pub width: i32,
    pub height: i32,
}

/// Render a node tree to stdout with ANSI styling.
pub fn print_node(node: &VNode) {
    let _ = fprint_node(&mut io::stdout(), node, PrintOptions::default());
}

/// Render a node tree to a string with ANSI styling.
pub fn sprint_node(node: &VNode) -> String {
    let mut out = Vec::new();
    let _ = fprint_node(&mut out, node, PrintOptions::default());
    String::from_utf8_lossy(&out).into_owned()
}

/// Render a node tree to a writer with ANSI styling.
pub fn fprint_node(w: &mut dyn Write, node: &VNode, opts: PrintOptions) -> io::Result<()> {
    let mut width = opts.width;
    let mut height = opts.height;
    if width <= 0 || height <= 0 {
        if let Ok((tw, th)) = crossterm::terminal::size() {
            if width <= 0 {
                width = tw as i32;
            }
            if height <= 0 {
                height = th as i32;
            }
        }
    }
    if width <= 0 {
        width = 80;
    }
    if height <= 0 {
        height = 24;
    }

    let layout = compute_layout(node, LayoutContext { x: 0, y: 0, width, height });
    let content_height = layout.height.min(height);
    if content_height <= 0 {
        return Ok(());
    }

    let mut buf = CellBuffer::new(width, content_height);
    paint_tree(&layout, &mut buf, None);

    // Trim trailing blank rows.
    let mut last_row = 0;
    'rows: for y in (0..content_height).rev() {
        for x in 0..width {
            if *buf.get_ref(x, y) != EMPTY_CELL {
                last_row = y;
                break 'rows;
            }
        }
    }

    let output = buffer_to_ansi_lines(&buf, last_row);
    w.write_all(output.as_bytes())?;
    w.write_all(b"\n")
}

// ===========================================================================
// Tests
// ===========================================================================
