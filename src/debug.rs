//! Layout-tree inspection helpers.

use std::fmt::Write as _;

use crate::layout::LayoutBox;
use crate::vnode::NodeKind;

/// Render the layout tree as an indented listing of kinds and rectangles.
/// Inner rectangles appear only when they differ from the outer box.
pub fn sprint_layout(layout: &LayoutBox) -> String {
    let mut out = String::new();
    write_layout(&mut out, layout, 0);
    out
}

fn write_layout(out: &mut String, layout: &LayoutBox, depth: usize) {
    let kind = match &layout.node.kind {
        NodeKind::Text => "text-node",
        NodeKind::Fragment => "fragment",
        NodeKind::Element(name) => name.as_str(),
        NodeKind::Component(_) => "component",
    };

    let _ = write!(
        out,
        "{}{} x={} y={} w={} h={}",
        "  ".repeat(depth),
        kind,
        layout.x,
        layout.y,
        layout.width,
        layout.height
    );
    if layout.inner_x != layout.x
        || layout.inner_y != layout.y
        || layout.inner_width != layout.width
        || layout.inner_height != layout.height
    {
        let _ = write!(
            out,
            " inner(x={} y={} w={} h={})",
            layout.inner_x, layout.inner_y, layout.inner_width, layout.inner_height
        );
    }
    out.push('\n');

    for child in &layout.children {
        write_layout(out, child, depth + 1);
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{compute_layout, LayoutContext};
    use crate::vnode::{Props, VNode};

    #[test]
    fn dump_shows_kinds_and_rects() {
        let node = VNode::element(
            "box",
            Props::new().set("width", 8).set("height", 3).set("border", "single"),
            vec![VNode::text("hi")],
        );
        let layout = compute_layout(&node, LayoutContext { x: 0, y: 0, width: 8, height: 3 });
        let dump = sprint_layout(&layout);

        let mut lines = dump.lines();
        let root = lines.next().unwrap();
        assert!(root.starts_with("box x=0 y=0 w=8 h=3"));
        assert!(root.contains("inner(x=1 y=1 w=6 h=1)"));
        let child = lines.next().unwrap();
        assert!(child.starts_with("  text-node"));
    }
}
