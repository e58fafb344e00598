//! The `text` element.
//!
//! Measures as the widest line by display width; with `wrap=true` it
//! soft-wraps to the available width during layout and substitutes a
//! synthetic text leaf carrying the joined wrapped lines, so painting never
//! re-wraps. Characters advance by their display width, so CJK and emoji
//! occupy two columns.

use crate::buffer::{CellBuffer, LogicalBuffer, PaintTarget};
use crate::geometry::{is_in_clip, ClipRegion};
use crate::intrinsics::IntrinsicHandler;
use crate::layout::{char_width, max_line_width, wrap_text, LayoutBox, LayoutContext};
use crate::style::Style;
use crate::vnode::VNode;

pub(crate) fn handler() -> IntrinsicHandler {
    IntrinsicHandler {
        measure: Some(measure_text),
        layout: Some(layout_text),
        paint: Some(paint_text),
        paint_logical: Some(paint_text_logical),
    }
}

fn measure_text(node: &VNode) -> (i32, i32) {
    let text = node.collect_text();
    (max_line_width(&text), text.split('\n').count() as i32)
}

fn layout_text(node: &VNode, avail_width: i32, _avail_height: i32, ctx: &LayoutContext) -> LayoutBox {
    let text = node.collect_text();

    let lines: Vec<String> = if node.props.bool("wrap", false) {
        wrap_text(&text, avail_width)
    } else {
        text.split('\n').map(str::to_string).collect()
    };

    let max_width = lines.iter().map(|l| max_line_width(l)).max().unwrap_or(0);
    let width = max_width.min(avail_width);
    let height = lines.len() as i32;

    // Substitute a synthetic leaf carrying the final lines; painting reads
    // it verbatim.
    let mut synthetic = VNode::text(lines.join("\n"));
    if let Some(style) = node.props.get("style") {
        synthetic.props = synthetic.props.set("style", style.clone());
    }

    LayoutBox::leaf(synthetic, ctx.x, ctx.y, width, height, node.props.int("zIndex", 0))
}

// ---------------------------------------------------------------------------
// Painting
// ---------------------------------------------------------------------------

/// Write a text block line by line, merging the style into the target,
/// advancing each character by its display width and skipping rows and
/// cells outside the clip.
pub(crate) fn paint_lines(
    text: &str,
    style: &Style,
    x: i32,
    y: i32,
    clip: Option<&ClipRegion>,
    target: &mut dyn PaintTarget,
) {
    for (line_idx, line) in text.split('\n').enumerate() {
        let line_y = y + line_idx as i32;
        if let Some(clip) = clip {
            if line_y < clip.min_y || line_y >= clip.max_y {
                continue;
            }
        }
        let mut char_x = x;
        for ch in line.chars() {
            if is_in_clip(char_x, line_y, clip) {
                target.merge_cell(char_x, line_y, ch, style);
            }
            char_x += char_width(ch);
        }
    }
}

fn paint_text_target(layout: &LayoutBox, target: &mut dyn PaintTarget, clip: Option<&ClipRegion>) {
    let style = layout.node.props.style();
    paint_lines(
        layout.node.text_content().unwrap_or(""),
        &style,
        layout.x,
        layout.y,
        clip,
        target,
    );
}

fn paint_text(layout: &LayoutBox, buf: &mut CellBuffer, clip: Option<&ClipRegion>) {
    paint_text_target(layout, buf, clip);
}

fn paint_text_logical(layout: &LayoutBox, buf: &mut LogicalBuffer, clip: Option<&ClipRegion>) {
    paint_text_target(layout, buf, clip);
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use crate::buffer::CellBuffer;
    use crate::intrinsics::paint_tree;
    use crate::layout::{compute_layout, measure_node, LayoutContext};
    use crate::style::{Color, Style};
    use crate::vnode::{Props, VNode};

    fn render(node: &VNode, width: i32, height: i32) -> CellBuffer {
        let layout = compute_layout(node, LayoutContext { x: 0, y: 0, width, height });
        let mut buf = CellBuffer::new(width, height);
        paint_tree(&layout, &mut buf, None);
        buf
    }

    #[test]
    fn text_element_measures_children_text() {
        let node = VNode::element("text", Props::new(), vec![VNode::text("hello\nhi")]);
        assert_eq!(measure_node(&node), (5, 2));
    }

    #[test]
    fn cjk_measures_double_width() {
        let node = VNode::element("text", Props::new(), vec![VNode::text("日本")]);
        assert_eq!(measure_node(&node), (4, 1));
    }

    #[test]
    fn paints_with_style() {
        let node = VNode::element(
            "text",
            Props::new().set("style", Style::fg(Color::Red)),
            vec![VNode::text("hi")],
        );
        let buf = render(&node, 5, 1);
        assert_eq!(buf.get(0, 0).ch, 'h');
        assert_eq!(buf.get(0, 0).style.fg, Color::Red);
    }

    #[test]
    fn wide_chars_advance_two_columns() {
        let node = VNode::element("text", Props::new(), vec![VNode::text("日x")]);
        let buf = render(&node, 5, 1);
        assert_eq!(buf.get(0, 0).ch, '日');
        // The next glyph lands two columns later.
        assert_eq!(buf.get(2, 0).ch, 'x');
    }

    #[test]
    fn wrap_substitutes_wrapped_lines() {
        let node = VNode::element(
            "text",
            Props::new().set("wrap", true),
            vec![VNode::text("hello world")],
        );
        let buf = render(&node, 7, 2);
        assert_eq!(buf.to_debug_string(), "hello  \nworld  ");
    }

    #[test]
    fn wrap_cjk_by_display_width() {
        let node = VNode::element(
            "text",
            Props::new().set("wrap", true),
            vec![VNode::text("日本語テスト")],
        );
        let buf = render(&node, 6, 2);
        assert_eq!(buf.get(0, 0).ch, '日');
        assert_eq!(buf.get(0, 1).ch, 'テ');
    }

    #[test]
    fn unwrapped_text_splits_on_newlines_only() {
        let node = VNode::element("text", Props::new(), vec![VNode::text("ab\ncd")]);
        let buf = render(&node, 4, 2);
        assert_eq!(buf.to_debug_string(), "ab  \ncd  ");
    }
}
