//! The `ansi` element: pre-styled text.
//!
//! Content that already carries ANSI escape sequences (tool output, another
//! renderer's frames) is parsed into styled segments and painted with each
//! segment's style merged onto the element's own. Measurement uses the
//! stripped text, so escape bytes never count as columns.

use crate::buffer::{CellBuffer, LogicalBuffer, PaintTarget};
use crate::geometry::{is_in_clip, ClipRegion};
use crate::intrinsics::IntrinsicHandler;
use crate::layout::{char_width, display_width, wrap_text, LayoutBox, LayoutContext};
use crate::render::{parse_ansi_line, strip_ansi};
use crate::vnode::{PropValue, VNode};

pub(crate) fn handler() -> IntrinsicHandler {
    IntrinsicHandler {
        measure: Some(measure_ansi),
        layout: Some(layout_ansi),
        paint: Some(paint_ansi),
        paint_logical: Some(paint_ansi_logical),
    }
}

fn content_of(node: &VNode) -> String {
    match node.props.get("content") {
        Some(PropValue::Str(s)) => s.clone(),
        _ => node.collect_text(),
    }
}

fn stripped_max_width(text: &str) -> i32 {
    text.split('\n').map(|line| display_width(&strip_ansi(line))).max().unwrap_or(0)
}

fn measure_ansi(node: &VNode) -> (i32, i32) {
    let text = content_of(node);
    let margin = node.props.spacing("margin");
    (
        stripped_max_width(&text) + margin.horizontal(),
        text.split('\n').count() as i32 + margin.vertical(),
    )
}

fn layout_ansi(node: &VNode, avail_width: i32, _ah: i32, ctx: &LayoutContext) -> LayoutBox {
    let text = content_of(node);
    let margin = node.props.spacing("margin");
    let content_width = (avail_width - margin.horizontal()).max(0);

    let lines: Vec<String> = if node.props.bool("wrap", false) {
        wrap_text(&text, content_width)
    } else {
        text.split('\n').map(str::to_string).collect()
    };

    let max_width = lines.iter().map(|l| stripped_max_width(l)).max().unwrap_or(0);
    let width = max_width.min(content_width);
    let height = lines.len() as i32;

    // Synthesize another `ansi` node (not a text leaf) so painting dispatches
    // back here and re-parses the joined lines.
    let mut props = crate::vnode::Props::new().set("content", lines.join("\n"));
    if let Some(style) = node.props.get("style") {
        props = props.set("style", style.clone());
    }
    let synthetic = VNode::element("ansi", props, vec![]);

    let x = ctx.x + margin.left;
    let y = ctx.y + margin.top;
    LayoutBox::leaf(synthetic, x, y, width, height, node.props.int("zIndex", 0))
}

fn paint_ansi_cells(layout: &LayoutBox, clip: Option<&ClipRegion>, target: &mut dyn PaintTarget) {
    let node = &layout.node;
    let base_style = node.props.style();
    let text = content_of(node);

    for (line_idx, line) in text.split('\n').enumerate() {
        let line_y = layout.y + line_idx as i32;
        if let Some(clip) = clip {
            if line_y < clip.min_y || line_y >= clip.max_y {
                continue;
            }
        }

        let mut char_x = layout.x;
        for segment in parse_ansi_line(line, &base_style) {
            for ch in segment.text.chars() {
                if is_in_clip(char_x, line_y, clip) {
                    target.merge_cell(char_x, line_y, ch, &segment.style);
                }
                char_x += char_width(ch);
            }
        }
    }
}

fn paint_ansi(layout: &LayoutBox, buf: &mut CellBuffer, clip: Option<&ClipRegion>) {
    paint_ansi_cells(layout, clip, buf);
}

fn paint_ansi_logical(layout: &LayoutBox, buf: &mut LogicalBuffer, clip: Option<&ClipRegion>) {
    paint_ansi_cells(layout, clip, buf);
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
    fn measures_stripped_width() {
        let node = VNode::element(
            "ansi",
            Props::new(),
            vec![VNode::text("\x1b[31mred\x1b[0m")],
        );
        assert_eq!(measure_node(&node), (3, 1));
    }

    #[test]
    fn margin_adds_to_measure() {
        let node = VNode::element(
            "ansi",
            Props::new().set("margin", 1),
            vec![VNode::text("ab")],
        );
        assert_eq!(measure_node(&node), (4, 3));
    }

    #[test]
    fn paints_embedded_styles() {
        let node = VNode::element(
            "ansi",
            Props::new(),
            vec![VNode::text("\x1b[31mab\x1b[0mcd")],
        );
        let buf = render(&node, 8, 1);
        assert_eq!(buf.get(0, 0).ch, 'a');
        assert_eq!(buf.get(0, 0).style.fg, Color::Red);
        assert_eq!(buf.get(2, 0).ch, 'c');
        assert_eq!(buf.get(2, 0).style.fg, Color::None);
    }

    #[test]
    fn segment_styles_merge_over_base() {
        let node = VNode::element(
            "ansi",
            Props::new().set("style", Style { bold: true, ..Style::default() }),
            vec![VNode::text("\x1b[32mok\x1b[0m")],
        );
        let buf = render(&node, 4, 1);
        let cell = buf.get(0, 0);
        assert_eq!(cell.style.fg, Color::Green);
        assert!(cell.style.bold);
    }
}
