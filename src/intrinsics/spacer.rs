//! The `spacer` element: an invisible box of declared size.

use crate::intrinsics::IntrinsicHandler;
use crate::layout::{LayoutBox, LayoutContext};
use crate::vnode::VNode;

pub(crate) fn handler() -> IntrinsicHandler {
    IntrinsicHandler {
        measure: Some(measure_spacer),
        layout: Some(layout_spacer),
        // Spacers are invisible: no paint functions.
        paint: None,
        paint_logical: None,
    }
}

fn measure_spacer(node: &VNode) -> (i32, i32) {
    (node.props.int("width", 0), node.props.int("height", 0))
}

fn layout_spacer(node: &VNode, _aw: i32, _ah: i32, ctx: &LayoutContext) -> LayoutBox {
    let (width, height) = measure_spacer(node);
    LayoutBox::leaf(node.clone(), ctx.x, ctx.y, width, height, 0)
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use crate::buffer::CellBuffer;
    use crate::intrinsics::paint_tree;
    use crate::layout::{compute_layout, measure_node, LayoutContext};
    use crate::vnode::{Props, VNode};

    #[test]
    fn spacer_takes_declared_size() {
        let node = VNode::element("spacer", Props::new().set("width", 3).set("height", 2), vec![]);
        assert_eq!(measure_node(&node), (3, 2));
    }

    #[test]
    fn spacer_defaults_to_zero() {
        let node = VNode::element("spacer", Props::new(), vec![]);
        assert_eq!(measure_node(&node), (0, 0));
    }

    #[test]
    fn spacer_separates_row_children() {
        let root = VNode::element(
            "box",
            Props::new().set("width", 10).set("height", 1).set("direction", "row"),
            vec![
                VNode::text("a"),
                VNode::element("spacer", Props::new().set("width", 3), vec![]),
                VNode::text("b"),
            ],
        );
        let layout = compute_layout(&root, LayoutContext { x: 0, y: 0, width: 10, height: 1 });
        let mut buf = CellBuffer::new(10, 1);
        paint_tree(&layout, &mut buf, None);
        assert_eq!(buf.to_debug_string(), "a   b     ");
    }
}
