//! Intrinsic elements: the registry and the paint dispatch.
//!
//! An intrinsic element is a named kind (`"box"`, `"input"`, …) backed by a
//! registered [`IntrinsicHandler`] with optional measure, layout, and paint
//! functions. The registry is process-wide behind a read-favoring lock;
//! built-ins install themselves once, before first use, and later
//! registrations for the same name overwrite earlier ones.
//!
//! Registration is not synchronized against concurrent rendering: install
//! custom kinds at program start, before the first render.

pub mod ansi_text;
pub mod boxes;
pub mod button;
pub mod input;
pub mod link;
pub mod select;
pub mod spacer;
pub mod text;

use std::collections::HashMap;
use std::sync::{Arc, LazyLock, Once, PoisonError, RwLock};

use crate::buffer::{CellBuffer, LogicalBuffer};
use crate::geometry::ClipRegion;
use crate::layout::{LayoutBox, LayoutContext};
use crate::vnode::{NodeKind, VNode};

/// Measure an element's intrinsic size: `(width, height)` in cells.
pub type MeasureFn = fn(&VNode) -> (i32, i32);

/// Lay out an element given the available width/height and context.
pub type LayoutFn = fn(&VNode, i32, i32, &LayoutContext) -> LayoutBox;

/// Paint an element into the fixed visual grid.
pub type PaintFn = fn(&LayoutBox, &mut CellBuffer, Option<&ClipRegion>);

/// Paint an element into the logical buffer.
pub type PaintLogicalFn = fn(&LayoutBox, &mut LogicalBuffer, Option<&ClipRegion>);

/// How to measure, lay out, and paint one element kind. Any function may be
/// absent; layout falls back to the default flex container, painting to
/// nothing.
#[derive(Default)]
pub struct IntrinsicHandler {
    pub measure: Option<MeasureFn>,
    pub layout: Option<LayoutFn>,
    pub paint: Option<PaintFn>,
    pub paint_logical: Option<PaintLogicalFn>,
}

static REGISTRY: LazyLock<RwLock<HashMap<String, Arc<IntrinsicHandler>>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

static BUILTINS: Once = Once::new();

fn ensure_builtins() {
    BUILTINS.call_once(|| {
        let mut registry = REGISTRY.write().unwrap_or_else(PoisonError::into_inner);
        registry.insert("box".into(), Arc::new(boxes::handler()));
        registry.insert("text".into(), Arc::new(text::handler()));
        registry.insert("input".into(), Arc::new(input::handler()));
        registry.insert("select".into(), Arc::new(select::handler()));
        registry.insert("option".into(), Arc::new(select::option_handler()));
        registry.insert("button".into(), Arc::new(button::handler()));
        registry.insert("link".into(), Arc::new(link::handler()));
        registry.insert("spacer".into(), Arc::new(spacer::handler()));
        registry.insert("ansi".into(), Arc::new(ansi_text::handler()));
    });
}

/// Register a handler for an element kind, replacing any previous one.
pub fn register_intrinsic(name: impl Into<String>, handler: IntrinsicHandler) {
    ensure_builtins();
    REGISTRY
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .insert(name.into(), Arc::new(handler));
}

/// Look up the handler for an element kind.
pub fn get_handler(name: &str) -> Option<Arc<IntrinsicHandler>> {
    ensure_builtins();
    REGISTRY
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(name)
        .cloned()
}

/// Whether a handler is registered for the kind.
pub fn has_handler(name: &str) -> bool {
    get_handler(name).is_some()
}

// ---------------------------------------------------------------------------
// Paint dispatch
// ---------------------------------------------------------------------------

fn paint_text_leaf(
    layout: &LayoutBox,
    target: &mut dyn crate::buffer::PaintTarget,
    clip: Option<&ClipRegion>,
) {
    let style = layout.node.props.style();
    text::paint_lines(
        layout.node.text_content().unwrap_or(""),
        &style,
        layout.x,
        layout.y,
        clip,
        target,
    );
}

/// Paint a layout tree into a cell buffer, dispatching each box to its
/// element's paint function. Text leaves are painted directly; fragments
/// paint only their children.
pub fn paint_tree(layout: &LayoutBox, buf: &mut CellBuffer, clip: Option<&ClipRegion>) {
    match &layout.node.kind {
        NodeKind::Text => paint_text_leaf(layout, buf, clip),
        NodeKind::Fragment => {
            for child in &layout.children {
                paint_tree(child, buf, clip);
            }
        }
        NodeKind::Element(kind) => {
            let handler = get_handler(kind)
                .unwrap_or_else(|| panic!("prism-tui: unknown element type: {kind}"));
            if let Some(paint) = handler.paint {
                paint(layout, buf, clip);
            }
        }
        NodeKind::Component(_) => {}
    }
}

/// As [`paint_tree`], into a logical buffer.
pub fn paint_tree_logical(layout: &LayoutBox, buf: &mut LogicalBuffer, clip: Option<&ClipRegion>) {
    match &layout.node.kind {
        NodeKind::Text => paint_text_leaf(layout, buf, clip),
        NodeKind::Fragment => {
            for child in &layout.children {
                paint_tree_logical(child, buf, clip);
            }
        }
        NodeKind::Element(kind) => {
            let handler = get_handler(kind)
                .unwrap_or_else(|| panic!("prism-tui: unknown element type: {kind}"));
            if let Some(paint) = handler.paint_logical {
                paint(layout, buf, clip);
            }
        }
        NodeKind::Component(_) => {}
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutBox;
    use crate::vnode::Props;

    #[test]
    fn builtins_are_registered() {
        for kind in ["box", "text", "input", "select", "button", "link", "spacer", "ansi"] {
            assert!(has_handler(kind), "missing builtin {kind}");
        }
        assert!(!has_handler("marquee"));
    }

    #[test]
    fn later_registration_overrides() {
        fn fixed_measure(_: &VNode) -> (i32, i32) {
            (7, 7)
        }
        register_intrinsic(
            "custom-gauge",
            IntrinsicHandler { measure: Some(fixed_measure), ..Default::default() },
        );
        let node = VNode::element("custom-gauge", Props::new(), vec![]);
        assert_eq!(crate::layout::measure_node(&node), (7, 7));

        fn other_measure(_: &VNode) -> (i32, i32) {
            (9, 1)
        }
        register_intrinsic(
            "custom-gauge",
            IntrinsicHandler { measure: Some(other_measure), ..Default::default() },
        );
        assert_eq!(crate::layout::measure_node(&node), (9, 1));
    }

    #[test]
    #[should_panic(expected = "unknown element type: marquee")]
    fn painting_unknown_kind_panics() {
        let node = VNode::element("marquee", Props::new(), vec![]);
        let layout = LayoutBox::leaf(node, 0, 0, 1, 1, 0);
        let mut buf = CellBuffer::new(4, 4);
        paint_tree(&layout, &mut buf, None);
    }
}
