//! The `box` element: the flex container.
//!
//! A box measures as the flex sum of its children plus padding and border,
//! sizes itself to its content (clamped to the available width) unless given
//! explicit dimensions, and paints background fill, border glyphs, and its
//! children — clipped to the inner area when overflow is `hidden` or
//! `scroll`.

use crate::buffer::{CellBuffer, LogicalBuffer, PaintTarget};
use crate::geometry::{intersect_clip, is_in_clip, ClipRegion};
use crate::intrinsics::{paint_tree, paint_tree_logical, IntrinsicHandler};
use crate::layout::{
    absolute_children, layout_absolute_children, layout_flex_children, measure_container,
    measure_node, relative_children, Align, BorderStyle, ChildMeasurement, Direction, Justify,
    LayoutBox, LayoutContext, Overflow,
};
use crate::style::{Cell, Style};
use crate::vnode::VNode;

pub(crate) fn handler() -> IntrinsicHandler {
    IntrinsicHandler {
        measure: Some(measure_box),
        layout: Some(layout_box),
        paint: Some(paint_box),
        paint_logical: Some(paint_box_logical),
    }
}

// ---------------------------------------------------------------------------
// Measure and layout
// ---------------------------------------------------------------------------

fn measure_box(node: &VNode) -> (i32, i32) {
    measure_container(node)
}

fn layout_box(node: &VNode, avail_width: i32, avail_height: i32, ctx: &LayoutContext) -> LayoutBox {
    let props = &node.props;
    let padding = props.spacing("padding");
    let margin = props.spacing("margin");
    let border = BorderStyle::from_props(props).size();

    let direction = Direction::from_props(props);
    let justify = Justify::from_props(props);
    let align = Align::from_props(props);
    let gap = props.int("gap", 0);

    // Boxes are content-sized: explicit props win, otherwise the measured
    // size clamped to what's available.
    let (measured_w, measured_h) = measure_box(node);
    let mut box_width = props.int("width", -1);
    if box_width < 0 {
        box_width = measured_w.min(avail_width - margin.horizontal());
    }
    let mut box_height = props.int("height", -1);
    if box_height < 0 {
        box_height = measured_h;
    }

    let box_x = ctx.x + margin.left;
    let box_y = ctx.y + margin.top;
    let inner_x = box_x + border + padding.left;
    let inner_y = box_y + border + padding.top;
    let inner_width = box_width - border * 2 - padding.horizontal();
    let inner_height = box_height - border * 2 - padding.vertical();

    let mut absolute_boxes = Vec::new();

    let measurements: Vec<ChildMeasurement> = relative_children(node)
        .into_iter()
        .map(|child| {
            let (w, h) = measure_node(&child);
            ChildMeasurement { node: child, width: w, height: h }
        })
        .collect();

    let mut children = layout_flex_children(
        &measurements,
        LayoutContext { x: inner_x, y: inner_y, width: inner_width, height: inner_height },
        direction,
        justify,
        align,
        gap,
        &mut absolute_boxes,
    );

    if !absolute_children(node).is_empty() {
        layout_absolute_children(
            node,
            box_x,
            box_y,
            LayoutContext { x: ctx.x, y: ctx.y, width: avail_width, height: avail_height },
            &mut absolute_boxes,
        );
    }

    // Absolutes ride along as children; the root pass hoists and z-sorts
    // them.
    children.append(&mut absolute_boxes);

    LayoutBox {
        x: box_x,
        y: box_y,
        width: box_width,
        height: box_height,
        inner_x,
        inner_y,
        inner_width,
        inner_height,
        node: node.clone(),
        children,
        z_index: props.int("zIndex", 0),
    }
}

// ---------------------------------------------------------------------------
// Paint
// ---------------------------------------------------------------------------

/// Paint a box's own visuals (fill and border) and return the clip the
/// children inherit.
fn paint_box_cells(
    layout: &LayoutBox,
    clip: Option<&ClipRegion>,
    target: &mut dyn PaintTarget,
) -> Option<ClipRegion> {
    let node = &layout.node;
    let (x, y, width, height) = (layout.x, layout.y, layout.width, layout.height);

    let style = node.props.style();
    let border_style = BorderStyle::from_props(&node.props);
    let overflow = Overflow::from_props(&node.props);

    // Background fill: plain spaces carrying only the background color.
    if style.has_bg() {
        let fill = Style::bg(style.bg);
        for dy in 0..height {
            for dx in 0..width {
                let (cx, cy) = (x + dx, y + dy);
                if is_in_clip(cx, cy, clip) {
                    target.set_cell(cx, cy, Cell::new(' ', fill.clone()));
                }
            }
        }
    }

    // Border glyphs carry the foreground only; the merge setter lets the
    // fill's background show through.
    if let Some(chars) = border_style.chars() {
        let border = Style::fg(style.fg);
        let (right, bottom) = (x + width - 1, y + height - 1);

        if is_in_clip(x, y, clip) {
            target.merge_cell(x, y, chars.top_left, &border);
        }
        if is_in_clip(right, y, clip) {
            target.merge_cell(right, y, chars.top_right, &border);
        }
        if is_in_clip(x, bottom, clip) {
            target.merge_cell(x, bottom, chars.bottom_left, &border);
        }
        if is_in_clip(right, bottom, clip) {
            target.merge_cell(right, bottom, chars.bottom_right, &border);
        }
        for dx in 1..width - 1 {
            if is_in_clip(x + dx, y, clip) {
                target.merge_cell(x + dx, y, chars.horizontal, &border);
            }
            if is_in_clip(x + dx, bottom, clip) {
                target.merge_cell(x + dx, bottom, chars.horizontal, &border);
            }
        }
        for dy in 1..height - 1 {
            if is_in_clip(x, y + dy, clip) {
                target.merge_cell(x, y + dy, chars.vertical, &border);
            }
            if is_in_clip(right, y + dy, clip) {
                target.merge_cell(right, y + dy, chars.vertical, &border);
            }
        }
    }

    if overflow.clips() {
        intersect_clip(clip.copied(), Some(layout.inner_clip()))
    } else {
        clip.copied()
    }
}

fn paint_box(layout: &LayoutBox, buf: &mut CellBuffer, clip: Option<&ClipRegion>) {
    let child_clip = paint_box_cells(layout, clip, buf);
    for child in &layout.children {
        paint_tree(child, buf, child_clip.as_ref());
    }
}

fn paint_box_logical(layout: &LayoutBox, buf: &mut LogicalBuffer, clip: Option<&ClipRegion>) {
    let child_clip = paint_box_cells(layout, clip, buf);
    for child in &layout.children {
        paint_tree_logical(child, buf, child_clip.as_ref());
    }
}

// ===========================================================================
// Tests
// ===========================================================================
