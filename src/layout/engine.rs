//! The flexbox-style layout engine.
//!
//! Layout is a two-phase traversal. *Measure* reports each node's intrinsic
//! size so a parent can distribute its main axis; *place* assigns concrete
//! coordinates. [`compute_layout`] expands functional components, lays the
//! tree out, then hoists absolutely-positioned boxes to the root, stable-
//! sorted by z-index, so they paint after (above) the normal flow.
//!
//! Flex distribution is integer-exact: extra space is split as
//! `⌊extra·grow/total⌋` per growing child, and the remainder is handed out
//! one cell at a time in encounter order, so no cell is ever lost to
//! rounding and the result is deterministic.

use crate::intrinsics::get_handler;
use crate::layout::types::{Align, Direction, Justify, LayoutBox, LayoutContext, Position};
use crate::layout::wrap::max_line_width;
use crate::vnode::{expand, NodeKind, VNode};

/// The result of laying out one node: its box plus any absolutely-positioned
/// descendants collected on the way up.
pub struct LayoutResult {
    pub layout_box: LayoutBox,
    pub absolute_boxes: Vec<LayoutBox>,
}

/// A measured child awaiting flex distribution.
#[derive(Clone)]
pub struct ChildMeasurement {
    pub node: VNode,
    pub width: i32,
    pub height: i32,
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

/// Compute layout for a node tree.
///
/// Expands functional components, lays out the tree, then moves every
/// absolutely-positioned box out of its parent's child list and appends the
/// collected boxes — stable-sorted by ascending z-index — after the root's
/// flex children. Normal children keep source order, which is painting
/// order.
pub fn compute_layout(node: &VNode, ctx: LayoutContext) -> LayoutBox {
    let expanded = expand(node);
    let result = layout_node(&expanded, ctx);

    let mut root = result.layout_box;
    let mut absolutes = result.absolute_boxes;
    hoist_absolutes(&mut root, &mut absolutes);
    absolutes.sort_by_key(|b| b.z_index);
    root.children.extend(absolutes);
    root
}

fn hoist_absolutes(parent: &mut LayoutBox, out: &mut Vec<LayoutBox>) {
    let mut i = 0;
    while i < parent.children.len() {
        if Position::from_props(&parent.children[i].node.props) == Position::Absolute {
            let mut taken = parent.children.remove(i);
            hoist_absolutes(&mut taken, out);
            out.push(taken);
        } else {
            hoist_absolutes(&mut parent.children[i], out);
            i += 1;
        }
    }
}

// ---------------------------------------------------------------------------
// Measurement
// ---------------------------------------------------------------------------

/// Measure a node's natural size, before flex distribution.
pub fn measure_node(node: &VNode) -> (i32, i32) {
    match &node.kind {
        NodeKind::Text => {
            let text = node.text_content().unwrap_or("");
            (max_line_width(text), text.split('\n').count() as i32)
        }
        NodeKind::Fragment => {
            // Fragments stack children vertically with no box of their own.
            let mut width = 0;
            let mut height = 0;
            for child in relative_children(node) {
                let (w, h) = measure_node(&child);
                width = width.max(w);
                height += h;
            }
            (width, height)
        }
        NodeKind::Element(kind) => {
            let handler = get_handler(kind)
                .unwrap_or_else(|| panic!("prism-tui: unknown element type: {kind}"));
            match handler.measure {
                Some(measure) => measure(node),
                None => measure_container(node),
            }
        }
        // Components are expanded before layout; an unexpanded one has no size.
        NodeKind::Component(_) => (0, 0),
    }
}

/// Default container measurement: sum children along the main axis (plus
/// gaps), take the max along the cross axis, add padding and border, then
/// apply explicit width/height and minimums.
pub fn measure_container(node: &VNode) -> (i32, i32) {
    let props = &node.props;
    let padding = props.spacing("padding");
    let border = crate::layout::types::BorderStyle::from_props(props).size();
    let direction = Direction::from_props(props);
    let gap = props.int("gap", 0);

    let mut content_width = 0;
    let mut content_height = 0;
    for (i, child) in relative_children(node).into_iter().enumerate() {
        let (w, h) = measure_node(&child);
        match direction {
            Direction::Row => {
                content_width += w;
                if i > 0 {
                    content_width += gap;
                }
                content_height = content_height.max(h);
            }
            Direction::Column => {
                content_height += h;
                if i > 0 {
                    content_height += gap;
                }
                content_width = content_width.max(w);
            }
        }
    }

    let total_width = content_width + padding.horizontal() + border * 2;
    let total_height = content_height + padding.vertical() + border * 2;
    apply_size_constraints(props, total_width, total_height)
}

/// Apply explicit `width`/`height` overrides and raise below-minimum results
/// to `minWidth`/`minHeight`.
pub fn apply_size_constraints(props: &crate::vnode::Props, width: i32, height: i32) -> (i32, i32) {
    let explicit_width = props.int("width", -1);
    let explicit_height = props.int("height", -1);

    let mut final_width = if explicit_width >= 0 { explicit_width } else { width };
    let mut final_height = if explicit_height >= 0 { explicit_height } else { height };

    final_width = final_width.max(props.int("minWidth", 0));
    final_height = final_height.max(props.int("minHeight", 0));
    (final_width, final_height)
}

// ---------------------------------------------------------------------------
// Placement
// ---------------------------------------------------------------------------

/// Lay out a single node within the given context.
pub fn layout_node(node: &VNode, ctx: LayoutContext) -> LayoutResult {
    match &node.kind {
        NodeKind::Fragment => layout_fragment(node, ctx),
        NodeKind::Text => {
            let text = node.text_content().unwrap_or("");
            let width = max_line_width(text).min(ctx.width);
            let height = text.split('\n').count() as i32;
            LayoutResult {
                layout_box: LayoutBox::leaf(
                    node.clone(),
                    ctx.x,
                    ctx.y,
                    width,
                    height,
                    node.props.int("zIndex", 0),
                ),
                absolute_boxes: Vec::new(),
            }
        }
        NodeKind::Element(kind) => {
            let handler = get_handler(kind)
                .unwrap_or_else(|| panic!("prism-tui: unknown element type: {kind}"));
            match handler.layout {
                Some(layout) => LayoutResult {
                    layout_box: layout(node, ctx.width, ctx.height, &ctx),
                    absolute_boxes: Vec::new(),
                },
                None => layout_container(node, ctx),
            }
        }
        NodeKind::Component(_) => LayoutResult {
            layout_box: LayoutBox::leaf(node.clone(), ctx.x, ctx.y, 0, 0, 0),
            absolute_boxes: Vec::new(),
        },
    }
}

/// Default flex-container layout for elements without a dedicated layout
/// handler. Unlike `box` (which is content-sized), the default container
/// fills the available space unless given explicit dimensions.
fn layout_container(node: &VNode, ctx: LayoutContext) -> LayoutResult {
    let props = &node.props;
    let padding = props.spacing("padding");
    let margin = props.spacing("margin");
    let border = crate::layout::types::BorderStyle::from_props(props).size();

    let direction = Direction::from_props(props);
    let justify = Justify::from_props(props);
    let align = Align::from_props(props);
    let gap = props.int("gap", 0);

    let (measured_w, measured_h) = measure_container(node);
    let mut box_width = props.int("width", -1);
    if box_width < 0 {
        box_width = ctx.width - margin.horizontal();
        if box_width < 0 {
            box_width = measured_w;
        }
    }
    let mut box_height = props.int("height", -1);
    if box_height < 0 {
        box_height = ctx.height - margin.vertical();
        if box_height < 0 {
            box_height = measured_h;
        }
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

    let children = layout_flex_children(
        &measurements,
        LayoutContext { x: inner_x, y: inner_y, width: inner_width, height: inner_height },
        direction,
        justify,
        align,
        gap,
        &mut absolute_boxes,
    );

    layout_absolute_children(node, box_x, box_y, ctx, &mut absolute_boxes);

    LayoutResult {
        layout_box: LayoutBox {
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
        },
        absolute_boxes,
    }
}

/// Lay out a node's absolutely-positioned children from `(origin_x,
/// origin_y)` plus their own `x`/`y` offsets, appending results (and any
/// nested absolutes) to the collector.
pub fn layout_absolute_children(
    node: &VNode,
    origin_x: i32,
    origin_y: i32,
    ctx: LayoutContext,
    collector: &mut Vec<LayoutBox>,
) {
    for child in absolute_children(node) {
        let abs_x = child.props.int("x", 0);
        let abs_y = child.props.int("y", 0);
        let result = layout_node(
            &child,
            LayoutContext {
                x: origin_x + abs_x,
                y: origin_y + abs_y,
                width: ctx.width - abs_x,
                height: ctx.height - abs_y,
            },
        );
        collector.push(result.layout_box);
        collector.extend(result.absolute_boxes);
    }
}

fn layout_fragment(node: &VNode, ctx: LayoutContext) -> LayoutResult {
    let mut children = Vec::new();
    let mut absolute_boxes = Vec::new();
    let mut offset_y = 0;

    for child in node.children.iter() {
        if Position::from_props(&child.props) == Position::Absolute {
            let result = layout_node(child, ctx);
            absolute_boxes.push(result.layout_box);
            absolute_boxes.extend(result.absolute_boxes);
        } else {
            let result = layout_node(
                child,
                LayoutContext {
                    x: ctx.x,
                    y: ctx.y + offset_y,
                    width: ctx.width,
                    height: ctx.height - offset_y,
                },
            );
            let margin = child.props.spacing("margin");
            offset_y += result.layout_box.height + margin.bottom;
            children.push(result.layout_box);
            absolute_boxes.extend(result.absolute_boxes);
        }
    }

    LayoutResult {
        layout_box: LayoutBox {
            x: ctx.x,
            y: ctx.y,
            width: ctx.width,
            height: offset_y,
            inner_x: ctx.x,
            inner_y: ctx.y,
            inner_width: ctx.width,
            inner_height: offset_y,
            node: node.clone(),
            children,
            z_index: 0,
        },
        absolute_boxes,
    }
}

// ---------------------------------------------------------------------------
// Flex distribution
// ---------------------------------------------------------------------------

/// Lay out measured children along a flex axis.
///
/// Children with `position="absolute"` must already be filtered out; their
/// boxes are produced by [`layout_absolute_children`]. Grow distribution is
/// exact: floored proportional shares first, then leftover cells one at a
/// time to growing children in encounter order.
pub fn layout_flex_children(
    children: &[ChildMeasurement],
    ctx: LayoutContext,
    direction: Direction,
    justify: Justify,
    align: Align,
    gap: i32,
    absolute_collector: &mut Vec<LayoutBox>,
) -> Vec<LayoutBox> {
    if children.is_empty() {
        return Vec::new();
    }

    let is_row = direction == Direction::Row;
    let n = children.len();

    // Main-axis content size: child sizes plus their own margins plus gaps.
    let mut content = 0;
    for (i, child) in children.iter().enumerate() {
        let margin = child.node.props.spacing("margin");
        let (main_margin, main_size) = if is_row {
            (margin.horizontal(), child.width)
        } else {
            (margin.vertical(), child.height)
        };
        content += main_margin + main_size;
        if i > 0 {
            content += gap;
        }
    }

    let (available_main, available_cross) =
        if is_row { (ctx.width, ctx.height) } else { (ctx.height, ctx.width) };

    // Grow factors; a child with an explicit main-axis size is pinned.
    let mut total_grow = 0;
    let grow: Vec<i32> = children
        .iter()
        .map(|child| {
            let mut g = child.node.props.int("grow", 0);
            let pinned_key = if is_row { "width" } else { "height" };
            if child.node.props.int(pinned_key, -1) >= 0 {
                g = 0;
            }
            total_grow += g;
            g
        })
        .collect();

    // Exact remainder distribution of the extra space.
    let mut shares = vec![0; n];
    if total_grow > 0 && available_main > content {
        let extra = available_main - content;
        let mut remaining = extra;
        for i in 0..n {
            if grow[i] > 0 {
                shares[i] = extra * grow[i] / total_grow;
                remaining -= shares[i];
            }
        }
        // Hand out the remainder one cell at a time, in encounter order.
        for i in 0..n {
            if remaining <= 0 {
                break;
            }
            if grow[i] > 0 {
                shares[i] += 1;
                remaining -= 1;
            }
        }
    }

    // Starting offset and inter-child extra from justify.
    let mut main_pos = 0;
    let mut extra_gap = 0;
    match justify {
        Justify::Start => {}
        Justify::Center => main_pos = ((available_main - content) / 2).max(0),
        Justify::End => main_pos = (available_main - content).max(0),
        Justify::SpaceBetween => {
            if n > 1 {
                extra_gap =
                    ((available_main - content + gap * (n as i32 - 1)) / (n as i32 - 1)).max(0);
            }
        }
        Justify::SpaceAround => {
            let total_slack = available_main - content + gap * (n as i32 - 1);
            extra_gap = total_slack / n as i32;
            main_pos = extra_gap / 2;
        }
    }

    let mut boxes = Vec::with_capacity(n);
    for (i, child) in children.iter().enumerate() {
        let margin = child.node.props.spacing("margin");
        let (mut child_main, child_cross, margin_before, margin_after) = if is_row {
            (child.width, child.height, margin.left, margin.right)
        } else {
            (child.height, child.width, margin.top, margin.bottom)
        };
        child_main += shares[i];

        // Cross-axis position and size from align; stretch is the default.
        let (cross_pos, cross_size) = match align {
            Align::Start => (0, child_cross),
            Align::Center => (((available_cross - child_cross) / 2).max(0), child_cross),
            Align::End => ((available_cross - child_cross).max(0), child_cross),
            Align::Stretch => (0, available_cross),
        };

        // Grown and stretched elements receive their assigned dimensions as
        // explicit sizes, so their own layout fills the slot instead of
        // shrinking back to content size.
        let mut laid_node = child.node.clone();
        if laid_node.element_kind().is_some() {
            if shares[i] > 0 {
                let main_key = if is_row { "width" } else { "height" };
                laid_node = laid_node.with_prop(main_key, child_main);
            }
            if align == Align::Stretch && cross_size >= 0 {
                let cross_key = if is_row { "height" } else { "width" };
                if laid_node.props.int(cross_key, -1) < 0 {
                    laid_node = laid_node.with_prop(cross_key, cross_size);
                }
            }
        }

        // The child's context includes its own margins so it can subtract
        // them; the parent already accounted for them in distribution.
        let (child_x, child_y, child_width, child_height) = if is_row {
            (
                ctx.x + main_pos,
                ctx.y + cross_pos,
                child_main + margin.horizontal(),
                cross_size + margin.vertical(),
            )
        } else {
            (
                ctx.x + cross_pos,
                ctx.y + main_pos,
                cross_size + margin.horizontal(),
                child_main + margin.vertical(),
            )
        };

        let result = layout_node(
            &laid_node,
            LayoutContext { x: child_x, y: child_y, width: child_width, height: child_height },
        );
        boxes.push(result.layout_box);
        absolute_collector.extend(result.absolute_boxes);

        let effective_gap = match justify {
            Justify::SpaceBetween | Justify::SpaceAround => extra_gap,
            _ => gap,
        };
        main_pos += margin_before + child_main + margin_after + effective_gap;
    }

    boxes
}

// ---------------------------------------------------------------------------
// Child filtering
// ---------------------------------------------------------------------------

/// Children that participate in flex flow (not absolutely positioned).
pub fn relative_children(node: &VNode) -> Vec<VNode> {
    node.children
        .iter()
        .filter(|c| Position::from_props(&c.props) != Position::Absolute)
        .cloned()
        .collect()
}

/// Children removed from flex flow by `position="absolute"`.
pub fn absolute_children(node: &VNode) -> Vec<VNode> {
    node.children
        .iter()
        .filter(|c| Position::from_props(&c.props) == Position::Absolute)
        .cloned()
        .collect()
}

/// Children of a given element kind, in source order.
pub fn filter_children(node: &VNode, kind: &str) -> Vec<VNode> {
    node.children
        .iter()
        .filter(|c| c.element_kind() == Some(kind))
        .cloned()
        .collect()
}

// ===========================================================================
// Tests
// ===========================================================================
