//! The `button` element.
//!
//! A [`Button`] is a focusable activated by Enter or Space. The painter
//! fills the button's interior with its effective style (the focused style
//! merged in while focused) and can draw shaped corners: the corner glyphs
//! use the button's background color as *foreground* against the ambient
//! background, producing pill/round/arrow/pixel shapes.

use std::sync::Arc;

use crate::buffer::{CellBuffer, LogicalBuffer, PaintTarget};
use crate::focus::Focusable;
use crate::geometry::{is_in_clip, ClipRegion};
use crate::intrinsics::{text, IntrinsicHandler};
use crate::keys;
use crate::layout::{
    layout_node, measure_node, relative_children, LayoutBox, LayoutContext,
};
use crate::reactive::{create_signal, runtime, ReadSignal, WriteSignal};
use crate::style::{Cell, Color, Style};
use crate::vnode::{NodeKind, PropValue, VNode};

// ---------------------------------------------------------------------------
// Corner styles
// ---------------------------------------------------------------------------

/// Button corner appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ButtonCornerStyle {
    #[default]
    None,
    /// `▐ text ▌` half blocks.
    Pill,
    /// Nerd Font round caps.
    Round,
    /// Nerd Font arrow caps.
    Arrow,
    /// `▟ text ▙` quadrant blocks.
    Pixel,
}

impl ButtonCornerStyle {
    /// Parse the `corners` property: `true` means pill.
    pub fn from_props(props: &crate::vnode::Props) -> ButtonCornerStyle {
        match props.get("corners") {
            Some(PropValue::Bool(true)) => ButtonCornerStyle::Pill,
            Some(PropValue::Str(s)) => match s.as_str() {
                "pill" => ButtonCornerStyle::Pill,
                "round" => ButtonCornerStyle::Round,
                "arrow" => ButtonCornerStyle::Arrow,
                "pixel" => ButtonCornerStyle::Pixel,
                _ => ButtonCornerStyle::None,
            },
            _ => ButtonCornerStyle::None,
        }
    }

    /// The left/right corner glyphs, if any.
    pub fn chars(self) -> Option<(char, char)> {
        match self {
            ButtonCornerStyle::None => None,
            ButtonCornerStyle::Pill => Some(('▐', '▌')),
            ButtonCornerStyle::Round => Some(('\u{e0b6}', '\u{e0b4}')),
            ButtonCornerStyle::Arrow => Some(('\u{e0b2}', '\u{e0b0}')),
            ButtonCornerStyle::Pixel => Some(('▟', '▙')),
        }
    }
}

// ---------------------------------------------------------------------------
// Button primitive
// ---------------------------------------------------------------------------

/// Configuration for [`Button::new`].
#[derive(Default)]
pub struct ButtonOptions {
    /// Called when the button is activated (Enter/Space or [`Button::click`]).
    pub on_click: Option<Arc<dyn Fn() + Send + Sync>>,
    /// Custom key handler, tried before the default activation keys.
    pub on_keypress: Option<Arc<dyn Fn(&str) -> bool + Send + Sync>>,
    /// Skip focus-manager registration.
    pub disable_focus: bool,
}

/// A focusable, clickable button backing object.
pub struct Button {
    focused: ReadSignal<bool>,
    set_focused: WriteSignal<bool>,
    on_click: Option<Arc<dyn Fn() + Send + Sync>>,
    on_keypress: Option<Arc<dyn Fn(&str) -> bool + Send + Sync>>,
}

impl Button {
    /// Create a button and (unless disabled) register it for focus.
    pub fn new(options: ButtonOptions) -> Arc<Button> {
        let (focused, set_focused) = create_signal(false);
        let button = Arc::new(Button {
            focused,
            set_focused,
            on_click: options.on_click,
            on_keypress: options.on_keypress,
        });
        if !options.disable_focus {
            runtime().focus_manager().register(button.clone());
        }
        button
    }

    /// Trigger the click handler programmatically.
    pub fn click(&self) {
        if let Some(on_click) = &self.on_click {
            on_click();
        }
    }

    /// Request focus for this button.
    pub fn focus(self: &Arc<Self>) {
        runtime().focus_manager().request_focus(self.clone());
    }

    /// Release focus if held.
    pub fn blur(self: &Arc<Self>) {
        runtime().focus_manager().request_blur(self.clone());
    }

    /// Unregister from the focus manager.
    pub fn dispose(self: &Arc<Self>) {
        runtime().focus_manager().unregister(self.clone());
    }
}

impl Focusable for Button {
    fn focused(&self) -> bool {
        self.focused.get()
    }

    fn set_focused(&self, focused: bool) {
        self.set_focused.set(focused);
    }

    fn handle_key(&self, key: &str) -> bool {
        if !self.focused.get_untracked() {
            return false;
        }
        if let Some(on_keypress) = &self.on_keypress {
            if on_keypress(key) {
                return true;
            }
        }
        match key {
            keys::ENTER | keys::ENTER_LF | keys::SPACE => {
                self.click();
                true
            }
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Element handler
// ---------------------------------------------------------------------------

pub(crate) fn handler() -> IntrinsicHandler {
    IntrinsicHandler {
        measure: Some(measure_button),
        layout: Some(layout_button),
        paint: Some(paint_button),
        paint_logical: Some(paint_button_logical),
    }
}

fn button_of(node: &VNode) -> Option<Arc<Button>> {
    match node.props.get("button") {
        Some(PropValue::Button(button)) => Some(button.clone()),
        _ => None,
    }
}

fn measure_button(node: &VNode) -> (i32, i32) {
    let padding = node.props.spacing("padding");

    let mut content_width = 0;
    let mut content_height = 0;
    for child in relative_children(node) {
        let (w, h) = measure_node(&child);
        content_width = content_width.max(w);
        content_height = content_height.max(h);
    }

    crate::layout::apply_size_constraints(
        &node.props,
        content_width + padding.horizontal(),
        content_height + padding.vertical(),
    )
}

fn layout_button(node: &VNode, avail_width: i32, _ah: i32, ctx: &LayoutContext) -> LayoutBox {
    let props = &node.props;
    let padding = props.spacing("padding");
    let margin = props.spacing("margin");

    let (measured_w, measured_h) = measure_button(node);
    let mut width = props.int("width", -1);
    if width < 0 {
        width = measured_w.min(avail_width - margin.horizontal());
    }
    let mut height = props.int("height", -1);
    if height < 0 {
        height = measured_h;
    }

    let x = ctx.x + margin.left;
    let y = ctx.y + margin.top;
    let inner_x = x + padding.left;
    let inner_y = y + padding.top;
    let inner_width = width - padding.horizontal();
    let inner_height = height - padding.vertical();

    let mut children = Vec::new();
    let mut child_y = inner_y;
    for child in relative_children(node) {
        let result = layout_node(
            &child,
            LayoutContext { x: inner_x, y: child_y, width: inner_width, height: inner_height },
        );
        child_y += result.layout_box.height;
        children.push(result.layout_box);
    }

    LayoutBox {
        x,
        y,
        width,
        height,
        inner_x,
        inner_y,
        inner_width,
        inner_height,
        node: node.clone(),
        children,
        z_index: props.int("zIndex", 0),
    }
}

fn paint_button_cells(layout: &LayoutBox, clip: Option<&ClipRegion>, target: &mut dyn PaintTarget) {
    let node = &layout.node;
    let (x, y, width, height) = (layout.x, layout.y, layout.width, layout.height);

    let base_style = node.props.style();
    let focused_style =
        node.props.style_prop("focusedStyle", Style { inverse: true, ..Style::default() });
    let corner_style = ButtonCornerStyle::from_props(&node.props);

    let is_focused = button_of(node).map(|b| Focusable::focused(&*b)).unwrap_or(false);

    let effective = if is_focused { base_style.merge(&focused_style) } else { base_style };
    let corners = corner_style.chars();

    // Interior fill, skipping corner cells so the shaped glyphs own them.
    if effective.has_bg() || is_focused {
        for dy in 0..height {
            for dx in 0..width {
                if corners.is_some() && dy == 0 && (dx == 0 || dx == width - 1) {
                    continue;
                }
                let (cx, cy) = (x + dx, y + dy);
                if is_in_clip(cx, cy, clip) {
                    target.set_cell(cx, cy, Cell::new(' ', effective.clone()));
                }
            }
        }
    }

    // Corner glyphs: the button's background drawn as foreground.
    if let Some((left, right)) = corners {
        let corner_fg = if effective.bg.is_set() { effective.bg } else { Color::White };
        let corner_draw = Style::fg(corner_fg);
        if is_in_clip(x, y, clip) {
            target.set_cell(x, y, Cell::new(left, corner_draw.clone()));
        }
        if is_in_clip(x + width - 1, y, clip) {
            target.set_cell(x + width - 1, y, Cell::new(right, corner_draw));
        }
    }

    // Children inherit the effective style.
    for child in &layout.children {
        paint_button_child(child, clip, &effective, target);
    }
}

fn paint_button_child(
    layout: &LayoutBox,
    clip: Option<&ClipRegion>,
    parent_style: &Style,
    target: &mut dyn PaintTarget,
) {
    if let NodeKind::Text = layout.node.kind {
        text::paint_lines(
            layout.node.text_content().unwrap_or(""),
            parent_style,
            layout.x,
            layout.y,
            clip,
            target,
        );
        return;
    }
    for child in &layout.children {
        paint_button_child(child, clip, parent_style, target);
    }
}

fn paint_button(layout: &LayoutBox, buf: &mut CellBuffer, clip: Option<&ClipRegion>) {
    paint_button_cells(layout, clip, buf);
}

fn paint_button_logical(layout: &LayoutBox, buf: &mut LogicalBuffer, clip: Option<&ClipRegion>) {
    paint_button_cells(layout, clip, buf);
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::compute_layout;
    use crate::reactive::test_guard;
    use crate::vnode::Props;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn button_node(button: &Arc<Button>, props: Props) -> VNode {
        VNode::element(
            "button",
            props.set("button", button.clone()),
            vec![VNode::text("OK")],
        )
    }

    fn paint(node: &VNode, width: i32, height: i32) -> CellBuffer {
        let layout = compute_layout(node, LayoutContext { x: 0, y: 0, width, height });
        let mut buf = CellBuffer::new(width, height);
        crate::intrinsics::paint_tree(&layout, &mut buf, None);
        buf
    }

    #[test]
    fn corners_parse() {
        assert_eq!(
            ButtonCornerStyle::from_props(&Props::new().set("corners", true)),
            ButtonCornerStyle::Pill
        );
        assert_eq!(
            ButtonCornerStyle::from_props(&Props::new().set("corners", "arrow")),
            ButtonCornerStyle::Arrow
        );
        assert_eq!(
            ButtonCornerStyle::from_props(&Props::new()),
            ButtonCornerStyle::None
        );
    }

    #[test]
    fn enter_and_space_click() {
        let _guard = test_guard();
        let clicks = Arc::new(AtomicUsize::new(0));
        let clicks_c = clicks.clone();
        let button = Button::new(ButtonOptions {
            on_click: Some(Arc::new(move || {
                clicks_c.fetch_add(1, Ordering::SeqCst);
            })),
            ..Default::default()
        });
        button.focus();
        assert!(button.handle_key(keys::ENTER));
        assert!(button.handle_key(keys::SPACE));
        assert!(!button.handle_key("x"));
        assert_eq!(clicks.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn custom_keypress_runs_first() {
        let _guard = test_guard();
        let clicks = Arc::new(AtomicUsize::new(0));
        let clicks_c = clicks.clone();
        let button = Button::new(ButtonOptions {
            on_click: Some(Arc::new(move || {
                clicks_c.fetch_add(1, Ordering::SeqCst);
            })),
            on_keypress: Some(Arc::new(|key| key == keys::ENTER)),
            ..Default::default()
        });
        button.focus();
        // The custom handler swallows Enter before the default activation.
        assert!(button.handle_key(keys::ENTER));
        assert_eq!(clicks.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn measures_content_plus_padding() {
        let _guard = test_guard();
        let button = Button::new(ButtonOptions { disable_focus: true, ..Default::default() });
        let node = button_node(&button, Props::new().set("padding", 1));
        assert_eq!(crate::layout::measure_node(&node), (4, 3));
    }

    #[test]
    fn focused_button_fills_with_inverse() {
        let _guard = test_guard();
        let button = Button::new(ButtonOptions::default());
        button.focus();
        let node = button_node(&button, Props::new());
        let buf = paint(&node, 4, 1);
        assert_eq!(buf.get(0, 0).ch, 'O');
        assert!(buf.get(0, 0).style.inverse);
    }

    #[test]
    fn corner_glyphs_use_background_as_foreground() {
        let _guard = test_guard();
        let button = Button::new(ButtonOptions { disable_focus: true, ..Default::default() });
        let node = button_node(
            &button,
            Props::new()
                .set("corners", "pill")
                .set("width", 6)
                .set("paddingLeft", 1)
                .set("style", Style::bg(Color::Blue)),
        );
        let buf = paint(&node, 6, 1);
        let left = buf.get(0, 0);
        assert_eq!(left.ch, '▐');
        assert_eq!(left.style.fg, Color::Blue);
        assert_eq!(left.style.bg, Color::None);
        assert_eq!(buf.get(5, 0).ch, '▌');
        // Interior carries the background.
        assert_eq!(buf.get(2, 0).style.bg, Color::Blue);
    }
}
