//! The `link` element: terminal hyperlinks.
//!
//! A [`Link`] is a focusable wrapping a URL. The painter applies a default
//! blue + underline style and carries the URL in each cell's style, so the
//! ANSI encoder emits OSC 8 hyperlink sequences around the text. Activating
//! a focused link (Enter/Space) opens the URL with the platform opener.

use std::sync::{Arc, Mutex};

use crate::buffer::{CellBuffer, LogicalBuffer, PaintTarget};
use crate::focus::Focusable;
use crate::geometry::{is_in_clip, ClipRegion};
use crate::intrinsics::IntrinsicHandler;
use crate::keys;
use crate::layout::{char_width, max_line_width, LayoutBox, LayoutContext};
use crate::reactive::{create_signal, runtime, ReadSignal, WriteSignal};
use crate::style::{Color, Style};
use crate::vnode::{PropValue, VNode};

/// Configuration for [`Link::new`].
#[derive(Default)]
pub struct LinkOptions {
    /// The target URL.
    pub url: String,
    /// Called on activation, in addition to opening the URL.
    pub on_click: Option<Arc<dyn Fn() + Send + Sync>>,
    /// Skip focus-manager registration.
    pub disable_focus: bool,
}

/// A focusable hyperlink backing object.
pub struct Link {
    focused: ReadSignal<bool>,
    set_focused: WriteSignal<bool>,
    url: Mutex<String>,
    on_click: Option<Arc<dyn Fn() + Send + Sync>>,
}

impl Link {
    /// Create a link and (unless disabled) register it for focus.
    pub fn new(options: LinkOptions) -> Arc<Link> {
        let (focused, set_focused) = create_signal(false);
        let link = Arc::new(Link {
            focused,
            set_focused,
            url: Mutex::new(options.url),
            on_click: options.on_click,
        });
        if !options.disable_focus {
            runtime().focus_manager().register(link.clone());
        }
        link
    }

    /// The target URL.
    pub fn url(&self) -> String {
        self.url.lock().unwrap().clone()
    }

    /// Replace the target URL.
    pub fn set_url(&self, url: impl Into<String>) {
        *self.url.lock().unwrap() = url.into();
    }

    /// Open the URL and run the click handler.
    pub fn activate(&self) {
        let url = self.url();
        if !url.is_empty() {
            let _ = open_url(&url);
        }
        if let Some(on_click) = &self.on_click {
            on_click();
        }
    }

    /// Request focus for this link.
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

impl Focusable for Link {
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
        match key {
            keys::ENTER | keys::ENTER_LF | keys::SPACE => {
                self.activate();
                true
            }
            _ => false,
        }
    }
}

/// Open a URL in the default browser.
pub fn open_url(url: &str) -> std::io::Result<()> {
    #[cfg(target_os = "macos")]
    let mut command = {
        let mut c = std::process::Command::new("open");
        c.arg(url);
        c
    };
    #[cfg(target_os = "windows")]
    let mut command = {
        let mut c = std::process::Command::new("cmd");
        c.args(["/c", "start", url]);
        c
    };
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    let mut command = {
        let mut c = std::process::Command::new("xdg-open");
        c.arg(url);
        c
    };
    command.spawn().map(|_| ())
}

// ---------------------------------------------------------------------------
// Element handler
// ---------------------------------------------------------------------------

pub(crate) fn handler() -> IntrinsicHandler {
    IntrinsicHandler {
        measure: Some(measure_link),
        layout: Some(layout_link),
        paint: Some(paint_link),
        paint_logical: Some(paint_link_logical),
    }
}

fn link_of(node: &VNode) -> Option<Arc<Link>> {
    match node.props.get("link") {
        Some(PropValue::Link(link)) => Some(link.clone()),
        _ => None,
    }
}

fn measure_link(node: &VNode) -> (i32, i32) {
    let text = node.collect_text();
    (max_line_width(&text), text.split('\n').count() as i32)
}

fn layout_link(node: &VNode, _aw: i32, _ah: i32, ctx: &LayoutContext) -> LayoutBox {
    let (width, height) = measure_link(node);
    LayoutBox::leaf(node.clone(), ctx.x, ctx.y, width, height, node.props.int("zIndex", 0))
}

fn paint_link_cells(layout: &LayoutBox, clip: Option<&ClipRegion>, target: &mut dyn PaintTarget) {
    let node = &layout.node;
    let (x, y) = (layout.x, layout.y);

    let mut base_style = node.props.style();
    let focused_style =
        node.props.style_prop("focusedStyle", Style { bold: true, ..Style::default() });

    // Default link appearance: blue and underlined.
    if !base_style.fg.is_set() {
        base_style.fg = Color::Blue;
    }
    base_style.underline = true;

    let (is_focused, url) = match link_of(node) {
        Some(link) => (Focusable::focused(&*link), link.url()),
        None => (false, String::new()),
    };

    let mut effective = if is_focused { base_style.merge(&focused_style) } else { base_style };
    if !url.is_empty() {
        effective.hyperlink = Some(url);
    }

    for (line_idx, line) in node.collect_text().split('\n').enumerate() {
        let line_y = y + line_idx as i32;
        if let Some(clip) = clip {
            if line_y < clip.min_y || line_y >= clip.max_y {
                continue;
            }
        }
        let mut char_x = x;
        for ch in line.chars() {
            if is_in_clip(char_x, line_y, clip) {
                target.set_cell(char_x, line_y, crate::style::Cell::new(ch, effective.clone()));
            }
            char_x += char_width(ch);
        }
    }
}

fn paint_link(layout: &LayoutBox, buf: &mut CellBuffer, clip: Option<&ClipRegion>) {
    paint_link_cells(layout, clip, buf);
}

fn paint_link_logical(layout: &LayoutBox, buf: &mut LogicalBuffer, clip: Option<&ClipRegion>) {
    paint_link_cells(layout, clip, buf);
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

    fn link_node(link: &Arc<Link>) -> VNode {
        VNode::element(
            "link",
            Props::new().set("link", link.clone()),
            vec![VNode::text("docs")],
        )
    }

    #[test]
    fn measures_text_extent() {
        let _guard = test_guard();
        let link = Link::new(LinkOptions { disable_focus: true, ..Default::default() });
        let node = link_node(&link);
        assert_eq!(crate::layout::measure_node(&node), (4, 1));
    }

    #[test]
    fn paints_blue_underlined_with_hyperlink() {
        let _guard = test_guard();
        let link = Link::new(LinkOptions {
            url: "https://example.com".into(),
            disable_focus: true,
            ..Default::default()
        });
        let node = link_node(&link);
        let layout = compute_layout(&node, LayoutContext { x: 0, y: 0, width: 10, height: 1 });
        let mut buf = CellBuffer::new(10, 1);
        crate::intrinsics::paint_tree(&layout, &mut buf, None);

        let cell = buf.get(0, 0);
        assert_eq!(cell.ch, 'd');
        assert_eq!(cell.style.fg, Color::Blue);
        assert!(cell.style.underline);
        assert_eq!(cell.style.hyperlink.as_deref(), Some("https://example.com"));
    }

    #[test]
    fn set_url_updates_target() {
        let _guard = test_guard();
        let link = Link::new(LinkOptions { url: "https://a".into(), disable_focus: true, ..Default::default() });
        assert_eq!(link.url(), "https://a");
        link.set_url("https://b");
        assert_eq!(link.url(), "https://b");
    }

    #[test]
    fn unfocused_link_ignores_keys() {
        let _guard = test_guard();
        let link = Link::new(LinkOptions::default());
        assert!(!link.handle_key(keys::ENTER));
    }
}
