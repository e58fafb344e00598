//! Layout vocabulary: flex enums, spacing, border glyphs, and the computed
//! box types.
//!
//! The enums parse themselves out of a node's property bag — properties are
//! strings in the tree (`direction="row"`), and unknown values fall back to
//! each enum's default.

use crate::geometry::ClipRegion;
use crate::vnode::{Props, VNode};

// ---------------------------------------------------------------------------
// Flex enums
// ---------------------------------------------------------------------------

/// The main axis of a flex container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    Row,
    #[default]
    Column,
}

impl Direction {
    pub fn from_props(props: &Props) -> Direction {
        match props.str("direction", "") {
            "row" => Direction::Row,
            "column" => Direction::Column,
            _ => Direction::default(),
        }
    }
}

/// Main-axis alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Justify {
    #[default]
    Start,
    Center,
    End,
    SpaceBetween,
    SpaceAround,
}

impl Justify {
    pub fn from_props(props: &Props) -> Justify {
        match props.str("justify", "") {
            "start" => Justify::Start,
            "center" => Justify::Center,
            "end" => Justify::End,
            "space-between" => Justify::SpaceBetween,
            "space-around" => Justify::SpaceAround,
            _ => Justify::default(),
        }
    }
}

/// Cross-axis alignment. The default is stretch, as in CSS flexbox.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    Start,
    Center,
    End,
    #[default]
    Stretch,
}

impl Align {
    pub fn from_props(props: &Props) -> Align {
        match props.str("align", "") {
            "start" => Align::Start,
            "center" => Align::Center,
            "end" => Align::End,
            "stretch" => Align::Stretch,
            _ => Align::default(),
        }
    }
}

/// Positioning mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    Relative,
    Absolute,
}

impl Position {
    pub fn from_props(props: &Props) -> Position {
        match props.str("position", "") {
            "absolute" => Position::Absolute,
            _ => Position::Relative,
        }
    }
}

/// Overflow behavior. `Hidden` and `Scroll` clip identically at paint time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Overflow {
    #[default]
    Visible,
    Hidden,
    Scroll,
}

impl Overflow {
    pub fn from_props(props: &Props) -> Overflow {
        match props.str("overflow", "") {
            "hidden" => Overflow::Hidden,
            "scroll" => Overflow::Scroll,
            _ => Overflow::Visible,
        }
    }

    /// Whether children are clipped to the inner content area.
    pub fn clips(self) -> bool {
        matches!(self, Overflow::Hidden | Overflow::Scroll)
    }
}

// ---------------------------------------------------------------------------
// Borders
// ---------------------------------------------------------------------------

/// Border appearance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BorderStyle {
    #[default]
    None,
    Single,
    Double,
    Rounded,
    Bold,
}

impl BorderStyle {
    /// Parse the `border` property: `true` means single, strings select a
    /// style, anything else means none.
    pub fn from_props(props: &Props) -> BorderStyle {
        match props.get("border") {
            Some(crate::vnode::PropValue::Bool(true)) => BorderStyle::Single,
            Some(crate::vnode::PropValue::Str(s)) => match s.as_str() {
                "single" => BorderStyle::Single,
                "double" => BorderStyle::Double,
                "rounded" => BorderStyle::Rounded,
                "bold" => BorderStyle::Bold,
                _ => BorderStyle::None,
            },
            _ => BorderStyle::None,
        }
    }

    /// Border thickness in cells per side: 1 for any visible style.
    pub fn size(self) -> i32 {
        if self == BorderStyle::None {
            0
        } else {
            1
        }
    }

    /// The glyph set for this style, if visible.
    pub fn chars(self) -> Option<BorderChars> {
        match self {
            BorderStyle::None => None,
            BorderStyle::Single => Some(BorderChars {
                top_left: '┌',
                top_right: '┐',
                bottom_left: '└',
                bottom_right: '┘',
                horizontal: '─',
                vertical: '│',
            }),
            BorderStyle::Double => Some(BorderChars {
                top_left: '╔',
                top_right: '╗',
                bottom_left: '╚',
                bottom_right: '╝',
                horizontal: '═',
                vertical: '║',
            }),
            BorderStyle::Rounded => Some(BorderChars {
                top_left: '╭',
                top_right: '╮',
                bottom_left: '╰',
                bottom_right: '╯',
                horizontal: '─',
                vertical: '│',
            }),
            BorderStyle::Bold => Some(BorderChars {
                top_left: '┏',
                top_right: '┓',
                bottom_left: '┗',
                bottom_right: '┛',
                horizontal: '━',
                vertical: '┃',
            }),
        }
    }
}

/// The glyphs used to draw a border.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BorderChars {
    pub top_left: char,
    pub top_right: char,
    pub bottom_left: char,
    pub bottom_right: char,
    pub horizontal: char,
    pub vertical: char,
}

// ---------------------------------------------------------------------------
// Spacing
// ---------------------------------------------------------------------------

/// Padding or margin on all four sides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Spacing {
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
    pub left: i32,
}

impl Spacing {
    /// The same amount on every side.
    pub const fn all(v: i32) -> Spacing {
        Spacing { top: v, right: v, bottom: v, left: v }
    }

    /// Horizontal total (left + right).
    pub const fn horizontal(self) -> i32 {
        self.left + self.right
    }

    /// Vertical total (top + bottom).
    pub const fn vertical(self) -> i32 {
        self.top + self.bottom
    }
}

// ---------------------------------------------------------------------------
// Computed layout
// ---------------------------------------------------------------------------

/// The available space handed to a node during layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LayoutContext {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

/// A computed rectangle for one node: outer box, inner content area (inside
/// padding and border), the node it represents, and its laid-out children in
/// painting order.
#[derive(Debug, Clone)]
pub struct LayoutBox {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,

    pub inner_x: i32,
    pub inner_y: i32,
    pub inner_width: i32,
    pub inner_height: i32,

    pub node: VNode,
    pub children: Vec<LayoutBox>,
    pub z_index: i32,
}

impl LayoutBox {
    /// A box whose inner area equals its outer area (no border/padding),
    /// the common case for leaf elements.
    pub fn leaf(node: VNode, x: i32, y: i32, width: i32, height: i32, z_index: i32) -> LayoutBox {
        LayoutBox {
            x,
            y,
            width,
            height,
            inner_x: x,
            inner_y: y,
            inner_width: width,
            inner_height: height,
            node,
            children: Vec::new(),
            z_index,
        }
    }

    /// This box's inner content area as a clip region.
    pub fn inner_clip(&self) -> ClipRegion {
        ClipRegion::from_rect(self.inner_x, self.inner_y, self.inner_width, self.inner_height)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
