//! Cell styling: colors, text attributes, and the merge rules that make
//! containers' backgrounds flow into their children.
//!
//! A [`Style`] carries a foreground and background [`Color`] (either a named
//! terminal color, a bright variant, a 24-bit RGB triple, or `None` meaning
//! "inherit/transparent"), six boolean attributes, and an optional OSC 8
//! hyperlink URL. A [`Cell`] is one terminal "pixel": a character plus its
//! style.

// ---------------------------------------------------------------------------
// Color
// ---------------------------------------------------------------------------

/// A terminal color.
///
/// `None` means "no color set" — during [`Style::merge`] it inherits the base
/// style's color, and during painting it leaves the existing background in
/// place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Color {
    /// No color set (transparent / inherit).
    #[default]
    None,
    /// The terminal's configured default color.
    Default,
    Black,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    White,
    BrightBlack,
    BrightRed,
    BrightGreen,
    BrightYellow,
    BrightBlue,
    BrightMagenta,
    BrightCyan,
    BrightWhite,
    /// A 24-bit true color.
    Rgb(u8, u8, u8),
}

impl Color {
    /// Whether a color is actually set.
    #[inline]
    pub const fn is_set(self) -> bool {
        !matches!(self, Color::None)
    }

    /// Parse a color name (`"red"`, `"bright-cyan"`, …). Unknown names yield
    /// `Color::None`.
    pub fn from_name(name: &str) -> Color {
        match name {
            "default" => Color::Default,
            "black" => Color::Black,
            "red" => Color::Red,
            "green" => Color::Green,
            "yellow" => Color::Yellow,
            "blue" => Color::Blue,
            "magenta" => Color::Magenta,
            "cyan" => Color::Cyan,
            "white" => Color::White,
            "bright-black" | "gray" | "grey" => Color::BrightBlack,
            "bright-red" => Color::BrightRed,
            "bright-green" => Color::BrightGreen,
            "bright-yellow" => Color::BrightYellow,
            "bright-blue" => Color::BrightBlue,
            "bright-magenta" => Color::BrightMagenta,
            "bright-cyan" => Color::BrightCyan,
            "bright-white" => Color::BrightWhite,
            _ => Color::None,
        }
    }
}

// ---------------------------------------------------------------------------
// Style
// ---------------------------------------------------------------------------

/// Text styling attributes for a cell.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Style {
    pub fg: Color,
    pub bg: Color,
    pub bold: bool,
    pub dim: bool,
    pub italic: bool,
    pub underline: bool,
    pub inverse: bool,
    pub strikethrough: bool,
    /// OSC 8 hyperlink target carried with the cell, if any.
    pub hyperlink: Option<String>,
}

/// A style with nothing set.
pub const EMPTY_STYLE: Style = Style {
    fg: Color::None,
    bg: Color::None,
    bold: false,
    dim: false,
    italic: false,
    underline: false,
    inverse: false,
    strikethrough: false,
    hyperlink: None,
};

impl Style {
    /// A style with only a foreground color.
    pub fn fg(color: Color) -> Style {
        Style { fg: color, ..EMPTY_STYLE }
    }

    /// A style with only a background color.
    pub fn bg(color: Color) -> Style {
        Style { bg: color, ..EMPTY_STYLE }
    }

    /// Whether a foreground color is set.
    #[inline]
    pub fn has_fg(&self) -> bool {
        self.fg.is_set()
    }

    /// Whether a background color is set.
    #[inline]
    pub fn has_bg(&self) -> bool {
        self.bg.is_set()
    }

    /// Combine two styles: the overlay's colors win when set, boolean
    /// attributes OR together, and the overlay's hyperlink replaces the
    /// base's only when present.
    pub fn merge(&self, overlay: &Style) -> Style {
        let mut result = self.clone();

        if overlay.fg.is_set() {
            result.fg = overlay.fg;
        }
        if overlay.bg.is_set() {
            result.bg = overlay.bg;
        }
        result.bold |= overlay.bold;
        result.dim |= overlay.dim;
        result.italic |= overlay.italic;
        result.underline |= overlay.underline;
        result.inverse |= overlay.inverse;
        result.strikethrough |= overlay.strikethrough;
        if overlay.hyperlink.is_some() {
            result.hyperlink = overlay.hyperlink.clone();
        }

        result
    }
}

// ---------------------------------------------------------------------------
// Cell
// ---------------------------------------------------------------------------

/// A single terminal cell: one character and its style.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub style: Style,
}

/// The blank cell: a space with no styling.
pub const EMPTY_CELL: Cell = Cell { ch: ' ', style: EMPTY_STYLE };

impl Cell {
    /// Create a new cell.
    pub fn new(ch: char, style: Style) -> Cell {
        Cell { ch, style }
    }
}

impl Default for Cell {
    fn default() -> Self {
        EMPTY_CELL
    }
}

// ===========================================================================
// Tests
// ===========================================================================
