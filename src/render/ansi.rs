//! ANSI escape-sequence generation.
//!
//! The encoder walks runs of changed cells with an explicit current-style /
//! current-hyperlink state machine. When a cell's style differs from the
//! current one, it closes any open hyperlink, emits a full SGR reset, then
//! the new style's codes in canonical order (bold, dim, italic, underline,
//! inverse, strikethrough, foreground, background) and reopens the
//! hyperlink if the new style carries one. A cell that only changes its
//! hyperlink swaps just the OSC 8 sequences.

use std::fmt::Write as _;

use crate::buffer::CellBuffer;
use crate::render::diff::CellRun;
use crate::style::{Color, Style};

pub(crate) const RESET: &str = "\x1b[0m";
const HYPERLINK_END: &str = "\x1b]8;;\x1b\\";

// ---------------------------------------------------------------------------
// Cursor and screen control
// ---------------------------------------------------------------------------

/// Move the cursor to zero-based `(x, y)`. ANSI coordinates are 1-based.
pub fn move_cursor(x: i32, y: i32) -> String {
    format!("\x1b[{};{}H", y + 1, x + 1)
}

/// Hide the cursor.
pub fn hide_cursor() -> &'static str {
    "\x1b[?25l"
}

/// Show the cursor.
pub fn show_cursor() -> &'static str {
    "\x1b[?25h"
}

/// Clear the screen and home the cursor.
pub fn clear_screen() -> &'static str {
    "\x1b[2J\x1b[H"
}

// ---------------------------------------------------------------------------
// Colors and styles
// ---------------------------------------------------------------------------

/// The SGR code for a color in the given channel, or an empty string for
/// `Color::None`.
pub fn color_code(color: Color, foreground: bool) -> String {
    let named = |normal: u8| {
        if foreground {
            format!("\x1b[{normal}m")
        } else {
            format!("\x1b[{}m", normal + 10)
        }
    };
    match color {
        Color::None => String::new(),
        Color::Default => named(39),
        Color::Black => named(30),
        Color::Red => named(31),
        Color::Green => named(32),
        Color::Yellow => named(33),
        Color::Blue => named(34),
        Color::Magenta => named(35),
        Color::Cyan => named(36),
        Color::White => named(37),
        Color::BrightBlack => named(90),
        Color::BrightRed => named(91),
        Color::BrightGreen => named(92),
        Color::BrightYellow => named(93),
        Color::BrightBlue => named(94),
        Color::BrightMagenta => named(95),
        Color::BrightCyan => named(96),
        Color::BrightWhite => named(97),
        Color::Rgb(r, g, b) => {
            let channel = if foreground { 38 } else { 48 };
            format!("\x1b[{channel};2;{r};{g};{b}m")
        }
    }
}

/// Append a style's SGR codes in canonical order.
pub fn style_to_ansi(style: &Style, out: &mut String) {
    if style.bold {
        out.push_str("\x1b[1m");
    }
    if style.dim {
        out.push_str("\x1b[2m");
    }
    if style.italic {
        out.push_str("\x1b[3m");
    }
    if style.underline {
        out.push_str("\x1b[4m");
    }
    if style.inverse {
        out.push_str("\x1b[7m");
    }
    if style.strikethrough {
        out.push_str("\x1b[9m");
    }
    if style.fg.is_set() {
        out.push_str(&color_code(style.fg, true));
    }
    if style.bg.is_set() {
        out.push_str(&color_code(style.bg, false));
    }
}

/// The OSC 8 sequence opening a hyperlink.
pub fn hyperlink_start(url: &str) -> String {
    format!("\x1b]8;;{url}\x1b\\")
}

/// The OSC 8 sequence closing a hyperlink.
pub fn hyperlink_end() -> &'static str {
    HYPERLINK_END
}

// ---------------------------------------------------------------------------
// Run encoding
// ---------------------------------------------------------------------------

/// Tracks the emitted style and hyperlink across cells so redundant escape
/// sequences are skipped.
struct SgrState {
    current: Option<Style>,
    hyperlink: Option<String>,
}

impl SgrState {
    fn new() -> Self {
        Self { current: None, hyperlink: None }
    }

    /// Emit whatever escapes are needed so the next character is drawn with
    /// `style`, then remember it.
    fn apply(&mut self, style: &Style, out: &mut String) {
        let style_changed = self.current.as_ref() != Some(style);
        let hyperlink_changed = self.hyperlink.as_deref() != style.hyperlink.as_deref();

        if style_changed {
            if self.hyperlink.is_some() {
                out.push_str(HYPERLINK_END);
            }
            out.push_str(RESET);
            style_to_ansi(style, out);
            if let Some(url) = &style.hyperlink {
                out.push_str(&hyperlink_start(url));
            }
            self.hyperlink = style.hyperlink.clone();
            self.current = Some(style.clone());
        } else if hyperlink_changed {
            if self.hyperlink.is_some() {
                out.push_str(HYPERLINK_END);
            }
            if let Some(url) = &style.hyperlink {
                out.push_str(&hyperlink_start(url));
            }
            self.hyperlink = style.hyperlink.clone();
        }
    }

    /// Close any open hyperlink and forget the current style (used at row
    /// boundaries in the sequential paths).
    fn break_row(&mut self, out: &mut String) {
        if self.current.is_some() {
            out.push_str(RESET);
            self.current = None;
        }
        if self.hyperlink.is_some() {
            out.push_str(HYPERLINK_END);
            self.hyperlink = None;
        }
    }

    fn finish(&mut self, out: &mut String) {
        if self.hyperlink.take().is_some() {
            out.push_str(HYPERLINK_END);
        }
    }
}

/// Encode one run: a cursor move followed by its cells.
pub fn run_to_ansi(run: &CellRun, out: &mut String) {
    let _ = write!(out, "{}", move_cursor(run.x, run.y));

    let mut state = SgrState::new();
    for cell in &run.cells {
        state.apply(&cell.style, out);
        out.push(cell.ch);
    }
    state.finish(out);
}

/// Encode all runs into one ANSI string, ending with a full reset.
pub fn runs_to_ansi(runs: &[CellRun]) -> String {
    let total_cells: usize = runs.iter().map(|r| r.cells.len()).sum();
    let mut out = String::with_capacity(total_cells * 20 + runs.len() * 15);
    runs_to_ansi_into(runs, &mut out);
    out
}

/// As [`runs_to_ansi`], appending into a caller-owned string.
pub fn runs_to_ansi_into(runs: &[CellRun], out: &mut String) {
    for run in runs {
        run_to_ansi(run, out);
    }
    out.push_str(RESET);
}

// ---------------------------------------------------------------------------
// Sequential dumps
// ---------------------------------------------------------------------------

/// Render a buffer sequentially from the home position using `CR/LF` row
/// separators instead of cursor addressing.
///
/// This is the overflow path: when content exceeds the terminal height,
/// cursor positioning cannot reach the off-screen rows, so the whole frame
/// is written top to bottom and the terminal scrolls.
pub fn buffer_to_sequential_ansi(buf: &CellBuffer) -> String {
    let mut out = String::with_capacity((buf.width() * buf.height()) as usize * 15);
    out.push_str(&move_cursor(0, 0));

    let mut state = SgrState::new();
    for y in 0..buf.height() {
        if y > 0 {
            state.break_row(&mut out);
            out.push_str("\r\n");
        }
        for x in 0..buf.width() {
            let cell = buf.get_ref(x, y);
            state.apply(&cell.style, &mut out);
            out.push(cell.ch);
        }
    }

    state.finish(&mut out);
    out.push_str(RESET);
    out
}

/// Render rows `0..=max_row` of a buffer as styled lines joined with `\n`,
/// with no cursor addressing. Used by the one-shot print path.
pub fn buffer_to_ansi_lines(buf: &CellBuffer, max_row: i32) -> String {
    let mut out = String::with_capacity((buf.width() * (max_row + 1)) as usize * 15);

    let mut state = SgrState::new();
    for y in 0..=max_row.min(buf.height() - 1) {
        if y > 0 {
            state.break_row(&mut out);
            out.push('\n');
        }
        for x in 0..buf.width() {
            let cell = buf.get_ref(x, y);
            state.apply(&cell.style, &mut out);
            out.push(cell.ch);
        }
    }

    state.finish(&mut out);
    out.push_str(RESET);
    out
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{Cell, EMPTY_STYLE};

    #[test]
    fn cursor_is_one_based_row_column() {
        assert_eq!(move_cursor(0, 0), "\x1b[1;1H");
        assert_eq!(move_cursor(5, 2), "\x1b[3;6H");
    }

    #[test]
    fn named_and_bright_color_codes() {
        assert_eq!(color_code(Color::Red, true), "\x1b[31m");
        assert_eq!(color_code(Color::Red, false), "\x1b[41m");
        assert_eq!(color_code(Color::BrightCyan, true), "\x1b[96m");
        assert_eq!(color_code(Color::BrightCyan, false), "\x1b[106m");
        assert_eq!(color_code(Color::Default, true), "\x1b[39m");
        assert_eq!(color_code(Color::None, true), "");
    }

    #[test]
    fn rgb_color_codes() {
        assert_eq!(color_code(Color::Rgb(1, 2, 3), true), "\x1b[38;2;1;2;3m");
        assert_eq!(color_code(Color::Rgb(255, 0, 128), false), "\x1b[48;2;255;0;128m");
    }

    #[test]
    fn style_codes_in_canonical_order() {
        let style = Style {
            fg: Color::Red,
            bg: Color::Blue,
            bold: true,
            underline: true,
            ..EMPTY_STYLE
        };
        let mut out = String::new();
        style_to_ansi(&style, &mut out);
        assert_eq!(out, "\x1b[1m\x1b[4m\x1b[31m\x1b[44m");
    }

    #[test]
    fn run_emits_move_style_text_reset() {
        let run = CellRun {
            x: 2,
            y: 1,
            cells: vec![
                Cell::new('h', Style::fg(Color::Red)),
                Cell::new('i', Style::fg(Color::Red)),
            ],
        };
        let out = runs_to_ansi(&[run]);
        assert_eq!(out, "\x1b[2;3H\x1b[0m\x1b[31mhi\x1b[0m");
    }

    #[test]
    fn style_change_mid_run_resets_and_reapplies() {
        let run = CellRun {
            x: 0,
            y: 0,
            cells: vec![
                Cell::new('a', Style::fg(Color::Red)),
                Cell::new('b', Style::fg(Color::Green)),
            ],
        };
        let out = runs_to_ansi(&[run]);
        assert_eq!(out, "\x1b[1;1H\x1b[0m\x1b[31ma\x1b[0m\x1b[32mb\x1b[0m");
    }

    #[test]
    fn unchanged_style_emits_no_extra_codes() {
        let style = Style::fg(Color::Red);
        let run = CellRun {
            x: 0,
            y: 0,
            cells: (0..4).map(|_| Cell::new('x', style.clone())).collect(),
        };
        let out = runs_to_ansi(&[run]);
        // One style application for four cells.
        assert_eq!(out.matches("\x1b[31m").count(), 1);
    }

    #[test]
    fn hyperlinks_open_and_close() {
        let linked = Style {
            hyperlink: Some("https://example.com".into()),
            ..EMPTY_STYLE
        };
        let run = CellRun {
            x: 0,
            y: 0,
            cells: vec![Cell::new('x', linked), Cell::new('y', EMPTY_STYLE)],
        };
        let out = runs_to_ansi(&[run]);
        assert!(out.contains("\x1b]8;;https://example.com\x1b\\"));
        // Closed before the style reset of the following plain cell.
        let open_at = out.find("]8;;https://example.com").unwrap();
        let close_at = out.rfind("\x1b]8;;\x1b\\").unwrap();
        assert!(close_at > open_at);
    }

    #[test]
    fn hyperlink_only_change_swaps_osc_without_reset() {
        let base = Style { fg: Color::Blue, ..EMPTY_STYLE };
        let a = Style { hyperlink: Some("https://a".into()), ..base.clone() };
        // Same colors/attributes except the hyperlink field: the encoder
        // treats styles with different hyperlinks as different styles, so
        // this exercises the full-change path; equal styles with equal
        // hyperlinks emit nothing.
        let run = CellRun {
            x: 0,
            y: 0,
            cells: vec![Cell::new('x', a.clone()), Cell::new('y', a)],
        };
        let out = runs_to_ansi(&[run]);
        assert_eq!(out.matches("]8;;https://a").count(), 1);
    }

    #[test]
    fn empty_runs_emit_reset_only() {
        assert_eq!(runs_to_ansi(&[]), RESET);
    }

    #[test]
    fn sequential_dump_homes_then_crlf_rows() {
        let mut buf = CellBuffer::new(2, 2);
        buf.write_str(0, 0, "ab", &EMPTY_STYLE);
        buf.write_str(0, 1, "cd", &EMPTY_STYLE);
        let out = buffer_to_sequential_ansi(&buf);
        assert!(out.starts_with("\x1b[1;1H"));
        assert!(out.contains("ab"));
        assert!(out.contains("\r\ncd"));
        assert!(out.ends_with(RESET));
    }

    #[test]
    fn ansi_lines_limits_rows() {
        let mut buf = CellBuffer::new(2, 3);
        buf.write_str(0, 0, "ab", &EMPTY_STYLE);
        buf.write_str(0, 2, "zz", &EMPTY_STYLE);
        let out = buffer_to_ansi_lines(&buf, 0);
        assert!(out.contains("ab"));
        assert!(!out.contains("zz"));
    }
}
