//! ANSI escape-sequence parsing.
//!
//! Pre-styled text (tool output, another program's rendering) can be painted
//! through the `ansi` element. [`parse_ansi_line`] splits a line into
//! segments, each carrying the style produced by an SGR state machine seeded
//! with the element's base style; a reset (`CSI 0 m`) returns to that base
//! style rather than to nothing.

use crate::style::{Color, Style};

/// Whether the string contains any CSI escape sequence.
pub fn contains_ansi(s: &str) -> bool {
    s.contains("\x1b[")
}

/// Remove ANSI escape sequences, keeping only visible text.
pub fn strip_ansi(s: &str) -> String {
    if !contains_ansi(s) {
        return s.to_string();
    }
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == 0x1b && i + 1 < bytes.len() && bytes[i + 1] == b'[' {
            // CSI: skip to the final byte (0x40..=0x7E).
            i += 2;
            while i < bytes.len() && !(0x40..=0x7e).contains(&bytes[i]) {
                i += 1;
            }
            if i < bytes.len() {
                i += 1;
            }
        } else if bytes[i] == 0x1b {
            // Other escape: skip ESC and the next byte.
            i = (i + 2).min(bytes.len());
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// A piece of text with the style in effect while it was emitted.
#[derive(Debug, Clone, PartialEq)]
pub struct AnsiSegment {
    pub text: String,
    pub style: Style,
}

/// Parse a line containing ANSI codes into styled segments.
///
/// `base_style` is the element's own style; SGR codes apply on top of it and
/// a reset restores it.
pub fn parse_ansi_line(line: &str, base_style: &Style) -> Vec<AnsiSegment> {
    if !contains_ansi(line) {
        return vec![AnsiSegment { text: line.to_string(), style: base_style.clone() }];
    }

    let bytes = line.as_bytes();
    let mut segments = Vec::new();
    let mut current = base_style.clone();
    let mut text: Vec<u8> = Vec::new();
    let mut i = 0;

    let mut flush = |text: &mut Vec<u8>, style: &Style, segments: &mut Vec<AnsiSegment>| {
        if !text.is_empty() {
            segments.push(AnsiSegment {
                text: String::from_utf8_lossy(text).into_owned(),
                style: style.clone(),
            });
            text.clear();
        }
    };

    while i < bytes.len() {
        if bytes[i] == 0x1b && i + 1 < bytes.len() && bytes[i + 1] == b'[' {
            flush(&mut text, &current, &mut segments);

            i += 2;
            let param_start = i;
            while i < bytes.len() && !(0x40..=0x7e).contains(&bytes[i]) {
                i += 1;
            }
            if i < bytes.len() {
                if bytes[i] == b'm' {
                    apply_sgr(&line[param_start..i], &mut current, base_style);
                }
                i += 1;
            }
        } else if bytes[i] == 0x1b {
            i = (i + 2).min(bytes.len());
        } else {
            text.push(bytes[i]);
            i += 1;
        }
    }

    flush(&mut text, &current, &mut segments);
    segments
}

/// Apply SGR parameters to a style. An empty parameter list is a reset.
fn apply_sgr(params: &str, style: &mut Style, base: &Style) {
    if params.is_empty() {
        *style = base.clone();
        return;
    }

    let params = parse_sgr_params(params);
    let mut i = 0;
    while i < params.len() {
        let p = params[i];
        match p {
            0 => *style = base.clone(),
            1 => style.bold = true,
            2 => style.dim = true,
            3 => style.italic = true,
            4 => style.underline = true,
            7 => style.inverse = true,
            9 => style.strikethrough = true,
            22 => {
                style.bold = false;
                style.dim = false;
            }
            23 => style.italic = false,
            24 => style.underline = false,
            27 => style.inverse = false,
            29 => style.strikethrough = false,

            30..=37 => style.fg = named_color(p - 30, false),
            39 => style.fg = base.fg,
            40..=47 => style.bg = named_color(p - 40, false),
            49 => style.bg = base.bg,
            90..=97 => style.fg = named_color(p - 90, true),
            100..=107 => style.bg = named_color(p - 100, true),

            // Extended colors: 38;5;N / 38;2;R;G;B, same for 48.
            38 | 48 => {
                let target = if p == 38 { &mut style.fg } else { &mut style.bg };
                if params.get(i + 1) == Some(&5) {
                    if let Some(&n) = params.get(i + 2) {
                        *target = color_256(n);
                        i += 2;
                    }
                } else if params.get(i + 1) == Some(&2) {
                    if let (Some(&r), Some(&g), Some(&b)) =
                        (params.get(i + 2), params.get(i + 3), params.get(i + 4))
                    {
                        *target = Color::Rgb(r as u8, g as u8, b as u8);
                        i += 4;
                    }
                }
            }
            _ => {}
        }
        i += 1;
    }
}

fn parse_sgr_params(s: &str) -> Vec<i32> {
    let mut params = Vec::new();
    let mut n = 0;
    let mut has_digit = false;
    for b in s.bytes() {
        match b {
            b'0'..=b'9' => {
                n = n * 10 + (b - b'0') as i32;
                has_digit = true;
            }
            b';' => {
                params.push(n);
                n = 0;
                has_digit = false;
            }
            _ => {}
        }
    }
    if has_digit {
        params.push(n);
    }
    params
}

fn named_color(index: i32, bright: bool) -> Color {
    let normal = [
        Color::Black,
        Color::Red,
        Color::Green,
        Color::Yellow,
        Color::Blue,
        Color::Magenta,
        Color::Cyan,
        Color::White,
    ];
    let brights = [
        Color::BrightBlack,
        Color::BrightRed,
        Color::BrightGreen,
        Color::BrightYellow,
        Color::BrightBlue,
        Color::BrightMagenta,
        Color::BrightCyan,
        Color::BrightWhite,
    ];
    let table = if bright { &brights } else { &normal };
    table.get(index as usize).copied().unwrap_or(Color::None)
}

/// Map a 256-color index: 0–15 named, 16–231 the 6×6×6 cube, 232–255
/// grayscale.
fn color_256(n: i32) -> Color {
    match n {
        0..=7 => named_color(n, false),
        8..=15 => named_color(n - 8, true),
        16..=231 => {
            let n = n - 16;
            let r = n / 36;
            let g = (n / 6) % 6;
            let b = n % 6;
            Color::Rgb((r * 51) as u8, (g * 51) as u8, (b * 51) as u8)
        }
        232..=255 => {
            let v = ((n - 232) * 10 + 8) as u8;
            Color::Rgb(v, v, v)
        }
        _ => Color::None,
    }
}

// ===========================================================================
// Tests
// ===========================================================================
