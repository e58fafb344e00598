//! Display-width measurement and soft wrapping.
//!
//! All measurement is in terminal cells: ASCII is one cell, CJK and emoji
//! are two (per `unicode-width`). Wrapping prefers breaking at the last
//! space inside the limit when that break lands past the midpoint, hard
//! breaks at the widest character prefix that fits otherwise, and trims a
//! single leading space after each break.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Display width of a string in terminal cells.
pub fn display_width(s: &str) -> i32 {
    UnicodeWidthStr::width(s) as i32
}

/// Display width of a single character in terminal cells.
pub fn char_width(c: char) -> i32 {
    UnicodeWidthChar::width(c).unwrap_or(0) as i32
}

/// The widest display width among a text's lines.
pub fn max_line_width(text: &str) -> i32 {
    text.split('\n').map(display_width).max().unwrap_or(0)
}

/// Soft-wrap text to `max_width` cells.
///
/// Existing newlines are preserved. A `max_width` of zero or less returns
/// the text unchanged as a single entry.
pub fn wrap_text(text: &str, max_width: i32) -> Vec<String> {
    if max_width <= 0 {
        return vec![text.to_string()];
    }

    let mut output = Vec::new();
    for line in text.split('\n') {
        if display_width(line) <= max_width {
            output.push(line.to_string());
            continue;
        }

        let mut remaining: Vec<char> = line.chars().collect();
        while width_of(&remaining) > max_width {
            let break_at = break_index(&remaining, max_width);
            let head: String = remaining[..break_at].iter().collect();
            output.push(head);
            remaining.drain(..break_at);
            // Trim a single leading space left over from a word break.
            if remaining.first() == Some(&' ') {
                remaining.remove(0);
            }
        }
        if !remaining.is_empty() {
            output.push(remaining.iter().collect());
        }
    }
    output
}

fn width_of(chars: &[char]) -> i32 {
    chars.iter().map(|&c| char_width(c)).sum()
}

/// Choose where to break a too-long line: the last space whose position
/// falls within the width limit, provided it is past the midpoint; otherwise
/// the widest char prefix that fits (at least one char, so progress is
/// guaranteed).
fn break_index(chars: &[char], max_width: i32) -> usize {
    // Widest prefix that fits.
    let mut hard_break = 0;
    let mut width = 0;
    for (i, &c) in chars.iter().enumerate() {
        let w = char_width(c);
        if width + w > max_width {
            break;
        }
        width += w;
        hard_break = i + 1;
    }
    if hard_break == 0 {
        // A single cell can't hold this character; break after it anyway.
        return 1;
    }

    // Prefer the last space at or before the hard break point.
    let candidate = chars[..=hard_break.min(chars.len() - 1)]
        .iter()
        .rposition(|&c| c == ' ');
    if let Some(space) = candidate {
        let space_width = width_of(&chars[..space]);
        if space > 0 && space_width >= max_width / 2 {
            return space;
        }
    }

    hard_break
}

// ===========================================================================
// Tests
// ===========================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn wrap(text: &str, width: i32) -> Vec<String> {
        wrap_text(text, width)
    }

    // ── Width ────────────────────────────────────────────────────────

    #[test]
    fn ascii_is_one_cell() {
        assert_eq!(display_width("hello"), 5);
        assert_eq!(char_width('a'), 1);
    }

    #[test]
    fn cjk_and_emoji_are_two_cells() {
        assert_eq!(display_width("日本"), 4);
        assert_eq!(display_width("🌐"), 2);
        assert_eq!(char_width('中'), 2);
    }

    #[test]
    fn max_line_width_over_newlines() {
        assert_eq!(max_line_width("a\nlonger\nmid"), 6);
        assert_eq!(max_line_width(""), 0);
    }

    // ── Basic wrapping ───────────────────────────────────────────────

    #[test]
    fn short_line_fits() {
        assert_eq!(wrap("hello", 10), vec!["hello"]);
    }

    #[test]
    fn exact_fit() {
        assert_eq!(wrap("hello", 5), vec!["hello"]);
    }

    #[test]
    fn wraps_at_word_boundary() {
        assert_eq!(wrap("hello world", 7), vec!["hello", "world"]);
    }

    #[test]
    fn hard_wrap_without_spaces() {
        assert_eq!(wrap("abcdefghij", 5), vec!["abcde", "fghij"]);
    }

    #[test]
    fn multiple_wraps() {
        assert_eq!(wrap("one two three four", 9), vec!["one two", "three", "four"]);
    }

    #[test]
    fn early_space_is_ignored() {
        // The only space is before the midpoint, so the line hard-breaks.
        assert_eq!(wrap("a bcdefghij", 8), vec!["a bcdefg", "hij"]);
    }

    // ── Newline handling ─────────────────────────────────────────────

    #[test]
    fn preserves_existing_newlines() {
        assert_eq!(wrap("line1\nline2", 10), vec!["line1", "line2"]);
    }

    #[test]
    fn wraps_long_lines_preserves_short_ones() {
        assert_eq!(
            wrap("short\nthis line is too long", 10),
            vec!["short", "this line", "is too", "long"]
        );
    }

    // ── Wide characters ──────────────────────────────────────────────

    #[test]
    fn cjk_fits_exactly() {
        assert_eq!(wrap("日本", 4), vec!["日本"]);
    }

    #[test]
    fn cjk_wraps_by_cells() {
        assert_eq!(wrap("日本語テスト", 6), vec!["日本語", "テスト"]);
    }

    #[test]
    fn cjk_never_splits_mid_character() {
        // Width 5 fits only two double-width characters.
        assert_eq!(wrap("日本語", 5), vec!["日本", "語"]);
    }

    #[test]
    fn emoji_wraps_by_cells() {
        assert_eq!(wrap("🌐🎉✨🚀", 4), vec!["🌐🎉", "✨🚀"]);
        assert_eq!(wrap("🌐🎉", 3), vec!["🌐", "🎉"]);
    }

    #[test]
    fn mixed_ascii_and_cjk_prefers_space() {
        assert_eq!(wrap("hi 日本", 5), vec!["hi", "日本"]);
    }

    #[test]
    fn mixed_ascii_and_cjk_hard_breaks() {
        assert_eq!(wrap("hi日本語", 5), vec!["hi日", "本語"]);
    }

    #[test]
    fn ascii_word_then_emoji() {
        assert_eq!(wrap("hello 🌐🎉", 8), vec!["hello", "🌐🎉"]);
    }

    // ── Edge cases ───────────────────────────────────────────────────

    #[test]
    fn zero_width_returns_text_unchanged() {
        assert_eq!(wrap("anything at all", 0), vec!["anything at all"]);
        assert_eq!(wrap("x", -3), vec!["x"]);
    }

    #[test]
    fn empty_text() {
        assert_eq!(wrap("", 10), vec![""]);
    }

    #[test]
    fn width_one_makes_progress_on_wide_chars() {
        // A double-width char can never fit in one cell; we still terminate.
        let lines = wrap("日本", 1);
        assert_eq!(lines, vec!["日", "本"]);
    }
}
