//! The `input` element and its text-editing model.
//!
//! An [`Input`] owns three signals — value, cursor position, focused — plus
//! masking, placeholder, and max-length configuration. Key handling is
//! assembled from composable handler functions tried in order: navigation,
//! deletion, newline insertion, printable insertion. A handler returns the
//! new state to consume the key or `None` to let it fall through.
//!
//! Cursor positions are character indices; inside inputs one character is
//! treated as one column.

use std::sync::Arc;

use crate::buffer::{CellBuffer, LogicalBuffer, PaintTarget};
use crate::geometry::{is_in_clip, ClipRegion};
use crate::intrinsics::IntrinsicHandler;
use crate::keys;
use crate::layout::{LayoutBox, LayoutContext};
use crate::reactive::{batch, create_signal, runtime, ReadSignal, WriteSignal};
use crate::focus::Focusable;
use crate::style::{Color, Style};
use crate::vnode::{PropValue, VNode};

// ---------------------------------------------------------------------------
// Editing state and handlers
// ---------------------------------------------------------------------------

/// A snapshot of an input's editable state. The cursor is a char index into
/// `value`, in `0..=len`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputState {
    pub value: String,
    pub cursor: usize,
}

/// A keypress handler: return the new state to consume the key, `None` to
/// let the next handler try.
pub type InputKeyHandler = Arc<dyn Fn(&str, &InputState) -> Option<InputState> + Send + Sync>;

/// Try handlers in order until one consumes the key.
pub fn compose_input_handlers(handlers: Vec<InputKeyHandler>) -> InputKeyHandler {
    Arc::new(move |key, state| handlers.iter().find_map(|h| h(key, state)))
}

/// The standard single-line editing behavior: navigation, deletion,
/// Shift-Enter newline, printable insertion.
pub fn default_input_handler() -> InputKeyHandler {
    compose_input_handlers(vec![
        Arc::new(navigation_handler),
        Arc::new(deletion_handler),
        Arc::new(shift_enter_handler),
        Arc::new(printable_handler),
    ])
}

fn chars_of(state: &InputState) -> Vec<char> {
    state.value.chars().collect()
}

fn to_string(chars: &[char]) -> String {
    chars.iter().collect()
}

/// Arrow keys, word jumps, line starts/ends, and vertical movement across
/// newlines.
pub fn navigation_handler(key: &str, state: &InputState) -> Option<InputState> {
    let chars = chars_of(state);
    let len = chars.len();

    let moved = |cursor: usize| Some(InputState { value: state.value.clone(), cursor });

    match key {
        keys::LEFT => moved(state.cursor.saturating_sub(1)),
        keys::RIGHT => moved((state.cursor + 1).min(len)),

        keys::ALT_LEFT | keys::ALT_LEFT_CSI => {
            let mut pos = state.cursor;
            while pos > 0 && !is_word_char(chars[pos - 1]) {
                pos -= 1;
            }
            while pos > 0 && is_word_char(chars[pos - 1]) {
                pos -= 1;
            }
            moved(pos)
        }
        keys::ALT_RIGHT | keys::ALT_RIGHT_CSI => {
            let mut pos = state.cursor;
            while pos < len && !is_word_char(chars[pos]) {
                pos += 1;
            }
            while pos < len && is_word_char(chars[pos]) {
                pos += 1;
            }
            moved(pos)
        }

        keys::HOME | keys::HOME_ALT | keys::CTRL_A => moved(line_start(&chars, state.cursor)),
        keys::END | keys::END_ALT | keys::CTRL_E => moved(line_end(&chars, state.cursor)),

        keys::UP => moved(move_cursor_up(&chars, state.cursor)),
        keys::DOWN => moved(move_cursor_down(&chars, state.cursor)),

        _ => None,
    }
}

/// Backspace, forward delete, delete-to-line-start, and word delete.
pub fn deletion_handler(key: &str, state: &InputState) -> Option<InputState> {
    let chars = chars_of(state);
    let len = chars.len();

    match key {
        keys::BACKSPACE | keys::BACKSPACE_CTRL => {
            if state.cursor == 0 {
                return Some(state.clone());
            }
            let mut chars = chars;
            chars.remove(state.cursor - 1);
            Some(InputState { value: to_string(&chars), cursor: state.cursor - 1 })
        }
        keys::DELETE => {
            if state.cursor >= len {
                return Some(state.clone());
            }
            let mut chars = chars;
            chars.remove(state.cursor);
            Some(InputState { value: to_string(&chars), cursor: state.cursor })
        }
        keys::CTRL_U => {
            let start = line_start(&chars, state.cursor);
            let mut kept: Vec<char> = chars[..start].to_vec();
            kept.extend_from_slice(&chars[state.cursor..]);
            Some(InputState { value: to_string(&kept), cursor: start })
        }
        keys::CTRL_W | keys::ALT_BACKSPACE => {
            if state.cursor == 0 {
                return Some(state.clone());
            }
            let mut pos = state.cursor;
            while pos > 0 && !is_word_char(chars[pos - 1]) {
                pos -= 1;
            }
            while pos > 0 && is_word_char(chars[pos - 1]) {
                pos -= 1;
            }
            let mut kept: Vec<char> = chars[..pos].to_vec();
            kept.extend_from_slice(&chars[state.cursor..]);
            Some(InputState { value: to_string(&kept), cursor: pos })
        }
        _ => None,
    }
}

/// Insert a newline on Enter in any form (multiline editors).
pub fn newline_handler(key: &str, state: &InputState) -> Option<InputState> {
    if matches!(key, keys::ENTER | keys::ENTER_LF | keys::SHIFT_ENTER) {
        return Some(insert(state, "\n"));
    }
    None
}

/// Insert a newline only on Shift-Enter (single-line inputs where Enter
/// means submit).
pub fn shift_enter_handler(key: &str, state: &InputState) -> Option<InputState> {
    if matches!(key, keys::SHIFT_ENTER | keys::ENTER_LF) {
        return Some(insert(state, "\n"));
    }
    None
}

/// Insert any printable key at the cursor: no control characters, single or
/// multi-byte.
pub fn printable_handler(key: &str, state: &InputState) -> Option<InputState> {
    if key.is_empty() || key.chars().any(|c| c.is_control()) {
        return None;
    }
    Some(insert(state, key))
}

fn insert(state: &InputState, text: &str) -> InputState {
    let chars = chars_of(state);
    let mut next: Vec<char> = chars[..state.cursor].to_vec();
    next.extend(text.chars());
    next.extend_from_slice(&chars[state.cursor..]);
    InputState { value: to_string(&next), cursor: state.cursor + text.chars().count() }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

fn line_start(chars: &[char], pos: usize) -> usize {
    chars[..pos].iter().rposition(|&c| c == '\n').map(|i| i + 1).unwrap_or(0)
}

fn line_end(chars: &[char], pos: usize) -> usize {
    chars[pos..].iter().position(|&c| c == '\n').map(|i| pos + i).unwrap_or(chars.len())
}

fn line_starts(chars: &[char]) -> Vec<usize> {
    let mut starts = vec![0];
    for (i, &c) in chars.iter().enumerate() {
        if c == '\n' {
            starts.push(i + 1);
        }
    }
    starts
}

fn move_cursor_up(chars: &[char], pos: usize) -> usize {
    let starts = line_starts(chars);
    let line = starts.iter().rposition(|&s| pos >= s).unwrap_or(0);
    if line == 0 {
        return pos;
    }
    let column = pos - starts[line];
    let prev_start = starts[line - 1];
    let prev_end = starts[line] - 1;
    (prev_start + column).min(prev_end)
}

fn move_cursor_down(chars: &[char], pos: usize) -> usize {
    let starts = line_starts(chars);
    let line = starts.iter().rposition(|&s| pos >= s).unwrap_or(0);
    if line + 1 >= starts.len() {
        return pos;
    }
    let column = pos - starts[line];
    let next_start = starts[line + 1];
    let next_end = if line + 2 < starts.len() { starts[line + 2] - 1 } else { chars.len() };
    (next_start + column).min(next_end)
}

// ---------------------------------------------------------------------------
// Input primitive
// ---------------------------------------------------------------------------

/// Configuration for [`Input::new`].
#[derive(Default)]
pub struct InputOptions {
    /// Starting text.
    pub initial_value: String,
    /// Character limit; 0 means unlimited.
    pub max_length: usize,
    /// Mask character for passwords.
    pub mask: Option<char>,
    /// Text shown (dimmed) while the value is empty.
    pub placeholder: String,
    /// Custom keypress handler; defaults to [`default_input_handler`].
    pub on_keypress: Option<InputKeyHandler>,
}

/// A focusable text-input backing object.
pub struct Input {
    value: ReadSignal<String>,
    set_value: WriteSignal<String>,
    cursor: ReadSignal<usize>,
    set_cursor: WriteSignal<usize>,
    focused: ReadSignal<bool>,
    set_focused: WriteSignal<bool>,

    max_length: usize,
    mask: Option<char>,
    placeholder: String,
    on_keypress: InputKeyHandler,
}

impl Input {
    /// Create an input and register it with the focus manager.
    pub fn new(options: InputOptions) -> Arc<Input> {
        let cursor_start = options.initial_value.chars().count();
        let (value, set_value) = create_signal(options.initial_value);
        let (cursor, set_cursor) = create_signal(cursor_start);
        let (focused, set_focused) = create_signal(false);

        let input = Arc::new(Input {
            value,
            set_value,
            cursor,
            set_cursor,
            focused,
            set_focused,
            max_length: options.max_length,
            mask: options.mask,
            placeholder: options.placeholder,
            on_keypress: options.on_keypress.unwrap_or_else(default_input_handler),
        });

        runtime().focus_manager().register(input.clone());
        input
    }

    /// The current text value.
    pub fn value(&self) -> String {
        self.value.get()
    }

    /// The cursor position in characters.
    pub fn cursor_pos(&self) -> usize {
        self.cursor.get()
    }

    /// The text to display: placeholder when empty, masked when configured.
    pub fn display_value(&self) -> String {
        let value = self.value.get();
        if value.is_empty() && !self.placeholder.is_empty() {
            return self.placeholder.clone();
        }
        match self.mask {
            Some(mask) => value.chars().map(|_| mask).collect(),
            None => value,
        }
    }

    /// Whether the placeholder is currently shown.
    pub fn showing_placeholder(&self) -> bool {
        self.value.with(String::is_empty) && !self.placeholder.is_empty()
    }

    /// Replace the text, clamping the cursor to the new length.
    pub fn set_value(&self, value: impl Into<String>) {
        let limited = self.apply_max_length(value.into());
        let len = limited.chars().count();
        batch(|| {
            self.set_value.set(limited);
            self.set_cursor.update(|c| *c = (*c).min(len));
        });
    }

    /// Move the cursor, clamped to the value's length.
    pub fn set_cursor_pos(&self, pos: usize) {
        let len = self.value.with(|v| v.chars().count());
        self.set_cursor.set(pos.min(len));
    }

    /// Clear the value and home the cursor.
    pub fn clear(&self) {
        batch(|| {
            self.set_value.set(String::new());
            self.set_cursor.set(0);
        });
    }

    /// Snapshot the editable state.
    pub fn state(&self) -> InputState {
        InputState { value: self.value.get(), cursor: self.cursor.get() }
    }

    fn apply_state(&self, state: InputState) {
        let limited = self.apply_max_length(state.value);
        let cursor = state.cursor.min(limited.chars().count());
        batch(|| {
            self.set_value.set(limited);
            self.set_cursor.set(cursor);
        });
    }

    fn apply_max_length(&self, value: String) -> String {
        if self.max_length > 0 && value.chars().count() > self.max_length {
            value.chars().take(self.max_length).collect()
        } else {
            value
        }
    }

    /// Request focus for this input.
    pub fn focus(self: &Arc<Self>) {
        runtime().focus_manager().request_focus(self.clone());
    }

    /// Release focus if this input holds it.
    pub fn blur(self: &Arc<Self>) {
        runtime().focus_manager().request_blur(self.clone());
    }

    /// Unregister from the focus manager.
    pub fn dispose(self: &Arc<Self>) {
        runtime().focus_manager().unregister(self.clone());
    }
}

impl Focusable for Input {
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
        let state = InputState {
            value: self.value.get_untracked(),
            cursor: self.cursor.get_untracked(),
        };
        match (self.on_keypress)(key, &state) {
            Some(next) => {
                self.apply_state(next);
                true
            }
            None => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Element handler
// ---------------------------------------------------------------------------

pub(crate) fn handler() -> IntrinsicHandler {
    IntrinsicHandler {
        measure: Some(measure_input),
        layout: Some(layout_input),
        paint: Some(paint_input),
        paint_logical: Some(paint_input_logical),
    }
}

fn input_of(node: &VNode) -> Option<Arc<Input>> {
    match node.props.get("input") {
        Some(PropValue::Input(input)) => Some(input.clone()),
        _ => None,
    }
}

fn measure_input(node: &VNode) -> (i32, i32) {
    let display = input_of(node).map(|i| i.display_value()).unwrap_or_default();
    let lines: Vec<&str> = display.split('\n').collect();
    let max_width = lines.iter().map(|l| l.chars().count() as i32).max().unwrap_or(0);

    // One extra column for the cursor.
    let mut width = max_width + 1;
    let mut height = lines.len() as i32;

    let explicit_width = node.props.int("width", -1);
    if explicit_width >= 0 {
        width = explicit_width;
    }
    let explicit_height = node.props.int("height", -1);
    if explicit_height >= 0 {
        height = explicit_height;
    }
    (width, height)
}

fn layout_input(node: &VNode, _aw: i32, _ah: i32, ctx: &LayoutContext) -> LayoutBox {
    let (width, height) = measure_input(node);
    LayoutBox::leaf(node.clone(), ctx.x, ctx.y, width, height, node.props.int("zIndex", 0))
}

/// Paint the input: scroll so the cursor is visible, draw the cursor cell
/// with the cursor style, dim the placeholder.
fn paint_input_cells(layout: &LayoutBox, clip: Option<&ClipRegion>, target: &mut dyn PaintTarget) {
    let node = &layout.node;
    let (x, y, width, height) = (layout.x, layout.y, layout.width, layout.height);

    let mut base_style = node.props.style();
    if !base_style.fg.is_set() {
        base_style.fg = Color::White;
    }
    let cursor_style = node.props.style_prop(
        "cursorStyle",
        Style { bg: Color::White, fg: Color::Black, ..Style::default() },
    );
    let placeholder_style =
        node.props.style_prop("placeholderStyle", Style { dim: true, ..Style::default() });

    let (display, cursor_pos, is_focused, is_placeholder) = match input_of(node) {
        Some(input) => (
            input.display_value(),
            input.cursor_pos(),
            Focusable::focused(&*input),
            input.showing_placeholder(),
        ),
        None => (String::new(), 0, false, false),
    };

    let text_style = if is_placeholder {
        base_style.merge(&placeholder_style)
    } else {
        base_style
    };

    let lines: Vec<Vec<char>> = display.split('\n').map(|l| l.chars().collect()).collect();

    // Vertical scroll keeps the cursor's line visible.
    let mut cursor_line = 0;
    let mut consumed = 0;
    for (i, line) in lines.iter().enumerate() {
        if cursor_pos >= consumed && cursor_pos <= consumed + line.len() {
            cursor_line = i;
            break;
        }
        consumed += line.len() + 1;
    }
    let scroll_y = (cursor_line as i32 - height + 1).max(0);

    for line_idx in 0..height {
        let line_y = y + line_idx;
        if let Some(clip) = clip {
            if line_y < clip.min_y || line_y >= clip.max_y {
                continue;
            }
        }

        let src_idx = (line_idx + scroll_y) as usize;
        let Some(line) = lines.get(src_idx) else {
            for i in 0..width {
                if is_in_clip(x + i, line_y, clip) {
                    target.merge_cell(x + i, line_y, ' ', &Style::default());
                }
            }
            continue;
        };

        let line_char_pos: usize = lines[..src_idx].iter().map(|l| l.len() + 1).sum();
        let cursor_on_line =
            is_focused && cursor_pos >= line_char_pos && cursor_pos <= line_char_pos + line.len();
        let cursor_col = cursor_pos as i32 - line_char_pos as i32;

        // Horizontal scroll keeps the cursor's column visible.
        let scroll_x = if cursor_on_line && cursor_col >= width { cursor_col - width + 1 } else { 0 };

        for i in 0..width {
            let char_x = x + i;
            if !is_in_clip(char_x, line_y, clip) {
                continue;
            }
            let src = (i + scroll_x) as usize;
            let ch = line.get(src).copied().unwrap_or(' ');

            if cursor_on_line && src as i32 == cursor_col {
                target.set_cell(char_x, line_y, crate::style::Cell::new(ch, cursor_style.clone()));
            } else {
                target.merge_cell(char_x, line_y, ch, &text_style);
            }
        }
    }
}

fn paint_input(layout: &LayoutBox, buf: &mut CellBuffer, clip: Option<&ClipRegion>) {
    paint_input_cells(layout, clip, buf);
}

fn paint_input_logical(layout: &LayoutBox, buf: &mut LogicalBuffer, clip: Option<&ClipRegion>) {
    paint_input_cells(layout, clip, buf);
}

// ===========================================================================
// Tests
// ===========================================================================
