//! The `select` element: list selection over `option` children.
//!
//! A [`Select`] tracks the selected *index* reactively; option *values* come
//! from the `value` props of the element's `option` children and are
//! registered during layout (which never triggers re-renders). The painter
//! draws a pointer gutter ahead of each option and merges the selected style
//! onto the selected row.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::buffer::{CellBuffer, LogicalBuffer, PaintTarget};
use crate::focus::Focusable;
use crate::geometry::{is_in_clip, ClipRegion};
use crate::intrinsics::IntrinsicHandler;
use crate::keys;
use crate::layout::{char_width, filter_children, LayoutBox, LayoutContext};
use crate::reactive::{create_signal, runtime, ReadSignal, WriteSignal};
use crate::style::EMPTY_STYLE;
use crate::vnode::{PropValue, VNode};

// ---------------------------------------------------------------------------
// Value conversion
// ---------------------------------------------------------------------------

/// Conversion from a property value into a select's value type.
pub trait FromProp: Sized {
    fn from_prop(value: &PropValue) -> Option<Self>;
}

impl FromProp for String {
    fn from_prop(value: &PropValue) -> Option<Self> {
        match value {
            PropValue::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromProp for i32 {
    fn from_prop(value: &PropValue) -> Option<Self> {
        match value {
            PropValue::Int(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromProp for bool {
    fn from_prop(value: &PropValue) -> Option<Self> {
        match value {
            PropValue::Bool(v) => Some(*v),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// SelectHandle
// ---------------------------------------------------------------------------

/// The type-erased face of a [`Select`] used by layout and painting.
pub trait SelectHandle: Send + Sync {
    fn is_selected_index(&self, index: usize) -> bool;
    fn clear_options(&self);
    fn set_option_count(&self, count: usize);
    fn register_option_value(&self, index: usize, value: &PropValue);
}

// ---------------------------------------------------------------------------
// Select
// ---------------------------------------------------------------------------

/// Configuration for [`Select::new`].
pub struct SelectOptions<T> {
    /// Starting selection; applied when an option with this value registers.
    pub initial_value: Option<T>,
    /// Called when the selection changes to a known value.
    pub on_change: Option<Arc<dyn Fn(&T) + Send + Sync>>,
    /// Custom key handler, tried before the default navigation.
    pub on_keypress: Option<Arc<dyn Fn(&str) -> bool + Send + Sync>>,
    /// Skip focus-manager registration.
    pub disable_focus: bool,
}

impl<T> Default for SelectOptions<T> {
    fn default() -> Self {
        Self { initial_value: None, on_change: None, on_keypress: None, disable_focus: false }
    }
}

struct OptionTable<T> {
    values: HashMap<usize, T>,
    count: usize,
    initial: Option<T>,
    initial_index: Option<usize>,
}

/// A focusable list-selection backing object.
pub struct Select<T> {
    selected: ReadSignal<usize>,
    set_selected: WriteSignal<usize>,
    focused: ReadSignal<bool>,
    set_focused: WriteSignal<bool>,

    options: Mutex<OptionTable<T>>,
    on_change: Option<Arc<dyn Fn(&T) + Send + Sync>>,
    on_keypress: Option<Arc<dyn Fn(&str) -> bool + Send + Sync>>,
}

impl<T> Select<T>
where
    T: FromProp + PartialEq + Clone + Send + Sync + 'static,
{
    /// Create a select and (unless disabled) register it for focus.
    pub fn new(options: SelectOptions<T>) -> Arc<Select<T>> {
        let (selected, set_selected) = create_signal(0usize);
        let (focused, set_focused) = create_signal(false);

        let select = Arc::new(Select {
            selected,
            set_selected,
            focused,
            set_focused,
            options: Mutex::new(OptionTable {
                values: HashMap::new(),
                count: 0,
                initial: options.initial_value,
                initial_index: None,
            }),
            on_change: options.on_change,
            on_keypress: options.on_keypress,
        });

        if !options.disable_focus {
            runtime().focus_manager().register(select.clone());
        }
        select
    }

    /// The selected index. Until the first explicit selection, an initial
    /// value that matched a registered option wins.
    pub fn selected_index(&self) -> usize {
        let index = self.selected.get();
        if index == 0 {
            if let Some(initial) = self.options.lock().unwrap().initial_index {
                if initial > 0 {
                    return initial;
                }
            }
        }
        index
    }

    /// The selected value, when an option for the index has registered.
    pub fn value(&self) -> Option<T> {
        let index = self.selected_index();
        let table = self.options.lock().unwrap();
        table.values.get(&index).cloned().or_else(|| table.initial.clone())
    }

    /// Number of registered options.
    pub fn option_count(&self) -> usize {
        self.options.lock().unwrap().count
    }

    /// Select by index.
    pub fn set_index(&self, index: usize) {
        self.set_selected.set(index);
        let value = self.options.lock().unwrap().values.get(&index).cloned();
        if let (Some(on_change), Some(value)) = (&self.on_change, value) {
            on_change(&value);
        }
    }

    /// Select the next option (clamped to the last known option).
    pub fn next(&self) {
        let current = self.selected_index();
        let count = self.option_count();
        let next = if count > 0 { (current + 1).min(count - 1) } else { current + 1 };
        if next != current {
            self.set_index(next);
        }
    }

    /// Select the previous option.
    pub fn prev(&self) {
        let current = self.selected_index();
        if current > 0 {
            self.set_index(current - 1);
        }
    }

    /// Request focus for this select.
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

impl<T> SelectHandle for Select<T>
where
    T: FromProp + PartialEq + Clone + Send + Sync + 'static,
{
    fn is_selected_index(&self, index: usize) -> bool {
        self.selected_index() == index
    }

    fn clear_options(&self) {
        self.options.lock().unwrap().values.clear();
    }

    fn set_option_count(&self, count: usize) {
        self.options.lock().unwrap().count = count;
    }

    fn register_option_value(&self, index: usize, value: &PropValue) {
        let Some(value) = T::from_prop(value) else {
            return;
        };
        let mut table = self.options.lock().unwrap();
        if table.initial_index.is_none() && table.initial.as_ref() == Some(&value) {
            table.initial_index = Some(index);
        }
        table.values.insert(index, value);
    }
}

impl<T> Focusable for Select<T>
where
    T: FromProp + PartialEq + Clone + Send + Sync + 'static,
{
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
            keys::UP | keys::CTRL_P | keys::CTRL_K | "k" => {
                self.prev();
                true
            }
            keys::DOWN | keys::CTRL_N | keys::CTRL_J | "j" => {
                self.next();
                true
            }
            keys::HOME | keys::HOME_ALT | "g" => {
                self.set_index(0);
                true
            }
            keys::ENTER | keys::SPACE => true,
            _ => false,
        }
    }
}

// ---------------------------------------------------------------------------
// Element handler
// ---------------------------------------------------------------------------

pub(crate) fn handler() -> IntrinsicHandler {
    IntrinsicHandler {
        measure: Some(measure_select),
        layout: Some(layout_select),
        paint: Some(paint_select),
        paint_logical: Some(paint_select_logical),
    }
}

/// `option` children carry no layout or painting of their own; the `select`
/// handler reads them directly.
pub(crate) fn option_handler() -> IntrinsicHandler {
    IntrinsicHandler {
        measure: Some(|_| (0, 0)),
        layout: Some(|node, _, _, ctx| LayoutBox::leaf(node.clone(), ctx.x, ctx.y, 0, 0, 0)),
        paint: None,
        paint_logical: None,
    }
}

fn select_of(node: &VNode) -> Option<Arc<dyn SelectHandle>> {
    match node.props.get("select") {
        Some(PropValue::Select(select)) => Some(select.clone()),
        _ => None,
    }
}

fn measure_select(node: &VNode) -> (i32, i32) {
    let pointer_width = node.props.int("pointerWidth", 2);
    let options = filter_children(node, "option");
    let max_text = options
        .iter()
        .map(|o| o.collect_text().chars().count() as i32)
        .max()
        .unwrap_or(0);
    (pointer_width + max_text, options.len() as i32)
}

fn layout_select(node: &VNode, _aw: i32, _ah: i32, ctx: &LayoutContext) -> LayoutBox {
    let (width, height) = measure_select(node);

    // Register option values with the backing object. This happens during
    // layout so the values track the tree without extra render passes.
    let options = filter_children(node, "option");
    if let Some(select) = select_of(node) {
        select.clear_options();
        select.set_option_count(options.len());
        for (index, option) in options.iter().enumerate() {
            if let Some(value) = option.props.get("value") {
                select.register_option_value(index, value);
            }
        }
    }

    LayoutBox::leaf(node.clone(), ctx.x, ctx.y, width, height, node.props.int("zIndex", 0))
}

fn paint_select_cells(layout: &LayoutBox, clip: Option<&ClipRegion>, target: &mut dyn PaintTarget) {
    let node = &layout.node;
    let (x, y) = (layout.x, layout.y);

    let select = select_of(node);
    let pointer_width = node.props.int("pointerWidth", 2);
    let option_style = node.props.style_prop("optionStyle", EMPTY_STYLE);
    let selected_style = node.props.style_prop("selectedStyle", EMPTY_STYLE);

    for (index, option) in filter_children(node, "option").iter().enumerate() {
        let option_y = y + index as i32;
        if let Some(clip) = clip {
            if option_y < clip.min_y || option_y >= clip.max_y {
                continue;
            }
        }

        let is_selected =
            select.as_ref().map(|s| s.is_selected_index(index)).unwrap_or(false);

        let mut computed = option_style.merge(&option.props.style());
        if is_selected {
            computed = computed.merge(&selected_style);
        }

        // The pointer gutter: glyphs for the selected row, spaces otherwise.
        let pointer: Vec<char> = if is_selected {
            match node.props.get("pointer") {
                Some(PropValue::Node(pointer_node)) => pointer_node.collect_text().chars().collect(),
                _ => vec![' '; pointer_width as usize],
            }
        } else {
            vec![' '; pointer_width as usize]
        };
        for i in 0..pointer_width {
            let Some(&ch) = pointer.get(i as usize) else { break };
            if is_in_clip(x + i, option_y, clip) {
                target.merge_cell(x + i, option_y, ch, &EMPTY_STYLE);
            }
        }

        let mut char_x = x + pointer_width;
        for ch in option.collect_text().chars() {
            if is_in_clip(char_x, option_y, clip) {
                target.merge_cell(char_x, option_y, ch, &computed);
            }
            char_x += char_width(ch);
        }
    }
}

fn paint_select(layout: &LayoutBox, buf: &mut CellBuffer, clip: Option<&ClipRegion>) {
    paint_select_cells(layout, clip, buf);
}

fn paint_select_logical(layout: &LayoutBox, buf: &mut LogicalBuffer, clip: Option<&ClipRegion>) {
    paint_select_cells(layout, clip, buf);
}

// ===========================================================================
// Tests
// ===========================================================================
