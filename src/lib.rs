//! # prism-tui
//!
//! A retained-mode terminal UI engine driven by fine-grained reactivity.
//! Application code produces a tree of virtual nodes describing the desired
//! screen; the engine computes flexbox-style layout, paints into a cell
//! grid, diffs against the previous frame, and emits the smallest ANSI
//! sequence that updates the terminal. Signals decide *when* to re-render —
//! any signal read inside the app function re-runs the render effect on
//! change.
//!
//! ```ignore
//! use prism_tui::{create_signal, run, Props, RunOptions, VNode};
//!
//! let (count, set_count) = create_signal(0);
//! run(
//!     move || {
//!         VNode::element(
//!             "box",
//!             Props::new().set("border", "single").set("width", 20),
//!             vec![VNode::text(format!("count = {}", count.get()))],
//!         )
//!     },
//!     RunOptions::default(),
//! )?;
//! ```

pub mod app;
pub mod buffer;
pub mod debug;
pub mod focus;
pub mod geometry;
pub mod intrinsics;
pub mod keys;
pub mod layout;
pub mod print;
pub mod reactive;
pub mod render;
pub mod style;
pub mod vnode;

pub use app::{
    create_app, run, App, Console, ConsoleLevel, ConsoleMessage, Error, OnError, RenderOptions,
    RunOptions,
};
pub use buffer::{CellBuffer, LogicalBuffer, PaintTarget, VisualRows, MAX_BUFFER_HEIGHT};
pub use focus::{handle_key, FocusManager, Focusable};
pub use geometry::ClipRegion;
pub use intrinsics::button::{Button, ButtonCornerStyle, ButtonOptions};
pub use intrinsics::input::{
    compose_input_handlers, default_input_handler, deletion_handler, navigation_handler,
    newline_handler, printable_handler, shift_enter_handler, Input, InputKeyHandler, InputOptions,
    InputState,
};
pub use intrinsics::link::{Link, LinkOptions};
pub use intrinsics::select::{FromProp, Select, SelectHandle, SelectOptions};
pub use intrinsics::{register_intrinsic, IntrinsicHandler};
pub use layout::{
    compute_layout, wrap_text, Align, BorderStyle, Direction, Justify, LayoutBox, LayoutContext,
    Overflow, Position, Spacing,
};
pub use print::{fprint_node, print_node, sprint_node, PrintOptions};
pub use reactive::{
    batch, create_effect, create_effect_with_cleanup, create_memo, create_root, create_signal,
    create_signal_with_equals, is_tracking, on_cleanup, reset_runtime, runtime, untrack, Effect,
    ReadSignal, WriteSignal,
};
pub use render::{new_auto, FrameRenderer, Output, PipelineRenderer, Renderer};
pub use style::{Cell, Color, Style};
pub use vnode::{expand, NodeKind, PropValue, Props, VNode};
