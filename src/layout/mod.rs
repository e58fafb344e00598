//! Layout: measurement, flex distribution, wrapping, and the computed box
//! tree.

mod engine;
mod types;
mod wrap;

pub use engine::{
    absolute_children, apply_size_constraints, compute_layout, filter_children,
    layout_absolute_children, layout_flex_children, layout_node, measure_container, measure_node,
    relative_children, ChildMeasurement, LayoutResult,
};
pub use types::{
    Align, BorderChars, BorderStyle, Direction, Justify, LayoutBox, LayoutContext, Overflow,
    Position, Spacing,
};
pub use wrap::{char_width, display_width, max_line_width, wrap_text};
