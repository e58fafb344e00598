//! Frame production: diffing, ANSI encoding and decoding, and the direct
//! and pipelined renderers.

pub mod ansi;
pub mod ansi_parse;
mod diff;
mod pipeline;
mod renderer;

pub use ansi_parse::{contains_ansi, parse_ansi_line, strip_ansi, AnsiSegment};
pub use diff::{diff_buffers, diff_buffers_into, find_runs, find_runs_into, CellChange, CellRun};
pub use pipeline::PipelineRenderer;
pub use renderer::{new_auto, FrameRenderer, Output, Renderer, PIPELINE_THRESHOLD};
