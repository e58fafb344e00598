//! The frame renderer: layout → paint → reflow → diff → encode → write.
//!
//! [`Renderer`] keeps two logical and two visual buffers and swaps them each
//! frame, so the previous frame is always available for diffing. Content is
//! painted into the logical buffer (unbounded width), reflowed into visual
//! rows at the terminal width, copied into the next visual buffer, and then
//! either diffed (normal case) or dumped sequentially (when content exceeds
//! the terminal height and cursor addressing cannot reach it).

use std::io::{self, Write};

use crate::buffer::{CellBuffer, LogicalBuffer};
use crate::intrinsics::paint_tree_logical;
use crate::layout::{compute_layout, LayoutContext};
use crate::render::ansi::{buffer_to_sequential_ansi, clear_screen, runs_to_ansi};
use crate::render::diff::{diff_buffers, find_runs};
use crate::render::pipeline::PipelineRenderer;
use crate::vnode::VNode;

/// Grid size (in cells) above which the pipelined renderer pays off; below
/// it, channel overhead outweighs the parallelism.
pub const PIPELINE_THRESHOLD: i32 = 3000;

/// A sink for rendered ANSI bytes.
pub type Output = Box<dyn Write + Send>;

/// Common interface over the direct and pipelined renderers.
pub trait FrameRenderer: Send {
    /// Render one frame of the node tree.
    fn render(&mut self, root: &VNode) -> io::Result<()>;
}

/// Create the renderer best suited to the grid size: pipelined at or above
/// [`PIPELINE_THRESHOLD`] cells, direct below it.
pub fn new_auto(width: i32, height: i32, output: Output) -> Box<dyn FrameRenderer> {
    if width * height >= PIPELINE_THRESHOLD {
        Box::new(PipelineRenderer::new(width, height, output))
    } else {
        Box::new(Renderer::new(width, height, output))
    }
}

// ---------------------------------------------------------------------------
// Renderer
// ---------------------------------------------------------------------------

/// The direct (single-threaded) renderer.
pub struct Renderer {
    width: i32,
    height: i32,
    current_logical: LogicalBuffer,
    next_logical: LogicalBuffer,
    current_visual: CellBuffer,
    next_visual: CellBuffer,
    output: Output,
    first_render: bool,
}

impl Renderer {
    /// Create a renderer for a `width × height` terminal writing to `output`.
    pub fn new(width: i32, height: i32, output: Output) -> Self {
        Self {
            width,
            height,
            current_logical: LogicalBuffer::new(height),
            next_logical: LogicalBuffer::new(height),
            current_visual: CellBuffer::new(width, height),
            next_visual: CellBuffer::new(width, height),
            output,
            first_render: true,
        }
    }

    /// Terminal width in cells.
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Terminal height in cells.
    pub fn height(&self) -> i32 {
        self.height
    }

    /// The most recently displayed visual buffer (for tests).
    pub fn current_buffer(&self) -> &CellBuffer {
        &self.current_visual
    }

    /// Write bytes straight to the output sink (cursor visibility, screen
    /// clears, and other control sequences owned by the driver).
    pub fn write_raw(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.output.write_all(bytes)?;
        self.output.flush()
    }

    /// Replace the buffers for a new terminal size and force a full redraw.
    pub fn resize(&mut self, width: i32, height: i32) {
        self.width = width;
        self.height = height;
        self.current_logical = LogicalBuffer::new(height);
        self.next_logical = LogicalBuffer::new(height);
        self.current_visual = CellBuffer::new(width, height);
        self.next_visual = CellBuffer::new(width, height);
        self.first_render = true;
    }

    /// Render a node tree to the terminal.
    pub fn render(&mut self, root: &VNode) -> io::Result<()> {
        self.next_logical.clear();

        let layout = compute_layout(
            root,
            LayoutContext { x: 0, y: 0, width: self.width, height: self.height },
        );
        paint_tree_logical(&layout, &mut self.next_logical, None);

        // Content may exceed the terminal height.
        let content_height = self.next_logical.height().max(layout.height);

        self.next_visual.clear();
        if content_height > self.next_visual.height() {
            self.next_visual = CellBuffer::new(self.width, content_height);
            self.current_visual = CellBuffer::new(self.width, content_height);
        }

        let visual = self.next_logical.to_visual_rows(self.width);
        for (vy, row) in visual.rows.iter().enumerate() {
            for (x, cell) in row.iter().enumerate() {
                self.next_visual.set(x as i32, vy as i32, cell.clone());
            }
        }

        if self.first_render {
            self.output.write_all(clear_screen().as_bytes())?;
            self.first_render = false;
        }

        if content_height > self.height {
            // Overflow: cursor addressing cannot reach rows below the
            // viewport, so dump the frame sequentially.
            let ansi = buffer_to_sequential_ansi(&self.next_visual);
            self.output.write_all(ansi.as_bytes())?;
        } else {
            let changes = diff_buffers(&self.current_visual, &self.next_visual);
            if !changes.is_empty() {
                let runs = find_runs(&changes);
                let ansi = runs_to_ansi(&runs);
                self.output.write_all(ansi.as_bytes())?;
            }
        }
        self.output.flush()?;

        std::mem::swap(&mut self.current_logical, &mut self.next_logical);
        std::mem::swap(&mut self.current_visual, &mut self.next_visual);
        Ok(())
    }
}

impl FrameRenderer for Renderer {
    fn render(&mut self, root: &VNode) -> io::Result<()> {
        Renderer::render(self, root)
    }
}

// ===========================================================================
// Tests
// ===========================================================================
