//! The four-stage pipelined renderer for large grids.
//!
//! Stages — layout, paint, diff+encode, write — each run on their own thread
//! connected by small bounded channels, so one frame can be laid out while
//! the previous one is still being diffed. Ownership of frame buffers moves
//! along the channels; the diff stage returns each superseded "previous
//! frame" buffer through a recycle channel, which keeps the working set at
//! [`POOL_SIZE`] buffers with no per-frame allocation.
//!
//! Teardown is cooperative: dropping the frame sender lets each stage drain
//! and exit in turn, and `stop` joins them.

use std::collections::VecDeque;
use std::io::Write;
use std::sync::mpsc::{sync_channel, Receiver, SyncSender, TrySendError};
use std::thread::JoinHandle;

use crate::buffer::{CellBuffer, LogicalBuffer};
use crate::intrinsics::paint_tree_logical;
use crate::layout::{compute_layout, LayoutBox, LayoutContext};
use crate::render::ansi::{clear_screen, runs_to_ansi_into};
use crate::render::diff::{diff_buffers_into, find_runs_into, CellChange, CellRun};
use crate::render::renderer::{FrameRenderer, Output};
use crate::vnode::VNode;

/// Buffers in flight: two of channel capacity, one being painted, one held
/// by the diff stage as the previous frame.
const POOL_SIZE: usize = 4;

/// Bounded capacity of each inter-stage channel.
const STAGE_CAPACITY: usize = 2;

/// The threaded renderer. Construct via
/// [`new_auto`](crate::render::renderer::new_auto) or directly for grids
/// past the pipeline threshold.
pub struct PipelineRenderer {
    frames: Option<SyncSender<VNode>>,
    handles: Vec<JoinHandle<()>>,
}

impl PipelineRenderer {
    /// Start the pipeline's four stages for a `width × height` terminal.
    pub fn new(width: i32, height: i32, output: Output) -> Self {
        let (frame_tx, frame_rx) = sync_channel::<VNode>(STAGE_CAPACITY);
        let (layout_tx, layout_rx) = sync_channel::<LayoutBox>(STAGE_CAPACITY);
        let (paint_tx, paint_rx) = sync_channel::<CellBuffer>(STAGE_CAPACITY);
        let (ansi_tx, ansi_rx) = sync_channel::<String>(STAGE_CAPACITY);
        let (recycle_tx, recycle_rx) = sync_channel::<CellBuffer>(POOL_SIZE);

        let mut handles = Vec::with_capacity(4);
        handles.push(std::thread::spawn(move || {
            layout_stage(width, height, frame_rx, layout_tx);
        }));
        handles.push(std::thread::spawn(move || {
            paint_stage(width, height, layout_rx, paint_tx, recycle_rx);
        }));
        handles.push(std::thread::spawn(move || {
            diff_stage(width, height, paint_rx, ansi_tx, recycle_tx);
        }));
        handles.push(std::thread::spawn(move || {
            write_stage(ansi_rx, output);
        }));

        Self { frames: Some(frame_tx), handles }
    }

    /// Submit a frame without blocking; the frame is dropped when the
    /// pipeline is full (a newer one will follow).
    pub fn submit(&self, root: &VNode) {
        if let Some(frames) = &self.frames {
            match frames.try_send(root.clone()) {
                Ok(()) | Err(TrySendError::Full(_)) | Err(TrySendError::Disconnected(_)) => {}
            }
        }
    }

    /// Submit a frame, waiting for pipeline capacity.
    pub fn submit_blocking(&self, root: &VNode) {
        if let Some(frames) = &self.frames {
            let _ = frames.send(root.clone());
        }
    }

    /// Stop the pipeline: close the frame channel, let the stages drain,
    /// and join them.
    pub fn stop(&mut self) {
        self.frames.take();
        for handle in self.handles.drain(..) {
            let _ = handle.join();
        }
    }
}

impl Drop for PipelineRenderer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl FrameRenderer for PipelineRenderer {
    fn render(&mut self, root: &VNode) -> std::io::Result<()> {
        self.submit(root);
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Stages
// ---------------------------------------------------------------------------

fn layout_stage(
    width: i32,
    height: i32,
    frames: Receiver<VNode>,
    next: SyncSender<LayoutBox>,
) {
    let ctx = LayoutContext { x: 0, y: 0, width, height };
    while let Ok(root) = frames.recv() {
        let layout = compute_layout(&root, ctx);
        if next.send(layout).is_err() {
            return;
        }
    }
}

fn paint_stage(
    width: i32,
    height: i32,
    layouts: Receiver<LayoutBox>,
    next: SyncSender<CellBuffer>,
    recycled: Receiver<CellBuffer>,
) {
    let mut pool: VecDeque<CellBuffer> =
        (0..POOL_SIZE).map(|_| CellBuffer::new(width, height)).collect();
    let mut logical = LogicalBuffer::new(height);

    while let Ok(layout) = layouts.recv() {
        // Prefer a buffer the diff stage has finished with.
        while let Ok(returned) = recycled.try_recv() {
            pool.push_back(returned);
        }
        let mut visual = pool.pop_front().unwrap_or_else(|| CellBuffer::new(width, height));
        visual.clear();

        logical.clear();
        paint_tree_logical(&layout, &mut logical, None);

        let rows = logical.to_visual_rows(width);
        for (vy, row) in rows.rows.iter().enumerate() {
            if vy as i32 >= height {
                break;
            }
            for (x, cell) in row.iter().enumerate() {
                visual.set(x as i32, vy as i32, cell.clone());
            }
        }

        if next.send(visual).is_err() {
            return;
        }
    }
}

fn diff_stage(
    width: i32,
    height: i32,
    buffers: Receiver<CellBuffer>,
    next: SyncSender<String>,
    recycle: SyncSender<CellBuffer>,
) {
    let mut previous: Option<CellBuffer> = None;
    let estimated = (((width * height) / 5) as usize).max(64);
    let mut changes: Vec<CellChange> = Vec::with_capacity(estimated);
    let mut runs: Vec<CellRun> = Vec::with_capacity(estimated / 4);
    let mut ansi = String::with_capacity(estimated * 20);
    let blank = CellBuffer::new(width, height);

    while let Ok(current) = buffers.recv() {
        changes.clear();
        runs.clear();
        ansi.clear();

        match &previous {
            None => {
                ansi.push_str(clear_screen());
                diff_buffers_into(&blank, &current, &mut changes);
            }
            Some(prev) => {
                diff_buffers_into(prev, &current, &mut changes);
            }
        }

        if !changes.is_empty() {
            find_runs_into(&changes, &mut runs);
            runs_to_ansi_into(&runs, &mut ansi);
        }

        if let Some(old) = previous.replace(current) {
            let _ = recycle.try_send(old);
        }

        if !ansi.is_empty() && next.send(ansi.clone()).is_err() {
            return;
        }
    }
}

fn write_stage(ansi: Receiver<String>, mut output: Output) {
    while let Ok(chunk) = ansi.recv() {
        if output.write_all(chunk.as_bytes()).is_err() {
            return;
        }
        let _ = output.flush();
    }
}

// ===========================================================================
// Tests
// ===========================================================================
