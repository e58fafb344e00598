//! Frame diffing and run coalescing.
//!
//! [`diff_buffers`] compares two cell buffers structurally and emits one
//! change per differing position; positions present only in the new buffer
//! are emitted unconditionally. [`find_runs`] groups changes into
//! horizontally contiguous runs per row so the encoder emits one cursor move
//! per run instead of one per cell.
//!
//! The `_into` variants append into caller-owned vectors so hot render paths
//! can reuse allocations frame after frame.

use std::collections::BTreeMap;

use crate::buffer::CellBuffer;
use crate::style::Cell;

/// A change at one cell position.
#[derive(Debug, Clone, PartialEq)]
pub struct CellChange {
    pub x: i32,
    pub y: i32,
    pub cell: Cell,
}

/// A horizontally contiguous sequence of changed cells on one row.
#[derive(Debug, Clone, PartialEq)]
pub struct CellRun {
    pub x: i32,
    pub y: i32,
    pub cells: Vec<Cell>,
}

/// Estimated change count: ~20% of the cells, with a small floor.
fn estimate_changes(buf: &CellBuffer) -> usize {
    (((buf.width() * buf.height()) / 5) as usize).max(64)
}

/// Compute the changes needed to turn the display of `from` into `to`.
pub fn diff_buffers(from: &CellBuffer, to: &CellBuffer) -> Vec<CellChange> {
    let mut changes = Vec::with_capacity(estimate_changes(to));
    diff_buffers_into(from, to, &mut changes);
    changes
}

/// As [`diff_buffers`], appending into a caller-owned vector.
pub fn diff_buffers_into(from: &CellBuffer, to: &CellBuffer, result: &mut Vec<CellChange>) {
    let width = from.width().min(to.width());
    let height = from.height().min(to.height());

    // Overlapping region: emit only real differences.
    for y in 0..height {
        for x in 0..width {
            let to_cell = to.get_ref(x, y);
            if from.get_ref(x, y) != to_cell {
                result.push(CellChange { x, y, cell: to_cell.clone() });
            }
        }
    }

    // Rows present only in `to`.
    for y in height..to.height() {
        for x in 0..to.width() {
            result.push(CellChange { x, y, cell: to.get(x, y) });
        }
    }

    // Columns present only in `to`, for the shared rows.
    for y in 0..height {
        for x in width..to.width() {
            result.push(CellChange { x, y, cell: to.get(x, y) });
        }
    }
}

/// Coalesce changes into per-row runs of consecutive columns.
///
/// Rows are processed in ascending order and changes within a row in
/// ascending column order, so the output is deterministic.
pub fn find_runs(changes: &[CellChange]) -> Vec<CellRun> {
    let mut runs = Vec::with_capacity(changes.len() / 4 + 1);
    find_runs_into(changes, &mut runs);
    runs
}

/// As [`find_runs`], appending into a caller-owned vector.
pub fn find_runs_into(changes: &[CellChange], result: &mut Vec<CellRun>) {
    if changes.is_empty() {
        return;
    }

    let mut by_row: BTreeMap<i32, Vec<&CellChange>> = BTreeMap::new();
    for change in changes {
        by_row.entry(change.y).or_default().push(change);
    }

    for (y, mut row) in by_row {
        row.sort_by_key(|c| c.x);

        let mut current: Option<CellRun> = None;
        for change in row {
            match current.as_mut() {
                Some(run) if change.x == run.x + run.cells.len() as i32 => {
                    run.cells.push(change.cell.clone());
                }
                _ => {
                    if let Some(run) = current.take() {
                        result.push(run);
                    }
                    current = Some(CellRun { x: change.x, y, cells: vec![change.cell.clone()] });
                }
            }
        }
        if let Some(run) = current {
            result.push(run);
        }
    }
}

// ===========================================================================
// Tests
// ===========================================================================
