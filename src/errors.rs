//! Errors raised while building the inputs to a fill. Failing to find a fill is not an error in
//! this sense; see `FillFailure` in `backtracking_search.rs`.

use std::io;
use std::path::PathBuf;

use crate::grid_config::{GridCoord, SlotId};

/// Problems with a grid template or an explicit list of slots.
#[derive(Debug, thiserror::Error)]
pub enum GridError {
    #[error("couldn't read grid '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("grid must have at least one row")]
    EmptyGrid,

    #[error("row {row} has {found} cells but the first row has {expected}")]
    RaggedRows {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("unexpected character '{ch}' at row {row}, column {col}")]
    InvalidCell { row: usize, col: usize, ch: char },

    #[error("slot starting at {start_cell:?} has zero length")]
    EmptySlot { start_cell: GridCoord },

    #[error("slots {first} and {second} both run through cell {cell:?} in the same direction")]
    OverlappingSlots {
        first: SlotId,
        second: SlotId,
        cell: GridCoord,
    },
}

/// Problems loading a word list.
#[derive(Debug, thiserror::Error)]
pub enum WordListError {
    #[error("couldn't read word list '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
