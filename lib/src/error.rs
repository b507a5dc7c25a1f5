//! All kinds of errors in this crate.

use crate::cells::Point;
use displaydoc::Display;
use std::io;
use thiserror::Error;

/// All kinds of errors in this crate.
#[derive(Debug, Display, Error)]
pub enum Error {
    /// Grid size must be at least 2, but got {0}.
    GridSizeError(usize),
    /// The board must have at least one level of blocks.
    DepthError,
    /// The board is too large: grid size {0} at depth {1}.
    BoardTooLarge(usize, usize),
    /// Point {0:?} is outside the board.
    OutOfBoard(Point),
    /// Only the outermost block of a universe can create or consume a memento.
    UnsupportedOperation,
    /// I/O error: {0}
    Io(#[from] io::Error),
}

/// A malformed stream is an I/O error like any other.
impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Io(error.into())
    }
}
