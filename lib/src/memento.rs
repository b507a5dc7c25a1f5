//! Snapshots of the board.

use crate::cells::Point;
use serde::{Deserialize, Serialize};
use std::{
    collections::{btree_set, BTreeSet},
    iter::FromIterator,
};

#[cfg(feature = "read-rle")]
use crate::error::Error;
#[cfg(feature = "read-rle")]
use ca_formats::rle::Rle;
#[cfg(feature = "read-rle")]
use std::io;

/// Which way [`Cell::transfer`](crate::Cell::transfer) moves the state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Transfer {
    /// From the memento into the cells.
    Load,
    /// From the cells into the memento.
    Store,
}

/// The living cells of a board, by absolute coordinates.
///
/// A point which is not in the memento is dead.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Memento {
    live_cells: BTreeSet<Point>,
}

impl Memento {
    /// An empty memento, where everything is dead.
    pub fn new() -> Self {
        Memento::default()
    }

    /// Records that the cell at `point` is alive.
    pub fn mark_alive(&mut self, point: Point) {
        self.live_cells.insert(point);
    }

    /// Whether the cell at `point` is alive.
    #[inline]
    pub fn is_alive(&self, point: Point) -> bool {
        self.live_cells.contains(&point)
    }

    /// Number of living cells.
    #[inline]
    pub fn population(&self) -> usize {
        self.live_cells.len()
    }

    /// Whether every cell is dead.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.live_cells.is_empty()
    }

    /// The living cells, ordered by `x` and then `y`.
    pub fn iter(&self) -> btree_set::Iter<'_, Point> {
        self.live_cells.iter()
    }

    /// The same pattern shifted by `(dx, dy)`.
    pub fn translate(&self, dx: i32, dy: i32) -> Self {
        self.iter().map(|point| point.translate(dx, dy)).collect()
    }

    /// The same pattern shifted by `(dx, dy)`, or `None` if a cell would
    /// leave the range of `i32`.
    pub fn checked_translate(&self, dx: i32, dy: i32) -> Option<Self> {
        self.iter()
            .map(|point| point.checked_translate(dx, dy))
            .collect()
    }

    /// The upper-left and lower-right corners of the smallest rectangle
    /// containing every living cell. `None` if the memento is empty.
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let mut points = self.iter();
        let first = *points.next()?;
        Some(points.fold((first, first), |(min, max), point| {
            (
                Point::new(min.x.min(point.x), min.y.min(point.y)),
                Point::new(max.x.max(point.x), max.y.max(point.y)),
            )
        }))
    }

    /// Displays the rectangle between `(0, 0)` and `(width, height)` in
    /// [Plaintext](https://conwaylife.com/wiki/Plaintext) format.
    ///
    /// * **Dead** cells are represented by `.`;
    /// * **Living** cells are represented by `o`.
    pub fn plaintext(&self, width: i32, height: i32) -> String {
        let mut str = String::new();
        for y in 0..height {
            for x in 0..width {
                if self.is_alive(Point::new(x, y)) {
                    str.push('o');
                } else {
                    str.push('.');
                }
            }
            str.push('\n');
        }
        str
    }

    /// Reads a pattern in [RLE](https://conwaylife.com/wiki/Rle) format.
    ///
    /// The upper-left corner of the pattern is at `(0, 0)`. Every cell with
    /// a nonzero state is alive.
    #[cfg(feature = "read-rle")]
    #[cfg_attr(any(docs_rs, github_io), doc(cfg(feature = "read-rle")))]
    pub fn from_rle(rle: &str) -> Result<Self, Error> {
        let mut memento = Memento::new();
        for cell in Rle::new(rle).map_err(invalid)? {
            let cell = cell.map_err(invalid)?;
            if cell.state != 0 {
                let (x, y) = cell.position;
                let x = i32::try_from(x).map_err(invalid)?;
                let y = i32::try_from(y).map_err(invalid)?;
                memento.mark_alive(Point::new(x, y));
            }
        }
        Ok(memento)
    }
}

/// Reports a malformed pattern as an I/O error, whatever the parser.
#[cfg(feature = "read-rle")]
fn invalid<E>(error: E) -> io::Error
where
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    io::Error::new(io::ErrorKind::InvalidData, error)
}

impl FromIterator<Point> for Memento {
    fn from_iter<I: IntoIterator<Item = Point>>(iter: I) -> Self {
        Memento {
            live_cells: iter.into_iter().collect(),
        }
    }
}

impl Extend<Point> for Memento {
    fn extend<I: IntoIterator<Item = Point>>(&mut self, iter: I) {
        self.live_cells.extend(iter);
    }
}

impl<'a> IntoIterator for &'a Memento {
    type Item = &'a Point;
    type IntoIter = btree_set::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
