//! Square blocks of cells.

use crate::{
    cells::{Cell, NeighborSet, Point},
    direction::Direction,
    discriminator::StateDiscriminator,
    error::Error,
    memento::{Memento, Transfer},
};
use educe::Educe;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering::Relaxed};

/// A square block of cells.
///
/// Blocks are what make the board cheap to update: a block in which
/// nothing changed during the last generation, and whose neighbors did not
/// change along the shared edges, skips the computation of its next state
/// altogether.
///
/// All blocks at the same depth of a board have the same shape, because they
/// are all cloned from one prototype.
#[derive(Educe)]
#[educe(Debug)]
pub struct Neighborhood {
    /// The cells, row by row.
    #[educe(Debug(ignore))]
    grid: Box<[Cell]>,

    /// Number of rows, which is also the number of columns.
    grid_size: usize,

    /// Width of the whole block in unit squares.
    width: i32,

    /// Whether the last computation found anything about to change.
    active: AtomicBool,

    /// The edges along which some cell changed during the last commit,
    /// as the bits of a [`Direction`].
    active_edges: AtomicU8,

    /// The block just became stable, so a renderer has to draw it
    /// one last time.
    one_more_refresh: AtomicBool,

    /// Whether this is the outermost block of a universe.
    outermost: bool,
}

impl Neighborhood {
    /// Creates a block of `grid_size` × `grid_size` clones of the prototype.
    ///
    /// The prototype itself is not put into the grid.
    pub fn new(grid_size: usize, prototype: &Cell) -> Self {
        Self::with_outermost(grid_size, prototype, false)
    }

    /// Creates the outermost block of a board, the only one that can create
    /// and consume mementos.
    pub fn outermost(grid_size: usize, prototype: &Cell) -> Self {
        Self::with_outermost(grid_size, prototype, true)
    }

    fn with_outermost(grid_size: usize, prototype: &Cell, outermost: bool) -> Self {
        assert!(grid_size > 0, "a block needs at least one cell");
        let grid = (0..grid_size * grid_size)
            .map(|_| prototype.clone_prototype())
            .collect();
        Neighborhood {
            grid,
            grid_size,
            width: grid_size as i32 * prototype.width_in_cells(),
            active: AtomicBool::new(false),
            active_edges: AtomicU8::new(Direction::NONE.bits()),
            one_more_refresh: AtomicBool::new(false),
            outermost,
        }
    }

    /// A fresh, dead, inner block of the same shape.
    pub fn clone_prototype(&self) -> Self {
        Neighborhood::new(self.grid_size, &self.grid[0])
    }

    /// Number of rows (and columns).
    #[inline]
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// The cells, row by row.
    #[inline]
    pub fn grid(&self) -> &[Cell] {
        &self.grid
    }

    /// The cell at `(row, column)`.
    #[inline]
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        &self.grid[row * self.grid_size + column]
    }

    /// Width in unit squares.
    #[inline]
    pub fn width_in_cells(&self) -> i32 {
        self.width
    }

    /// Width of a single cell of the grid in unit squares.
    #[inline]
    pub fn child_width(&self) -> i32 {
        self.width / self.grid_size as i32
    }

    /// Whether this is the outermost block of a universe.
    #[inline]
    pub fn is_outermost(&self) -> bool {
        self.outermost
    }

    /// Whether something in the block is about to change.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.active.load(Relaxed)
    }

    #[inline]
    pub(crate) fn set_active(&self, active: bool) {
        self.active.store(active, Relaxed);
    }

    /// The edges along which some cell changed during the last commit.
    #[inline]
    pub fn active_edges(&self) -> Direction {
        Direction::from_bits_truncate(self.active_edges.load(Relaxed))
    }

    /// Records that the cell at `(row, column)` changed, which makes the
    /// edges it lies on active.
    #[inline]
    pub(crate) fn mark_changed(&self, row: usize, column: usize) {
        let edges = Direction::of_position(row, column, self.grid_size);
        self.active_edges.fetch_or(edges.bits(), Relaxed);
    }

    /// Whether the block became stable during the last computation and has
    /// not been drawn since.
    #[inline]
    pub fn needs_one_more_refresh(&self) -> bool {
        self.one_more_refresh.load(Relaxed)
    }

    #[inline]
    pub(crate) fn request_one_more_refresh(&self) {
        self.one_more_refresh.store(true, Relaxed);
    }

    /// Whether a renderer has to redraw the block, consuming the pending
    /// "one more refresh".
    pub fn take_redraw(&self) -> bool {
        self.one_more_refresh.swap(false, Relaxed) || self.is_active()
    }

    /// The cell at `(row, column)` on the edge of the block.
    ///
    /// # Panics
    ///
    /// Panics when the position is in the interior of the grid.
    pub fn edge_cell(&self, row: usize, column: usize) -> &Cell {
        let last = self.grid_size - 1;
        assert!(
            row == 0 || row == last || column == 0 || column == last,
            "central cell ({}, {}) requested from edge_cell",
            row,
            column
        );
        self.cell(row, column)
    }

    /// Computes the next state of every cell in the block.
    ///
    /// See [`Cell::compute_next_state`].
    pub fn compute_next_state(&self, neighbors: &NeighborSet) -> bool {
        StateDiscriminator::new(neighbors).neighborhood(self)
    }

    /// The eight neighbors of the cell at `(row, column)`.
    ///
    /// Cells on the edge of the grid get some of their neighbors from the
    /// edges of the blocks around this one.
    pub(crate) fn neighbors_of<'a>(
        &'a self,
        row: usize,
        column: usize,
        around: &NeighborSet<'a>,
    ) -> NeighborSet<'a> {
        let last = self.grid_size - 1;
        let top = row == 0;
        let bottom = row == last;
        let left = column == 0;
        let right = column == last;

        let north = if top {
            around.north.edge_cell(last, column)
        } else {
            self.cell(row - 1, column)
        };
        let south = if bottom {
            around.south.edge_cell(0, column)
        } else {
            self.cell(row + 1, column)
        };
        let west = if left {
            around.west.edge_cell(row, last)
        } else {
            self.cell(row, column - 1)
        };
        let east = if right {
            around.east.edge_cell(row, 0)
        } else {
            self.cell(row, column + 1)
        };

        let northwest = match (top, left) {
            (true, true) => around.northwest.edge_cell(last, last),
            (true, false) => around.north.edge_cell(last, column - 1),
            (false, true) => around.west.edge_cell(row - 1, last),
            (false, false) => self.cell(row - 1, column - 1),
        };
        let northeast = match (top, right) {
            (true, true) => around.northeast.edge_cell(last, 0),
            (true, false) => around.north.edge_cell(last, column + 1),
            (false, true) => around.east.edge_cell(row - 1, 0),
            (false, false) => self.cell(row - 1, column + 1),
        };
        let southwest = match (bottom, left) {
            (true, true) => around.southwest.edge_cell(0, last),
            (true, false) => around.south.edge_cell(0, column - 1),
            (false, true) => around.west.edge_cell(row + 1, last),
            (false, false) => self.cell(row + 1, column - 1),
        };
        let southeast = match (bottom, right) {
            (true, true) => around.southeast.edge_cell(0, 0),
            (true, false) => around.south.edge_cell(0, column + 1),
            (false, true) => around.east.edge_cell(row + 1, 0),
            (false, false) => self.cell(row + 1, column + 1),
        };

        NeighborSet {
            north,
            south,
            east,
            west,
            northeast,
            northwest,
            southeast,
            southwest,
        }
    }

    /// Moves every cell of the block into its next state.
    ///
    /// The active edges are recomputed from the cells that changed.
    /// Returns `true` if anything changed.
    pub fn commit(&self) -> bool {
        self.active_edges.store(Direction::NONE.bits(), Relaxed);
        let mut changed = false;
        for (index, cell) in self.grid.iter().enumerate() {
            if cell.commit() {
                self.mark_changed(index / self.grid_size, index % self.grid_size);
                changed = true;
            }
        }
        changed
    }

    /// Whether any resident in the block is alive.
    pub fn is_alive(&self) -> bool {
        self.grid.iter().any(Cell::is_alive)
    }

    /// Number of living residents in the block.
    pub fn population(&self) -> usize {
        self.grid.iter().map(Cell::population).sum()
    }

    /// Kills every cell in the block.
    pub fn clear(&self) {
        self.active_edges.store(Direction::NONE.bits(), Relaxed);
        for cell in self.grid.iter() {
            cell.clear();
        }
        if self.active.swap(false, Relaxed) {
            self.request_one_more_refresh();
        }
    }

    /// Saves the block into or loads it from a memento, with the upper-left
    /// corner of the block at `corner`.
    ///
    /// Loading a living cell makes the block active, and marks the edges of
    /// that cell, so that the next generation is computed around it.
    pub fn transfer(&self, memento: &mut Memento, corner: Point, mode: Transfer) -> bool {
        let child_width = self.child_width();
        let mut touched = false;
        for (index, cell) in self.grid.iter().enumerate() {
            let (row, column) = (index / self.grid_size, index % self.grid_size);
            let upper_left = corner.translate(column as i32 * child_width, row as i32 * child_width);
            if cell.transfer(memento, upper_left, mode) {
                self.mark_changed(row, column);
                touched = true;
            }
        }
        if touched {
            self.set_active(true);
        }
        touched
    }

    /// Snapshots the whole board.
    ///
    /// Returns [`Error::UnsupportedOperation`] unless this is the outermost
    /// block.
    pub fn create_memento(&self) -> Result<Memento, Error> {
        if !self.outermost {
            return Err(Error::UnsupportedOperation);
        }
        Ok(self.snapshot())
    }

    /// Loads a memento into the board, overlaying the living cells.
    ///
    /// Returns [`Error::UnsupportedOperation`] unless this is the outermost
    /// block.
    pub fn restore(&self, memento: Memento) -> Result<bool, Error> {
        if !self.outermost {
            return Err(Error::UnsupportedOperation);
        }
        Ok(self.overlay(memento))
    }

    pub(crate) fn snapshot(&self) -> Memento {
        let mut memento = Memento::new();
        self.transfer(&mut memento, Point::default(), Transfer::Store);
        memento
    }

    pub(crate) fn overlay(&self, mut memento: Memento) -> bool {
        self.transfer(&mut memento, Point::default(), Transfer::Load)
    }

    /// Whether the unit square at `point`, relative to the upper-left corner
    /// of the block, is alive. `None` if it is outside the block.
    pub fn is_alive_at(&self, point: Point) -> Option<bool> {
        let (row, column, inner) = self.locate(point)?;
        match self.cell(row, column) {
            Cell::Resident(resident) => Some(resident.is_alive()),
            Cell::Neighborhood(neighborhood) => neighborhood.is_alive_at(inner),
            Cell::Dummy(_) => None,
        }
    }

    /// Flips the unit square at `point`, relative to the upper-left corner
    /// of the block. Returns its new state, or `None` if it is outside the
    /// block.
    ///
    /// Every block on the way down becomes active, so that the next
    /// computation looks at the edit.
    pub fn toggle(&self, point: Point) -> Option<bool> {
        let (row, column, inner) = self.locate(point)?;
        let alive = match self.cell(row, column) {
            Cell::Resident(resident) => resident.toggle(),
            Cell::Neighborhood(neighborhood) => neighborhood.toggle(inner)?,
            Cell::Dummy(_) => return None,
        };
        self.set_active(true);
        self.mark_changed(row, column);
        Some(alive)
    }

    /// The grid position containing `point`, and `point` relative to the
    /// upper-left corner of that cell.
    fn locate(&self, point: Point) -> Option<(usize, usize, Point)> {
        if point.x < 0 || point.y < 0 || point.x >= self.width || point.y >= self.width {
            return None;
        }
        let child_width = self.child_width();
        let row = (point.y / child_width) as usize;
        let column = (point.x / child_width) as usize;
        let inner = Point::new(point.x % child_width, point.y % child_width);
        Some((row, column, inner))
    }

    /// Displays the block in
    /// [Plaintext](https://conwaylife.com/wiki/Plaintext) format.
    ///
    /// * **Dead** cells are represented by `.`;
    /// * **Living** cells are represented by `o`.
    pub fn plaintext(&self) -> String {
        let mut str = String::with_capacity(((self.width + 1) * self.width) as usize);
        for y in 0..self.width {
            for x in 0..self.width {
                match self.is_alive_at(Point::new(x, y)) {
                    Some(true) => str.push('o'),
                    _ => str.push('.'),
                }
            }
            str.push('\n');
        }
        str
    }
}
