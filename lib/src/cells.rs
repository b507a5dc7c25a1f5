//! Cells of the board.

use crate::{
    direction::Direction,
    discriminator::StateDiscriminator,
    error::Error,
    memento::{Memento, Transfer},
    neighborhood::Neighborhood,
};
use auto_enums::auto_enum;
use from_variants::FromVariants;
use serde::{Deserialize, Serialize};
use std::{
    fmt::{self, Debug, Formatter},
    iter,
    sync::atomic::{AtomicBool, Ordering::Relaxed},
};

/// The absolute coordinates of a unit square on the board.
///
/// `x` is the column and `y` the row, both 0-indexed from the
/// upper-left corner.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Point {
    /// Column.
    pub x: i32,
    /// Row.
    pub y: i32,
}

impl Point {
    /// Creates a new point.
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Point { x, y }
    }

    /// The point shifted by `(dx, dy)`.
    #[inline]
    pub const fn translate(self, dx: i32, dy: i32) -> Self {
        Point {
            x: self.x + dx,
            y: self.y + dy,
        }
    }

    /// Like [`translate`](Point::translate), but returns `None` instead of
    /// overflowing.
    pub fn checked_translate(self, dx: i32, dy: i32) -> Option<Self> {
        Some(Point {
            x: self.x.checked_add(dx)?,
            y: self.y.checked_add(dy)?,
        })
    }
}

impl From<(i32, i32)> for Point {
    #[inline]
    fn from((x, y): (i32, i32)) -> Self {
        Point { x, y }
    }
}

/// The edge-of-board sentinel.
///
/// It stands for every neighbor that lies beyond the hard edge of the
/// board: it is always dead and never disturbs anything.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Dummy;

/// The one sentinel every edge-of-board lookup resolves to.
pub static DUMMY: Cell = Cell::Dummy(Dummy);

/// A single unit square of the board.
///
/// The state lives in atomics so that renderers on other threads can
/// read a board that the simulation thread owns. Ordering is relaxed
/// everywhere: the [`ReadGate`](crate::ReadGate) provides the
/// synchronization between the writer and readers.
#[derive(Default)]
pub struct Resident {
    /// The state in the current generation.
    alive: AtomicBool,

    /// The state in the next generation.
    ///
    /// Written by [`compute_next_state`](Cell::compute_next_state),
    /// copied into `alive` by [`commit`](Cell::commit).
    will_be_alive: AtomicBool,
}

impl Resident {
    /// A dead resident.
    #[inline]
    pub fn new() -> Self {
        Resident::default()
    }

    /// Whether the resident is alive in the current generation.
    #[inline]
    pub fn is_alive(&self) -> bool {
        self.alive.load(Relaxed)
    }

    /// The state computed for the next generation.
    #[inline]
    pub fn will_be_alive(&self) -> bool {
        self.will_be_alive.load(Relaxed)
    }

    /// Whether the next generation is the same as the current one.
    #[inline]
    pub fn is_stable(&self) -> bool {
        self.is_alive() == self.will_be_alive()
    }

    /// Flips the state, bypassing the rule. Returns the new state.
    ///
    /// The shadow state follows, so that a commit without a
    /// recomputation keeps the edit.
    pub fn toggle(&self) -> bool {
        let alive = !self.alive.fetch_xor(true, Relaxed);
        self.will_be_alive.store(alive, Relaxed);
        alive
    }

    #[inline]
    pub(crate) fn set_will_be_alive(&self, will_be_alive: bool) {
        self.will_be_alive.store(will_be_alive, Relaxed);
    }

    /// Makes the shadow state current.
    ///
    /// Returns `true` if that changed the state.
    pub fn commit(&self) -> bool {
        let will_be_alive = self.will_be_alive();
        self.alive.swap(will_be_alive, Relaxed) != will_be_alive
    }

    /// Kills the resident, in this and the next generation.
    pub fn clear(&self) {
        self.alive.store(false, Relaxed);
        self.will_be_alive.store(false, Relaxed);
    }

    /// Saves the resident into or loads it from a memento.
    ///
    /// Loading only ever revives, so that loading onto a board which is not
    /// cleared overlays the memento. Returns `true` if the resident is alive
    /// after loading.
    pub fn transfer(&self, memento: &mut Memento, corner: Point, mode: Transfer) -> bool {
        match mode {
            Transfer::Load => {
                let alive = self.is_alive() || memento.is_alive(corner);
                self.alive.store(alive, Relaxed);
                self.will_be_alive.store(alive, Relaxed);
                alive
            }
            Transfer::Store => {
                if self.is_alive() {
                    memento.mark_alive(corner);
                }
                false
            }
        }
    }
}

impl Debug for Resident {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resident")
            .field("alive", &self.is_alive())
            .field("will_be_alive", &self.will_be_alive())
            .finish()
    }
}

/// A cell of the board.
///
/// The board is a tree: [`Neighborhood`]s hold square grids of cells,
/// [`Resident`]s are the leaves. [`Dummy`] only appears as a neighbor
/// beyond the edge of the board.
#[derive(Debug, FromVariants)]
pub enum Cell {
    /// A unit square.
    Resident(Resident),
    /// A square block of cells.
    Neighborhood(Box<Neighborhood>),
    /// The edge-of-board sentinel.
    Dummy(Dummy),
}

impl Cell {
    /// Computes the state of the next generation, given the eight neighbors.
    ///
    /// Nothing is committed; the current generation stays readable.
    /// Returns `true` if the cell (or something in it) is going to change.
    pub fn compute_next_state(&self, neighbors: &NeighborSet) -> bool {
        let discriminator = StateDiscriminator::new(neighbors);
        match self {
            Cell::Resident(resident) => discriminator.resident(resident),
            Cell::Neighborhood(neighborhood) => discriminator.neighborhood(neighborhood),
            Cell::Dummy(_) => false,
        }
    }

    /// The cell at `(row, column)` on the edge of this cell.
    ///
    /// A resident is its own edge, so only `(0, 0)` may be asked of it.
    /// The sentinel returns itself for any position.
    ///
    /// # Panics
    ///
    /// Panics when the position is not on the perimeter. Correct callers
    /// never do this.
    pub fn edge_cell(&self, row: usize, column: usize) -> &Cell {
        match self {
            Cell::Resident(_) => {
                assert!(
                    row == 0 && column == 0,
                    "edge ({}, {}) requested from a resident",
                    row,
                    column
                );
                self
            }
            Cell::Neighborhood(neighborhood) => neighborhood.edge_cell(row, column),
            Cell::Dummy(_) => self,
        }
    }

    /// Moves every resident into its next state.
    ///
    /// Returns `true` if anything changed.
    pub fn commit(&self) -> bool {
        match self {
            Cell::Resident(resident) => resident.commit(),
            Cell::Neighborhood(neighborhood) => neighborhood.commit(),
            Cell::Dummy(_) => false,
        }
    }

    /// Whether this cell, or any cell inside it, is alive.
    pub fn is_alive(&self) -> bool {
        match self {
            Cell::Resident(resident) => resident.is_alive(),
            Cell::Neighborhood(neighborhood) => neighborhood.is_alive(),
            Cell::Dummy(_) => false,
        }
    }

    /// Width (and height) in unit squares.
    #[inline]
    pub fn width_in_cells(&self) -> i32 {
        match self {
            Cell::Resident(_) => 1,
            Cell::Neighborhood(neighborhood) => neighborhood.width_in_cells(),
            Cell::Dummy(_) => 0,
        }
    }

    /// The edges along which this cell changed during the last commit.
    #[inline]
    pub fn active_edges(&self) -> Direction {
        match self {
            Cell::Neighborhood(neighborhood) => neighborhood.active_edges(),
            _ => Direction::NONE,
        }
    }

    /// A fresh, dead cell of the same variant and shape.
    pub fn clone_prototype(&self) -> Cell {
        match self {
            Cell::Resident(_) => Resident::new().into(),
            Cell::Neighborhood(neighborhood) => Box::new(neighborhood.clone_prototype()).into(),
            Cell::Dummy(dummy) => (*dummy).into(),
        }
    }

    /// Kills everything in the cell.
    pub fn clear(&self) {
        match self {
            Cell::Resident(resident) => resident.clear(),
            Cell::Neighborhood(neighborhood) => neighborhood.clear(),
            Cell::Dummy(_) => (),
        }
    }

    /// Saves the cell into or loads it from a memento, with the upper-left
    /// corner of the cell at `corner`.
    ///
    /// Returns `true` if loading touched a living cell.
    pub fn transfer(&self, memento: &mut Memento, corner: Point, mode: Transfer) -> bool {
        match self {
            Cell::Resident(resident) => resident.transfer(memento, corner, mode),
            Cell::Neighborhood(neighborhood) => neighborhood.transfer(memento, corner, mode),
            Cell::Dummy(_) => false,
        }
    }

    /// Snapshots the whole board.
    ///
    /// Only the outermost neighborhood of a universe can do this;
    /// any other cell returns [`Error::UnsupportedOperation`].
    pub fn create_memento(&self) -> Result<Memento, Error> {
        match self {
            Cell::Neighborhood(neighborhood) => neighborhood.create_memento(),
            _ => Err(Error::UnsupportedOperation),
        }
    }

    /// The cells directly inside this one.
    #[auto_enum(Iterator)]
    pub fn children(&self) -> impl Iterator<Item = &Cell> {
        match self {
            Cell::Neighborhood(neighborhood) => neighborhood.grid().iter(),
            _ => iter::empty(),
        }
    }

    /// Number of living residents inside this cell.
    pub fn population(&self) -> usize {
        match self {
            Cell::Resident(resident) => resident.is_alive() as usize,
            _ => self.children().map(Cell::population).sum(),
        }
    }
}

/// The eight neighbors of a cell, borrowed for one computation.
///
/// A cell never keeps its neighbors: the enclosing block hands them in
/// for every call to [`compute_next_state`](Cell::compute_next_state).
#[derive(Clone, Copy, Debug)]
pub struct NeighborSet<'a> {
    pub north: &'a Cell,
    pub south: &'a Cell,
    pub east: &'a Cell,
    pub west: &'a Cell,
    pub northeast: &'a Cell,
    pub northwest: &'a Cell,
    pub southeast: &'a Cell,
    pub southwest: &'a Cell,
}

impl<'a> NeighborSet<'a> {
    /// Neighbors of a cell alone on the board: the sentinel everywhere.
    pub fn edge_of_board() -> NeighborSet<'static> {
        NeighborSet {
            north: &DUMMY,
            south: &DUMMY,
            east: &DUMMY,
            west: &DUMMY,
            northeast: &DUMMY,
            northwest: &DUMMY,
            southeast: &DUMMY,
            southwest: &DUMMY,
        }
    }

    /// The neighbors, each paired with the direction it lies in.
    pub fn with_directions(&self) -> [(Direction, &'a Cell); 8] {
        [
            (Direction::NORTH, self.north),
            (Direction::SOUTH, self.south),
            (Direction::EAST, self.east),
            (Direction::WEST, self.west),
            (Direction::NORTHEAST, self.northeast),
            (Direction::NORTHWEST, self.northwest),
            (Direction::SOUTHEAST, self.southeast),
            (Direction::SOUTHWEST, self.southwest),
        ]
    }

    /// The neighbors.
    pub fn cells(&self) -> [&'a Cell; 8] {
        self.with_directions().map(|(_, cell)| cell)
    }
}
