//! Universe configuration.

use crate::{
    cells::{Cell, Resident},
    clock::TickRate,
    error::Error,
    neighborhood::Neighborhood,
    universe::Universe,
};
use serde::{Deserialize, Serialize};

/// Universe configuration.
///
/// The universe will be generated from this configuration.
///
/// The board is a square of `grid_size` × `grid_size` blocks, each of which
/// is a square of `grid_size` × `grid_size` smaller blocks, and so on, for
/// `depth` levels. So the board is `grid_size.pow(depth)` cells wide.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Number of rows (and columns) in every block.
    pub grid_size: usize,

    /// Number of levels of blocks.
    pub depth: usize,

    /// Maximal number of generations that can be undone.
    ///
    /// `None` means that the whole history is kept.
    pub history_limit: Option<usize>,

    /// How fast a [`Clock`](crate::Clock) built from this configuration
    /// ticks.
    pub tick_rate: TickRate,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            grid_size: 8,
            depth: 2,
            history_limit: Some(1024),
            tick_rate: TickRate::default(),
        }
    }
}

impl Config {
    /// Sets up a new configuration with given block shape.
    pub fn new(grid_size: usize, depth: usize) -> Self {
        Config {
            grid_size,
            depth,
            ..Config::default()
        }
    }

    /// Sets the number of rows (and columns) in every block.
    pub fn set_grid_size(mut self, grid_size: usize) -> Self {
        self.grid_size = grid_size;
        self
    }

    /// Sets the number of levels of blocks.
    pub fn set_depth(mut self, depth: usize) -> Self {
        self.depth = depth;
        self
    }

    /// Sets the maximal number of generations that can be undone.
    pub fn set_history_limit(mut self, history_limit: Option<usize>) -> Self {
        self.history_limit = history_limit;
        self
    }

    /// Sets the tick rate.
    pub fn set_tick_rate(mut self, tick_rate: TickRate) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    /// Width of the board in cells.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn width(&self) -> Result<i32, Error> {
        if self.grid_size < 2 {
            return Err(Error::GridSizeError(self.grid_size));
        }
        if self.depth == 0 {
            return Err(Error::DepthError);
        }
        u32::try_from(self.depth)
            .ok()
            .and_then(|depth| self.grid_size.checked_pow(depth))
            .and_then(|width| i32::try_from(width).ok())
            .ok_or(Error::BoardTooLarge(self.grid_size, self.depth))
    }

    /// Builds the outermost block of an empty board.
    pub(crate) fn board(&self) -> Result<Neighborhood, Error> {
        self.width()?;
        let mut prototype = Cell::from(Resident::new());
        for _ in 1..self.depth {
            prototype = Cell::from(Box::new(Neighborhood::new(self.grid_size, &prototype)));
        }
        Ok(Neighborhood::outermost(self.grid_size, &prototype))
    }

    /// Creates a new universe from the configuration.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn universe(&self) -> Result<Universe, Error> {
        Universe::new(self.clone())
    }
}
