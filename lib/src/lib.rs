//! __Lifeblocks__ runs [Conway's Game of Life](https://conwaylife.com/wiki/Conway%27s_Game_of_Life)
//! on a finite board with hard edges.
//!
//! The board is a tree of square blocks. A block in which nothing changed
//! during the last generation, and whose neighbors did not change along the
//! edges they share with it, is skipped entirely, so a mostly stable board
//! costs little to run.
//!
//! # Example
//!
//! ```rust
//! use lifeblocks_lib::{Config, Point};
//!
//! // A 16×16 board, made of 4×4 blocks of 4×4 cells.
//! let mut universe = Config::new(4, 2).universe().unwrap();
//!
//! // A blinker.
//! for x in 1..4 {
//!     universe.toggle(Point::new(x, 2)).unwrap();
//! }
//!
//! universe.tick();
//! assert!(universe.is_alive(Point::new(2, 1)).unwrap());
//! assert!(!universe.is_alive(Point::new(1, 2)).unwrap());
//!
//! assert!(universe.undo());
//! assert!(universe.is_alive(Point::new(1, 2)).unwrap());
//! ```

#![cfg_attr(any(docs_rs, github_io), feature(doc_cfg))]

mod cells;
mod clock;
mod config;
mod direction;
mod discriminator;
mod error;
mod gate;
mod memento;
mod neighborhood;
mod observer;
mod save;
mod universe;

pub use cells::{Cell, Dummy, NeighborSet, Point, Resident, DUMMY};
pub use clock::{Clock, TickRate};
pub use config::Config;
pub use direction::Direction;
pub use error::Error;
pub use gate::{BoardView, ReadGate, ReadGuard};
pub use memento::{Memento, Transfer};
pub use neighborhood::Neighborhood;
pub use observer::{Change, ObserverId};
pub use save::Storable;
pub use universe::Universe;
