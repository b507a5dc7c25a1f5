//! The universe: a board, its history, and the people watching it.

use crate::{
    cells::{NeighborSet, Point},
    config::Config,
    error::Error,
    gate::{BoardView, ReadGate},
    memento::Memento,
    neighborhood::Neighborhood,
    observer::{Change, ObserverId, Observers},
    save::Storable,
};
use educe::Educe;
use log::{debug, info, warn};
use std::{
    collections::VecDeque,
    io::{Read, Write},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

/// The whole board, with its history.
///
/// Everything that changes the board takes `&mut self`, so there is only
/// ever one writer. Other threads read the board through a [`BoardView`].
#[derive(Educe)]
#[educe(Debug)]
pub struct Universe {
    /// The configuration this universe is built from.
    config: Config,

    /// The outermost block.
    #[educe(Debug(ignore))]
    board: Arc<Neighborhood>,

    /// Closed while the board is being changed.
    gate: Arc<ReadGate>,

    /// Snapshots to undo to, the most recent last.
    ///
    /// The first one is the empty board the universe started with, until
    /// it is evicted by the history limit.
    #[educe(Debug(ignore))]
    history: VecDeque<Memento>,

    /// Number of generations since the universe was created, minus the
    /// generations undone.
    ///
    /// Shared with the views, and only changed with the gate closed.
    generation: Arc<AtomicU64>,

    #[educe(Debug(ignore))]
    observers: Observers,
}

impl Universe {
    /// Creates an empty universe.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: Config) -> Result<Self, Error> {
        let board = config.board()?;
        info!(
            "Created a {0}×{0} board of depth {1}",
            board.width_in_cells(),
            config.depth
        );
        let mut history = VecDeque::new();
        history.push_back(board.snapshot());
        Ok(Universe {
            config,
            board: Arc::new(board),
            gate: Arc::new(ReadGate::new()),
            history,
            generation: Arc::new(AtomicU64::new(0)),
            observers: Observers::default(),
        })
    }

    /// The configuration of the universe.
    #[inline]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// The outermost block.
    #[inline]
    pub fn board(&self) -> &Neighborhood {
        &self.board
    }

    /// Width (and height) of the board in cells.
    #[inline]
    pub fn width_in_cells(&self) -> i32 {
        self.board.width_in_cells()
    }

    /// Current generation.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Relaxed)
    }

    /// Number of living cells.
    pub fn population(&self) -> usize {
        self.board.population()
    }

    /// Number of snapshots in the history, including the one that can not
    /// be undone.
    #[inline]
    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// A view of the board for other threads.
    pub fn view(&self) -> BoardView {
        BoardView::new(
            Arc::clone(&self.board),
            Arc::clone(&self.gate),
            Arc::clone(&self.generation),
        )
    }

    /// Whether the cell at `point` is alive.
    pub fn is_alive(&self, point: Point) -> Result<bool, Error> {
        self.board
            .is_alive_at(point)
            .ok_or(Error::OutOfBoard(point))
    }

    /// Snapshots the board.
    pub fn memento(&self) -> Result<Memento, Error> {
        self.board.create_memento()
    }

    /// Displays the board in
    /// [Plaintext](https://conwaylife.com/wiki/Plaintext) format.
    pub fn plaintext(&self) -> String {
        self.board.plaintext()
    }

    /// Attaches an observer, which will be called after every change of the
    /// board, after the observers attached before it.
    pub fn attach<F>(&mut self, observer: F) -> ObserverId
    where
        F: FnMut(&Change) + Send + 'static,
    {
        self.observers.attach(Box::new(observer))
    }

    /// Detaches an observer. Returns `false` if it was not attached.
    pub fn detach(&mut self, id: ObserverId) -> bool {
        self.observers.detach(id)
    }

    /// Number of attached observers.
    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    fn remember(&mut self, memento: Memento) {
        self.history.push_back(memento);
        if let Some(limit) = self.config.history_limit {
            while self.history.len() > limit + 1 {
                self.history.pop_front();
            }
        }
    }

    /// Advances one generation.
    ///
    /// The board before the tick is pushed onto the history first.
    /// Returns `true` if anything changed.
    pub fn tick(&mut self) -> bool {
        let snapshot = self.board.snapshot();
        self.remember(snapshot);

        self.board.compute_next_state(&NeighborSet::edge_of_board());
        let board = &self.board;
        let generation = &self.generation;
        let (changed, generation) = self.gate.closed(|| {
            let changed = board.commit();
            (changed, generation.fetch_add(1, Ordering::Relaxed) + 1)
        });

        debug!(
            "Generation {}: population {}, changed: {}",
            generation,
            self.board.population(),
            changed
        );
        if changed {
            self.observers.notify(Change::Ticked { generation });
        }
        changed
    }

    /// Kills every cell.
    pub fn clear(&mut self) {
        let board = &self.board;
        self.gate.closed(|| board.clear());
        info!("Cleared the board");
        self.observers.notify(Change::Cleared);
    }

    /// Replaces the board with a memento.
    pub fn restore(&mut self, memento: Memento) -> Result<(), Error> {
        self.transfer(memento, false)
    }

    /// Adds the living cells of a memento to the board.
    pub fn merge(&mut self, memento: Memento) -> Result<(), Error> {
        self.transfer(memento, true)
    }

    fn transfer(&mut self, memento: Memento, merged: bool) -> Result<(), Error> {
        let population = memento.population();
        let board = &self.board;
        self.gate.closed(|| {
            if !merged {
                board.clear();
            }
            board.restore(memento)
        })?;
        info!(
            "Loaded {} cells{}",
            population,
            if merged { " on top of the board" } else { "" }
        );
        self.observers.notify(Change::Loaded { merged });
        Ok(())
    }

    /// Writes the board to `writer`.
    pub fn save<W: Write>(&self, writer: W) -> Result<(), Error> {
        let memento = self.memento()?;
        memento.flush(writer)?;
        info!("Saved {} cells", memento.population());
        Ok(())
    }

    /// Replaces the board with what is read from `reader`.
    ///
    /// The board is left untouched if the stream can not be read.
    pub fn load<R: Read>(&mut self, reader: R) -> Result<(), Error> {
        let memento = Memento::read_from(reader)?;
        self.restore(memento)
    }

    /// Adds the living cells read from `reader` to the board.
    ///
    /// The board is left untouched if the stream can not be read.
    pub fn merge_load<R: Read>(&mut self, reader: R) -> Result<(), Error> {
        let memento = Memento::read_from(reader)?;
        self.merge(memento)
    }

    /// Rolls back the last generation.
    ///
    /// Returns `false`, doing nothing, if there is nothing to roll back to.
    pub fn undo(&mut self) -> bool {
        if self.history.len() < 2 {
            warn!("Nothing to undo");
            return false;
        }
        let memento = match self.history.pop_back() {
            Some(memento) => memento,
            None => return false,
        };
        let board = &self.board;
        let generation = &self.generation;
        let generation = self.gate.closed(|| {
            board.clear();
            board.overlay(memento);
            let previous = generation.load(Ordering::Relaxed).saturating_sub(1);
            generation.store(previous, Ordering::Relaxed);
            previous
        });
        info!("Rolled back to generation {}", generation);
        self.observers.notify(Change::Undone);
        true
    }

    /// Flips the cell at `point`. Returns its new state.
    pub fn toggle(&mut self, point: Point) -> Result<bool, Error> {
        let board = &self.board;
        let alive = self
            .gate
            .closed(|| board.toggle(point))
            .ok_or(Error::OutOfBoard(point))
            .map_err(|error| {
                warn!("{}", error);
                error
            })?;
        self.observers.notify(Change::Toggled(point));
        Ok(alive)
    }
}
