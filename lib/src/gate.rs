//! The gate between the simulation thread and the readers.

use crate::neighborhood::Neighborhood;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Condvar, Mutex, MutexGuard, PoisonError,
};

#[derive(Debug)]
struct GateState {
    /// Whether reading is permitted.
    open: bool,
    /// Number of readers currently reading.
    readers: usize,
}

/// The one gate that keeps readers away from a half-committed generation.
///
/// The writer closes it right before it starts changing the current
/// generation of the board, and opens it again when it is done. Closing waits
/// for the readers which are already reading to finish, so a reader always
/// sees a whole generation.
///
/// There are no other locks: the cells themselves are never locked.
#[derive(Debug)]
pub struct ReadGate {
    state: Mutex<GateState>,
    changed: Condvar,
}

impl Default for ReadGate {
    fn default() -> Self {
        ReadGate {
            state: Mutex::new(GateState {
                open: true,
                readers: 0,
            }),
            changed: Condvar::new(),
        }
    }
}

impl ReadGate {
    /// An open gate.
    pub fn new() -> Self {
        ReadGate::default()
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Whether reading is permitted right now.
    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    /// Forbids reading, and waits until every reader has left.
    pub fn close(&self) {
        let mut state = self.lock();
        state.open = false;
        while state.readers > 0 {
            state = self
                .changed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Permits reading again, and wakes up the readers waiting for it.
    pub fn open(&self) {
        self.lock().open = true;
        self.changed.notify_all();
    }

    /// Runs `f` with the gate closed.
    ///
    /// The gate is opened again even if `f` panics.
    pub fn closed<T, F: FnOnce() -> T>(&self, f: F) -> T {
        self.close();
        let _reopen = Reopen { gate: self };
        f()
    }

    /// Enters the gate if it is open; returns `None` without waiting if it
    /// is closed.
    pub fn try_enter(&self) -> Option<ReadGuard<'_>> {
        let mut state = self.lock();
        if !state.open {
            return None;
        }
        state.readers += 1;
        Some(ReadGuard { gate: self })
    }

    /// Waits until the gate is open, and enters it.
    pub fn enter(&self) -> ReadGuard<'_> {
        let mut state = self.lock();
        while !state.open {
            state = self
                .changed
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
        state.readers += 1;
        ReadGuard { gate: self }
    }
}

/// Opens the gate when dropped.
struct Reopen<'g> {
    gate: &'g ReadGate,
}

impl Drop for Reopen<'_> {
    fn drop(&mut self) {
        self.gate.open();
    }
}

/// A reader inside the [`ReadGate`]. Leaves the gate when dropped.
#[derive(Debug)]
pub struct ReadGuard<'g> {
    gate: &'g ReadGate,
}

impl Drop for ReadGuard<'_> {
    fn drop(&mut self) {
        let mut state = self.gate.lock();
        state.readers -= 1;
        if state.readers == 0 {
            self.gate.changed.notify_all();
        }
    }
}

/// A read-only view of a board, for renderers on other threads.
///
/// Cloning it is cheap.
#[derive(Clone, Debug)]
pub struct BoardView {
    board: Arc<Neighborhood>,
    gate: Arc<ReadGate>,
    generation: Arc<AtomicU64>,
}

impl BoardView {
    pub(crate) fn new(
        board: Arc<Neighborhood>,
        gate: Arc<ReadGate>,
        generation: Arc<AtomicU64>,
    ) -> Self {
        BoardView {
            board,
            gate,
            generation,
        }
    }

    /// Reads the board, unless the simulation is committing a generation
    /// right now, in which case it returns `None` immediately.
    ///
    /// This is what a renderer should use: skipping a frame is better than
    /// waiting.
    pub fn try_read<T, F: FnOnce(&Neighborhood) -> T>(&self, f: F) -> Option<T> {
        let _guard = self.gate.try_enter()?;
        Some(f(&self.board))
    }

    /// Reads the board, waiting for the current commit to finish if needed.
    pub fn read<T, F: FnOnce(&Neighborhood) -> T>(&self, f: F) -> T {
        let _guard = self.gate.enter();
        f(&self.board)
    }

    /// The generation of the board.
    ///
    /// It changes together with the board, so it matches what is read
    /// inside [`try_read`](BoardView::try_read) or [`read`](BoardView::read).
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::Relaxed)
    }

    /// The gate this view reads through.
    pub fn gate(&self) -> &ReadGate {
        &self.gate
    }
}
