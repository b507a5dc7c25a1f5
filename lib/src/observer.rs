//! Change notifications.

use crate::cells::Point;

/// What changed the board.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Change {
    /// A generation was committed, and something changed.
    Ticked {
        /// The generation just committed.
        generation: u64,
    },
    /// The board was cleared.
    Cleared,
    /// A memento was loaded, onto a cleared board or on top of the cells
    /// already alive.
    Loaded {
        /// Whether the cells already alive were kept.
        merged: bool,
    },
    /// The last generation was rolled back.
    Undone,
    /// A single cell was flipped.
    Toggled(Point),
}

/// Identifies an attached observer, so that it can be detached.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObserverId(u64);

type Observer = Box<dyn FnMut(&Change) + Send>;

/// Observers, notified in the order in which they were attached.
#[derive(Default)]
pub(crate) struct Observers {
    next_id: u64,
    observers: Vec<(ObserverId, Observer)>,
}

impl Observers {
    pub(crate) fn attach(&mut self, observer: Observer) -> ObserverId {
        let id = ObserverId(self.next_id);
        self.next_id += 1;
        self.observers.push((id, observer));
        id
    }

    pub(crate) fn detach(&mut self, id: ObserverId) -> bool {
        let len = self.observers.len();
        self.observers.retain(|(other, _)| *other != id);
        self.observers.len() != len
    }

    pub(crate) fn notify(&mut self, change: Change) {
        for (_, observer) in self.observers.iter_mut() {
            observer(&change);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.observers.len()
    }
}
