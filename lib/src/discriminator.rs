//! Computing the next generation.

use crate::{
    cells::{Cell, NeighborSet, Resident},
    neighborhood::Neighborhood,
};

/// A cell with this many living neighbors is born.
const BIRTH: usize = 3;

/// A living cell with this many living neighbors survives.
/// It also survives with [`BIRTH`] living neighbors.
const SURVIVAL: usize = 2;

/// Computes the next state of a cell from its eight neighbors.
///
/// It only ever writes the shadow state of the residents and the activity
/// flags of the blocks, never the current state, so the whole board is
/// computed against the same generation no matter how deep the recursion
/// goes or in which order the blocks are visited.
pub(crate) struct StateDiscriminator<'n, 'a> {
    neighbors: &'n NeighborSet<'a>,
}

impl<'n, 'a> StateDiscriminator<'n, 'a> {
    pub(crate) fn new(neighbors: &'n NeighborSet<'a>) -> Self {
        StateDiscriminator { neighbors }
    }

    /// Conway's rule, B3/S23.
    ///
    /// Returns `true` if the resident is going to change.
    pub(crate) fn resident(&self, resident: &Resident) -> bool {
        let mut count = 0;
        for (direction, cell) in self.neighbors.with_directions().iter() {
            debug_assert!(
                matches!(cell, Cell::Resident(_) | Cell::Dummy(_)),
                "incorrect neighbor type in {:?}",
                direction
            );
            if cell.is_alive() {
                count += 1;
            }
        }

        let alive = resident.is_alive();
        let will_be_alive = count == BIRTH || (alive && count == SURVIVAL);
        resident.set_will_be_alive(will_be_alive);
        alive != will_be_alive
    }

    /// Whether one of the blocks around changed along the edge it shares
    /// with the current block.
    fn disrupted(&self) -> bool {
        self.neighbors
            .with_directions()
            .iter()
            .any(|(direction, cell)| cell.active_edges().contains(direction.opposite()))
    }

    /// Computes the next state of every cell in the block, unless the block
    /// and everything around it is quiescent.
    ///
    /// Returns `true` if anything in the block is going to change.
    pub(crate) fn neighborhood(&self, neighborhood: &Neighborhood) -> bool {
        let was_active = neighborhood.is_active();
        let mut nothing_changed = true;

        if was_active || self.disrupted() {
            let grid_size = neighborhood.grid_size();
            for row in 0..grid_size {
                for column in 0..grid_size {
                    let neighbors = neighborhood.neighbors_of(row, column, self.neighbors);
                    if neighborhood
                        .cell(row, column)
                        .compute_next_state(&neighbors)
                    {
                        nothing_changed = false;
                    }
                }
            }
        }

        if was_active && nothing_changed {
            neighborhood.request_one_more_refresh();
        }
        neighborhood.set_active(!nothing_changed);
        !nothing_changed
    }
}
