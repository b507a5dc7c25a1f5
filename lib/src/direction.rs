//! Directions in which a block can disturb its neighbors.

use bitflags::bitflags;

bitflags! {
    /// A set of compass directions.
    ///
    /// A [`Neighborhood`](crate::Neighborhood) uses it to report along
    /// which of its edges some cell changed during the last commit,
    /// so that a quiescent neighbor on that side knows it must recompute.
    ///
    /// [`Direction::NONE`] and [`Direction::ALL`] are constants;
    /// a mutable set is built with `|` or [`insert`](Direction::insert).
    #[derive(Default)]
    pub struct Direction: u8 {
        /// No direction at all.
        const NONE = 0;

        /// North.
        const NORTH = 0b_0000_0001;
        /// South.
        const SOUTH = 0b_0000_0010;
        /// East.
        const EAST = 0b_0000_0100;
        /// West.
        const WEST = 0b_0000_1000;
        /// Northeast.
        const NORTHEAST = 0b_0001_0000;
        /// Northwest.
        const NORTHWEST = 0b_0010_0000;
        /// Southeast.
        const SOUTHEAST = 0b_0100_0000;
        /// Southwest.
        const SOUTHWEST = 0b_1000_0000;

        /// Every direction.
        const ALL = 0b_1111_1111;
    }
}

impl Direction {
    /// The direction facing this one.
    ///
    /// A block north of another one disturbs it when it is active
    /// on its south edge, hence this mapping.
    pub fn opposite(self) -> Self {
        const PAIRS: [(Direction, Direction); 8] = [
            (Direction::NORTH, Direction::SOUTH),
            (Direction::SOUTH, Direction::NORTH),
            (Direction::EAST, Direction::WEST),
            (Direction::WEST, Direction::EAST),
            (Direction::NORTHEAST, Direction::SOUTHWEST),
            (Direction::NORTHWEST, Direction::SOUTHEAST),
            (Direction::SOUTHEAST, Direction::NORTHWEST),
            (Direction::SOUTHWEST, Direction::NORTHEAST),
        ];
        PAIRS
            .iter()
            .filter(|(from, _)| self.contains(*from))
            .fold(Direction::NONE, |acc, (_, to)| acc | *to)
    }

    /// The edges of a `grid_size` × `grid_size` grid on which the cell at
    /// `(row, column)` lies.
    ///
    /// Corners also include the diagonal, interior cells give [`Direction::NONE`].
    pub fn of_position(row: usize, column: usize, grid_size: usize) -> Self {
        let last = grid_size - 1;
        let mut edges = Direction::NONE;

        if row == 0 {
            edges |= Direction::NORTH;
            if column == 0 {
                edges |= Direction::NORTHWEST;
            }
            if column == last {
                edges |= Direction::NORTHEAST;
            }
        }
        if row == last {
            edges |= Direction::SOUTH;
            if column == 0 {
                edges |= Direction::SOUTHWEST;
            }
            if column == last {
                edges |= Direction::SOUTHEAST;
            }
        }
        if column == 0 {
            edges |= Direction::WEST;
        }
        if column == last {
            edges |= Direction::EAST;
        }
        edges
    }
}
