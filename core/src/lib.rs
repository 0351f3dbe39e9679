#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Lane Defence engine.
//!
//! This crate defines the lawn that every other crate operates on. The
//! [`Grid`] stores one [`Cell`] per lane and column, the [`WavePlan`] lists
//! the enemies scheduled to arrive, and the [`EngineState`] bundles both
//! together with the current tick. Systems mutate the state in place and
//! describe every mutation they perform as an [`Event`], while the world
//! reports the result of each tick as a [`TickOutcome`].

use std::num::NonZeroU32;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Location of a single grid cell expressed as lane and column indices.
///
/// Column zero is the defended edge; enemies enter at the highest column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CellCoord {
    lane: u32,
    column: u32,
}

impl CellCoord {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(lane: u32, column: u32) -> Self {
        Self { lane, column }
    }

    /// Zero-based lane (row) index of the cell.
    #[must_use]
    pub const fn lane(&self) -> u32 {
        self.lane
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> u32 {
        self.column
    }
}

/// Content of a single lawn cell.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Cell {
    /// Nothing occupies the cell.
    #[default]
    Empty,
    /// Defender whose power joins the lane-wide volley.
    LineShooter {
        /// Damage contributed to every enemy further out in the lane.
        power: u32,
    },
    /// Defender that fires single-point rays in three fixed directions.
    RadialShooter,
    /// Advancing enemy.
    Enemy {
        /// Damage the enemy can absorb before it is removed.
        strength: NonZeroU32,
    },
}

impl Cell {
    /// Reports whether the cell holds an enemy.
    #[must_use]
    pub const fn is_enemy(&self) -> bool {
        matches!(self, Self::Enemy { .. })
    }

    /// Reports whether the cell holds either kind of defender.
    #[must_use]
    pub const fn is_defender(&self) -> bool {
        matches!(self, Self::LineShooter { .. } | Self::RadialShooter)
    }

    /// Remaining strength of the enemy occupying the cell, if any.
    #[must_use]
    pub const fn enemy_strength(&self) -> Option<NonZeroU32> {
        match self {
            Self::Enemy { strength } => Some(*strength),
            _ => None,
        }
    }
}

/// Errors raised by [`Grid`] accessors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum GridError {
    /// The requested cell lies outside the declared dimensions.
    #[error("cell (lane {lane}, column {column}) lies outside the {lanes}x{columns} grid")]
    OutOfBounds {
        /// Requested lane.
        lane: u32,
        /// Requested column.
        column: u32,
        /// Number of lanes in the grid.
        lanes: u32,
        /// Number of columns in the grid.
        columns: u32,
    },
    /// A grid needs at least one lane and one column.
    #[error("grid dimensions must be non-zero, got {lanes}x{columns}")]
    EmptyDimensions {
        /// Requested number of lanes.
        lanes: u32,
        /// Requested number of columns.
        columns: u32,
    },
    /// A lane supplied to [`Grid::from_lanes`] differs in length from the first lane.
    #[error("lane {lane} has {actual} columns but the grid expects {expected}")]
    Ragged {
        /// Offending lane.
        lane: u32,
        /// Column count of the first lane.
        expected: u32,
        /// Column count of the offending lane.
        actual: u32,
    },
}

impl TryFrom<Vec<Vec<Cell>>> for Grid {
    type Error = GridError;

    fn try_from(lanes: Vec<Vec<Cell>>) -> Result<Self, Self::Error> {
        Self::from_lanes(lanes)
    }
}

impl From<Grid> for Vec<Vec<Cell>> {
    fn from(grid: Grid) -> Self {
        grid.to_lanes()
    }
}

/// Rectangular lawn holding one [`Cell`] per lane and column.
///
/// Dimensions are fixed at construction. Cells are stored densely in
/// lane-major order so each lane is a contiguous slice. Serialized as a list
/// of lanes and validated through [`Grid::from_lanes`] on the way back in.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<Cell>>", into = "Vec<Vec<Cell>>")]
pub struct Grid {
    lanes: u32,
    columns: u32,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates an empty grid with the provided dimensions.
    pub fn new(lanes: u32, columns: u32) -> Result<Self, GridError> {
        if lanes == 0 || columns == 0 {
            return Err(GridError::EmptyDimensions { lanes, columns });
        }

        let len = lanes as usize * columns as usize;
        Ok(Self {
            lanes,
            columns,
            cells: vec![Cell::Empty; len],
        })
    }

    /// Builds a grid from explicit lane contents, index 0 being the defended edge.
    pub fn from_lanes(lanes: Vec<Vec<Cell>>) -> Result<Self, GridError> {
        let lane_count = u32::try_from(lanes.len()).unwrap_or(u32::MAX);
        let columns = lanes
            .first()
            .map_or(0, |lane| u32::try_from(lane.len()).unwrap_or(u32::MAX));
        let mut grid = Self::new(lane_count, columns)?;

        for (index, lane) in lanes.into_iter().enumerate() {
            let actual = u32::try_from(lane.len()).unwrap_or(u32::MAX);
            if actual != columns {
                return Err(GridError::Ragged {
                    lane: index as u32,
                    expected: columns,
                    actual,
                });
            }
            let start = index * columns as usize;
            grid.cells[start..start + lane.len()].copy_from_slice(&lane);
        }

        Ok(grid)
    }

    /// Copies the grid out as one vector of cells per lane.
    #[must_use]
    pub fn to_lanes(&self) -> Vec<Vec<Cell>> {
        self.cells
            .chunks(self.columns as usize)
            .map(<[Cell]>::to_vec)
            .collect()
    }

    /// Number of lanes (rows) in the grid.
    #[must_use]
    pub const fn lanes(&self) -> u32 {
        self.lanes
    }

    /// Number of columns in every lane.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Column at which enemies enter the lawn.
    #[must_use]
    pub const fn far_column(&self) -> u32 {
        self.columns - 1
    }

    /// Reports whether the coordinate lies inside the grid.
    #[must_use]
    pub const fn contains(&self, cell: CellCoord) -> bool {
        cell.lane() < self.lanes && cell.column() < self.columns
    }

    /// Returns the content of the requested cell.
    pub fn get(&self, cell: CellCoord) -> Result<Cell, GridError> {
        let index = self.index(cell)?;
        Ok(self.cells[index])
    }

    /// Overwrites the requested cell.
    pub fn set(&mut self, cell: CellCoord, value: Cell) -> Result<(), GridError> {
        let _ = self.replace(cell, value)?;
        Ok(())
    }

    /// Overwrites the requested cell and returns its previous content.
    pub fn replace(&mut self, cell: CellCoord, value: Cell) -> Result<Cell, GridError> {
        let index = self.index(cell)?;
        Ok(std::mem::replace(&mut self.cells[index], value))
    }

    /// Mutable access to a cell, or `None` when the coordinate is outside the grid.
    #[must_use]
    pub fn cell_mut(&mut self, cell: CellCoord) -> Option<&mut Cell> {
        let index = self.index(cell).ok()?;
        self.cells.get_mut(index)
    }

    /// Read-only view of a single lane ordered from the defended edge outward.
    #[must_use]
    pub fn lane(&self, lane: u32) -> Option<&[Cell]> {
        if lane >= self.lanes {
            return None;
        }
        let start = lane as usize * self.columns as usize;
        self.cells.get(start..start + self.columns as usize)
    }

    /// Mutable view of a single lane ordered from the defended edge outward.
    #[must_use]
    pub fn lane_mut(&mut self, lane: u32) -> Option<&mut [Cell]> {
        if lane >= self.lanes {
            return None;
        }
        let start = lane as usize * self.columns as usize;
        self.cells.get_mut(start..start + self.columns as usize)
    }

    /// Iterates over every cell in lane-major order.
    pub fn iter(&self) -> impl Iterator<Item = (CellCoord, Cell)> + '_ {
        let columns = self.columns as usize;
        self.cells.iter().enumerate().map(move |(index, cell)| {
            let coord = CellCoord::new((index / columns) as u32, (index % columns) as u32);
            (coord, *cell)
        })
    }

    /// Number of cells currently occupied by enemies.
    #[must_use]
    pub fn enemy_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.is_enemy()).count()
    }

    /// Reports whether any enemy remains on the lawn.
    #[must_use]
    pub fn has_enemies(&self) -> bool {
        self.cells.iter().any(Cell::is_enemy)
    }

    /// Sum of the strength of every enemy on the lawn.
    #[must_use]
    pub fn total_enemy_strength(&self) -> u64 {
        self.cells
            .iter()
            .filter_map(Cell::enemy_strength)
            .map(|strength| u64::from(strength.get()))
            .sum()
    }

    fn index(&self, cell: CellCoord) -> Result<usize, GridError> {
        if !self.contains(cell) {
            return Err(GridError::OutOfBounds {
                lane: cell.lane(),
                column: cell.column(),
                lanes: self.lanes,
                columns: self.columns,
            });
        }
        Ok(cell.lane() as usize * self.columns as usize + cell.column() as usize)
    }
}

/// Single scheduled enemy arrival.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WaveEntry {
    /// Tick at which the enemy enters the lawn.
    pub arrival_tick: u64,
    /// Lane the enemy enters.
    pub lane: u32,
    /// Strength the enemy spawns with.
    pub strength: NonZeroU32,
}

impl WaveEntry {
    /// Creates a new scheduled arrival.
    #[must_use]
    pub const fn new(arrival_tick: u64, lane: u32, strength: NonZeroU32) -> Self {
        Self {
            arrival_tick,
            lane,
            strength,
        }
    }
}

/// Ordered schedule of enemy arrivals for a single wave.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WavePlan {
    entries: Vec<WaveEntry>,
}

impl WavePlan {
    /// Creates a plan from the provided entries, preserving their order.
    #[must_use]
    pub fn new(entries: Vec<WaveEntry>) -> Self {
        Self { entries }
    }

    /// Entries that have not been consumed yet.
    #[must_use]
    pub fn entries(&self) -> &[WaveEntry] {
        &self.entries
    }

    /// Number of entries that have not been consumed yet.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether every entry has been consumed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of the strength of every remaining entry.
    #[must_use]
    pub fn total_strength(&self) -> u64 {
        self.entries
            .iter()
            .map(|entry| u64::from(entry.strength.get()))
            .sum()
    }

    /// Latest arrival tick among the remaining entries.
    #[must_use]
    pub fn last_arrival(&self) -> Option<u64> {
        self.entries.iter().map(|entry| entry.arrival_tick).max()
    }

    /// Reports whether any remaining entry arrives at or after `tick`.
    #[must_use]
    pub fn has_arrivals_from(&self, tick: u64) -> bool {
        self.entries.iter().any(|entry| entry.arrival_tick >= tick)
    }

    /// Moves every entry arriving exactly at `tick` into `out`, preserving plan order.
    pub fn take_arrivals(&mut self, tick: u64, out: &mut Vec<WaveEntry>) {
        let (arrived, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.entries)
            .into_iter()
            .partition(|entry| entry.arrival_tick == tick);
        self.entries = pending;
        out.extend(arrived);
    }

    /// Checks every entry against the grid the plan will be played on.
    pub fn validate(&self, grid: &Grid) -> Result<(), EngineError> {
        for (index, entry) in self.entries.iter().enumerate() {
            if entry.lane >= grid.lanes() {
                return Err(EngineError::InvalidWavePlan {
                    index,
                    lane: entry.lane,
                    lanes: grid.lanes(),
                });
            }
        }
        Ok(())
    }
}

impl FromIterator<WaveEntry> for WavePlan {
    fn from_iter<I: IntoIterator<Item = WaveEntry>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// Errors raised while constructing an engine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum EngineError {
    /// A wave plan entry targets a lane the grid does not have.
    #[error("wave plan entry {index} targets lane {lane} but the grid has {lanes} lanes")]
    InvalidWavePlan {
        /// Position of the offending entry in the plan.
        index: usize,
        /// Lane requested by the entry.
        lane: u32,
        /// Number of lanes in the grid.
        lanes: u32,
    },
}

/// Mutable state of a wave in progress.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineState {
    /// Lawn contents.
    pub grid: Grid,
    /// Arrivals that have not spawned yet.
    pub pending: WavePlan,
    /// Tick currently being resolved.
    pub tick: u64,
}

impl EngineState {
    /// Creates a state positioned at tick zero.
    #[must_use]
    pub fn new(grid: Grid, pending: WavePlan) -> Self {
        Self {
            grid,
            pending,
            tick: 0,
        }
    }
}

/// Result of resolving a single tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TickOutcome {
    /// The wave continues.
    Ongoing,
    /// An enemy reached the defended edge during the given tick.
    Defeat {
        /// Tick in which the breach was detected.
        tick: u64,
    },
    /// Every enemy has arrived and been destroyed.
    Victory,
}

impl TickOutcome {
    /// Reports whether the wave has ended.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        !matches!(self, Self::Ongoing)
    }
}

/// Mutations performed on the lawn while resolving a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Event {
    /// An enemy reached the defended edge.
    Breached {
        /// Cell holding the breaching enemy.
        cell: CellCoord,
    },
    /// An enemy moved one column toward the defended edge.
    EnemyAdvanced {
        /// Cell the enemy occupied before moving.
        from: CellCoord,
        /// Cell the enemy occupies after moving.
        to: CellCoord,
    },
    /// A scheduled enemy entered the lawn.
    EnemySpawned {
        /// Cell the enemy occupies after spawning.
        cell: CellCoord,
        /// Strength the enemy spawned with.
        strength: NonZeroU32,
    },
    /// A defender was overwritten by an enemy entering its cell.
    DefenderDisplaced {
        /// Cell the defender occupied.
        cell: CellCoord,
        /// Defender that was removed.
        defender: Cell,
    },
    /// An enemy absorbed damage and survived.
    EnemyDamaged {
        /// Cell holding the enemy.
        cell: CellCoord,
        /// Damage absorbed.
        damage: u32,
        /// Strength left after the hit.
        remaining: NonZeroU32,
    },
    /// An enemy absorbed its remaining strength and was removed.
    EnemyDestroyed {
        /// Cell the enemy occupied.
        cell: CellCoord,
        /// Strength the enemy had before the killing hit.
        strength: NonZeroU32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::{de::DeserializeOwned, Serialize};

    fn strength(value: u32) -> NonZeroU32 {
        NonZeroU32::new(value).expect("non-zero strength")
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn zero_sized_grids_are_rejected() {
        assert_eq!(
            Grid::new(0, 4),
            Err(GridError::EmptyDimensions {
                lanes: 0,
                columns: 4
            })
        );
        assert!(Grid::new(3, 0).is_err());
    }

    #[test]
    fn accessors_reject_out_of_bounds_cells() {
        let mut grid = Grid::new(2, 3).expect("grid");
        let outside = CellCoord::new(2, 0);

        assert_eq!(
            grid.get(outside),
            Err(GridError::OutOfBounds {
                lane: 2,
                column: 0,
                lanes: 2,
                columns: 3,
            })
        );
        assert!(grid.set(CellCoord::new(0, 3), Cell::RadialShooter).is_err());
        assert!(grid.cell_mut(outside).is_none());
    }

    #[test]
    fn set_then_get_observes_the_new_cell() {
        let mut grid = Grid::new(2, 3).expect("grid");
        let coord = CellCoord::new(1, 2);
        grid.set(coord, Cell::LineShooter { power: 4 }).expect("set");

        assert_eq!(grid.get(coord), Ok(Cell::LineShooter { power: 4 }));
        assert_eq!(
            grid.replace(coord, Cell::Empty),
            Ok(Cell::LineShooter { power: 4 })
        );
        assert_eq!(grid.lane(1), Some(&[Cell::Empty; 3][..]));
    }

    #[test]
    fn from_lanes_requires_rectangular_input() {
        let ragged = vec![vec![Cell::Empty; 3], vec![Cell::Empty; 2]];
        assert_eq!(
            Grid::from_lanes(ragged),
            Err(GridError::Ragged {
                lane: 1,
                expected: 3,
                actual: 2,
            })
        );

        let grid = Grid::from_lanes(vec![
            vec![Cell::RadialShooter, Cell::Empty],
            vec![Cell::Empty, Cell::Enemy { strength: strength(2) }],
        ])
        .expect("grid");
        assert_eq!(grid.lanes(), 2);
        assert_eq!(grid.columns(), 2);
        assert_eq!(grid.enemy_count(), 1);
        assert_eq!(grid.total_enemy_strength(), 2);
        assert_eq!(grid.get(CellCoord::new(0, 0)), Ok(Cell::RadialShooter));
    }

    #[test]
    fn iter_walks_lanes_in_order() {
        let grid = Grid::new(2, 2).expect("grid");
        let coords: Vec<_> = grid.iter().map(|(coord, _)| coord).collect();
        assert_eq!(
            coords,
            vec![
                CellCoord::new(0, 0),
                CellCoord::new(0, 1),
                CellCoord::new(1, 0),
                CellCoord::new(1, 1),
            ]
        );
    }

    #[test]
    fn take_arrivals_preserves_plan_order() {
        let mut plan = WavePlan::new(vec![
            WaveEntry::new(1, 0, strength(3)),
            WaveEntry::new(0, 1, strength(2)),
            WaveEntry::new(1, 2, strength(5)),
        ]);
        let mut arrived = Vec::new();
        plan.take_arrivals(1, &mut arrived);

        assert_eq!(
            arrived,
            vec![
                WaveEntry::new(1, 0, strength(3)),
                WaveEntry::new(1, 2, strength(5)),
            ]
        );
        assert_eq!(plan.entries(), &[WaveEntry::new(0, 1, strength(2))]);
        assert!(plan.has_arrivals_from(0));
        assert!(!plan.has_arrivals_from(1));
    }

    #[test]
    fn validation_reports_first_out_of_range_lane() {
        let grid = Grid::new(2, 4).expect("grid");
        let plan = WavePlan::new(vec![
            WaveEntry::new(0, 1, strength(1)),
            WaveEntry::new(2, 5, strength(1)),
        ]);

        assert_eq!(
            plan.validate(&grid),
            Err(EngineError::InvalidWavePlan {
                index: 1,
                lane: 5,
                lanes: 2,
            })
        );
    }

    #[test]
    fn wave_plan_round_trips_through_bincode() {
        let plan: WavePlan = [
            WaveEntry::new(0, 0, strength(4)),
            WaveEntry::new(3, 1, strength(9)),
        ]
        .into_iter()
        .collect();
        assert_round_trip(&plan);
    }

    #[test]
    fn grid_round_trips_through_bincode() {
        let mut grid = Grid::new(2, 3).expect("grid");
        grid.set(CellCoord::new(0, 0), Cell::LineShooter { power: 4 }).expect("in bounds");
        grid.set(CellCoord::new(1, 1), Cell::RadialShooter).expect("in bounds");
        grid.set(
            CellCoord::new(1, 2),
            Cell::Enemy {
                strength: strength(6),
            },
        )
        .expect("in bounds");
        assert_round_trip(&grid);
    }

    #[test]
    fn ragged_grids_are_rejected_when_deserialized() {
        let lanes = vec![vec![Cell::Empty; 3], vec![Cell::Empty; 2]];
        let bytes = bincode::serialize(&lanes).expect("serialize");
        assert!(bincode::deserialize::<Grid>(&bytes).is_err());
    }

    #[test]
    fn cell_round_trips_through_bincode() {
        assert_round_trip(&Cell::Enemy {
            strength: strength(7),
        });
    }

    #[test]
    fn only_ongoing_is_not_terminal() {
        assert!(!TickOutcome::Ongoing.is_terminal());
        assert!(TickOutcome::Defeat { tick: 3 }.is_terminal());
        assert!(TickOutcome::Victory.is_terminal());
    }
}
