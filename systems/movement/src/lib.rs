#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement system that walks enemies toward the defended edge.
//!
//! Each tick the system first looks for a breach, then shifts every enemy one
//! column toward column zero, spawns the arrivals scheduled for the tick at
//! the far column and finally decides whether the wave has been cleared.

use lane_defence_core::{Cell, CellCoord, EngineState, Event, Grid, TickOutcome, WaveEntry};
use tracing::trace;

/// Pure system that advances enemies and spawns scheduled arrivals.
#[derive(Debug, Default)]
pub struct Movement {
    arrivals: Vec<WaveEntry>,
}

impl Movement {
    /// Creates a new movement system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolves the movement phase of the tick stored in `state`.
    ///
    /// Returns [`TickOutcome::Defeat`] without touching the lawn when an enemy
    /// already stands on column zero, and [`TickOutcome::Victory`] when no
    /// enemy remains after moving and spawning and none is still scheduled.
    pub fn advance(&mut self, state: &mut EngineState, out: &mut Vec<Event>) -> TickOutcome {
        if let Some(cell) = find_breach(&state.grid) {
            out.push(Event::Breached { cell });
            return TickOutcome::Defeat { tick: state.tick };
        }

        for lane in 0..state.grid.lanes() {
            shift_lane(&mut state.grid, lane, out);
        }

        self.spawn_arrivals(state, out);

        if !state.grid.has_enemies() && !state.pending.has_arrivals_from(state.tick) {
            return TickOutcome::Victory;
        }

        TickOutcome::Ongoing
    }

    fn spawn_arrivals(&mut self, state: &mut EngineState, out: &mut Vec<Event>) {
        self.arrivals.clear();
        state.pending.take_arrivals(state.tick, &mut self.arrivals);

        let column = state.grid.far_column();
        for entry in self.arrivals.drain(..) {
            let cell = CellCoord::new(entry.lane, column);
            let Some(slot) = state.grid.cell_mut(cell) else {
                // Plans are validated against the grid before the first tick.
                continue;
            };

            let previous = std::mem::replace(
                slot,
                Cell::Enemy {
                    strength: entry.strength,
                },
            );
            if previous.is_defender() {
                out.push(Event::DefenderDisplaced {
                    cell,
                    defender: previous,
                });
            }
            trace!(lane = entry.lane, strength = entry.strength.get(), "enemy spawned");
            out.push(Event::EnemySpawned {
                cell,
                strength: entry.strength,
            });
        }
    }
}

/// First cell, in ascending lane order, where an enemy stands on the defended edge.
#[must_use]
pub fn find_breach(grid: &Grid) -> Option<CellCoord> {
    (0..grid.lanes())
        .map(|lane| CellCoord::new(lane, 0))
        .find(|cell| grid.get(*cell).is_ok_and(|content| content.is_enemy()))
}

/// Shifts every enemy of the lane one column toward the edge.
///
/// Columns are visited from the edge outward, so the cell an enemy moves into
/// has already been vacated and no enemy moves twice.
fn shift_lane(grid: &mut Grid, lane: u32, out: &mut Vec<Event>) {
    let Some(cells) = grid.lane_mut(lane) else {
        return;
    };

    for column in 1..cells.len() {
        if !cells[column].is_enemy() {
            continue;
        }

        let enemy = std::mem::take(&mut cells[column]);
        let previous = std::mem::replace(&mut cells[column - 1], enemy);
        let from = CellCoord::new(lane, column as u32);
        let to = CellCoord::new(lane, column as u32 - 1);
        if previous.is_defender() {
            out.push(Event::DefenderDisplaced {
                cell: to,
                defender: previous,
            });
        }
        out.push(Event::EnemyAdvanced { from, to });
    }
}
