#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative wave state management for Lane Defence.
//!
//! [`WaveEngine`] owns the lawn, the arrivals still to come and the tick
//! counter. Every call to [`WaveEngine::step`] resolves one tick: movement
//! first, then defender fire, unless movement already ended the wave.

use lane_defence_core::{EngineError, EngineState, Event, Grid, TickOutcome, WavePlan};
use lane_defence_system_movement::Movement;
use lane_defence_system_tower_combat::TowerCombat;
use tracing::{debug, info};

/// Tick loop that plays a single wave to completion.
#[derive(Debug)]
pub struct WaveEngine {
    state: EngineState,
    movement: Movement,
    combat: TowerCombat,
    outcome: TickOutcome,
    events: Vec<Event>,
}

impl WaveEngine {
    /// Creates an engine positioned at tick zero.
    ///
    /// Fails with [`EngineError::InvalidWavePlan`] when an arrival targets a
    /// lane the grid does not have.
    pub fn new(grid: Grid, wave_plan: WavePlan) -> Result<Self, EngineError> {
        wave_plan.validate(&grid)?;
        debug!(
            lanes = grid.lanes(),
            columns = grid.columns(),
            arrivals = wave_plan.len(),
            "wave engine created"
        );
        Ok(Self {
            state: EngineState::new(grid, wave_plan),
            movement: Movement::new(),
            combat: TowerCombat::new(),
            outcome: TickOutcome::Ongoing,
            events: Vec::new(),
        })
    }

    /// Resolves the current tick and returns its outcome.
    ///
    /// Once a terminal outcome has been produced the engine is frozen: later
    /// calls return the same outcome and leave the state untouched.
    pub fn step(&mut self) -> TickOutcome {
        if self.outcome.is_terminal() {
            return self.outcome;
        }

        self.events.clear();
        let tick = self.state.tick;
        let outcome = self.movement.advance(&mut self.state, &mut self.events);
        if outcome == TickOutcome::Ongoing {
            self.combat.handle(&mut self.state.grid, &mut self.events);
        }

        self.outcome = outcome;
        match outcome {
            TickOutcome::Ongoing => {
                debug!(
                    tick,
                    enemies = self.state.grid.enemy_count(),
                    pending = self.state.pending.len(),
                    events = self.events.len(),
                    "tick resolved"
                );
                self.state.tick = self.state.tick.saturating_add(1);
            }
            TickOutcome::Defeat { tick } => info!(tick, "enemy breached the defended edge"),
            TickOutcome::Victory => info!(tick, "wave cleared"),
        }

        outcome
    }

    /// Steps until the wave ends and returns the terminal outcome.
    pub fn run_to_end(&mut self) -> TickOutcome {
        loop {
            let outcome = self.step();
            if outcome.is_terminal() {
                return outcome;
            }
        }
    }

    /// Read-only view of the lawn.
    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.state.grid
    }

    /// Tick that the next call to [`WaveEngine::step`] resolves.
    ///
    /// After a terminal outcome this stays on the tick that ended the wave.
    #[must_use]
    pub const fn tick(&self) -> u64 {
        self.state.tick
    }

    /// Outcome of the most recently resolved tick.
    #[must_use]
    pub const fn outcome(&self) -> TickOutcome {
        self.outcome
    }

    /// Reports whether the wave has ended.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.outcome.is_terminal()
    }

    /// Mutations performed while resolving the most recent tick.
    #[must_use]
    pub fn last_events(&self) -> &[Event] {
        &self.events
    }

    /// Consumes the engine and returns the lawn so it can host the next wave.
    #[must_use]
    pub fn into_grid(self) -> Grid {
        self.state.grid
    }
}

/// Query functions that expose read-only views of the engine state.
pub mod query {
    use super::WaveEngine;
    use lane_defence_core::{CellCoord, WaveEntry};

    /// Arrivals that have not entered the lawn yet.
    #[must_use]
    pub fn pending_arrivals(engine: &WaveEngine) -> &[WaveEntry] {
        engine.state.pending.entries()
    }

    /// Cells currently occupied by enemies in lane-major order.
    #[must_use]
    pub fn enemy_cells(engine: &WaveEngine) -> Vec<CellCoord> {
        engine
            .grid()
            .iter()
            .filter(|(_, cell)| cell.is_enemy())
            .map(|(coord, _)| coord)
            .collect()
    }

    /// Combined strength of the enemies on the lawn and those still to arrive.
    #[must_use]
    pub fn remaining_threat(engine: &WaveEngine) -> u64 {
        engine
            .grid()
            .total_enemy_strength()
            .saturating_add(engine.state.pending.total_strength())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lane_defence_core::{Cell, CellCoord, WaveEntry};
    use std::num::NonZeroU32;

    #[test]
    fn out_of_range_lane_is_rejected_at_construction() {
        let grid = Grid::new(2, 5).expect("grid");
        let plan = WavePlan::new(vec![WaveEntry::new(
            0,
            2,
            NonZeroU32::new(1).expect("non-zero"),
        )]);

        assert!(matches!(
            WaveEngine::new(grid, plan),
            Err(EngineError::InvalidWavePlan { index: 0, lane: 2, lanes: 2 })
        ));
    }

    #[test]
    fn tick_advances_only_while_ongoing() {
        let grid = Grid::new(1, 3).expect("grid");
        let plan = WavePlan::new(vec![WaveEntry::new(
            2,
            0,
            NonZeroU32::new(1).expect("non-zero"),
        )]);
        let mut engine = WaveEngine::new(grid, plan).expect("engine");

        assert_eq!(engine.step(), TickOutcome::Ongoing);
        assert_eq!(engine.tick(), 1);
        assert!(engine.last_events().is_empty());
        assert_eq!(query::remaining_threat(&engine), 1);

        assert_eq!(engine.step(), TickOutcome::Ongoing);
        assert_eq!(engine.tick(), 2);
        assert!(query::enemy_cells(&engine).is_empty());
        assert_eq!(query::pending_arrivals(&engine).len(), 1);
        assert_eq!(query::remaining_threat(&engine), 1);

        assert_eq!(engine.step(), TickOutcome::Ongoing);
        assert_eq!(engine.tick(), 3);
        assert_eq!(query::remaining_threat(&engine), 1);
        assert_eq!(query::enemy_cells(&engine), vec![CellCoord::new(0, 2)]);
        assert!(query::pending_arrivals(&engine).is_empty());
        assert_eq!(
            engine.grid().get(CellCoord::new(0, 2)).ok(),
            Some(Cell::Enemy {
                strength: NonZeroU32::new(1).expect("non-zero"),
            })
        );
    }
}
