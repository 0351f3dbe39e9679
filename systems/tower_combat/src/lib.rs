#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves defender fire against the enemies on the lawn.
//!
//! Two passes run every tick. Line shooters pool their power along each lane
//! and spend it on enemies from the defended edge outward. Radial shooters
//! then fire one point of damage along three rays each, in a fixed order so
//! that every shooter observes the lawn as left by the shooters before it.

use std::cmp::Reverse;
use std::num::NonZeroU32;

use lane_defence_core::{Cell, CellCoord, Event, Grid};

/// Damage dealt by a single radial ray.
pub const RADIAL_RAY_DAMAGE: u32 = 1;

/// Directions travelled by the rays of a radial shooter, in firing order.
pub const RADIAL_RAYS: [RayDirection; 3] = [
    RayDirection::UpAndOut,
    RayDirection::DownAndOut,
    RayDirection::Forward,
];

/// Path followed by a radial shooter ray.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RayDirection {
    /// Toward decreasing lanes and increasing columns.
    UpAndOut,
    /// Toward increasing lanes and increasing columns.
    DownAndOut,
    /// Toward increasing columns within the shooter's lane.
    Forward,
}

impl RayDirection {
    /// Next cell along the ray, or `None` once the ray leaves the lawn.
    #[must_use]
    pub fn step(self, from: CellCoord, grid: &Grid) -> Option<CellCoord> {
        let column = from.column().checked_add(1)?;
        let lane = match self {
            Self::UpAndOut => from.lane().checked_sub(1)?,
            Self::DownAndOut => from.lane().checked_add(1)?,
            Self::Forward => from.lane(),
        };
        let next = CellCoord::new(lane, column);
        grid.contains(next).then_some(next)
    }
}

/// Tower combat system that applies defender fire to the lawn.
#[derive(Debug, Default)]
pub struct TowerCombat {
    shooters: Vec<CellCoord>,
}

impl TowerCombat {
    /// Creates a new tower combat system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs line fire followed by radial fire.
    pub fn handle(&mut self, grid: &mut Grid, out: &mut Vec<Event>) {
        self.resolve_line_fire(grid, out);
        self.resolve_radial_fire(grid, out);
    }

    /// Spends the pooled line shooter power of every lane.
    ///
    /// Each lane is scanned from column zero outward. Power from every line
    /// shooter passed so far is pooled; an enemy that can be killed consumes
    /// its strength from the pool, an enemy that survives drains the pool.
    pub fn resolve_line_fire(&mut self, grid: &mut Grid, out: &mut Vec<Event>) {
        for lane in 0..grid.lanes() {
            let Some(cells) = grid.lane_mut(lane) else {
                continue;
            };

            let mut shoot_power: u32 = 0;
            for (column, cell) in cells.iter_mut().enumerate() {
                let content = *cell;
                match content {
                    Cell::LineShooter { power } => {
                        shoot_power = shoot_power.saturating_add(power);
                    }
                    Cell::Enemy { .. } if shoot_power > 0 => {
                        let coord = CellCoord::new(lane, column as u32);
                        shoot_power -= strike(cell, coord, shoot_power, out);
                    }
                    _ => {}
                }
            }
        }
    }

    /// Fires every radial shooter in [`radial_firing_order`].
    pub fn resolve_radial_fire(&mut self, grid: &mut Grid, out: &mut Vec<Event>) {
        self.shooters.clear();
        collect_radial_shooters(grid, &mut self.shooters);

        for &shooter in &self.shooters {
            for direction in RADIAL_RAYS {
                fire_ray(grid, shooter, direction, out);
            }
        }
    }
}

/// Radial shooters ordered farthest column first, ties broken by ascending lane.
#[must_use]
pub fn radial_firing_order(grid: &Grid) -> Vec<CellCoord> {
    let mut shooters = Vec::new();
    collect_radial_shooters(grid, &mut shooters);
    shooters
}

fn collect_radial_shooters(grid: &Grid, out: &mut Vec<CellCoord>) {
    out.extend(
        grid.iter()
            .filter(|(_, cell)| *cell == Cell::RadialShooter)
            .map(|(coord, _)| coord),
    );
    out.sort_by_key(|coord| (Reverse(coord.column()), coord.lane()));
}

fn fire_ray(grid: &mut Grid, shooter: CellCoord, direction: RayDirection, out: &mut Vec<Event>) {
    let mut position = shooter;
    while let Some(next) = direction.step(position, grid) {
        position = next;
        let Some(cell) = grid.cell_mut(next) else {
            return;
        };
        if cell.is_enemy() {
            let _ = strike(cell, next, RADIAL_RAY_DAMAGE, out);
            return;
        }
    }
}

/// Applies up to `damage` to the enemy in `cell` and returns the damage absorbed.
fn strike(cell: &mut Cell, coord: CellCoord, damage: u32, out: &mut Vec<Event>) -> u32 {
    let Cell::Enemy { strength } = *cell else {
        return 0;
    };

    match NonZeroU32::new(strength.get().saturating_sub(damage)) {
        Some(remaining) => {
            *cell = Cell::Enemy {
                strength: remaining,
            };
            out.push(Event::EnemyDamaged {
                cell: coord,
                damage,
                remaining,
            });
            damage
        }
        None => {
            *cell = Cell::Empty;
            out.push(Event::EnemyDestroyed {
                cell: coord,
                strength,
            });
            strength.get()
        }
    }
}
