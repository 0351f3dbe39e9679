#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure placement system that buys defenders for the lawn between waves.

use lane_defence_core::{Cell, CellCoord, Grid, GridError};
use thiserror::Error;
use tracing::{debug, warn};

/// Money charged for every point of line shooter power.
pub const LINE_SHOOTER_COST_PER_POWER: u32 = 1;
/// Money charged for a radial shooter.
pub const RADIAL_SHOOTER_COST: u32 = 2;

/// Defender purchase request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Purchase {
    /// Places a line shooter or adds power to the one already in the cell.
    LineShooter {
        /// Target cell.
        cell: CellCoord,
        /// Power to buy.
        power: u32,
    },
    /// Places a radial shooter, replacing whatever occupies the cell.
    RadialShooter {
        /// Target cell.
        cell: CellCoord,
    },
}

impl Purchase {
    /// Money charged when the purchase succeeds.
    #[must_use]
    pub const fn cost(&self) -> u32 {
        match self {
            Self::LineShooter { power, .. } => {
                (*power).saturating_mul(LINE_SHOOTER_COST_PER_POWER)
            }
            Self::RadialShooter { .. } => RADIAL_SHOOTER_COST,
        }
    }

    /// Cell targeted by the purchase.
    #[must_use]
    pub const fn cell(&self) -> CellCoord {
        match self {
            Self::LineShooter { cell, .. } | Self::RadialShooter { cell } => *cell,
        }
    }
}

/// Reasons a purchase may be rejected. Rejected purchases cost nothing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum PurchaseError {
    /// The balance does not cover the purchase.
    #[error("purchase costs {cost} but only {available} is available")]
    InsufficientFunds {
        /// Cost of the rejected purchase.
        cost: u32,
        /// Balance at the time of the request.
        available: u32,
    },
    /// A line shooter can only be stacked onto an empty cell or another line shooter.
    #[error(
        "cell (lane {}, column {}) is occupied by {occupant:?}",
        .cell.lane(),
        .cell.column()
    )]
    Occupied {
        /// Target cell.
        cell: CellCoord,
        /// Current occupant.
        occupant: Cell,
    },
    /// The target cell lies outside the lawn.
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Placement system holding the money available for defenders.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Builder {
    money: u32,
}

impl Builder {
    /// Creates a builder with the provided starting balance.
    #[must_use]
    pub const fn new(money: u32) -> Self {
        Self { money }
    }

    /// Current balance.
    #[must_use]
    pub const fn money(&self) -> u32 {
        self.money
    }

    /// Applies the purchase to the lawn and charges its cost.
    pub fn purchase(&mut self, grid: &mut Grid, purchase: Purchase) -> Result<(), PurchaseError> {
        let result = self.try_purchase(grid, purchase);
        if let Err(error) = &result {
            warn!(?purchase, %error, "purchase rejected");
        }
        result
    }

    fn try_purchase(&mut self, grid: &mut Grid, purchase: Purchase) -> Result<(), PurchaseError> {
        let cost = purchase.cost();
        if cost > self.money {
            return Err(PurchaseError::InsufficientFunds {
                cost,
                available: self.money,
            });
        }

        let cell = purchase.cell();
        let occupant = grid.get(cell)?;
        let placed = match (purchase, occupant) {
            (Purchase::LineShooter { power, .. }, Cell::Empty) => Cell::LineShooter { power },
            (Purchase::LineShooter { power, .. }, Cell::LineShooter { power: existing }) => {
                Cell::LineShooter {
                    power: existing.saturating_add(power),
                }
            }
            (Purchase::LineShooter { .. }, occupant) => {
                return Err(PurchaseError::Occupied { cell, occupant });
            }
            (Purchase::RadialShooter { .. }, _) => Cell::RadialShooter,
        };

        grid.set(cell, placed)?;
        self.money -= cost;
        debug!(?cell, ?placed, cost, money = self.money, "defender purchased");
        Ok(())
    }

    /// Skips placement for a wave; the balance grows by half, rounded down.
    pub fn bank(&mut self) {
        self.money = self.money.saturating_add(self.money / 2);
        debug!(money = self.money, "placement skipped, balance banked");
    }

    /// Adds a reward to the balance.
    pub fn reward(&mut self, amount: u32) {
        self.money = self.money.saturating_add(amount);
    }
}
