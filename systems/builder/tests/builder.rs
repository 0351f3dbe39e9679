use std::num::NonZeroU32;

use lane_defence_core::{Cell, CellCoord, Grid, GridError};
use lane_defence_system_builder::{Builder, Purchase, PurchaseError};

#[test]
fn line_shooter_on_empty_cell_charges_its_power() {
    let mut grid = Grid::new(2, 4).expect("grid");
    let mut builder = Builder::new(10);
    let cell = CellCoord::new(1, 2);

    builder
        .purchase(&mut grid, Purchase::LineShooter { cell, power: 3 })
        .expect("purchase succeeds");

    assert_eq!(grid.get(cell), Ok(Cell::LineShooter { power: 3 }));
    assert_eq!(builder.money(), 7);
}

#[test]
fn line_shooter_power_stacks_on_existing_line_shooter() {
    let mut grid = Grid::new(1, 3).expect("grid");
    let mut builder = Builder::new(10);
    let cell = CellCoord::new(0, 0);

    builder
        .purchase(&mut grid, Purchase::LineShooter { cell, power: 2 })
        .expect("first purchase");
    builder
        .purchase(&mut grid, Purchase::LineShooter { cell, power: 5 })
        .expect("second purchase");

    assert_eq!(grid.get(cell), Ok(Cell::LineShooter { power: 7 }));
    assert_eq!(builder.money(), 3);
}

#[test]
fn line_shooter_cannot_replace_a_radial_shooter() {
    let mut grid = Grid::new(1, 3).expect("grid");
    let cell = CellCoord::new(0, 1);
    grid.set(cell, Cell::RadialShooter).expect("place radial");
    let mut builder = Builder::new(10);

    assert_eq!(
        builder.purchase(&mut grid, Purchase::LineShooter { cell, power: 1 }),
        Err(PurchaseError::Occupied {
            cell,
            occupant: Cell::RadialShooter,
        })
    );
    assert_eq!(builder.money(), 10, "rejected purchases are free");
}

#[test]
fn radial_shooter_replaces_any_occupant() {
    let mut grid = Grid::new(1, 3).expect("grid");
    let cell = CellCoord::new(0, 2);
    grid.set(
        cell,
        Cell::Enemy {
            strength: NonZeroU32::new(3).expect("non-zero"),
        },
    )
    .expect("place enemy");
    let mut builder = Builder::new(2);

    builder
        .purchase(&mut grid, Purchase::RadialShooter { cell })
        .expect("purchase succeeds");

    assert_eq!(grid.get(cell), Ok(Cell::RadialShooter));
    assert_eq!(builder.money(), 0);
}

#[test]
fn purchases_beyond_the_balance_are_rejected() {
    let mut grid = Grid::new(1, 3).expect("grid");
    let mut builder = Builder::new(1);
    let cell = CellCoord::new(0, 0);

    assert_eq!(
        builder.purchase(&mut grid, Purchase::RadialShooter { cell }),
        Err(PurchaseError::InsufficientFunds {
            cost: 2,
            available: 1,
        })
    );
    assert_eq!(grid.get(cell), Ok(Cell::Empty));
}

#[test]
fn purchases_outside_the_lawn_are_rejected() {
    let mut grid = Grid::new(1, 3).expect("grid");
    let mut builder = Builder::new(5);

    let result = builder.purchase(
        &mut grid,
        Purchase::LineShooter {
            cell: CellCoord::new(4, 0),
            power: 1,
        },
    );

    assert!(matches!(
        result,
        Err(PurchaseError::Grid(GridError::OutOfBounds { lane: 4, .. }))
    ));
    assert_eq!(builder.money(), 5);
}

#[test]
fn rewards_accumulate() {
    let mut builder = Builder::new(4);
    builder.reward(5);
    builder.bank();
    assert_eq!(builder.money(), 13);
}
