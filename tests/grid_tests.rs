use seabattle::{
    CellState, Cells, Coordinate, Grid, GridError, HitOutcome, Orientation, Ship, View, BOARD_CELLS,
};

fn at(label: &str) -> Coordinate {
    label.parse().expect("valid coordinate")
}

#[test]
fn sinking_splashes_every_neighbour() -> Result<(), GridError> {
    let mut grid = Grid::new();
    grid.place(Ship::line(at("B3"), 4, Orientation::Horizontal)?)?;
    assert_eq!(grid.alive_unit_count(), 4);

    let outcomes = ["C3", "D3", "E3", "B3"]
        .iter()
        .map(|l| grid.resolve(at(l)))
        .collect::<Result<Vec<_>, _>>()?;
    assert_eq!(
        outcomes,
        vec![HitOutcome::Hit, HitOutcome::Hit, HitOutcome::Hit, HitOutcome::Sunk]
    );

    for col in ['A', 'B', 'C', 'D', 'E', 'F'] {
        for row in [2, 4] {
            assert_eq!(grid.cell(at(&format!("{col}{row}"))), Some(CellState::Miss));
        }
    }
    assert_eq!(grid.cell(at("A3")), Some(CellState::Miss));
    assert_eq!(grid.cell(at("F3")), Some(CellState::Miss));
    for l in ["B3", "C3", "D3", "E3"] {
        assert_eq!(grid.cell(at(l)), Some(CellState::ShipSunk));
    }
    assert_eq!(grid.cell(at("G3")), Some(CellState::Water));
    assert_eq!(grid.cell(at("B5")), Some(CellState::Water));
    assert_eq!(grid.snapshot(View::Full).count(CellState::ShipAlive), 0);
    assert_eq!(grid.alive_unit_count(), 0);
    assert!(grid.all_sunk());
    Ok(())
}

#[test]
fn partial_hit_leaves_neighbours_alone() -> Result<(), GridError> {
    let mut grid = Grid::new();
    grid.place(Ship::line(at("B3"), 4, Orientation::Horizontal)?)?;
    assert_eq!(grid.resolve(at("C3"))?, HitOutcome::Hit);
    assert_eq!(grid.cell(at("C3")), Some(CellState::ShipHitPartial));
    assert_eq!(grid.cell(at("C2")), Some(CellState::Water));
    assert_eq!(grid.alive_unit_count(), 3);
    assert!(!grid.all_sunk());
    Ok(())
}

#[test]
fn second_shot_at_same_cell_is_rejected() -> Result<(), GridError> {
    let mut grid = Grid::new();
    grid.place(Ship::line(at("E5"), 2, Orientation::Vertical)?)?;

    assert_eq!(grid.resolve(at("A1"))?, HitOutcome::Miss);
    assert_eq!(grid.resolve(at("A1")), Err(GridError::AlreadyResolved));

    assert_eq!(grid.resolve(at("E5"))?, HitOutcome::Hit);
    assert_eq!(grid.resolve(at("E5")), Err(GridError::AlreadyResolved));
    assert_eq!(grid.alive_unit_count(), 1);

    assert_eq!(grid.resolve(at("E6"))?, HitOutcome::Sunk);
    // splashed water counts as already resolved
    assert_eq!(grid.resolve(at("D4")), Err(GridError::AlreadyResolved));
    assert_eq!(grid.resolve(at("E6")), Err(GridError::AlreadyResolved));
    Ok(())
}

#[test]
fn out_of_bounds_shot_is_invalid() {
    let mut grid = Grid::new();
    let before = grid.clone();
    assert_eq!(grid.resolve(Coordinate::new(10, 0)), Err(GridError::InvalidCoordinate));
    assert_eq!(grid.resolve(Coordinate::new(3, 12)), Err(GridError::InvalidCoordinate));
    assert_eq!(grid, before);
}

#[test]
fn splash_never_downgrades_ship_cells() -> Result<(), GridError> {
    let sunk = Ship::line(at("B3"), 2, Orientation::Horizontal)?;
    let neighbour = Ship::line(at("D2"), 3, Orientation::Vertical)?;
    let mut cells: Cells = [[CellState::Water; 10]; 10];
    for c in neighbour.cells() {
        cells[c.row() as usize][c.col() as usize] = CellState::ShipAlive;
    }
    cells[2][3] = CellState::ShipHitPartial;

    sunk.splash(&mut cells);
    sunk.splash(&mut cells);

    assert_eq!(cells[1][3], CellState::ShipAlive);
    assert_eq!(cells[2][3], CellState::ShipHitPartial);
    assert_eq!(cells[3][3], CellState::ShipAlive);
    assert_eq!(cells[2][0], CellState::Miss);
    assert_eq!(cells[2][1], CellState::ShipSunk);
    assert_eq!(cells[2][2], CellState::ShipSunk);
    Ok(())
}

#[test]
fn placement_rules() -> Result<(), GridError> {
    let mut grid = Grid::new();
    grid.place(Ship::line(at("C3"), 3, Orientation::Horizontal)?)?;

    let overlapping = Ship::line(at("D1"), 3, Orientation::Vertical)?;
    assert_eq!(grid.place(overlapping), Err(GridError::ShipOverlaps));

    let diagonal = Ship::line(at("F4"), 2, Orientation::Vertical)?;
    assert_eq!(grid.place(diagonal), Err(GridError::ShipTooClose));

    let alongside = Ship::line(at("C4"), 2, Orientation::Horizontal)?;
    assert_eq!(grid.place(alongside), Err(GridError::ShipTooClose));

    grid.place(Ship::line(at("G3"), 2, Orientation::Vertical)?)?;
    assert_eq!(grid.ships().len(), 2);
    assert_eq!(grid.alive_unit_count(), 5);

    assert_eq!(
        Ship::line(at("J1"), 2, Orientation::Horizontal).err(),
        Some(GridError::ShipOutOfBounds)
    );
    assert_eq!(
        Ship::line(at("A9"), 3, Orientation::Vertical).err(),
        Some(GridError::ShipOutOfBounds)
    );
    Ok(())
}

#[test]
fn targets_are_column_major() -> Result<(), GridError> {
    let mut grid = Grid::new();
    let targets = grid.available_targets();
    assert_eq!(targets.len(), BOARD_CELLS);
    assert_eq!(targets[0], at("A1"));
    assert_eq!(targets[1], at("A2"));
    assert_eq!(targets[10], at("B1"));
    assert_eq!(targets.last(), Some(&at("J10")));

    grid.resolve(at("A2"))?;
    let targets = grid.available_targets();
    assert_eq!(targets.len(), BOARD_CELLS - 1);
    assert!(!targets.contains(&at("A2")));
    Ok(())
}

#[test]
fn restricted_view_hides_intact_ships() -> Result<(), GridError> {
    let mut grid = Grid::new();
    grid.place(Ship::line(at("H8"), 3, Orientation::Horizontal)?)?;
    grid.resolve(at("I8"))?;
    grid.resolve(at("A1"))?;

    let full = grid.snapshot(View::Full);
    let restricted = grid.snapshot(View::Restricted);
    assert_eq!(full.count(CellState::ShipAlive), 2);
    assert_eq!(restricted.count(CellState::ShipAlive), 0);
    assert_eq!(restricted.cell(at("H8")), Some(CellState::Water));
    assert_eq!(restricted.cell(at("I8")), Some(CellState::ShipHitPartial));
    assert_eq!(restricted.cell(at("A1")), Some(CellState::Miss));
    Ok(())
}
