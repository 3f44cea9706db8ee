use seabattle::{CellState, Cells, Coordinate, GridError, HitOutcome, Orientation, Ship};

#[test]
fn line_lays_out_cells() -> Result<(), GridError> {
    let ship = Ship::line(Coordinate::new(0, 0), 4, Orientation::Vertical)?;
    let cells: Vec<_> = ship.cells().collect();
    assert_eq!(
        cells,
        vec![
            Coordinate::new(0, 0),
            Coordinate::new(1, 0),
            Coordinate::new(2, 0),
            Coordinate::new(3, 0)
        ]
    );
    assert_eq!(ship.length(), 4);
    assert_eq!(ship.orientation(), Orientation::Vertical);
    assert!(ship.contains(Coordinate::new(3, 0)));
    assert!(!ship.contains(Coordinate::new(4, 0)));
    assert_eq!(
        Ship::line(Coordinate::new(0, 0), 0, Orientation::Vertical).err(),
        Some(GridError::InvalidShipShape)
    );
    Ok(())
}

#[test]
fn from_cells_validates_shape() -> Result<(), GridError> {
    let ship = Ship::from_cells(&[
        Coordinate::new(4, 6),
        Coordinate::new(4, 4),
        Coordinate::new(4, 5),
    ])?;
    assert_eq!(ship.orientation(), Orientation::Horizontal);
    assert_eq!(ship.cells().next(), Some(Coordinate::new(4, 4)));

    let gap = Ship::from_cells(&[Coordinate::new(1, 1), Coordinate::new(1, 3)]);
    assert_eq!(gap.err(), Some(GridError::InvalidShipShape));

    let bent = Ship::from_cells(&[Coordinate::new(1, 1), Coordinate::new(2, 2)]);
    assert_eq!(bent.err(), Some(GridError::InvalidShipShape));

    let dup = Ship::from_cells(&[Coordinate::new(1, 1), Coordinate::new(1, 1)]);
    assert_eq!(dup.err(), Some(GridError::InvalidShipShape));

    assert_eq!(Ship::from_cells(&[]).err(), Some(GridError::InvalidShipShape));
    Ok(())
}

#[test]
fn hit_and_sink() -> Result<(), GridError> {
    let mut ship = Ship::line(Coordinate::new(1, 1), 2, Orientation::Horizontal)?;
    let mut cells: Cells = [[CellState::Water; 10]; 10];
    cells[1][1] = CellState::ShipAlive;
    cells[1][2] = CellState::ShipAlive;

    assert_eq!(ship.hit(Coordinate::new(0, 0), &mut cells), None);
    assert_eq!(ship.hit(Coordinate::new(1, 1), &mut cells), Some(HitOutcome::Hit));
    assert_eq!(cells[1][1], CellState::ShipHitPartial);
    assert_eq!(ship.alive_segments(), 1);
    assert!(!ship.is_sunk());

    // a segment is only hit once
    assert_eq!(ship.hit(Coordinate::new(1, 1), &mut cells), None);

    assert_eq!(ship.hit(Coordinate::new(1, 2), &mut cells), Some(HitOutcome::Sunk));
    assert!(ship.is_sunk());
    assert_eq!(cells[1][1], CellState::ShipSunk);
    assert_eq!(cells[1][2], CellState::ShipSunk);
    assert_eq!(cells[0][0], CellState::Miss);
    assert_eq!(cells[2][3], CellState::Miss);
    assert_eq!(cells[3][3], CellState::Water);
    Ok(())
}

#[test]
fn conflicts_cover_overlap_and_touching() -> Result<(), GridError> {
    let a = Ship::line(Coordinate::new(2, 2), 3, Orientation::Horizontal)?;
    let touching = Ship::line(Coordinate::new(3, 5), 2, Orientation::Vertical)?;
    let clear = Ship::line(Coordinate::new(4, 2), 3, Orientation::Horizontal)?;
    let crossing = Ship::line(Coordinate::new(1, 3), 3, Orientation::Vertical)?;
    assert!(a.conflicts_with(&touching));
    assert!(a.conflicts_with(&crossing));
    assert!(!a.conflicts_with(&clear));
    Ok(())
}
