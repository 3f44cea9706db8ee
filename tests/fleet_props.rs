use proptest::prelude::*;
use rand::{rngs::SmallRng, SeedableRng};
use seabattle::{
    CellState, Coordinate, FleetConfig, FleetPlacer, Grid, GridError, HitOutcome, PlacementLimits, View,
    CLASSIC_FLEET,
};

fn placed(seed: u64) -> Grid {
    let placer = FleetPlacer::new(FleetConfig::classic(), PlacementLimits::default());
    let mut rng = SmallRng::seed_from_u64(seed);
    placer.place(&mut rng).expect("classic fleet fits")
}

fn ship_cells(grid: &Grid) -> usize {
    let snap = grid.snapshot(View::Full);
    snap.count(CellState::ShipAlive) + snap.count(CellState::ShipHitPartial) + snap.count(CellState::ShipSunk)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn fleet_is_in_bounds_and_spaced(seed in any::<u64>()) {
        let grid = placed(seed);
        let ships = grid.ships();
        prop_assert_eq!(ships.len(), CLASSIC_FLEET.len());
        let lengths: Vec<usize> = ships.iter().map(|s| s.length()).collect();
        prop_assert_eq!(lengths, CLASSIC_FLEET.to_vec());
        for ship in ships {
            prop_assert!(ship.cells().all(|c| c.in_bounds()));
        }
        for (i, a) in ships.iter().enumerate() {
            for b in &ships[i + 1..] {
                for ca in a.cells() {
                    for cb in b.cells() {
                        prop_assert!(ca != cb && !ca.touches(&cb), "{} and {} touch", ca, cb);
                    }
                }
            }
        }
        prop_assert_eq!(grid.alive_unit_count(), FleetConfig::classic().total_cells());
    }

    #[test]
    fn resolve_reports_once(seed in any::<u64>(), row in 0u8..10, col in 0u8..10) {
        let mut grid = placed(seed);
        let target = Coordinate::new(row, col);
        let before = grid.clone();
        prop_assert!(grid.resolve(target).is_ok());
        let after = grid.clone();
        prop_assert_eq!(grid.resolve(target), Err(GridError::AlreadyResolved));
        prop_assert_eq!(&grid, &after);
        prop_assert_ne!(&before, &after);
    }

    #[test]
    fn shots_never_create_or_remove_ship_cells(seed in any::<u64>(), shots in prop::collection::vec((0u8..10, 0u8..10), 0..80)) {
        let mut grid = placed(seed);
        let total = ship_cells(&grid);
        for (r, c) in shots {
            let alive = grid.alive_unit_count();
            match grid.resolve(Coordinate::new(r, c)) {
                Ok(HitOutcome::Miss) => prop_assert_eq!(grid.alive_unit_count(), alive),
                Ok(_) => prop_assert_eq!(grid.alive_unit_count(), alive - 1),
                Err(e) => prop_assert_eq!(e, GridError::AlreadyResolved),
            }
            prop_assert_eq!(ship_cells(&grid), total);
        }
    }

    #[test]
    fn clearing_the_board_sinks_every_ship(seed in any::<u64>()) {
        let mut grid = placed(seed);
        let mut sunk = 0;
        while let Some(&target) = grid.available_targets().first() {
            prop_assert!(!grid.all_sunk());
            if grid.resolve(target) == Ok(HitOutcome::Sunk) {
                sunk += 1;
            }
            if grid.all_sunk() {
                break;
            }
        }
        prop_assert!(grid.all_sunk());
        prop_assert_eq!(sunk, CLASSIC_FLEET.len());
    }
}

#[test]
fn same_seed_same_layout() {
    assert_eq!(placed(7), placed(7));
}

#[test]
fn impossible_fleet_fails_cleanly() {
    // eleven 5s cannot fit with spacing on a 10x10 board
    let fleet = FleetConfig::new(vec![5; 11]).expect("lengths are valid");
    let limits = PlacementLimits {
        ship_attempts: 20,
        fleet_attempts: 3,
    };
    let placer = FleetPlacer::new(fleet, limits);
    let mut rng = SmallRng::seed_from_u64(1);
    let mut grid = Grid::new();
    let err = placer.populate(&mut grid, &mut rng).unwrap_err();
    assert_eq!(err.attempts, 3);
    assert_eq!(err.length, 5);
    assert!(grid.ships().is_empty());
    assert_eq!(grid, Grid::new());
}
