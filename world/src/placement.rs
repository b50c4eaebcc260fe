//! Server-side validation of tower placement.

use card_defence_core::{
    geometry::snap_to_cell_centre, MapDimensions, Path, PlacementConfig, PlacementError, Point,
    TowerId,
};

/// Snaps `requested` to its grid cell centre and checks it against the paths,
/// the map bounds and the existing towers, in that order.
///
/// Returns the snapped position on success.
pub(crate) fn validate<I>(
    requested: Point,
    config: &PlacementConfig,
    map: MapDimensions,
    paths: &[Path],
    towers: I,
) -> Result<Point, PlacementError>
where
    I: IntoIterator<Item = (TowerId, Point)>,
{
    let position = Point::new(
        snap_to_cell_centre(requested.x, config.cell_size),
        snap_to_cell_centre(requested.y, config.cell_size),
    );

    let distance = paths
        .iter()
        .map(|path| path.distance_to(position))
        .fold(f32::INFINITY, f32::min);
    if distance < config.min_path_distance {
        return Err(PlacementError::TooCloseToPath { distance });
    }
    if distance > config.max_path_distance {
        return Err(PlacementError::TooFarFromPath { distance });
    }

    if !map.contains_with_margin(position, config.bounds_margin) {
        return Err(PlacementError::OutOfBounds);
    }

    for (tower, at) in towers {
        if at.distance(position) < config.cell_size {
            return Err(PlacementError::TowerTooClose { tower });
        }
    }

    Ok(position)
}

#[cfg(test)]
mod tests {
    use super::*;
    use card_defence_core::{MapConfig, PathId};

    fn paths() -> Vec<Path> {
        vec![Path::new(PathId::new(0), MapConfig::default().initial_path, 0)]
    }

    fn check(x: f32, y: f32, towers: &[(TowerId, Point)]) -> Result<Point, PlacementError> {
        validate(
            Point::new(x, y),
            &PlacementConfig::default(),
            MapDimensions::new(800.0, 600.0),
            &paths(),
            towers.iter().copied(),
        )
    }

    #[test]
    fn positions_snap_to_cell_centres() {
        assert_eq!(check(105.0, 239.0, &[]), Ok(Point::new(100.0, 220.0)));
    }

    #[test]
    fn placement_window_is_enforced() {
        // (100, 260) is 40 px below the first leg.
        assert!(check(100.0, 260.0, &[]).is_ok());
        // (100, 300) sits on the path.
        assert!(matches!(
            check(100.0, 300.0, &[]),
            Err(PlacementError::TooCloseToPath { .. })
        ));
        // (60, 140) is about 152 px from the nearest corner.
        assert!(matches!(
            check(60.0, 140.0, &[]),
            Err(PlacementError::TooFarFromPath { .. })
        ));
    }

    #[test]
    fn window_edges_are_inclusive() {
        let straight = vec![Path::new(
            PathId::new(0),
            vec![Point::new(0.0, 315.0), Point::new(800.0, 315.0)],
            0,
        )];
        let at = |y: f32, config: &PlacementConfig| {
            validate(
                Point::new(105.0, y),
                config,
                MapDimensions::new(800.0, 600.0),
                &straight,
                std::iter::empty(),
            )
        };
        let config = PlacementConfig {
            cell_size: 30.0,
            ..PlacementConfig::default()
        };
        assert_eq!(at(285.0, &config), Ok(Point::new(105.0, 285.0)));
        assert_eq!(at(195.0, &config), Ok(Point::new(105.0, 195.0)));

        let narrower = PlacementConfig {
            min_path_distance: 30.1,
            max_path_distance: 119.9,
            ..config
        };
        assert_eq!(
            at(285.0, &narrower),
            Err(PlacementError::TooCloseToPath { distance: 30.0 })
        );
        assert_eq!(
            at(195.0, &narrower),
            Err(PlacementError::TooFarFromPath { distance: 120.0 })
        );
    }

    #[test]
    fn legacy_window_rejects_what_the_default_accepts() {
        let legacy = PlacementConfig::legacy();
        // (100, 180) is about 102 px from the corner at (200, 200).
        let result = validate(
            Point::new(100.0, 180.0),
            &legacy,
            MapDimensions::new(800.0, 600.0),
            &paths(),
            std::iter::empty(),
        );
        assert!(matches!(result, Err(PlacementError::TooFarFromPath { .. })));
        assert!(check(100.0, 180.0, &[]).is_ok());
    }

    #[test]
    fn map_margin_is_enforced() {
        assert_eq!(check(20.0, 260.0, &[]), Err(PlacementError::OutOfBounds));
    }

    #[test]
    fn towers_keep_one_cell_apart() {
        let occupied = [(TowerId::new(4), Point::new(100.0, 260.0))];
        assert_eq!(
            check(100.0, 260.0, &occupied),
            Err(PlacementError::TowerTooClose {
                tower: TowerId::new(4)
            })
        );
        assert!(check(140.0, 260.0, &occupied).is_ok());
    }
}
