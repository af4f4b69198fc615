use bracket_geometry::prelude::{line2d, DistanceAlg, LineAlg, Point};
use bracket_pathfinding::prelude::DijkstraMap;
use bracket_random::prelude::RandomNumberGenerator;

use crate::map::{Map, Position, TileType};
use crate::rect::Rect;
use crate::spawner::{self, SpawnTables};
use crate::SettingsError;

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum Symmetry {
    None,
    Horizontal,
    Vertical,
    Both,
}

pub fn apply_room_to_map(map: &mut Map, room: &Rect) {
    for y in room.y1 + 1..room.y2 {
        for x in room.x1 + 1..room.x2 {
            let idx = map.xy_idx(x, y);
            map.tiles[idx] = TileType::Floor;
        }
    }
}

/// Carves an L-shaped tunnel between two points: one right-angle bend,
/// horizontal-first or vertical-first with equal probability drawn from the
/// shared RNG, each leg a Bresenham line so the path is single-cell wide and
/// gap-free.
pub fn tunnel_between(map: &mut Map, rng: &mut RandomNumberGenerator, start: Point, end: Point) {
    let corner = if rng.roll_dice(1, 2) == 1 {
        Point::new(end.x, start.y)
    } else {
        Point::new(start.x, end.y)
    };
    for leg in &[(start, corner), (corner, end)] {
        for cell in line2d(LineAlg::Bresenham, leg.0, leg.1) {
            let idx = map.xy_idx(cell.x, cell.y);
            map.tiles[idx] = TileType::Floor;
        }
    }
}

/// Builds a Dijkstra distance field from `start_idx` over 4-connected
/// walkable tiles and returns the farthest reachable floor tile (first match
/// under row-major scan wins ties). With `cull_unreachable` set, every
/// walkable tile the field never reached is rewritten to wall, leaving
/// exactly one connected component.
pub fn remove_unreachable_areas_returning_most_distant(
    map: &mut Map,
    start_idx: usize,
    cull_unreachable: bool,
) -> usize {
    map.populate_blocked();
    let map_starts: Vec<usize> = vec![start_idx];
    let dijkstra_map = DijkstraMap::new(
        map.width as usize,
        map.height as usize,
        &map_starts,
        &*map,
        (map.width * map.height) as f32,
    );
    let mut culled = 0;
    let mut exit_tile = (start_idx, 0.0f32);
    for (i, tile) in map.tiles.iter_mut().enumerate() {
        if !tile.is_walkable() {
            continue;
        }
        let distance_to_start = dijkstra_map.map[i];
        if distance_to_start == std::f32::MAX {
            if cull_unreachable {
                *tile = TileType::Wall;
                culled += 1;
            }
        } else if *tile == TileType::Floor && distance_to_start > exit_tile.1 {
            exit_tile = (i, distance_to_start);
        }
    }
    if culled > 0 {
        log::debug!("culled {} unreachable tiles", culled);
    }
    exit_tile.0
}

/// Nearest-site Voronoi partition of the floor. Sites are sampled uniformly
/// over the whole grid (replacement allowed), 20 to 29 of them; every floor
/// cell joins the region of its nearest site by Euclidean distance, ties to
/// the lowest site index. Regions may come back empty.
pub fn generate_voronoi_spawn_regions(
    map: &Map,
    rng: &mut RandomNumberGenerator,
) -> Vec<Vec<usize>> {
    let n_sites = rng.range(20, 30) as usize;
    let mut sites: Vec<Point> = Vec::with_capacity(n_sites);
    for _ in 0..n_sites {
        let x = rng.roll_dice(1, map.width) - 1;
        let y = rng.roll_dice(1, map.height) - 1;
        sites.push(Point::new(x, y));
    }

    let mut regions: Vec<Vec<usize>> = vec![Vec::new(); n_sites];
    for y in 0..map.height {
        for x in 0..map.width {
            let idx = map.xy_idx(x, y);
            if map.tiles[idx] != TileType::Floor {
                continue;
            }
            let mut nearest = 0;
            let mut nearest_distance = std::f32::MAX;
            for (site_idx, site) in sites.iter().enumerate() {
                let distance =
                    DistanceAlg::PythagorasSquared.distance2d(Point::new(x, y), *site);
                if distance < nearest_distance {
                    nearest = site_idx;
                    nearest_distance = distance;
                }
            }
            regions[nearest].push(idx);
        }
    }

    regions
}

/// The floor tile closest to `target`. Panics if the map holds no floor at
/// all, which no terminating generator can produce.
pub fn nearest_floor(map: &Map, target: Point) -> Position {
    let mut best: Option<(usize, f32)> = None;
    for (idx, tile) in map.tiles.iter().enumerate() {
        if *tile != TileType::Floor {
            continue;
        }
        let (x, y) = map.idx_xy(idx);
        let distance = DistanceAlg::PythagorasSquared.distance2d(Point::new(x, y), target);
        match best {
            Some((_, d)) if distance >= d => {}
            _ => best = Some((idx, distance)),
        }
    }
    let (idx, _) = best.expect("map has no floor tiles");
    let (x, y) = map.idx_xy(idx);
    Position { x, y }
}

/// Shared closing pipeline. Culls floor unreachable from `start`, stamps the
/// farthest reachable tile as the down stairs, Voronoi-partitions what is
/// left and populates each region from the depth-scaled tables. Returns the
/// exit position.
pub fn finish_map(
    map: &mut Map,
    start: Position,
    depth: i32,
    rng: &mut RandomNumberGenerator,
    tables: &SpawnTables,
) -> Position {
    let start_idx = map.xy_idx(start.x, start.y);
    assert!(
        map.tiles[start_idx].is_walkable(),
        "player start ({}, {}) is inside a wall",
        start.x,
        start.y
    );

    let exit_tile = remove_unreachable_areas_returning_most_distant(map, start_idx, true);
    map.tiles[exit_tile] = TileType::DownStairs;
    map.downstairs = Some(exit_tile);

    let regions = generate_voronoi_spawn_regions(map, rng);
    for region in regions.iter() {
        if !region.is_empty() {
            spawner::place_entities(region, map, depth, rng, tables);
        }
    }

    // The cull rewrote tiles after the last populate_blocked pass; refresh
    // so the returned snapshot agrees with its own tiles.
    map.populate_blocked();

    let (x, y) = map.idx_xy(exit_tile);
    Position { x, y }
}

pub fn paint(map: &mut Map, mode: Symmetry, brush_size: i32, x: i32, y: i32) {
    match mode {
        Symmetry::None => apply_paint(map, brush_size, x, y),
        Symmetry::Horizontal => {
            let center_x = map.width / 2;
            if x == center_x {
                apply_paint(map, brush_size, x, y);
            } else {
                let dist_x = i32::abs(center_x - x);
                apply_paint(map, brush_size, center_x + dist_x, y);
                apply_paint(map, brush_size, center_x - dist_x, y);
            }
        }
        Symmetry::Vertical => {
            let center_y = map.height / 2;
            if y == center_y {
                apply_paint(map, brush_size, x, y);
            } else {
                let dist_y = i32::abs(center_y - y);
                apply_paint(map, brush_size, x, center_y + dist_y);
                apply_paint(map, brush_size, x, center_y - dist_y);
            }
        }
        Symmetry::Both => {
            let center_x = map.width / 2;
            let center_y = map.height / 2;
            if x == center_x && y == center_y {
                apply_paint(map, brush_size, x, y);
            } else {
                let dist_x = i32::abs(center_x - x);
                apply_paint(map, brush_size, center_x + dist_x, y);
                apply_paint(map, brush_size, center_x - dist_x, y);
                let dist_y = i32::abs(center_y - y);
                apply_paint(map, brush_size, x, center_y + dist_y);
                apply_paint(map, brush_size, x, center_y - dist_y);
            }
        }
    }
}

/// Walkers are clamped two tiles inside the border, so only the interior
/// (width - 4) x (height - 4) core is carvable. A floor target beyond that
/// can never be reached and the carving loop would not terminate.
pub(super) fn check_floor_target(
    width: i32,
    height: i32,
    floor_percent: f32,
) -> Result<(), SettingsError> {
    let desired = (floor_percent * (width * height) as f32) as usize;
    let carvable = ((width - 4) * (height - 4)) as usize;
    if desired > carvable {
        return Err(SettingsError::FloorTarget { desired, carvable });
    }
    Ok(())
}

/// One random cardinal step, clamped two tiles inside the border so brushes
/// can never paint the outer ring.
pub(super) fn stagger(map: &Map, rng: &mut RandomNumberGenerator, x: &mut i32, y: &mut i32) {
    let stagger_direction = rng.roll_dice(1, 4);
    match stagger_direction {
        1 => {
            if *x > 2 {
                *x -= 1;
            }
        }
        2 => {
            if *x < map.width - 3 {
                *x += 1;
            }
        }
        3 => {
            if *y > 2 {
                *y -= 1;
            }
        }
        _ => {
            if *y < map.height - 3 {
                *y += 1;
            }
        }
    }
}

fn apply_paint(map: &mut Map, brush_size: i32, x: i32, y: i32) {
    match brush_size {
        1 => {
            let idx = map.xy_idx(x, y);
            map.tiles[idx] = TileType::Floor;
        }
        _ => {
            let half_brush_size = brush_size / 2;
            for brush_y in y - half_brush_size..y + half_brush_size {
                for brush_x in x - half_brush_size..x + half_brush_size {
                    if brush_x > 1 && brush_x < map.width - 1 && brush_y > 1 && brush_y < map.height - 1
                    {
                        let idx = map.xy_idx(brush_x, brush_y);
                        map.tiles[idx] = TileType::Floor;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn carved_room_leaves_its_wall_ring() {
        let mut map = Map::new(20, 20, 1);
        let room = Rect::new(2, 2, 6, 6);
        apply_room_to_map(&mut map, &room);
        assert_eq!(map.tiles[map.xy_idx(3, 3)], TileType::Floor);
        assert_eq!(map.tiles[map.xy_idx(7, 7)], TileType::Floor);
        assert_eq!(map.tiles[map.xy_idx(2, 3)], TileType::Wall);
        assert_eq!(map.tiles[map.xy_idx(8, 3)], TileType::Wall);
        assert_eq!(map.tiles[map.xy_idx(3, 2)], TileType::Wall);
    }

    #[test]
    fn tunnel_connects_its_endpoints() {
        for seed in 0..10u64 {
            let mut map = Map::new(40, 30, 1);
            let mut rng = RandomNumberGenerator::seeded(seed);
            let start = Point::new(3, 4);
            let end = Point::new(30, 25);
            tunnel_between(&mut map, &mut rng, start, end);
            assert_eq!(map.tiles[map.xy_idx(3, 4)], TileType::Floor);
            assert_eq!(map.tiles[map.xy_idx(30, 25)], TileType::Floor);
            // Both endpoints in one component: walk the field from start.
            let start_idx = map.xy_idx(3, 4);
            let exit =
                remove_unreachable_areas_returning_most_distant(&mut map, start_idx, true);
            assert_eq!(map.tiles[map.xy_idx(30, 25)], TileType::Floor);
            assert_eq!(exit, map.xy_idx(30, 25));
        }
    }

    #[test]
    fn cull_removes_isolated_floor() {
        let mut map = Map::new(20, 10, 1);
        for x in 1..8 {
            let idx = map.xy_idx(x, 5);
            map.tiles[idx] = TileType::Floor;
        }
        let island = map.xy_idx(15, 5);
        map.tiles[island] = TileType::Floor;

        let start_idx = map.xy_idx(1, 5);
        let exit = remove_unreachable_areas_returning_most_distant(&mut map, start_idx, true);
        assert_eq!(map.tiles[island], TileType::Wall);
        assert_eq!(exit, map.xy_idx(7, 5));
    }

    #[test]
    fn finished_map_blocked_agrees_with_tiles() {
        let mut map = Map::new(30, 20, 1);
        for x in 1..10 {
            let idx = map.xy_idx(x, 5);
            map.tiles[idx] = TileType::Floor;
        }
        // An island the cull will turn back into wall.
        let island = map.xy_idx(20, 5);
        map.tiles[island] = TileType::Floor;

        let mut rng = RandomNumberGenerator::seeded(42);
        finish_map(
            &mut map,
            Position { x: 1, y: 5 },
            1,
            &mut rng,
            &SpawnTables::default(),
        );
        for (idx, tile) in map.tiles.iter().enumerate() {
            assert_eq!(
                map.blocked[idx],
                !tile.is_walkable(),
                "blocked out of sync at {}",
                idx
            );
        }
    }

    #[test]
    fn floor_targets_beyond_the_carvable_core_are_rejected() {
        // 10x10: half the map is 50 tiles, the clamped core only 36.
        assert_eq!(
            check_floor_target(10, 10, 0.5),
            Err(SettingsError::FloorTarget {
                desired: 50,
                carvable: 36
            })
        );
        assert_eq!(check_floor_target(80, 43, 0.5), Ok(()));
    }

    #[test]
    fn voronoi_regions_cover_the_floor_exactly_once() {
        let mut map = Map::new(50, 40, 1);
        for y in 1..map.height - 1 {
            for x in 1..map.width - 1 {
                let idx = map.xy_idx(x, y);
                map.tiles[idx] = TileType::Floor;
            }
        }
        let mut rng = RandomNumberGenerator::seeded(99);
        let regions = generate_voronoi_spawn_regions(&map, &mut rng);
        assert!(regions.len() >= 20 && regions.len() < 30);

        let mut seen = std::collections::HashSet::new();
        for region in regions.iter() {
            for idx in region.iter() {
                assert!(seen.insert(*idx), "cell {} assigned to two regions", idx);
            }
        }
        let floor_count = map
            .tiles
            .iter()
            .filter(|t| **t == TileType::Floor)
            .count();
        assert_eq!(seen.len(), floor_count);
    }

    #[test]
    fn nearest_floor_prefers_the_closest_tile() {
        let mut map = Map::new(20, 20, 1);
        let near = map.xy_idx(9, 9);
        let far = map.xy_idx(2, 2);
        map.tiles[near] = TileType::Floor;
        map.tiles[far] = TileType::Floor;
        let found = nearest_floor(&map, Point::new(10, 10));
        assert_eq!((found.x, found.y), (9, 9));
    }
}
