//! End-to-end checks over every generator variant: one connected walkable
//! component, exactly one staircase, sane entity placement, and full
//! determinism from the seed.

use bracket_random::prelude::RandomNumberGenerator;
use vorona_mapgen::map_builders::{
    random_builder, BspDungeonBuilder, BspInteriorBuilder, CellularAutomataBuilder, DLABuilder,
    DrunkardsWalkBuilder, MapBuilder, MazeBuilder, SimpleMapBuilder,
};
use vorona_mapgen::{build_random_map, Map, TileType};

const WIDTH: i32 = 80;
const HEIGHT: i32 = 43;

fn all_builders(depth: i32) -> Vec<(&'static str, Box<dyn MapBuilder>)> {
    let _ = env_logger::builder().is_test(true).try_init();
    vec![
        ("simple", SimpleMapBuilder::new(WIDTH, HEIGHT, depth)),
        ("bsp_dungeon", BspDungeonBuilder::new(WIDTH, HEIGHT, depth)),
        ("bsp_interior", BspInteriorBuilder::new(WIDTH, HEIGHT, depth)),
        ("cellular", CellularAutomataBuilder::new(WIDTH, HEIGHT, depth)),
        (
            "drunkard_open_area",
            DrunkardsWalkBuilder::open_area(WIDTH, HEIGHT, depth),
        ),
        (
            "drunkard_winding",
            DrunkardsWalkBuilder::winding_passages(WIDTH, HEIGHT, depth),
        ),
        ("maze", MazeBuilder::new(WIDTH, HEIGHT, depth)),
        ("dla_walk_inwards", DLABuilder::walk_inwards(WIDTH, HEIGHT, depth)),
        (
            "dla_central_attractor",
            DLABuilder::central_attractor(WIDTH, HEIGHT, depth),
        ),
    ]
}

fn reachable_from(map: &Map, start_idx: usize) -> Vec<bool> {
    let mut visited = vec![false; map.tiles.len()];
    let mut stack = vec![start_idx];
    visited[start_idx] = true;
    while let Some(idx) = stack.pop() {
        let (x, y) = map.idx_xy(idx);
        for (nx, ny) in &[(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)] {
            if *nx < 0 || *nx >= map.width || *ny < 0 || *ny >= map.height {
                continue;
            }
            let nidx = map.xy_idx(*nx, *ny);
            if !visited[nidx] && map.tiles[nidx].is_walkable() {
                visited[nidx] = true;
                stack.push(nidx);
            }
        }
    }
    visited
}

#[test]
fn every_variant_yields_one_connected_component() {
    for (name, mut builder) in all_builders(1) {
        let mut rng = RandomNumberGenerator::seeded(1234);
        builder.build_map(&mut rng);
        let map = builder.get_map();
        let start = builder.get_starting_position();
        assert!(
            map.tiles[map.xy_idx(start.x, start.y)].is_walkable(),
            "{}: start tile not walkable",
            name
        );

        let visited = reachable_from(&map, map.xy_idx(start.x, start.y));
        for (idx, tile) in map.tiles.iter().enumerate() {
            if tile.is_walkable() {
                assert!(visited[idx], "{}: walkable tile {} unreachable", name, idx);
            }
        }
    }
}

#[test]
fn every_variant_places_exactly_one_staircase() {
    for (name, mut builder) in all_builders(1) {
        let mut rng = RandomNumberGenerator::seeded(777);
        builder.build_map(&mut rng);
        let map = builder.get_map();
        let stairs: Vec<usize> = map
            .tiles
            .iter()
            .enumerate()
            .filter(|(_, t)| **t == TileType::DownStairs)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(stairs.len(), 1, "{}: expected one staircase", name);
        assert_eq!(map.downstairs, Some(stairs[0]), "{}", name);

        let exit = builder.get_exit_position();
        assert_eq!(map.xy_idx(exit.x, exit.y), stairs[0], "{}", name);
        let start = builder.get_starting_position();
        assert_ne!((start.x, start.y), (exit.x, exit.y), "{}", name);
    }
}

#[test]
fn entities_land_on_open_distinct_tiles() {
    for (name, mut builder) in all_builders(3) {
        let mut rng = RandomNumberGenerator::seeded(4242);
        builder.build_map(&mut rng);
        let map = builder.get_map();

        let mut occupied = std::collections::HashSet::new();
        for entity in map.entities.iter() {
            assert!(
                entity.x >= 0 && entity.x < map.width && entity.y >= 0 && entity.y < map.height,
                "{}: entity out of bounds",
                name
            );
            let idx = map.xy_idx(entity.x, entity.y);
            assert_eq!(
                map.tiles[idx],
                TileType::Floor,
                "{}: entity on non-floor tile",
                name
            );
            assert!(
                occupied.insert(idx),
                "{}: two entities share tile {}",
                name,
                idx
            );
        }
    }
}

#[test]
fn depth_zero_maps_spawn_nothing() {
    for (name, mut builder) in all_builders(0) {
        let mut rng = RandomNumberGenerator::seeded(31);
        builder.build_map(&mut rng);
        let map = builder.get_map();
        assert!(map.entities.is_empty(), "{}: spawned at depth 0", name);
    }
}

#[test]
fn the_seed_fully_determines_the_map() {
    for seed in [1u64, 99, 5555] {
        let mut rng_a = RandomNumberGenerator::seeded(seed);
        let mut rng_b = RandomNumberGenerator::seeded(seed);
        let (map_a, start_a, exit_a) = build_random_map(WIDTH, HEIGHT, 2, &mut rng_a);
        let (map_b, start_b, exit_b) = build_random_map(WIDTH, HEIGHT, 2, &mut rng_b);

        assert_eq!(map_a.tiles, map_b.tiles);
        assert_eq!(start_a, start_b);
        assert_eq!(exit_a, exit_b);
        assert_eq!(map_a.entities.len(), map_b.entities.len());
        for (a, b) in map_a.entities.iter().zip(map_b.entities.iter()) {
            assert_eq!((a.x, a.y, &a.name, a.kind), (b.x, b.y, &b.name, b.kind));
        }
    }
}

#[test]
fn random_builder_smoke_test_across_all_rolls() {
    // Enough seeds to exercise every arm of the variant dice roll.
    for seed in 0..30u64 {
        let mut rng = RandomNumberGenerator::seeded(seed);
        let mut builder = random_builder(WIDTH, HEIGHT, 1, &mut rng);
        builder.build_map(&mut rng);
        let map = builder.get_map();
        let start = builder.get_starting_position();
        assert!(map.tiles[map.xy_idx(start.x, start.y)].is_walkable());
        assert!(map.downstairs.is_some());
    }
}

#[test]
fn deeper_floors_spawn_more_entities_on_average() {
    let mut shallow_total = 0usize;
    let mut deep_total = 0usize;
    for seed in 0..10u64 {
        let mut rng = RandomNumberGenerator::seeded(seed);
        let mut builder = SimpleMapBuilder::new(WIDTH, HEIGHT, 1);
        builder.build_map(&mut rng);
        shallow_total += builder.get_map().entities.len();

        let mut rng = RandomNumberGenerator::seeded(seed);
        let mut builder = SimpleMapBuilder::new(WIDTH, HEIGHT, 7);
        builder.build_map(&mut rng);
        deep_total += builder.get_map().entities.len();
    }
    assert!(
        deep_total > shallow_total,
        "depth 7 spawned {} entities, depth 1 spawned {}",
        deep_total,
        shallow_total
    );
}
