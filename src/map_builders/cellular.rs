use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;

use super::{finish_map, nearest_floor, MapBuilder};
use crate::map::{Map, Position, TileType};
use crate::spawner::SpawnTables;

const ITERATIONS: i32 = 10;
const INITIAL_FLOOR_PERCENT: i32 = 40;

/// Cellular automaton caves: random noise smoothed by repeated neighbor
/// voting. A tile with more than four wall neighbors, or none at all,
/// becomes wall; everything else becomes floor.
pub struct CellularAutomataBuilder {
    map: Map,
    starting_position: Position,
    exit_position: Position,
    depth: i32,
    tables: SpawnTables,
}

impl MapBuilder for CellularAutomataBuilder {
    fn build_map(&mut self, rng: &mut RandomNumberGenerator) {
        self.build(rng);
    }

    fn get_map(&self) -> Map {
        self.map.clone()
    }

    fn get_starting_position(&self) -> Position {
        self.starting_position
    }

    fn get_exit_position(&self) -> Position {
        self.exit_position
    }

    fn set_spawn_tables(&mut self, tables: SpawnTables) {
        tables.assert_valid();
        self.tables = tables;
    }
}

impl CellularAutomataBuilder {
    pub fn new(width: i32, height: i32, depth: i32) -> Box<CellularAutomataBuilder> {
        assert!(width > 6 && height > 6, "map too small for the automaton");
        Box::new(CellularAutomataBuilder {
            map: Map::new(width, height, depth),
            starting_position: Position { x: 0, y: 0 },
            exit_position: Position { x: 0, y: 0 },
            depth,
            tables: SpawnTables::default(),
        })
    }

    fn build(&mut self, rng: &mut RandomNumberGenerator) {
        run_automaton(&mut self.map, rng);

        let center = Point::new(self.map.width / 2, self.map.height / 2);
        self.starting_position = nearest_floor(&self.map, center);
        self.exit_position = finish_map(
            &mut self.map,
            self.starting_position,
            self.depth,
            rng,
            &self.tables,
        );
    }
}

/// Seeds the grid with noise, pins a two-tile wall border, and runs the
/// smoothing rule for a fixed number of double-buffered passes. Shared with
/// the chambered variant, which post-processes the same caves.
pub(super) fn run_automaton(map: &mut Map, rng: &mut RandomNumberGenerator) {
    for y in 0..map.height {
        for x in 0..map.width {
            let idx = map.xy_idx(x, y);
            map.tiles[idx] = if rng.roll_dice(1, 100) <= INITIAL_FLOOR_PERCENT {
                TileType::Floor
            } else {
                TileType::Wall
            };
        }
    }
    force_border(map);

    for _ in 0..ITERATIONS {
        let mut next = map.tiles.clone();
        for y in 1..map.height - 1 {
            for x in 1..map.width - 1 {
                let idx = map.xy_idx(x, y);
                let mut neighbors = 0;
                for dy in -1..=1 {
                    for dx in -1..=1 {
                        if dx == 0 && dy == 0 {
                            continue;
                        }
                        if map.tiles[map.xy_idx(x + dx, y + dy)] == TileType::Wall {
                            neighbors += 1;
                        }
                    }
                }
                next[idx] = if neighbors > 4 || neighbors == 0 {
                    TileType::Wall
                } else {
                    TileType::Floor
                };
            }
        }
        map.tiles = next;
        force_border(map);
    }
}

fn force_border(map: &mut Map) {
    for y in 0..map.height {
        for x in 0..map.width {
            if x < 2 || x > map.width - 3 || y < 2 || y > map.height - 3 {
                let idx = map.xy_idx(x, y);
                map.tiles[idx] = TileType::Wall;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn border_is_always_wall() {
        for seed in 0..5u64 {
            let mut builder = CellularAutomataBuilder::new(80, 43, 1);
            let mut rng = RandomNumberGenerator::seeded(seed);
            builder.build_map(&mut rng);
            let map = builder.get_map();
            for y in 0..43 {
                for x in 0..80 {
                    if x < 2 || x > 77 || y < 2 || y > 40 {
                        assert_eq!(map.tiles[map.xy_idx(x, y)], TileType::Wall);
                    }
                }
            }
        }
    }

    #[test]
    fn produces_a_usable_amount_of_floor() {
        let mut builder = CellularAutomataBuilder::new(80, 43, 1);
        let mut rng = RandomNumberGenerator::seeded(12);
        builder.build_map(&mut rng);
        let map = builder.get_map();
        let floor = map
            .tiles
            .iter()
            .filter(|t| t.is_walkable())
            .count();
        assert!(floor * 10 >= map.tiles.len(), "only {} walkable tiles", floor);
    }
}
