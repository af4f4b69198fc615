use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;

use super::bsp_tree::BspNode;
use super::{apply_room_to_map, finish_map, tunnel_between, MapBuilder};
use crate::map::{Map, Position, TileType};
use crate::rect::Rect;
use crate::spawner::SpawnTables;

const SPLIT_DEPTH: i32 = 5;
const MIN_LEAF: i32 = 7;

/// Interior-style BSP: every leaf becomes a room filling its whole
/// partition, so rooms share single-tile walls and no space is wasted.
/// Sibling subtrees are tunnelled together at their node centers and each
/// joined center is stamped as a room-center marker tile.
pub struct BspInteriorBuilder {
    map: Map,
    starting_position: Position,
    exit_position: Position,
    depth: i32,
    rooms: Vec<Rect>,
    tables: SpawnTables,
}

impl MapBuilder for BspInteriorBuilder {
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

impl BspInteriorBuilder {
    pub fn new(width: i32, height: i32, depth: i32) -> Box<BspInteriorBuilder> {
        assert!(
            width >= 2 * MIN_LEAF + 2 && height >= 2 * MIN_LEAF + 2,
            "map too small to partition"
        );
        Box::new(BspInteriorBuilder {
            map: Map::new(width, height, depth),
            starting_position: Position { x: 0, y: 0 },
            exit_position: Position { x: 0, y: 0 },
            depth,
            rooms: Vec::new(),
            tables: SpawnTables::default(),
        })
    }

    fn build(&mut self, rng: &mut RandomNumberGenerator) {
        // Keep the tree one tile inside the border so no leaf can carve the
        // outermost ring.
        let mut root = BspNode::new(1, 1, self.map.width - 2, self.map.height - 2);
        root.split_recursive(rng, SPLIT_DEPTH, MIN_LEAF, MIN_LEAF);

        self.carve(&root, rng);

        let (start_x, start_y) = self.rooms[0].center();
        self.starting_position = Position {
            x: start_x,
            y: start_y,
        };
        self.exit_position = finish_map(
            &mut self.map,
            self.starting_position,
            self.depth,
            rng,
            &self.tables,
        );
    }

    fn carve(&mut self, node: &BspNode, rng: &mut RandomNumberGenerator) {
        match &node.children {
            None => {
                let room = Rect::new(node.x, node.y, node.width, node.height);
                apply_room_to_map(&mut self.map, &room);
                self.rooms.push(room);
            }
            Some(pair) => {
                self.carve(&pair.0, rng);
                self.carve(&pair.1, rng);
                // Tunnel first, stamp second: the markers must survive the
                // corridor carved between them.
                let (ax, ay) = pair.0.center();
                let (bx, by) = pair.1.center();
                tunnel_between(&mut self.map, rng, Point::new(ax, ay), Point::new(bx, by));
                for center in &[(ax, ay), (bx, by)] {
                    let idx = self.map.xy_idx(center.0, center.1);
                    self.map.tiles[idx] = TileType::RoomCenter;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn border_ring_stays_wall() {
        for seed in 0..5u64 {
            let mut builder = BspInteriorBuilder::new(80, 43, 1);
            let mut rng = RandomNumberGenerator::seeded(seed);
            builder.build_map(&mut rng);
            let map = builder.get_map();
            for x in 0..80 {
                assert_eq!(map.tiles[map.xy_idx(x, 0)], TileType::Wall);
                assert_eq!(map.tiles[map.xy_idx(x, 42)], TileType::Wall);
            }
            for y in 0..43 {
                assert_eq!(map.tiles[map.xy_idx(0, y)], TileType::Wall);
                assert_eq!(map.tiles[map.xy_idx(79, y)], TileType::Wall);
            }
        }
    }

    #[test]
    fn marks_at_least_one_room_center() {
        let mut builder = BspInteriorBuilder::new(80, 43, 1);
        let mut rng = RandomNumberGenerator::seeded(3);
        builder.build_map(&mut rng);
        let map = builder.get_map();
        let centers = map
            .tiles
            .iter()
            .filter(|t| **t == TileType::RoomCenter)
            .count();
        assert!(centers > 0);
    }
}
