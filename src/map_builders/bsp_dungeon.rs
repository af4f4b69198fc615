use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;

use super::bsp_tree::BspNode;
use super::{apply_room_to_map, finish_map, tunnel_between, MapBuilder};
use crate::map::{Map, Position};
use crate::rect::Rect;
use crate::spawner::SpawnTables;

const SPLIT_DEPTH: i32 = 5;
const MIN_LEAF: i32 = 7;

/// Binary-space-partition dungeon: the grid is split to a fixed depth, each
/// leaf gets a randomly sized room, and sibling subtrees are joined by a
/// tunnel between their first rooms' centers, so the room graph mirrors the
/// partition tree.
pub struct BspDungeonBuilder {
    map: Map,
    starting_position: Position,
    exit_position: Position,
    depth: i32,
    rooms: Vec<Rect>,
    tables: SpawnTables,
}

impl MapBuilder for BspDungeonBuilder {
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

impl BspDungeonBuilder {
    pub fn new(width: i32, height: i32, depth: i32) -> Box<BspDungeonBuilder> {
        assert!(
            width >= 2 * MIN_LEAF && height >= 2 * MIN_LEAF,
            "map too small to partition"
        );
        Box::new(BspDungeonBuilder {
            map: Map::new(width, height, depth),
            starting_position: Position { x: 0, y: 0 },
            exit_position: Position { x: 0, y: 0 },
            depth,
            rooms: Vec::new(),
            tables: SpawnTables::default(),
        })
    }

    fn build(&mut self, rng: &mut RandomNumberGenerator) {
        let mut root = BspNode::new(0, 0, self.map.width, self.map.height);
        root.split_recursive(rng, SPLIT_DEPTH, MIN_LEAF, MIN_LEAF);

        self.rooms = self.carve(&root, rng);

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

    /// Carves the subtree under `node` and returns its rooms, first child's
    /// rooms first. Internal nodes tunnel their children's lead rooms
    /// together, which keeps the whole tree one component.
    fn carve(&mut self, node: &BspNode, rng: &mut RandomNumberGenerator) -> Vec<Rect> {
        match &node.children {
            None => {
                let room = build_room(node, rng);
                apply_room_to_map(&mut self.map, &room);
                vec![room]
            }
            Some(pair) => {
                let mut rooms = self.carve(&pair.0, rng);
                let second = self.carve(&pair.1, rng);
                let (ax, ay) = rooms[0].center();
                let (bx, by) = second[0].center();
                tunnel_between(&mut self.map, rng, Point::new(ax, ay), Point::new(bx, by));
                rooms.extend(second);
                rooms
            }
        }
    }
}

/// A random room inside a leaf: each dimension spans at least half the leaf,
/// placed so the room never reaches the leaf's far edge.
fn build_room(node: &BspNode, rng: &mut RandomNumberGenerator) -> Rect {
    let room_width = rng.range(node.width / 2, node.width - 1);
    let room_height = rng.range(node.height / 2, node.height - 1);
    let x = rng.range(node.x, node.x + node.width - room_width - 1);
    let y = rng.range(node.y, node.y + node.height - room_height - 1);
    Rect::new(x, y, room_width, room_height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn leaf_rooms_never_overlap() {
        for seed in 0..10u64 {
            let mut builder = BspDungeonBuilder::new(80, 43, 1);
            let mut rng = RandomNumberGenerator::seeded(seed);
            builder.build_map(&mut rng);

            assert!(builder.rooms.len() > 1);
            for (i, a) in builder.rooms.iter().enumerate() {
                for b in builder.rooms.iter().skip(i + 1) {
                    assert!(!a.intersect(b), "rooms {:?} and {:?} overlap", a, b);
                }
            }
        }
    }

    #[test]
    fn rooms_stay_inside_the_map() {
        let mut builder = BspDungeonBuilder::new(80, 43, 1);
        let mut rng = RandomNumberGenerator::seeded(8);
        builder.build_map(&mut rng);
        for room in builder.rooms.iter() {
            assert!(room.x1 >= 0 && room.y1 >= 0);
            assert!(room.x2 <= 79 && room.y2 <= 42);
        }
    }
}
