use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;

use super::{apply_room_to_map, finish_map, tunnel_between, MapBuilder};
use crate::map::{Map, Position};
use crate::rect::Rect;
use crate::spawner::SpawnTables;

const MAX_ROOMS: i32 = 30;
const MIN_SIZE: i32 = 6;
const MAX_SIZE: i32 = 10;

/// Classic rooms-and-corridors: drop up to [`MAX_ROOMS`] random rectangles,
/// reject any that overlap an accepted room, and tunnel each accepted room
/// to the previous one.
pub struct SimpleMapBuilder {
    map: Map,
    starting_position: Position,
    exit_position: Position,
    depth: i32,
    rooms: Vec<Rect>,
    tables: SpawnTables,
}

impl MapBuilder for SimpleMapBuilder {
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

impl SimpleMapBuilder {
    pub fn new(width: i32, height: i32, depth: i32) -> Box<SimpleMapBuilder> {
        assert!(
            width > MAX_SIZE && height > MAX_SIZE,
            "map too small for {}-tile rooms",
            MAX_SIZE
        );
        Box::new(SimpleMapBuilder {
            map: Map::new(width, height, depth),
            starting_position: Position { x: 0, y: 0 },
            exit_position: Position { x: 0, y: 0 },
            depth,
            rooms: Vec::new(),
            tables: SpawnTables::default(),
        })
    }

    fn build(&mut self, rng: &mut RandomNumberGenerator) {
        for _ in 0..MAX_ROOMS {
            let w = rng.range(MIN_SIZE, MAX_SIZE);
            let h = rng.range(MIN_SIZE, MAX_SIZE);
            let x = rng.range(0, self.map.width - w);
            let y = rng.range(0, self.map.height - h);
            let new_room = Rect::new(x, y, w, h);
            if self.rooms.iter().any(|other| new_room.intersect(other)) {
                continue;
            }

            apply_room_to_map(&mut self.map, &new_room);
            if let Some(previous) = self.rooms.last() {
                let (prev_x, prev_y) = previous.center();
                let (new_x, new_y) = new_room.center();
                tunnel_between(
                    &mut self.map,
                    rng,
                    Point::new(prev_x, prev_y),
                    Point::new(new_x, new_y),
                );
            }
            self.rooms.push(new_room);
        }

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
}
