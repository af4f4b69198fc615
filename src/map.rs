use bracket_color::prelude::RGB;
use bracket_geometry::prelude::{DistanceAlg, Point};
use bracket_pathfinding::prelude::{Algorithm2D, BaseMap, SmallVec};
use serde::{Deserialize, Serialize};

#[derive(PartialEq, Eq, Copy, Clone, Debug, Hash, Serialize, Deserialize)]
pub enum TileType {
    Wall,
    Floor,
    DownStairs,
    /// Corridor anchor stamped at BSP node centers by the interior builder.
    RoomCenter,
}

impl TileType {
    pub fn is_walkable(self) -> bool {
        self != TileType::Wall
    }

    pub fn is_opaque(self) -> bool {
        self == TileType::Wall
    }

    pub fn glyph(self) -> char {
        match self {
            TileType::Wall => '#',
            TileType::Floor => '.',
            TileType::DownStairs => '>',
            TileType::RoomCenter => '+',
        }
    }

    pub fn fg(self) -> RGB {
        match self {
            TileType::Wall => RGB::from_f32(0.0, 1.0, 0.0),
            TileType::Floor => RGB::from_f32(0.0, 0.5, 0.5),
            TileType::DownStairs => RGB::from_f32(0.0, 1.0, 1.0),
            TileType::RoomCenter => RGB::from_f32(1.0, 0.8, 0.0),
        }
    }
}

#[derive(PartialEq, Eq, Copy, Clone, Debug, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

#[derive(PartialEq, Eq, Copy, Clone, Debug, Serialize, Deserialize)]
pub enum EntityKind {
    Monster,
    Item,
}

/// An entity placed during generation. The core only decides placement;
/// the game's entity factory materializes the template named here.
#[derive(PartialEq, Clone, Debug, Serialize, Deserialize)]
pub struct PlacedEntity {
    pub x: i32,
    pub y: i32,
    pub name: String,
    pub kind: EntityKind,
}

#[derive(Default, Clone, Serialize, Deserialize)]
pub struct Map {
    pub tiles: Vec<TileType>,
    pub width: i32,
    pub height: i32,
    pub depth: i32,
    pub blocked: Vec<bool>,
    pub downstairs: Option<usize>,
    pub entities: Vec<PlacedEntity>,
}

impl Map {
    /// An empty map, consisting entirely of solid walls.
    pub fn new(width: i32, height: i32, depth: i32) -> Map {
        assert!(width > 0 && height > 0, "map dimensions must be positive");
        assert!(depth >= 0, "dungeon depth cannot be negative");
        let count = (width * height) as usize;
        Map {
            tiles: vec![TileType::Wall; count],
            width,
            height,
            depth,
            blocked: vec![false; count],
            downstairs: None,
            entities: Vec::new(),
        }
    }

    pub fn xy_idx(&self, x: i32, y: i32) -> usize {
        debug_assert!(
            x >= 0 && x < self.width && y >= 0 && y < self.height,
            "tile access out of bounds: ({}, {})",
            x,
            y
        );
        (y as usize * self.width as usize) + x as usize
    }

    pub fn idx_xy(&self, idx: usize) -> (i32, i32) {
        (idx as i32 % self.width, idx as i32 / self.width)
    }

    pub fn populate_blocked(&mut self) {
        for (i, tile) in self.tiles.iter().enumerate() {
            self.blocked[i] = !tile.is_walkable();
        }
    }

    /// True when another entity already occupies this cell.
    pub fn is_occupied(&self, x: i32, y: i32) -> bool {
        self.entities.iter().any(|e| e.x == x && e.y == y)
    }

    fn is_exit_valid(&self, x: i32, y: i32) -> bool {
        if x < 0 || x > self.width - 1 || y < 0 || y > self.height - 1 {
            return false;
        }
        !self.blocked[self.xy_idx(x, y)]
    }
}

impl BaseMap for Map {
    fn is_opaque(&self, idx: usize) -> bool {
        self.tiles[idx].is_opaque()
    }

    fn get_pathing_distance(&self, idx1: usize, idx2: usize) -> f32 {
        let w = self.width as usize;
        let p1 = Point::new(idx1 % w, idx1 / w);
        let p2 = Point::new(idx2 % w, idx2 / w);
        DistanceAlg::Pythagoras.distance2d(p1, p2)
    }

    // Cardinal movement only, unit cost. Distance fields over this map are
    // 4-connected by construction.
    fn get_available_exits(&self, idx: usize) -> SmallVec<[(usize, f32); 10]> {
        let mut exits = SmallVec::new();
        let x = idx as i32 % self.width;
        let y = idx as i32 / self.width;
        let w = self.width as usize;

        if self.is_exit_valid(x - 1, y) {
            exits.push((idx - 1, 1.0));
        }
        if self.is_exit_valid(x + 1, y) {
            exits.push((idx + 1, 1.0));
        }
        if self.is_exit_valid(x, y - 1) {
            exits.push((idx - w, 1.0));
        }
        if self.is_exit_valid(x, y + 1) {
            exits.push((idx + w, 1.0));
        }

        exits
    }
}

impl Algorithm2D for Map {
    fn dimensions(&self) -> Point {
        Point::new(self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_map_is_solid_wall() {
        let map = Map::new(10, 8, 1);
        assert_eq!(map.tiles.len(), 80);
        assert!(map.tiles.iter().all(|t| *t == TileType::Wall));
        assert!(map.downstairs.is_none());
        assert!(map.entities.is_empty());
    }

    #[test]
    fn xy_idx_round_trips() {
        let map = Map::new(80, 43, 1);
        let idx = map.xy_idx(17, 29);
        assert_eq!(map.idx_xy(idx), (17, 29));
    }

    #[test]
    fn walls_block_and_occlude() {
        assert!(!TileType::Wall.is_walkable());
        assert!(TileType::Wall.is_opaque());
        assert!(TileType::Floor.is_walkable());
        assert!(TileType::DownStairs.is_walkable());
        assert!(TileType::RoomCenter.is_walkable());
        assert!(!TileType::Floor.is_opaque());
    }

    #[test]
    fn border_tiles_have_no_outside_exits() {
        let mut map = Map::new(5, 5, 0);
        for tile in map.tiles.iter_mut() {
            *tile = TileType::Floor;
        }
        map.populate_blocked();
        let corner = map.xy_idx(0, 0);
        let exits = map.get_available_exits(corner);
        assert_eq!(exits.len(), 2);
    }

    #[test]
    #[should_panic]
    fn zero_sized_map_is_rejected() {
        Map::new(0, 10, 1);
    }
}
