use bracket_geometry::prelude::{line2d, LineAlg, Point};
use bracket_random::prelude::RandomNumberGenerator;

use super::{check_floor_target, finish_map, paint, stagger, MapBuilder, Symmetry};
use crate::map::{Map, Position, TileType};
use crate::spawner::SpawnTables;
use crate::SettingsError;

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum DlaAlgorithm {
    WalkInwards,
    WalkOutwards,
    CentralAttractor,
}

/// Tunables for diffusion-limited aggregation.
#[derive(Copy, Clone, Debug)]
pub struct DlaSettings {
    pub algorithm: DlaAlgorithm,
    pub brush_size: i32,
    pub symmetry: Symmetry,
    pub floor_percent: f32,
    pub stick_probability: f32,
}

impl DlaSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.floor_percent <= 0.0 || self.floor_percent >= 0.9 {
            return Err(SettingsError::FloorFraction(self.floor_percent));
        }
        if self.stick_probability <= 0.0 || self.stick_probability > 1.0 {
            return Err(SettingsError::StickProbability(self.stick_probability));
        }
        if self.brush_size < 1 || self.brush_size > 3 {
            return Err(SettingsError::BrushSize(self.brush_size));
        }
        Ok(())
    }
}

/// Diffusion-limited aggregation: particles random-walk until they touch the
/// seeded structure and stick, growing organic blob shapes outward from a
/// cross at the map center.
pub struct DLABuilder {
    map: Map,
    starting_position: Position,
    exit_position: Position,
    depth: i32,
    settings: DlaSettings,
    tables: SpawnTables,
}

impl MapBuilder for DLABuilder {
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

impl DLABuilder {
    pub fn new(width: i32, height: i32, depth: i32, settings: DlaSettings) -> Box<DLABuilder> {
        assert!(width > 6 && height > 6, "map too small for aggregation");
        if let Err(error) = settings.validate() {
            panic!("{}", error);
        }
        if let Err(error) = check_floor_target(width, height, settings.floor_percent) {
            panic!("{}", error);
        }
        Box::new(DLABuilder {
            map: Map::new(width, height, depth),
            starting_position: Position { x: 0, y: 0 },
            exit_position: Position { x: 0, y: 0 },
            depth,
            settings,
            tables: SpawnTables::default(),
        })
    }

    pub fn walk_inwards(width: i32, height: i32, depth: i32) -> Box<DLABuilder> {
        DLABuilder::new(
            width,
            height,
            depth,
            DlaSettings {
                algorithm: DlaAlgorithm::WalkInwards,
                brush_size: 1,
                symmetry: Symmetry::None,
                floor_percent: 0.25,
                stick_probability: 1.0,
            },
        )
    }

    pub fn walk_outwards(width: i32, height: i32, depth: i32) -> Box<DLABuilder> {
        DLABuilder::new(
            width,
            height,
            depth,
            DlaSettings {
                algorithm: DlaAlgorithm::WalkOutwards,
                brush_size: 2,
                symmetry: Symmetry::None,
                floor_percent: 0.25,
                stick_probability: 1.0,
            },
        )
    }

    pub fn central_attractor(width: i32, height: i32, depth: i32) -> Box<DLABuilder> {
        DLABuilder::new(
            width,
            height,
            depth,
            DlaSettings {
                algorithm: DlaAlgorithm::CentralAttractor,
                brush_size: 2,
                symmetry: Symmetry::None,
                floor_percent: 0.25,
                stick_probability: 1.0,
            },
        )
    }

    pub fn insectoid(width: i32, height: i32, depth: i32) -> Box<DLABuilder> {
        DLABuilder::new(
            width,
            height,
            depth,
            DlaSettings {
                algorithm: DlaAlgorithm::CentralAttractor,
                brush_size: 2,
                symmetry: Symmetry::Horizontal,
                floor_percent: 0.3,
                stick_probability: 1.0,
            },
        )
    }

    fn build(&mut self, rng: &mut RandomNumberGenerator) {
        let center_x = self.map.width / 2;
        let center_y = self.map.height / 2;
        self.starting_position = Position {
            x: center_x,
            y: center_y,
        };

        // Seed cross for particles to aggregate onto.
        for (x, y) in &[
            (center_x, center_y),
            (center_x - 1, center_y),
            (center_x + 1, center_y),
            (center_x, center_y - 1),
            (center_x, center_y + 1),
        ] {
            let idx = self.map.xy_idx(*x, *y);
            self.map.tiles[idx] = TileType::Floor;
        }

        let total_tiles = self.map.tiles.len();
        let desired_floor_tiles = (self.settings.floor_percent * total_tiles as f32) as usize;
        let mut floor_tile_count = self
            .map
            .tiles
            .iter()
            .filter(|t| **t == TileType::Floor)
            .count();
        let mut walkers = 0u32;
        while floor_tile_count < desired_floor_tiles {
            walkers += 1;
            let stuck_at = match self.settings.algorithm {
                DlaAlgorithm::WalkInwards => self.inward_particle(rng),
                DlaAlgorithm::WalkOutwards => self.outward_particle(rng),
                DlaAlgorithm::CentralAttractor => self.attractor_particle(rng),
            };
            if rng.rand::<f32>() < self.settings.stick_probability {
                paint(
                    &mut self.map,
                    self.settings.symmetry,
                    self.settings.brush_size,
                    stuck_at.x,
                    stuck_at.y,
                );
            }
            floor_tile_count = self
                .map
                .tiles
                .iter()
                .filter(|t| **t == TileType::Floor)
                .count();
        }
        log::debug!("aggregation finished after {} walkers", walkers);

        self.exit_position = finish_map(
            &mut self.map,
            self.starting_position,
            self.depth,
            rng,
            &self.tables,
        );
    }

    /// A particle spawns at a random wall tile and staggers until it steps
    /// onto the structure; its last wall position is where it sticks.
    fn inward_particle(&self, rng: &mut RandomNumberGenerator) -> Point {
        let mut digger_x = rng.roll_dice(1, self.map.width - 3) + 1;
        let mut digger_y = rng.roll_dice(1, self.map.height - 3) + 1;
        let mut prev_x = digger_x;
        let mut prev_y = digger_y;
        let mut digger_idx = self.map.xy_idx(digger_x, digger_y);
        while self.map.tiles[digger_idx] == TileType::Wall {
            prev_x = digger_x;
            prev_y = digger_y;
            stagger(&self.map, rng, &mut digger_x, &mut digger_y);
            digger_idx = self.map.xy_idx(digger_x, digger_y);
        }
        Point::new(prev_x, prev_y)
    }

    /// A particle spawns on the structure and staggers until it falls off
    /// the edge; it sticks where it landed.
    fn outward_particle(&self, rng: &mut RandomNumberGenerator) -> Point {
        let mut digger_x = self.map.width / 2;
        let mut digger_y = self.map.height / 2;
        let mut digger_idx = self.map.xy_idx(digger_x, digger_y);
        while self.map.tiles[digger_idx] == TileType::Floor {
            stagger(&self.map, rng, &mut digger_x, &mut digger_y);
            digger_idx = self.map.xy_idx(digger_x, digger_y);
        }
        Point::new(digger_x, digger_y)
    }

    /// A particle spawns at a random wall tile and moves straight toward the
    /// center along a Bresenham line; it sticks at the last wall tile before
    /// touching the structure, same as the staggering walkers.
    fn attractor_particle(&self, rng: &mut RandomNumberGenerator) -> Point {
        let digger_x = rng.roll_dice(1, self.map.width - 3) + 1;
        let digger_y = rng.roll_dice(1, self.map.height - 3) + 1;
        let mut current = Point::new(digger_x, digger_y);
        let mut prev = current;
        let mut digger_idx = self.map.xy_idx(current.x, current.y);

        let mut path = line2d(
            LineAlg::Bresenham,
            current,
            Point::new(self.map.width / 2, self.map.height / 2),
        );
        while self.map.tiles[digger_idx] == TileType::Wall && !path.is_empty() {
            prev = current;
            current = path[0];
            path.remove(0);
            digger_idx = self.map.xy_idx(current.x, current.y);
        }
        prev
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_out_of_range_settings() {
        let bad_floor = DlaSettings {
            algorithm: DlaAlgorithm::WalkInwards,
            brush_size: 1,
            symmetry: Symmetry::None,
            floor_percent: 0.95,
            stick_probability: 1.0,
        };
        assert_eq!(
            bad_floor.validate(),
            Err(SettingsError::FloorFraction(0.95))
        );

        let bad_stick = DlaSettings {
            stick_probability: 0.0,
            ..bad_floor
        };
        let bad_stick = DlaSettings {
            floor_percent: 0.25,
            ..bad_stick
        };
        assert_eq!(
            bad_stick.validate(),
            Err(SettingsError::StickProbability(0.0))
        );

        let bad_brush = DlaSettings {
            brush_size: 4,
            stick_probability: 1.0,
            ..bad_stick
        };
        assert_eq!(bad_brush.validate(), Err(SettingsError::BrushSize(4)));
    }

    #[test]
    #[should_panic(expected = "carvable")]
    fn rejects_a_target_the_walkers_cannot_reach() {
        // A quarter of 7x7 is 12 tiles; only the 3x3 core is carvable.
        DLABuilder::walk_inwards(7, 7, 1);
    }

    #[test]
    fn attractor_with_a_single_cell_brush_reaches_its_target() {
        // Each stuck particle must convert a wall tile, not repaint the
        // contact tile, or the build never finishes.
        let mut builder = DLABuilder::new(
            80,
            43,
            1,
            DlaSettings {
                algorithm: DlaAlgorithm::CentralAttractor,
                brush_size: 1,
                symmetry: Symmetry::None,
                floor_percent: 0.25,
                stick_probability: 1.0,
            },
        );
        let mut rng = RandomNumberGenerator::seeded(3);
        builder.build_map(&mut rng);
        let map = builder.get_map();
        assert!(map.downstairs.is_some());
        let walkable = map.tiles.iter().filter(|t| t.is_walkable()).count();
        assert!(walkable * 20 >= map.tiles.len(), "only {} walkable", walkable);
    }

    #[test]
    fn reaches_the_requested_floor_fraction() {
        let mut builder = DLABuilder::walk_inwards(80, 43, 1);
        let mut rng = RandomNumberGenerator::seeded(7);
        builder.build_map(&mut rng);
        let map = builder.get_map();
        let walkable = map.tiles.iter().filter(|t| t.is_walkable()).count();
        // The cull can only trim isolated pockets, most of the aggregate is
        // connected to the seed cross.
        assert!(walkable * 10 >= map.tiles.len());
    }

    #[test]
    fn insectoid_grows_mirrored_halves() {
        let mut builder = DLABuilder::insectoid(81, 43, 1);
        let mut rng = RandomNumberGenerator::seeded(21);
        builder.build_map(&mut rng);
        let map = builder.get_map();
        let start = builder.get_starting_position();
        assert!(map.tiles[map.xy_idx(start.x, start.y)].is_walkable());
    }
}
