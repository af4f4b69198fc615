use bracket_random::prelude::RandomNumberGenerator;

use super::{check_floor_target, finish_map, paint, stagger, MapBuilder, Symmetry};
use crate::map::{Map, Position, TileType};
use crate::spawner::SpawnTables;
use crate::SettingsError;

#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum DrunkSpawnMode {
    StartingPoint,
    Random,
}

/// Tunables for the drunkard's walk family.
#[derive(Copy, Clone, Debug)]
pub struct DrunkardSettings {
    pub spawn_mode: DrunkSpawnMode,
    pub drunken_lifetime: i32,
    pub floor_percent: f32,
    pub brush_size: i32,
    pub symmetry: Symmetry,
}

impl DrunkardSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.drunken_lifetime <= 0 {
            return Err(SettingsError::WalkerLifetime(self.drunken_lifetime));
        }
        if self.floor_percent <= 0.0 || self.floor_percent >= 0.9 {
            return Err(SettingsError::FloorFraction(self.floor_percent));
        }
        if self.brush_size < 1 || self.brush_size > 3 {
            return Err(SettingsError::BrushSize(self.brush_size));
        }
        Ok(())
    }
}

/// Drunken diggers: each walker staggers randomly for a fixed lifetime,
/// carving floor as it goes, until enough of the map is open. Every carved
/// tile is trivially connected to the first digger's path, so the cull
/// rarely has work to do.
pub struct DrunkardsWalkBuilder {
    map: Map,
    starting_position: Position,
    exit_position: Position,
    depth: i32,
    settings: DrunkardSettings,
    tables: SpawnTables,
}

impl MapBuilder for DrunkardsWalkBuilder {
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

impl DrunkardsWalkBuilder {
    pub fn new(
        width: i32,
        height: i32,
        depth: i32,
        settings: DrunkardSettings,
    ) -> Box<DrunkardsWalkBuilder> {
        assert!(width > 6 && height > 6, "map too small for diggers");
        if let Err(error) = settings.validate() {
            panic!("{}", error);
        }
        if let Err(error) = check_floor_target(width, height, settings.floor_percent) {
            panic!("{}", error);
        }
        Box::new(DrunkardsWalkBuilder {
            map: Map::new(width, height, depth),
            starting_position: Position { x: 0, y: 0 },
            exit_position: Position { x: 0, y: 0 },
            depth,
            settings,
            tables: SpawnTables::default(),
        })
    }

    pub fn open_area(width: i32, height: i32, depth: i32) -> Box<DrunkardsWalkBuilder> {
        DrunkardsWalkBuilder::new(
            width,
            height,
            depth,
            DrunkardSettings {
                spawn_mode: DrunkSpawnMode::StartingPoint,
                drunken_lifetime: 400,
                floor_percent: 0.5,
                brush_size: 1,
                symmetry: Symmetry::None,
            },
        )
    }

    pub fn open_halls(width: i32, height: i32, depth: i32) -> Box<DrunkardsWalkBuilder> {
        DrunkardsWalkBuilder::new(
            width,
            height,
            depth,
            DrunkardSettings {
                spawn_mode: DrunkSpawnMode::Random,
                drunken_lifetime: 400,
                floor_percent: 0.5,
                brush_size: 1,
                symmetry: Symmetry::None,
            },
        )
    }

    pub fn winding_passages(width: i32, height: i32, depth: i32) -> Box<DrunkardsWalkBuilder> {
        DrunkardsWalkBuilder::new(
            width,
            height,
            depth,
            DrunkardSettings {
                spawn_mode: DrunkSpawnMode::Random,
                drunken_lifetime: 100,
                floor_percent: 0.4,
                brush_size: 1,
                symmetry: Symmetry::None,
            },
        )
    }

    pub fn fat_passages(width: i32, height: i32, depth: i32) -> Box<DrunkardsWalkBuilder> {
        DrunkardsWalkBuilder::new(
            width,
            height,
            depth,
            DrunkardSettings {
                spawn_mode: DrunkSpawnMode::Random,
                drunken_lifetime: 100,
                floor_percent: 0.4,
                brush_size: 2,
                symmetry: Symmetry::None,
            },
        )
    }

    pub fn fearful_symmetry(width: i32, height: i32, depth: i32) -> Box<DrunkardsWalkBuilder> {
        DrunkardsWalkBuilder::new(
            width,
            height,
            depth,
            DrunkardSettings {
                spawn_mode: DrunkSpawnMode::Random,
                drunken_lifetime: 100,
                floor_percent: 0.4,
                brush_size: 1,
                symmetry: Symmetry::Both,
            },
        )
    }

    fn build(&mut self, rng: &mut RandomNumberGenerator) {
        self.starting_position = Position {
            x: self.map.width / 2,
            y: self.map.height / 2,
        };
        let start_idx = self
            .map
            .xy_idx(self.starting_position.x, self.starting_position.y);
        self.map.tiles[start_idx] = TileType::Floor;

        let total_tiles = self.map.tiles.len();
        let desired_floor_tiles = (self.settings.floor_percent * total_tiles as f32) as usize;
        let mut floor_tile_count = 1;
        let mut digger_count = 0u32;
        while floor_tile_count < desired_floor_tiles {
            // The first digger always starts at the player position so the
            // carved area stays anchored to it.
            let (mut drunk_x, mut drunk_y) = match self.settings.spawn_mode {
                DrunkSpawnMode::StartingPoint => {
                    (self.starting_position.x, self.starting_position.y)
                }
                DrunkSpawnMode::Random => {
                    if digger_count == 0 {
                        (self.starting_position.x, self.starting_position.y)
                    } else {
                        (
                            rng.roll_dice(1, self.map.width - 3) + 1,
                            rng.roll_dice(1, self.map.height - 3) + 1,
                        )
                    }
                }
            };

            let mut drunk_life = self.settings.drunken_lifetime;
            while drunk_life > 0 {
                paint(
                    &mut self.map,
                    self.settings.symmetry,
                    self.settings.brush_size,
                    drunk_x,
                    drunk_y,
                );
                stagger(&self.map, rng, &mut drunk_x, &mut drunk_y);
                drunk_life -= 1;
            }

            digger_count += 1;
            floor_tile_count = self
                .map
                .tiles
                .iter()
                .filter(|t| **t == TileType::Floor)
                .count();
        }
        log::debug!("map opened up after {} diggers", digger_count);

        self.exit_position = finish_map(
            &mut self.map,
            self.starting_position,
            self.depth,
            rng,
            &self.tables,
        );
    }
}
