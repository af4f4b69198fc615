use bracket_random::prelude::RandomNumberGenerator;

use crate::map::{Map, Position};
use crate::spawner::SpawnTables;

mod common;
pub use common::*;
mod bsp_tree;
mod simple_map;
pub use simple_map::SimpleMapBuilder;
mod bsp_dungeon;
pub use bsp_dungeon::BspDungeonBuilder;
mod bsp_interior;
pub use bsp_interior::BspInteriorBuilder;
mod cellular;
pub use cellular::CellularAutomataBuilder;
mod evil_cellular;
pub use evil_cellular::EvilCellularBuilder;
mod drunkard;
pub use drunkard::{DrunkSpawnMode, DrunkardSettings, DrunkardsWalkBuilder};
mod maze;
pub use maze::{MazeBuilder, MazeSettings};
mod dla;
pub use dla::{DlaAlgorithm, DlaSettings, DLABuilder};

/// The contract every generator variant satisfies. Builders are single-shot:
/// construct with parameters, call [`build_map`](MapBuilder::build_map) once,
/// read the results through the accessors.
pub trait MapBuilder {
    fn build_map(&mut self, rng: &mut RandomNumberGenerator);
    fn get_map(&self) -> Map;
    fn get_starting_position(&self) -> Position;
    fn get_exit_position(&self) -> Position;
    fn set_spawn_tables(&mut self, tables: SpawnTables);
}

/// Picks a variant (and preset, for the drunkard and DLA families) by dice
/// roll on the shared RNG.
pub fn random_builder(
    width: i32,
    height: i32,
    depth: i32,
    rng: &mut RandomNumberGenerator,
) -> Box<dyn MapBuilder> {
    let roll = rng.roll_dice(1, 15);
    log::debug!("random_builder rolled {}", roll);
    match roll {
        1 => BspDungeonBuilder::new(width, height, depth),
        2 => BspInteriorBuilder::new(width, height, depth),
        3 => CellularAutomataBuilder::new(width, height, depth),
        4 => EvilCellularBuilder::new(width, height, depth),
        5 => DrunkardsWalkBuilder::open_area(width, height, depth),
        6 => DrunkardsWalkBuilder::open_halls(width, height, depth),
        7 => DrunkardsWalkBuilder::winding_passages(width, height, depth),
        8 => DrunkardsWalkBuilder::fat_passages(width, height, depth),
        9 => DrunkardsWalkBuilder::fearful_symmetry(width, height, depth),
        10 => MazeBuilder::new(width, height, depth),
        11 => DLABuilder::walk_inwards(width, height, depth),
        12 => DLABuilder::walk_outwards(width, height, depth),
        13 => DLABuilder::central_attractor(width, height, depth),
        14 => DLABuilder::insectoid(width, height, depth),
        _ => SimpleMapBuilder::new(width, height, depth),
    }
}
