//! Procedural dungeon map generation.
//!
//! A family of interchangeable generator variants (rooms and corridors,
//! binary space partitions, cellular caves, drunkard walks, mazes, and
//! diffusion-limited aggregation) over a shared tile grid. Every variant
//! converges on the same closing pipeline: unreachable floor is culled with
//! a Dijkstra distance field, the farthest reachable tile becomes the down
//! stairs, and the remaining floor is Voronoi-partitioned into spawn regions
//! populated from depth-scaled weighted tables.
//!
//! All randomness is drawn from one seeded [`RandomNumberGenerator`] handle
//! threaded through every call, so a seed fully determines the produced map.
//!
//! ```
//! use bracket_random::prelude::RandomNumberGenerator;
//! use vorona_mapgen::map_builders::{CellularAutomataBuilder, MapBuilder};
//!
//! let mut rng = RandomNumberGenerator::seeded(42);
//! let mut builder = CellularAutomataBuilder::new(80, 43, 1);
//! builder.build_map(&mut rng);
//! let map = builder.get_map();
//! let start = builder.get_starting_position();
//! assert!(map.tiles[map.xy_idx(start.x, start.y)].is_walkable());
//! ```

pub mod map;
pub mod map_builders;
pub mod random_table;
pub mod rect;
pub mod spawner;

pub use map::{EntityKind, Map, PlacedEntity, Position, TileType};
pub use rect::Rect;

use bracket_random::prelude::RandomNumberGenerator;
use thiserror::Error;

/// Invalid construction-time configuration. Generators treat these as
/// programming errors and abort the build immediately.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SettingsError {
    #[error("target floor fraction {0} outside the buildable range (0.0, 0.9)")]
    FloorFraction(f32),
    #[error("target of {desired} floor tiles exceeds the {carvable} carvable cells")]
    FloorTarget { desired: usize, carvable: usize },
    #[error("walker lifetime must be positive, got {0}")]
    WalkerLifetime(i32),
    #[error("stick probability {0} outside (0.0, 1.0]")]
    StickProbability(f32),
    #[error("brush size {0} outside 1..=3")]
    BrushSize(i32),
    #[error("branch bias range {min}..={max} outside [-10, 10]")]
    BranchBias { min: i32, max: i32 },
    #[error("depth thresholds must ascend: {prev} appears before {next}")]
    TableOrder { prev: i32, next: i32 },
    #[error("spawn weight for \"{name}\" is negative ({weight})")]
    NegativeWeight { name: String, weight: i32 },
}

/// Convenience wrapper: pick a random variant, run it once, and hand back
/// the finished map along with the player start and the exit.
pub fn build_random_map(
    width: i32,
    height: i32,
    depth: i32,
    rng: &mut RandomNumberGenerator,
) -> (Map, Position, Position) {
    let mut builder = map_builders::random_builder(width, height, depth, rng);
    builder.build_map(rng);
    (
        builder.get_map(),
        builder.get_starting_position(),
        builder.get_exit_position(),
    )
}
