use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;

use super::{finish_map, nearest_floor, MapBuilder};
use crate::map::{Map, Position, TileType};
use crate::spawner::SpawnTables;
use crate::SettingsError;

/// Tunables for the growing-tree maze.
///
/// The branch bias steers which frontier cell gets carved next: positive
/// values favor the most recently exposed cells and produce long winding
/// corridors, negative values favor old cells and produce dense branching.
#[derive(Copy, Clone, Debug)]
pub struct MazeSettings {
    pub min_branch_bias: i32,
    pub max_branch_bias: i32,
}

impl Default for MazeSettings {
    fn default() -> MazeSettings {
        MazeSettings {
            min_branch_bias: -10,
            max_branch_bias: 10,
        }
    }
}

impl MazeSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.min_branch_bias < -10
            || self.max_branch_bias > 10
            || self.min_branch_bias > self.max_branch_bias
        {
            return Err(SettingsError::BranchBias {
                min: self.min_branch_bias,
                max: self.max_branch_bias,
            });
        }
        Ok(())
    }
}

#[derive(PartialEq, Eq, Copy, Clone)]
enum CellState {
    Unexposed,
    Frontier,
    Carved,
    Hardened,
}

/// Growing-tree maze. Cells move from unexposed to frontier when a carved
/// neighbor touches them; a frontier cell is carved when doing so joins it
/// to exactly one corridor, and hardened into permanent wall otherwise.
pub struct MazeBuilder {
    map: Map,
    starting_position: Position,
    exit_position: Position,
    depth: i32,
    settings: MazeSettings,
    tables: SpawnTables,
}

impl MapBuilder for MazeBuilder {
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

impl MazeBuilder {
    pub fn new(width: i32, height: i32, depth: i32) -> Box<MazeBuilder> {
        MazeBuilder::with_settings(width, height, depth, MazeSettings::default())
    }

    pub fn with_settings(
        width: i32,
        height: i32,
        depth: i32,
        settings: MazeSettings,
    ) -> Box<MazeBuilder> {
        assert!(width > 4 && height > 4, "map too small for a maze");
        if let Err(error) = settings.validate() {
            panic!("{}", error);
        }
        Box::new(MazeBuilder {
            map: Map::new(width, height, depth),
            starting_position: Position { x: 0, y: 0 },
            exit_position: Position { x: 0, y: 0 },
            depth,
            settings,
            tables: SpawnTables::default(),
        })
    }

    fn build(&mut self, rng: &mut RandomNumberGenerator) {
        let bias = rng.range(self.settings.min_branch_bias, self.settings.max_branch_bias + 1);
        let start = Point::new(
            rng.range(1, self.map.width - 1),
            rng.range(1, self.map.height - 1),
        );
        let mut grid = MazeGrid::new(&self.map);
        grid.carve(start.x, start.y, rng);

        let mut frontier: Vec<(i32, i32)> = grid.drain_new_frontier();
        while !frontier.is_empty() {
            let choice = biased_choice(rng, bias, frontier.len());
            let (x, y) = frontier[choice];
            if grid.check(x, y) {
                grid.carve(x, y, rng);
                frontier.extend(grid.drain_new_frontier());
            } else {
                grid.harden(x, y);
            }
            frontier.remove(choice);
        }

        for (idx, state) in grid.cells.iter().enumerate() {
            if *state == CellState::Carved {
                self.map.tiles[idx] = TileType::Floor;
            }
        }

        self.starting_position = nearest_floor(&self.map, start);
        self.exit_position = finish_map(
            &mut self.map,
            self.starting_position,
            self.depth,
            rng,
            &self.tables,
        );
    }
}

struct MazeGrid {
    width: i32,
    height: i32,
    cells: Vec<CellState>,
    new_frontier: Vec<(i32, i32)>,
}

impl MazeGrid {
    fn new(map: &Map) -> MazeGrid {
        MazeGrid {
            width: map.width,
            height: map.height,
            cells: vec![CellState::Unexposed; map.tiles.len()],
            new_frontier: Vec::new(),
        }
    }

    fn state(&self, x: i32, y: i32) -> CellState {
        if x < 0 || x >= self.width || y < 0 || y >= self.height {
            return CellState::Unexposed;
        }
        self.cells[(y * self.width + x) as usize]
    }

    fn carved(&self, x: i32, y: i32) -> bool {
        self.state(x, y) == CellState::Carved
    }

    /// A frontier cell may be carved only when it touches exactly one
    /// corridor and the diagonals on its far side are still wall, which
    /// keeps corridors one tile wide with no open 2x2 pockets.
    fn check(&self, x: i32, y: i32) -> bool {
        let mut edgestate = 0;
        if self.carved(x - 1, y) {
            edgestate += 1;
        }
        if self.carved(x + 1, y) {
            edgestate += 2;
        }
        if self.carved(x, y - 1) {
            edgestate += 4;
        }
        if self.carved(x, y + 1) {
            edgestate += 8;
        }
        match edgestate {
            1 => !self.carved(x + 1, y - 1) && !self.carved(x + 1, y + 1),
            2 => !self.carved(x - 1, y - 1) && !self.carved(x - 1, y + 1),
            4 => !self.carved(x - 1, y + 1) && !self.carved(x + 1, y + 1),
            8 => !self.carved(x - 1, y - 1) && !self.carved(x + 1, y - 1),
            _ => false,
        }
    }

    /// Marks a cell carved and exposes its unexposed interior neighbors in
    /// shuffled order.
    fn carve(&mut self, x: i32, y: i32, rng: &mut RandomNumberGenerator) {
        self.cells[(y * self.width + x) as usize] = CellState::Carved;
        let mut neighbors = [(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)];
        for i in (1..neighbors.len()).rev() {
            let j = rng.range(0, i as i32 + 1) as usize;
            neighbors.swap(i, j);
        }
        for (nx, ny) in neighbors.iter() {
            if *nx < 1 || *nx >= self.width - 1 || *ny < 1 || *ny >= self.height - 1 {
                continue;
            }
            if self.state(*nx, *ny) == CellState::Unexposed {
                self.cells[(ny * self.width + nx) as usize] = CellState::Frontier;
                self.new_frontier.push((*nx, *ny));
            }
        }
    }

    fn harden(&mut self, x: i32, y: i32) {
        self.cells[(y * self.width + x) as usize] = CellState::Hardened;
    }

    fn drain_new_frontier(&mut self) -> Vec<(i32, i32)> {
        std::mem::take(&mut self.new_frontier)
    }
}

/// Maps a uniform draw through a power curve so the bias steers the pick
/// toward the newest or the oldest end of the frontier list.
fn biased_choice(rng: &mut RandomNumberGenerator, bias: i32, len: usize) -> usize {
    let pos = rng.rand::<f64>().powf((-bias as f64).exp());
    ((pos * len as f64) as usize).min(len - 1)
}
