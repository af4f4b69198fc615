use bracket_geometry::prelude::Point;
use bracket_random::prelude::RandomNumberGenerator;

use super::cellular::run_automaton;
use super::{finish_map, nearest_floor, tunnel_between, MapBuilder};
use crate::map::{Map, Position, TileType};
use crate::spawner::SpawnTables;

/// Chambered caves: the same automaton as [`CellularAutomataBuilder`], but
/// instead of discarding the smaller cave pockets it chains every chamber to
/// the next by a tunnel between their centroids.
///
/// [`CellularAutomataBuilder`]: super::CellularAutomataBuilder
pub struct EvilCellularBuilder {
    map: Map,
    starting_position: Position,
    exit_position: Position,
    depth: i32,
    tables: SpawnTables,
}

impl MapBuilder for EvilCellularBuilder {
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

impl EvilCellularBuilder {
    pub fn new(width: i32, height: i32, depth: i32) -> Box<EvilCellularBuilder> {
        assert!(width > 6 && height > 6, "map too small for the automaton");
        Box::new(EvilCellularBuilder {
            map: Map::new(width, height, depth),
            starting_position: Position { x: 0, y: 0 },
            exit_position: Position { x: 0, y: 0 },
            depth,
            tables: SpawnTables::default(),
        })
    }

    fn build(&mut self, rng: &mut RandomNumberGenerator) {
        run_automaton(&mut self.map, rng);

        let components = floor_components(&self.map);
        let centroids: Vec<Point> = components.iter().map(|c| centroid(&self.map, c)).collect();
        log::debug!("joining {} cave chambers", centroids.len());
        for pair in centroids.windows(2) {
            tunnel_between(&mut self.map, rng, pair[0], pair[1]);
        }

        self.starting_position = nearest_floor(&self.map, centroids[0]);
        self.exit_position = finish_map(
            &mut self.map,
            self.starting_position,
            self.depth,
            rng,
            &self.tables,
        );
    }
}

/// Connected floor chambers in row-major discovery order, 4-connected.
fn floor_components(map: &Map) -> Vec<Vec<usize>> {
    let mut visited = vec![false; map.tiles.len()];
    let mut components = Vec::new();
    for start in 0..map.tiles.len() {
        if visited[start] || map.tiles[start] != TileType::Floor {
            continue;
        }
        let mut component = Vec::new();
        let mut stack = vec![start];
        visited[start] = true;
        while let Some(idx) = stack.pop() {
            component.push(idx);
            let (x, y) = map.idx_xy(idx);
            for (nx, ny) in &[(x - 1, y), (x + 1, y), (x, y - 1), (x, y + 1)] {
                if *nx < 0 || *nx >= map.width || *ny < 0 || *ny >= map.height {
                    continue;
                }
                let nidx = map.xy_idx(*nx, *ny);
                if !visited[nidx] && map.tiles[nidx] == TileType::Floor {
                    visited[nidx] = true;
                    stack.push(nidx);
                }
            }
        }
        components.push(component);
    }
    components
}

fn centroid(map: &Map, component: &[usize]) -> Point {
    let mut sum_x = 0;
    let mut sum_y = 0;
    for idx in component.iter() {
        let (x, y) = map.idx_xy(*idx);
        sum_x += x;
        sum_y += y;
    }
    let n = component.len() as i32;
    Point::new(sum_x / n, sum_y / n)
}
