use bracket_random::prelude::RandomNumberGenerator;
use serde::{Deserialize, Serialize};

use crate::map::{EntityKind, Map, PlacedEntity};
use crate::random_table::RandomTable;
use crate::SettingsError;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnEntry {
    pub name: String,
    pub weight: i32,
}

impl SpawnEntry {
    pub fn new<S: ToString>(name: S, weight: i32) -> SpawnEntry {
        SpawnEntry {
            name: name.to_string(),
            weight,
        }
    }
}

/// Depth-gated spawn configuration. The count tables are step functions over
/// depth; the chance tables accumulate every pool whose threshold has been
/// reached. All four lists must be sorted by ascending depth threshold.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpawnTables {
    pub max_monsters_by_depth: Vec<(i32, i32)>,
    pub max_items_by_depth: Vec<(i32, i32)>,
    pub monster_chances: Vec<(i32, Vec<SpawnEntry>)>,
    pub item_chances: Vec<(i32, Vec<SpawnEntry>)>,
}

impl Default for SpawnTables {
    /// The shipped game data: goblins from the first floor, orcs growing
    /// more common with depth; potions early, scrolls later.
    fn default() -> SpawnTables {
        SpawnTables {
            max_monsters_by_depth: vec![(1, 2), (4, 3), (6, 5)],
            max_items_by_depth: vec![(1, 1), (4, 2)],
            monster_chances: vec![
                (0, vec![SpawnEntry::new("Goblin", 80)]),
                (3, vec![SpawnEntry::new("Orc", 15)]),
                (5, vec![SpawnEntry::new("Orc", 30)]),
                (7, vec![SpawnEntry::new("Orc", 60)]),
            ],
            item_chances: vec![
                (0, vec![SpawnEntry::new("Health Potion", 35)]),
                (2, vec![SpawnEntry::new("Confusion Scroll", 10)]),
                (4, vec![SpawnEntry::new("Lightning Scroll", 25)]),
                (6, vec![SpawnEntry::new("Fireball Scroll", 25)]),
            ],
        }
    }
}

impl SpawnTables {
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_ascending(self.max_monsters_by_depth.iter().map(|e| e.0))?;
        check_ascending(self.max_items_by_depth.iter().map(|e| e.0))?;
        check_ascending(self.monster_chances.iter().map(|e| e.0))?;
        check_ascending(self.item_chances.iter().map(|e| e.0))?;
        for entry in self
            .monster_chances
            .iter()
            .chain(self.item_chances.iter())
            .flat_map(|(_, pool)| pool.iter())
        {
            if entry.weight < 0 {
                return Err(SettingsError::NegativeWeight {
                    name: entry.name.clone(),
                    weight: entry.weight,
                });
            }
        }
        Ok(())
    }

    pub fn assert_valid(&self) {
        if let Err(e) = self.validate() {
            panic!("invalid spawn tables: {}", e);
        }
    }

    pub fn max_monsters(&self, depth: i32) -> i32 {
        max_for_depth(&self.max_monsters_by_depth, depth)
    }

    pub fn max_items(&self, depth: i32) -> i32 {
        max_for_depth(&self.max_items_by_depth, depth)
    }

    pub fn monster_pool(&self, depth: i32) -> RandomTable {
        pool_for_depth(&self.monster_chances, depth)
    }

    pub fn item_pool(&self, depth: i32) -> RandomTable {
        pool_for_depth(&self.item_chances, depth)
    }
}

fn check_ascending<I: Iterator<Item = i32>>(mut keys: I) -> Result<(), SettingsError> {
    let mut prev = match keys.next() {
        Some(k) => k,
        None => return Ok(()),
    };
    for key in keys {
        if key < prev {
            return Err(SettingsError::TableOrder { prev, next: key });
        }
        prev = key;
    }
    Ok(())
}

/// Step function: the value of the last entry whose threshold is at or below
/// `depth`, or 0 when none qualifies.
fn max_for_depth(table: &[(i32, i32)], depth: i32) -> i32 {
    let mut value = 0;
    for (min_depth, max) in table.iter() {
        if *min_depth > depth {
            break;
        }
        value = *max;
    }
    value
}

// The ascending traversal with early break is load-bearing: pools past the
// query depth must never contribute entries.
fn pool_for_depth(table: &[(i32, Vec<SpawnEntry>)], depth: i32) -> RandomTable {
    let mut pool = RandomTable::new();
    for (min_depth, entries) in table.iter() {
        if *min_depth > depth {
            break;
        }
        for entry in entries.iter() {
            pool = pool.add(&entry.name, entry.weight);
        }
    }
    pool
}

/// Fills a region with stuff. Draws an independent uniform count in
/// [0, max] for monsters and for items, then places each draw on a random
/// cell of the region. A cell that already holds an entity silently loses
/// the spawn — no retry; the occasional collision just thins density.
pub fn place_entities(
    region: &[usize],
    map: &mut Map,
    depth: i32,
    rng: &mut RandomNumberGenerator,
    tables: &SpawnTables,
) {
    if region.is_empty() {
        return;
    }
    let number_monsters = rng.range(0, tables.max_monsters(depth) + 1);
    let number_items = rng.range(0, tables.max_items(depth) + 1);

    let monster_pool = tables.monster_pool(depth);
    for _ in 0..number_monsters {
        spawn_one(region, map, rng, &monster_pool, EntityKind::Monster);
    }

    let item_pool = tables.item_pool(depth);
    for _ in 0..number_items {
        spawn_one(region, map, rng, &item_pool, EntityKind::Item);
    }
}

fn spawn_one(
    region: &[usize],
    map: &mut Map,
    rng: &mut RandomNumberGenerator,
    pool: &RandomTable,
    kind: EntityKind,
) {
    let slot = (rng.roll_dice(1, region.len() as i32) - 1) as usize;
    let (x, y) = map.idx_xy(region[slot]);
    if map.is_occupied(x, y) {
        return;
    }
    if let Some(name) = pool.roll(rng) {
        map.entities.push(PlacedEntity { x, y, name, kind });
    }
}
