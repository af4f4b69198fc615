use bracket_random::prelude::RandomNumberGenerator;

#[derive(Debug, Clone)]
pub struct RandomEntry {
    name: String,
    weight: i32,
}

impl RandomEntry {
    pub fn new<S: ToString>(name: S, weight: i32) -> RandomEntry {
        RandomEntry {
            name: name.to_string(),
            weight,
        }
    }
}

/// Weighted selection table. Weights are relative, not normalized; an entry
/// is drawn with probability weight / total_weight.
#[derive(Default, Debug, Clone)]
pub struct RandomTable {
    entries: Vec<RandomEntry>,
    total_weight: i32,
}

impl RandomTable {
    pub fn new() -> RandomTable {
        RandomTable {
            entries: Vec::new(),
            total_weight: 0,
        }
    }

    pub fn add<S: ToString>(mut self, name: S, weight: i32) -> RandomTable {
        if weight > 0 {
            self.total_weight += weight;
            self.entries.push(RandomEntry::new(name, weight));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.total_weight == 0
    }

    pub fn roll(&self, rng: &mut RandomNumberGenerator) -> Option<String> {
        if self.total_weight == 0 {
            return None;
        }
        let mut roll = rng.roll_dice(1, self.total_weight) - 1;
        for entry in self.entries.iter() {
            if roll < entry.weight {
                return Some(entry.name.clone());
            }
            roll -= entry.weight;
        }
        None
    }
}
