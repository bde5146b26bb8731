use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// A settings-style document, the typical payload of a local key-value store
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Preferences {
    pub theme: String,
    pub font_size: u8,
    pub recent_files: Vec<String>,
}

impl Preferences {
    pub fn sample(seed: u64) -> Self {
        Self {
            theme: ["dark", "light"][(seed % 2) as usize].to_string(),
            font_size: 10 + (seed % 8) as u8,
            recent_files: (0..3).map(|i| format!("doc-{}-{}.md", seed, i)).collect(),
        }
    }
}

/// Local keys (no namespace prefix) for a key space of `num_keys` entries
pub struct KeySpace {
    keys: Vec<String>,
}

impl KeySpace {
    pub fn new(num_keys: usize) -> Self {
        Self {
            keys: (0..num_keys).map(|i| format!("prefs-{}", i)).collect(),
        }
    }

    pub fn all(&self) -> &[String] {
        &self.keys
    }

    /// `count` keys drawn uniformly from the key space, repeats allowed
    pub fn lookups(&self, count: usize) -> Vec<String> {
        let mut rng = rand::thread_rng();
        (0..count)
            .filter_map(|_| self.keys.choose(&mut rng).cloned())
            .collect()
    }

    /// One key that was never written
    pub fn missing(&self) -> String {
        format!("absent-{}", rand::thread_rng().gen_range(0..u32::MAX))
    }
}
