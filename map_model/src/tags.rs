use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A bag of OSM-style key/value tags, the same loose representation the preprocessor's
/// extraction stage hands to this loader (mirrors how `convert_osm/src/osm.rs` treats a way's
/// tags before specializing any of them into typed fields).
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Tags(pub BTreeMap<String, String>);

impl Tags {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(|s| s.as_str())
    }

    pub fn get_or(&self, key: &str, default: &str) -> String {
        self.get(key).unwrap_or(default).to_string()
    }

    /// Parses a tag as an unsigned integer, returning `None` on missing or malformed values so
    /// the caller can fall back to a documented default.
    pub fn get_usize(&self, key: &str) -> Option<usize> {
        self.get(key)?.trim().parse().ok()
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        // "50 km/h"-style maxspeed tags: take the leading numeric prefix.
        let raw = self.get(key)?.trim();
        let numeric: String = raw
            .chars()
            .take_while(|c| c.is_ascii_digit() || *c == '.')
            .collect();
        numeric.parse().ok()
    }

    pub fn is(&self, key: &str, value: &str) -> bool {
        self.get(key) == Some(value)
    }
}
