use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Timer;

pub fn to_json<T: Serialize>(obj: &T) -> String {
    serde_json::to_string_pretty(obj).unwrap()
}

pub fn write_json<T: Serialize>(path: &str, obj: &T) -> Result<()> {
    if !path.ends_with(".json") {
        anyhow::bail!("write_json needs {} to end with .json", path);
    }
    if let Some(parent) = std::path::Path::new(path).parent() {
        std::fs::create_dir_all(parent).context("creating parent dir")?;
    }
    let mut file = File::create(path).with_context(|| format!("creating {}", path))?;
    file.write_all(to_json(obj).as_bytes())?;
    Ok(())
}

pub fn read_json<T: DeserializeOwned>(path: &str, timer: &mut Timer) -> Result<T> {
    timer.start(format!("parse {}", path));
    let raw = std::fs::read(path).with_context(|| format!("reading {}", path))?;
    let result = serde_json::from_slice(&raw).with_context(|| format!("parsing {}", path));
    timer.stop(format!("parse {}", path));
    result
}

pub fn write_binary<T: Serialize>(path: &str, obj: &T) -> Result<()> {
    if !path.ends_with(".bin") {
        anyhow::bail!("write_binary needs {} to end with .bin", path);
    }
    if let Some(parent) = std::path::Path::new(path).parent() {
        std::fs::create_dir_all(parent).context("creating parent dir")?;
    }
    let file = BufWriter::new(File::create(path)?);
    bincode::serialize_into(file, obj).context("serializing")
}

pub fn read_binary<T: DeserializeOwned>(path: &str) -> Result<T> {
    let raw = std::fs::read(path).with_context(|| format!("reading {}", path))?;
    bincode::deserialize(&raw).context("deserializing")
}

/// For BTreeMaps with struct keys. See <https://github.com/serde-rs/json/issues/402>.
pub fn serialize_btreemap<S: Serializer, K: Serialize, V: Serialize>(
    map: &BTreeMap<K, V>,
    s: S,
) -> Result<S::Ok, S::Error> {
    map.iter().collect::<Vec<(_, _)>>().serialize(s)
}

pub fn deserialize_btreemap<
    'de,
    D: Deserializer<'de>,
    K: Deserialize<'de> + Ord,
    V: Deserialize<'de>,
>(
    d: D,
) -> Result<BTreeMap<K, V>, D::Error> {
    let vec = <Vec<(K, V)>>::deserialize(d)?;
    let mut map = BTreeMap::new();
    for (k, v) in vec {
        map.insert(k, v);
    }
    Ok(map)
}
