//! Map descriptors, the pluggable data source trait, and the shared map cache.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use fnv::FnvHashMap;
use serde::{Deserialize, Serialize};

use crate::coordinate::MapId;
use crate::map_graph::MapGraph;
use crate::tile::TileClass;
use crate::vision::Facing;

/// One side of a map's border, used both for connection lookups and for
/// the region router's exit/entry heuristic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BorderSide {
    North,
    South,
    East,
    West,
}

impl BorderSide {
    pub fn opposite(self) -> BorderSide {
        match self {
            BorderSide::North => BorderSide::South,
            BorderSide::South => BorderSide::North,
            BorderSide::East => BorderSide::West,
            BorderSide::West => BorderSide::East,
        }
    }
}

/// A connection from one map's border to an adjacent map, with a lateral
/// offset applied when crossing (the two maps need not be pixel-aligned).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectionDescriptor {
    pub map: String,
    #[serde(default)]
    pub offset: i32,
}

/// A point warp: stepping on `(x, y)` instantly relocates the party to
/// `destination_map`, optionally at a named anchor on that map.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TeleportDescriptor {
    pub x: u32,
    pub y: u32,
    pub destination_map: String,
    #[serde(default)]
    pub destination_teleport_id: Option<String>,
}

/// Raw trainer data as it appears in a map descriptor, before being turned
/// into a `vision::Npc`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainerDescriptor {
    #[serde(default)]
    pub trainer_id: Option<String>,
    pub x: u32,
    pub y: u32,
    #[serde(default)]
    pub facing: Option<String>,
    #[serde(default)]
    pub vision_range: Option<u32>,
    #[serde(default)]
    pub class: Option<String>,
    #[serde(default)]
    pub team_index: Option<u32>,
}

impl TrainerDescriptor {
    /// Normalize into a facing, defaulting unrecognised or absent values to
    /// `Down`, same as the original's `Trainer.from_dict`.
    pub fn facing(&self) -> Facing {
        match self.facing.as_deref().map(str::to_ascii_uppercase).as_deref() {
            Some("UP") => Facing::Up,
            Some("LEFT") => Facing::Left,
            Some("RIGHT") => Facing::Right,
            _ => Facing::Down,
        }
    }

    pub fn id_or_index(&self, index: usize) -> String {
        self.trainer_id
            .clone()
            .unwrap_or_else(|| format!("trainer_{index}"))
    }
}

/// The complete wire shape for a single map, as loaded from a `MapDataSource`.
///
/// `tiles` is the optional per-coordinate class grid (row-major, `tiles[y][x]`).
/// When absent, `map_graph.rs` falls back to treating every in-bounds tile as
/// `Walkable` (aside from active vision projection) and logs a warning once —
/// this is a deliberate permissive default, not silently-assumed strictness.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MapDescriptor {
    pub map_id: String,
    pub width: u32,
    pub height: u32,
    #[serde(default)]
    pub tileset: Option<String>,
    #[serde(default)]
    pub tiles: Option<Vec<Vec<TileClass>>>,
    /// Keyed by cardinal direction name. A `BTreeMap` rather than a
    /// `std::collections::HashMap` — iteration order must be deterministic
    /// across processes so `MapGraph::from_descriptor`'s `connections` Vec,
    /// and therefore the region router's BFS neighbour ordering (spec.md
    /// §4.6), is reproducible (spec.md §6, §8 property 1).
    #[serde(default)]
    pub connections: BTreeMap<String, ConnectionDescriptor>,
    #[serde(default)]
    pub teleports: Vec<TeleportDescriptor>,
    #[serde(default)]
    pub trainers: Vec<TrainerDescriptor>,
}

/// Failure modes when acquiring a map descriptor. Distinct from search
/// outcomes (which are plain return values per spec.md §7) because I/O and
/// malformed data are not something a route search can recover from by
/// trying another weight policy.
#[derive(Debug)]
pub enum LoadError {
    Io(String),
    Parse(String),
    Canonicalisation(String),
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::Io(msg) => write!(f, "failed to read map data: {msg}"),
            LoadError::Parse(msg) => write!(f, "failed to parse map descriptor: {msg}"),
            LoadError::Canonicalisation(msg) => write!(f, "malformed map id: {msg}"),
        }
    }
}

impl std::error::Error for LoadError {}

/// Abstraction over wherever map descriptors actually live. The navigation
/// core never assumes a filesystem; callers (tests, the real emulator-facing
/// binary) provide their own source.
pub trait MapDataSource: Send + Sync {
    fn load(&self, map_id: &MapId) -> Result<MapDescriptor, LoadError>;
}

/// The default source: one JSON file per map, named after the canonical
/// map id, under a root directory.
pub struct JsonFileMapSource {
    root: std::path::PathBuf,
}

impl JsonFileMapSource {
    pub fn new(root: impl Into<std::path::PathBuf>) -> JsonFileMapSource {
        JsonFileMapSource { root: root.into() }
    }
}

impl MapDataSource for JsonFileMapSource {
    fn load(&self, map_id: &MapId) -> Result<MapDescriptor, LoadError> {
        let path = self.root.join(format!("{}.json", map_id.as_str()));
        let contents =
            std::fs::read_to_string(&path).map_err(|e| LoadError::Io(format!("{path:?}: {e}")))?;
        serde_json::from_str(&contents).map_err(|e| LoadError::Parse(e.to_string()))
    }
}

/// Single-writer-on-miss, many-readers cache of loaded `MapGraph`s.
///
/// Once a `MapGraph` is inserted it is never mutated — callers share it
/// through an `Arc`, so concurrent route searches against the same map never
/// race, and two threads racing to load the same missing map both do the
/// work but only one insertion wins (the loser's result is simply dropped in
/// favor of what is already cached).
pub struct MapCache {
    source: Box<dyn MapDataSource>,
    graphs: RwLock<FnvHashMap<MapId, Arc<MapGraph>>>,
}

impl MapCache {
    pub fn new(source: impl MapDataSource + 'static) -> MapCache {
        MapCache {
            source: Box::new(source),
            graphs: RwLock::new(FnvHashMap::default()),
        }
    }

    pub fn get(&self, map_id: &MapId) -> Result<Arc<MapGraph>, LoadError> {
        if let Some(graph) = self.graphs.read().unwrap().get(map_id) {
            return Ok(Arc::clone(graph));
        }

        let descriptor = self.source.load(map_id)?;
        let graph = Arc::new(MapGraph::from_descriptor(descriptor));

        let mut writer = self.graphs.write().unwrap();
        let entry = writer.entry(map_id.clone()).or_insert_with(|| Arc::clone(&graph));
        Ok(Arc::clone(entry))
    }
}
