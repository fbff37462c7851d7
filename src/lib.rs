//! Navigation core for a first-generation-style overworld: per-map weighted
//! A*, cross-map region routing, trainer line-of-sight, and the tile-weight
//! policies that tie them together.
//!
//! ```no_run
//! use fnv::FnvHashSet;
//! use redroute::{find_path, Coordinate, JsonFileMapSource, MapCache, MapId};
//!
//! let cache = MapCache::new(JsonFileMapSource::new("data/maps"));
//! let from = Coordinate::new("PALLETTOWN", 5, 5);
//! let plan = find_path(
//!     &cache,
//!     &from,
//!     &MapId::new("VIRIDIANCITY"),
//!     None,
//!     &["CUT"],
//!     true,
//!     true,
//!     &FnvHashSet::default(),
//! );
//! ```

pub mod astar;
pub mod coordinate;
pub mod hm;
pub mod knowledge;
pub mod map_graph;
pub mod region;
pub mod tile;
pub mod vision;

pub use astar::SegmentPlan;
pub use coordinate::{Coordinate, MapId};
pub use hm::{Hm, HmSet};
pub use knowledge::{
    BorderSide, ConnectionDescriptor, JsonFileMapSource, LoadError, MapCache, MapDataSource,
    MapDescriptor, TeleportDescriptor, TrainerDescriptor,
};
pub use map_graph::{Connection, MapGraph, Step, Teleport};
pub use region::{MapTransition, RegionRouter, RoutePlan, TransitionKind, DEFAULT_MAX_ITERATIONS};
pub use tile::{Direction, TileClass, WeightPolicy};
pub use vision::{Facing, Npc, VisionField};

use fnv::FnvHashSet;

/// High-level entry point translating the two preferences most callers want
/// — avoid grass, avoid trainer sight — into a `WeightPolicy`, then
/// delegating to `RegionRouter`. Anything more specific (grinding presets,
/// speed-running, a hand-tuned policy) should build a `WeightPolicy` and call
/// `RegionRouter::find_path` directly instead of going through here.
#[allow(clippy::too_many_arguments)]
pub fn find_path(
    cache: &MapCache,
    from: &Coordinate,
    to_map: &MapId,
    to: Option<(u32, u32)>,
    hms_available: &[&str],
    avoid_grass: bool,
    avoid_trainers: bool,
    defeated_trainers: &FnvHashSet<String>,
) -> Result<RoutePlan, LoadError> {
    let hms = HmSet::from_names(hms_available.iter().copied());

    let mut policy = WeightPolicy::default();
    if avoid_grass {
        policy.grass = 5.0;
    }
    policy.vision_projected = if avoid_trainers { 100.0 } else { 1.0 };

    let router = RegionRouter::new(cache);
    router.find_path(
        from,
        to_map,
        to,
        hms,
        &policy,
        defeated_trainers,
        DEFAULT_MAX_ITERATIONS,
    )
}
