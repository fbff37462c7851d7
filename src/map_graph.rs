//! A single map's navigable surface: tiles, borders, teleports, and NPCs.

use log::{debug, warn};

use crate::coordinate::MapId;
use crate::hm::{Hm, HmSet};
use crate::knowledge::{BorderSide, MapDescriptor};
use crate::tile::{self, Direction, TileClass, WeightPolicy};
use crate::vision::{Npc, VisionField};

/// A connection from this map's border to an adjacent one, with the
/// lateral offset applied when crossing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Connection {
    pub side: BorderSide,
    pub map_id: MapId,
    pub offset: i32,
}

/// A point warp to another map.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Teleport {
    pub x: u32,
    pub y: u32,
    pub destination_map: MapId,
    pub destination_teleport_id: Option<String>,
}

/// One reachable neighbor of a tile, as produced by `MapGraph::neighbors`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Step {
    pub to: (u32, u32),
    pub cost: f64,
    pub direction: Direction,
    pub requires_hm: Option<Hm>,
}

/// Immutable once built. Loaded lazily by `knowledge::MapCache` and shared
/// behind an `Arc` across every route search that touches this map.
pub struct MapGraph {
    map_id: MapId,
    width: u32,
    height: u32,
    tiles: Option<Vec<Vec<TileClass>>>,
    connections: Vec<Connection>,
    teleports: Vec<Teleport>,
    npcs: Vec<Npc>,
}

impl MapGraph {
    pub fn from_descriptor(descriptor: MapDescriptor) -> MapGraph {
        let map_id = MapId::new(&descriptor.map_id);

        let connections: Vec<Connection> = descriptor
            .connections
            .iter()
            .filter_map(|(side, conn)| {
                let side = match side.to_ascii_uppercase().as_str() {
                    "NORTH" => BorderSide::North,
                    "SOUTH" => BorderSide::South,
                    "EAST" => BorderSide::East,
                    "WEST" => BorderSide::West,
                    _ => return None,
                };
                Some(Connection {
                    side,
                    map_id: MapId::new(&conn.map),
                    offset: conn.offset,
                })
            })
            .collect();

        let teleports: Vec<Teleport> = descriptor
            .teleports
            .iter()
            .map(|t| Teleport {
                x: t.x,
                y: t.y,
                destination_map: MapId::new(&t.destination_map),
                destination_teleport_id: t.destination_teleport_id.clone(),
            })
            .collect();

        let npcs: Vec<Npc> = descriptor
            .trainers
            .iter()
            .enumerate()
            .map(|(i, t)| Npc {
                npc_id: t.id_or_index(i),
                x: t.x,
                y: t.y,
                facing: t.facing(),
                vision_range: t.vision_range.unwrap_or(crate::vision::DEFAULT_VISION_RANGE),
            })
            .collect();

        if descriptor.tiles.is_none() {
            warn!(
                "map {} has no per-coordinate tile grid; falling back to permissive walkable terrain",
                map_id
            );
        }

        debug!(
            "loaded map {} ({}x{}), {} connections, {} teleports, {} npcs",
            map_id,
            descriptor.width,
            descriptor.height,
            connections.len(),
            teleports.len(),
            npcs.len()
        );

        MapGraph {
            map_id,
            width: descriptor.width,
            height: descriptor.height,
            tiles: descriptor.tiles,
            connections,
            teleports,
            npcs,
        }
    }

    pub fn map_id(&self) -> &MapId {
        &self.map_id
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn npcs(&self) -> &[Npc] {
        &self.npcs
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn connection(&self, side: BorderSide) -> Option<&Connection> {
        self.connections.iter().find(|c| c.side == side)
    }

    pub fn connection_from(&self, map_id: &MapId) -> Option<&Connection> {
        self.connections.iter().find(|c| &c.map_id == map_id)
    }

    pub fn teleports(&self) -> &[Teleport] {
        &self.teleports
    }

    pub fn teleport_at(&self, x: u32, y: u32) -> Option<&Teleport> {
        self.teleports.iter().find(|t| t.x == x && t.y == y)
    }

    pub fn in_bounds(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    /// Which border, if any, an out-of-bounds step falls off.
    pub fn border_crossed(&self, x: i64, y: i64) -> Option<BorderSide> {
        if y < 0 {
            Some(BorderSide::North)
        } else if y >= self.height as i64 {
            Some(BorderSide::South)
        } else if x < 0 {
            Some(BorderSide::West)
        } else if x >= self.width as i64 {
            Some(BorderSide::East)
        } else {
            None
        }
    }

    /// The base tile class at `(x, y)`, ignoring vision projection. Falls
    /// back to `Walkable` for every in-bounds tile when no class grid was
    /// supplied (the permissive default — see `MapGraph::from_descriptor`'s
    /// warning).
    pub fn base_class(&self, x: u32, y: u32) -> TileClass {
        if !self.in_bounds(x, y) {
            return TileClass::Blocked;
        }
        match &self.tiles {
            Some(grid) => grid
                .get(y as usize)
                .and_then(|row| row.get(x as usize))
                .copied()
                .unwrap_or(TileClass::Blocked),
            None => TileClass::Walkable,
        }
    }

    /// The effective tile class at `(x, y)` once an active vision field is
    /// laid over the base terrain. Vision only overlays ordinary ground
    /// (`Walkable`/`Grass`) — it never changes the meaning of an obstacle,
    /// ledge, or teleport tile.
    pub fn effective_class(&self, x: u32, y: u32, vision: &VisionField) -> TileClass {
        let base = self.base_class(x, y);
        if vision.contains(x, y) && matches!(base, TileClass::Walkable | TileClass::Grass) {
            TileClass::VisionProjected
        } else {
            base
        }
    }

    /// Enumerate the reachable neighbors of `(x, y)` under the given HM set,
    /// weight policy, and active vision field. Border-crossing is not
    /// represented here — that is the region router's job (`region.rs`),
    /// operating one map at a time.
    pub fn neighbors(
        &self,
        x: u32,
        y: u32,
        hms: HmSet,
        policy: &WeightPolicy,
        vision: &VisionField,
    ) -> Vec<Step> {
        let mut steps = Vec::with_capacity(4);
        for direction in [Direction::Up, Direction::Down, Direction::Left, Direction::Right] {
            let (dx, dy) = direction.delta();
            let nx = x as i64 + dx as i64;
            let ny = y as i64 + dy as i64;
            if nx < 0 || ny < 0 || nx >= self.width as i64 || ny >= self.height as i64 {
                continue;
            }
            let (nx, ny) = (nx as u32, ny as u32);
            let class = self.effective_class(nx, ny, vision);
            let Some(cost) = tile::weight(class, hms, policy, direction) else {
                continue;
            };
            let requires_hm = match class {
                TileClass::Water => Some(Hm::Surf),
                TileClass::CutObstacle => Some(Hm::Cut),
                TileClass::PushObstacle => Some(Hm::Strength),
                _ => None,
            };
            steps.push(Step {
                to: (nx, ny),
                cost,
                direction,
                requires_hm,
            });
        }
        steps
    }

    /// Active vision field for every NPC not in `defeated`.
    pub fn vision_field(&self, defeated: &fnv::FnvHashSet<String>) -> VisionField {
        crate::vision::project_all(&self.npcs, defeated, self.width, self.height, |x, y| {
            matches!(
                self.base_class(x, y),
                TileClass::Blocked | TileClass::CutObstacle | TileClass::PushObstacle
            )
        })
    }

    /// Border-midpoint fallback exit tile for a given side, used by the
    /// region router when no teleport applies. Approximate by design (see
    /// `DESIGN.md`'s Open Question decisions): a richer descriptor could
    /// carry an explicit crossable span per connection instead.
    pub fn border_midpoint(&self, side: BorderSide) -> (u32, u32) {
        match side {
            BorderSide::North => (self.width / 2, 0),
            BorderSide::South => (self.width / 2, self.height.saturating_sub(1)),
            BorderSide::West => (0, self.height / 2),
            BorderSide::East => (self.width.saturating_sub(1), self.height / 2),
        }
    }
}
