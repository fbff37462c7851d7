//! Cross-map routing: a BFS over the region graph of maps, stitched together
//! by a per-map A* search for each hop.

use std::collections::VecDeque;

use fnv::FnvHashSet;
use log::{debug, trace};

use crate::astar::{self, SegmentPlan};
use crate::coordinate::{Coordinate, MapId};
use crate::hm::{Hm, HmSet};
use crate::knowledge::{BorderSide, LoadError, MapCache};
use crate::map_graph::MapGraph;
use crate::tile::WeightPolicy;

/// How a `MapTransition` was made.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransitionKind {
    Warp,
    Connection,
}

/// One hop from one map to the next, recording where the party left the
/// first map and arrived on the second.
#[derive(Clone, Debug, PartialEq)]
pub struct MapTransition {
    pub from_map: MapId,
    pub from_pos: (u32, u32),
    pub to_map: MapId,
    pub to_pos: (u32, u32),
    pub kind: TransitionKind,
}

/// The full result of a (possibly multi-map) route request. On failure,
/// `segments`/`maps_traversed` still carry whatever prefix of the route was
/// successfully planned before the break, so a caller can see how far
/// routing got.
#[derive(Clone, Debug, PartialEq, Default)]
pub struct RoutePlan {
    pub success: bool,
    pub segments: Vec<SegmentPlan>,
    pub maps_traversed: Vec<MapId>,
    pub total_moves: usize,
    pub hms_required: Vec<Hm>,
    pub transitions: Vec<MapTransition>,
}

impl RoutePlan {
    fn partial_failure(segments: Vec<SegmentPlan>, maps_traversed: Vec<MapId>) -> RoutePlan {
        RoutePlan {
            success: false,
            segments,
            maps_traversed,
            ..RoutePlan::default()
        }
    }
}

/// Default search budget per map segment, mirroring `astar::astar`'s own
/// default in the source material.
pub const DEFAULT_MAX_ITERATIONS: usize = 10_000;

pub struct RegionRouter<'a> {
    cache: &'a MapCache,
}

impl<'a> RegionRouter<'a> {
    pub fn new(cache: &'a MapCache) -> RegionRouter<'a> {
        RegionRouter { cache }
    }

    /// Route from `from` to `to_map`, optionally to a specific tile on that
    /// map (falling back to the map's center when not given).
    #[allow(clippy::too_many_arguments)]
    pub fn find_path(
        &self,
        from: &Coordinate,
        to_map: &MapId,
        to: Option<(u32, u32)>,
        hms: HmSet,
        policy: &WeightPolicy,
        defeated: &FnvHashSet<String>,
        max_iterations: usize,
    ) -> Result<RoutePlan, LoadError> {
        if from.map_id == *to_map {
            let graph = self.cache.get(&from.map_id)?;
            let (gx, gy) = to.unwrap_or((from.x, from.y));
            return Ok(self.single_map_path(&graph, (from.x, from.y), (gx, gy), hms, policy, defeated, max_iterations));
        }

        let sequence = self.find_map_sequence(&from.map_id, to_map)?;
        let Some(sequence) = sequence else {
            return Ok(RoutePlan::partial_failure(Vec::new(), vec![from.map_id.clone()]));
        };
        debug!(
            "route from {} to {}: map sequence {:?}",
            from.map_id,
            to_map,
            sequence.iter().map(MapId::as_str).collect::<Vec<_>>()
        );

        self.build_multi_map_path(&sequence, (from.x, from.y), to, hms, policy, defeated, max_iterations)
    }

    fn single_map_path(
        &self,
        graph: &MapGraph,
        start: (u32, u32),
        goal: (u32, u32),
        hms: HmSet,
        policy: &WeightPolicy,
        defeated: &FnvHashSet<String>,
        max_iterations: usize,
    ) -> RoutePlan {
        let vision = graph.vision_field(defeated);
        let segment = astar::astar(graph, start, goal, hms, policy, &vision, max_iterations);
        if !segment.success {
            return RoutePlan::partial_failure(Vec::new(), Vec::new());
        }
        RoutePlan {
            success: true,
            total_moves: segment.moves.len(),
            hms_required: segment.hms_required.clone(),
            maps_traversed: vec![graph.map_id().clone()],
            segments: vec![segment],
            transitions: Vec::new(),
        }
    }

    /// BFS over the region graph (nodes = maps, edges = connections ∪
    /// teleports) to find a sequence of maps from `from` to `to`. Returns
    /// `Ok(None)` when no sequence exists (not a load failure — a
    /// legitimately disconnected region).
    fn find_map_sequence(
        &self,
        from: &MapId,
        to: &MapId,
    ) -> Result<Option<Vec<MapId>>, LoadError> {
        let mut queue: VecDeque<Vec<MapId>> = VecDeque::new();
        queue.push_back(vec![from.clone()]);
        let mut visited: FnvHashSet<MapId> = FnvHashSet::default();
        visited.insert(from.clone());

        while let Some(path) = queue.pop_front() {
            let current = path.last().unwrap().clone();
            if current == *to {
                return Ok(Some(path));
            }

            let graph = match self.cache.get(&current) {
                Ok(graph) => graph,
                Err(err) => {
                    if current == *from {
                        return Err(err);
                    }
                    trace!("skipping unreachable-load map {current}: {err}");
                    continue;
                }
            };

            let mut connected: Vec<MapId> = Vec::new();
            for connection in graph.connections() {
                connected.push(connection.map_id.clone());
            }
            for teleport in graph.teleports() {
                connected.push(teleport.destination_map.clone());
            }

            for next in connected {
                if visited.insert(next.clone()) {
                    let mut next_path = path.clone();
                    next_path.push(next);
                    queue.push_back(next_path);
                }
            }
        }

        Ok(None)
    }

    #[allow(clippy::too_many_arguments)]
    fn build_multi_map_path(
        &self,
        sequence: &[MapId],
        from: (u32, u32),
        to: Option<(u32, u32)>,
        hms: HmSet,
        policy: &WeightPolicy,
        defeated: &FnvHashSet<String>,
        max_iterations: usize,
    ) -> Result<RoutePlan, LoadError> {
        let mut segments = Vec::new();
        let mut transitions = Vec::new();
        let mut all_hms: FnvHashSet<Hm> = FnvHashSet::default();
        let mut total_moves = 0usize;
        let mut current = from;

        for (i, map_id) in sequence.iter().enumerate() {
            let graph = self.cache.get(map_id)?;
            let vision = graph.vision_field(defeated);
            let is_last = i == sequence.len() - 1;

            let exit = if is_last {
                None
            } else {
                self.find_exit_to(&graph, &sequence[i + 1])
            };

            let goal = if is_last {
                to.unwrap_or((graph.width() / 2, graph.height() / 2))
            } else {
                match &exit {
                    Some(exit) => exit.position,
                    None => {
                        return Ok(RoutePlan::partial_failure(
                            segments,
                            sequence[..=i].to_vec(),
                        ))
                    }
                }
            };

            trace!("segment {}: {} {:?} -> {:?}", i, map_id, current, goal);
            let segment = astar::astar(&graph, current, goal, hms, policy, &vision, max_iterations);
            if !segment.success {
                return Ok(RoutePlan::partial_failure(segments, sequence[..=i].to_vec()));
            }

            total_moves += segment.moves.len();
            all_hms.extend(segment.hms_required.iter().copied());
            segments.push(segment);

            if let Some(exit) = exit {
                let next_map = &sequence[i + 1];
                let next_graph = self.cache.get(next_map)?;
                let entry = self.find_entry_from(
                    &next_graph,
                    map_id,
                    goal,
                    exit.kind,
                    exit.destination_teleport_id.as_deref(),
                );
                transitions.push(MapTransition {
                    from_map: map_id.clone(),
                    from_pos: goal,
                    to_map: next_map.clone(),
                    to_pos: entry,
                    kind: exit.kind,
                });
                current = entry;
            }
        }

        Ok(RoutePlan {
            success: true,
            segments,
            maps_traversed: sequence.to_vec(),
            total_moves,
            hms_required: all_hms.into_iter().collect(),
            transitions,
        })
    }

    /// Where to exit `graph` in order to reach `target_map`: a teleport
    /// landing there if one exists, otherwise the border-midpoint of the
    /// connection facing it.
    fn find_exit_to(&self, graph: &MapGraph, target_map: &MapId) -> Option<ExitInfo> {
        if let Some(teleport) = graph
            .teleports()
            .iter()
            .find(|t| t.destination_map == *target_map)
        {
            return Some(ExitInfo {
                position: (teleport.x, teleport.y),
                kind: TransitionKind::Warp,
                destination_teleport_id: teleport.destination_teleport_id.clone(),
            });
        }

        graph
            .connections()
            .iter()
            .find(|c| c.map_id == *target_map)
            .map(|c| ExitInfo {
                position: graph.border_midpoint(c.side),
                kind: TransitionKind::Connection,
                destination_teleport_id: None,
            })
    }

    /// Where to enter `graph` (the next map) given the exit position and
    /// transition kind on the map just left.
    ///
    /// For a warp, spec.md §4.6 step 3 is explicit: "the entry is the
    /// destination teleport's position" — `destination_teleport_id` indexes
    /// into `graph.teleports()` (spec.md §6's `destination_warp_id`). Falls
    /// back to the map's center only if the id is absent or doesn't resolve.
    /// For a connection, the entry is derived from the exit coordinate and
    /// the stored offset, clamped into bounds.
    fn find_entry_from(
        &self,
        graph: &MapGraph,
        from_map: &MapId,
        exit_pos: (u32, u32),
        kind: TransitionKind,
        destination_teleport_id: Option<&str>,
    ) -> (u32, u32) {
        if kind == TransitionKind::Warp {
            return destination_teleport_id
                .and_then(|id| id.parse::<usize>().ok())
                .and_then(|index| graph.teleports().get(index))
                .map(|t| (t.x, t.y))
                .unwrap_or((graph.width() / 2, graph.height() / 2));
        }

        let Some(connection) = graph.connection_from(from_map) else {
            return (graph.width() / 2, graph.height() / 2);
        };

        let (exit_x, exit_y) = exit_pos;
        let offset = connection.offset as i64;
        let clamp_x = |v: i64| v.clamp(0, graph.width().saturating_sub(1) as i64) as u32;
        let clamp_y = |v: i64| v.clamp(0, graph.height().saturating_sub(1) as i64) as u32;

        match connection.side {
            BorderSide::North => (clamp_x(exit_x as i64 + offset), graph.height().saturating_sub(1)),
            BorderSide::South => (clamp_x(exit_x as i64 + offset), 0),
            BorderSide::East => (0, clamp_y(exit_y as i64 + offset)),
            BorderSide::West => (graph.width().saturating_sub(1), clamp_y(exit_y as i64 + offset)),
        }
    }
}

/// Where a single map must be exited to continue toward a given next map,
/// and what's needed to resolve the corresponding entry coordinate on the
/// other side.
struct ExitInfo {
    position: (u32, u32),
    kind: TransitionKind,
    destination_teleport_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::{ConnectionDescriptor, JsonFileMapSource, MapDataSource, MapDescriptor};
    use std::collections::BTreeMap;

    struct TwoMapSource;
    impl MapDataSource for TwoMapSource {
        fn load(&self, map_id: &MapId) -> Result<MapDescriptor, LoadError> {
            match map_id.as_str() {
                "A" => {
                    let mut connections = BTreeMap::new();
                    connections.insert(
                        "EAST".to_string(),
                        ConnectionDescriptor {
                            map: "B".to_string(),
                            offset: 0,
                        },
                    );
                    Ok(MapDescriptor {
                        map_id: "A".to_string(),
                        width: 5,
                        height: 5,
                        tileset: None,
                        tiles: None,
                        connections,
                        teleports: Vec::new(),
                        trainers: Vec::new(),
                    })
                }
                "B" => {
                    let mut connections = BTreeMap::new();
                    connections.insert(
                        "WEST".to_string(),
                        ConnectionDescriptor {
                            map: "A".to_string(),
                            offset: 0,
                        },
                    );
                    Ok(MapDescriptor {
                        map_id: "B".to_string(),
                        width: 5,
                        height: 5,
                        tileset: None,
                        tiles: None,
                        connections,
                        teleports: Vec::new(),
                        trainers: Vec::new(),
                    })
                }
                other => Err(LoadError::Io(format!("no such map: {other}"))),
            }
        }
    }

    #[test]
    fn routes_within_a_single_map() {
        let cache = MapCache::new(TwoMapSource);
        let router = RegionRouter::new(&cache);
        let from = Coordinate::new("A", 0, 0);
        let plan = router
            .find_path(
                &from,
                &MapId::new("A"),
                Some((2, 0)),
                HmSet::empty(),
                &WeightPolicy::default(),
                &FnvHashSet::default(),
                10_000,
            )
            .unwrap();
        assert!(plan.success);
        assert_eq!(plan.maps_traversed, vec![MapId::new("A")]);
    }

    #[test]
    fn routes_across_a_connection() {
        let cache = MapCache::new(TwoMapSource);
        let router = RegionRouter::new(&cache);
        let from = Coordinate::new("A", 0, 2);
        let plan = router
            .find_path(
                &from,
                &MapId::new("B"),
                Some((2, 2)),
                HmSet::empty(),
                &WeightPolicy::default(),
                &FnvHashSet::default(),
                10_000,
            )
            .unwrap();
        assert!(plan.success);
        assert_eq!(
            plan.maps_traversed,
            vec![MapId::new("A"), MapId::new("B")]
        );
        assert_eq!(plan.transitions.len(), 1);
        assert_eq!(plan.transitions[0].kind, TransitionKind::Connection);
    }

    #[test]
    fn unreachable_map_reports_failure() {
        let cache = MapCache::new(TwoMapSource);
        let router = RegionRouter::new(&cache);
        let from = Coordinate::new("A", 0, 0);
        let plan = router
            .find_path(
                &from,
                &MapId::new("NOWHERE"),
                None,
                HmSet::empty(),
                &WeightPolicy::default(),
                &FnvHashSet::default(),
                10_000,
            )
            .unwrap();
        assert!(!plan.success);
        assert_eq!(plan.maps_traversed, vec![MapId::new("A")]);
    }

    #[test]
    fn unused_json_file_source_compiles_for_real_use() {
        let _source = JsonFileMapSource::new("/tmp/does-not-exist");
    }

    struct TeleportMapSource;
    impl MapDataSource for TeleportMapSource {
        fn load(&self, map_id: &MapId) -> Result<MapDescriptor, LoadError> {
            match map_id.as_str() {
                "A" => Ok(MapDescriptor {
                    map_id: "A".to_string(),
                    width: 5,
                    height: 5,
                    tileset: None,
                    tiles: None,
                    connections: BTreeMap::new(),
                    teleports: vec![crate::knowledge::TeleportDescriptor {
                        x: 4,
                        y: 4,
                        destination_map: "B".to_string(),
                        destination_teleport_id: Some("1".to_string()),
                    }],
                    trainers: Vec::new(),
                }),
                "B" => Ok(MapDescriptor {
                    map_id: "B".to_string(),
                    width: 6,
                    height: 6,
                    tileset: None,
                    tiles: None,
                    connections: BTreeMap::new(),
                    teleports: vec![
                        crate::knowledge::TeleportDescriptor {
                            x: 0,
                            y: 0,
                            destination_map: "A".to_string(),
                            destination_teleport_id: Some("0".to_string()),
                        },
                        crate::knowledge::TeleportDescriptor {
                            x: 5,
                            y: 1,
                            destination_map: "A".to_string(),
                            destination_teleport_id: Some("0".to_string()),
                        },
                    ],
                    trainers: Vec::new(),
                }),
                other => Err(LoadError::Io(format!("no such map: {other}"))),
            }
        }
    }

    #[test]
    fn teleport_entry_resolves_to_destination_teleport_position() {
        let cache = MapCache::new(TeleportMapSource);
        let router = RegionRouter::new(&cache);
        let from = Coordinate::new("A", 0, 0);
        let plan = router
            .find_path(
                &from,
                &MapId::new("B"),
                Some((5, 5)),
                HmSet::empty(),
                &WeightPolicy::default(),
                &FnvHashSet::default(),
                10_000,
            )
            .unwrap();
        assert!(plan.success);
        assert_eq!(plan.transitions.len(), 1);
        assert_eq!(plan.transitions[0].kind, TransitionKind::Warp);
        // destination_teleport_id "1" indexes B's second teleport, (5, 1) —
        // not B's center (3, 3) and not its first teleport (0, 0).
        assert_eq!(plan.transitions[0].to_pos, (5, 1));
    }
}
