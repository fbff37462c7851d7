//! Single-map search: weighted A* and the "nearest tile matching a
//! predicate" Dijkstra variant.

use fnv::FnvHashSet;
use log::trace;
use pathfinding::directed::astar::astar as pf_astar;
use pathfinding::directed::dijkstra::dijkstra as pf_dijkstra;

use crate::coordinate::{Coordinate, MapId};
use crate::hm::{Hm, HmSet};
use crate::map_graph::MapGraph;
use crate::tile::{Direction, WeightPolicy};
use crate::vision::VisionField;

/// A tile address local to the map being searched.
pub type Node = (u32, u32);

/// Costs are floating-point tile weights in the domain model, but the
/// `pathfinding` crate's relaxation needs a totally-ordered cost type.
/// Weights are scaled into fixed-point integers here rather than hand-rolling
/// a binary heap — the same trade the teacher's own `road_network.rs` makes
/// by working in whole-number road costs.
const COST_SCALE: f64 = 1000.0;

fn scale(cost: f64) -> u64 {
    (cost * COST_SCALE).round() as u64
}

fn unscale(cost: u64) -> f64 {
    cost as f64 / COST_SCALE
}

/// One leg of a route confined to a single map.
#[derive(Clone, Debug, PartialEq)]
pub struct SegmentPlan {
    pub success: bool,
    pub path: Vec<Coordinate>,
    pub moves: Vec<Direction>,
    pub total_cost: f64,
    pub hms_required: Vec<Hm>,
    pub nodes_explored: usize,
}

impl SegmentPlan {
    fn failure(nodes_explored: usize) -> SegmentPlan {
        SegmentPlan {
            success: false,
            path: Vec::new(),
            moves: Vec::new(),
            total_cost: 0.0,
            hms_required: Vec::new(),
            nodes_explored,
        }
    }
}

fn moves_for(path: &[Node]) -> Vec<Direction> {
    path.windows(2)
        .map(|pair| {
            let (px, py) = pair[0];
            let (cx, cy) = pair[1];
            let dx = cx as i64 - px as i64;
            let dy = cy as i64 - py as i64;
            if dy < 0 {
                Direction::Up
            } else if dy > 0 {
                Direction::Down
            } else if dx < 0 {
                Direction::Left
            } else {
                Direction::Right
            }
        })
        .collect()
}

fn hms_for(graph: &MapGraph, path: &[Node], vision: &VisionField) -> Vec<Hm> {
    let mut required = FnvHashSet::default();
    for &(x, y) in path.iter().skip(1) {
        use crate::tile::TileClass::*;
        match graph.effective_class(x, y, vision) {
            Water => {
                required.insert(Hm::Surf);
            }
            CutObstacle => {
                required.insert(Hm::Cut);
            }
            PushObstacle => {
                required.insert(Hm::Strength);
            }
            _ => {}
        }
    }
    required.into_iter().collect()
}

fn to_coordinates(map_id: &MapId, path: &[Node]) -> Vec<Coordinate> {
    path.iter()
        .map(|&(x, y)| Coordinate::new(map_id.clone(), x, y))
        .collect()
}

/// Weighted A* from `start` to `goal`, confined to `graph`. Manhattan
/// distance is the heuristic — admissible whenever every traversable tile
/// costs at least one full unit, which holds for every shipped policy except
/// `seek_encounters` (grass costs less than one), matching the source
/// behavior exactly rather than silently "fixing" it.
#[allow(clippy::too_many_arguments)]
pub fn astar(
    graph: &MapGraph,
    start: Node,
    goal: Node,
    hms: HmSet,
    policy: &WeightPolicy,
    vision: &VisionField,
    max_iterations: usize,
) -> SegmentPlan {
    if !graph.in_bounds(start.0, start.1) || !graph.in_bounds(goal.0, goal.1) {
        return SegmentPlan::failure(0);
    }

    let iterations = std::cell::Cell::new(0usize);
    let exhausted = std::cell::Cell::new(false);

    let result = pf_astar(
        &start,
        |&(x, y)| {
            let count = iterations.get() + 1;
            iterations.set(count);
            if count > max_iterations {
                exhausted.set(true);
                return Vec::new();
            }
            graph
                .neighbors(x, y, hms, policy, vision)
                .into_iter()
                .map(|step| (step.to, scale(step.cost)))
                .collect::<Vec<_>>()
        },
        |&(x, y)| {
            let (gx, gy) = goal;
            scale((x.abs_diff(gx) + y.abs_diff(gy)) as f64)
        },
        |&node| node == goal,
    );

    if exhausted.get() {
        trace!(
            "astar on {} exhausted after {} iterations without reaching goal",
            graph.map_id(),
            iterations.get()
        );
    }

    match result {
        Some((path, cost)) => SegmentPlan {
            success: true,
            moves: moves_for(&path),
            hms_required: hms_for(graph, &path, vision),
            path: to_coordinates(graph.map_id(), &path),
            total_cost: unscale(cost),
            nodes_explored: iterations.get(),
        },
        None => SegmentPlan::failure(iterations.get()),
    }
}

/// Dijkstra search (A* with a zero heuristic) for the nearest tile
/// satisfying `condition`. Used when the exact destination tile is not
/// known in advance — e.g. "nearest map exit", "nearest tile outside this
/// trainer's vision".
pub fn find_nearest(
    graph: &MapGraph,
    start: Node,
    hms: HmSet,
    policy: &WeightPolicy,
    vision: &VisionField,
    max_iterations: usize,
    condition: impl Fn(u32, u32) -> bool,
) -> SegmentPlan {
    if !graph.in_bounds(start.0, start.1) {
        return SegmentPlan::failure(0);
    }

    let iterations = std::cell::Cell::new(0usize);

    let result = pf_dijkstra(
        &start,
        |&(x, y)| {
            let count = iterations.get() + 1;
            iterations.set(count);
            if count > max_iterations {
                return Vec::new();
            }
            graph
                .neighbors(x, y, hms, policy, vision)
                .into_iter()
                .map(|step| (step.to, scale(step.cost)))
                .collect::<Vec<_>>()
        },
        |&(x, y)| condition(x, y),
    );

    match result {
        Some((path, cost)) => SegmentPlan {
            success: true,
            moves: moves_for(&path),
            hms_required: hms_for(graph, &path, vision),
            path: to_coordinates(graph.map_id(), &path),
            total_cost: unscale(cost),
            nodes_explored: iterations.get(),
        },
        None => SegmentPlan::failure(iterations.get()),
    }
}
