//! Tile classification and the movement-cost policy layered over it.

use serde::{Deserialize, Serialize};

use crate::hm::{Hm, HmSet};

/// The closed set of tile classes the navigation core reasons about.
///
/// `VisionProjected` is not read off the map data directly — it is laid over
/// a tile at query time by `map_graph.rs` when that tile falls inside an
/// active trainer's vision field. See `vision.rs`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TileClass {
    Blocked,
    Walkable,
    Grass,
    Water,
    CutObstacle,
    PushObstacle,
    LedgeDown,
    LedgeLeft,
    LedgeRight,
    Teleport,
    VisionProjected,
}

/// The four cardinal movement directions, also used to gate ledge crossing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// A named, cloneable bundle of movement-cost preferences. This is the only
/// place presets live — callers either use one of the three named
/// constructors or build a custom bundle field by field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WeightPolicy {
    pub walkable: f64,
    pub grass: f64,
    pub water: f64,
    pub cut_obstacle: f64,
    pub push_obstacle: f64,
    pub vision_projected: f64,
}

impl Default for WeightPolicy {
    fn default() -> WeightPolicy {
        WeightPolicy {
            walkable: 1.0,
            grass: 3.0,
            water: 1.5,
            cut_obstacle: 2.0,
            push_obstacle: 3.0,
            vision_projected: 100.0,
        }
    }
}

impl WeightPolicy {
    /// Prefer routes that stay out of tall grass and away from trainer sight.
    pub fn avoid_encounters() -> WeightPolicy {
        WeightPolicy {
            grass: 5.0,
            ..WeightPolicy::default()
        }
    }

    /// Grinding preset: grass is cheap rather than penalized.
    pub fn seek_encounters() -> WeightPolicy {
        WeightPolicy {
            grass: 0.5,
            ..WeightPolicy::default()
        }
    }

    /// Fastest route regardless of encounters, but trainer sight is still
    /// to be avoided hard (higher than the default, not lower).
    pub fn speed_run() -> WeightPolicy {
        WeightPolicy {
            grass: 1.0,
            vision_projected: 1000.0,
            ..WeightPolicy::default()
        }
    }
}

/// Movement cost of entering `class` while moving in `direction`, given the
/// HMs currently available. Returns `None` when the tile cannot be entered
/// at all (impassable terrain, ledge crossed against its grain, an HM-gated
/// obstacle without the HM).
///
/// Pure and total over the closed `TileClass` enum — no panics, no partial
/// matches.
pub fn weight(
    class: TileClass,
    hms: HmSet,
    policy: &WeightPolicy,
    direction: Direction,
) -> Option<f64> {
    match class {
        TileClass::Blocked => None,
        TileClass::Walkable => Some(policy.walkable),
        TileClass::Grass => Some(policy.grass),
        TileClass::Water => hms.contains_hm(Hm::Surf).then_some(policy.water),
        TileClass::CutObstacle => hms.contains_hm(Hm::Cut).then_some(policy.cut_obstacle),
        TileClass::PushObstacle => hms
            .contains_hm(Hm::Strength)
            .then_some(policy.push_obstacle),
        TileClass::LedgeDown => ledge_weight(direction == Direction::Down, policy),
        TileClass::LedgeLeft => ledge_weight(direction == Direction::Left, policy),
        TileClass::LedgeRight => ledge_weight(direction == Direction::Right, policy),
        TileClass::Teleport => Some(policy.walkable),
        TileClass::VisionProjected => Some(policy.vision_projected),
    }
}

/// Ledges are always entered at `policy.walkable` cost when the jump
/// direction matches the ledge's grain — they never carry the grass
/// penalty even if drawn over a grassy tile, since the original tileset
/// treats the ledge tile itself as its own type.
fn ledge_weight(direction_matches: bool, policy: &WeightPolicy) -> Option<f64> {
    direction_matches.then_some(policy.walkable)
}

/// Whether `class` can be entered at all moving in `direction`, ignoring
/// cost. Equivalent to `weight(..).is_some()` but named for call sites that
/// only care about the obstacle-layer veto (e.g. vision projection, which
/// should never make an otherwise-impassable tile passable).
pub fn is_passable(class: TileClass, hms: HmSet, direction: Direction) -> bool {
    weight(class, hms, &WeightPolicy::default(), direction).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn water_requires_surf() {
        let policy = WeightPolicy::default();
        assert_eq!(
            weight(TileClass::Water, HmSet::empty(), &policy, Direction::Up),
            None
        );
        assert_eq!(
            weight(TileClass::Water, HmSet::SURF, &policy, Direction::Up),
            Some(1.5)
        );
    }

    #[test]
    fn ledge_is_one_way() {
        let policy = WeightPolicy::default();
        assert_eq!(
            weight(
                TileClass::LedgeDown,
                HmSet::empty(),
                &policy,
                Direction::Down
            ),
            Some(policy.walkable)
        );
        assert_eq!(
            weight(TileClass::LedgeDown, HmSet::empty(), &policy, Direction::Up),
            None
        );
        assert_eq!(
            weight(
                TileClass::LedgeDown,
                HmSet::empty(),
                &policy,
                Direction::Left
            ),
            None
        );
    }

    #[test]
    fn ledge_never_carries_grass_penalty() {
        let policy = WeightPolicy::avoid_encounters();
        assert_eq!(
            weight(
                TileClass::LedgeRight,
                HmSet::empty(),
                &policy,
                Direction::Right
            ),
            Some(policy.walkable)
        );
    }

    #[test]
    fn blocked_is_never_passable() {
        let policy = WeightPolicy::default();
        assert_eq!(
            weight(TileClass::Blocked, HmSet::all(), &policy, Direction::Up),
            None
        );
    }

    #[test]
    fn presets_adjust_grass_and_vision_only() {
        let avoid = WeightPolicy::avoid_encounters();
        let seek = WeightPolicy::seek_encounters();
        let speed = WeightPolicy::speed_run();
        assert_eq!(avoid.grass, 5.0);
        assert_eq!(seek.grass, 0.5);
        assert_eq!(speed.grass, 1.0);
        assert_eq!(speed.vision_projected, 1000.0);
        assert_eq!(avoid.walkable, WeightPolicy::default().walkable);
    }

    #[test]
    fn cut_and_strength_are_hm_gated() {
        let policy = WeightPolicy::default();
        assert_eq!(
            weight(TileClass::CutObstacle, HmSet::empty(), &policy, Direction::Up),
            None
        );
        assert_eq!(
            weight(TileClass::CutObstacle, HmSet::CUT, &policy, Direction::Up),
            Some(policy.cut_obstacle)
        );
        assert_eq!(
            weight(
                TileClass::PushObstacle,
                HmSet::STRENGTH,
                &policy,
                Direction::Up
            ),
            Some(policy.push_obstacle)
        );
    }
}
