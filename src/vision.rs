//! Trainer facing, line-of-sight projection, and detour hinting.

use fnv::FnvHashSet;

use crate::coordinate::Coordinate;
use crate::tile::Direction;

/// Default number of tiles an NPC can see along its facing axis.
pub const DEFAULT_VISION_RANGE: u32 = 4;

/// The four facings an NPC can take, plus the emulator-memory byte
/// convention used by the knowledge base boundary (never inside the search
/// itself — see `Facing::from_byte`/`to_byte`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Facing {
    Down,
    Up,
    Left,
    Right,
}

impl Facing {
    /// Sprite-direction byte as stored in save/emulator state: 0 = Down,
    /// 4 = Up, 8 = Left, 12 = Right. Any other value is treated as Down,
    /// matching the original's "unrecognised facing defaults to DOWN"
    /// fallback rather than erroring.
    pub fn from_byte(byte: u8) -> Facing {
        match byte {
            4 => Facing::Up,
            8 => Facing::Left,
            12 => Facing::Right,
            _ => Facing::Down,
        }
    }

    pub fn to_byte(self) -> u8 {
        match self {
            Facing::Down => 0,
            Facing::Up => 4,
            Facing::Left => 8,
            Facing::Right => 12,
        }
    }

    fn delta(self) -> (i32, i32) {
        match self {
            Facing::Down => (0, 1),
            Facing::Up => (0, -1),
            Facing::Left => (-1, 0),
            Facing::Right => (1, 0),
        }
    }

    fn is_vertical(self) -> bool {
        matches!(self, Facing::Up | Facing::Down)
    }
}

impl From<Facing> for Direction {
    fn from(facing: Facing) -> Direction {
        match facing {
            Facing::Down => Direction::Down,
            Facing::Up => Direction::Up,
            Facing::Left => Direction::Left,
            Facing::Right => Direction::Right,
        }
    }
}

/// A hostile NPC capable of projecting a vision field.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Npc {
    pub npc_id: String,
    pub x: u32,
    pub y: u32,
    pub facing: Facing,
    pub vision_range: u32,
}

impl Npc {
    pub fn new(npc_id: impl Into<String>, x: u32, y: u32, facing: Facing) -> Npc {
        Npc {
            npc_id: npc_id.into(),
            x,
            y,
            facing,
            vision_range: DEFAULT_VISION_RANGE,
        }
    }
}

/// The set of tiles an NPC currently threatens, as raw `(x, y)` offsets —
/// map-relative, not wrapped in `Coordinate`, since a field only ever makes
/// sense within the single map it was projected on.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VisionField {
    tiles: FnvHashSet<(u32, u32)>,
}

impl VisionField {
    pub fn contains(&self, x: u32, y: u32) -> bool {
        self.tiles.contains(&(x, y))
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(u32, u32)> {
        self.tiles.iter()
    }
}

/// Project a straight ray from `npc` along its facing direction, stopping
/// at map bounds or at the first tile `blocked` reports true for. Water is
/// never a stopping condition here — sight travels over water even though a
/// party without Surf cannot walk on it (spec: vision is about geometry, not
/// traversability).
///
/// `blocked` receives map-relative tile coordinates already known to be in
/// bounds.
pub fn project_vision(
    npc: &Npc,
    width: u32,
    height: u32,
    blocked: impl Fn(u32, u32) -> bool,
) -> VisionField {
    let (dx, dy) = npc.facing.delta();
    let mut tiles = FnvHashSet::default();

    let mut x = npc.x as i64;
    let mut y = npc.y as i64;
    for _ in 0..npc.vision_range {
        x += dx as i64;
        y += dy as i64;

        if x < 0 || y < 0 || x >= width as i64 || y >= height as i64 {
            break;
        }
        let (ux, uy) = (x as u32, y as u32);
        if blocked(ux, uy) {
            break;
        }
        tiles.insert((ux, uy));
    }

    VisionField { tiles }
}

/// Union of vision fields for every NPC not present in `defeated`.
/// Monotonic in `defeated`: adding an id to `defeated` can only shrink the
/// returned set, never grow it, since each NPC contributes a field
/// independently and removing one only removes tiles.
pub fn project_all(
    npcs: &[Npc],
    defeated: &FnvHashSet<String>,
    width: u32,
    height: u32,
    blocked: impl Fn(u32, u32) -> bool,
) -> VisionField {
    let mut tiles = FnvHashSet::default();
    for npc in npcs {
        if defeated.contains(&npc.npc_id) {
            continue;
        }
        let field = project_vision(npc, width, height, &blocked);
        tiles.extend(field.tiles);
    }
    VisionField { tiles }
}

/// Suggest waypoints that route around `npc`'s vision axis when a straight
/// line from `start` to `goal` would cross it. Informational only: A*
/// already avoids high-cost vision tiles via the weight policy, so this
/// does not change the route found — it exists for a caller that wants to
/// pre-seed a multi-waypoint request or explain why a detour happened.
/// Returns an empty list when the direct line is clear.
pub fn suggest_detour_waypoints(
    npc: &Npc,
    width: u32,
    height: u32,
    blocked: impl Fn(u32, u32) -> bool,
    start: &Coordinate,
    goal: &Coordinate,
) -> Vec<(u32, u32)> {
    let field = project_vision(npc, width, height, blocked);
    if field.is_empty() {
        return Vec::new();
    }

    let (min_sx, max_sx) = (start.x.min(goal.x), start.x.max(goal.x));
    let (min_sy, max_sy) = (start.y.min(goal.y), start.y.max(goal.y));

    let direct_blocked = field
        .iter()
        .any(|&(vx, vy)| (min_sx..=max_sx).contains(&vx) && (min_sy..=max_sy).contains(&vy));

    if !direct_blocked {
        return Vec::new();
    }

    if npc.facing.is_vertical() {
        let detour_x = if start.x > npc.x {
            npc.x.saturating_add(2)
        } else {
            npc.x.saturating_sub(2)
        };
        vec![(detour_x, start.y), (detour_x, goal.y)]
    } else {
        let detour_y = if start.y > npc.y {
            npc.y.saturating_add(2)
        } else {
            npc.y.saturating_sub(2)
        };
        vec![(start.x, detour_y), (goal.x, detour_y)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facing_byte_round_trip() {
        for facing in [Facing::Down, Facing::Up, Facing::Left, Facing::Right] {
            assert_eq!(Facing::from_byte(facing.to_byte()), facing);
        }
    }

    #[test]
    fn unknown_facing_byte_defaults_to_down() {
        assert_eq!(Facing::from_byte(99), Facing::Down);
    }

    #[test]
    fn vision_is_a_straight_ray_stopped_by_bounds() {
        let npc = Npc::new("t1", 5, 5, Facing::Up);
        let field = project_vision(&npc, 10, 10, |_, _| false);
        assert_eq!(field.len(), 4);
        assert!(field.contains(5, 4));
        assert!(field.contains(5, 1));
        assert!(!field.contains(5, 0));
    }

    #[test]
    fn vision_stops_at_a_blocker_but_not_at_water() {
        let npc = Npc::new("t1", 0, 0, Facing::Right);
        let field = project_vision(&npc, 20, 20, |x, _| x == 2);
        assert_eq!(field.len(), 1);
        assert!(field.contains(1, 0));
        assert!(!field.contains(2, 0));
    }

    #[test]
    fn defeating_an_npc_only_shrinks_the_union() {
        let npcs = vec![Npc::new("a", 0, 0, Facing::Right), Npc::new("b", 5, 5, Facing::Up)];
        let mut defeated = FnvHashSet::default();
        let before = project_all(&npcs, &defeated, 20, 20, |_, _| false);
        defeated.insert("a".to_string());
        let after = project_all(&npcs, &defeated, 20, 20, |_, _| false);
        assert!(after.len() <= before.len());
        for tile in after.iter() {
            assert!(before.contains(tile.0, tile.1));
        }
    }

    #[test]
    fn detour_waypoints_empty_when_direct_path_is_clear() {
        let npc = Npc::new("t1", 0, 0, Facing::Up);
        let start = Coordinate::new("ROUTE1", 10, 10);
        let goal = Coordinate::new("ROUTE1", 12, 12);
        let waypoints = suggest_detour_waypoints(&npc, 20, 20, |_, _| false, &start, &goal);
        assert!(waypoints.is_empty());
    }

    #[test]
    fn detour_waypoints_present_when_crossing_vertical_vision() {
        let npc = Npc::new("t1", 5, 5, Facing::Up);
        let start = Coordinate::new("ROUTE1", 2, 0);
        let goal = Coordinate::new("ROUTE1", 8, 4);
        let waypoints = suggest_detour_waypoints(&npc, 20, 20, |_, _| false, &start, &goal);
        assert_eq!(waypoints.len(), 2);
    }
}
