//! Map identifiers and grid addresses.

use std::fmt;

/// A map identifier, canonicalised once at construction: upper-cased and
/// stripped of underscores. Two ids that the source data spells differently
/// (`"pallet_town"`, `"PALLET_TOWN"`, `"PalletTown"`... well, not that last
/// one, but the first two) compare and hash equal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MapId(String);

impl MapId {
    pub fn new(raw: impl AsRef<str>) -> MapId {
        MapId(canonicalise(raw.as_ref()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

fn canonicalise(raw: &str) -> String {
    raw.chars()
        .filter(|c| *c != '_')
        .flat_map(char::to_uppercase)
        .collect()
}

impl fmt::Display for MapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MapId {
    fn from(raw: &str) -> MapId {
        MapId::new(raw)
    }
}

impl From<String> for MapId {
    fn from(raw: String) -> MapId {
        MapId::new(raw)
    }
}

/// A tile address within a named map.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Coordinate {
    pub map_id: MapId,
    pub x: u32,
    pub y: u32,
}

impl Coordinate {
    pub fn new(map_id: impl Into<MapId>, x: u32, y: u32) -> Coordinate {
        Coordinate {
            map_id: map_id.into(),
            x,
            y,
        }
    }

    /// Manhattan distance, only meaningful between coordinates on the same
    /// map. Does not check `map_id` equality: callers that mix maps get a
    /// nonsense number back, not a panic (see `astar.rs`'s heuristic, which
    /// never calls this across a map boundary).
    pub fn manhattan(&self, other: &Coordinate) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:({}, {})", self.map_id, self.x, self.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalises_underscores_and_case() {
        assert_eq!(MapId::new("pallet_town"), MapId::new("PALLETTOWN"));
        assert_eq!(MapId::new("Pallet_Town"), MapId::new("palletTOWN"));
    }

    #[test]
    fn distinct_maps_stay_distinct() {
        assert_ne!(MapId::new("PALLETTOWN"), MapId::new("VIRIDIANCITY"));
    }

    #[test]
    fn manhattan_distance() {
        let a = Coordinate::new("ROUTE1", 0, 0);
        let b = Coordinate::new("ROUTE1", 3, 4);
        assert_eq!(a.manhattan(&b), 7);
    }
}
