//! Hidden-machine vocabulary: the permanent moves that double as terrain keys.

use bitflags::bitflags;

/// A single HM. The vocabulary is closed — anything else is ignored upstream
/// (see the knowledge-base boundary in `knowledge.rs`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Hm {
    Cut,
    Fly,
    Surf,
    Strength,
    Flash,
}

impl Hm {
    /// Parse the canonical HM name. Case-insensitive. Returns `None` for
    /// anything outside the closed vocabulary rather than erroring — HM
    /// presence is "possession and permission", and an unrecognised symbol
    /// is simply not possessed.
    pub fn from_name(name: &str) -> Option<Hm> {
        match name.to_ascii_uppercase().as_str() {
            "CUT" => Some(Hm::Cut),
            "FLY" => Some(Hm::Fly),
            "SURF" => Some(Hm::Surf),
            "STRENGTH" => Some(Hm::Strength),
            "FLASH" => Some(Hm::Flash),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Hm::Cut => "Cut",
            Hm::Fly => "Fly",
            Hm::Surf => "Surf",
            Hm::Strength => "Strength",
            Hm::Flash => "Flash",
        }
    }
}

bitflags! {
    /// The subset of HMs usable by the party right now.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct HmSet: u8 {
        const CUT = 0b00001;
        const FLY = 0b00010;
        const SURF = 0b00100;
        const STRENGTH = 0b01000;
        const FLASH = 0b10000;
    }
}

impl HmSet {
    pub fn contains_hm(self, hm: Hm) -> bool {
        self.contains(HmSet::from(hm))
    }

    /// Build a set from names, silently dropping anything outside the
    /// closed vocabulary.
    pub fn from_names<I, S>(names: I) -> HmSet
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = HmSet::empty();
        for name in names {
            if let Some(hm) = Hm::from_name(name.as_ref()) {
                set |= HmSet::from(hm);
            }
        }
        set
    }
}

impl From<Hm> for HmSet {
    fn from(hm: Hm) -> HmSet {
        match hm {
            Hm::Cut => HmSet::CUT,
            Hm::Fly => HmSet::FLY,
            Hm::Surf => HmSet::SURF,
            Hm::Strength => HmSet::STRENGTH,
            Hm::Flash => HmSet::FLASH,
        }
    }
}
