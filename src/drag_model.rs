use serde::{Deserialize, Serialize};

/// Reference drag law identifier.
///
/// G1 models flat-base projectiles; G7 models modern boat-tail designs
/// and is the better match for long .50-caliber ball ammunition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DragLaw {
    G1,
    G7,
}

impl DragLaw {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "G1" => Some(DragLaw::G1),
            "G7" => Some(DragLaw::G7),
            _ => None,
        }
    }
}

impl std::fmt::Display for DragLaw {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
