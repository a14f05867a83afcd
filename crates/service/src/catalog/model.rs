use serde::{Deserialize, Serialize};

/// A creature record, either fetched from upstream or created locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creature {
    pub id: i64,
    pub name: String,
    pub kind: String,
    pub vitality: u32,
    pub images: Vec<String>,
}

/// Input for `create`; optional fields take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCreature {
    pub name: String,
    pub kind: String,
    pub vitality: Option<u32>,
    pub images: Option<Vec<String>>,
}

impl NewCreature {
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self { name: name.into(), kind: kind.into(), vitality: None, images: None }
    }

    pub(crate) fn into_creature(self, id: i64) -> Creature {
        Creature {
            id,
            name: self.name,
            kind: self.kind,
            vitality: self.vitality.unwrap_or(0),
            images: self.images.unwrap_or_default(),
        }
    }
}

/// Partial update; `None` keeps the current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreaturePatch {
    pub name: Option<String>,
    pub kind: Option<String>,
    pub vitality: Option<u32>,
    pub images: Option<Vec<String>>,
}

impl CreaturePatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.kind.is_none() && self.vitality.is_none() && self.images.is_none()
    }

    /// Merge onto `current`, returning the updated record. The id never changes.
    pub fn apply(self, current: Creature) -> Creature {
        Creature {
            id: current.id,
            name: self.name.unwrap_or(current.name),
            kind: self.kind.unwrap_or(current.kind),
            vitality: self.vitality.unwrap_or(current.vitality),
            images: self.images.unwrap_or(current.images),
        }
    }
}
