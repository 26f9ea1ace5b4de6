//! Actor definitions - world entities that quest roles are bound to.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The protagonist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Hero {}

impl Hero {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A location in the world.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Place {
    /// Terrains found around the place, used by terrain filters.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub terrains: BTreeSet<String>,

    /// Settlement or site type (e.g. "city", "ruins").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place_type: Option<String>,
}

impl Place {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_terrain(mut self, terrain: impl Into<String>) -> Self {
        self.terrains.insert(terrain.into());
        self
    }

    pub fn with_type(mut self, place_type: impl Into<String>) -> Self {
        self.place_type = Some(place_type.into());
        self
    }
}

/// A non-player character.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Person {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profession: Option<String>,
}

impl Person {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profession(mut self, profession: impl Into<String>) -> Self {
        self.profession = Some(profession.into());
        self
    }
}

/// A hostile creature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Mob {
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub terrains: BTreeSet<String>,
}

impl Mob {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_terrain(mut self, terrain: impl Into<String>) -> Self {
        self.terrains.insert(terrain.into());
        self
    }
}
