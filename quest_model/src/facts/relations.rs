//! World relations - facts about actors that selectors and transformators read.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{DerivedUid, FactId};

/// An actor is inside a place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocatedIn {
    pub object: FactId,
    pub place: FactId,
}

impl LocatedIn {
    pub fn new(object: impl Into<FactId>, place: impl Into<FactId>) -> Self {
        Self {
            object: object.into(),
            place: place.into(),
        }
    }
}

impl DerivedUid for LocatedIn {
    fn derived_uid(&self) -> FactId {
        FactId::derived("located_in", &[self.object.as_str(), self.place.as_str()])
    }
}

/// An actor is somewhere around a place, optionally restricted to terrains.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocatedNear {
    pub object: FactId,
    pub place: FactId,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub terrains: BTreeSet<String>,
}

impl LocatedNear {
    pub fn new(object: impl Into<FactId>, place: impl Into<FactId>) -> Self {
        Self {
            object: object.into(),
            place: place.into(),
            terrains: BTreeSet::new(),
        }
    }

    pub fn with_terrain(mut self, terrain: impl Into<String>) -> Self {
        self.terrains.insert(terrain.into());
        self
    }
}

impl DerivedUid for LocatedNear {
    fn derived_uid(&self) -> FactId {
        FactId::derived("located_near", &[self.object.as_str(), self.place.as_str()])
    }
}

/// Social connection types between persons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SocialConnectionKind {
    Partner,
    Concurrent,
}

/// A directed social tie between two persons.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SocialConnection {
    pub person_from: FactId,
    pub person_to: FactId,
    pub connection: SocialConnectionKind,
}

impl SocialConnection {
    pub fn new(
        person_from: impl Into<FactId>,
        person_to: impl Into<FactId>,
        connection: SocialConnectionKind,
    ) -> Self {
        Self {
            person_from: person_from.into(),
            person_to: person_to.into(),
            connection,
        }
    }
}

impl DerivedUid for SocialConnection {
    fn derived_uid(&self) -> FactId {
        FactId::derived(
            "social_connection",
            &[self.person_from.as_str(), self.person_to.as_str()],
        )
    }
}

/// The person may take part in quests but never as the first initiator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NotFirstInitiator {
    pub person: FactId,
}

impl NotFirstInitiator {
    pub fn new(person: impl Into<FactId>) -> Self {
        Self {
            person: person.into(),
        }
    }
}

impl DerivedUid for NotFirstInitiator {
    fn derived_uid(&self) -> FactId {
        FactId::derived("not_first_initiator", &[self.person.as_str()])
    }
}

/// Branches that lower the object's power are forbidden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OnlyGoodBranches {
    pub object: FactId,
}

impl OnlyGoodBranches {
    pub fn new(object: impl Into<FactId>) -> Self {
        Self {
            object: object.into(),
        }
    }
}

impl DerivedUid for OnlyGoodBranches {
    fn derived_uid(&self) -> FactId {
        FactId::derived("only_good_branches", &[self.object.as_str()])
    }
}

/// Branches that raise the object's power are forbidden.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OnlyBadBranches {
    pub object: FactId,
}

impl OnlyBadBranches {
    pub fn new(object: impl Into<FactId>) -> Self {
        Self {
            object: object.into(),
        }
    }
}

impl DerivedUid for OnlyBadBranches {
    fn derived_uid(&self) -> FactId {
        FactId::derived("only_bad_branches", &[self.object.as_str()])
    }
}
