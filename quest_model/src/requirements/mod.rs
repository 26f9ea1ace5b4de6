//! Requirements - declarative conditions on the world.
//!
//! An interpreter can both check a requirement and satisfy it (e.g. teleport
//! the hero when a `LocatedIn` requirement fails during testing).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::{FactId, Reference};

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

/// The object travels between two places and has covered `percents` of the road.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocatedOnRoad {
    pub object: FactId,
    pub place_from: FactId,
    pub place_to: FactId,
    pub percents: f64,
}

impl LocatedOnRoad {
    pub fn new(
        object: impl Into<FactId>,
        place_from: impl Into<FactId>,
        place_to: impl Into<FactId>,
        percents: f64,
    ) -> Self {
        Self {
            object: object.into(),
            place_from: place_from.into(),
            place_to: place_to.into(),
            percents,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HasMoney {
    pub object: FactId,
    pub money: u64,
}

impl HasMoney {
    pub fn new(object: impl Into<FactId>, money: u64) -> Self {
        Self {
            object: object.into(),
            money,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IsAlive {
    pub object: FactId,
}

impl IsAlive {
    pub fn new(object: impl Into<FactId>) -> Self {
        Self {
            object: object.into(),
        }
    }
}

/// All registered requirement kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "attributes")]
pub enum Requirement {
    LocatedIn(LocatedIn),
    LocatedNear(LocatedNear),
    LocatedOnRoad(LocatedOnRoad),
    HasMoney(HasMoney),
    IsAlive(IsAlive),
}

impl Requirement {
    pub fn kind(&self) -> RequirementKind {
        match self {
            Requirement::LocatedIn(_) => RequirementKind::LocatedIn,
            Requirement::LocatedNear(_) => RequirementKind::LocatedNear,
            Requirement::LocatedOnRoad(_) => RequirementKind::LocatedOnRoad,
            Requirement::HasMoney(_) => RequirementKind::HasMoney,
            Requirement::IsAlive(_) => RequirementKind::IsAlive,
        }
    }

    pub fn references(&self) -> Vec<Reference<'_>> {
        match self {
            Requirement::LocatedIn(req) => vec![
                Reference::new("object", &req.object),
                Reference::new("place", &req.place),
            ],
            Requirement::LocatedNear(req) => vec![
                Reference::new("object", &req.object),
                Reference::new("place", &req.place),
            ],
            Requirement::LocatedOnRoad(req) => vec![
                Reference::new("object", &req.object),
                Reference::new("place_from", &req.place_from),
                Reference::new("place_to", &req.place_to),
            ],
            Requirement::HasMoney(req) => vec![Reference::new("object", &req.object)],
            Requirement::IsAlive(req) => vec![Reference::new("object", &req.object)],
        }
    }
}

/// Registry entry for a requirement kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequirementKind {
    LocatedIn,
    LocatedNear,
    LocatedOnRoad,
    HasMoney,
    IsAlive,
}

impl RequirementKind {
    pub const ALL: [RequirementKind; 5] = [
        RequirementKind::LocatedIn,
        RequirementKind::LocatedNear,
        RequirementKind::LocatedOnRoad,
        RequirementKind::HasMoney,
        RequirementKind::IsAlive,
    ];

    pub fn name(self) -> &'static str {
        match self {
            RequirementKind::LocatedIn => "LocatedIn",
            RequirementKind::LocatedNear => "LocatedNear",
            RequirementKind::LocatedOnRoad => "LocatedOnRoad",
            RequirementKind::HasMoney => "HasMoney",
            RequirementKind::IsAlive => "IsAlive",
        }
    }

    /// Name of the interpreter callback that checks this requirement.
    pub fn check_callback(self) -> &'static str {
        match self {
            RequirementKind::LocatedIn => "check_located_in",
            RequirementKind::LocatedNear => "check_located_near",
            RequirementKind::LocatedOnRoad => "check_located_on_road",
            RequirementKind::HasMoney => "check_has_money",
            RequirementKind::IsAlive => "check_is_alive",
        }
    }

    /// Name of the interpreter callback that makes this requirement hold.
    pub fn satisfy_callback(self) -> &'static str {
        match self {
            RequirementKind::LocatedIn => "satisfy_located_in",
            RequirementKind::LocatedNear => "satisfy_located_near",
            RequirementKind::LocatedOnRoad => "satisfy_located_on_road",
            RequirementKind::HasMoney => "satisfy_has_money",
            RequirementKind::IsAlive => "satisfy_is_alive",
        }
    }
}
