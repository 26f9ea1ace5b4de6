//! Actions - side effects attached to states and jumps.
//!
//! The generator and the machine never interpret actions; the machine hands
//! each one to the interpreter callback registered for its kind.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::{FactId, Reference};

/// Show a message of the given type to the player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Message {
    pub message_type: String,
}

impl Message {
    pub fn new(message_type: impl Into<String>) -> Self {
        Self {
            message_type: message_type.into(),
        }
    }
}

/// Change the power/standing of an actor; negative values harm it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GivePower {
    pub object: FactId,
    pub power: f64,
}

impl GivePower {
    pub fn new(object: impl Into<FactId>, power: f64) -> Self {
        Self {
            object: object.into(),
            power,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GiveReward {
    pub object: FactId,
    pub reward_type: String,
    pub scale: f64,
}

impl GiveReward {
    pub fn new(object: impl Into<FactId>, reward_type: impl Into<String>, scale: f64) -> Self {
        Self {
            object: object.into(),
            reward_type: reward_type.into(),
            scale,
        }
    }
}

/// Start a fight, optionally against a specific mob.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Fight {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mob: Option<FactId>,
}

impl Fight {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mob(mob: impl Into<FactId>) -> Self {
        Self {
            mob: Some(mob.into()),
        }
    }
}

/// Spend time on a flavour activity (waiting, searching, talking).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DoNothing {
    pub object: FactId,
    pub action_type: String,
}

impl DoNothing {
    pub fn new(object: impl Into<FactId>, action_type: impl Into<String>) -> Self {
        Self {
            object: object.into(),
            action_type: action_type.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpgradeEquipment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<u64>,
}

impl UpgradeEquipment {
    pub fn new(cost: Option<u64>) -> Self {
        Self { cost }
    }
}

/// Move an actor next to a place (or into the given terrains).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MoveNear {
    pub object: FactId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub place: Option<FactId>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub terrains: BTreeSet<String>,
}

impl MoveNear {
    pub fn new(object: impl Into<FactId>, place: Option<FactId>) -> Self {
        Self {
            object: object.into(),
            place,
            terrains: BTreeSet::new(),
        }
    }

    pub fn with_terrain(mut self, terrain: impl Into<String>) -> Self {
        self.terrains.insert(terrain.into());
        self
    }
}

/// All registered action kinds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "attributes")]
pub enum Action {
    Message(Message),
    GivePower(GivePower),
    GiveReward(GiveReward),
    Fight(Fight),
    DoNothing(DoNothing),
    UpgradeEquipment(UpgradeEquipment),
    MoveNear(MoveNear),
}

impl Action {
    pub fn kind(&self) -> ActionKind {
        match self {
            Action::Message(_) => ActionKind::Message,
            Action::GivePower(_) => ActionKind::GivePower,
            Action::GiveReward(_) => ActionKind::GiveReward,
            Action::Fight(_) => ActionKind::Fight,
            Action::DoNothing(_) => ActionKind::DoNothing,
            Action::UpgradeEquipment(_) => ActionKind::UpgradeEquipment,
            Action::MoveNear(_) => ActionKind::MoveNear,
        }
    }

    pub fn references(&self) -> Vec<Reference<'_>> {
        match self {
            Action::GivePower(action) => vec![Reference::new("object", &action.object)],
            Action::GiveReward(action) => vec![Reference::new("object", &action.object)],
            Action::Fight(action) => action
                .mob
                .iter()
                .map(|mob| Reference::new("mob", mob))
                .collect(),
            Action::DoNothing(action) => vec![Reference::new("object", &action.object)],
            Action::MoveNear(action) => {
                let mut refs = vec![Reference::new("object", &action.object)];
                refs.extend(action.place.iter().map(|place| Reference::new("place", place)));
                refs
            }
            Action::Message(_) | Action::UpgradeEquipment(_) => Vec::new(),
        }
    }
}

/// Registry entry for an action kind.
///
/// Every kind maps to one stable interpreter callback name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Message,
    GivePower,
    GiveReward,
    Fight,
    DoNothing,
    UpgradeEquipment,
    MoveNear,
}

impl ActionKind {
    pub const ALL: [ActionKind; 7] = [
        ActionKind::Message,
        ActionKind::GivePower,
        ActionKind::GiveReward,
        ActionKind::Fight,
        ActionKind::DoNothing,
        ActionKind::UpgradeEquipment,
        ActionKind::MoveNear,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ActionKind::Message => "Message",
            ActionKind::GivePower => "GivePower",
            ActionKind::GiveReward => "GiveReward",
            ActionKind::Fight => "Fight",
            ActionKind::DoNothing => "DoNothing",
            ActionKind::UpgradeEquipment => "UpgradeEquipment",
            ActionKind::MoveNear => "MoveNear",
        }
    }

    /// Name of the interpreter callback that executes this action.
    pub fn callback(self) -> &'static str {
        match self {
            ActionKind::Message => "do_message",
            ActionKind::GivePower => "do_give_power",
            ActionKind::GiveReward => "do_give_reward",
            ActionKind::Fight => "do_fight",
            ActionKind::DoNothing => "do_do_nothing",
            ActionKind::UpgradeEquipment => "do_upgrade_equipment",
            ActionKind::MoveNear => "do_move_near",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_callback_names() {
        assert_eq!(ActionKind::Fight.callback(), "do_fight");
        assert_eq!(ActionKind::GivePower.callback(), "do_give_power");

        let callbacks: BTreeSet<_> = ActionKind::ALL.iter().map(|k| k.callback()).collect();
        assert_eq!(callbacks.len(), ActionKind::ALL.len());
    }

    #[test]
    fn test_action_kind_matches_payload() {
        let action = Action::Fight(Fight::with_mob("wolf"));
        assert_eq!(action.kind(), ActionKind::Fight);
        assert_eq!(action.kind().name(), "Fight");
    }

    #[test]
    fn test_action_encoding() {
        let action = Action::GivePower(GivePower::new("town", 1.0));
        assert_eq!(
            serde_json::to_value(&action).unwrap(),
            json!({"kind": "GivePower", "attributes": {"object": "town", "power": 1.0}})
        );
    }

    #[test]
    fn test_optional_references() {
        assert!(Action::Fight(Fight::new()).references().is_empty());

        let action = Action::MoveNear(MoveNear::new("hero", Some(FactId::new("town"))));
        let fields: Vec<_> = action.references().iter().map(|r| r.field).collect();
        assert_eq!(fields, vec!["object", "place"]);
    }
}
