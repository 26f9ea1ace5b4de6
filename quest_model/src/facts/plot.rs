//! Plot definitions - states (graph nodes) and jumps (graph edges).

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::{is_default, DerivedUid, FactId, Reference};
use crate::actions::Action;
use crate::requirements::Requirement;

/// Outcome of a quest for one of its participants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum QuestResult {
    Successful,
    Failed,
    Neutral,
}

/// Moral markers attached to options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OptionMarker {
    Honorable,
    Dishonorable,
    Aggressive,
    Unaggressive,
}

/// A goal the protagonist must reach.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct State {
    /// Requirements that must hold before the state can be entered.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub require: Vec<Requirement>,

    /// Side effects run on entry.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
}

impl State {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_require(mut self, require: impl IntoIterator<Item = Requirement>) -> Self {
        self.require.extend(require);
        self
    }

    pub fn with_actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions.extend(actions);
        self
    }
}

/// The entry node of a (sub)quest.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Start {
    /// Type tag of the quest template that built this subgraph.
    pub quest_type: String,

    /// Subquest depth; the root quest has nesting 0.
    #[serde(default, skip_serializing_if = "is_default")]
    pub nesting: u32,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub require: Vec<Requirement>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
}

impl Start {
    pub fn new(quest_type: impl Into<String>, nesting: u32) -> Self {
        Self {
            quest_type: quest_type.into(),
            nesting,
            ..Self::default()
        }
    }

    pub fn with_require(mut self, require: impl IntoIterator<Item = Requirement>) -> Self {
        self.require.extend(require);
        self
    }

    pub fn with_actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions.extend(actions);
        self
    }
}

/// A terminal node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Finish {
    /// The start of the quest this finish belongs to.
    pub start: FactId,

    /// Outcome per participant declared for `start`.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub results: BTreeMap<FactId, QuestResult>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub require: Vec<Requirement>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
}

impl Finish {
    pub fn new(start: impl Into<FactId>) -> Self {
        Self {
            start: start.into(),
            ..Self::default()
        }
    }

    pub fn with_result(mut self, participant: impl Into<FactId>, result: QuestResult) -> Self {
        self.results.insert(participant.into(), result);
        self
    }

    pub fn with_require(mut self, require: impl IntoIterator<Item = Requirement>) -> Self {
        self.require.extend(require);
        self
    }

    pub fn with_actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.actions.extend(actions);
        self
    }
}

/// A decision node; every jump out of it is an [`ChoiceOption`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Choice {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub require: Vec<Requirement>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
}

impl Choice {
    pub fn new() -> Self {
        Self::default()
    }
}

/// A binary decision node with exactly two [`Answer`]s.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Question {
    /// Evaluated once when leaving the question; all must hold for `true`.
    pub condition: Vec<Requirement>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub require: Vec<Requirement>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub actions: Vec<Action>,
}

impl Question {
    pub fn new(condition: impl IntoIterator<Item = Requirement>) -> Self {
        Self {
            condition: condition.into_iter().collect(),
            ..Self::default()
        }
    }
}

/// A directed edge between two states.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Jump {
    pub state_from: FactId,
    pub state_to: FactId,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub start_actions: Vec<Action>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub end_actions: Vec<Action>,
}

impl Jump {
    pub fn new(state_from: impl Into<FactId>, state_to: impl Into<FactId>) -> Self {
        Self {
            state_from: state_from.into(),
            state_to: state_to.into(),
            ..Self::default()
        }
    }

    pub fn with_start_actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.start_actions.extend(actions);
        self
    }

    pub fn with_end_actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.end_actions.extend(actions);
        self
    }
}

impl DerivedUid for Jump {
    fn derived_uid(&self) -> FactId {
        FactId::derived("jump", &[self.state_from.as_str(), self.state_to.as_str()])
    }
}

/// A jump out of a [`Choice`]. Serialized under the kind name `Option`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChoiceOption {
    pub state_from: FactId,
    pub state_to: FactId,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub start_actions: Vec<Action>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub end_actions: Vec<Action>,

    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub markers: BTreeSet<OptionMarker>,
}

impl ChoiceOption {
    pub fn new(state_from: impl Into<FactId>, state_to: impl Into<FactId>) -> Self {
        Self {
            state_from: state_from.into(),
            state_to: state_to.into(),
            ..Self::default()
        }
    }

    pub fn with_marker(mut self, marker: OptionMarker) -> Self {
        self.markers.insert(marker);
        self
    }

    pub fn with_start_actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.start_actions.extend(actions);
        self
    }

    pub fn with_end_actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.end_actions.extend(actions);
        self
    }
}

impl DerivedUid for ChoiceOption {
    fn derived_uid(&self) -> FactId {
        FactId::derived("option", &[self.state_from.as_str(), self.state_to.as_str()])
    }
}

/// A jump out of a [`Question`], taken when the condition evaluates to `condition`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Answer {
    pub state_from: FactId,
    pub state_to: FactId,
    pub condition: bool,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub start_actions: Vec<Action>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub end_actions: Vec<Action>,
}

impl Answer {
    pub fn new(state_from: impl Into<FactId>, state_to: impl Into<FactId>, condition: bool) -> Self {
        Self {
            state_from: state_from.into(),
            state_to: state_to.into(),
            condition,
            ..Self::default()
        }
    }

    pub fn with_start_actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.start_actions.extend(actions);
        self
    }

    pub fn with_end_actions(mut self, actions: impl IntoIterator<Item = Action>) -> Self {
        self.end_actions.extend(actions);
        self
    }
}

impl DerivedUid for Answer {
    fn derived_uid(&self) -> FactId {
        FactId::derived("answer", &[self.state_from.as_str(), self.state_to.as_str()])
    }
}

/// Borrowed view over the common part of every state kind.
#[derive(Debug, Clone, Copy)]
pub struct StateView<'a> {
    pub require: &'a [Requirement],
    pub actions: &'a [Action],
}

impl<'a> StateView<'a> {
    pub fn new(require: &'a [Requirement], actions: &'a [Action]) -> Self {
        Self { require, actions }
    }

    pub(crate) fn collect_references(&self, refs: &mut Vec<Reference<'a>>) {
        for requirement in self.require {
            refs.extend(requirement.references());
        }
        for action in self.actions {
            refs.extend(action.references());
        }
    }
}

/// Borrowed view over the common part of every jump kind.
#[derive(Debug, Clone, Copy)]
pub struct JumpView<'a> {
    pub state_from: &'a FactId,
    pub state_to: &'a FactId,
    pub start_actions: &'a [Action],
    pub end_actions: &'a [Action],
}

impl<'a> JumpView<'a> {
    pub(crate) fn collect_references(&self, refs: &mut Vec<Reference<'a>>) {
        refs.push(Reference::new("state_from", self.state_from));
        refs.push(Reference::new("state_to", self.state_to));
        for action in self.start_actions.iter().chain(self.end_actions) {
            refs.extend(action.references());
        }
    }

    /// All actions of the jump, start actions first.
    pub fn actions(&self) -> impl Iterator<Item = &'a Action> {
        self.start_actions.iter().chain(self.end_actions.iter())
    }
}
