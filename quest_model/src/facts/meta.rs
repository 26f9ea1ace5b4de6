//! Meta facts - groupings and decisions layered over the plot graph.

use serde::{Deserialize, Serialize};

use super::{is_default, DerivedUid, FactId};

/// A named group of mutually exclusive jumps.
///
/// The event's uid is the tag carried by its member jumps; exactly one of
/// them survives event activation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Event {}

impl Event {
    pub fn new() -> Self {
        Self::default()
    }
}

/// Options across different choices that must be chosen together.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptionsLink {
    pub options: Vec<FactId>,
}

impl OptionsLink {
    pub fn new<T: Into<FactId>>(options: impl IntoIterator<Item = T>) -> Self {
        Self {
            options: options.into_iter().map(Into::into).collect(),
        }
    }

    pub fn contains(&self, option: &FactId) -> bool {
        self.options.contains(option)
    }
}

impl DerivedUid for OptionsLink {
    fn derived_uid(&self) -> FactId {
        let parts: Vec<&str> = self.options.iter().map(FactId::as_str).collect();
        FactId::derived("options_link", &parts)
    }
}

/// The resolved outgoing option of one choice.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ChoicePath {
    pub choice: FactId,
    pub option: FactId,

    /// `true` when assigned by generation rather than chosen explicitly.
    #[serde(default, skip_serializing_if = "is_default")]
    pub default: bool,
}

impl ChoicePath {
    pub fn new(choice: impl Into<FactId>, option: impl Into<FactId>, default: bool) -> Self {
        Self {
            choice: choice.into(),
            option: option.into(),
            default,
        }
    }

    /// The uid of the path recorded for `choice`; there is at most one.
    pub fn uid_for(choice: &FactId) -> FactId {
        FactId::derived("choice_path", &[choice.as_str()])
    }
}

impl DerivedUid for ChoicePath {
    fn derived_uid(&self) -> FactId {
        Self::uid_for(&self.choice)
    }
}

/// Binds a role of one quest instance to an actor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuestParticipant {
    pub start: FactId,
    pub participant: FactId,
    pub role: String,
}

impl QuestParticipant {
    pub fn new(start: impl Into<FactId>, participant: impl Into<FactId>, role: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            participant: participant.into(),
            role: role.into(),
        }
    }
}

impl DerivedUid for QuestParticipant {
    fn derived_uid(&self) -> FactId {
        FactId::derived("quest_participant", &[self.start.as_str(), self.role.as_str()])
    }
}

/// The machine's replay position.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Pointer {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<FactId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jump: Option<FactId>,
}

impl Pointer {
    pub const UID: &'static str = "#pointer";

    pub fn new(state: Option<FactId>, jump: Option<FactId>) -> Self {
        Self { state, jump }
    }

    pub fn uid() -> FactId {
        FactId::new(Self::UID)
    }
}

impl DerivedUid for Pointer {
    fn derived_uid(&self) -> FactId {
        Self::uid()
    }
}
