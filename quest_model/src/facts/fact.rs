//! The fact envelope and fact identifiers.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::{FactKind, JumpView, Kind, StateView};

/// Unique identifier for facts.
///
/// Identifiers are readable strings. Kinds whose identity is their content
/// (jumps, relations, choice paths, ...) derive them with [`FactId::derived`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FactId(pub String);

impl FactId {
    /// Create a fact ID from any string.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Derive an ID from a kind prefix and the identifying parts of a fact,
    /// e.g. `#jump(start, finish)`.
    pub fn derived(prefix: &str, parts: &[&str]) -> Self {
        Self(format!("#{}({})", prefix, parts.join(", ")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for FactId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for FactId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<&FactId> for FactId {
    fn from(id: &FactId) -> Self {
        id.clone()
    }
}

impl std::borrow::Borrow<str> for FactId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for FactId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kinds whose identifier is derived from their own content.
pub trait DerivedUid {
    fn derived_uid(&self) -> FactId;
}

/// A reference attribute: a field holding the identifier of another fact.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference<'a> {
    pub field: &'static str,
    pub target: &'a FactId,
}

impl<'a> Reference<'a> {
    pub fn new(field: &'static str, target: &'a FactId) -> Self {
        Self { field, target }
    }
}

/// A fact is an immutable, typed record stored in the knowledge base.
///
/// "Changing" a fact means building a new one and replacing the old one
/// in the store.
///
/// Serialization goes through [`FactRecord`](super::FactRecord), see the
/// `record` module.
#[derive(Debug, Clone, PartialEq)]
pub struct Fact {
    pub uid: FactId,

    /// Free-form tags; event membership is expressed through tags.
    pub tags: BTreeSet<String>,

    pub label: Option<String>,

    pub description: Option<String>,

    /// The kind-specific payload.
    pub kind: FactKind,
}

impl Fact {
    /// Create a new fact with an explicit identifier.
    pub fn new(uid: impl Into<FactId>, kind: impl Into<FactKind>) -> Self {
        Self {
            uid: uid.into(),
            tags: BTreeSet::new(),
            label: None,
            description: None,
            kind: kind.into(),
        }
    }

    /// Create a fact whose identifier is derived from its payload.
    pub fn derived<T>(payload: T) -> Self
    where
        T: DerivedUid + Into<FactKind>,
    {
        let uid = payload.derived_uid();
        Self::new(uid, payload)
    }

    /// Add a tag to this fact.
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Add multiple tags to this fact.
    pub fn with_tags<T: Into<String>>(mut self, tags: impl IntoIterator<Item = T>) -> Self {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check if this fact has a specific tag.
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// The concrete kind of this fact.
    pub fn kind_name(&self) -> Kind {
        self.kind.kind()
    }

    /// Check whether this fact is of `kind` or one of its subkinds.
    pub fn is(&self, kind: Kind) -> bool {
        kind.includes(self.kind_name())
    }

    /// All reference attributes of this fact, including the ones nested in
    /// its requirements and actions.
    pub fn references(&self) -> Vec<Reference<'_>> {
        self.kind.references()
    }

    /// Requirements and actions of a plot state.
    pub fn as_state(&self) -> Option<StateView<'_>> {
        self.kind.as_state()
    }

    /// Endpoints and actions of a jump, option or answer.
    pub fn as_jump(&self) -> Option<JumpView<'_>> {
        self.kind.as_jump()
    }
}
