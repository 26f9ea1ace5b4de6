//! Quest templates and the catalog the selector draws them from.

use std::collections::BTreeSet;

use quest_model::{Fact, FactId};

use super::{Selector, SelectorError};
use crate::GenerationError;

/// How a template can be entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntryPoint {
    /// Starts at a place, with no initiator.
    FromPlace,
    /// Starts with one initiating person.
    FromPerson,
    /// Runs between an initiator and a receiver.
    Between2,
}

impl std::fmt::Display for EntryPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntryPoint::FromPlace => write!(f, "from place"),
            EntryPoint::FromPerson => write!(f, "from person"),
            EntryPoint::Between2 => write!(f, "between two persons"),
        }
    }
}

/// Template tags used by [`QuestFilter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum QuestTag {
    /// May be the root quest.
    CanStart,
    /// May be nested inside another quest.
    CanContinue,
    /// Builds subquests of its own; excluded from further nesting once used.
    HasSubquests,
}

/// An external generator of a self-contained quest subgraph.
///
/// Implementors override the construction entry points they list in
/// [`QuestTemplate::entry_points`]; the others report
/// [`SelectorError::UnsupportedConstruction`].
pub trait QuestTemplate {
    /// Type tag written into the quest's `Start` fact.
    fn quest_type(&self) -> &str;

    fn tags(&self) -> &[QuestTag];

    fn entry_points(&self) -> &[EntryPoint];

    fn construct_from_place(
        &self,
        selector: &mut Selector<'_>,
        nesting: u32,
        place: &FactId,
    ) -> Result<Vec<Fact>, GenerationError> {
        let _ = (selector, nesting, place);
        Err(self.unsupported(EntryPoint::FromPlace))
    }

    fn construct_from_person(
        &self,
        selector: &mut Selector<'_>,
        nesting: u32,
        initiator: &FactId,
    ) -> Result<Vec<Fact>, GenerationError> {
        let _ = (selector, nesting, initiator);
        Err(self.unsupported(EntryPoint::FromPerson))
    }

    fn construct_between_2(
        &self,
        selector: &mut Selector<'_>,
        nesting: u32,
        initiator: &FactId,
        receiver: &FactId,
    ) -> Result<Vec<Fact>, GenerationError> {
        let _ = (selector, nesting, initiator, receiver);
        Err(self.unsupported(EntryPoint::Between2))
    }

    fn has_tag(&self, tag: QuestTag) -> bool {
        self.tags().contains(&tag)
    }

    fn supports(&self, entry: EntryPoint) -> bool {
        self.entry_points().contains(&entry)
    }

    #[doc(hidden)]
    fn unsupported(&self, entry: EntryPoint) -> GenerationError {
        SelectorError::UnsupportedConstruction {
            quest_type: self.quest_type().to_string(),
            entry,
        }
        .into()
    }
}

/// Which templates a `create_quest_*` call may pick.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuestFilter {
    /// The template must carry every one of these tags.
    pub required_tags: BTreeSet<QuestTag>,
    /// When set, only these quest types are allowed.
    pub allowed: Option<BTreeSet<String>>,
    pub excluded: BTreeSet<String>,
}

impl QuestFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tag(mut self, tag: QuestTag) -> Self {
        self.required_tags.insert(tag);
        self
    }

    pub fn allow(mut self, quest_type: impl Into<String>) -> Self {
        self.allowed
            .get_or_insert_with(BTreeSet::new)
            .insert(quest_type.into());
        self
    }

    pub fn exclude(mut self, quest_type: impl Into<String>) -> Self {
        self.excluded.insert(quest_type.into());
        self
    }

    pub fn matches(&self, template: &dyn QuestTemplate) -> bool {
        let quest_type = template.quest_type();

        self.required_tags.iter().all(|tag| template.has_tag(*tag))
            && self
                .allowed
                .as_ref()
                .map_or(true, |allowed| allowed.contains(quest_type))
            && !self.excluded.contains(quest_type)
    }
}

/// The set of templates available to a generator.
#[derive(Default)]
pub struct QuestCatalog {
    templates: Vec<Box<dyn QuestTemplate>>,
}

impl QuestCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a template.
    pub fn with_template(mut self, template: impl QuestTemplate + 'static) -> Self {
        self.templates.push(Box::new(template));
        self
    }

    pub fn register(&mut self, template: Box<dyn QuestTemplate>) {
        self.templates.push(template);
    }

    pub fn templates(&self) -> impl Iterator<Item = &dyn QuestTemplate> + '_ {
        self.templates.iter().map(|template| template.as_ref())
    }

    /// Find a template by its quest type.
    pub fn find(&self, quest_type: &str) -> Option<&dyn QuestTemplate> {
        self.templates()
            .find(|template| template.quest_type() == quest_type)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

impl std::fmt::Debug for QuestCatalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.templates().map(|template| template.quest_type()))
            .finish()
    }
}
