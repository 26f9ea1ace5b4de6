//! The knowledge base - facts stored by unique identifier.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

use quest_model::{Fact, FactId, Kind};

use crate::restrictions::{Restriction, RestrictionError};

/// Store-level errors; fatal to the current operation and never retried.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum KnowledgeBaseError {
    #[error("Duplicate fact: {0}")]
    DuplicateFact(FactId),

    #[error("Fact not found: {0}")]
    FactNotFound(FactId),

    #[error("Fact {id} is a {found}, expected {expected}")]
    WrongKind { id: FactId, expected: Kind, found: Kind },
}

/// Serialized form of a knowledge base: `{"facts": [...]}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KnowledgeBaseRecord {
    pub facts: Vec<Fact>,
}

/// The main fact store.
///
/// Facts are kept ordered by identifier, so iteration (and every random
/// draw made from it with a seeded generator) is reproducible.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(into = "KnowledgeBaseRecord", try_from = "KnowledgeBaseRecord")]
pub struct KnowledgeBase {
    facts: BTreeMap<FactId, Fact>,
}

impl KnowledgeBase {
    /// Create a new empty knowledge base.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a single fact. Fails if its identifier is already taken.
    pub fn add_fact(&mut self, fact: Fact) -> Result<(), KnowledgeBaseError> {
        if self.facts.contains_key(&fact.uid) {
            return Err(KnowledgeBaseError::DuplicateFact(fact.uid));
        }
        self.facts.insert(fact.uid.clone(), fact);
        Ok(())
    }

    /// Add a batch of facts atomically: if any identifier is taken (or
    /// repeated inside the batch) nothing is added.
    pub fn add_facts(&mut self, facts: impl IntoIterator<Item = Fact>) -> Result<(), KnowledgeBaseError> {
        let facts: Vec<Fact> = facts.into_iter().collect();

        let mut seen = BTreeSet::new();
        for fact in &facts {
            if self.facts.contains_key(&fact.uid) || !seen.insert(&fact.uid) {
                return Err(KnowledgeBaseError::DuplicateFact(fact.uid.clone()));
            }
        }

        for fact in facts {
            self.facts.insert(fact.uid.clone(), fact);
        }
        Ok(())
    }

    /// Remove a fact by identifier.
    pub fn remove_fact(&mut self, id: &FactId) -> Result<Fact, KnowledgeBaseError> {
        self.facts
            .remove(id)
            .ok_or_else(|| KnowledgeBaseError::FactNotFound(id.clone()))
    }

    /// Remove a batch of facts atomically: if any identifier is absent
    /// nothing is removed.
    pub fn remove_facts<'a>(
        &mut self,
        ids: impl IntoIterator<Item = &'a FactId>,
    ) -> Result<Vec<Fact>, KnowledgeBaseError> {
        let ids: BTreeSet<&FactId> = ids.into_iter().collect();

        if let Some(missing) = ids.iter().find(|id| !self.facts.contains_key(**id)) {
            return Err(KnowledgeBaseError::FactNotFound((*missing).clone()));
        }

        Ok(ids
            .into_iter()
            .filter_map(|id| self.facts.remove(id))
            .collect())
    }

    /// "Change" a fact: drop `old` and store `new` in its place.
    ///
    /// Returns the removed fact.
    pub fn replace_fact(&mut self, old: &FactId, new: Fact) -> Result<Fact, KnowledgeBaseError> {
        if !self.facts.contains_key(old) {
            return Err(KnowledgeBaseError::FactNotFound(old.clone()));
        }
        if new.uid != *old && self.facts.contains_key(&new.uid) {
            return Err(KnowledgeBaseError::DuplicateFact(new.uid));
        }

        let removed = self.remove_fact(old)?;
        self.facts.insert(new.uid.clone(), new);
        Ok(removed)
    }

    /// Get fact by ID.
    pub fn get<Q>(&self, id: &Q) -> Option<&Fact>
    where
        FactId: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.facts.get(id)
    }

    /// Get fact by ID, failing if it is absent.
    pub fn fact(&self, id: &FactId) -> Result<&Fact, KnowledgeBaseError> {
        self.facts
            .get(id)
            .ok_or_else(|| KnowledgeBaseError::FactNotFound(id.clone()))
    }

    /// Get fact by ID, failing if it is absent or not of `kind` (or a subkind).
    pub fn fact_of_kind(&self, id: &FactId, kind: Kind) -> Result<&Fact, KnowledgeBaseError> {
        let fact = self.fact(id)?;
        if fact.is(kind) {
            Ok(fact)
        } else {
            Err(KnowledgeBaseError::WrongKind {
                id: id.clone(),
                expected: kind,
                found: fact.kind_name(),
            })
        }
    }

    pub fn contains<Q>(&self, id: &Q) -> bool
    where
        FactId: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.facts.contains_key(id)
    }

    /// Lazily iterate over all facts of `kind`, subkinds included.
    ///
    /// The iterator is `Clone`, so it can be restarted from any point.
    pub fn filter(&self, kind: Kind) -> impl Iterator<Item = &Fact> + Clone + '_ {
        self.facts.values().filter(move |fact| fact.is(kind))
    }

    /// Get all facts in the knowledge base.
    pub fn facts(&self) -> impl Iterator<Item = &Fact> + Clone + '_ {
        self.facts.values()
    }

    /// Get the total number of facts.
    pub fn fact_count(&self) -> usize {
        self.facts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facts.is_empty()
    }

    /// Run the restrictions in order; the first violation is returned.
    pub fn validate(&self, restrictions: &[Box<dyn Restriction>]) -> Result<(), RestrictionError> {
        for restriction in restrictions {
            restriction.check(self)?;
        }
        Ok(())
    }
}

impl From<KnowledgeBase> for KnowledgeBaseRecord {
    fn from(knowledge_base: KnowledgeBase) -> Self {
        Self {
            facts: knowledge_base.facts.into_values().collect(),
        }
    }
}

impl TryFrom<KnowledgeBaseRecord> for KnowledgeBase {
    type Error = KnowledgeBaseError;

    fn try_from(record: KnowledgeBaseRecord) -> Result<Self, Self::Error> {
        let mut knowledge_base = KnowledgeBase::new();
        knowledge_base.add_facts(record.facts)?;
        Ok(knowledge_base)
    }
}
