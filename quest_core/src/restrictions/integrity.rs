//! Referential integrity, finish results and actor locations.

use std::collections::{BTreeMap, BTreeSet};

use quest_model::{FactId, FactKind, Kind};

use super::{Restriction, RestrictionError};
use crate::knowledge_base::KnowledgeBase;

/// For every finish, the participants declared for its start are exactly
/// the keys of its results.
#[derive(Debug, Clone, Copy, Default)]
pub struct FinishResultsConsistency;

impl Restriction for FinishResultsConsistency {
    fn name(&self) -> &'static str {
        "FinishResultsConsistency"
    }

    fn check(&self, knowledge_base: &KnowledgeBase) -> Result<(), RestrictionError> {
        let mut participants: BTreeMap<&FactId, BTreeSet<&FactId>> = BTreeMap::new();
        for fact in knowledge_base.filter(Kind::QuestParticipant) {
            if let FactKind::QuestParticipant(participant) = &fact.kind {
                participants
                    .entry(&participant.start)
                    .or_default()
                    .insert(&participant.participant);
            }
        }

        let empty = BTreeSet::new();
        for fact in knowledge_base.filter(Kind::Finish) {
            let FactKind::Finish(finish) = &fact.kind else { continue };

            let declared = participants.get(&finish.start).unwrap_or(&empty);
            let recorded: BTreeSet<&FactId> = finish.results.keys().collect();

            let missing: Vec<FactId> = declared.difference(&recorded).map(|id| (*id).clone()).collect();
            let unexpected: Vec<FactId> = recorded.difference(declared).map(|id| (*id).clone()).collect();

            if !missing.is_empty() || !unexpected.is_empty() {
                return Err(RestrictionError::FinishResultsMismatch {
                    finish: fact.uid.clone(),
                    missing,
                    unexpected,
                });
            }
        }

        Ok(())
    }
}

/// Every reference attribute resolves to a stored fact.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReferencesIntegrity;

impl Restriction for ReferencesIntegrity {
    fn name(&self) -> &'static str {
        "ReferencesIntegrity"
    }

    fn check(&self, knowledge_base: &KnowledgeBase) -> Result<(), RestrictionError> {
        for fact in knowledge_base.facts() {
            for reference in fact.references() {
                if !knowledge_base.contains(reference.target) {
                    return Err(RestrictionError::BrokenReference {
                        fact: fact.uid.clone(),
                        field: reference.field,
                        target: reference.target.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// No object has more than one `LocatedIn`/`LocatedNear` fact.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleLocationForObject;

impl Restriction for SingleLocationForObject {
    fn name(&self) -> &'static str {
        "SingleLocationForObject"
    }

    fn check(&self, knowledge_base: &KnowledgeBase) -> Result<(), RestrictionError> {
        let mut locations: BTreeMap<&FactId, Vec<FactId>> = BTreeMap::new();

        for fact in knowledge_base.filter(Kind::Relation) {
            let (object, place) = match &fact.kind {
                FactKind::LocatedIn(located) => (&located.object, &located.place),
                FactKind::LocatedNear(located) => (&located.object, &located.place),
                _ => continue,
            };
            locations.entry(object).or_default().push(place.clone());
        }

        match locations.into_iter().find(|(_, places)| places.len() > 1) {
            Some((object, places)) => Err(RestrictionError::MultipleLocations {
                object: object.clone(),
                locations: places,
            }),
            None => Ok(()),
        }
    }
}
