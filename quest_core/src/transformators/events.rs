//! Event activation - resolve each event to one of its tagged jumps.

use std::collections::{BTreeMap, BTreeSet};

use rand::seq::SliceRandom;
use rand::Rng;

use quest_model::{FactId, Kind};

use super::TransformError;
use crate::knowledge_base::KnowledgeBase;

/// Resolve every event: of the jumps tagged with the event's uid, keep one
/// picked uniformly at random and delete the others.
///
/// A fact carrying more than one event tag, or an event with no tagged
/// jumps, is an authoring error.
pub fn activate_events<R: Rng + ?Sized>(
    knowledge_base: &mut KnowledgeBase,
    rng: &mut R,
) -> Result<(), TransformError> {
    let events: BTreeSet<&str> = knowledge_base
        .filter(Kind::Event)
        .map(|event| event.uid.as_str())
        .collect();

    if events.is_empty() {
        return Ok(());
    }

    for fact in knowledge_base.facts() {
        let tagged: Vec<FactId> = fact
            .tags
            .iter()
            .filter(|tag| events.contains(tag.as_str()))
            .map(|tag| FactId::new(tag.as_str()))
            .collect();

        if tagged.len() > 1 {
            return Err(TransformError::MultipleEventTags {
                fact: fact.uid.clone(),
                events: tagged,
            });
        }
    }

    let mut members: BTreeMap<&str, Vec<&FactId>> =
        events.iter().map(|event| (*event, Vec::new())).collect();

    for jump in knowledge_base.filter(Kind::Jump) {
        for tag in &jump.tags {
            if let Some(group) = members.get_mut(tag.as_str()) {
                group.push(&jump.uid);
            }
        }
    }

    let mut doomed: Vec<FactId> = Vec::new();
    for (event, group) in &members {
        let Some(survivor) = group.choose(rng) else {
            return Err(TransformError::EventWithoutMembers {
                event: FactId::new(*event),
            });
        };

        doomed.extend(
            group
                .iter()
                .filter(|member| *member != survivor)
                .map(|member| (*member).clone()),
        );
    }

    tracing::debug!(events = members.len(), removed = doomed.len(), "Activated events");

    knowledge_base.remove_facts(&doomed)?;
    Ok(())
}
