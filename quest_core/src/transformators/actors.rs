//! Unused actor removal.

use std::collections::BTreeSet;

use quest_model::{FactId, FactKind, Kind};

use super::TransformError;
use crate::knowledge_base::KnowledgeBase;

/// Drop actors nothing in the quest refers to, together with the world
/// relations that mention them.
///
/// An actor counts as used when a plot or meta fact references it (their
/// requirements and actions included), or when a used actor is located in
/// or near it. The hero is always kept.
pub fn remove_unused_actors(knowledge_base: &mut KnowledgeBase) -> Result<(), TransformError> {
    let mut used: BTreeSet<&FactId> = knowledge_base
        .facts()
        .filter(|fact| !fact.is(Kind::Actor) && !fact.is(Kind::Relation))
        .flat_map(|fact| fact.references())
        .map(|reference| reference.target)
        .collect();

    used.extend(knowledge_base.filter(Kind::Hero).map(|hero| &hero.uid));

    for fact in knowledge_base.filter(Kind::Relation) {
        let (object, place) = match &fact.kind {
            FactKind::LocatedIn(located) => (&located.object, &located.place),
            FactKind::LocatedNear(located) => (&located.object, &located.place),
            _ => continue,
        };
        if used.contains(object) {
            used.insert(place);
        }
    }

    let unused: BTreeSet<&FactId> = knowledge_base
        .filter(Kind::Actor)
        .map(|actor| &actor.uid)
        .filter(|uid| !used.contains(uid))
        .collect();

    if unused.is_empty() {
        return Ok(());
    }

    let mut doomed: Vec<FactId> = knowledge_base
        .filter(Kind::Relation)
        .filter(|relation| {
            relation
                .references()
                .iter()
                .any(|reference| unused.contains(reference.target))
        })
        .map(|relation| relation.uid.clone())
        .collect();
    doomed.extend(unused.into_iter().cloned());

    tracing::debug!(removed = doomed.len(), "Removed unused actors");

    knowledge_base.remove_facts(&doomed)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use quest_model::requirements::{self, Requirement};
    use quest_model::{Fact, Jump, Start, State};

    #[test]
    fn test_unused_actors_removed() {
        let mut kb = testing::world();
        kb.add_facts([
            Fact::new(
                "start",
                Start::new("visit", 0)
                    .with_require([Requirement::LocatedIn(requirements::LocatedIn::new("hero", "town_a"))]),
            ),
            Fact::new(
                "meet",
                State::new()
                    .with_require([Requirement::IsAlive(requirements::IsAlive::new("p2"))]),
            ),
            Fact::new("finish", quest_model::Finish::new("start")),
            Fact::derived(Jump::new("start", "meet")),
            Fact::derived(Jump::new("meet", "finish")),
        ])
        .unwrap();

        remove_unused_actors(&mut kb).unwrap();

        // referenced directly
        assert!(kb.contains("hero"));
        assert!(kb.contains("town_a"));
        assert!(kb.contains("p2"));
        // where a used actor lives
        assert!(kb.contains("town_b"));
        assert!(kb.contains("#located_in(p2, town_b)"));

        assert!(!kb.contains("p1"));
        assert!(!kb.contains("p3"));
        assert!(!kb.contains("town_c"));
        assert!(!kb.contains("#located_in(p1, town_a)"));
        assert!(!kb.contains("#social_connection(p1, p2)"));
        assert!(!kb.contains("#not_first_initiator(p3)"));
    }

    #[test]
    fn test_nothing_to_remove() {
        let mut kb = testing::linear_quest();
        let before = kb.clone();
        remove_unused_actors(&mut kb).unwrap();
        assert_eq!(kb, before);
    }
}
