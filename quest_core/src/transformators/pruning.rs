//! Branch pruning: alignment-restricted states and broken plot debris.

use std::collections::{BTreeSet, VecDeque};

use quest_model::actions::Action;
use quest_model::{DerivedUid, Fact, FactId, FactKind, Kind, OptionsLink};

use super::TransformError;
use crate::knowledge_base::{KnowledgeBase, StateGraph};

/// Delete states and jumps whose actions move an alignment-restricted
/// object's power in the forbidden direction, along with every jump
/// touching a deleted state.
///
/// Run [`remove_broken_states`] afterwards to clean up what became
/// unreachable.
pub fn remove_restricted_states(knowledge_base: &mut KnowledgeBase) -> Result<(), TransformError> {
    let mut only_good = BTreeSet::new();
    let mut only_bad = BTreeSet::new();

    for fact in knowledge_base.filter(Kind::Relation) {
        match &fact.kind {
            FactKind::OnlyGoodBranches(restriction) => {
                only_good.insert(&restriction.object);
            }
            FactKind::OnlyBadBranches(restriction) => {
                only_bad.insert(&restriction.object);
            }
            _ => {}
        }
    }

    if only_good.is_empty() && only_bad.is_empty() {
        return Ok(());
    }

    let forbidden = |action: &Action| match action {
        Action::GivePower(give) => {
            (give.power < 0.0 && only_good.contains(&give.object))
                || (give.power > 0.0 && only_bad.contains(&give.object))
        }
        _ => false,
    };

    let states: BTreeSet<&FactId> = knowledge_base
        .filter(Kind::State)
        .filter(|state| {
            state
                .as_state()
                .is_some_and(|view| view.actions.iter().any(forbidden))
        })
        .map(|state| &state.uid)
        .collect();

    let jumps: Vec<FactId> = knowledge_base
        .filter(Kind::Jump)
        .filter(|jump| {
            jump.as_jump().is_some_and(|view| {
                states.contains(view.state_from)
                    || states.contains(view.state_to)
                    || view.actions().any(forbidden)
            })
        })
        .map(|jump| jump.uid.clone())
        .collect();

    let mut doomed: Vec<FactId> = states.into_iter().cloned().collect();
    doomed.extend(jumps);

    tracing::debug!(removed = doomed.len(), "Removed restricted states");

    knowledge_base.remove_facts(&doomed)?;
    Ok(())
}

/// Prune the plot graph to a fixed point:
/// - non-Start states with no incoming jump
/// - non-Start, non-Finish states with no outgoing jump
/// - jumps whose endpoints are missing
///
/// Starts are never deleted. When the dead-end cascade leaves a Start with
/// no outgoing jump, the chain it removed below that Start is put back, so
/// validation reports the dead end instead of an empty quest.
///
/// Then drop meta facts left dangling: choice paths and participants with a
/// missing target, and options links reduced below two options (surviving
/// links are re-keyed to their remaining members).
pub fn remove_broken_states(knowledge_base: &mut KnowledgeBase) -> Result<(), TransformError> {
    let original = knowledge_base.clone();
    let mut removed = 0;

    loop {
        let doomed = broken_plot_facts(knowledge_base);
        if doomed.is_empty() {
            break;
        }
        removed += doomed.len();
        knowledge_base.remove_facts(&doomed)?;
    }

    let restored = restore_stranded_starts(&original, knowledge_base)?;
    removed = removed.saturating_sub(restored);
    removed += remove_dangling_meta(knowledge_base)?;

    tracing::debug!(removed, restored, "Removed broken states");
    Ok(())
}

fn broken_plot_facts(knowledge_base: &KnowledgeBase) -> Vec<FactId> {
    let graph = StateGraph::new(knowledge_base);
    let mut doomed = Vec::new();

    for jump in knowledge_base.filter(Kind::Jump) {
        if let Some(view) = jump.as_jump() {
            if !graph.contains_state(view.state_from) || !graph.contains_state(view.state_to) {
                doomed.push(jump.uid.clone());
            }
        }
    }

    let has_live_jump = |jumps: &[&Fact]| jumps.iter().any(|jump| !doomed.contains(&jump.uid));

    let states: Vec<FactId> = graph
        .states()
        .filter(|state| {
            !state.is(Kind::Start)
                && (!has_live_jump(graph.jumps_to(&state.uid))
                    || (!state.is(Kind::Finish) && !has_live_jump(graph.jumps_from(&state.uid))))
        })
        .map(|state| state.uid.clone())
        .collect();

    doomed.extend(states);
    doomed
}

/// Put back what was pruned below every Start that lost all of its
/// outgoing jumps. Returns the number of facts restored.
fn restore_stranded_starts(
    original: &KnowledgeBase,
    knowledge_base: &mut KnowledgeBase,
) -> Result<usize, TransformError> {
    let before = StateGraph::new(original);

    let stranded: Vec<FactId> = {
        let after = StateGraph::new(knowledge_base);
        after
            .states()
            .filter(|state| {
                state.is(Kind::Start)
                    && after.jumps_from(&state.uid).is_empty()
                    && !before.jumps_from(&state.uid).is_empty()
            })
            .map(|state| state.uid.clone())
            .collect()
    };

    let mut restored: Vec<Fact> = Vec::new();
    let mut seen: BTreeSet<FactId> = stranded.iter().cloned().collect();
    let mut queue: VecDeque<FactId> = stranded.into();

    while let Some(state) = queue.pop_front() {
        for jump in before.jumps_from(&state) {
            let Some(view) = jump.as_jump() else {
                continue;
            };
            if !before.contains_state(view.state_to) {
                continue;
            }

            if !knowledge_base.contains(&jump.uid) {
                restored.push((*jump).clone());
            }
            if !seen.insert(view.state_to.clone()) || knowledge_base.contains(view.state_to) {
                continue;
            }
            if let Some(target) = original.get(view.state_to) {
                restored.push(target.clone());
            }
            queue.push_back(view.state_to.clone());
        }
    }

    let count = restored.len();
    knowledge_base.add_facts(restored)?;
    Ok(count)
}

fn remove_dangling_meta(knowledge_base: &mut KnowledgeBase) -> Result<usize, TransformError> {
    let mut doomed = Vec::new();
    let mut relinked = Vec::new();

    for fact in knowledge_base.facts() {
        match &fact.kind {
            FactKind::ChoicePath(path) => {
                if !knowledge_base.contains(&path.choice) || !knowledge_base.contains(&path.option) {
                    doomed.push(fact.uid.clone());
                }
            }
            FactKind::QuestParticipant(participant) => {
                if !knowledge_base.contains(&participant.start)
                    || !knowledge_base.contains(&participant.participant)
                {
                    doomed.push(fact.uid.clone());
                }
            }
            FactKind::OptionsLink(link) => {
                let options: Vec<&FactId> = link
                    .options
                    .iter()
                    .filter(|option| knowledge_base.contains(*option))
                    .collect();

                if options.len() == link.options.len() {
                    continue;
                }
                doomed.push(fact.uid.clone());
                if options.len() >= 2 {
                    let shrunk = OptionsLink::new(options);
                    relinked.push(Fact::new(shrunk.derived_uid(), shrunk).with_tags(fact.tags.clone()));
                }
            }
            _ => {}
        }
    }

    let changed = doomed.len() + relinked.len();
    knowledge_base.remove_facts(&doomed)?;
    knowledge_base.add_facts(relinked)?;
    Ok(changed)
}
