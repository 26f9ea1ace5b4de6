//! Default choices and runtime choice changes, following options links.

use std::collections::{BTreeMap, BTreeSet};

use rand::seq::SliceRandom;
use rand::Rng;

use quest_model::{ChoicePath, Fact, FactId, FactKind, Kind};

use super::TransformError;
use crate::knowledge_base::{KnowledgeBase, StateGraph};

/// Option bookkeeping shared by default assignment and `change_choice`.
struct OptionIndex<'a> {
    /// Choice each option leaves.
    owner: BTreeMap<&'a FactId, &'a FactId>,
    /// Options leaving each choice.
    options: BTreeMap<&'a FactId, Vec<&'a FactId>>,
    /// Link group of each linked option.
    group: BTreeMap<&'a FactId, &'a [FactId]>,
}

impl<'a> OptionIndex<'a> {
    fn new(knowledge_base: &'a KnowledgeBase) -> Result<Self, TransformError> {
        let mut owner = BTreeMap::new();
        let mut options: BTreeMap<&FactId, Vec<&FactId>> = BTreeMap::new();

        for option in knowledge_base.filter(Kind::Option) {
            if let Some(view) = option.as_jump() {
                owner.insert(&option.uid, view.state_from);
                options.entry(view.state_from).or_default().push(&option.uid);
            }
        }

        let mut group: BTreeMap<&FactId, &[FactId]> = BTreeMap::new();
        let mut link_of: BTreeMap<&FactId, &FactId> = BTreeMap::new();

        for fact in knowledge_base.filter(Kind::OptionsLink) {
            let FactKind::OptionsLink(link) = &fact.kind else { continue };
            for option in &link.options {
                if let Some(previous) = link_of.insert(option, &fact.uid) {
                    if previous != &fact.uid {
                        return Err(TransformError::OptionInMultipleLinks {
                            option: option.clone(),
                            links: vec![previous.clone(), fact.uid.clone()],
                        });
                    }
                }
                group.insert(option, link.options.as_slice());
            }
        }

        Ok(Self {
            owner,
            options,
            group,
        })
    }

    /// Options that must be chosen together with `option`, itself included.
    fn linked(&self, option: &'a FactId) -> Vec<&'a FactId> {
        match self.group.get(option) {
            Some(&members) => members.iter().collect(),
            None => vec![option],
        }
    }

    /// The choice assignments implied by choosing `option`, or the first
    /// conflict with `resolved` (or within the link group itself).
    fn implied(
        &self,
        option: &'a FactId,
        resolved: &BTreeMap<&'a FactId, &'a FactId>,
    ) -> Result<BTreeMap<&'a FactId, &'a FactId>, TransformError> {
        let mut implied = BTreeMap::new();

        for member in self.linked(option) {
            let Some(choice) = self.owner.get(member).copied() else {
                continue;
            };
            let existing = implied.get(choice).or_else(|| resolved.get(choice)).copied();
            match existing {
                Some(existing) if existing != member => {
                    return Err(TransformError::ConflictingDefaultChoice {
                        choice: choice.clone(),
                        option: member.clone(),
                        conflicting: existing.clone(),
                    });
                }
                _ => {
                    implied.insert(choice, member);
                }
            }
        }

        Ok(implied)
    }
}

/// Choices in depth-first order from the absolute start, then any choice
/// the walk did not reach, in identifier order.
fn choices_in_walk_order<'a>(knowledge_base: &'a KnowledgeBase) -> Vec<&'a FactId> {
    let graph = StateGraph::new(knowledge_base);
    let mut visited: BTreeSet<&FactId> = BTreeSet::new();
    let mut order = Vec::new();

    if let Some(start) = graph.absolute_start() {
        let mut stack = vec![&start.uid];
        while let Some(state) = stack.pop() {
            if !visited.insert(state) {
                continue;
            }
            if graph.state(state).is_some_and(|fact| fact.is(Kind::Choice)) {
                order.push(state);
            }
            let mut next: Vec<&FactId> = graph.successors(state).collect();
            next.reverse();
            stack.extend(next);
        }
    }

    order.extend(
        knowledge_base
            .filter(Kind::Choice)
            .map(|choice| &choice.uid)
            .filter(|uid| !visited.contains(uid)),
    );
    order
}

/// Record one default option per choice as a `ChoicePath { default: true }`.
///
/// Existing choice paths are kept and propagated through their link groups
/// first. Each remaining choice, in walk order, picks uniformly among the
/// options compatible with what is already resolved; the pick is propagated
/// to every choice owning a linked option.
pub fn determine_default_choices<R: Rng + ?Sized>(
    knowledge_base: &mut KnowledgeBase,
    rng: &mut R,
) -> Result<(), TransformError> {
    let new_paths = {
        let index = OptionIndex::new(knowledge_base)?;
        let mut resolved: BTreeMap<&FactId, &FactId> = BTreeMap::new();

        let existing: Vec<&ChoicePath> = knowledge_base
            .filter(Kind::ChoicePath)
            .filter_map(|fact| match &fact.kind {
                FactKind::ChoicePath(path) => Some(path),
                _ => None,
            })
            .collect();
        let recorded: BTreeSet<&FactId> = existing.iter().map(|path| &path.choice).collect();

        for path in &existing {
            let implied = index.implied(&path.option, &resolved)?;
            resolved.extend(implied);
        }

        for choice in choices_in_walk_order(knowledge_base) {
            if resolved.contains_key(choice) {
                continue;
            }

            let options = index.options.get(choice).map(Vec::as_slice).unwrap_or(&[]);
            let Some(first) = options.first() else {
                return Err(TransformError::ChoiceWithoutOptions {
                    choice: choice.clone(),
                });
            };

            let compatible: Vec<_> = options
                .iter()
                .filter_map(|option| index.implied(*option, &resolved).ok())
                .collect();

            let Some(implied) = compatible.choose(rng) else {
                // every option clashes; report the clash of the first one
                return Err(index.implied(*first, &resolved).err().unwrap_or(
                    TransformError::ChoiceWithoutOptions {
                        choice: choice.clone(),
                    },
                ));
            };
            resolved.extend(implied.clone());
        }

        resolved
            .into_iter()
            .filter(|(choice, _)| !recorded.contains(choice))
            .map(|(choice, option)| Fact::derived(ChoicePath::new(choice, option, true)))
            .collect::<Vec<_>>()
    };

    tracing::debug!(added = new_paths.len(), "Determined default choices");

    knowledge_base.add_facts(new_paths)?;
    Ok(())
}

/// Point the choice that `option` leaves at `option`, and every choice
/// owning an option linked with it at that linked option.
///
/// Existing choice paths are replaced; `default` is stored on every path
/// written.
pub fn change_choice(
    knowledge_base: &mut KnowledgeBase,
    option: &FactId,
    default: bool,
) -> Result<(), TransformError> {
    let paths = {
        let index = OptionIndex::new(knowledge_base)?;
        let Some((&option, _)) = index.owner.get_key_value(option) else {
            return Err(TransformError::UnknownOption {
                option: option.clone(),
            });
        };

        index
            .implied(option, &BTreeMap::new())?
            .into_iter()
            .map(|(choice, option)| Fact::derived(ChoicePath::new(choice, option, default)))
            .collect::<Vec<_>>()
    };

    for path in paths {
        if knowledge_base.contains(&path.uid) {
            let uid = path.uid.clone();
            knowledge_base.replace_fact(&uid, path)?;
        } else {
            knowledge_base.add_fact(path)?;
        }
    }
    Ok(())
}
