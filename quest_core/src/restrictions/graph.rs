//! Graph-shape restrictions: reachability and acyclicity of the jump graph.

use std::collections::BTreeMap;

use quest_model::FactId;

use super::{absolute_start, Restriction, RestrictionError};
use crate::knowledge_base::{KnowledgeBase, StateGraph};

/// Every state is reachable from the absolute start.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectedStateJumpGraph;

impl Restriction for ConnectedStateJumpGraph {
    fn name(&self) -> &'static str {
        "ConnectedStateJumpGraph"
    }

    fn check(&self, knowledge_base: &KnowledgeBase) -> Result<(), RestrictionError> {
        let graph = StateGraph::new(knowledge_base);
        let start = absolute_start(&graph)?;
        let reached = graph.reachable_from(&start.uid);

        let unreached: Vec<FactId> = graph
            .states()
            .filter(|state| !reached.contains(&state.uid))
            .map(|state| state.uid.clone())
            .collect();

        if unreached.is_empty() {
            Ok(())
        } else {
            Err(RestrictionError::UnreachedStates { states: unreached })
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    OnPath,
    Done,
}

/// The jump graph reachable from the absolute start has no cycles.
///
/// Depth-first search with on-path marking; a cycle is reported as the path
/// from the first occurrence of the repeated state back to it.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCirclesInStateJumpGraph;

impl Restriction for NoCirclesInStateJumpGraph {
    fn name(&self) -> &'static str {
        "NoCirclesInStateJumpGraph"
    }

    fn check(&self, knowledge_base: &KnowledgeBase) -> Result<(), RestrictionError> {
        let graph = StateGraph::new(knowledge_base);
        let start = &absolute_start(&graph)?.uid;

        let mut marks: BTreeMap<&FactId, Mark> = BTreeMap::new();
        let mut stack: Vec<(&FactId, std::vec::IntoIter<&FactId>)> = Vec::new();

        marks.insert(start, Mark::OnPath);
        stack.push((start, graph.successors(start).collect::<Vec<_>>().into_iter()));

        while let Some((node, children)) = stack.last_mut() {
            let node = *node;
            let Some(next) = children.next() else {
                marks.insert(node, Mark::Done);
                stack.pop();
                continue;
            };

            if !graph.contains_state(next) {
                continue;
            }

            match marks.get(next) {
                Some(Mark::OnPath) => {
                    let mut path: Vec<FactId> = stack
                        .iter()
                        .map(|(id, _)| *id)
                        .skip_while(|id| *id != next)
                        .cloned()
                        .collect();
                    path.push(next.clone());
                    return Err(RestrictionError::CycleDetected { path });
                }
                Some(Mark::Done) => {}
                None => {
                    marks.insert(next, Mark::OnPath);
                    stack.push((next, graph.successors(next).collect::<Vec<_>>().into_iter()));
                }
            }
        }

        Ok(())
    }
}
