//! Restrictions - structural validators over a knowledge base.
//!
//! Each restriction checks one property and reports the first violation
//! it finds with the offending identifiers. Later restrictions in a set may
//! assume the earlier structural ones hold.

mod decisions;
mod graph;
mod integrity;
mod structure;

pub use decisions::*;
pub use graph::*;
pub use integrity::*;
pub use structure::*;

use thiserror::Error;

use quest_model::{Fact, FactId};

use crate::error::join_ids;
use crate::knowledge_base::{KnowledgeBase, StateGraph};

/// Violated structural property. Always a rollback condition.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RestrictionError {
    #[error("No start state without incoming jumps")]
    NoStartState,

    #[error("Multiple start states without incoming jumps: {}", join_ids(.starts))]
    MultipleStartStates { starts: Vec<FactId> },

    #[error("No finish state")]
    NoFinishState,

    #[error("State {state} has no outgoing jumps")]
    StateWithoutJumps { state: FactId },

    #[error("States not reachable from the start: {}", join_ids(.states))]
    UnreachedStates { states: Vec<FactId> },

    #[error("Cycle in jump graph: {}", join_ids(.path))]
    CycleDetected { path: Vec<FactId> },

    #[error("Option {option} leaves {state}, which is not a choice")]
    OptionFromNonChoice { option: FactId, state: FactId },

    #[error("Jump {jump} leaves choice {choice} but is not an option")]
    NonOptionJumpFromChoice { jump: FactId, choice: FactId },

    #[error("Answer {answer} leaves {state}, which is not a question")]
    AnswerFromNonQuestion { answer: FactId, state: FactId },

    #[error("Jump {jump} leaves question {question} but is not an answer")]
    NonAnswerJumpFromQuestion { jump: FactId, question: FactId },

    #[error("Question {question} has {count} answers, expected 2")]
    WrongAnswersCount { question: FactId, count: usize },

    #[error("Answers of question {question} do not cover both true and false")]
    AnswersNotComplementary { question: FactId },

    #[error(
        "Finish {finish} results do not match participants (missing: {}; unexpected: {})",
        join_ids(.missing),
        join_ids(.unexpected)
    )]
    FinishResultsMismatch {
        finish: FactId,
        missing: Vec<FactId>,
        unexpected: Vec<FactId>,
    },

    #[error("Fact {fact} references missing fact {target} in `{field}`")]
    BrokenReference {
        fact: FactId,
        field: &'static str,
        target: FactId,
    },

    #[error("Object {object} has several locations: {}", join_ids(.locations))]
    MultipleLocations { object: FactId, locations: Vec<FactId> },

    #[error("Choice {choice} has no choice path")]
    MissingChoicePath { choice: FactId },

    #[error("Choice {choice} has {count} choice paths")]
    MultipleChoicePaths { choice: FactId, count: usize },

    #[error("Choice path of {choice} points at {option}, which does not leave it")]
    ChoicePathOptionMismatch { choice: FactId, option: FactId },
}

/// A pure check of one structural property.
pub trait Restriction {
    fn name(&self) -> &'static str;

    fn check(&self, knowledge_base: &KnowledgeBase) -> Result<(), RestrictionError>;
}

/// Restrictions every freshly generated quest must satisfy.
pub fn generation_set() -> Vec<Box<dyn Restriction>> {
    vec![
        Box::new(SingleStartStateWithNoEnters),
        Box::new(FinishStateExists),
        Box::new(AllStatesHasJumps),
        Box::new(ConnectedStateJumpGraph),
        Box::new(NoCirclesInStateJumpGraph),
        Box::new(ChoicesConsistency),
        Box::new(QuestionsConsistency),
        Box::new(FinishResultsConsistency),
        Box::new(ReferencesIntegrity),
        Box::new(SingleLocationForObject),
    ]
}

/// [`generation_set`] plus the checks a graph needs before it can be replayed.
pub fn replay_set() -> Vec<Box<dyn Restriction>> {
    let mut restrictions = generation_set();
    restrictions.push(Box::new(DefaultChoicesAssigned));
    restrictions
}

/// The unique start with no incoming jumps, or the matching violation.
pub(crate) fn absolute_start<'a>(graph: &StateGraph<'a>) -> Result<&'a Fact, RestrictionError> {
    match graph.starts_without_enters().as_slice() {
        [] => Err(RestrictionError::NoStartState),
        [start] => Ok(*start),
        starts => Err(RestrictionError::MultipleStartStates {
            starts: starts.iter().map(|start| start.uid.clone()).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;

    #[test]
    fn test_sets() {
        let generation: Vec<_> = generation_set().iter().map(|r| r.name()).collect();
        let replay: Vec<_> = replay_set().iter().map(|r| r.name()).collect();

        assert_eq!(generation.first(), Some(&"SingleStartStateWithNoEnters"));
        assert_eq!(replay.len(), generation.len() + 1);
        assert_eq!(replay.last(), Some(&"DefaultChoicesAssigned"));
    }

    #[test]
    fn test_linear_quest_passes_generation_set() {
        let kb = testing::linear_quest();
        assert_eq!(kb.validate(&generation_set()), Ok(()));
    }

    #[test]
    fn test_error_message_lists_ids() {
        let err = RestrictionError::CycleDetected {
            path: vec![FactId::new("a"), FactId::new("b"), FactId::new("a")],
        };
        assert_eq!(err.to_string(), "Cycle in jump graph: a, b, a");
    }
}
