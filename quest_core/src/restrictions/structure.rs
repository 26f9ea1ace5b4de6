//! Structural restrictions on starts, finishes and outgoing jumps.

use quest_model::Kind;

use super::{absolute_start, Restriction, RestrictionError};
use crate::knowledge_base::{KnowledgeBase, StateGraph};

/// Exactly one Start has no incoming jump.
#[derive(Debug, Clone, Copy, Default)]
pub struct SingleStartStateWithNoEnters;

impl Restriction for SingleStartStateWithNoEnters {
    fn name(&self) -> &'static str {
        "SingleStartStateWithNoEnters"
    }

    fn check(&self, knowledge_base: &KnowledgeBase) -> Result<(), RestrictionError> {
        absolute_start(&StateGraph::new(knowledge_base)).map(|_| ())
    }
}

/// At least one Finish exists.
#[derive(Debug, Clone, Copy, Default)]
pub struct FinishStateExists;

impl Restriction for FinishStateExists {
    fn name(&self) -> &'static str {
        "FinishStateExists"
    }

    fn check(&self, knowledge_base: &KnowledgeBase) -> Result<(), RestrictionError> {
        match knowledge_base.filter(Kind::Finish).next() {
            Some(_) => Ok(()),
            None => Err(RestrictionError::NoFinishState),
        }
    }
}

/// Every non-Finish state has at least one outgoing jump.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllStatesHasJumps;

impl Restriction for AllStatesHasJumps {
    fn name(&self) -> &'static str {
        "AllStatesHasJumps"
    }

    fn check(&self, knowledge_base: &KnowledgeBase) -> Result<(), RestrictionError> {
        let graph = StateGraph::new(knowledge_base);

        let result = match graph
            .states()
            .find(|state| !state.is(Kind::Finish) && graph.jumps_from(&state.uid).is_empty())
        {
            Some(state) => Err(RestrictionError::StateWithoutJumps {
                state: state.uid.clone(),
            }),
            None => Ok(()),
        };
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing;
    use quest_model::{Fact, FactId, Jump, Start, State};

    #[test]
    fn test_single_start() {
        let kb = testing::linear_quest();
        assert_eq!(SingleStartStateWithNoEnters.check(&kb), Ok(()));
    }

    #[test]
    fn test_two_starts_rejected() {
        let mut kb = testing::linear_quest();
        kb.add_facts([
            Fact::new("start_2", Start::new("other", 0)),
            Fact::derived(Jump::new("start_2", "a")),
        ])
        .unwrap();

        assert_eq!(
            SingleStartStateWithNoEnters.check(&kb),
            Err(RestrictionError::MultipleStartStates {
                starts: vec![FactId::new("start"), FactId::new("start_2")],
            })
        );
    }

    #[test]
    fn test_no_start_rejected() {
        let mut kb = testing::linear_quest();
        kb.add_fact(Fact::derived(Jump::new("a", "start"))).unwrap();
        assert_eq!(
            SingleStartStateWithNoEnters.check(&kb),
            Err(RestrictionError::NoStartState)
        );
    }

    #[test]
    fn test_finish_required() {
        let mut kb = testing::linear_quest();
        assert_eq!(FinishStateExists.check(&kb), Ok(()));

        kb.remove_fact(&FactId::new("finish")).unwrap();
        assert_eq!(FinishStateExists.check(&kb), Err(RestrictionError::NoFinishState));
    }

    #[test]
    fn test_dead_end_state_rejected() {
        let mut kb = testing::linear_quest();
        assert_eq!(AllStatesHasJumps.check(&kb), Ok(()));

        kb.add_facts([
            Fact::new("dead_end", State::new()),
            Fact::derived(Jump::new("a", "dead_end")),
        ])
        .unwrap();
        assert_eq!(
            AllStatesHasJumps.check(&kb),
            Err(RestrictionError::StateWithoutJumps {
                state: FactId::new("dead_end"),
            })
        );
    }
}
