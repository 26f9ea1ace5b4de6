//! Machine - pointer-driven replay of a validated quest graph.
//!
//! The replay position is a [`Pointer`] fact stored in the knowledge base.
//! One [`Machine::step`] either enters a state or commits to a jump out of
//! the current one; requirement checks and side effects go through the
//! [`Interpreter`].

mod interpreter;

pub use interpreter::*;

use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeSet;
use thiserror::Error;

use quest_model::{Fact, FactId, FactKind, Kind, Pointer};

use crate::knowledge_base::{KnowledgeBase, KnowledgeBaseError, StateGraph};
use crate::transformators::{change_choice, TransformError};

/// Replay failures. None of them are retried: they mean the graph was not
/// actually valid.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum MachineError {
    #[error("No jumps available from state {state}")]
    NoJumpsAvailable { state: FactId },

    #[error("No jumps from last state {state}")]
    NoJumpsFromLastState { state: FactId },

    #[error("No start state to replay from")]
    NoStartState,

    #[error("Question {question} has no answer for condition {condition}")]
    NoAnswerForCondition { question: FactId, condition: bool },

    #[error("Choice {choice} has {count} choice paths, expected 1")]
    AmbiguousChoicePath { choice: FactId, count: usize },

    #[error("Pointer references missing fact {id}")]
    MissingFact { id: FactId },

    #[error(transparent)]
    Store(#[from] KnowledgeBaseError),

    #[error(transparent)]
    Choice(#[from] TransformError),
}

/// The next decision point ahead of the pointer.
#[derive(Debug, Clone, PartialEq)]
pub struct NearestChoice {
    pub choice: FactId,
    pub options: Vec<FactId>,
    /// The option the choice's path currently points at.
    pub default: Option<FactId>,
}

/// Replays a knowledge base one micro-transition at a time.
pub struct Machine<I, R> {
    knowledge_base: KnowledgeBase,
    interpreter: I,
    rng: R,
}

impl<I: Interpreter, R: Rng> Machine<I, R> {
    pub fn new(knowledge_base: KnowledgeBase, interpreter: I, rng: R) -> Self {
        Self {
            knowledge_base,
            interpreter,
            rng,
        }
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.knowledge_base
    }

    pub fn interpreter(&self) -> &I {
        &self.interpreter
    }

    pub fn interpreter_mut(&mut self) -> &mut I {
        &mut self.interpreter
    }

    pub fn into_parts(self) -> (KnowledgeBase, I, R) {
        (self.knowledge_base, self.interpreter, self.rng)
    }

    /// The replay position; empty when replay has not started.
    pub fn pointer(&self) -> Pointer {
        match self.knowledge_base.get(Pointer::UID).map(|fact| &fact.kind) {
            Some(FactKind::Pointer(pointer)) => pointer.clone(),
            _ => Pointer::default(),
        }
    }

    pub fn current_state(&self) -> Option<&Fact> {
        self.pointer()
            .state
            .and_then(|state| self.knowledge_base.get(&state))
    }

    pub fn current_jump(&self) -> Option<&Fact> {
        self.pointer()
            .jump
            .and_then(|jump| self.knowledge_base.get(&jump))
    }

    /// The state the next step would enter, if it enters one.
    pub fn next_state(&self) -> Option<&Fact> {
        let pointer = self.pointer();
        match (&pointer.state, &pointer.jump) {
            (None, _) => self.start_state().ok(),
            (Some(_), Some(jump)) => self
                .knowledge_base
                .get(jump)
                .and_then(Fact::as_jump)
                .and_then(|view| self.knowledge_base.get(view.state_to)),
            (Some(_), None) => None,
        }
    }

    /// True once the pointer rests on a finish with no way out.
    pub fn is_processed(&self) -> bool {
        let pointer = self.pointer();
        match (&pointer.state, &pointer.jump) {
            (Some(state), None) => self.is_last_state(state),
            _ => false,
        }
    }

    /// The absolute start of the graph.
    pub fn start_state(&self) -> Result<&Fact, MachineError> {
        StateGraph::new(&self.knowledge_base)
            .absolute_start()
            .ok_or(MachineError::NoStartState)
    }

    /// Jumps (options and answers included) leaving `state`.
    pub fn available_jumps(&self, state: &FactId) -> Vec<&Fact> {
        StateGraph::new(&self.knowledge_base).jumps_from(state).to_vec()
    }

    /// Decide the jump to take out of `state`: the recorded path of a
    /// choice, the answer matching a question's condition, or a uniformly
    /// random one otherwise.
    pub fn next_jump(&mut self, state: &FactId) -> Result<FactId, MachineError> {
        let fact = self
            .knowledge_base
            .get(state)
            .ok_or_else(|| MachineError::MissingFact { id: state.clone() })?;

        let jumps = StateGraph::new(&self.knowledge_base).jumps_from(state).to_vec();
        if jumps.is_empty() {
            return Err(if fact.is(Kind::Finish) {
                MachineError::NoJumpsFromLastState { state: state.clone() }
            } else {
                MachineError::NoJumpsAvailable { state: state.clone() }
            });
        }

        match &fact.kind {
            FactKind::Choice(_) => {
                let paths: Vec<&FactId> = self
                    .knowledge_base
                    .filter(Kind::ChoicePath)
                    .filter_map(|fact| match &fact.kind {
                        FactKind::ChoicePath(path) if path.choice == *state => Some(&path.option),
                        _ => None,
                    })
                    .collect();

                match paths.as_slice() {
                    [option] => Ok((*option).clone()),
                    _ => Err(MachineError::AmbiguousChoicePath {
                        choice: state.clone(),
                        count: paths.len(),
                    }),
                }
            }
            FactKind::Question(question) => {
                let condition = question
                    .condition
                    .iter()
                    .all(|requirement| check_requirement(&self.interpreter, requirement));

                jumps
                    .iter()
                    .find(|jump| matches!(&jump.kind, FactKind::Answer(answer) if answer.condition == condition))
                    .map(|jump| jump.uid.clone())
                    .ok_or_else(|| MachineError::NoAnswerForCondition {
                        question: state.clone(),
                        condition,
                    })
            }
            _ => jumps
                .choose(&mut self.rng)
                .map(|jump| jump.uid.clone())
                .ok_or_else(|| MachineError::NoJumpsAvailable { state: state.clone() }),
        }
    }

    /// Whether [`Machine::step`] can run now.
    ///
    /// Entering the start is always possible. Committing to a jump is
    /// possible unless the current state is a finish with no way out.
    /// Completing a jump waits until the target's requirements hold.
    pub fn can_do_step(&self) -> bool {
        let pointer = self.pointer();
        match (&pointer.state, &pointer.jump) {
            (None, _) => true,
            (Some(state), None) => !self.is_last_state(state),
            (Some(_), Some(_)) => self.next_state().is_some_and(|state| {
                state.as_state().is_some_and(|view| {
                    view.require
                        .iter()
                        .all(|requirement| check_requirement(&self.interpreter, requirement))
                })
            }),
        }
    }

    /// Advance one micro-transition.
    pub fn step(&mut self) -> Result<(), MachineError> {
        let pointer = self.pointer();
        match (pointer.state, pointer.jump) {
            (None, _) => {
                let start = self.start_state()?.uid.clone();
                self.enter_state(&start)
            }
            (Some(state), None) => {
                let jump = self.next_jump(&state)?;
                self.start_jump(&state, &jump)
            }
            (Some(_), Some(jump)) => self.finish_jump(&jump),
        }
    }

    /// Step for as long as steps are possible; returns when the quest is
    /// processed or the next state's requirements do not hold yet.
    pub fn step_until_can(&mut self) -> Result<(), MachineError> {
        while self.can_do_step() {
            self.step()?;
        }
        Ok(())
    }

    /// Ask the interpreter to make every requirement of `state` hold.
    pub fn satisfy_requirements(&mut self, state: &FactId) -> Result<(), MachineError> {
        let fact = self
            .knowledge_base
            .get(state)
            .ok_or_else(|| MachineError::MissingFact { id: state.clone() })?;

        if let Some(view) = fact.as_state() {
            for requirement in view.require {
                satisfy_requirement(&mut self.interpreter, requirement);
            }
        }
        Ok(())
    }

    /// Follow single-jump paths forward from the pointer to the next choice.
    pub fn nearest_choice(&self) -> Result<Option<NearestChoice>, MachineError> {
        let graph = StateGraph::new(&self.knowledge_base);
        let pointer = self.pointer();

        let mut current = match (&pointer.state, &pointer.jump) {
            (None, _) => self.start_state()?.uid.clone(),
            (Some(_), Some(_)) => match self.next_state() {
                Some(state) => state.uid.clone(),
                None => return Ok(None),
            },
            (Some(state), None) => state.clone(),
        };

        let mut visited = BTreeSet::new();
        while visited.insert(current.clone()) {
            let Some(state) = graph.state(&current) else {
                return Ok(None);
            };

            if state.is(Kind::Choice) {
                let options = graph
                    .jumps_from(&current)
                    .iter()
                    .filter(|jump| jump.is(Kind::Option))
                    .map(|jump| jump.uid.clone())
                    .collect();

                let default = self
                    .knowledge_base
                    .filter(Kind::ChoicePath)
                    .find_map(|fact| match &fact.kind {
                        FactKind::ChoicePath(path) if path.choice == current => Some(path.option.clone()),
                        _ => None,
                    });

                return Ok(Some(NearestChoice {
                    choice: current,
                    options,
                    default,
                }));
            }

            match graph.successors(&current).collect::<Vec<_>>().as_slice() {
                [next] => current = (*next).clone(),
                _ => return Ok(None),
            }
        }

        Ok(None)
    }

    /// Explicitly choose `option`; linked options follow.
    pub fn make_choice(&mut self, option: &FactId) -> Result<(), MachineError> {
        change_choice(&mut self.knowledge_base, option, false)?;
        Ok(())
    }

    fn is_last_state(&self, state: &FactId) -> bool {
        self.knowledge_base
            .get(state)
            .is_some_and(|fact| fact.is(Kind::Finish))
            && StateGraph::new(&self.knowledge_base).jumps_from(state).is_empty()
    }

    fn set_pointer(&mut self, state: &FactId, jump: Option<&FactId>) -> Result<(), MachineError> {
        let pointer = Fact::derived(Pointer::new(Some(state.clone()), jump.cloned()));

        tracing::debug!(state = %state, jump = ?jump.map(FactId::as_str), "Moved pointer");

        if self.knowledge_base.contains(Pointer::UID) {
            self.knowledge_base.replace_fact(&Pointer::uid(), pointer)?;
        } else {
            self.knowledge_base.add_fact(pointer)?;
        }
        Ok(())
    }

    fn enter_state(&mut self, state: &FactId) -> Result<(), MachineError> {
        let fact = self
            .knowledge_base
            .get(state)
            .cloned()
            .ok_or_else(|| MachineError::MissingFact { id: state.clone() })?;

        self.set_pointer(state, None)?;

        self.interpreter.on_state_before_actions(&fact);
        if let Some(view) = fact.as_state() {
            for action in view.actions {
                do_action(&mut self.interpreter, action);
            }
        }
        self.interpreter.on_state_after_actions(&fact);
        Ok(())
    }

    fn start_jump(&mut self, state: &FactId, jump: &FactId) -> Result<(), MachineError> {
        let fact = self
            .knowledge_base
            .get(jump)
            .cloned()
            .ok_or_else(|| MachineError::MissingFact { id: jump.clone() })?;

        self.set_pointer(state, Some(jump))?;

        self.interpreter.on_jump_start_before_actions(&fact);
        if let Some(view) = fact.as_jump() {
            for action in view.start_actions {
                do_action(&mut self.interpreter, action);
            }
        }
        self.interpreter.on_jump_start_after_actions(&fact);
        Ok(())
    }

    fn finish_jump(&mut self, jump: &FactId) -> Result<(), MachineError> {
        let fact = self
            .knowledge_base
            .get(jump)
            .cloned()
            .ok_or_else(|| MachineError::MissingFact { id: jump.clone() })?;
        let Some(view) = fact.as_jump() else {
            return Err(MachineError::MissingFact { id: jump.clone() });
        };

        self.interpreter.on_jump_end_before_actions(&fact);
        for action in view.end_actions {
            do_action(&mut self.interpreter, action);
        }
        self.interpreter.on_jump_end_after_actions(&fact);

        self.enter_state(view.state_to)
    }
}
