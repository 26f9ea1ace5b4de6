//! A read-only jump index over the plot states of a knowledge base.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use quest_model::{Fact, FactId, Kind};

use super::KnowledgeBase;

/// Outgoing/incoming jump lists per state.
///
/// Jumps are indexed by their endpoint identifiers even when those do not
/// resolve to a state, so broken edges stay visible to the passes that
/// clean them up.
#[derive(Debug, Clone)]
pub struct StateGraph<'a> {
    states: BTreeMap<&'a FactId, &'a Fact>,
    outgoing: BTreeMap<&'a FactId, Vec<&'a Fact>>,
    incoming: BTreeMap<&'a FactId, Vec<&'a Fact>>,
}

impl<'a> StateGraph<'a> {
    /// Build the index from every State and Jump (subkinds included).
    pub fn new(knowledge_base: &'a KnowledgeBase) -> Self {
        let states = knowledge_base
            .filter(Kind::State)
            .map(|fact| (&fact.uid, fact))
            .collect();

        let mut outgoing: BTreeMap<&'a FactId, Vec<&'a Fact>> = BTreeMap::new();
        let mut incoming: BTreeMap<&'a FactId, Vec<&'a Fact>> = BTreeMap::new();

        for fact in knowledge_base.filter(Kind::Jump) {
            if let Some(jump) = fact.as_jump() {
                outgoing.entry(jump.state_from).or_default().push(fact);
                incoming.entry(jump.state_to).or_default().push(fact);
            }
        }

        Self {
            states,
            outgoing,
            incoming,
        }
    }

    pub fn state(&self, id: &FactId) -> Option<&'a Fact> {
        self.states.get(id).copied()
    }

    pub fn contains_state(&self, id: &FactId) -> bool {
        self.states.contains_key(id)
    }

    /// All states in identifier order.
    pub fn states(&self) -> impl Iterator<Item = &'a Fact> + '_ {
        self.states.values().copied()
    }

    pub fn state_count(&self) -> usize {
        self.states.len()
    }

    /// Jumps leaving `state`, in identifier order.
    pub fn jumps_from(&self, state: &FactId) -> &[&'a Fact] {
        self.outgoing.get(state).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Jumps entering `state`, in identifier order.
    pub fn jumps_to(&self, state: &FactId) -> &[&'a Fact] {
        self.incoming.get(state).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Target states of the jumps leaving `state`.
    pub fn successors(&self, state: &FactId) -> impl Iterator<Item = &'a FactId> + '_ {
        self.jumps_from(state)
            .iter()
            .filter_map(|jump| jump.as_jump().map(|view| view.state_to))
    }

    /// Start states with no incoming jump, across every nesting level.
    pub fn starts_without_enters(&self) -> Vec<&'a Fact> {
        self.states
            .values()
            .copied()
            .filter(|state| state.is(Kind::Start) && self.jumps_to(&state.uid).is_empty())
            .collect()
    }

    /// The true entry of the quest: the only Start with no incoming jump.
    ///
    /// Returns `None` when there is no such start or more than one.
    pub fn absolute_start(&self) -> Option<&'a Fact> {
        match self.starts_without_enters().as_slice() {
            [start] => Some(*start),
            _ => None,
        }
    }

    /// Breadth-first set of state identifiers reachable from `from`, `from`
    /// included. Edges to unknown states are not followed.
    pub fn reachable_from(&self, from: &'a FactId) -> BTreeSet<&'a FactId> {
        let mut visited = BTreeSet::new();
        let mut queue = VecDeque::new();

        visited.insert(from);
        queue.push_back(from);

        while let Some(current) = queue.pop_front() {
            for next in self.successors(current) {
                if self.contains_state(next) && visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }

        visited
    }
}
