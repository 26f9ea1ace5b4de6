//! Transformators - graph-rewriting passes run after quest assembly.
//!
//! The generator applies them in this order:
//! 1. [`activate_events`]: keep one random member per event
//! 2. [`remove_restricted_states`]: drop branches that violate alignment constraints
//! 3. [`remove_broken_states`]: prune dead ends and orphans to a fixed point
//! 4. [`remove_unused_actors`]: optional world cleanup
//! 5. [`determine_default_choices`]: record one default option per choice
//!
//! [`change_choice`] re-points a choice at replay time.

mod actors;
mod choices;
mod events;
mod pruning;

pub use actors::*;
pub use choices::*;
pub use events::*;
pub use pruning::*;

use thiserror::Error;

use quest_model::FactId;

use crate::error::join_ids;
use crate::knowledge_base::KnowledgeBaseError;

/// Authoring errors found while rewriting, plus store failures.
///
/// Everything except [`TransformError::Store`] is a rollback condition:
/// a different random draw of the templates may avoid it.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TransformError {
    #[error("Fact {fact} is tagged by several events: {}", join_ids(.events))]
    MultipleEventTags { fact: FactId, events: Vec<FactId> },

    #[error("Event {event} has no tagged jumps")]
    EventWithoutMembers { event: FactId },

    #[error("Option {option} belongs to several links: {}", join_ids(.links))]
    OptionInMultipleLinks { option: FactId, links: Vec<FactId> },

    #[error("Choice {choice} cannot default to {option}: already resolved to {conflicting}")]
    ConflictingDefaultChoice {
        choice: FactId,
        option: FactId,
        conflicting: FactId,
    },

    #[error("Choice {choice} has no options")]
    ChoiceWithoutOptions { choice: FactId },

    #[error("Unknown option: {option}")]
    UnknownOption { option: FactId },

    #[error(transparent)]
    Store(#[from] KnowledgeBaseError),
}
