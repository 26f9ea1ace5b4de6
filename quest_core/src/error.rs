//! Generation error classes.
//!
//! Errors are split by how the generator reacts to them:
//! - [`RollbackError`]: an ordinary outcome of random generation; the attempt
//!   is discarded and generation restarts from a fresh world
//! - store errors: a broken template or world snapshot; never retried

use thiserror::Error;

use quest_model::FactId;

use crate::knowledge_base::KnowledgeBaseError;
use crate::restrictions::RestrictionError;
use crate::selector::SelectorError;
use crate::transformators::TransformError;

/// Retryable generation failures.
#[derive(Debug, Error)]
pub enum RollbackError {
    #[error(transparent)]
    Selector(#[from] SelectorError),

    #[error(transparent)]
    Restriction(#[from] RestrictionError),

    #[error(transparent)]
    Transform(TransformError),
}

/// Errors surfaced by quest templates and the generator.
#[derive(Debug, Error)]
pub enum GenerationError {
    /// The attempt must be discarded and generation restarted.
    #[error("Generation rolled back: {0}")]
    Rollback(#[from] RollbackError),

    /// The store rejected an operation; fatal to the current generation.
    #[error("Knowledge base error: {0}")]
    Store(#[from] KnowledgeBaseError),

    /// Every attempt rolled back.
    #[error("Generation failed after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: RollbackError },
}

impl GenerationError {
    /// Whether the generator should retry after this error.
    pub fn is_rollback(&self) -> bool {
        matches!(self, GenerationError::Rollback(_))
    }
}

impl From<SelectorError> for GenerationError {
    fn from(err: SelectorError) -> Self {
        Self::Rollback(RollbackError::Selector(err))
    }
}

impl From<RestrictionError> for GenerationError {
    fn from(err: RestrictionError) -> Self {
        Self::Rollback(RollbackError::Restriction(err))
    }
}

impl From<TransformError> for GenerationError {
    fn from(err: TransformError) -> Self {
        match err {
            TransformError::Store(store) => Self::Store(store),
            other => Self::Rollback(RollbackError::Transform(other)),
        }
    }
}

/// Comma-separated identifiers for error messages.
pub(crate) fn join_ids(ids: &[FactId]) -> String {
    ids.iter().map(FactId::as_str).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selector_errors_roll_back() {
        let err = GenerationError::from(SelectorError::NoLocation {
            objects: vec![FactId::new("ghost")],
        });
        assert!(err.is_rollback());
    }

    #[test]
    fn test_store_errors_are_fatal() {
        let err = GenerationError::from(KnowledgeBaseError::DuplicateFact(FactId::new("a")));
        assert!(!err.is_rollback());

        let err = GenerationError::from(TransformError::Store(
            KnowledgeBaseError::FactNotFound(FactId::new("a")),
        ));
        assert!(!err.is_rollback());
    }

    #[test]
    fn test_authoring_errors_roll_back() {
        let err = GenerationError::from(TransformError::EventWithoutMembers {
            event: FactId::new("ev_ambush"),
        });
        assert!(err.is_rollback());
    }
}
