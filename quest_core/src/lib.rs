//! # Quest Core
//!
//! Procedural generation and replay of branching quest graphs. This crate
//! builds on the fact vocabulary of `quest_model`.
//!
//! ## Core Components
//!
//! - **knowledge_base**: identifier-keyed fact store plus a jump index over plot states
//! - **selector**: constraint-driven assignment of world actors to quest roles
//! - **restrictions**: structural validators over a knowledge base
//! - **transformators**: graph-rewriting passes run after quest assembly
//! - **machine**: pointer-driven replay of a validated graph
//! - **generator**: the bounded retry loop tying generation together
//!
//! ## Failure Model
//!
//! Random generation fails routinely. Any [`RollbackError`] means "discard
//! this attempt and start over from a fresh world"; the [`Generator`] does
//! exactly that until it succeeds or runs out of attempts.

mod error;
pub mod generator;
pub mod knowledge_base;
pub mod machine;
pub mod restrictions;
pub mod selector;
pub mod transformators;

#[cfg(test)]
pub(crate) mod testing;

pub use error::*;
pub use generator::*;
pub use knowledge_base::*;
pub use machine::*;
pub use selector::*;
