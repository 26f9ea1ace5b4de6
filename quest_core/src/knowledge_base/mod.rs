//! Knowledge Base module - the identifier-keyed store of all facts of one
//! generation or replay session.
//!
//! The module consists of:
//! - **KnowledgeBase**: the store itself, with bulk add/remove, kind filtering and validation
//! - **StateGraph**: a read-only jump index over the plot states of a store

mod graph;
mod store;

pub use graph::*;
pub use store::*;
