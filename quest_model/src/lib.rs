//! # Quest Model
//!
//! The fact vocabulary of the quest generator. Every piece of a quest graph,
//! from world actors to plot states, jumps and replay pointers, is a [`Fact`]
//! stored by identifier in a knowledge base.
//!
//! This crate holds data definitions only: identifiers, fact kinds, the kind
//! hierarchy, actions, requirements and the `{kind, attributes}` record format.
//! It does not contain any generation or replay logic.
//!
//! ## Modules
//!
//! - **facts**: fact identifiers, the [`Fact`] envelope and all concrete kinds
//! - **actions**: side effects executed by an interpreter during replay
//! - **requirements**: conditions checked (or satisfied) by an interpreter

pub mod actions;
mod error;
pub mod facts;
pub mod requirements;

pub use error::*;
pub use facts::*;
