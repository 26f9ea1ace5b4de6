//! Fact definitions - the universal elements of a quest graph.
//!
//! The vocabulary consists of:
//! - **Actors**: world entities that quest roles are bound to
//! - **Plot**: states (graph nodes) and jumps (graph edges)
//! - **Relations**: world facts about actors (location, social ties, constraints)
//! - **Meta**: events, option links, resolved choices, participants, the replay pointer

mod actors;
mod fact;
mod kind;
mod meta;
mod plot;
mod record;
mod relations;

pub use actors::*;
pub use fact::*;
pub use kind::*;
pub use meta::*;
pub use plot::*;
pub use record::*;
pub use relations::*;

/// Used by `skip_serializing_if` to drop attributes equal to their defaults.
pub(crate) fn is_default<T: Default + PartialEq>(value: &T) -> bool {
    *value == T::default()
}
