//! Errors raised while encoding or decoding facts.

use thiserror::Error;

/// Errors produced by the `{kind, attributes}` record format.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The record names a kind that is not registered, or an abstract kind.
    #[error("Unknown fact kind: {0}")]
    UnknownKind(String),

    /// Every record must carry a `uid` attribute.
    #[error("Fact of kind {kind} has no uid")]
    MissingUid { kind: String },

    /// A common attribute (`uid`, `tags`, `label`, `description`) has the wrong shape.
    #[error("Malformed attribute `{field}` on {kind} fact: {source}")]
    MalformedAttribute {
        kind: String,
        field: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// Kind-specific attributes are missing, unknown or have the wrong shape.
    #[error("Invalid attributes for {kind} fact {uid}: {source}")]
    InvalidAttributes {
        kind: String,
        uid: String,
        #[source]
        source: serde_json::Error,
    },

    /// The kind payload did not encode to an attribute map.
    #[error("Fact {uid} did not encode to an attribute map")]
    NotAnAttributeMap { uid: String },

    #[error("Encoding error: {0}")]
    Encode(#[from] serde_json::Error),
}
