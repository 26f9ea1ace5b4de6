//! The `{kind, attributes}` record format.
//!
//! A fact encodes as its kind name plus a flat attribute map holding the
//! common attributes (`uid`, `tags`, `label`, `description`) next to the
//! kind-specific ones. Attributes equal to their defaults are left out.
//! Decoding goes through the kind registry ([`FactKind`]), and every payload
//! rejects unknown fields.

use serde::de::Error as _;
use serde::ser::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeSet;

use super::{Fact, FactId, FactKind, Kind};
use crate::ModelError;

/// Serialized form of a single fact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FactRecord {
    pub kind: String,

    #[serde(default)]
    pub attributes: Map<String, Value>,
}

const UID: &str = "uid";
const TAGS: &str = "tags";
const LABEL: &str = "label";
const DESCRIPTION: &str = "description";

impl Fact {
    /// Encode this fact as a record.
    pub fn to_record(&self) -> Result<FactRecord, ModelError> {
        let mut tagged = match serde_json::to_value(&self.kind)? {
            Value::Object(map) => map,
            _ => {
                return Err(ModelError::NotAnAttributeMap {
                    uid: self.uid.to_string(),
                })
            }
        };

        let mut attributes = match tagged.remove("attributes") {
            Some(Value::Object(map)) => map,
            None => Map::new(),
            Some(_) => {
                return Err(ModelError::NotAnAttributeMap {
                    uid: self.uid.to_string(),
                })
            }
        };

        attributes.insert(UID.to_string(), Value::String(self.uid.0.clone()));
        if !self.tags.is_empty() {
            attributes.insert(TAGS.to_string(), serde_json::to_value(&self.tags)?);
        }
        if let Some(label) = &self.label {
            attributes.insert(LABEL.to_string(), Value::String(label.clone()));
        }
        if let Some(description) = &self.description {
            attributes.insert(DESCRIPTION.to_string(), Value::String(description.clone()));
        }

        Ok(FactRecord {
            kind: self.kind_name().name().to_string(),
            attributes,
        })
    }

    /// Decode a fact from a record.
    pub fn from_record(record: FactRecord) -> Result<Fact, ModelError> {
        let FactRecord {
            kind,
            mut attributes,
        } = record;

        match Kind::from_name(&kind) {
            Some(known) if !known.is_abstract() => {}
            _ => return Err(ModelError::UnknownKind(kind)),
        }

        let uid: FactId = match attributes.remove(UID) {
            Some(value) => decode_common(&kind, UID, value)?,
            None => return Err(ModelError::MissingUid { kind }),
        };
        let tags: BTreeSet<String> = match attributes.remove(TAGS) {
            Some(value) => decode_common(&kind, TAGS, value)?,
            None => BTreeSet::new(),
        };
        let label: Option<String> = match attributes.remove(LABEL) {
            Some(value) => decode_common(&kind, LABEL, value)?,
            None => None,
        };
        let description: Option<String> = match attributes.remove(DESCRIPTION) {
            Some(value) => decode_common(&kind, DESCRIPTION, value)?,
            None => None,
        };

        let mut tagged = Map::new();
        tagged.insert("kind".to_string(), Value::String(kind.clone()));
        tagged.insert("attributes".to_string(), Value::Object(attributes));

        let payload: FactKind = serde_json::from_value(Value::Object(tagged)).map_err(|source| {
            ModelError::InvalidAttributes {
                kind,
                uid: uid.to_string(),
                source,
            }
        })?;

        Ok(Fact {
            uid,
            tags,
            label,
            description,
            kind: payload,
        })
    }
}

fn decode_common<T: serde::de::DeserializeOwned>(
    kind: &str,
    field: &'static str,
    value: Value,
) -> Result<T, ModelError> {
    serde_json::from_value(value).map_err(|source| ModelError::MalformedAttribute {
        kind: kind.to_string(),
        field,
        source,
    })
}

impl Serialize for Fact {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_record()
            .map_err(S::Error::custom)?
            .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Fact {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let record = FactRecord::deserialize(deserializer)?;
        Fact::from_record(record).map_err(D::Error::custom)
    }
}
