//! Lenient id decoding shared by nodes, links and manifests.

use serde::{Deserialize, Deserializer};

/// An id as it may appear on the wire: a string or an integer.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(raw: RawId) -> Self {
        match raw {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// A link endpoint: a bare id, or a node object carrying an `id`.
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum RawEndpoint {
    Bare(RawId),
    Embedded { id: RawId },
}

impl From<RawEndpoint> for String {
    fn from(raw: RawEndpoint) -> Self {
        match raw {
            RawEndpoint::Bare(id) | RawEndpoint::Embedded { id } => id.into(),
        }
    }
}

pub(crate) fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawId::deserialize(deserializer).map(String::from)
}

/// Optional text that some exports write as numbers (`"title": 26`).
pub(crate) fn deserialize_opt_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<RawId>::deserialize(deserializer)?.map(String::from))
}
