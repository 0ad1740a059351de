//! Dataset manifest and file schemas.

use serde::{Deserialize, Serialize};

use super::ids::deserialize_id;
use super::link::Link;
use super::node::Node;

/// Index mapping title ids to their dataset files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub version: u32,
    pub titles: Vec<ManifestEntry>,
}

impl Manifest {
    /// Find the entry for a title id.
    pub fn entry(&self, title: &str) -> Option<&ManifestEntry> {
        self.titles.iter().find(|e| e.id == title)
    }
}

/// One title in the manifest.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    #[serde(deserialize_with = "deserialize_id")]
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(flatten)]
    pub layout: DatasetLayout,
}

/// How a title's graph is stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DatasetLayout {
    /// One graph file.
    Single { file: String },
    /// A meta file listing the constituent part files.
    Split { meta: String },
}

/// Contents of a split dataset's meta file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SplitMeta {
    pub parts: Vec<PartRef>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartRef {
    pub file: String,
}

/// A single graph file or one part of a split dataset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphFile {
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
}
