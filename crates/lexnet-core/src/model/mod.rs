//! Graph data model: nodes, links, time scopes and dataset manifests.
//!
//! Everything here deserialises straight from the dataset JSON files.
//! Link endpoints arrive either as bare ids or as embedded node objects and
//! are normalised into plain ids at that boundary, so nothing downstream
//! has to care about the wire shape.

mod ids;
mod link;
mod manifest;
mod node;

pub use link::{Link, LinkKind};
pub use manifest::{DatasetLayout, GraphFile, Manifest, ManifestEntry, PartRef, SplitMeta};
pub use node::{Hierarchy, Node, NodeKind, TimeScope};
