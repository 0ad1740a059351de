//! Dataset loading: manifest resolution, concurrent part fetches, merge and
//! degree derivation.

use std::collections::{HashMap, HashSet};

use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use tracing::{debug, info};

use crate::error::GraphError;
use crate::graph::CachedGraph;
use crate::model::{DatasetLayout, GraphFile, Link, Manifest, ManifestEntry, Node, SplitMeta, TimeScope};
use crate::source::DataSource;

/// Resolves title ids to dataset files and assembles one merged graph.
pub struct DatasetLoader<S> {
    source: S,
    manifest_path: String,
}

impl<S: DataSource> DatasetLoader<S> {
    pub fn new(source: S, manifest_path: impl Into<String>) -> Self {
        Self {
            source,
            manifest_path: manifest_path.into(),
        }
    }

    /// Fetch and parse the manifest.
    pub async fn manifest(&self) -> Result<Manifest, GraphError> {
        self.fetch_json(&self.manifest_path).await
    }

    /// Load the full merged graph for a title.
    ///
    /// Fails with [`GraphError::NotFound`] for an unknown title and with
    /// [`GraphError::FetchFailure`] if any file is missing or malformed.
    /// Nothing is cached here; see [`crate::store::GraphStore`].
    pub async fn load(&self, title: &str) -> Result<CachedGraph, GraphError> {
        let manifest = self.manifest().await?;
        let entry = manifest
            .entry(title)
            .ok_or_else(|| GraphError::not_found(title))?;

        let files = self.resolve_files(entry).await?;
        info!(title, parts = files.len(), source = %self.source.describe(), "loading dataset");

        let parts: Vec<GraphFile> =
            try_join_all(files.iter().map(|file| self.fetch_json::<GraphFile>(file))).await?;

        let merged = merge_parts(parts);
        info!(
            title,
            nodes = merged.nodes.len(),
            links = merged.links.len(),
            "dataset loaded"
        );

        Ok(CachedGraph::new(title, merged.nodes, merged.links))
    }

    /// List the files making up a manifest entry, in part order.
    async fn resolve_files(&self, entry: &ManifestEntry) -> Result<Vec<String>, GraphError> {
        match &entry.layout {
            DatasetLayout::Single { file } => Ok(vec![file.clone()]),
            DatasetLayout::Split { meta } => {
                let meta: SplitMeta = self.fetch_json(meta).await?;
                Ok(meta.parts.into_iter().map(|p| p.file).collect())
            }
        }
    }

    async fn fetch_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, GraphError> {
        let bytes = self.source.fetch(path).await?;
        serde_json::from_slice(&bytes).map_err(|e| GraphError::fetch(path, e))
    }
}

/// Merge dataset parts in order.
///
/// A node is kept only on the first occurrence of its (scope, id) pair.
/// Links are concatenated from every part without deduplication. Degrees
/// are derived over the merged link list.
pub fn merge_parts(parts: Vec<GraphFile>) -> GraphFile {
    let mut seen: HashSet<(TimeScope, String)> = HashSet::new();
    let mut nodes = Vec::new();
    let mut links = Vec::new();
    let mut dropped = 0usize;

    for part in parts {
        for node in part.nodes {
            if seen.insert((node.scope.clone(), node.id.clone())) {
                nodes.push(node);
            } else {
                dropped += 1;
            }
        }
        links.extend(part.links);
    }

    if dropped > 0 {
        debug!(dropped, "dropped duplicate nodes while merging parts");
    }

    assign_degrees(&mut nodes, &links);
    GraphFile { nodes, links }
}

/// Count link endpoints per raw node id and store the count on every node
/// sharing that id, whatever its scope.
pub fn assign_degrees(nodes: &mut [Node], links: &[Link]) {
    let mut degree: HashMap<&str, u32> = HashMap::new();
    for link in links {
        *degree.entry(link.source.as_str()).or_insert(0) += 1;
        *degree.entry(link.target.as_str()).or_insert(0) += 1;
    }

    for node in nodes.iter_mut() {
        node.degree = degree.get(node.id.as_str()).copied().unwrap_or(0);
    }
}
