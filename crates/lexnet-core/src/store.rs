//! Single-owner cache holding the authoritative graph.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;

use crate::error::GraphError;
use crate::graph::CachedGraph;
use crate::loader::DatasetLoader;
use crate::model::Manifest;
use crate::source::DataSource;

/// Holds at most one [`CachedGraph`] and replaces it atomically.
///
/// Readers get an `Arc` snapshot; a reader holding an old snapshot keeps
/// seeing a complete old graph while a new one is installed.
pub struct GraphStore<S> {
    loader: DatasetLoader<S>,
    current: RwLock<Option<Arc<CachedGraph>>>,
}

impl<S: DataSource> GraphStore<S> {
    pub fn new(loader: DatasetLoader<S>) -> Self {
        Self {
            loader,
            current: RwLock::new(None),
        }
    }

    pub async fn manifest(&self) -> Result<Manifest, GraphError> {
        self.loader.manifest().await
    }

    /// Load a title and install it as the current graph.
    ///
    /// Loading the title that is already cached returns the cached graph
    /// itself without fetching. On failure the previous graph stays.
    pub async fn load(&self, title: &str) -> Result<Arc<CachedGraph>, GraphError> {
        let graph = self.fetch(title).await?;
        self.install(Arc::clone(&graph)).await;
        Ok(graph)
    }

    /// Get the graph for a title without installing it.
    ///
    /// Returns the cached graph when it already holds this title.
    pub async fn fetch(&self, title: &str) -> Result<Arc<CachedGraph>, GraphError> {
        if let Some(graph) = self.cached(title).await {
            debug!(title, "dataset already cached");
            return Ok(graph);
        }
        Ok(Arc::new(self.loader.load(title).await?))
    }

    /// Replace the current graph.
    pub async fn install(&self, graph: Arc<CachedGraph>) {
        let mut current = self.current.write().await;
        if current.as_ref().is_some_and(|g| Arc::ptr_eq(g, &graph)) {
            return;
        }
        debug!(title = graph.title(), "installing dataset");
        *current = Some(graph);
    }

    /// The current graph, or [`GraphError::NotLoaded`] before the first load.
    pub async fn current(&self) -> Result<Arc<CachedGraph>, GraphError> {
        self.current.read().await.clone().ok_or(GraphError::NotLoaded)
    }

    /// Title id of the current graph, if any.
    pub async fn title(&self) -> Option<String> {
        self.current
            .read()
            .await
            .as_ref()
            .map(|g| g.title().to_string())
    }

    async fn cached(&self, title: &str) -> Option<Arc<CachedGraph>> {
        self.current
            .read()
            .await
            .as_ref()
            .filter(|g| g.title() == title)
            .cloned()
    }
}
