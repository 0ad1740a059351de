//! The explorer session an application drives.
//!
//! Ties the graph store, the scoped projector, the network builder and the
//! explorer queries together under one [`ConsistencyController`], so that
//! whatever order asynchronous loads, scope switches and searches finish
//! in, the committed [`ViewState`] reflects the newest one.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::builder::{build_network, BuilderRequest, BuilderResult};
use crate::config::Config;
use crate::consistency::{Commit, ConsistencyController, Selection, Ticket, ViewState};
use crate::error::GraphError;
use crate::explorer::{self, NodeCounts, NodeDetail, NodeHit, RelationshipListing, RelationshipQuery};
use crate::graph::CachedGraph;
use crate::loader::DatasetLoader;
use crate::model::{ManifestEntry, TimeScope};
use crate::scope::{project, ScopedGraph};
use crate::source::{open_source, DataSource};
use crate::store::GraphStore;

/// One user's view over one dataset at a time.
pub struct Session<S> {
    store: GraphStore<S>,
    controller: ConsistencyController,
    /// Scope tags a switch may name; empty allows any tag the title uses.
    scopes: Vec<TimeScope>,
    /// Last projection handed out, keyed by the graph it was taken from.
    projection: Mutex<Option<(Arc<CachedGraph>, Arc<ScopedGraph>)>>,
}

impl Session<Box<dyn DataSource>> {
    /// Open a session over the data location named in `config`.
    pub fn from_config(config: &Config) -> Self {
        let source = open_source(&config.data.source);
        let loader = DatasetLoader::new(source, config.data.manifest.clone());
        Self::new(GraphStore::new(loader), config.scopes.default_scope())
            .with_scopes(config.scopes.available_scopes())
    }
}

impl<S: DataSource> Session<S> {
    pub fn new(store: GraphStore<S>, scope: impl Into<TimeScope>) -> Self {
        Self {
            store,
            controller: ConsistencyController::new(ViewState::new(scope)),
            scopes: Vec::new(),
            projection: Mutex::new(None),
        }
    }

    /// Restrict scope switches to `scopes`.
    pub fn with_scopes(mut self, scopes: impl IntoIterator<Item = TimeScope>) -> Self {
        self.scopes = scopes.into_iter().collect();
        self
    }

    pub fn store(&self) -> &GraphStore<S> {
        &self.store
    }

    pub fn controller(&self) -> &ConsistencyController {
        &self.controller
    }

    /// Titles listed in the manifest.
    pub async fn titles(&self) -> Result<Vec<ManifestEntry>, GraphError> {
        Ok(self.store.manifest().await?.titles)
    }

    /// Load a title and make it the current dataset.
    ///
    /// A failed load leaves both the cached graph and the view untouched.
    pub async fn load_title(&self, title: &str) -> Result<Commit<Arc<CachedGraph>>, GraphError> {
        let ticket = self.controller.begin();
        let graph = self.store.fetch(title).await?;

        let Some(mut view) = self.controller.acquire(ticket).await else {
            return Ok(Commit::Superseded);
        };

        self.store.install(Arc::clone(&graph)).await;
        if view.title.as_deref() != Some(title) {
            view.title = Some(title.to_string());
            view.request = None;
            view.result = None;
            let scoped = self.project_cached(&graph, &view.scope).await;
            view.revalidate_selection(&scoped);
            info!(title, nodes = graph.nodes().len(), "title loaded");
        }

        Ok(Commit::Applied(graph))
    }

    /// Switch the active time scope.
    ///
    /// The selection survives only if its node id exists in the new scope.
    /// An active search is re-run under the new scope; its previous result
    /// stays displayed until the re-run commits.
    pub async fn switch_scope(
        &self,
        scope: impl Into<TimeScope>,
    ) -> Result<Commit<Option<BuilderResult>>, GraphError> {
        let scope = scope.into();
        if !self.scopes.is_empty() && !self.scopes.contains(&scope) {
            return Err(GraphError::invalid(format!("scope '{}' is not configured", scope)));
        }
        // unknown scopes fail before a ticket is taken
        ensure_scope(&*self.store.current().await?, &scope)?;

        let ticket = self.controller.begin();
        let (scoped, rerun) = {
            let Some(mut view) = self.controller.acquire(ticket).await else {
                return Ok(Commit::Superseded);
            };
            // installs happen under the view lock, so this graph is stable
            // until the guard drops; a load may have landed since the check
            let graph = self.store.current().await?;
            ensure_scope(&graph, &scope)?;

            let scoped = self.project_cached(&graph, &scope).await;
            view.scope = scope.clone();
            view.revalidate_selection(&scoped);
            (scoped, view.request.clone())
        };

        let Some(request) = rerun else {
            return Ok(Commit::Applied(None));
        };

        let result = run_builder(scoped, request).await?;
        Ok(self
            .controller
            .commit(ticket, |view| {
                view.result = Some(result.clone());
                Some(result)
            })
            .await)
    }

    /// Run a builder search against the active scope.
    ///
    /// Invalid requests, and searches before any title is loaded, fail
    /// before a ticket is taken, so they never supersede a search already
    /// in flight.
    pub async fn search(&self, request: BuilderRequest) -> Result<Commit<BuilderResult>, GraphError> {
        request.validate()?;
        self.store.current().await?;

        let ticket = self.controller.begin();
        self.search_with_ticket(ticket, request).await
    }

    /// Run a search under a ticket taken earlier with
    /// [`ConsistencyController::begin`].
    ///
    /// The graph and scope are read after the ticket exists, so the result
    /// is built from whatever the newest older operation committed.
    pub async fn search_with_ticket(
        &self,
        ticket: Ticket,
        request: BuilderRequest,
    ) -> Result<Commit<BuilderResult>, GraphError> {
        let (graph, scope) = self.snapshot().await?;
        let scoped = self.project_cached(&graph, &scope).await;

        let result = run_builder(scoped, request.clone()).await?;
        Ok(self
            .controller
            .commit(ticket, |view| {
                view.request = Some(request);
                view.result = Some(result.clone());
                result
            })
            .await)
    }

    /// Select a node of the active scope.
    pub async fn select(&self, node_id: &str) -> Result<Selection, GraphError> {
        let graph = self.store.current().await?;
        self.controller
            .update(|view| {
                if graph.node(&view.scope, node_id).is_none() {
                    return Err(GraphError::invalid(format!(
                        "no node '{}' in scope {}",
                        node_id, view.scope
                    )));
                }
                let selection = Selection {
                    node_id: node_id.to_string(),
                    scope: view.scope.clone(),
                };
                view.selection = Some(selection.clone());
                Ok(selection)
            })
            .await
    }

    pub async fn clear_selection(&self) {
        self.controller.update(|view| view.selection = None).await;
    }

    /// Details of a node in `scope`; degrades to
    /// [`NodeDetail::Unavailable`] rather than failing.
    pub async fn node_detail(&self, id: &str, scope: &TimeScope) -> NodeDetail {
        match self.store.current().await {
            Ok(graph) if graph.node(scope, id).is_none() => {
                NodeDetail::unavailable(format!("no node '{}' in scope {}", id, scope))
            }
            Ok(graph) => explorer::node_detail(&*self.project_cached(&graph, scope).await, id),
            Err(e) => {
                warn!(id, error = %e, "node detail unavailable");
                NodeDetail::unavailable(e.to_string())
            }
        }
    }

    /// Nodes of the active scope whose name or label contains `query`.
    pub async fn search_nodes(&self, query: &str, limit: usize) -> Result<Vec<NodeHit>, GraphError> {
        let scoped = self.scoped().await?;
        Ok(explorer::search_nodes(&scoped, query, limit))
    }

    /// Relationship listing and node counts for the active scope, computed
    /// together.
    pub async fn overview(
        &self,
        query: &RelationshipQuery,
    ) -> Result<(RelationshipListing, NodeCounts), GraphError> {
        let scoped = self.scoped().await?;
        let (listing, counts) = tokio::join!(
            async { explorer::relationships(&scoped, query) },
            async { explorer::node_counts(&scoped) },
        );
        Ok((listing, counts))
    }

    /// The active scope's view of the current graph.
    pub async fn scoped(&self) -> Result<Arc<ScopedGraph>, GraphError> {
        let (graph, scope) = self.snapshot().await?;
        Ok(self.project_cached(&graph, &scope).await)
    }

    /// Snapshot of what is displayed.
    pub async fn view(&self) -> ViewState {
        self.controller.view().await
    }

    /// The current graph and the active scope, read under one view lock so
    /// that no commit lands between the two.
    async fn snapshot(&self) -> Result<(Arc<CachedGraph>, TimeScope), GraphError> {
        let view = self.controller.read_guard().await;
        let graph = self.store.current().await?;
        Ok((graph, view.scope.clone()))
    }

    /// Project `graph` onto `scope`, reusing the last projection when both
    /// match.
    async fn project_cached(&self, graph: &Arc<CachedGraph>, scope: &TimeScope) -> Arc<ScopedGraph> {
        let mut cache = self.projection.lock().await;
        if let Some((cached, scoped)) = cache.as_ref() {
            if Arc::ptr_eq(cached, graph) && &scoped.scope == scope {
                return Arc::clone(scoped);
            }
        }

        debug!(title = graph.title(), %scope, "projecting");
        let scoped = Arc::new(project(graph, scope));
        *cache = Some((Arc::clone(graph), Arc::clone(&scoped)));
        scoped
    }
}

fn ensure_scope(graph: &CachedGraph, scope: &TimeScope) -> Result<(), GraphError> {
    if graph.scopes().contains(scope) {
        Ok(())
    } else {
        Err(GraphError::invalid(format!(
            "scope '{}' not present in title {}",
            scope,
            graph.title()
        )))
    }
}

async fn run_builder(scoped: Arc<ScopedGraph>, request: BuilderRequest) -> Result<BuilderResult, GraphError> {
    tokio::task::spawn_blocking(move || build_network(&scoped, &request)).await?
}
