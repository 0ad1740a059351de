mod common;

use std::sync::Arc;

use async_trait::async_trait;
use lexnet_core::{
    BuilderRequest, Commit, DataSource, DatasetLoader, FileSource, GraphError, GraphStore, MatchLogic,
    NodeDetail, RelationshipQuery, SearchField, Session, TimeScope,
};
use tokio::sync::Notify;

use common::{session, tax_dataset};

/// Holds back one file until released, to finish operations out of order.
struct GatedSource {
    inner: FileSource,
    gated: String,
    entered: Arc<Notify>,
    release: Arc<Notify>,
}

#[async_trait]
impl DataSource for GatedSource {
    async fn fetch(&self, path: &str) -> Result<Vec<u8>, GraphError> {
        if path == self.gated {
            self.entered.notify_one();
            self.release.notified().await;
        }
        self.inner.fetch(path).await
    }

    fn describe(&self) -> String {
        format!("gated {}", self.inner.describe())
    }
}

fn gated_session(dir: &tempfile::TempDir, gated: &str) -> (Arc<Session<GatedSource>>, Arc<Notify>, Arc<Notify>) {
    let entered = Arc::new(Notify::new());
    let release = Arc::new(Notify::new());
    let source = GatedSource {
        inner: FileSource::new(dir.path()),
        gated: gated.to_string(),
        entered: Arc::clone(&entered),
        release: Arc::clone(&release),
    };
    let store = GraphStore::new(DatasetLoader::new(source, "manifest.json"));
    (Arc::new(Session::new(store, "after")), entered, release)
}

fn taxable() -> BuilderRequest {
    BuilderRequest::new(["taxable"]).with_fields([SearchField::FullName, SearchField::Text])
}

// =============================================================================
// Loading
// =============================================================================

#[tokio::test]
async fn test_titles_from_manifest() {
    let dir = tax_dataset();
    let titles = session(&dir).titles().await.unwrap();
    assert_eq!(titles.len(), 4);
}

#[tokio::test]
async fn test_operations_before_load() {
    let dir = tax_dataset();
    let session = session(&dir);

    let err = session.search(taxable()).await.unwrap_err();
    assert!(matches!(err, GraphError::NotLoaded));
    // rejected before a ticket was taken
    assert_eq!(session.controller().generation(), 0);

    assert!(matches!(session.select("s63").await, Err(GraphError::NotLoaded)));
    assert!(matches!(
        session.switch_scope("before").await,
        Err(GraphError::NotLoaded)
    ));

    let detail = session.node_detail("s63", &TimeScope::new("after")).await;
    assert!(matches!(detail, NodeDetail::Unavailable { .. }));
}

#[tokio::test]
async fn test_failed_load_leaves_view_untouched() {
    let dir = tax_dataset();
    let session = session(&dir);

    session.load_title("26").await.unwrap();
    session.search(taxable()).await.unwrap();

    assert!(session.load_title("99").await.is_err());

    let view = session.view().await;
    assert_eq!(view.title.as_deref(), Some("26"));
    assert!(view.result.is_some());
    assert_eq!(session.store().title().await.as_deref(), Some("26"));
}

#[tokio::test]
async fn test_new_title_clears_search_and_selection() {
    let dir = tax_dataset();
    let session = session(&dir);

    session.load_title("26").await.unwrap();
    session.search(taxable()).await.unwrap();
    session.select("s63").await.unwrap();

    // same title again keeps everything
    session.load_title("26").await.unwrap();
    let view = session.view().await;
    assert!(view.result.is_some());
    assert!(view.selection.is_some());

    session.load_title("18").await.unwrap();
    let view = session.view().await;
    assert_eq!(view.title.as_deref(), Some("18"));
    assert!(view.request.is_none());
    assert!(view.result.is_none());
    assert!(view.selection.is_none());
}

// =============================================================================
// Last request wins
// =============================================================================

#[tokio::test]
async fn test_slow_title_load_superseded_by_newer_load() {
    let dir = tax_dataset();
    let (session, entered, release) = gated_session(&dir, "title-18.json");

    let slow = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.load_title("18").await })
    };
    entered.notified().await;

    let fast = session.load_title("26").await.unwrap();
    assert!(fast.is_applied());

    release.notify_one();
    let slow = slow.await.unwrap().unwrap();
    assert!(matches!(slow, Commit::Superseded));

    assert_eq!(session.view().await.title.as_deref(), Some("26"));
    assert_eq!(session.store().title().await.as_deref(), Some("26"));
}

#[tokio::test]
async fn test_search_supersedes_pending_load() {
    let dir = tax_dataset();
    let (session, entered, release) = gated_session(&dir, "title-18.json");

    session.load_title("26").await.unwrap();

    let slow = {
        let session = Arc::clone(&session);
        tokio::spawn(async move { session.load_title("18").await })
    };
    entered.notified().await;

    let result = session.search(taxable()).await.unwrap();
    assert!(result.is_applied());

    release.notify_one();
    assert!(!slow.await.unwrap().unwrap().is_applied());

    let view = session.view().await;
    assert_eq!(view.title.as_deref(), Some("26"));
    assert!(view.result.unwrap().contains("s63"));
}

#[tokio::test]
async fn test_stale_ticket_cannot_commit() {
    let dir = tax_dataset();
    let session = session(&dir);
    session.load_title("26").await.unwrap();

    let stale = session.controller().begin();
    let applied = session.search(taxable()).await.unwrap();
    assert!(applied.is_applied());

    let commit = session
        .controller()
        .commit(stale, |view| view.result = None)
        .await;
    assert!(!commit.is_applied());
    assert!(session.view().await.result.is_some());
}

#[tokio::test]
async fn test_earlier_search_finishing_last_is_discarded() {
    let dir = tax_dataset();
    let session = Arc::new(session(&dir));
    session.load_title("26").await.unwrap();

    let release = Arc::new(Notify::new());
    let first_ticket = session.controller().begin();
    let first = {
        let session = Arc::clone(&session);
        let release = Arc::clone(&release);
        tokio::spawn(async move {
            release.notified().await;
            session.search_with_ticket(first_ticket, taxable()).await
        })
    };

    let gross = BuilderRequest::new(["gross"]).with_fields([SearchField::FullName]);
    let second = session.search(gross.clone()).await.unwrap();
    let second = second.applied().unwrap();
    assert!(second.contains("s61"));

    release.notify_one();
    let first = first.await.unwrap().unwrap();
    assert_eq!(first, Commit::Superseded);

    let view = session.view().await;
    assert_eq!(view.request, Some(gross));
    assert_eq!(view.result, Some(second));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_search_racing_loads_matches_displayed_title() {
    let dir = tax_dataset();
    let session = Arc::new(session(&dir));
    session.load_title("26").await.unwrap();

    let request = BuilderRequest::new(["taxable", "statements"])
        .with_fields([SearchField::FullName])
        .with_logic(MatchLogic::Disjunctive);

    for round in 0..200 {
        let title = if round % 2 == 0 { "18" } else { "26" };
        let loading = {
            let session = Arc::clone(&session);
            tokio::spawn(async move { session.load_title(title).await })
        };
        let searching = {
            let session = Arc::clone(&session);
            let request = request.clone();
            tokio::spawn(async move { session.search(request).await })
        };
        loading.await.unwrap().unwrap();
        searching.await.unwrap().unwrap();

        let view = session.view().await;
        let graph = session.store().current().await.unwrap();
        assert_eq!(view.title.as_deref(), Some(graph.title()));
        if let Some(result) = view.result {
            for node in &result.nodes {
                assert!(
                    graph.node(&view.scope, &node.id).is_some(),
                    "round {}: '{}' shown under title {}",
                    round,
                    node.id,
                    graph.title()
                );
            }
        }
    }
}

#[tokio::test]
async fn test_invalid_search_does_not_supersede() {
    let dir = tax_dataset();
    let session = session(&dir);
    session.load_title("26").await.unwrap();

    let pending = session.controller().begin();
    let err = session.search(BuilderRequest::new([" "])).await.unwrap_err();
    assert!(matches!(err, GraphError::InvalidRequest(_)));
    assert!(session.controller().is_current(pending));
}

// =============================================================================
// Scope switching
// =============================================================================

#[tokio::test]
async fn test_scope_switch_reruns_active_search() {
    let dir = tax_dataset();
    let session = session(&dir);
    session.load_title("26").await.unwrap();

    let after = session.search(taxable()).await.unwrap().applied().unwrap();
    // s1 mentions taxable income in its text after the change
    assert!(after.contains("s1"));
    assert!(after.contains("s63"));

    let rerun = session.switch_scope("before").await.unwrap();
    let before = rerun.applied().flatten().unwrap();
    assert!(before.contains("s63"));
    assert!(before.nodes.iter().all(|n| n.scope.as_str() == "before"));
    assert!(!before.contains("s199a"));

    let view = session.view().await;
    assert_eq!(view.scope.as_str(), "before");
    assert_eq!(view.request, Some(taxable()));
    assert_eq!(view.result, Some(before));
}

#[tokio::test]
async fn test_scope_switch_without_search() {
    let dir = tax_dataset();
    let session = session(&dir);
    session.load_title("26").await.unwrap();

    let commit = session.switch_scope("before").await.unwrap();
    assert_eq!(commit, Commit::Applied(None));
    assert_eq!(session.view().await.scope.as_str(), "before");
}

#[tokio::test]
async fn test_scope_switch_revalidates_selection() {
    let dir = tax_dataset();
    let session = session(&dir);
    session.load_title("26").await.unwrap();

    session.select("s63").await.unwrap();
    session.switch_scope("before").await.unwrap();
    let view = session.view().await;
    let selection = view.actionable_selection().unwrap();
    assert_eq!(selection.node_id, "s63");
    assert_eq!(selection.scope.as_str(), "before");

    session.switch_scope("after").await.unwrap();
    session.select("s199a").await.unwrap();
    session.switch_scope("before").await.unwrap();
    assert!(session.view().await.selection.is_none());
}

#[tokio::test]
async fn test_unknown_scope_rejected() {
    let dir = tax_dataset();
    let session = session(&dir);
    session.load_title("26").await.unwrap();

    let generation = session.controller().generation();
    let err = session.switch_scope("draft").await.unwrap_err();
    assert!(matches!(err, GraphError::InvalidRequest(_)));
    assert_eq!(session.controller().generation(), generation);
    assert_eq!(session.view().await.scope.as_str(), "after");
}

#[tokio::test]
async fn test_scope_switch_limited_to_configured_scopes() {
    let dir = tax_dataset();
    let session = session(&dir).with_scopes([TimeScope::new("after")]);
    session.load_title("26").await.unwrap();

    let generation = session.controller().generation();
    let err = session.switch_scope("before").await.unwrap_err();
    assert!(matches!(err, GraphError::InvalidRequest(_)));
    assert_eq!(session.controller().generation(), generation);

    assert!(session.switch_scope("after").await.unwrap().is_applied());
}

#[tokio::test]
async fn test_select_unknown_node_rejected() {
    let dir = tax_dataset();
    let session = session(&dir);
    session.load_title("26").await.unwrap();

    assert!(matches!(
        session.select("s9999").await,
        Err(GraphError::InvalidRequest(_))
    ));
    session.select("s1").await.unwrap();
    session.clear_selection().await;
    assert!(session.view().await.selection.is_none());
}

// =============================================================================
// Explorer queries
// =============================================================================

#[tokio::test]
async fn test_node_detail_per_scope() {
    let dir = tax_dataset();
    let session = session(&dir);
    session.load_title("26").await.unwrap();

    let after = session.node_detail("s199a", &TimeScope::new("after")).await;
    assert_eq!(after.node().map(|n| n.id.as_str()), Some("s199a"));

    let before = session.node_detail("s199a", &TimeScope::new("before")).await;
    assert!(matches!(before, NodeDetail::Unavailable { .. }));
}

#[tokio::test]
async fn test_projection_reused_until_graph_or_scope_changes() {
    let dir = tax_dataset();
    let session = session(&dir);
    session.load_title("26").await.unwrap();

    let first = session.scoped().await.unwrap();
    let again = session.scoped().await.unwrap();
    assert!(Arc::ptr_eq(&first, &again));

    session.switch_scope("before").await.unwrap();
    let before = session.scoped().await.unwrap();
    assert_eq!(before.scope.as_str(), "before");
    assert!(before.contains("s63"));

    session.load_title("18").await.unwrap();
    session.switch_scope("after").await.unwrap();
    let other = session.scoped().await.unwrap();
    assert!(!Arc::ptr_eq(&first, &other));
    assert!(other.contains("s1001"));
    assert!(!other.contains("s63"));
}

#[tokio::test]
async fn test_overview_follows_active_scope() {
    let dir = tax_dataset();
    let session = session(&dir);
    session.load_title("26").await.unwrap();

    let (listing, counts) = session.overview(&RelationshipQuery::default()).await.unwrap();
    assert_eq!(listing.scope.as_str(), "after");
    assert_eq!(counts.total_nodes, 7);

    session.switch_scope("before").await.unwrap();
    let (listing, counts) = session.overview(&RelationshipQuery::default()).await.unwrap();
    assert_eq!(listing.scope.as_str(), "before");
    assert_eq!(listing.total, 4);
    assert_eq!(counts.total_nodes, 6);

    let hits = session.search_nodes("income", 5).await.unwrap();
    assert_eq!(hits.len(), 3);
}

#[tokio::test]
async fn test_disjunctive_search_through_session() {
    let dir = tax_dataset();
    let session = session(&dir);
    session.load_title("26").await.unwrap();

    let request = BuilderRequest::new(["secretary", "qualified"])
        .with_logic(MatchLogic::Disjunctive)
        .with_expansion(0, 10);
    let result = session.search(request).await.unwrap().applied().unwrap();
    assert_eq!(result.matched_count, 2);
}
