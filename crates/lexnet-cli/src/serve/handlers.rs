//! HTTP route handlers for the local API.
//!
//! Handlers are kept thin, delegating to the core [`Session`](lexnet_core::Session).

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};

use lexnet_core::{BuilderResult, Commit, GraphError, NodeDetail, Selection, TimeScope};

use super::graph::{get_category_color, GraphBuilder};
use super::models::{
    ErrorResponse, LoadResponse, NodeQuery, OverviewResponse, RelationshipParams, ScopeResponse,
    SearchBody, SearchQuery, SearchResponse, SearchResult, TitleSummary, ViewResponse,
};
use super::AppState;

type ApiError = (StatusCode, Json<ErrorResponse>);
type ApiResult<T> = Result<Json<T>, ApiError>;

fn api_error(e: GraphError) -> ApiError {
    let status = match &e {
        GraphError::NotFound { .. } => StatusCode::NOT_FOUND,
        GraphError::FetchFailure { .. } => StatusCode::BAD_GATEWAY,
        GraphError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        GraphError::NotLoaded => StatusCode::CONFLICT,
        GraphError::Task(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorResponse { error: e.to_string() }))
}

fn search_response(result: &BuilderResult, applied: bool) -> SearchResponse {
    SearchResponse {
        applied,
        matched_count: result.matched_count,
        truncated: result.truncated,
        graph: GraphBuilder::new().build_from_result(result),
    }
}

// =============================================================================
// Index
// =============================================================================

/// GET `/` - Lists the available endpoints.
pub async fn index() -> Json<Value> {
    Json(json!({
        "name": "lexnet",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": [
            "GET /api/titles",
            "POST /api/titles/{id}",
            "POST /api/scope/{scope}",
            "POST /api/select/{id}",
            "DELETE /api/select",
            "POST /api/search",
            "GET /api/view",
            "GET /api/node/{id}?scope=",
            "GET /api/nodes?q=&limit=",
            "GET /api/relationships?limit=&max_nodes=&edge_types=&node_types="
        ]
    }))
}

// =============================================================================
// Session Handlers
// =============================================================================

/// GET `/api/titles` - Titles in the manifest.
pub async fn api_titles(State(state): State<Arc<AppState>>) -> ApiResult<Vec<TitleSummary>> {
    let loaded = state.session.store().title().await;
    let titles = state.session.titles().await.map_err(api_error)?;

    Ok(Json(
        titles
            .into_iter()
            .map(|entry| {
                let is_loaded = loaded.as_deref() == Some(entry.id.as_str());
                TitleSummary {
                    id: entry.id,
                    label: entry.label,
                    loaded: is_loaded,
                }
            })
            .collect(),
    ))
}

/// POST `/api/titles/{id}` - Load a title.
pub async fn api_load_title(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<LoadResponse> {
    let commit = state.session.load_title(&id).await.map_err(api_error)?;
    let applied = commit.is_applied();

    // a superseded load reports whatever is current instead
    let graph = match commit.applied() {
        Some(graph) => graph,
        None => state.session.store().current().await.map_err(api_error)?,
    };

    Ok(Json(LoadResponse {
        title: graph.title().to_string(),
        applied,
        nodes: graph.nodes().len(),
        links: graph.links().len(),
        scopes: graph.scopes().iter().map(ToString::to_string).collect(),
    }))
}

/// POST `/api/scope/{scope}` - Switch the active time scope.
pub async fn api_switch_scope(
    State(state): State<Arc<AppState>>,
    Path(scope): Path<String>,
) -> ApiResult<ScopeResponse> {
    let commit = state
        .session
        .switch_scope(scope.as_str())
        .await
        .map_err(api_error)?;

    Ok(Json(match commit {
        Commit::Applied(result) => ScopeResponse {
            scope,
            applied: true,
            result: result.as_ref().map(|r| search_response(r, true)),
        },
        Commit::Superseded => ScopeResponse {
            scope,
            applied: false,
            result: None,
        },
    }))
}

/// POST `/api/select/{id}` - Select a node of the active scope.
pub async fn api_select(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Selection> {
    state.session.select(&id).await.map(Json).map_err(api_error)
}

/// DELETE `/api/select` - Clear the selection.
pub async fn api_clear_selection(State(state): State<Arc<AppState>>) -> StatusCode {
    state.session.clear_selection().await;
    StatusCode::NO_CONTENT
}

/// POST `/api/search` - Run the network builder.
///
/// When a newer operation overtakes this one, the response carries the
/// result currently displayed with `applied: false`.
pub async fn api_search(
    State(state): State<Arc<AppState>>,
    Json(body): Json<SearchBody>,
) -> ApiResult<SearchResponse> {
    let request = body.into_request(&state.config.builder);

    match state.session.search(request).await.map_err(api_error)? {
        Commit::Applied(result) => Ok(Json(search_response(&result, true))),
        Commit::Superseded => {
            let shown = state.session.view().await.result.unwrap_or_default();
            Ok(Json(search_response(&shown, false)))
        }
    }
}

/// GET `/api/view` - What is currently displayed.
pub async fn api_view(State(state): State<Arc<AppState>>) -> Json<ViewResponse> {
    let view = state.session.view().await;

    Json(ViewResponse {
        title: view.title.clone(),
        scope: view.scope.to_string(),
        selection: view.actionable_selection().cloned(),
        request: view.request.clone(),
        result: view.result.as_ref().map(|r| search_response(r, true)),
    })
}

// =============================================================================
// Explorer Handlers
// =============================================================================

/// GET `/api/node/{id}` - Node details; never fails.
///
/// Query parameters:
/// - `scope`: time scope to look in (default: the active scope)
pub async fn api_node(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<NodeQuery>,
) -> Json<NodeDetail> {
    let scope = match params.scope {
        Some(scope) => TimeScope::new(scope),
        None => state.session.view().await.scope,
    };
    Json(state.session.node_detail(&id, &scope).await)
}

/// GET `/api/nodes` - Search nodes by name or label.
///
/// Query parameters:
/// - `q`: Search query string (required)
/// - `limit`: Maximum results (default: 20)
pub async fn api_nodes(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> ApiResult<Vec<SearchResult>> {
    let hits = state
        .session
        .search_nodes(&params.q, params.limit)
        .await
        .map_err(api_error)?;

    Ok(Json(
        hits.into_iter()
            .map(|hit| SearchResult {
                color: get_category_color(hit.kind).to_string(),
                node_type: hit.kind.label().to_lowercase(),
                key: hit.id,
                label: hit.label,
                degree: hit.degree,
            })
            .collect(),
    ))
}

/// GET `/api/relationships` - Relationship listing with node counts.
pub async fn api_relationships(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RelationshipParams>,
) -> ApiResult<OverviewResponse> {
    let query = params
        .into_query(&state.config.relationships)
        .map_err(api_error)?;
    let (listing, counts) = state.session.overview(&query).await.map_err(api_error)?;

    Ok(Json(OverviewResponse { listing, counts }))
}
