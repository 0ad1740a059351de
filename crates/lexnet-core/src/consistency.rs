//! Arbitration of overlapping asynchronous operations.
//!
//! Every search, scope switch and title load takes a [`Ticket`] from a
//! single monotonically increasing generation counter when it starts. When
//! it finishes it may write to the shared [`ViewState`] only if no newer
//! ticket has been issued in the meantime; otherwise its output is dropped.
//! Superseded work is never cancelled, just ignored.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use tokio::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use crate::builder::{BuilderRequest, BuilderResult};
use crate::model::TimeScope;
use crate::scope::ScopedGraph;

/// Generation captured when an operation starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

impl Ticket {
    pub fn generation(self) -> u64 {
        self.0
    }
}

/// Whether an operation's output reached the shared state.
#[derive(Debug, Clone, PartialEq)]
pub enum Commit<T> {
    Applied(T),
    /// A newer operation started first; the output was discarded.
    Superseded,
}

impl<T> Commit<T> {
    pub fn is_applied(&self) -> bool {
        matches!(self, Commit::Applied(_))
    }

    pub fn applied(self) -> Option<T> {
        match self {
            Commit::Applied(value) => Some(value),
            Commit::Superseded => None,
        }
    }
}

/// A node chosen by the user, tagged with the scope it was chosen in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Selection {
    pub node_id: String,
    pub scope: TimeScope,
}

impl Selection {
    /// A selection can only be acted on in the scope it belongs to.
    pub fn is_actionable(&self, active: &TimeScope) -> bool {
        &self.scope == active
    }
}

/// What the user currently sees.
#[derive(Debug, Clone, Serialize)]
pub struct ViewState {
    pub title: Option<String>,
    pub scope: TimeScope,
    pub selection: Option<Selection>,
    /// The search whose result is displayed, re-run on scope switches.
    pub request: Option<BuilderRequest>,
    pub result: Option<BuilderResult>,
}

impl ViewState {
    pub fn new(scope: impl Into<TimeScope>) -> Self {
        Self {
            title: None,
            scope: scope.into(),
            selection: None,
            request: None,
            result: None,
        }
    }

    /// The selection, if it belongs to the active scope.
    pub fn actionable_selection(&self) -> Option<&Selection> {
        self.selection.as_ref().filter(|s| s.is_actionable(&self.scope))
    }

    /// Keep the selection only if its node id exists in `view`, retagging
    /// it with that view's scope.
    pub fn revalidate_selection(&mut self, view: &ScopedGraph) {
        self.selection = self.selection.take().and_then(|s| {
            if view.contains(&s.node_id) {
                Some(Selection {
                    node_id: s.node_id,
                    scope: view.scope.clone(),
                })
            } else {
                debug!(node = %s.node_id, scope = %view.scope, "selection cleared");
                None
            }
        });
    }
}

/// Owns the generation counter and the committed view state.
pub struct ConsistencyController {
    generation: AtomicU64,
    view: RwLock<ViewState>,
}

impl ConsistencyController {
    pub fn new(initial: ViewState) -> Self {
        Self {
            generation: AtomicU64::new(0),
            view: RwLock::new(initial),
        }
    }

    /// Start an operation, superseding every operation started before it.
    pub fn begin(&self) -> Ticket {
        Ticket(self.generation.fetch_add(1, Ordering::SeqCst) + 1)
    }

    pub fn generation(&self) -> u64 {
        self.generation.load(Ordering::SeqCst)
    }

    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.generation() == ticket.0
    }

    /// Lock the view for writing if `ticket` is still the newest.
    ///
    /// The check happens under the lock, so two commits never interleave.
    pub async fn acquire(&self, ticket: Ticket) -> Option<RwLockWriteGuard<'_, ViewState>> {
        let view = self.view.write().await;
        if self.is_current(ticket) {
            Some(view)
        } else {
            debug!(
                ticket = ticket.0,
                current = self.generation(),
                "discarding stale result"
            );
            None
        }
    }

    /// Apply `f` to the view if `ticket` is still the newest.
    pub async fn commit<R>(&self, ticket: Ticket, f: impl FnOnce(&mut ViewState) -> R) -> Commit<R> {
        match self.acquire(ticket).await {
            Some(mut view) => Commit::Applied(f(&mut view)),
            None => Commit::Superseded,
        }
    }

    /// Snapshot of the committed view.
    pub async fn view(&self) -> ViewState {
        self.view.read().await.clone()
    }

    pub async fn read<R>(&self, f: impl FnOnce(&ViewState) -> R) -> R {
        f(&*self.view.read().await)
    }

    /// Hold the view for reading, so that no commit lands until the guard
    /// is dropped.
    pub async fn read_guard(&self) -> RwLockReadGuard<'_, ViewState> {
        self.view.read().await
    }

    /// Mutate the view without a ticket (selection changes).
    pub async fn update<R>(&self, f: impl FnOnce(&mut ViewState) -> R) -> R {
        f(&mut *self.view.write().await)
    }
}
