//! Lexnet core: load legal knowledge graphs, project them onto a time
//! scope, and build keyword-seeded networks under size budgets.
//!
//! # Components
//!
//! - [`DatasetLoader`] / [`GraphStore`] - manifest resolution, merge of
//!   split datasets, degree derivation, single-owner cache
//! - [`scope::project`] - the active time scope's view of the graph
//! - [`builder::build_network`] - seed matching, ranking and breadth-first
//!   expansion under per-expansion and total node caps
//! - [`ranking`] - degree-based truncation shared by the builder and
//!   relationship listings
//! - [`ConsistencyController`] / [`Session`] - last-request-wins commits of
//!   overlapping async operations

pub mod builder;
pub mod config;
pub mod consistency;
pub mod error;
pub mod explorer;
pub mod graph;
pub mod loader;
pub mod model;
pub mod ranking;
pub mod scope;
pub mod session;
pub mod source;
pub mod store;

pub use builder::{build_network, BuilderRequest, BuilderResult, MatchLogic, RankingMode, SearchField};
pub use config::{Config, ConfigError};
pub use consistency::{Commit, ConsistencyController, Selection, Ticket, ViewState};
pub use error::GraphError;
pub use explorer::{NodeCounts, NodeDetail, NodeHit, Relationship, RelationshipListing, RelationshipQuery};
pub use graph::CachedGraph;
pub use loader::DatasetLoader;
pub use model::{Link, LinkKind, Manifest, ManifestEntry, Node, NodeKind, TimeScope};
pub use scope::{project, ScopedGraph};
pub use session::Session;
pub use source::{open_source, DataSource, FileSource, HttpSource};
pub use store::GraphStore;
