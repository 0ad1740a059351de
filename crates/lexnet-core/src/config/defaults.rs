//! Default values for Lexnet configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Data Defaults
// ============================================================================

/// Default data location (directory or base URL).
pub const DEFAULT_DATA_SOURCE: &str = "data";

/// Default manifest file name, relative to the data location.
pub const DEFAULT_MANIFEST_FILE: &str = "manifest.json";

// ============================================================================
// Scope Defaults
// ============================================================================

/// Time-scope tags present in the datasets.
pub const DEFAULT_SCOPES: &[&str] = &["before", "after"];

/// Scope active when a session starts.
pub const DEFAULT_SCOPE: &str = "after";

// ============================================================================
// Builder Defaults
// ============================================================================

/// Breadth-first levels explored from the seeds.
pub const DEFAULT_EXPANSION_DEPTH: usize = 1;

/// Neighbours admitted per expanded node.
pub const DEFAULT_MAX_NODES_PER_EXPANSION: usize = 10;

/// Hard cap on nodes in a built network.
pub const DEFAULT_MAX_TOTAL_NODES: usize = 200;

// ============================================================================
// Relationship Listing Defaults
// ============================================================================

/// Maximum relationships returned by a listing.
pub const DEFAULT_RELATIONSHIP_LIMIT: usize = 500;

/// Maximum distinct nodes a listing may touch.
pub const DEFAULT_RELATIONSHIP_MAX_NODES: usize = 300;

/// Maximum hits for a node name search.
pub const DEFAULT_NODE_SEARCH_LIMIT: usize = 20;

// ============================================================================
// Server Defaults
// ============================================================================

/// Port for the local JSON API.
pub const DEFAULT_PORT: u16 = 3344;
