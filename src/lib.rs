//! # depscope - Go Module Dependency Graphs
//!
//! Inspects the module dependency metadata of a Go project and exposes it
//! as a graph for visualization.
//!
//! ## Overview
//!
//! depscope runs two toolchain queries in the project root:
//!
//! 1. `go list -json -m all` - one JSON record per module in the build list
//! 2. `go mod graph` - one `parent child` line per requirement edge
//!
//! and merges them into a [`DependencyGraph`] keyed by `path@version`.
//! The edge query is best-effort: if it fails the graph is returned with no
//! edges.
//!
//! ## Usage
//!
//! ```bash
//! # Serve the interactive view for the current project
//! depscope
//!
//! # Print the graph JSON once
//! depscope --json --pretty ./path/to/project
//! ```
//!
//! ## Library
//!
//! ```no_run
//! let graph = depscope::build(".")?;
//! let bytes = depscope::serialize(&graph)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod graph;
pub mod parser;
pub mod serializer;
pub mod source;
pub mod web;

pub use config::{
    ConfigError, DepscopeConfig, ServerSection, ToolchainConfig, find_config_file, load_config,
    load_config_file,
};
pub use graph::{
    BuildReport, DependencyGraph, Edge, EdgeStatus, GraphBuilder, GraphError, ModuleRecord, build,
    node_key,
};
pub use parser::{ModuleStream, decode_modules, parse_edges};
pub use serializer::{SerializeError, serialize, serialize_pretty};
pub use source::{GoToolchain, MetadataSource, SourceError};
