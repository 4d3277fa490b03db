//! Dependency graph model and builder
//!
//! [`GraphBuilder`] queries a [`MetadataSource`] for module records and
//! edges and assembles them into a [`DependencyGraph`]. Node listing is
//! required; edge listing is best-effort and a failure there yields a graph
//! with no edges.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::parser::{decode_modules, parse_edges};
use crate::source::{GoToolchain, MetadataSource, SourceError};

/// Errors that can occur while building a dependency graph
#[derive(Error, Debug)]
pub enum GraphError {
    /// The module listing could not be obtained (no module context, missing toolchain, ...)
    #[error("go list error: {0}")]
    BuildContext(#[from] SourceError),

    #[error("json decode error: {0}")]
    Decode(#[from] serde_json::Error),
}

/// A single module known to the build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleRecord {
    pub path: String,
    /// Empty for the main module
    #[serde(default)]
    pub version: String,
    #[serde(rename = "direct", default)]
    pub is_direct: bool,
    #[serde(rename = "main", default)]
    pub is_main: bool,
    #[serde(default)]
    pub dir: String,
    #[serde(rename = "gomod", default)]
    pub go_mod: String,
    #[serde(
        rename = "Replace",
        alias = "replace",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub replacement: Option<Box<ModuleRecord>>,
}

impl ModuleRecord {
    /// `path` for unversioned modules, `path@version` otherwise
    pub fn node_key(&self) -> String {
        node_key(&self.path, &self.version)
    }
}

/// Build the node key for a module path and version
pub fn node_key(path: &str, version: &str) -> String {
    if version.is_empty() {
        path.to_string()
    } else {
        format!("{}@{}", path, version)
    }
}

/// A directed `parent -> child` edge between node keys.
///
/// Serialized as a two element array.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Edge(pub String, pub String);

impl Edge {
    pub fn new(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self(parent.into(), child.into())
    }

    pub fn parent(&self) -> &str {
        &self.0
    }

    pub fn child(&self) -> &str {
        &self.1
    }
}

/// Module dependency graph of a single project
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DependencyGraph {
    /// Node key -> module. Sorted by key.
    pub nodes: BTreeMap<String, ModuleRecord>,
    /// In the order the toolchain reported them; duplicates are kept.
    pub edges: Vec<Edge>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a module under its node key, replacing any earlier record with the same key
    pub fn insert_module(&mut self, module: ModuleRecord) -> Option<ModuleRecord> {
        self.nodes.insert(module.node_key(), module)
    }

    /// The record flagged as the main module, if any
    pub fn main_module(&self) -> Option<&ModuleRecord> {
        self.nodes.values().find(|m| m.is_main)
    }

    pub fn direct_dependencies(&self) -> impl Iterator<Item = (&String, &ModuleRecord)> {
        self.nodes.iter().filter(|(_, m)| m.is_direct)
    }

    /// Edges with at least one endpoint missing from `nodes`.
    ///
    /// The module list and the edge list come from separate invocations and
    /// may disagree.
    pub fn dangling_edges(&self) -> impl Iterator<Item = &Edge> {
        self.edges.iter().filter(|e| {
            !self.nodes.contains_key(e.parent()) || !self.nodes.contains_key(e.child())
        })
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

/// Outcome of the edge listing step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EdgeStatus {
    Listed,
    /// The edge listing failed; the graph has no edges
    Unavailable(String),
}

/// A graph together with how its edges were obtained
#[derive(Debug, Clone)]
pub struct BuildReport {
    pub graph: DependencyGraph,
    pub edges: EdgeStatus,
}

/// Builds dependency graphs from a metadata source.
///
/// Holds no state between builds; every call queries the source again.
pub struct GraphBuilder<S> {
    source: S,
}

impl<S: MetadataSource> GraphBuilder<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn build(&self) -> Result<DependencyGraph, GraphError> {
        self.build_with_report().map(|report| report.graph)
    }

    /// Build the graph and report whether the edge listing succeeded
    pub fn build_with_report(&self) -> Result<BuildReport, GraphError> {
        let mut graph = DependencyGraph::new();

        let modules = self.source.list_modules()?;
        for module in decode_modules(&modules) {
            graph.insert_module(module?);
        }

        let edges = match self.source.list_edges() {
            Ok(output) => {
                graph.edges = parse_edges(&output);
                EdgeStatus::Listed
            }
            Err(e) => EdgeStatus::Unavailable(e.to_string()),
        };

        Ok(BuildReport { graph, edges })
    }
}

/// Build the dependency graph of the Go project rooted at `root`
pub fn build(root: impl AsRef<Path>) -> Result<DependencyGraph, GraphError> {
    GraphBuilder::new(GoToolchain::new(root)).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Fixture source returning canned outputs
    struct FixtureSource {
        modules: Result<&'static str, &'static str>,
        edges: Result<&'static str, &'static str>,
    }

    fn fixture_error(program: &str) -> SourceError {
        SourceError::Spawn {
            program: program.to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        }
    }

    impl MetadataSource for FixtureSource {
        fn list_modules(&self) -> Result<Vec<u8>, SourceError> {
            self.modules
                .map(|s| s.as_bytes().to_vec())
                .map_err(fixture_error)
        }

        fn list_edges(&self) -> Result<Vec<u8>, SourceError> {
            self.edges.map(|s| s.as_bytes().to_vec()).map_err(fixture_error)
        }
    }

    const EXAMPLE_MODULES: &str = r#"{"path":"example/root","main":true}
{"path":"example/dep","version":"v1.2.0","direct":true}
"#;

    const EXAMPLE_EDGES: &str = "example/root example/dep@v1.2.0\n";

    #[test]
    fn test_node_key() {
        assert_eq!(node_key("example/root", ""), "example/root");
        assert_eq!(node_key("example/dep", "v1.2.0"), "example/dep@v1.2.0");
    }

    #[test]
    fn test_build_example() {
        let builder = GraphBuilder::new(FixtureSource {
            modules: Ok(EXAMPLE_MODULES),
            edges: Ok(EXAMPLE_EDGES),
        });
        let graph = builder.build().unwrap();

        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.edges, vec![Edge::new("example/root", "example/dep@v1.2.0")]);
        assert_eq!(graph.main_module().unwrap().path, "example/root");
        assert_eq!(graph.nodes.values().filter(|m| m.is_main).count(), 1);
        assert_eq!(graph.direct_dependencies().count(), 1);
        assert_eq!(graph.dangling_edges().count(), 0);
    }

    #[test]
    fn test_module_listing_failure_is_fatal() {
        let builder = GraphBuilder::new(FixtureSource {
            modules: Err("go"),
            edges: Ok(EXAMPLE_EDGES),
        });
        let err = builder.build().unwrap_err();
        assert!(matches!(err, GraphError::BuildContext(_)));
        assert!(err.to_string().starts_with("go list error:"));
    }

    #[test]
    fn test_edge_listing_failure_degrades() {
        let builder = GraphBuilder::new(FixtureSource {
            modules: Ok(EXAMPLE_MODULES),
            edges: Err("go"),
        });

        let report = builder.build_with_report().unwrap();
        assert_eq!(report.graph.node_count(), 2);
        assert!(report.graph.edges.is_empty());
        assert!(matches!(report.edges, EdgeStatus::Unavailable(_)));

        let graph = builder.build().unwrap();
        assert_eq!(graph.edge_count(), 0);
    }

    #[test]
    fn test_malformed_record_fails_fast() {
        let builder = GraphBuilder::new(FixtureSource {
            modules: Ok(r#"{"path":"example/root","main":true} {"path":"#),
            edges: Ok(EXAMPLE_EDGES),
        });
        let err = builder.build().unwrap_err();
        assert!(matches!(err, GraphError::Decode(_)));
        assert!(err.to_string().starts_with("json decode error:"));
    }

    #[test]
    fn test_malformed_edge_lines_are_skipped() {
        let builder = GraphBuilder::new(FixtureSource {
            modules: Ok(EXAMPLE_MODULES),
            edges: Ok("example/root example/dep@v1.2.0\n\
                       example/root example/dep@v1.2.0 example/other@v0.1.0\n\
                       example/dep@v1.2.0 example/leaf@v0.3.0\n"),
        });
        let graph = builder.build().unwrap();

        assert_eq!(
            graph.edges,
            vec![
                Edge::new("example/root", "example/dep@v1.2.0"),
                Edge::new("example/dep@v1.2.0", "example/leaf@v0.3.0"),
            ]
        );
        // example/leaf@v0.3.0 is not in the module list
        assert_eq!(graph.dangling_edges().count(), 1);
    }

    #[test]
    fn test_empty_project_has_empty_containers() {
        let builder = GraphBuilder::new(FixtureSource {
            modules: Ok(r#"{"path":"example/root","main":true}"#),
            edges: Ok(""),
        });
        let report = builder.build_with_report().unwrap();

        assert_eq!(report.edges, EdgeStatus::Listed);
        assert_eq!(report.graph.node_count(), 1);
        assert!(report.graph.edges.is_empty());
    }

    #[test]
    fn test_duplicate_keys_last_write_wins() {
        let builder = GraphBuilder::new(FixtureSource {
            modules: Ok(r#"{"path":"example/dep","version":"v1.0.0","dir":"/first"}
{"path":"example/dep","version":"v1.0.0","dir":"/second"}"#),
            edges: Ok(""),
        });
        let graph = builder.build().unwrap();

        assert_eq!(graph.node_count(), 1);
        assert_eq!(graph.nodes["example/dep@v1.0.0"].dir, "/second");
    }

    #[test]
    fn test_build_is_idempotent() {
        let builder = GraphBuilder::new(FixtureSource {
            modules: Ok(EXAMPLE_MODULES),
            edges: Ok(EXAMPLE_EDGES),
        });
        let first = builder.build().unwrap();
        let second = builder.build().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_build_outside_module_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = build(dir.path());
        assert!(matches!(result, Err(GraphError::BuildContext(_))));
    }
}
