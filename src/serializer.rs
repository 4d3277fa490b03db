//! JSON serialization of dependency graphs
//!
//! Output is a single object with `nodes` (node key -> module record, sorted
//! by key) and `edges` (array of `[parent, child]` pairs in listing order).
//! The same graph always produces the same bytes.

use thiserror::Error;

use crate::graph::DependencyGraph;

/// Payload handed out when marshaling fails
const FALLBACK_PAYLOAD: &[u8] = b"{}";

/// Marshaling failure, carrying a minimal payload callers can still send
#[derive(Error, Debug)]
#[error("{source}")]
pub struct SerializeError {
    #[source]
    source: serde_json::Error,
}

impl SerializeError {
    /// An empty JSON object
    pub fn payload(&self) -> &'static [u8] {
        FALLBACK_PAYLOAD
    }
}

impl From<serde_json::Error> for SerializeError {
    fn from(source: serde_json::Error) -> Self {
        Self { source }
    }
}

/// Render the graph as compact JSON
pub fn serialize(graph: &DependencyGraph) -> Result<Vec<u8>, SerializeError> {
    Ok(serde_json::to_vec(graph)?)
}

/// Render the graph as indented JSON
pub fn serialize_pretty(graph: &DependencyGraph) -> Result<Vec<u8>, SerializeError> {
    Ok(serde_json::to_vec_pretty(graph)?)
}
