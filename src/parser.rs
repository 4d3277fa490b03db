//! Parsers for the two toolchain output formats
//!
//! - `go list -json -m all` emits a sequence of concatenated JSON objects
//!   (not an array). It is decoded incrementally and fails on the first
//!   malformed value.
//! - `go mod graph` emits `parent child` lines. Lines that do not split into
//!   exactly two tokens are skipped.

use serde::Deserialize;
use serde_json::de::{Deserializer, SliceRead, StreamDeserializer};

use crate::graph::{Edge, ModuleRecord};

/// A module record as printed by the toolchain.
///
/// Accepts Go's field names as well as their lowercase forms.
#[derive(Debug, Deserialize)]
struct GoModule {
    #[serde(default, alias = "Path")]
    path: String,

    #[serde(default, alias = "Version")]
    version: String,

    #[serde(default, alias = "Direct")]
    direct: Option<bool>,

    #[serde(default, alias = "Indirect")]
    indirect: Option<bool>,

    #[serde(default, alias = "Main")]
    main: bool,

    #[serde(default, alias = "Dir")]
    dir: String,

    #[serde(default, rename = "gomod", alias = "GoMod", alias = "goMod")]
    go_mod: String,

    #[serde(default, rename = "replace", alias = "Replace")]
    replace: Option<Box<GoModule>>,
}

impl GoModule {
    /// An explicit `direct` wins. Otherwise any non-main build-list entry not
    /// flagged `Indirect` is direct: the toolchain omits `Indirect` when false.
    fn is_direct(&self) -> bool {
        match self.direct {
            Some(direct) => direct,
            None => !self.main && !self.indirect.unwrap_or(false),
        }
    }

    fn into_record(self, top_level: bool) -> ModuleRecord {
        // Replacements are not build-list entries and carry no requirement kind.
        let is_direct = if top_level {
            self.is_direct()
        } else {
            self.direct.unwrap_or(false)
        };
        let replacement = if top_level {
            self.replace.map(|r| Box::new(r.into_record(false)))
        } else {
            None
        };

        ModuleRecord {
            path: self.path,
            version: self.version,
            is_direct,
            is_main: self.main,
            dir: self.dir,
            go_mod: self.go_mod,
            replacement,
        }
    }
}

impl From<GoModule> for ModuleRecord {
    fn from(module: GoModule) -> Self {
        // Replacements are not chained: a replacement's own `Replace` is dropped.
        module.into_record(true)
    }
}

/// Incremental decoder over a concatenated JSON record stream
pub struct ModuleStream<'a> {
    inner: StreamDeserializer<'a, SliceRead<'a>, GoModule>,
}

impl Iterator for ModuleStream<'_> {
    type Item = Result<ModuleRecord, serde_json::Error>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|r| r.map(ModuleRecord::from))
    }
}

/// Decode module records one at a time from raw `go list -json` output
pub fn decode_modules(output: &[u8]) -> ModuleStream<'_> {
    ModuleStream {
        inner: Deserializer::from_slice(output).into_iter::<GoModule>(),
    }
}

/// Parse `go mod graph` output into edges, preserving line order
pub fn parse_edges(output: &[u8]) -> Vec<Edge> {
    String::from_utf8_lossy(output)
        .lines()
        .filter_map(parse_edge_line)
        .collect()
}

fn parse_edge_line(line: &str) -> Option<Edge> {
    let mut parts = line.split_whitespace();
    let parent = parts.next()?;
    let child = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    Some(Edge::new(parent, child))
}
