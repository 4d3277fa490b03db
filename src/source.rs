//! Module metadata sources
//!
//! A [`MetadataSource`] produces the two raw outputs the graph builder
//! consumes: the module record stream and the edge list. [`GoToolchain`]
//! obtains them by running `go list -json -m all` and `go mod graph` in a
//! project root; tests substitute fixture sources.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

use thiserror::Error;

/// Errors raised while invoking the module toolchain
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("failed to run `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("`{command}` exited with {status}: {stderr}")]
    Failed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },
}

/// Raw module metadata provider.
///
/// Both operations return the tool output untouched; parsing lives in
/// [`crate::parser`].
pub trait MetadataSource: Send + Sync {
    /// Concatenated JSON module records, one per module in the build list.
    fn list_modules(&self) -> Result<Vec<u8>, SourceError>;

    /// Newline separated `parent child` node key pairs.
    fn list_edges(&self) -> Result<Vec<u8>, SourceError>;
}

impl<S: MetadataSource + ?Sized> MetadataSource for &S {
    fn list_modules(&self) -> Result<Vec<u8>, SourceError> {
        (**self).list_modules()
    }

    fn list_edges(&self) -> Result<Vec<u8>, SourceError> {
        (**self).list_edges()
    }
}

/// Runs the `go` toolchain inside an explicit project root.
#[derive(Debug, Clone)]
pub struct GoToolchain {
    root: PathBuf,
    program: String,
    env: BTreeMap<String, String>,
}

impl GoToolchain {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            program: "go".to_string(),
            env: BTreeMap::new(),
        }
    }

    /// Use a different toolchain binary (e.g. `go1.22.3` or an absolute path)
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Extra environment variables passed to every invocation
    pub fn with_env(mut self, env: BTreeMap<String, String>) -> Self {
        self.env.extend(env);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn run(&self, args: &[&str]) -> Result<Vec<u8>, SourceError> {
        let output = Command::new(&self.program)
            .args(args)
            .envs(&self.env)
            .current_dir(&self.root)
            .output()
            .map_err(|source| SourceError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(output.stdout)
        } else {
            Err(SourceError::Failed {
                command: format!("{} {}", self.program, args.join(" ")),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl MetadataSource for GoToolchain {
    fn list_modules(&self) -> Result<Vec<u8>, SourceError> {
        self.run(&["list", "-json", "-m", "all"])
    }

    fn list_edges(&self) -> Result<Vec<u8>, SourceError> {
        self.run(&["mod", "graph"])
    }
}
