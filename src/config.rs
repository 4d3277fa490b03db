//! Configuration file support for depscope
//!
//! Settings are read from `.depscope.toml` (or `depscope.toml`) found in the
//! project root or any parent directory.
//!
//! ## Configuration File Format
//!
//! ```toml
//! # .depscope.toml
//!
//! [toolchain]
//! # Go binary used to query module metadata
//! go = "go"
//!
//! # Extra environment for every toolchain invocation
//! env = { GOFLAGS = "-mod=mod" }
//!
//! [server]
//! port = 4000
//! open_browser = true
//! # API endpoint URL for a separately deployed frontend
//! api_endpoint = "https://deps.example.com"
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::source::GoToolchain;

/// Errors that can occur when loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Toolchain configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct ToolchainConfig {
    /// Go binary name or path
    #[serde(default = "default_go")]
    pub go: String,

    /// Extra environment variables
    #[serde(default)]
    pub env: BTreeMap<String, String>,
}

fn default_go() -> String {
    "go".to_string()
}

impl Default for ToolchainConfig {
    fn default() -> Self {
        Self {
            go: default_go(),
            env: BTreeMap::new(),
        }
    }
}

/// Web server configuration section
#[derive(Debug, Clone, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_open_browser")]
    pub open_browser: bool,

    #[serde(default)]
    pub api_endpoint: Option<String>,
}

fn default_port() -> u16 {
    4000
}

fn default_open_browser() -> bool {
    true
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            open_browser: default_open_browser(),
            api_endpoint: None,
        }
    }
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DepscopeConfig {
    #[serde(default)]
    pub toolchain: ToolchainConfig,

    #[serde(default)]
    pub server: ServerSection,
}

impl DepscopeConfig {
    /// Metadata source for the project at `root` using the configured toolchain
    pub fn toolchain_for(&self, root: &Path) -> GoToolchain {
        GoToolchain::new(root)
            .with_program(self.toolchain.go.clone())
            .with_env(self.toolchain.env.clone())
    }
}

/// Load configuration from the project directory
///
/// Searches for `.depscope.toml` in the given directory and parent directories.
/// Returns the default configuration when none is found.
pub fn load_config(project_path: &Path) -> Result<DepscopeConfig, ConfigError> {
    match find_config_file(project_path) {
        Some(path) => load_config_file(&path),
        None => Ok(DepscopeConfig::default()),
    }
}

/// Load a specific configuration file
pub fn load_config_file(path: &Path) -> Result<DepscopeConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    let config: DepscopeConfig = toml::from_str(&content)?;
    Ok(config)
}

/// Find the config file by searching up the directory tree
pub fn find_config_file(start_path: &Path) -> Option<PathBuf> {
    let config_names = [".depscope.toml", "depscope.toml"];

    let mut current = if start_path.is_file() {
        start_path.parent()?.to_path_buf()
    } else {
        start_path.to_path_buf()
    };

    loop {
        for name in &config_names {
            let config_path = current.join(name);
            if config_path.exists() {
                return Some(config_path);
            }
        }

        // Move to parent directory
        if let Some(parent) = current.parent() {
            current = parent.to_path_buf();
        } else {
            break;
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DepscopeConfig::default();
        assert_eq!(config.toolchain.go, "go");
        assert!(config.toolchain.env.is_empty());
        assert_eq!(config.server.port, 4000);
        assert!(config.server.open_browser);
        assert!(config.server.api_endpoint.is_none());
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
            [toolchain]
            go = "/usr/local/go/bin/go"
            env = { GOFLAGS = "-mod=mod", GOWORK = "off" }

            [server]
            port = 8080
            open_browser = false
        "#;

        let config: DepscopeConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.toolchain.go, "/usr/local/go/bin/go");
        assert_eq!(config.toolchain.env.len(), 2);
        assert_eq!(config.toolchain.env["GOWORK"], "off");
        assert_eq!(config.server.port, 8080);
        assert!(!config.server.open_browser);
    }

    #[test]
    fn test_partial_sections_use_defaults() {
        let config: DepscopeConfig = toml::from_str("[server]\napi_endpoint = \"http://x\"\n").unwrap();
        assert_eq!(config.server.port, 4000);
        assert_eq!(config.server.api_endpoint.as_deref(), Some("http://x"));
        assert_eq!(config.toolchain.go, "go");
    }

    #[test]
    fn test_toolchain_for_root() {
        let config: DepscopeConfig = toml::from_str("[toolchain]\ngo = \"go1.22.3\"\n").unwrap();
        let toolchain = config.toolchain_for(Path::new("/src/app"));
        assert_eq!(toolchain.program(), "go1.22.3");
        assert_eq!(toolchain.root(), Path::new("/src/app"));
    }

    #[test]
    fn test_config_found_in_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join(".depscope.toml"), "[server]\nport = 5000\n").unwrap();
        let nested = dir.path().join("cmd").join("server");
        fs::create_dir_all(&nested).unwrap();

        let found = find_config_file(&nested).unwrap();
        assert_eq!(found, dir.path().join(".depscope.toml"));
        assert_eq!(load_config(&nested).unwrap().server.port, 5000);
    }

    #[test]
    fn test_invalid_config_is_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("depscope.toml");
        fs::write(&path, "[server]\nport = \"not a number\"\n").unwrap();

        assert!(matches!(
            load_config_file(&path),
            Err(ConfigError::ParseError(_))
        ));
    }
}
