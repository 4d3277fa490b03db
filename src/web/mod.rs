//! Web visualization module for depscope
//!
//! Serves the dependency graph of a project as JSON together with a small
//! embedded front-end that renders it.

pub mod routes;
pub mod server;

pub use server::{AppState, ServerConfig, app, start_server};
