//! depscope CLI - Go module dependency graph viewer
//!
//! Builds the module dependency graph of a Go project and either serves an
//! interactive view of it or writes the graph JSON once.
//!
//! Usage:
//!   depscope [OPTIONS] [PATH]

use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use clap::Parser;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use depscope::{
    DepscopeConfig, EdgeStatus, GraphBuilder, load_config, load_config_file, serialize,
    serialize_pretty,
    web::{ServerConfig, start_server},
};

/// depscope - Inspect the module dependency graph of a Go project
#[derive(Parser, Debug)]
#[command(name = "depscope")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Root of the Go project to inspect
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Port to run the web server on (default: 4000)
    #[arg(long)]
    port: Option<u16>,

    /// Don't open browser automatically when starting web server
    #[arg(long)]
    no_open: bool,

    /// API endpoint URL for frontend (useful for separate deployments)
    #[arg(long)]
    api_endpoint: Option<String>,

    /// Write the graph JSON once instead of starting the web server
    #[arg(long)]
    json: bool,

    /// Indent the JSON output
    #[arg(long, requires = "json")]
    pretty: bool,

    /// Output file for the graph JSON (default: stdout)
    #[arg(short, long, requires = "json")]
    output: Option<PathBuf>,

    /// Config file path (default: search for .depscope.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    if let Err(e) = run(args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose { "depscope=debug" } else { "depscope=info" };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();
}

fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    // Explicit --config must load; a discovered one falls back to defaults on error
    let config = match &args.config {
        Some(path) => load_config_file(path)?,
        None => match load_config(&args.path) {
            Ok(config) => config,
            Err(e) => {
                warn!("No config file loaded: {}", e);
                DepscopeConfig::default()
            }
        },
    };
    debug!("Using toolchain `{}`", config.toolchain.go);

    let source = config.toolchain_for(&args.path);

    if args.json {
        info!("Inspecting modules at '{}'...", args.path.display());
        let report = GraphBuilder::new(&source).build_with_report()?;
        if let EdgeStatus::Unavailable(reason) = &report.edges {
            warn!("Edge listing failed, graph has no edges: {}", reason);
        }
        info!(
            "Found {} modules and {} edges",
            report.graph.node_count(),
            report.graph.edge_count()
        );

        let bytes = if args.pretty {
            serialize_pretty(&report.graph)?
        } else {
            serialize(&report.graph)?
        };

        let mut writer: Box<dyn Write> = match &args.output {
            Some(path) => Box::new(BufWriter::new(File::create(path)?)),
            None => Box::new(stdout()),
        };
        writer.write_all(&bytes)?;
        writer.write_all(b"\n")?;
        writer.flush()?;

        if let Some(path) = &args.output {
            info!("Graph written to: {}", path.display());
        }
        return Ok(());
    }

    // Web visualization mode - CLI args override config, which overrides defaults
    let server_config = ServerConfig {
        port: args.port.unwrap_or(config.server.port),
        open_browser: !args.no_open && config.server.open_browser,
        api_endpoint: args.api_endpoint.clone().or(config.server.api_endpoint.clone()),
        project_root: args.path.clone(),
    };

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(start_server(Arc::new(source), server_config))
        .map_err(|e| -> Box<dyn std::error::Error> { e })?;

    Ok(())
}
