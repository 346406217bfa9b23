//! clusterkit command line.
//!
//! Runs the HTTP server, or drives the supervisor directly from a terminal.

mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use ck_core::config::{load_config, AppConfig};
use ck_core::inventory::generate_inventory;
use ck_core::reachability::{probe_all, DEFAULT_PROBE_TIMEOUT, DEFAULT_SSH_PORT};
use ck_core::supervisor::ProcessSupervisor;
use ck_protocol::events::Event;
use ck_protocol::inventory_models::InventoryRequest;
use ck_protocol::ipc::Credentials;
use ck_protocol::run_models::InstallKind;
use ck_server::state::AppState;
use clap::{Parser, Subcommand};
use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use colored::Colorize;
use tokio_stream::StreamExt;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use render::Renderer;

#[derive(Parser)]
#[command(name = "clusterkit")]
#[command(about = "Provision k3s clusters with Ansible and follow the progress")]
#[command(version)]
struct Cli {
    /// Project root containing `.clusterkit/`
    #[arg(long, global = true, default_value = ".")]
    root: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Serve the HTTP API
    Serve {
        /// Bind address (overrides config)
        #[arg(long)]
        bind: Option<String>,
    },

    /// Run an install or uninstall and follow its progress
    Run {
        /// install or uninstall
        kind: InstallKind,

        /// Remote login user
        #[arg(long)]
        user: String,

        /// Private key file
        #[arg(long)]
        key: PathBuf,
    },

    /// Print the step catalog of an operation
    Steps {
        /// install or uninstall
        kind: InstallKind,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate the inventory from a YAML or JSON node list
    Inventory {
        #[arg(long)]
        file: PathBuf,
    },

    /// Check which hosts accept SSH connections
    Probe {
        #[arg(required = true)]
        hosts: Vec<String>,

        #[arg(long, default_value_t = DEFAULT_SSH_PORT)]
        port: u16,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    color_eyre::install()?;
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| cli.log_level.clone()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config(&cli.root)
        .await
        .wrap_err_with(|| format!("Failed to load configuration from {}", cli.root.display()))?;

    match cli.command {
        Command::Serve { bind } => serve(&config, bind).await,
        Command::Run { kind, user, key } => run(&config, kind, user, &key).await,
        Command::Steps { kind, json } => steps(&config, kind, json),
        Command::Inventory { file } => inventory(&config, &file),
        Command::Probe { hosts, port } => probe(&hosts, port).await,
    }
}

async fn serve(config: &AppConfig, bind: Option<String>) -> Result<ExitCode> {
    let bind = bind.unwrap_or_else(|| config.global.server.bind.clone());
    ck_server::serve(AppState::from_config(config), &bind)
        .await
        .map_err(|e| eyre!(e))?;
    Ok(ExitCode::SUCCESS)
}

async fn run(config: &AppConfig, kind: InstallKind, user: String, key: &Path) -> Result<ExitCode> {
    let private_key = std::fs::read_to_string(key)
        .wrap_err_with(|| format!("Failed to read key file {}", key.display()))?;

    let supervisor = Arc::new(ProcessSupervisor::from_config(config));
    let mut events = supervisor
        .start(kind, Credentials::new(user, private_key))
        .await?;

    let ctrl_c = {
        let supervisor = Arc::clone(&supervisor);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("{}", "Aborting...".yellow());
                if let Err(e) = supervisor.abort() {
                    tracing::warn!("Abort failed: {}", e);
                }
            }
        })
    };

    let mut renderer = Renderer::new();
    let mut success = false;
    while let Some(event) = events.next().await {
        println!("{}", renderer.line(&event));
        if let Event::Finished { success: ok, .. } = event {
            success = ok;
        }
    }
    ctrl_c.abort();

    Ok(if success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn steps(config: &AppConfig, kind: InstallKind, json: bool) -> Result<ExitCode> {
    let catalog = config.catalogs.get(kind);

    if json {
        println!("{}", serde_json::to_string_pretty(catalog.steps())?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("{} ({} steps)", kind.to_string().bold(), catalog.steps().len());
    for step in catalog.steps() {
        println!("  {:<10} {:<20} {}", step.id, step.match_pattern, step.label);
    }
    Ok(ExitCode::SUCCESS)
}

fn inventory(config: &AppConfig, file: &Path) -> Result<ExitCode> {
    let content = std::fs::read_to_string(file)
        .wrap_err_with(|| format!("Failed to read node list {}", file.display()))?;
    let request: InventoryRequest = serde_yaml::from_str(&content)
        .wrap_err_with(|| format!("Failed to parse node list {}", file.display()))?;

    let summary = generate_inventory(&config.inventory_root(), &request)?;
    println!(
        "{} {} ({} masters, {} workers, primordial master {})",
        "Wrote".green(),
        summary.inventory.display(),
        summary.masters,
        summary.workers,
        summary.primordial_master
    );
    Ok(ExitCode::SUCCESS)
}

async fn probe(hosts: &[String], port: u16) -> Result<ExitCode> {
    let results = probe_all(hosts, port, DEFAULT_PROBE_TIMEOUT).await;

    for result in &results {
        let verdict = if result.reachable {
            "reachable".green()
        } else {
            "unreachable".red()
        };
        println!("{}:{} {}", result.host, result.port, verdict);
    }

    Ok(if results.iter().all(|r| r.reachable) {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
