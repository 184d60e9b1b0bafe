//! find-monster CLI & stdio server
//!
//! Dual-mode application:
//! - stdio mode (no subcommand): JSON-line `find` / `find_all` / `find_debug` requests
//! - CLI mode: run one query and print the result as JSON

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands};
use find_monster::config::{load_config, FinderConfig};
use find_monster::error::{validate_query, FindError};
use find_monster::search::{typo_log, MonsterFinder};
use find_monster::snapshot::{Snapshot, SnapshotPublisher};
use std::path::PathBuf;
use tokio::task::JoinHandle;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.command.is_some() {
        run_cli_mode(cli).await
    } else {
        run_stdio_mode(cli).await
    }
}

/// Run in CLI mode
async fn run_cli_mode(cli: Cli) -> Result<()> {
    // Initialize logging based on verbosity flags
    let log_level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_writer(std::io::stderr) // Log to stderr to keep stdout clean
        .init();

    match execute_command(cli).await {
        Ok(output) => {
            println!("{}", output);
            Ok(())
        }
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(get_exit_code(&e));
        }
    }
}

/// Run in stdio mode
async fn run_stdio_mode(cli: Cli) -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    info!("Starting find-monster on stdio");
    let (finder, typo_writer) = start_finder(&cli)?;
    find_monster::stdio::handle_stdio(&finder).await?;
    drop(finder);
    finish_typo_log(typo_writer).await;
    Ok(())
}

async fn execute_command(cli: Cli) -> Result<String> {
    let (finder, typo_writer) = start_finder(&cli)?;

    let output = match cli.command {
        Some(Commands::Find(args)) => {
            let query = args.text();
            validate_query(&query)?;
            let (monster, _extras) = finder.find(&query).await?;
            let monster = monster.ok_or_else(|| FindError::NotFound(query.clone()))?;
            serde_json::to_string_pretty(&monster)?
        }
        Some(Commands::FindAll(args)) => {
            let query = args.query.text();
            validate_query(&query)?;
            let (mut monsters, extras) = finder.find_all(&query).await?;
            if let Some(limit) = args.limit {
                monsters.truncate(limit);
            }
            serde_json::to_string_pretty(&serde_json::json!({
                "monsters": monsters,
                "extras": extras,
            }))?
        }
        Some(Commands::Debug(args)) => {
            let query = args.text();
            validate_query(&query)?;
            let (info, extras) = finder.find_debug(&query).await?;
            serde_json::to_string_pretty(&serde_json::json!({
                "info": info,
                "extras": extras,
            }))?
        }
        Some(Commands::Tokens(args)) => {
            let snapshot = finder.snapshot().await?;
            let tokens = snapshot
                .index
                .tokens_for(args.id)
                .ok_or_else(|| FindError::NotFound(format!("monster {}", args.id)))?;
            serde_json::to_string_pretty(tokens)?
        }
        None => {
            return Err(FindError::InvalidQuery(
                "No command specified. Use --help for usage information.".to_string(),
            )
            .into());
        }
    };

    drop(finder);
    finish_typo_log(typo_writer).await;
    Ok(output)
}

/// Load configuration, start the catalog load in the background and return
/// a finder that waits for it.
fn start_finder(cli: &Cli) -> Result<(MonsterFinder, Option<JoinHandle<()>>)> {
    let config = match load_config() {
        Ok(config) => config,
        Err(e) => {
            warn!("Ignoring unreadable config file: {:#}", e);
            FinderConfig::default()
        }
    };
    let config = cli.apply(config);
    config.validate()?;

    let catalog = cli.catalog.clone().ok_or_else(|| {
        FindError::InvalidConfig(
            "No catalog given; pass --catalog or set FIND_MONSTER_CATALOG".to_string(),
        )
    })?;
    let sheets = cli.sheets.clone();

    let (publisher, reader) = SnapshotPublisher::new();
    tokio::spawn(load_catalog(publisher, catalog, sheets));

    let mut finder = MonsterFinder::new(reader, config.clone());
    let mut writer_handle = None;
    if let Some(path) = config.typo_log_path.clone() {
        let (log, writer) = typo_log(Some(path));
        writer_handle = Some(tokio::spawn(async move {
            let seen = writer.run().await;
            info!("Recorded {} distinct unknown modifiers", seen.len());
        }));
        finder = finder.with_typo_log(log);
    }
    Ok((finder, writer_handle))
}

/// Build the snapshot off the async threads and publish it. The publisher is
/// dropped on failure, which fails every waiting query.
async fn load_catalog(publisher: SnapshotPublisher, catalog: PathBuf, sheets: Option<PathBuf>) {
    let loaded = tokio::task::spawn_blocking(move || {
        Snapshot::load(&catalog, sheets.as_deref())
            .with_context(|| format!("Failed to load catalog {}", catalog.display()))
    })
    .await;

    match loaded {
        Ok(Ok(snapshot)) => {
            publisher.publish(snapshot);
        }
        Ok(Err(e)) => eprintln!("Error: {:#}", e),
        Err(e) => eprintln!("Error: catalog loader panicked: {}", e),
    }
}

async fn finish_typo_log(handle: Option<JoinHandle<()>>) {
    if let Some(handle) = handle {
        if let Err(e) = handle.await {
            warn!("Typo log writer failed: {}", e);
        }
    }
}

/// Map errors to exit codes
fn get_exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<FindError>() {
        Some(FindError::InvalidQuery(_)) | Some(FindError::InvalidConfig(_)) => 1, // Invalid arguments or usage error
        Some(FindError::NotFound(_)) => 3,
        _ => 5, // Other application errors
    }
}
