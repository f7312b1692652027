pub mod cli;
pub mod client;
pub mod codec;
pub mod commands;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod project;
pub mod state;

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use serde::Serialize;

use cli::{Cli, Commands};
use client::{NgwClient, ProjectRequest};
use commands::{credentials, file, project as project_cmd};
use config::AppConfig;
use error::AppError;
use loader::ProjectLoader;
use project::serialization::ProjectStore;
use state::AppState;

/// ngfield binary entry point.
///
/// All setup lives here so it can be referenced by the thin `main.rs`
/// wrapper.
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    let config = match cli.config.as_deref() {
        Some(path) => AppConfig::load(path),
        None => AppConfig::load_default(),
    };
    let config = match config {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };

    // ── Tracing setup ────────────────────────────────────────────────────────
    //
    // Logs are written to a rolling-never (single) file in the OS data dir:
    //   Linux    ~/.local/share/ngfield/ngfield.log
    //   macOS    ~/Library/Application Support/ngfield/ngfield.log
    //   Windows  %LOCALAPPDATA%\ngfield\ngfield.log
    //
    // RUST_LOG overrides the filter from the config file.
    let log_dir = dirs::data_local_dir().unwrap_or_default().join("ngfield");

    // tracing_appender::rolling::never panics if it cannot open the log file,
    // so the directory tree is created first.
    let _ = std::fs::create_dir_all(&log_dir);

    let file_appender = tracing_appender::rolling::never(&log_dir, "ngfield.log");
    let (non_blocking, _tracing_guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log.filter)),
        )
        .with_writer(non_blocking)
        .init();

    tracing::info!(command = ?cli.command, "ngfield starting");

    match execute(cli.command, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn execute(command: Commands, config: &AppConfig) -> Result<(), AppError> {
    let store = ProjectStore::new(config.storage_dir());
    let state = AppState::default();

    match command {
        Commands::Load { id, private, hash } => {
            let request = ProjectRequest { id, private, hash };
            let snapshot = with_loader(config, |loader| async move {
                file::load_remote_inner(request, &loader, &store, &state).await
            })?;
            print_json(&snapshot)
        }
        Commands::Import { file: path, private } => {
            let snapshot = with_loader(config, |loader| async move {
                file::import_file_inner(&path, private, &loader, &store, &state).await
            })?;
            print_json(&snapshot)
        }
        Commands::Show { id } => print_json(&project_cmd::show_inner(id, &store, &state)?),
        Commands::Level { project, node } => {
            print_json(&project_cmd::level_inner(project, &node, &store)?)
        }
        Commands::List => print_json(&project_cmd::list_inner(&store)?),
        Commands::Remove { id } => project_cmd::remove_inner(id, &store, &state),
        Commands::Decode { hash, version } => {
            println!("{}", credentials::decode_inner(&hash, version)?);
            Ok(())
        }
        Commands::Encode { password, version } => {
            println!("{}", credentials::encode_inner(&password, version)?);
            Ok(())
        }
    }
}

/// Run `task` on a fresh runtime with a loader backed by the HTTP client.
///
/// The blocking HTTP client is built and dropped outside the runtime.
fn with_loader<F, Fut, T>(config: &AppConfig, task: F) -> Result<T, AppError>
where
    F: FnOnce(ProjectLoader) -> Fut,
    Fut: std::future::Future<Output = Result<T, AppError>>,
{
    let client = Arc::new(NgwClient::new(config.service.clone())?);
    let loader = ProjectLoader::new(client.clone(), config.service.base_url.as_str());
    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(task(loader));
    drop(runtime);
    drop(client);
    result
}

fn print_json<T: Serialize>(value: &T) -> Result<(), AppError> {
    let text = serde_json::to_string_pretty(value)
        .map_err(|e| AppError::Io(format!("cannot format output: {e}")))?;
    println!("{text}");
    Ok(())
}
