//! Codeshell binary entry point.

use codeshell::gateway::{serve_with_state, AppState};
use codeshell::{cli, config::Config, logging, ProcessBackend};
use tracing::info;

#[tokio::main]
async fn main() -> codeshell::Result<()> {
    let args = match cli::parse_args() {
        Ok(args) => args,
        Err(e) => {
            eprintln!("error: {}", e);
            eprintln!("Try 'codeshell --help' for more information.");
            std::process::exit(2);
        }
    };

    if args.help {
        cli::print_help();
        return Ok(());
    }

    if args.version {
        cli::print_version();
        return Ok(());
    }

    let config = match Config::load(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(2);
        }
    };

    logging::init(config.log_filter());

    info!("codeshell v{}", env!("CARGO_PKG_VERSION"));

    let backend = ProcessBackend::detect(config.terminal.force_fallback);
    info!("process backend: {}", backend.kind());

    let state = AppState::new(backend, config.terminal.shell.clone());
    let registry = state.registry.clone();

    let server_config = config.to_server_config();

    tokio::select! {
        result = serve_with_state(server_config, state) => {
            result?;
        }
        _ = tokio::signal::ctrl_c() => {
            info!("shutdown signal received");
        }
    }

    registry.shutdown();
    info!("codeshell stopped");

    Ok(())
}
