//! Parley CLI and REST API entry point.
//!
//! Binary name: `parley`
//!
//! Parses CLI arguments, loads configuration, initializes the database and
//! services, then dispatches to a command handler or starts the REST API
//! server.

mod cli;
mod http;
mod state;

use clap::Parser;
use parley_infra::config::{load_config, load_dotenv, resolve_data_dir};
use parley_observe::tracing_setup::{TracingOptions, init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Before tracing so RUST_LOG may come from .env
    load_dotenv();

    let options = TracingOptions::new(cli.default_log_filter())
        .with_otel(cli.otel)
        .with_json(cli.log_json);
    init_tracing(&options).map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let data_dir = resolve_data_dir();
    let config = load_config(&data_dir).await;

    match cli.command {
        // The connectivity check reports its own failures, so it opens the DB itself
        Commands::CheckDb => cli::check_db::check_db(&config, &data_dir, cli.json).await,

        Commands::Serve { port, host } => {
            let state = AppState::init(config, data_dir).await?;
            serve(state, host, port, cli.quiet).await
        }

        Commands::Ask { message } => {
            let state = AppState::init(config, data_dir).await?;
            cli::conversation::ask(&state, &message, cli.json).await
        }

        Commands::History => {
            let state = AppState::init(config, data_dir).await?;
            cli::conversation::history(&state, cli.json).await
        }

        Commands::Clear => {
            let state = AppState::init(config, data_dir).await?;
            cli::conversation::clear(&state, cli.json).await
        }
    }
}

async fn serve(
    state: AppState,
    host: Option<String>,
    port: Option<u16>,
    quiet: bool,
) -> anyhow::Result<()> {
    let host = host.unwrap_or_else(|| state.config.server.host.clone());
    let port = port.unwrap_or(state.config.server.port);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    if !quiet {
        println!(
            "  {} Parley API listening on {}",
            console::style("⚡").bold(),
            console::style(format!("http://{addr}")).cyan()
        );
        println!("  {}", console::style("Press Ctrl+C to stop").dim());
    }
    tracing::info!(
        %addr,
        data_dir = %state.data_dir.display(),
        frontend = %state.config.server.frontend_url,
        network_tiers = state.conversations.responder().has_network_tier(),
        "Server started"
    );

    let db_pool = state.db_pool.clone();
    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db_pool.close().await;
    if !quiet {
        println!("\n  Server stopped.");
    }
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
