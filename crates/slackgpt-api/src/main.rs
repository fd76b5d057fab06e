//! SlackGPT entry point.
//!
//! Binary name: `slackgpt`
//!
//! Loads configuration, initializes logging and services, then serves the
//! Slack Events API until Ctrl+C or SIGTERM.

mod cli;
mod http;
mod state;

use clap::Parser;

use slackgpt_observe::{init_tracing, shutdown_tracing};
use slackgpt_types::error::ConfigError;
use slackgpt_types::llm::ModelSpec;

use cli::Cli;
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_tracing(&cli.log_options())?;

    let settings = match cli.into_settings() {
        Ok(settings) => settings,
        Err(e @ ConfigError::MissingConfiguration { .. }) => {
            tracing::error!(error = %e, "unable to start");
            shutdown_tracing();
            std::process::exit(1);
        }
        Err(e @ ConfigError::UnknownModel(_)) => {
            tracing::error!(error = %e, known = ?ModelSpec::known_models(), "unable to start");
            return Err(e.into());
        }
        Err(e) => return Err(e.into()),
    };

    let addr = settings.listen_addr;
    let state = AppState::init(settings)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, path = http::router::EVENTS_PATH, "slackgpt listening");

    let router = http::router::build_router(state);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    shutdown_tracing();
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
