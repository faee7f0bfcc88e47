//! Parley CLI and HTTP entry point.
//!
//! Binary name: `parley`
//!
//! Parses CLI arguments, sets up tracing, wires the stores and providers,
//! then dispatches to a command handler or starts the HTTP endpoint.

mod cli;
mod http;
mod state;

use std::time::Duration;

use clap::Parser;
use tokio_util::sync::CancellationToken;

use parley_infra::session::SessionRegistry;
use parley_observe::tracing_setup::{LogFormat, init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let format = if cli.log_json {
        LogFormat::Json
    } else {
        LogFormat::Pretty
    };
    init_tracing(cli.log_filter(), format, cli.otel)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let state = AppState::init(cli.config.as_deref()).await?;

    let result = match cli.command {
        Commands::Serve { host, port } => serve(state, host, port, cli.quiet).await,
        Commands::Services => cli::services::list_services(&state, cli.json),
        Commands::Widget { action } => cli::widget::run(&state, action, cli.json).await,
    };

    shutdown_tracing();
    result
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
            "  {} Parley listening on {}",
            console::style("⚡").bold(),
            console::style(format!("http://{addr}/api/chat")).cyan()
        );
        println!("  {}", console::style("Press Ctrl+C to stop").dim());
    }
    tracing::info!(%addr, "serving");

    let cancel = CancellationToken::new();
    let sweeper = match state.config.session_idle_timeout() {
        Some(max_idle) => Some(tokio::spawn(sweep_idle_sessions(
            state.sessions.clone(),
            max_idle,
            cancel.clone(),
        ))),
        None => {
            tracing::info!("session idle timeout is 0, ephemeral sessions are never evicted");
            None
        }
    };

    let router = http::router::build_router(state);
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    cancel.cancel();
    if let Some(sweeper) = sweeper {
        let _ = sweeper.await;
    }

    if !quiet {
        println!("\n  Server stopped.");
    }
    Ok(())
}

/// Periodically drop sessions idle longer than `max_idle`.
async fn sweep_idle_sessions(
    sessions: SessionRegistry,
    max_idle: Duration,
    cancel: CancellationToken,
) {
    let period = (max_idle / 4).clamp(Duration::from_secs(1), Duration::from_secs(300));
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {
                let evicted = sessions.evict_idle(max_idle);
                if evicted > 0 {
                    tracing::debug!(evicted, remaining = sessions.len(), "evicted idle sessions");
                }
            }
        }
    }
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
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
                tracing::error!(error = %e, "failed to install SIGTERM handler");
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
}

#[cfg(test)]
mod tests {
    use super::*;
    use parley_core::chat::store::ConversationStore;
    use parley_types::chat::{ChatId, Message};
    use parley_types::llm::MessageRole;

    #[tokio::test]
    async fn test_sweeper_evicts_and_stops() {
        let sessions = SessionRegistry::new();
        sessions
            .store("s")
            .append(1, &Message::new(ChatId::parse("c").unwrap(), MessageRole::User, "x"))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(5)).await;

        let cancel = CancellationToken::new();
        let task = tokio::spawn(sweep_idle_sessions(
            sessions.clone(),
            Duration::from_millis(1),
            cancel.clone(),
        ));

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(sessions.is_empty());

        cancel.cancel();
        task.await.unwrap();
    }
}
