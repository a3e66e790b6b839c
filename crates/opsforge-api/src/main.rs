//! Opsforge CLI and REST API entry point.
//!
//! Binary name: `opsforge`
//!
//! Parses CLI arguments, loads configuration, wires the gateway and
//! orchestrators, then either serves the REST API or prints status.

mod cli;
mod http;
mod state;

use clap::Parser;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Verbosity maps to a default filter; RUST_LOG always wins.
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,opsforge=debug",
        _ => "trace",
    };
    let enable_otel = matches!(cli.command, Commands::Serve { otel: true, .. });
    if let Err(e) = opsforge_observe::tracing_setup::init_tracing(filter, enable_otel) {
        eprintln!("Warning: failed to initialize tracing: {e}");
    }

    let data_dir = opsforge_infra::config::resolve_data_dir();
    let state = AppState::init(data_dir).await?;

    match cli.command {
        Commands::Serve { port, host, .. } => {
            let host = host.unwrap_or_else(|| state.config.host.clone());
            let port = port.unwrap_or(state.config.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            if !cli.quiet {
                println!(
                    "  {} Opsforge API listening on {}",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}")).cyan()
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let router = http::router::build_router(state);
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
        }

        Commands::Status => {
            let has_key = opsforge_infra::config::bedrock_api_key().is_some();
            let check_mark = |ok: bool| {
                if ok {
                    format!("{}", console::style("✓").green())
                } else {
                    format!("{}", console::style("✗").red())
                }
            };

            println!();
            println!("  {} Opsforge status", console::style("🔍").bold());
            println!();
            println!(
                "  {} AWS_BEDROCK_API_KEY {}",
                check_mark(has_key),
                if has_key { "set" } else { "not set (analysis requests will be rejected)" }
            );
            println!("    model:  {}", state.config.bedrock.model);
            println!("    region: {}", state.config.bedrock.region);
            println!(
                "    bind:   {}:{}",
                state.config.host, state.config.port
            );
            println!("    session capacity: {}", state.config.max_sessions);
            println!();
        }
    }

    opsforge_observe::tracing_setup::shutdown_tracing();
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

    tracing::info!("shutdown signal received");
}
