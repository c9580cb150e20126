//! Chatbot marketplace REST API entry point.
//!
//! Binary name: `botmarket`
//!
//! Parses CLI arguments, initializes the database and services, then either
//! starts the REST API server or runs a one-shot admin command.

mod http;
mod state;

use clap::{Parser, Subcommand};

use botmarket_infra::config::Settings;
use botmarket_types::user::{NewAccount, UserRole};
use state::AppState;

/// Chatbot marketplace backend.
#[derive(Parser)]
#[command(name = "botmarket", version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Export spans via OpenTelemetry (stdout exporter).
        #[arg(long)]
        otel: bool,
    },

    /// Seed development accounts (one admin, one developer).
    SeedUsers {
        /// Password for the seeded accounts.
        #[arg(long, default_value = "change-me-now")]
        password: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let otel = matches!(&cli.command, Commands::Serve { otel: true, .. });
    botmarket_observe::tracing_setup::init_tracing(otel)
        .map_err(|e| anyhow::anyhow!("tracing init failed: {e}"))?;

    let settings = Settings::from_env();
    let state = AppState::init(&settings).await?;

    match cli.command {
        Commands::Serve { port, host, .. } => {
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} botmarket API listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
            botmarket_observe::tracing_setup::shutdown_tracing();
        }

        Commands::SeedUsers { password } => {
            let seeds = [
                ("Seed Admin", "admin@botmarket.local", UserRole::Admin),
                ("Seed Developer", "dev@botmarket.local", UserRole::Developer),
            ];
            for (full_name, email, role) in seeds {
                let result = state
                    .user_service
                    .register(NewAccount {
                        full_name: full_name.to_string(),
                        email: email.to_string(),
                        password: password.clone(),
                        role,
                    })
                    .await;
                match result {
                    Ok(user) => println!(
                        "  {} seeded {} ({}) id={}",
                        console::style("✓").green(),
                        console::style(email).cyan(),
                        role,
                        user.id
                    ),
                    Err(err) => println!(
                        "  {} {} skipped: {}",
                        console::style("✗").red(),
                        email,
                        err
                    ),
                }
            }
        }
    }

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
