//! Navigation shell
//!
//! HTTP server composing remote micro-frontend navigation.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method, header};
use clap::{Parser, Subcommand};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use navshell_kernel::remote::cli as remote_cli;
use navshell_kernel::{AppState, Config, routes};

/// Navigation shell for a micro-frontend gateway.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP server (default).
    Serve,

    /// Inspect the configured remotes.
    Remotes {
        #[command(subcommand)]
        command: RemotesCommand,
    },
}

#[derive(Subcommand, Debug)]
enum RemotesCommand {
    /// List configured remotes in display order.
    List,

    /// Load every remote once and report the outcome.
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Initialize tracing
    init_tracing();

    // Load configuration from environment
    let config = Config::from_env().context("failed to load configuration")?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => serve(config).await,
        Command::Remotes {
            command: RemotesCommand::List,
        } => remote_cli::cmd_remotes_list(&config),
        Command::Remotes {
            command: RemotesCommand::Check,
        } => remote_cli::cmd_remotes_check(&config).await,
    }
}

async fn serve(config: Config) -> Result<()> {
    info!(port = config.port, remotes = ?config.remotes, "Starting navigation shell");

    let state = AppState::new(&config)
        .await
        .context("failed to initialize application state")?;

    // Remote loads start on every session-ready transition
    state.aggregator().spawn_session_listener();

    // Profile flags are display-only; the shell serves without them
    let profile_state = state.clone();
    tokio::spawn(async move {
        profile_state.refresh_profile().await;
    });

    // Build CORS layer from config
    let cors = build_cors_layer(&config);

    // Build the router
    let app = routes::router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start the server
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, "Server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if config.cors_allowed_origins.len() == 1 && config.cors_allowed_origins[0] == "*" {
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any)
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "ignoring unparseable CORS origin");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            // Credentials rule out a wildcard header list
            .allow_headers([header::ACCEPT, header::AUTHORIZATION, header::CONTENT_TYPE])
            .allow_credentials(true)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
