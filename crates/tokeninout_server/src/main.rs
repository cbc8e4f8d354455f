//! Headless API server entrypoint.

use std::sync::Arc;
use std::time::Duration;
use tokeninout_core::DEFAULT_PORT;
use tokeninout_server::{config::Config, serve_router, AppState, GithubStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct CliFlags {
    help: bool,
    sync: bool,
}

fn parse_cli_flags(args: &[String]) -> anyhow::Result<CliFlags> {
    let mut flags = CliFlags::default();
    for arg in args.iter().skip(1) {
        match arg.as_str() {
            "--help" | "-h" => flags.help = true,
            "--sync" => flags.sync = true,
            value if value.starts_with('-') => {
                anyhow::bail!(
                    "Unknown option: '{}'. Use --help to see supported options.",
                    value
                );
            }
            value => {
                anyhow::bail!(
                    "Unexpected positional argument: '{}'. Use --help to see supported options.",
                    value
                );
            }
        }
    }
    Ok(flags)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tokeninout=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    let cli_flags = parse_cli_flags(&args)?;

    if cli_flags.help {
        print_help();
        return Ok(());
    }

    let config = Config::from_env();
    tracing::debug!(?config, "Loaded configuration");
    if config.github.token.is_none() {
        tracing::warn!("GITHUB_TOKEN is not set; remote writes will be rejected");
    }

    let store = GithubStore::new(
        &config.github,
        Duration::from_secs(config.remote_timeout_secs),
    )?;
    let state = AppState::new(config.clone(), Arc::new(store));

    if cli_flags.sync {
        let records = state.articles.sync_index().await?;
        println!(
            "Synced {} article(s) into {}",
            records.len(),
            config.articles_index_path
        );
        return Ok(());
    }

    let allow_public = tokeninout_server::config::env_flag_enabled("ALLOW_PUBLIC_ACCESS");
    if allow_public {
        tracing::warn!("Public access enabled - server will accept requests from any origin");
    }

    let bind_addr = tokeninout_server::resolve_bind_address(&config, allow_public);
    if !bind_addr.ip().is_loopback() {
        tracing::warn!(
            "Binding to non-localhost address: {} - ensure proper security measures are in place",
            bind_addr
        );
    }

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    let actual_addr = listener.local_addr().unwrap_or(bind_addr);
    tracing::info!(
        owner = %config.github.owner,
        repo = %config.github.repo,
        "TokenInout running at http://{}",
        actual_addr
    );

    serve_router(listener, state, allow_public, shutdown_signal()).await?;
    tracing::info!("Server stopped");

    Ok(())
}

fn print_help() {
    println!("TokenInout Content Server\n");
    println!("Usage: tokeninout [OPTIONS]\n");
    println!("Options:");
    println!("  --sync            Rebuild the article index from the remote store and exit");
    println!("  --help            Show this help message");
    println!("\nEnvironment variables:");
    println!(
        "  PORT              Server port (default: {})",
        DEFAULT_PORT
    );
    println!(
        "  BIND              Override bind address (e.g. 0.0.0.0:{})",
        DEFAULT_PORT
    );
    println!("  ALLOW_PUBLIC_ACCESS  Allow CORS from any origin");
    println!("  CONTENT_ROOT      Local mirror of the content repository (default: .)");
    println!("  GITHUB_TOKEN      Token used for remote reads and writes");
    println!("  GITHUB_OWNER      Repository owner (default: businesszh)");
    println!("  GITHUB_REPO       Repository name (default: tokeninout)");
    println!("  GITHUB_BRANCH     Branch to read and commit to (default: repository default)");
    println!("  GITHUB_API_URL    API base URL (default: https://api.github.com)");
    println!("  ARTICLES_INDEX_PATH  Index file path (default: data/json/articles.json)");
    println!("  ARTICLES_DIR      Markdown folder (default: data/md)");
    println!("  RESOURCES_PATH    Local resources list (default: data/json/resources.json)");
    println!("  SYNC_CONCURRENCY  Concurrent article reads during sync (default: 8)");
    println!("  FULL_RESYNC_ON_UPDATE  Rebuild the whole index after each update");
    println!("  REMOTE_TIMEOUT_SECS  Remote request timeout (default: 30)");
    println!("  MAX_BODY_SIZE     Maximum request body in bytes (default: 1MB)");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to install SIGTERM handler: {}", err);
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
