#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use api_docs::ApiDocsGateway;
use clap::Parser;
use docs_authn::{AuthNClient, StaticAuthN};
use tokio_util::sync::CancellationToken;
use utoipa::OpenApi;

mod books;
mod config;
mod logging;

use config::AppConfig;

/// Serve a demo API with its OpenAPI schema and Swagger UI.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a YAML configuration file
    #[arg(short, long, env = "DOCS_SERVER_CONFIG")]
    config: Option<PathBuf>,

    /// Print the effective configuration as JSON and exit
    #[arg(long)]
    print_config: bool,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;

    if cli.print_config {
        println!("{}", serde_json::to_string_pretty(&config)?);
        return Ok(());
    }

    logging::init(&config.logging, cli.verbose)?;
    tracing::info!(
        config = ?cli.config,
        bind_addr = %config.server.bind_addr,
        public_docs = config.server.docs.public,
        "Starting docs server"
    );

    let authn_client: Arc<dyn AuthNClient> = Arc::new(StaticAuthN::from_config(&config.authn));
    let gateway = ApiDocsGateway::new(config.server, Some(authn_client));
    let router = gateway.build_router(books::router(), books::LibraryApi::openapi())?;

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {e}");
            return;
        }
        tracing::info!("Received Ctrl+C, shutting down");
        on_signal.cancel();
    });

    gateway.serve(router, cancel).await
}
