// ABOUTME: Server binary for the Parley chat relay
// ABOUTME: Loads configuration, connects storage and the Gemini provider, then serves HTTP and WebSocket
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Parley Server Binary
//!
//! Starts the chat relay with `SQLite` persistence and Gemini translation.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use parley_server::{
    config::ServerConfig,
    database::Database,
    llm::{check_readiness, GeminiProvider, LlmProvider},
    logging,
    server::{self, ServerResources},
};
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "parley-server")]
#[command(about = "Parley - room-based chat relay with context-aware translation")]
pub struct Args {
    /// Override HTTP port
    #[arg(long)]
    http_port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    logging::init_from_env()?;

    let mut config = ServerConfig::from_env()?;
    if let Some(http_port) = args.http_port {
        config.http_port = http_port;
    }

    info!("Starting Parley server");
    info!("{}", config.summary());

    let provider = GeminiProvider::from_config(&config.llm)
        .context("GEMINI_API_KEY must be set to start the server")?;
    let readiness = check_readiness(&provider).await;
    if readiness.is_ready() {
        info!(
            provider = provider.display_name(),
            model = provider.default_model(),
            "Translation provider ready"
        );
    } else {
        warn!(
            provider = provider.display_name(),
            known_model = readiness.known_model,
            healthy = readiness.healthy,
            "Translation provider not ready; messages will carry fallback text until it recovers"
        );
    }

    let database = Database::new(&config.database.url)
        .await
        .context("Failed to open database")?;

    let resources = ServerResources::new(config, Arc::new(database), Arc::new(provider));

    if let Err(e) = server::serve(&resources).await {
        warn!(error = %e, "Server stopped with error");
        return Err(e.into());
    }

    info!("Parley server stopped");
    Ok(())
}
