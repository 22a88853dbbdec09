// Copyright (c) 2026 Aurum Custody Engineering. MIT License.
// See LICENSE for details.

//! # Aurum Vault Node
//!
//! Entry point for the `aurum-node` binary. Parses CLI arguments, initializes
//! logging and metrics, and serves the REST API.
//!
//! The binary supports three subcommands:
//!
//! - `run`    : start the API and metrics servers
//! - `status` : query a running server's health endpoint
//! - `version`: print build version information

#![recursion_limit = "256"]

mod api;
mod cli;
mod logging;
mod metrics;
mod openapi;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tokio::signal;

use aurum_contracts::{ContractConfig, HttpRpcClient, VaultFaucet};
use aurum_ledger::{BarDataset, ReserveAggregator};

use cli::{AurumNodeCli, Commands};
use metrics::ServiceMetrics;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = AurumNodeCli::parse();

    match cli.command {
        Commands::Run(args) => run_node(args).await,
        Commands::Status(args) => query_status(args).await,
        Commands::Version => {
            print_version();
            Ok(())
        }
    }
}

/// Starts the API server and the metrics endpoint.
async fn run_node(args: cli::RunArgs) -> Result<()> {
    logging::init_logging(logging::DEFAULT_DIRECTIVES, args.log_format);

    tracing::info!(
        port = args.port,
        metrics_port = args.metrics_port,
        rpc_url = %args.rpc_url,
        contract = %args.contract_address,
        chain_id = args.chain_id,
        "starting aurum-node"
    );

    // --- Dataset ---
    let dataset = Arc::new(BarDataset::builtin());
    tracing::info!(vaults = dataset.vaults().len(), "vault dataset loaded");

    // --- Reserve placeholders ---
    let reserves = Arc::new(match args.rng_seed {
        Some(seed) => ReserveAggregator::with_seed(Arc::clone(&dataset), seed),
        None => ReserveAggregator::from_entropy(Arc::clone(&dataset)),
    });

    // --- Contract reader ---
    let contract = ContractConfig {
        contract_address: args.contract_address,
        chain_id: args.chain_id,
        chain_name: args.chain_name,
        rpc_url: args.rpc_url,
    };
    let client = Arc::new(HttpRpcClient::new(contract.rpc_url.clone()));
    let faucet = VaultFaucet::new(client, &contract.contract_address)
        .with_context(|| format!("invalid contract address {}", contract.contract_address))?;

    // --- Metrics ---
    let service_metrics = Arc::new(ServiceMetrics::new());

    // --- Application state ---
    let app_state = api::AppState {
        dataset,
        reserves,
        faucet: Arc::new(faucet),
        contract: Arc::new(contract),
        metrics: Arc::clone(&service_metrics),
    };

    // --- API server ---
    let api_router = api::create_router(app_state);
    let api_addr = format!("0.0.0.0:{}", args.port);
    let api_listener = tokio::net::TcpListener::bind(&api_addr)
        .await
        .with_context(|| format!("failed to bind API listener on {}", api_addr))?;
    tracing::info!("API server listening on {}", api_addr);

    // --- Metrics server ---
    let metrics_router = axum::Router::new()
        .route("/metrics", axum::routing::get(metrics::metrics_handler))
        .with_state(Arc::clone(&service_metrics));
    let metrics_addr = format!("0.0.0.0:{}", args.metrics_port);
    let metrics_listener = tokio::net::TcpListener::bind(&metrics_addr)
        .await
        .with_context(|| format!("failed to bind metrics listener on {}", metrics_addr))?;
    tracing::info!("Metrics server listening on {}", metrics_addr);

    // --- Serve ---
    tokio::select! {
        res = axum::serve(api_listener, api_router) => {
            if let Err(e) = res {
                tracing::error!("API server error: {}", e);
            }
        }
        res = axum::serve(metrics_listener, metrics_router) => {
            if let Err(e) = res {
                tracing::error!("Metrics server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            tracing::info!("shutdown signal received, draining connections");
        }
    }

    tracing::info!("aurum-node stopped");
    Ok(())
}

/// Queries a running server's health endpoint and prints the result.
async fn query_status(args: cli::StatusArgs) -> Result<()> {
    let url = format!("{}/health", args.url.trim_end_matches('/'));
    let body = reqwest::get(&url)
        .await
        .with_context(|| format!("failed to reach {}", url))?
        .error_for_status()
        .with_context(|| format!("unhealthy response from {}", url))?
        .text()
        .await?;
    println!("{}", body);
    Ok(())
}

/// Prints version information to stdout.
fn print_version() {
    println!("aurum-node {}", env!("CARGO_PKG_VERSION"));
    println!("rustc      {}", rustc_version());
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}

/// Waits for SIGINT (Ctrl+C) or SIGTERM, whichever comes first.
///
/// On non-Unix platforms, only Ctrl+C is supported.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}
