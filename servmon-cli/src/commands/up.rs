// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `servmon up` command - Bootstrap the table and serve the gateway.

use std::net::SocketAddr;

use servmon_core::{ConfigLoader, SchemaOutcome};

use crate::{gateway, metrics};

pub async fn execute(config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(config = %config_path, "Starting servmon");

    let config = ConfigLoader::load_file(config_path)?;
    let (inventory, outcome) = super::bootstrap(&config).await?;

    println!("╔══════════════════════════════════════════════════════════════╗");
    println!("║                  SERVMON SERVER INVENTORY                    ║");
    println!("╚══════════════════════════════════════════════════════════════╝");
    println!();
    println!("  Backend:  {}", config.store.name());
    println!("  Table:    {}", config.schema.table);
    match outcome {
        SchemaOutcome::AlreadyPresent => println!("  Schema:   already present"),
        SchemaOutcome::Created { seeded } => {
            println!("  Schema:   created ({} seed record(s))", seeded)
        }
    }
    println!("  Gateway:  http://{}", config.gateway.socket_addr());

    if let Some(port) = config.gateway.metrics_port {
        let addr = SocketAddr::new(config.gateway.bind_address, port.value());
        metrics::start_metrics_server(addr);
        println!("  Metrics:  http://{}/metrics", addr);
    }

    println!();
    println!("Press Ctrl+C to stop...");
    println!();

    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
        }
        println!();
        println!("Shutting down...");
    };

    gateway::start_gateway(config.gateway.socket_addr(), inventory, shutdown)
        .await
        .map_err(|e| e as Box<dyn std::error::Error>)?;

    println!("Gateway stopped.");
    Ok(())
}
