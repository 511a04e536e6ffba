// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `servmon validate` command - Validate configuration file.

use servmon_core::{ConfigLoader, StoreBackend, KEY_FIELD};

pub async fn execute(file: &str) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(file = %file, "Validating configuration");

    match ConfigLoader::load_file(file) {
        Ok(config) => {
            println!("✓ Configuration is valid");
            println!();
            println!("Gateway:");
            println!("  Listen Address:  {}", config.gateway.socket_addr());
            match config.gateway.metrics_port {
                Some(port) => println!("  Metrics Port:    {}", port),
                None => println!("  Metrics Port:    disabled"),
            }
            println!();
            println!("Store:");
            match &config.store {
                StoreBackend::Memory { activation_lag } => {
                    println!("  Backend:         memory");
                    println!("  Activation Lag:  {} describe(s)", activation_lag);
                }
                StoreBackend::File { data_dir } => {
                    println!("  Backend:         file");
                    println!("  Data Directory:  {}", data_dir.display());
                }
            }
            println!();
            println!("Table:");
            println!("  Name:            {}", config.schema.table);
            println!(
                "  Poll Interval:   {}ms",
                config.schema.poll_interval.as_millis()
            );
            println!(
                "  Ready Timeout:   {}ms",
                config.schema.ready_timeout.as_millis()
            );
            println!();
            println!("Seed Records ({}):", config.schema.seed.len());
            for record in &config.schema.seed {
                let id = record
                    .get(KEY_FIELD)
                    .map(ToString::to_string)
                    .unwrap_or_default();
                println!("  - {} ({} field(s))", id, record.len());
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("✗ Configuration validation failed:");
            eprintln!("  {}", e);
            std::process::exit(1);
        }
    }
}
