// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `servmon invoke` command - Handle one API event offline.
//!
//! The event uses the gateway shape: `httpMethod`, `pathParameters`, `body`.
//! The response is printed as `{"statusCode": .., "body": ..}`.

use std::io::Read;

use servmon_core::{handle_event, ApiEvent, ConfigLoader};

pub async fn execute(config_path: &str, event_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigLoader::load_file(config_path)?;

    let raw = read_event(event_path)?;
    let event: ApiEvent = serde_json::from_str(&raw)?;
    tracing::debug!(method = %event.http_method, "Invoking event");

    let (inventory, _) = super::bootstrap(&config).await?;
    let response = tokio::task::spawn_blocking(move || handle_event(&inventory, &event)).await?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

fn read_event(path: &str) -> std::io::Result<String> {
    if path == "-" {
        let mut raw = String::new();
        std::io::stdin().read_to_string(&mut raw)?;
        Ok(raw)
    } else {
        std::fs::read_to_string(path)
    }
}
