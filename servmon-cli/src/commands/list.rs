// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 Ankit Kumar Pandey

//! `servmon list` command - List servers in the configured table.
//!
//! Reads the table straight from the store without bootstrapping it.

use servmon_core::{
    ConfigLoader, InventoryError, Record, ServerInventory, StoreBackend, StoreError, KEY_FIELD,
};

pub async fn execute(config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = ConfigLoader::load_file(config_path)?;

    if let StoreBackend::Memory { .. } = config.store {
        println!("Memory backend keeps no data between runs; nothing to list.");
        println!("Use `servmon up` and GET /servers against the running gateway.");
        return Ok(());
    }

    let store = config.store.open()?;
    let inventory = ServerInventory::new(store, config.schema.table.clone());

    let mut servers = match tokio::task::spawn_blocking(move || inventory.list()).await? {
        Ok(servers) => servers,
        Err(InventoryError::Store(StoreError::TableNotFound { table })) => {
            println!("Table '{}' is not initialized. Run `servmon up` first.", table);
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    if servers.is_empty() {
        println!("No servers in table '{}'.", config.schema.table);
        return Ok(());
    }

    servers.sort_by_key(|server| server_id(server));

    println!("╔══════════════════════════════════════════════════════════════════════════════╗");
    println!("║                              SERVER INVENTORY                                ║");
    println!("╠═══════════════════════════════╦══════════════════════════════════════════════╣");
    println!("║ Server ID                     ║ Attributes                                   ║");
    println!("╠═══════════════════════════════╬══════════════════════════════════════════════╣");

    for server in &servers {
        let attributes = server
            .fields()
            .filter(|(field, _)| field.as_str() != KEY_FIELD)
            .map(|(field, value)| format!("{}={}", field, value))
            .collect::<Vec<_>>()
            .join(", ");

        println!(
            "║ {:<29} ║ {:<44} ║",
            truncate(&server_id(server), 29),
            truncate(&attributes, 44)
        );
    }

    println!("╚═══════════════════════════════╩══════════════════════════════════════════════╝");
    println!();
    println!("Total: {} server(s)", servers.len());

    Ok(())
}

fn server_id(server: &Record) -> String {
    server
        .get(KEY_FIELD)
        .map(ToString::to_string)
        .unwrap_or_default()
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut cut: String = text.chars().take(width.saturating_sub(1)).collect();
    cut.push('…');
    cut
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_keeps_short_text() {
        assert_eq!(truncate("memory=1", 44), "memory=1");
    }

    #[test]
    fn test_truncate_marks_cut() {
        let cut = truncate("VillaconejosSQLServer01-with-a-long-suffix", 10);
        assert_eq!(cut.chars().count(), 10);
        assert!(cut.ends_with('…'));
    }
}
