//! Node status and neighbor commands.

use anyhow::Result;

use thoth_core::wire::{NeighborsResponse, StatusResponse};

use super::http::{base_url, get_json};

pub async fn cmd_status(port: u16) -> Result<()> {
    let resp: StatusResponse = get_json(&format!("{}/status", base_url(port))).await?;

    println!("═══════════════════════════════════════");
    println!("  Thoth Node Status");
    println!("═══════════════════════════════════════");
    println!("  Catalog root    : {}", resp.catalog_root);
    println!("  Interfaces      : {}", resp.interfaces);
    println!("  Implementations : {}", resp.implementations);
    println!("  Specifications  : {}", resp.specifications);
    println!("  Neighbors       : {}", resp.neighbors);

    Ok(())
}

pub async fn cmd_neighbors(port: u16) -> Result<()> {
    let resp: NeighborsResponse = get_json(&format!("{}/neighbors", base_url(port))).await?;

    if resp.neighbors.is_empty() {
        println!("No neighbors configured.");
        return Ok(());
    }

    println!("═══════════════════════════════════════");
    println!("  Neighbors ({})", resp.neighbors.len());
    println!("═══════════════════════════════════════");
    for (i, n) in resp.neighbors.iter().enumerate() {
        println!("  {:>2}. {}", i + 1, n);
    }

    Ok(())
}
