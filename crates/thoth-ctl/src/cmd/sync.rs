//! Sync and specification evaluation commands.

use anyhow::Result;

use thoth_core::report::{Located, SyncReport};
use thoth_core::wire::{EvaluationResponse, SyncRequest};

use super::http::{base_url, endpoint, post_json, post_json_body};

pub async fn cmd_sync(port: u16, interface: Option<&str>) -> Result<()> {
    match interface {
        Some(name) => println!("Syncing interface {}...", name),
        None => println!("Syncing every interface the neighbors list..."),
    }
    let request = SyncRequest {
        interface: interface.map(str::to_string),
    };
    let report: SyncReport = post_json_body(&format!("{}/sync", base_url(port)), &request).await?;

    if report.interfaces.is_empty() {
        println!("  Nothing to sync.");
    }
    for i in &report.interfaces {
        let located = match &i.located {
            Located::Local => "local".to_string(),
            Located::Fetched { from } => format!("fetched from {}", from),
            Located::NotFound => "not found".to_string(),
        };
        println!("  ┌─ {}", i.interface);
        println!("  │  interface       : {}", located);
        println!("  │  specifications  : {}", fetched_summary(&i.specifications.fetched));
        println!("  └─ implementations : {}", fetched_summary(&i.implementations.fetched));
    }

    if !report.issues.is_empty() {
        println!("\n  Skipped neighbors:");
        for issue in &report.issues {
            println!("    {} [{}] {}", issue.neighbor, issue.stage, issue.reason);
        }
    }

    Ok(())
}

fn fetched_summary(fetched: &[String]) -> String {
    if fetched.is_empty() {
        "up to date".to_string()
    } else {
        format!("fetched {} ({})", fetched.len(), fetched.join(", "))
    }
}

pub async fn cmd_test(port: u16, interface: &str) -> Result<()> {
    let resp: EvaluationResponse = post_json(&endpoint(port, &["evaluate", interface])?).await?;

    println!("═══════════════════════════════════════");
    println!("  Specifications of {}", resp.interface);
    println!("═══════════════════════════════════════");
    if resp.results.is_empty() {
        println!("  No specifications.");
    }
    for r in &resp.results {
        println!("  {} {}", if r.passed { "✓" } else { "✗" }, r.name);
    }
    println!("  Result : {}", if resp.passed { "pass" } else { "FAIL" });

    Ok(())
}
