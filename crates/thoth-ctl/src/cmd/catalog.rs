//! Interface query and listing commands.

use anyhow::Result;

use thoth_core::wire::{EntryDescriptor, ImplementationList, Listing, SpecificationList};

use super::http::{endpoint, get_json, get_json_opt};

fn display_path(entry: &EntryDescriptor) -> &str {
    entry.path.as_deref().unwrap_or("-")
}

async fn find_interface(port: u16, name: &str) -> Result<Option<EntryDescriptor>> {
    get_json_opt(&endpoint(port, &["interfaces", name])?).await
}

pub async fn cmd_query(port: u16, name: &str) -> Result<()> {
    println!("Querying for interface {}...", name);
    match find_interface(port, name).await? {
        Some(interface) => println!("  Interface       : {}", display_path(&interface)),
        None => println!("  Interface not found."),
    }
    Ok(())
}

pub async fn cmd_list(port: u16, name: &str) -> Result<()> {
    println!("Listing info for interface {}...", name);
    let Some(interface) = find_interface(port, name).await? else {
        println!("  Interface not found.");
        return Ok(());
    };

    let implementations: ImplementationList =
        get_json(&endpoint(port, &["implementations", name])?).await?;
    let implementations = implementations.into_entries();
    let specifications: SpecificationList =
        get_json(&endpoint(port, &["specifications", name])?).await?;
    let specifications = specifications.into_entries();

    println!("═══════════════════════════════════════");
    println!("  Interface {}", interface.name);
    println!("═══════════════════════════════════════");
    println!("  Path            : {}", display_path(&interface));
    println!("  Implementations : {}", implementations.len());
    for i in &implementations {
        println!("    {}@{}", i.name, display_path(i));
    }
    println!("  Specifications  : {}", specifications.len());
    for s in &specifications {
        println!("    {}@{}", s.name, display_path(s));
    }

    Ok(())
}
