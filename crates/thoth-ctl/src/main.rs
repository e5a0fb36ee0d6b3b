//! thoth-ctl — command-line interface for a Thoth node.

mod cmd;

use anyhow::{Context, Result};

const DEFAULT_PORT: u16 = 9292;

fn print_usage() {
    println!("Usage: thoth-ctl [--port <port>] <command>");
    println!();
    println!("Commands:");
    println!("  status              Catalog counts and neighbor count");
    println!("  neighbors           Configured neighbors, in sync order");
    println!("  query <interface>   Show where an interface is stored");
    println!("  list <interface>    Interface with its implementations and specifications");
    println!("  sync [interface]    Pull missing entries from neighbors (all when omitted)");
    println!("  test <interface>    Run the interface's specifications");
    println!("  shell               Interactive shell (q, l, s, t, x)");
    println!("  help                Show this message");
}

#[tokio::main]
async fn main() -> Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();

    // Parse --port option
    let mut port = DEFAULT_PORT;
    let mut remaining: Vec<&str> = Vec::new();
    let mut i = 0;
    while i < args.len() {
        if args[i] == "--port" {
            i += 1;
            port = args
                .get(i)
                .context("--port requires a value")?
                .parse()
                .context("--port must be a number")?;
        } else {
            remaining.push(&args[i]);
        }
        i += 1;
    }

    match remaining.as_slice() {
        ["status"] | [] => cmd::status::cmd_status(port).await,
        ["neighbors"] => cmd::status::cmd_neighbors(port).await,
        ["query", name] => cmd::catalog::cmd_query(port, name).await,
        ["list", name] => cmd::catalog::cmd_list(port, name).await,
        ["sync"] => cmd::sync::cmd_sync(port, None).await,
        ["sync", name] => cmd::sync::cmd_sync(port, Some(*name)).await,
        ["test", name] => cmd::sync::cmd_test(port, name).await,
        ["shell"] => cmd::shell::cmd_shell(port).await,
        ["help"] | ["--help"] | ["-h"] => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {}", other.join(" "));
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}
