//! Interactive shell: one command per line until `quit`.

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

use super::{catalog, sync};

pub async fn cmd_shell(port: u16) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let mut tokens = line.split_whitespace();
        let Some(command) = tokens.next() else {
            continue;
        };
        let args = tokens.collect::<Vec<_>>().join(" ");

        let result = match command {
            "query" | "q" => catalog::cmd_query(port, &args).await,
            "list" | "l" => catalog::cmd_list(port, &args).await,
            "sync" | "synch" | "s" => {
                let target = (!args.is_empty()).then_some(args.as_str());
                sync::cmd_sync(port, target).await
            }
            "test" | "t" => sync::cmd_test(port, &args).await,
            "quit" | "exit" | "x" => break,
            other => {
                println!("Unknown command {}", other);
                Ok(())
            }
        };
        if let Err(e) = result {
            eprintln!("error: {:#}", e);
        }
    }

    Ok(())
}
