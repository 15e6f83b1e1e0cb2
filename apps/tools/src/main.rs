use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use storage::Storage;

#[derive(Parser, Debug)]
struct Cli {
    #[arg(long, default_value = "sqlite://./data/kiosk.db")]
    database_url: String,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List stored snapshot keys.
    Keys,
    /// Print a stored snapshot.
    Dump {
        #[arg(default_value = "pimpMyCase_state")]
        key: String,
        #[arg(long)]
        raw: bool,
    },
    /// Delete a stored snapshot.
    Clear {
        #[arg(default_value = "pimpMyCase_state")]
        key: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let storage = Storage::new(&cli.database_url).await?;

    match cli.command {
        Command::Keys => {
            for key in storage.list_snapshot_keys().await? {
                println!("{key}");
            }
        }
        Command::Dump { key, raw } => {
            let Some(snapshot) = storage.load_snapshot(&key).await? else {
                println!("no snapshot stored under key={key}");
                return Ok(());
            };
            println!("# key={} updated_at={}", snapshot.key, snapshot.updated_at);
            if raw {
                println!("{}", snapshot.value);
            } else {
                let value: serde_json::Value = serde_json::from_str(&snapshot.value)
                    .with_context(|| format!("snapshot '{key}' is not valid JSON"))?;
                println!("{}", serde_json::to_string_pretty(&value)?);
            }
        }
        Command::Clear { key } => {
            if storage.delete_snapshot(&key).await? {
                println!("deleted snapshot key={key}");
            } else {
                println!("no snapshot stored under key={key}");
            }
        }
    }

    Ok(())
}
