use anyhow::{Context, Result};
use clap::Parser;
use relay_service::client::{ChatSession, RelayClient};
use relay_service::presentation::Sender;
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(Parser)]
#[command(name = "relay-chat")]
#[command(about = "Terminal chat client for the DTZ NOVA AI BOT relay")]
struct Cli {
    /// Base URL of the relay
    #[arg(long, env = "RELAY_SERVER_URL", default_value = "http://127.0.0.1:3000")]
    server: String,
    /// HTML file rewritten after every reply
    #[arg(long, default_value = "transcript.html")]
    transcript: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    service_core::observability::init_tracing("relay-chat", "error", None)?;

    println!("DTZ NOVA AI BOT @ {}", cli.server);
    println!("Commands: /generate image <prompt>, /upload <path>. Ctrl-D to quit.");

    let mut session = ChatSession::new(RelayClient::new(cli.server));
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let appended = session.submit(&line).await;
        if appended.is_empty() {
            continue;
        }

        for entry in appended {
            if entry.sender == Sender::Bot {
                println!("{}: {}", entry.sender.label(), entry.text);
            }
        }

        let html = session
            .transcript()
            .to_html_document()
            .context("rendering transcript")?;
        tokio::fs::write(&cli.transcript, html)
            .await
            .with_context(|| format!("writing {}", cli.transcript.display()))?;
    }

    Ok(())
}
