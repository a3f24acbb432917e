use anyhow::Result;
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use colored::*;
use pastewire_session::{
    ConnectionStatus, Direction, PresentationOutput, Session, TracingTelemetry, TransportConfig,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pastewire")]
#[command(about = "Serverless peer-to-peer chat: signaling by copy and paste")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a session and print the opening payload to send to the peer.
    Offer(SessionArgs),
    /// Start a session that waits for a pasted peer payload.
    Join(SessionArgs),
}

#[derive(clap::Args)]
struct SessionArgs {
    /// STUN server url (repeatable).
    #[arg(long = "stun", default_value = "stun:stun.l.google.com:19302")]
    stun: Vec<String>,

    /// Hard deadline for one candidate gathering round, in milliseconds.
    #[arg(long, default_value_t = 1000)]
    gather_timeout_ms: u64,

    /// Data channel label.
    #[arg(long, default_value = "chat")]
    label: String,
}

struct TerminalOutput;

#[async_trait]
impl PresentationOutput for TerminalOutput {
    async fn publish_local_payload(&self, text: String) {
        println!();
        println!(
            "{}",
            "Copy the payload below and paste it on the other side:".green().bold()
        );
        println!("{text}");
    }

    async fn show_status(&self, status: ConnectionStatus) {
        let line = format!("[connection: {status}]");
        if status == ConnectionStatus::Connected {
            println!("{}", line.green().bold());
        } else {
            println!("{}", line.yellow());
        }
    }

    async fn show_message(&self, direction: Direction, text: String) {
        match direction {
            Direction::Inbound => println!("{} {text}", "peer>".cyan().bold()),
            Direction::Outbound => println!("{} {text}", "you >".dimmed()),
        }
    }

    async fn show_error(&self, message: String) {
        eprintln!("{} {message}", "error:".red().bold());
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let (args, initiates) = match &cli.command {
        Commands::Offer(args) => (args, true),
        Commands::Join(args) => (args, false),
    };

    let config = TransportConfig {
        ice_servers: args.stun.clone(),
        gather_timeout: Duration::from_millis(args.gather_timeout_ms),
        channel_label: args.label.clone(),
    };

    let output = Arc::new(TerminalOutput);
    let telemetry = Arc::new(TracingTelemetry);
    let (handle, session) = Session::connect(config, output, telemetry).await?;
    let session_task = tokio::spawn(session.run());

    print_banner();

    if initiates {
        handle.initiate().await;
    } else {
        println!(
            "{}",
            "Waiting for a peer payload. Use :paste to apply it.".yellow()
        );
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim().to_string();
        match line.as_str() {
            "" => {}
            ":quit" => break,
            ":offer" => match handle.local_payload() {
                Some(payload) => println!("{payload}"),
                None => println!("{}", "no local payload yet".yellow()),
            },
            ":status" => println!("[connection: {}]", handle.connection_status()),
            ":paste" => {
                println!(
                    "{}",
                    "Paste the peer payload, then a line containing only '.'".yellow()
                );
                let payload = read_pasted_payload(&mut lines).await?;
                handle.accept_remote(payload).await;
            }
            _ => handle.send_message(line).await,
        }
    }

    handle.close().await;
    let _ = session_task.await;
    Ok(())
}

async fn read_pasted_payload(lines: &mut Lines<BufReader<Stdin>>) -> Result<String> {
    let mut buffer = String::new();
    while let Some(line) = lines.next_line().await? {
        if line.trim() == "." {
            break;
        }
        buffer.push_str(&line);
        buffer.push('\n');
    }
    Ok(buffer)
}

fn print_banner() {
    println!("{}", "pastewire".green().bold());
    println!("  {}  paste the peer payload (end with a lone '.')", ":paste".cyan());
    println!("  {}  print the local payload again", ":offer".cyan());
    println!("  {} print the connection status", ":status".cyan());
    println!("  {}   exit", ":quit".cyan());
    println!("  anything else is sent to the peer once the channel is open");
}
