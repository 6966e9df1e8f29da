use anyhow::{Context as _, Result};
use clap::{Parser, Subcommand};
use commonware_runtime::{tokio as cw_tokio, Metrics, Runner};
use commonware_utils::hex;
use luckdraw_execution::{query, Engine, State};
use luckdraw_operator::{deliver_all, open_state, parse_messages, Config, LoggingWallet};
use std::{path::PathBuf, str::FromStr};
use tracing::{info, Level};

#[derive(Parser, Debug)]
#[command(author, version, about = "Drive a luckdraw contract from local storage.")]
struct Args {
    #[arg(long)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write the configured owner and fee into empty state.
    Deploy,
    /// Process signed messages, one hex-encoded message per line.
    Deliver {
        #[arg(long)]
        messages: PathBuf,
    },
    /// Print a draw.
    Draw {
        #[arg(long)]
        id: u32,
    },
    /// Print the contract owner and fee.
    Owner,
}

fn main() -> Result<()> {
    // Parse args
    let args = Args::parse();
    let config = Config::load(&args.config)?;

    // Setup logging
    let level = Level::from_str(&config.log_level)
        .map_err(|_| anyhow::anyhow!("invalid log level {}", config.log_level))?;
    tracing_subscriber::fmt().with_max_level(level).init();

    // Initialize runtime
    let cfg = cw_tokio::Config::default()
        .with_storage_directory(config.directory.clone())
        .with_catch_panics(true);
    let executor = cw_tokio::Runner::new(cfg);

    // Run
    executor.start(|context| async move {
        let state = open_state(context.with_label("state"), &config).await?;
        run(Engine::new(state, LoggingWallet::default()), &config, args.command).await
    })
}

async fn run<S: State>(
    mut engine: Engine<S, LoggingWallet>,
    config: &Config,
    command: Command,
) -> Result<()> {
    match command {
        Command::Deploy => {
            engine.deploy(config.contract()).await?;
            info!(directory = %config.directory.display(), "deployed");
        }
        Command::Deliver { messages } => {
            let raw = std::fs::read_to_string(&messages)
                .with_context(|| format!("read messages {}", messages.display()))?;
            let inbound = parse_messages(&raw)?;
            info!(count = inbound.len(), "delivering messages");

            let tally = deliver_all(&mut engine, inbound).await;
            let (_, wallet) = engine.into_parts();
            info!(
                applied = tally.applied,
                rejected = tally.rejected,
                dropped = tally.dropped,
                failed = tally.failed,
                payouts = wallet.paid.len(),
                "delivery complete"
            );
        }
        Command::Draw { id } => match query::draw_status(engine.state(), id).await? {
            Some(status) => {
                println!("draw {}: {}", status.draw_id, status.phase);
                println!("  min entry: {}", status.min_entry_amount);
                println!("  entries:   {}", status.entry_count);
                println!("  pot:       {}", status.pot);
                if let Some(win_hash) = status.win_hash {
                    println!("  win hash:  {}", hex(win_hash.as_ref()));
                }
                if let Some(winner) = status.winner {
                    println!("  winner:    {}", hex(winner.as_ref()));
                }
            }
            None => println!("draw {id} not found"),
        },
        Command::Owner => {
            println!("owner: {}", hex(engine.owner().await?.as_ref()));
            println!("fee:   {}", engine.fee().await?);
        }
    }
    Ok(())
}
