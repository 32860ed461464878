//! Headless yield automation session.
//!
//! Runs the simulation against a paper wallet and a paper chain, logging a
//! dashboard snapshot every few seconds until the deadline, Ctrl-C, or a
//! `quit` command.

mod args;
mod commands;

use anyhow::{Context, Result};
use args::Args;
use clap::Parser;
use commands::{SessionCommand, HELP};
use log::{debug, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::{self, Instant};
use yield_api::{Address, WalletConnector};
use yield_core::clock::SystemClock;
use yield_core::paper::{PaperChain, PaperWallet};
use yield_core::shared::lock;
use yield_core::token::display_usdc;
use yield_core::{DepositOutcome, Session, SimulationConfig};

async fn wait_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

fn log_snapshot(session: &Session) {
    let snapshot = session.snapshot();
    info!("{}", snapshot.summary());
    if let Some(event) = snapshot.history.first() {
        debug!("Last rebalance: {}", event.reason());
    }
}

async fn deposit(session: &Session, wallet: &PaperWallet, amount: f64) {
    if !wallet.is_connected() {
        if let Err(e) = session.connect_wallet().await {
            warn!("Could not connect the external wallet: {}", e);
            return;
        }
    }

    match session.deposit(amount).await {
        Ok(DepositOutcome::Confirmed { amount, tx_hash }) => {
            info!("Deposited {} ({})", display_usdc(amount), tx_hash)
        }
        Ok(DepositOutcome::Cancelled) => info!("Deposit cancelled"),
        Err(e) => warn!("Deposit failed: {}", e),
    }
}

/// Returns `false` when the session should end.
async fn handle_command(session: &Session, wallet: &PaperWallet, command: SessionCommand) -> bool {
    match command {
        SessionCommand::Connect => match session.connect_wallet().await {
            Ok(address) => info!("Connected {}", address),
            Err(e) => warn!("Connect failed: {}", e),
        },
        SessionCommand::Deposit(amount) => deposit(session, wallet, amount).await,
        SessionCommand::ToggleAutoRebalance => {
            session.toggle_auto_rebalance();
        }
        SessionCommand::Rebalance {
            from,
            to,
            percentage,
        } => {
            if session.rebalance(&from, &to, percentage).is_none() {
                warn!("Rebalance {} -> {} of {}% not applied", from, to, percentage);
            }
        }
        SessionCommand::SetApr { id, apr } => {
            if !lock(&session.strategy()).set_apr(&id, apr) {
                warn!("Unknown protocol '{}'", id);
            }
        }
        SessionCommand::Reset => lock(&session.strategy()).reset(),
        SessionCommand::Snapshot => match session.snapshot().to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => warn!("Failed to serialize snapshot: {}", e),
        },
        SessionCommand::Help => println!("{}", HELP),
        SessionCommand::Quit => return false,
    }
    true
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let mut config = SimulationConfig::load(args.config.as_deref())
        .context("Failed to load the simulation configuration")?;
    args.apply(&mut config);
    config.validate()?;

    let external: Address = args
        .external_address
        .parse()
        .with_context(|| format!("Invalid external address '{}'", args.external_address))?;

    let wallet = Arc::new(PaperWallet::new(external));
    let chain = Arc::new(PaperChain::new(config.deposit.confirmation()));
    let mut session = Session::new(&config, wallet.clone(), chain, Arc::new(SystemClock))?;

    info!(
        "Agent wallet {} (app id: {})",
        lock(&session.wallet()).agent_address(),
        config.wallet.app_id.as_deref().unwrap_or("none")
    );
    session.start()?;

    if let Some(amount) = args.deposit {
        deposit(&session, &wallet, amount).await;
    }

    let deadline = args
        .duration_secs
        .map(|secs| Instant::now() + Duration::from_secs(secs));
    let mut snapshots = time::interval(Duration::from_secs(args.snapshot_secs.max(1)));
    let mut stdin = BufReader::new(tokio::io::stdin()).lines();
    let mut interactive = args.interactive;
    if interactive {
        println!("{}", HELP);
    }

    loop {
        tokio::select! {
            _ = snapshots.tick() => log_snapshot(&session),
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted");
                break;
            }
            _ = wait_until(deadline) => {
                info!("Run duration elapsed");
                break;
            }
            line = stdin.next_line(), if interactive => match line {
                Ok(Some(line)) if line.trim().is_empty() => {}
                Ok(Some(line)) => match line.parse::<SessionCommand>() {
                    // Commands run inline: a deposit holds the loop until its receipt
                    // arrives, so snapshots and Ctrl-C wait for it.
                    Ok(command) => {
                        if !handle_command(&session, &wallet, command).await {
                            break;
                        }
                    }
                    Err(e) => warn!("{}", e),
                },
                Ok(None) => interactive = false,
                Err(e) => {
                    warn!("Failed to read stdin: {}", e);
                    interactive = false;
                }
            },
        }
    }

    log_snapshot(&session);
    session.logout().await?;
    Ok(())
}
