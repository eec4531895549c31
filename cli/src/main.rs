// SPDX-License-Identifier: MIT OR Apache-2.0

//! KGS Go CLI - headless terminal client
//!
//! Logs in, prints session banners, room and game activity and boards as
//! they change, and reads commands from stdin. The password is taken from
//! the `KGS_PASSWORD` environment variable.

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use kgsgo_cli::commands::{Command, HELP};
use kgsgo_cli::render::{parse_point, render_game};
use kgsgo_cli::report::{changed_games, describe_changes};
use kgsgo_cli::{AppState, Client, Navigation};
use kgsgo_network::config::{load_config, load_config_from};
use kgsgo_network::{ChannelId, HttpTransport, SessionStatus, Transport};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::AsyncBufReadExt;
use tokio::signal;
use tracing_subscriber::EnvFilter;

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "kgsgo", about = "Terminal client for the KGS Go server", version)]
struct Args {
    /// Account name
    #[arg(short, long)]
    user: String,

    /// JSON access endpoint, overriding the config file
    #[arg(long)]
    server: Option<String>,

    /// Config file to use instead of the platform default
    #[arg(long)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,

    /// Channels to join once logged in
    #[arg(long = "join", value_name = "CHANNEL")]
    join: Vec<ChannelId>,
}

/// Main entry point
#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let filter = if args.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut config = match &args.config {
        Some(path) => load_config_from(path),
        None => load_config(),
    }
    .context("Failed to load config")?;
    if let Some(server) = args.server.clone() {
        config.server_url = server;
    }
    let password = std::env::var("KGS_PASSWORD").context("KGS_PASSWORD is not set")?;

    let transport = HttpTransport::new(&config).context("Failed to create HTTP client")?;
    tracing::info!(server = transport.url(), user = %args.user, "connecting");
    let (client, store) = Client::new(transport, &config);
    let mut store_task = tokio::spawn(store.run());
    let mut snapshots = client.subscribe();
    let mut shown = client.snapshot();

    client
        .login(&args.user, &password)
        .await
        .context("Login failed")?;
    if client.session().state().status == SessionStatus::LoggedOut {
        return Err(anyhow!("Could not reach {}", config.server_url));
    }

    let mut pending_joins = args.join.clone();
    let mut stdin_lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                println!("\nReceived Ctrl+C, logging out...");
                break;
            }

            result = &mut store_task => {
                return match result {
                    Ok(Ok(())) => {
                        println!("Connection closed.");
                        Ok(())
                    }
                    Ok(Err(e)) => Err(e).context("Client state is corrupt"),
                    Err(e) => Err(anyhow!("Client store task failed: {e}")),
                };
            }

            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let next = Arc::clone(&snapshots.borrow_and_update());
                print_changes(&shown, &next);

                if next.session.status == SessionStatus::LoggedIn {
                    for channel_id in pending_joins.drain(..) {
                        if let Err(e) = client.join(channel_id).await {
                            eprintln!("Failed to join {channel_id}: {e}");
                        }
                    }
                }
                let ended = next.session.status == SessionStatus::LoggedOut
                    && shown.session.status != SessionStatus::LoggedOut;
                shown = next;
                if ended {
                    println!("Session ended.");
                    return Ok(());
                }
            }

            result = stdin_lines.next_line() => {
                let line = match result {
                    Ok(Some(line)) => line,
                    Ok(None) => break,
                    Err(e) => {
                        eprintln!("Error reading input: {e}");
                        continue;
                    }
                };
                if !handle_line(&client, &line).await {
                    break;
                }
            }
        }
    }

    if client.session().state().is_active() {
        if let Err(e) = client.logout().await {
            tracing::warn!(error = %e, "logout request failed");
        }
    }
    Ok(())
}

/// Print what changed between two snapshots, redrawing changed games
fn print_changes(prev: &AppState, next: &AppState) {
    for line in describe_changes(prev, next) {
        println!("{line}");
    }
    for channel_id in changed_games(prev, next) {
        if let Some(game) = next.game(channel_id) {
            print_game(game);
        }
    }
}

fn print_game(game: &kgsgo_cli::GameRecord) {
    match render_game(game) {
        Ok(text) => println!("\n{text}"),
        Err(e) => tracing::warn!(channel_id = game.channel_id, error = %e, "cannot render game"),
    }
}

/// Run one command line. Returns false when the user asked to quit.
async fn handle_line<T: Transport>(client: &Client<T>, line: &str) -> bool {
    let command = match Command::parse(line) {
        Ok(command) => command,
        Err(kgsgo_cli::commands::CommandError::Empty) => return true,
        Err(e) => {
            eprintln!("{e}");
            return true;
        }
    };

    let result = match command {
        Command::Quit => return false,
        Command::Help => {
            println!("{HELP}");
            Ok(())
        }
        Command::Join(channel_id) => client.join(channel_id).await,
        Command::Unjoin(channel_id) => client.unjoin(channel_id).await,
        Command::Say { channel_id, text } => client.say(channel_id, &text).await,
        Command::Move { channel_id, point } => {
            let snapshot = client.snapshot();
            let size = snapshot
                .game(channel_id)
                .and_then(|g| g.tree.rules().map(|r| r.size).or(g.summary.size))
                .unwrap_or(19);
            match parse_point(&point, size) {
                Some(loc) => client.play_move(channel_id, loc).await,
                None => {
                    eprintln!("Invalid point `{point}`. Examples: 'D4', 'pass'.");
                    return true;
                }
            }
        }
        Command::Undo(channel_id) => client.request_undo(channel_id).await,
        Command::AllowUndo(channel_id) => client.answer_undo(channel_id, true).await,
        Command::DenyUndo(channel_id) => client.answer_undo(channel_id, false).await,
        Command::Prev(channel_id) => client.navigate(channel_id, Navigation::Prev),
        Command::Next(channel_id) => client.navigate(channel_id, Navigation::Next),
        Command::Live(channel_id) => client.navigate(channel_id, Navigation::Live),
        Command::Show(channel_id) => {
            match client.snapshot().game(channel_id) {
                Some(game) => print_game(game),
                None => eprintln!("Not in game {channel_id}"),
            }
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
    }
    true
}
