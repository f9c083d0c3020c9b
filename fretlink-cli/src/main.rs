use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Select;
use dialoguer::theme::ColorfulTheme;
use tracing_subscriber::EnvFilter;

mod commands;
mod frets;
mod guard;
mod replay;

use commands::{ControlArgs, PerformArgs, RoomCommands, ServeArgs};

#[derive(Parser)]
#[command(name = "fretlink")]
#[command(about = "Play guitar charts with your phone as the fretboard")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the rendezvous server.
    Serve(ServeArgs),
    /// Manage rooms on a running server.
    Room {
        #[command(subcommand)]
        command: RoomCommands,
    },
    /// Join as the controller and stream fret states.
    Control(ControlArgs),
    /// Join as the performer and play a song from recorded hand samples.
    Perform(PerformArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let command = match Cli::parse().command {
        Some(command) => command,
        None => pick_role()?,
    };

    match command {
        Commands::Serve(args) => commands::serve::run(args).await,
        Commands::Room { command } => commands::room::run(command).await,
        Commands::Control(args) => commands::control::run(args).await,
        Commands::Perform(args) => commands::perform::run(args).await,
    }
}

/// No subcommand given: ask which side of the room to join.
fn pick_role() -> Result<Commands> {
    println!("{}", "🎸 fretlink".green().bold());

    let choices = ["Perform (camera side)", "Control (fretboard side)"];
    let picked = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Join as")
        .items(&choices)
        .default(0)
        .interact()?;

    // Re-parse so the chosen command picks up its defaults and env fallbacks.
    let command = ["perform", "control"][picked];
    Cli::try_parse_from(["fretlink", command])?
        .command
        .context("no command selected")
}
